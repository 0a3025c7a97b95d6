use std::fmt;
use std::str::FromStr;

use crate::error::JurnalError;

/// Which amount column a flag reads when it falls back to the raw row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Debit,
    Credit,
}

/// The tax flags an account can be tagged with and that propagate across a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaxFlag {
    Wth21,
    Wth23,
    Wth26,
    Wth42,
    Wth15,
    OutputTax,
    InputTax,
    AdvanceTax,
}

impl TaxFlag {
    pub const ALL: [TaxFlag; 8] = [
        TaxFlag::Wth21,
        TaxFlag::Wth23,
        TaxFlag::Wth26,
        TaxFlag::Wth42,
        TaxFlag::Wth15,
        TaxFlag::OutputTax,
        TaxFlag::InputTax,
        TaxFlag::AdvanceTax,
    ];

    /// Column holding this bucket in the `transactions` table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Wth21 => "wth_21_cr",
            Self::Wth23 => "wth_23_cr",
            Self::Wth26 => "wth_26_cr",
            Self::Wth42 => "wth_4_2_cr",
            Self::Wth15 => "wth_15_cr",
            Self::OutputTax => "pk_cr",
            Self::InputTax => "pm_db",
            Self::AdvanceTax => "um_pajak_db",
        }
    }

    /// Tag string stored on the account that marks it as carrying this flag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Wth21 => "Wth 21 Cr",
            Self::Wth23 => "Wth 23 Cr",
            Self::Wth26 => "Wth 26 Cr",
            Self::Wth42 => "Wth 4.2 Cr",
            Self::Wth15 => "Wth 15 Cr",
            Self::OutputTax => "PK Cr",
            Self::InputTax => "PM DB",
            Self::AdvanceTax => "UM Pajak DB",
        }
    }

    pub fn side(&self) -> Side {
        match self {
            Self::InputTax | Self::AdvanceTax => Side::Debit,
            _ => Side::Credit,
        }
    }

    pub fn from_tag(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .iter()
            .find(|f| f.tag().eq_ignore_ascii_case(raw))
            .copied()
    }

    /// Withholding tax types as written on withholding rules (`wth_21`, `wth_4_2`, ...).
    pub fn from_tax_type(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "wth_21" => Some(Self::Wth21),
            "wth_23" => Some(Self::Wth23),
            "wth_26" => Some(Self::Wth26),
            "wth_4_2" => Some(Self::Wth42),
            "wth_15" => Some(Self::Wth15),
            _ => None,
        }
    }
}

impl fmt::Display for TaxFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The eight tax buckets of a row. `None` means the flag does not apply to the row;
/// `Some(0.0)` means it applies and computed to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TaxBuckets {
    pub wth_21: Option<f64>,
    pub wth_23: Option<f64>,
    pub wth_26: Option<f64>,
    pub wth_4_2: Option<f64>,
    pub wth_15: Option<f64>,
    pub pk_cr: Option<f64>,
    pub pm_db: Option<f64>,
    pub um_pajak_db: Option<f64>,
}

impl TaxBuckets {
    pub fn get(&self, flag: TaxFlag) -> Option<f64> {
        match flag {
            TaxFlag::Wth21 => self.wth_21,
            TaxFlag::Wth23 => self.wth_23,
            TaxFlag::Wth26 => self.wth_26,
            TaxFlag::Wth42 => self.wth_4_2,
            TaxFlag::Wth15 => self.wth_15,
            TaxFlag::OutputTax => self.pk_cr,
            TaxFlag::InputTax => self.pm_db,
            TaxFlag::AdvanceTax => self.um_pajak_db,
        }
    }

    pub fn set(&mut self, flag: TaxFlag, value: Option<f64>) {
        let slot = match flag {
            TaxFlag::Wth21 => &mut self.wth_21,
            TaxFlag::Wth23 => &mut self.wth_23,
            TaxFlag::Wth26 => &mut self.wth_26,
            TaxFlag::Wth42 => &mut self.wth_4_2,
            TaxFlag::Wth15 => &mut self.wth_15,
            TaxFlag::OutputTax => &mut self.pk_cr,
            TaxFlag::InputTax => &mut self.pm_db,
            TaxFlag::AdvanceTax => &mut self.um_pajak_db,
        };
        *slot = value;
    }
}

/// One uploaded journal line, as read from the store. Never mutated by processing.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalRow {
    pub id: i64,
    pub batch_id: i64,
    pub document_type: String,
    pub document_number: String,
    pub posting_date: String,
    pub account_code: String,
    pub account_name: String,
    pub description: String,
    pub debit: f64,
    pub credit: f64,
    pub net: f64,
}

/// Attributes derived for a row by classification and propagation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Derived {
    pub nature: Option<String>,
    pub koreksi: Option<String>,
    pub obyek: Option<String>,
    pub koreksi_obyek: Option<String>,
    pub buckets: TaxBuckets,
    pub additional_analysis: Option<String>,
}

/// A stored row together with whatever has been derived for it so far.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    pub row: JournalRow,
    pub derived: Derived,
    pub is_processed: bool,
    pub processing_error: Option<String>,
}

/// Result of classifying one row, ready to be persisted with its page.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Classified(Derived),
    Failed(String),
}

/// Input for a new row handed over by the upload collaborator.
#[derive(Debug, Clone, Default)]
pub struct NewRow {
    pub document_type: String,
    pub document_number: String,
    pub posting_date: String,
    pub account_code: String,
    pub account_name: String,
    pub description: String,
    pub debit: f64,
    pub credit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub nature: String,
    pub correction_tag: String,
    pub analysis_note: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KoreksiRule {
    pub id: i64,
    pub keyword: String,
    pub value: String,
    pub exclusion_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObyekRule {
    pub id: i64,
    pub keyword: String,
    pub value: String,
    pub exclusion_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithholdingTaxRule {
    pub id: i64,
    pub keyword: String,
    pub tax_type: String,
    pub rate: f64,
    pub priority: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxCategory {
    Input,
    Output,
}

impl TaxCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input_tax",
            Self::Output => "output_tax",
        }
    }
}

impl FromStr for TaxCategory {
    type Err = JurnalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "input" | "input_tax" => Ok(Self::Input),
            "output" | "output_tax" => Ok(Self::Output),
            other => Err(JurnalError::InvalidCategory(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxKeyword {
    pub id: i64,
    pub keyword: String,
    pub category: String,
    pub priority: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
    Canceled,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Canceled)
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchStatus {
    type Err = JurnalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploaded" => Ok(Self::Uploaded),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "canceled" => Ok(Self::Canceled),
            other => Err(JurnalError::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub id: i64,
    pub filename: String,
    pub total_rows: i64,
    pub processed_rows: i64,
    pub failed_rows: i64,
    pub status: BatchStatus,
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_parsing_is_case_and_space_insensitive() {
        assert_eq!(TaxFlag::from_tag("Wth 21 Cr"), Some(TaxFlag::Wth21));
        assert_eq!(TaxFlag::from_tag("  wth 4.2 cr "), Some(TaxFlag::Wth42));
        assert_eq!(TaxFlag::from_tag("UM PAJAK DB"), Some(TaxFlag::AdvanceTax));
        assert_eq!(TaxFlag::from_tag("Wth 21"), None);
        assert_eq!(TaxFlag::from_tag(""), None);
    }

    #[test]
    fn test_tax_type_only_covers_withholding() {
        assert_eq!(TaxFlag::from_tax_type("wth_4_2"), Some(TaxFlag::Wth42));
        assert_eq!(TaxFlag::from_tax_type("WTH_15"), Some(TaxFlag::Wth15));
        assert_eq!(TaxFlag::from_tax_type("pk_cr"), None);
    }

    #[test]
    fn test_flag_sides() {
        assert_eq!(TaxFlag::InputTax.side(), Side::Debit);
        assert_eq!(TaxFlag::AdvanceTax.side(), Side::Debit);
        assert_eq!(TaxFlag::OutputTax.side(), Side::Credit);
        assert_eq!(TaxFlag::Wth26.side(), Side::Credit);
    }

    #[test]
    fn test_buckets_get_set() {
        let mut b = TaxBuckets::default();
        for flag in TaxFlag::ALL {
            assert_eq!(b.get(flag), None);
        }
        b.set(TaxFlag::Wth42, Some(0.0));
        assert_eq!(b.get(TaxFlag::Wth42), Some(0.0));
        assert_eq!(b.wth_4_2, Some(0.0));
        assert_eq!(b.get(TaxFlag::Wth21), None);
    }

    #[test]
    fn test_status_roundtrip_and_terminal() {
        for s in ["uploaded", "processing", "completed", "failed", "canceled"] {
            assert_eq!(s.parse::<BatchStatus>().unwrap().as_str(), s);
        }
        assert!("done".parse::<BatchStatus>().is_err());
        assert!(!BatchStatus::Processing.is_terminal());
        assert!(BatchStatus::Canceled.is_terminal());
    }

    #[test]
    fn test_category_accepts_short_and_stored_forms() {
        assert_eq!("input".parse::<TaxCategory>().unwrap(), TaxCategory::Input);
        assert_eq!("output_tax".parse::<TaxCategory>().unwrap(), TaxCategory::Output);
        assert!("vat".parse::<TaxCategory>().is_err());
    }
}
