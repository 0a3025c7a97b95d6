use thiserror::Error;

use crate::models::{Derived, JournalRow, TaxFlag};
use crate::rules::{LabelRule, RuleSet};

/// A row that cannot be classified. Recorded on the row; never fails the batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifyError {
    #[error("non-finite {field} amount: {value}")]
    NonFiniteAmount { field: &'static str, value: f64 },

    #[error("{flag} computed to a non-finite amount")]
    NonFiniteTax { flag: TaxFlag },
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn first_match(description: &str, rules: &[LabelRule]) -> Option<String> {
    rules
        .iter()
        .find(|r| description.contains(&r.keyword))
        .map(|r| r.value.clone())
}

/// `"<koreksi> - <obyek>"` when both are present, otherwise whichever one is.
pub fn combine_labels(koreksi: Option<&str>, obyek: Option<&str>) -> Option<String> {
    let koreksi = koreksi.filter(|k| !k.is_empty());
    let obyek = obyek.filter(|o| !o.is_empty());
    match (koreksi, obyek) {
        (Some(k), Some(o)) => Some(format!("{k} - {o}")),
        (Some(k), None) => Some(k.to_string()),
        (None, Some(o)) => Some(o.to_string()),
        (None, None) => None,
    }
}

pub fn classify(row: &JournalRow, rules: &RuleSet) -> Result<Derived, ClassifyError> {
    for (field, value) in [("debit", row.debit), ("credit", row.credit)] {
        if !value.is_finite() {
            return Err(ClassifyError::NonFiniteAmount { field, value });
        }
    }

    let description = row.description.to_lowercase();
    let account = rules.account(&row.account_code);
    let mut derived = Derived::default();

    derived.nature = account.map(|acc| {
        if !acc.nature.is_empty() {
            acc.nature.clone()
        } else if !acc.name.is_empty() {
            acc.name.clone()
        } else {
            row.account_code.clone()
        }
    });

    derived.koreksi = first_match(&description, rules.koreksi_rules());
    derived.obyek = first_match(&description, rules.obyek_rules());
    derived.koreksi_obyek = combine_labels(derived.koreksi.as_deref(), derived.obyek.as_deref());

    if row.credit > 0.0 {
        for rule in rules.withholding_rules() {
            if description.contains(&rule.keyword) {
                let amount = round_cents(row.credit * rule.rate);
                if !amount.is_finite() {
                    return Err(ClassifyError::NonFiniteTax { flag: rule.flag });
                }
                derived.buckets.set(rule.flag, Some(amount));
            }
        }
    }

    if row.debit > 0.0 && rules.input_keywords().iter().any(|k| description.contains(k)) {
        derived.buckets.set(TaxFlag::InputTax, Some(row.debit));
    }

    if row.credit > 0.0 && rules.output_keywords().iter().any(|k| description.contains(k)) {
        derived.buckets.set(TaxFlag::OutputTax, Some(row.credit));
    }

    // Advance-tax debit stays unset until its rule exists.
    derived.buckets.set(TaxFlag::AdvanceTax, None);

    derived.additional_analysis = account
        .map(|acc| acc.analysis_note.clone())
        .filter(|note| !note.is_empty());

    Ok(derived)
}
