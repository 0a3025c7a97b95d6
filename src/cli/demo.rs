use chrono::{Datelike, Local, NaiveDate};
use rusqlite::Connection;

use crate::db::{
    add_account, add_koreksi_rule, add_obyek_rule, add_tax_keyword, add_withholding_rule,
    create_batch, get_connection, init_db,
};
use crate::error::Result;
use crate::models::{NewRow, TaxCategory, TaxFlag};
use crate::settings::get_db_path;

const DEMO_FILE: &str = "demo-journal.xlsx";

struct DemoAccount {
    code: &'static str,
    name: &'static str,
    nature: &'static str,
    tag: Option<TaxFlag>,
    note: Option<&'static str>,
}

const ACCOUNTS: &[DemoAccount] = &[
    DemoAccount { code: "1110", name: "Kas", nature: "Asset", tag: None, note: None },
    DemoAccount { code: "1150", name: "PPN Masukan", nature: "Asset", tag: Some(TaxFlag::InputTax), note: None },
    DemoAccount { code: "1160", name: "Uang Muka Pajak", nature: "Asset", tag: Some(TaxFlag::AdvanceTax), note: None },
    DemoAccount { code: "2140", name: "Utang PPh 21", nature: "Liability", tag: Some(TaxFlag::Wth21), note: None },
    DemoAccount { code: "2141", name: "Utang PPh 23", nature: "Liability", tag: Some(TaxFlag::Wth23), note: None },
    DemoAccount { code: "2142", name: "Utang PPh 4(2)", nature: "Liability", tag: Some(TaxFlag::Wth42), note: None },
    DemoAccount { code: "2150", name: "PPN Keluaran", nature: "Liability", tag: Some(TaxFlag::OutputTax), note: None },
    DemoAccount { code: "4100", name: "Pendapatan Jasa", nature: "Revenue", tag: None, note: None },
    DemoAccount {
        code: "6100",
        name: "Beban Gaji",
        nature: "Expense",
        tag: None,
        note: Some("Rekonsiliasi dengan SPT Masa PPh 21"),
    },
    DemoAccount { code: "6200", name: "Beban Sewa", nature: "Expense", tag: None, note: None },
    DemoAccount {
        code: "6300",
        name: "Beban Jamuan",
        nature: "Expense",
        tag: None,
        note: Some("Daftar nominatif wajib dilampirkan"),
    },
    DemoAccount { code: "6400", name: "Sumbangan", nature: "Expense", tag: None, note: None },
];

const KOREKSI: &[(&str, &str)] = &[
    ("jamuan", "Koreksi Positif"),
    ("sumbangan", "Koreksi Positif"),
    ("bunga deposito", "Koreksi Negatif"),
];

const OBYEK: &[(&str, &str)] = &[
    ("gaji", "Obyek PPh 21"),
    ("sewa", "Obyek PPh 4(2)"),
    ("jasa", "Obyek PPh 23"),
];

/// (keyword, tax type, rate)
const WITHHOLDING: &[(&str, &str, f64)] = &[
    ("pph 21", "wth_21", 0.05),
    ("pph 23", "wth_23", 0.02),
    ("pph 4(2)", "wth_4_2", 0.10),
];

const TAX_KEYWORDS: &[(&str, TaxCategory)] = &[
    ("ppn masukan", TaxCategory::Input),
    ("ppn keluaran", TaxCategory::Output),
];

/// (document, day, account, description, debit, credit)
type DemoLine = (&'static str, u32, &'static str, &'static str, f64, f64);

const LINES: &[DemoLine] = &[
    ("JV-001", 25, "6100", "Gaji karyawan", 10_000_000.0, 0.0),
    ("JV-001", 25, "2140", "PPh 21 gaji karyawan", 0.0, 500_000.0),
    ("JV-001", 25, "1110", "Kas keluar gaji", 0.0, 9_500_000.0),
    ("JV-002", 3, "6200", "Sewa kantor", 20_000_000.0, 0.0),
    ("JV-002", 3, "2142", "PPh 4(2) sewa kantor", 0.0, 2_000_000.0),
    ("JV-002", 3, "1110", "Bayar sewa", 0.0, 18_000_000.0),
    ("JV-003", 12, "6300", "Jamuan klien", 1_500_000.0, 0.0),
    ("JV-003", 12, "1150", "PPN Masukan jamuan", 165_000.0, 0.0),
    ("JV-003", 12, "1110", "Bayar jamuan", 0.0, 1_665_000.0),
    ("JV-004", 18, "1110", "Penerimaan jasa", 11_100_000.0, 0.0),
    ("JV-004", 18, "4100", "Pendapatan jasa konsultan PPh 23", 0.0, 10_000_000.0),
    ("JV-004", 18, "2150", "PPN Keluaran jasa", 0.0, 1_100_000.0),
    ("JV-005", 20, "6400", "Sumbangan bencana", 2_500_000.0, 0.0),
    ("JV-005", 20, "1110", "Kas keluar sumbangan", 0.0, 2_500_000.0),
    ("", 28, "1110", "Selisih kas", 100.0, 0.0),
];

fn demo_rows() -> Vec<NewRow> {
    let today = Local::now().date_naive();
    LINES
        .iter()
        .map(|&(doc, day, account, description, debit, credit)| {
            let date = NaiveDate::from_ymd_opt(today.year(), today.month(), day).unwrap_or(today);
            let account_name = ACCOUNTS
                .iter()
                .find(|a| a.code == account)
                .map(|a| a.name)
                .unwrap_or_default();
            NewRow {
                document_type: "JV".to_string(),
                document_number: doc.to_string(),
                posting_date: date.format("%Y-%m-%d").to_string(),
                account_code: account.to_string(),
                account_name: account_name.to_string(),
                description: description.to_string(),
                debit,
                credit,
            }
        })
        .collect()
}

/// Seed accounts, rules and one uploaded batch. Returns the batch id.
pub fn insert_demo_data(conn: &Connection) -> Result<i64> {
    for acc in ACCOUNTS {
        add_account(conn, acc.code, acc.name, acc.nature, acc.tag, acc.note)?;
    }
    for (keyword, value) in KOREKSI {
        add_koreksi_rule(conn, keyword, value, None)?;
    }
    for (keyword, value) in OBYEK {
        add_obyek_rule(conn, keyword, value, None)?;
    }
    for (keyword, tax_type, rate) in WITHHOLDING {
        add_withholding_rule(conn, keyword, tax_type, *rate, 10)?;
    }
    for (keyword, category) in TAX_KEYWORDS {
        add_tax_keyword(conn, keyword, *category, 10)?;
    }
    create_batch(conn, DEMO_FILE, &demo_rows())
}

pub fn run() -> Result<()> {
    let db_path = get_db_path();

    if !db_path.exists() {
        eprintln!("No database found. Run `jurnal init` first.");
        std::process::exit(1);
    }

    let conn = get_connection(&db_path)?;
    init_db(&conn)?;

    // Idempotency guard
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM batches WHERE filename = ?1)",
        [DEMO_FILE],
        |r| r.get(0),
    )?;
    if exists {
        println!("Demo data already loaded (batch '{DEMO_FILE}' exists).");
        return Ok(());
    }

    let batch_id = insert_demo_data(&conn)?;

    println!("Demo data loaded!");
    println!("  Accounts:  {}", ACCOUNTS.len());
    println!(
        "  Rules:     {}",
        KOREKSI.len() + OBYEK.len() + WITHHOLDING.len() + TAX_KEYWORDS.len()
    );
    println!("  Batch:     {batch_id} ({} rows)", LINES.len());
    println!();
    println!("Try these next:");
    println!("  jurnal process {batch_id}");
    println!("  jurnal status {batch_id}");
    println!("  jurnal rows {batch_id}");
    println!("  jurnal rules list");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassifiedRow;
    use crate::processor::{BatchProcessor, RunOutcome};
    use crate::progress::MemoryProgress;
    use crate::store::SqliteStore;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn in_doc<'a>(rows: &'a [ClassifiedRow], doc: &'a str) -> impl Iterator<Item = &'a ClassifiedRow> {
        rows.iter().filter(move |r| r.row.document_number == doc)
    }

    #[test]
    fn test_demo_batch_classifies_end_to_end() {
        let (_dir, conn) = test_db();
        let batch_id = insert_demo_data(&conn).unwrap();
        let store = SqliteStore::new(&conn);
        let progress = MemoryProgress::new();

        let outcome = BatchProcessor::new(&store, &progress, 5000).run(batch_id).unwrap();
        assert!(matches!(outcome, RunOutcome::Completed(_)));

        let rows = store.classified_rows(batch_id).unwrap();
        assert_eq!(rows.len(), LINES.len());

        // Payroll: 5% of the PPh 21 line's credit, spread over the whole document.
        for r in in_doc(&rows, "JV-001") {
            assert_eq!(r.derived.buckets.wth_21, Some(25_000.0));
        }
        // Rent: 10% of 2,000,000.
        for r in in_doc(&rows, "JV-002") {
            assert_eq!(r.derived.buckets.wth_4_2, Some(200_000.0));
        }
        // Entertainment: input tax from the PM DB line; koreksi stays on the matching rows.
        for r in in_doc(&rows, "JV-003") {
            assert_eq!(r.derived.buckets.pm_db, Some(165_000.0));
        }
        let jamuan = in_doc(&rows, "JV-003").next().unwrap();
        assert_eq!(jamuan.derived.koreksi.as_deref(), Some("Koreksi Positif"));
        assert_eq!(
            jamuan.derived.additional_analysis.as_deref(),
            Some("Daftar nominatif wajib dilampirkan")
        );
        // Sale: output tax from the PK Cr line.
        for r in in_doc(&rows, "JV-004") {
            assert_eq!(r.derived.buckets.pk_cr, Some(1_100_000.0));
        }
        let revenue = in_doc(&rows, "JV-004").nth(1).unwrap();
        assert_eq!(revenue.derived.buckets.wth_23, Some(200_000.0));
        assert_eq!(revenue.derived.koreksi_obyek.as_deref(), Some("Obyek PPh 23"));
        // The undocumented line is left alone.
        let loose = rows.iter().find(|r| r.row.document_number.is_empty()).unwrap();
        assert_eq!(loose.derived.buckets, Default::default());
    }
}
