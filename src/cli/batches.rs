use comfy_table::{Cell, Table};

use super::status_label;
use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::{amount, bucket};
use crate::models::TaxFlag;
use crate::settings::get_db_path;
use crate::store::{BatchStore, SqliteStore};

pub fn list() -> Result<()> {
    let conn = get_connection(&get_db_path())?;
    let batches = SqliteStore::new(&conn).list_batches()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "File", "Status", "Rows", "Processed", "Failed"]);
    for b in batches {
        table.add_row(vec![
            Cell::new(b.id),
            Cell::new(b.filename),
            Cell::new(status_label(b.status)),
            Cell::new(b.total_rows),
            Cell::new(b.processed_rows),
            Cell::new(b.failed_rows),
        ]);
    }
    println!("Batches\n{table}");
    Ok(())
}

pub fn rows(batch_id: i64, errors_only: bool) -> Result<()> {
    let conn = get_connection(&get_db_path())?;
    let store = SqliteStore::new(&conn);
    store.batch(batch_id)?;
    let rows = store.classified_rows(batch_id)?;

    let mut table = Table::new();
    if errors_only {
        table.set_header(vec!["ID", "Document", "Account", "Description", "Error"]);
        for r in rows.into_iter().filter(|r| r.processing_error.is_some()) {
            table.add_row(vec![
                Cell::new(r.row.id),
                Cell::new(r.row.document_number),
                Cell::new(r.row.account_code),
                Cell::new(r.row.description),
                Cell::new(r.processing_error.unwrap_or_default()),
            ]);
        }
        println!("Failed rows\n{table}");
        return Ok(());
    }

    let mut header = vec![
        "ID", "Date", "Type", "Document", "Account", "Description", "Debit", "Credit", "Net", "Koreksi/Obyek",
    ];
    header.extend(TaxFlag::ALL.iter().map(|f| f.tag()));
    table.set_header(header);
    for r in rows {
        let mut cells = vec![
            Cell::new(r.row.id),
            Cell::new(&r.row.posting_date),
            Cell::new(&r.row.document_type),
            Cell::new(&r.row.document_number),
            Cell::new(format!("{} {}", r.row.account_code, r.row.account_name)),
            Cell::new(&r.row.description),
            Cell::new(amount(r.row.debit)),
            Cell::new(amount(r.row.credit)),
            Cell::new(amount(r.row.net)),
            Cell::new(r.derived.koreksi_obyek.as_deref().unwrap_or_default()),
        ];
        cells.extend(TaxFlag::ALL.iter().map(|f| Cell::new(bucket(r.derived.buckets.get(*f)))));
        table.add_row(cells);
    }
    println!("Rows of batch {batch_id}\n{table}");
    Ok(())
}

pub fn label(row_id: i64, koreksi: Option<&str>, obyek: Option<&str>) -> Result<()> {
    let conn = get_connection(&get_db_path())?;
    SqliteStore::new(&conn).set_row_labels(row_id, koreksi, obyek)?;
    println!(
        "Labelled row {row_id}: koreksi={}, obyek={}",
        koreksi.unwrap_or("-"),
        obyek.unwrap_or("-")
    );
    Ok(())
}
