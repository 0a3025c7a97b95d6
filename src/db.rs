use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use crate::error::Result;
use crate::models::{NewRow, TaxCategory, TaxFlag};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY,
    account_code TEXT NOT NULL UNIQUE,
    account_name TEXT NOT NULL,
    nature TEXT,
    correction_tag TEXT,
    analysis_note TEXT,
    is_active INTEGER DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS koreksi_rules (
    id INTEGER PRIMARY KEY,
    keyword TEXT NOT NULL,
    value TEXT NOT NULL,
    exclusion_value TEXT,
    is_active INTEGER DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS obyek_rules (
    id INTEGER PRIMARY KEY,
    keyword TEXT NOT NULL,
    value TEXT NOT NULL,
    exclusion_value TEXT,
    is_active INTEGER DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS withholding_tax_rules (
    id INTEGER PRIMARY KEY,
    keyword TEXT NOT NULL,
    tax_type TEXT NOT NULL,
    rate REAL NOT NULL,
    priority INTEGER DEFAULT 0,
    is_active INTEGER DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS tax_keywords (
    id INTEGER PRIMARY KEY,
    keyword TEXT NOT NULL,
    category TEXT NOT NULL,
    priority INTEGER DEFAULT 0,
    is_active INTEGER DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS batches (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    total_rows INTEGER NOT NULL DEFAULT 0,
    processed_rows INTEGER NOT NULL DEFAULT 0,
    failed_rows INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'uploaded',
    error_message TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    batch_id INTEGER NOT NULL,
    document_type TEXT NOT NULL DEFAULT '',
    document_number TEXT NOT NULL DEFAULT '',
    posting_date TEXT NOT NULL DEFAULT '',
    account_code TEXT NOT NULL DEFAULT '',
    account_name TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    debit REAL NOT NULL DEFAULT 0,
    credit REAL NOT NULL DEFAULT 0,
    net REAL NOT NULL DEFAULT 0,
    nature TEXT,
    koreksi TEXT,
    obyek TEXT,
    koreksi_obyek TEXT,
    wth_21_cr REAL,
    wth_23_cr REAL,
    wth_26_cr REAL,
    wth_4_2_cr REAL,
    wth_15_cr REAL,
    pk_cr REAL,
    pm_db REAL,
    um_pajak_db REAL,
    additional_analysis TEXT,
    is_processed INTEGER NOT NULL DEFAULT 0,
    processing_error TEXT,
    FOREIGN KEY (batch_id) REFERENCES batches(id)
);

CREATE INDEX IF NOT EXISTS idx_transactions_pending ON transactions (batch_id, is_processed, id);
CREATE INDEX IF NOT EXISTS idx_transactions_document ON transactions (batch_id, document_number);

CREATE TABLE IF NOT EXISTS progress (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT DEFAULT (datetime('now'))
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Store an uploaded batch and its rows in one transaction. Net is derived as debit - credit.
pub fn create_batch(conn: &Connection, filename: &str, rows: &[NewRow]) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO batches (filename, total_rows, status) VALUES (?1, ?2, 'uploaded')",
        rusqlite::params![filename, rows.len() as i64],
    )?;
    let batch_id = tx.last_insert_rowid();
    {
        let mut stmt = tx.prepare(
            "INSERT INTO transactions (batch_id, document_type, document_number, posting_date, \
             account_code, account_name, description, debit, credit, net) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for row in rows {
            stmt.execute(rusqlite::params![
                batch_id,
                row.document_type,
                row.document_number,
                row.posting_date,
                row.account_code,
                row.account_name,
                row.description,
                row.debit,
                row.credit,
                row.debit - row.credit,
            ])?;
        }
    }
    tx.commit()?;
    Ok(batch_id)
}

pub fn add_account(
    conn: &Connection,
    code: &str,
    name: &str,
    nature: &str,
    tag: Option<TaxFlag>,
    note: Option<&str>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO accounts (account_code, account_name, nature, correction_tag, analysis_note) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![code, name, nature, tag.map(|t| t.tag()), note],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn add_koreksi_rule(
    conn: &Connection,
    keyword: &str,
    value: &str,
    exclusion_value: Option<&str>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO koreksi_rules (keyword, value, exclusion_value) VALUES (?1, ?2, ?3)",
        rusqlite::params![keyword, value, exclusion_value],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn add_obyek_rule(
    conn: &Connection,
    keyword: &str,
    value: &str,
    exclusion_value: Option<&str>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO obyek_rules (keyword, value, exclusion_value) VALUES (?1, ?2, ?3)",
        rusqlite::params![keyword, value, exclusion_value],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn add_withholding_rule(
    conn: &Connection,
    keyword: &str,
    tax_type: &str,
    rate: f64,
    priority: i64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO withholding_tax_rules (keyword, tax_type, rate, priority) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![keyword, tax_type, rate, priority],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn add_tax_keyword(
    conn: &Connection,
    keyword: &str,
    category: TaxCategory,
    priority: i64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO tax_keywords (keyword, category, priority) VALUES (?1, ?2, ?3)",
        rusqlite::params![keyword, category.as_str(), priority],
    )?;
    Ok(conn.last_insert_rowid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &[
            "accounts",
            "koreksi_rules",
            "obyek_rules",
            "withholding_tax_rules",
            "tax_keywords",
            "batches",
            "transactions",
            "progress",
        ] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_create_batch_stores_rows_unprocessed() {
        let (_dir, conn) = test_db();
        let rows = vec![
            NewRow {
                document_number: "D1".into(),
                account_code: "1100".into(),
                description: "Kas".into(),
                debit: 250.0,
                ..Default::default()
            },
            NewRow {
                document_number: "D1".into(),
                account_code: "4100".into(),
                description: "Penjualan".into(),
                credit: 250.0,
                ..Default::default()
            },
        ];
        let batch_id = create_batch(&conn, "jan.xlsx", &rows).unwrap();

        let (total, status): (i64, String) = conn
            .query_row(
                "SELECT total_rows, status FROM batches WHERE id = ?1",
                [batch_id],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(status, "uploaded");

        let pending: i64 = conn
            .query_row(
                "SELECT count(*) FROM transactions WHERE batch_id = ?1 AND is_processed = 0",
                [batch_id],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(pending, 2);

        let net: f64 = conn
            .query_row(
                "SELECT net FROM transactions WHERE account_code = '4100'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(net, -250.0);
    }

    #[test]
    fn test_account_tag_stored_as_text() {
        let (_dir, conn) = test_db();
        add_account(&conn, "2140", "Utang PPh 21", "Liability", Some(TaxFlag::Wth21), None).unwrap();
        let tag: Option<String> = conn
            .query_row("SELECT correction_tag FROM accounts WHERE account_code = '2140'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(tag.as_deref(), Some("Wth 21 Cr"));
    }
}
