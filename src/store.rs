use rusqlite::{Connection, Row};

use crate::classifier::combine_labels;
use crate::error::{JurnalError, Result};
use crate::models::{
    Account, Batch, BatchStatus, ClassifiedRow, Derived, JournalRow, KoreksiRule, ObyekRule,
    RowOutcome, TaxBuckets, TaxKeyword, WithholdingTaxRule,
};
use crate::propagator::{propagate, BucketUpdate};
use crate::rules::{RuleSet, RuleSource};

pub trait TransactionStore {
    /// Next rows of the batch that have neither been classified nor failed, by ascending id.
    fn unprocessed_page(&self, batch_id: i64, page_size: usize) -> Result<Vec<JournalRow>>;

    /// Write a whole page of outcomes in one bulk write; nothing is written on error.
    fn persist_page(&self, outcomes: &[(i64, RowOutcome)]) -> Result<()>;

    /// Run the propagation pass over the batch. Returns the number of bucket writes.
    fn propagate_by_document_number(&self, batch_id: i64, rules: &RuleSet) -> Result<usize>;
}

pub trait BatchStore {
    fn batch(&self, batch_id: i64) -> Result<Batch>;

    /// Only the status column, for the per-page cancellation check.
    fn status(&self, batch_id: i64) -> Result<BatchStatus>;

    fn update_progress(&self, batch_id: i64, processed: i64, failed: i64) -> Result<()>;
    fn set_status(&self, batch_id: i64, status: BatchStatus, message: Option<&str>) -> Result<()>;

    /// Move an `uploaded` or interrupted `processing` batch to `processing`.
    /// Returns false when the batch became terminal (e.g. canceled) in the meantime.
    fn start_processing(&self, batch_id: i64) -> Result<bool>;

    /// Mark the batch completed unless something else (a cancel) moved it out of
    /// `processing` first. Returns whether the batch was completed.
    fn complete_if_processing(&self, batch_id: i64, message: Option<&str>) -> Result<bool>;

    /// Returns false when the batch is already terminal.
    fn cancel(&self, batch_id: i64) -> Result<bool>;
}

pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

const ROW_COLUMNS: &str = "id, batch_id, document_type, document_number, posting_date, account_code, \
     account_name, description, debit, credit, net";

const DERIVED_COLUMNS: &str = "nature, koreksi, obyek, koreksi_obyek, wth_21_cr, wth_23_cr, \
     wth_26_cr, wth_4_2_cr, wth_15_cr, pk_cr, pm_db, um_pajak_db, additional_analysis, \
     is_processed, processing_error";

fn journal_row(row: &Row) -> rusqlite::Result<JournalRow> {
    Ok(JournalRow {
        id: row.get(0)?,
        batch_id: row.get(1)?,
        document_type: row.get(2)?,
        document_number: row.get(3)?,
        posting_date: row.get(4)?,
        account_code: row.get(5)?,
        account_name: row.get(6)?,
        description: row.get(7)?,
        debit: row.get(8)?,
        credit: row.get(9)?,
        net: row.get(10)?,
    })
}

fn classified_row(row: &Row) -> rusqlite::Result<ClassifiedRow> {
    Ok(ClassifiedRow {
        row: journal_row(row)?,
        derived: Derived {
            nature: row.get(11)?,
            koreksi: row.get(12)?,
            obyek: row.get(13)?,
            koreksi_obyek: row.get(14)?,
            buckets: TaxBuckets {
                wth_21: row.get(15)?,
                wth_23: row.get(16)?,
                wth_26: row.get(17)?,
                wth_4_2: row.get(18)?,
                wth_15: row.get(19)?,
                pk_cr: row.get(20)?,
                pm_db: row.get(21)?,
                um_pajak_db: row.get(22)?,
            },
            additional_analysis: row.get(23)?,
        },
        is_processed: row.get::<_, i64>(24)? != 0,
        processing_error: row.get(25)?,
    })
}

fn batch_row(row: &Row) -> rusqlite::Result<(i64, String, i64, i64, i64, String, Option<String>)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn list_batches(&self) -> Result<Vec<Batch>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, filename, total_rows, processed_rows, failed_rows, status, error_message \
             FROM batches ORDER BY id",
        )?;
        let raw = stmt
            .query_map([], batch_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        raw.into_iter().map(into_batch).collect()
    }

    /// All rows of a batch with their derived attributes, by ascending id.
    pub fn classified_rows(&self, batch_id: i64) -> Result<Vec<ClassifiedRow>> {
        let sql = format!(
            "SELECT {ROW_COLUMNS}, {DERIVED_COLUMNS} FROM transactions WHERE batch_id = ?1 ORDER BY id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([batch_id], classified_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Manual, row-local override of koreksi/obyek. The combined label follows; nothing
    /// else in the document changes.
    pub fn set_row_labels(&self, row_id: i64, koreksi: Option<&str>, obyek: Option<&str>) -> Result<()> {
        let koreksi = koreksi.filter(|k| !k.is_empty());
        let obyek = obyek.filter(|o| !o.is_empty());
        let changed = self.conn.execute(
            "UPDATE transactions SET koreksi = ?1, obyek = ?2, koreksi_obyek = ?3 WHERE id = ?4",
            rusqlite::params![koreksi, obyek, combine_labels(koreksi, obyek), row_id],
        )?;
        if changed == 0 {
            return Err(JurnalError::Other(format!("No transaction with ID {row_id}")));
        }
        Ok(())
    }

    fn apply_updates(&self, updates: &[BucketUpdate]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for update in updates {
            let sql = format!("UPDATE transactions SET {} = ?1 WHERE id = ?2", update.flag.column());
            tx.prepare_cached(&sql)?
                .execute(rusqlite::params![update.value, update.row_id])?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn into_batch(raw: (i64, String, i64, i64, i64, String, Option<String>)) -> Result<Batch> {
    let (id, filename, total_rows, processed_rows, failed_rows, status, error_message) = raw;
    Ok(Batch {
        id,
        filename,
        total_rows,
        processed_rows,
        failed_rows,
        status: status.parse()?,
        error_message,
    })
}

impl RuleSource for SqliteStore<'_> {
    fn active_accounts(&self) -> Result<Vec<Account>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, account_code, account_name, COALESCE(nature, ''), COALESCE(correction_tag, ''), \
             COALESCE(analysis_note, '') FROM accounts WHERE is_active = 1 ORDER BY account_code",
        )?;
        let accounts = stmt
            .query_map([], |row| {
                Ok(Account {
                    id: row.get(0)?,
                    code: row.get(1)?,
                    name: row.get(2)?,
                    nature: row.get(3)?,
                    correction_tag: row.get(4)?,
                    analysis_note: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(accounts)
    }

    fn active_koreksi_rules(&self) -> Result<Vec<KoreksiRule>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, keyword, value, exclusion_value FROM koreksi_rules \
             WHERE is_active = 1 ORDER BY id DESC",
        )?;
        let rules = stmt
            .query_map([], |row| {
                Ok(KoreksiRule {
                    id: row.get(0)?,
                    keyword: row.get(1)?,
                    value: row.get(2)?,
                    exclusion_value: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rules)
    }

    fn active_obyek_rules(&self) -> Result<Vec<ObyekRule>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, keyword, value, exclusion_value FROM obyek_rules \
             WHERE is_active = 1 ORDER BY id DESC",
        )?;
        let rules = stmt
            .query_map([], |row| {
                Ok(ObyekRule {
                    id: row.get(0)?,
                    keyword: row.get(1)?,
                    value: row.get(2)?,
                    exclusion_value: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rules)
    }

    fn active_withholding_tax_rules(&self) -> Result<Vec<WithholdingTaxRule>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, keyword, tax_type, rate, priority FROM withholding_tax_rules \
             WHERE is_active = 1 ORDER BY priority DESC, id",
        )?;
        let rules = stmt
            .query_map([], |row| {
                Ok(WithholdingTaxRule {
                    id: row.get(0)?,
                    keyword: row.get(1)?,
                    tax_type: row.get(2)?,
                    rate: row.get(3)?,
                    priority: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rules)
    }

    fn active_tax_keywords(&self) -> Result<Vec<TaxKeyword>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, keyword, category, priority FROM tax_keywords \
             WHERE is_active = 1 ORDER BY priority DESC, id",
        )?;
        let keywords = stmt
            .query_map([], |row| {
                Ok(TaxKeyword {
                    id: row.get(0)?,
                    keyword: row.get(1)?,
                    category: row.get(2)?,
                    priority: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keywords)
    }
}

impl TransactionStore for SqliteStore<'_> {
    fn unprocessed_page(&self, batch_id: i64, page_size: usize) -> Result<Vec<JournalRow>> {
        let sql = format!(
            "SELECT {ROW_COLUMNS} FROM transactions \
             WHERE batch_id = ?1 AND is_processed = 0 AND processing_error IS NULL \
             ORDER BY id LIMIT ?2"
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params![batch_id, page_size as i64], journal_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn persist_page(&self, outcomes: &[(i64, RowOutcome)]) -> Result<()> {
        if outcomes.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut classified = tx.prepare_cached(
                "UPDATE transactions SET nature = ?1, koreksi = ?2, obyek = ?3, koreksi_obyek = ?4, \
                 wth_21_cr = ?5, wth_23_cr = ?6, wth_26_cr = ?7, wth_4_2_cr = ?8, wth_15_cr = ?9, \
                 pk_cr = ?10, pm_db = ?11, um_pajak_db = ?12, additional_analysis = ?13, \
                 is_processed = 1, processing_error = NULL WHERE id = ?14",
            )?;
            let mut failed = tx.prepare_cached(
                "UPDATE transactions SET is_processed = 0, processing_error = ?1 WHERE id = ?2",
            )?;
            for (row_id, outcome) in outcomes {
                match outcome {
                    RowOutcome::Classified(d) => {
                        let b = &d.buckets;
                        classified.execute(rusqlite::params![
                            d.nature,
                            d.koreksi,
                            d.obyek,
                            d.koreksi_obyek,
                            b.wth_21,
                            b.wth_23,
                            b.wth_26,
                            b.wth_4_2,
                            b.wth_15,
                            b.pk_cr,
                            b.pm_db,
                            b.um_pajak_db,
                            d.additional_analysis,
                            row_id,
                        ])?;
                    }
                    RowOutcome::Failed(message) => {
                        failed.execute(rusqlite::params![message, row_id])?;
                    }
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn propagate_by_document_number(&self, batch_id: i64, rules: &RuleSet) -> Result<usize> {
        let rows = self.classified_rows(batch_id)?;
        let updates = propagate(&rows, rules);
        if !updates.is_empty() {
            self.apply_updates(&updates)?;
        }
        Ok(updates.len())
    }
}

impl BatchStore for SqliteStore<'_> {
    fn batch(&self, batch_id: i64) -> Result<Batch> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, filename, total_rows, processed_rows, failed_rows, status, error_message \
                 FROM batches WHERE id = ?1",
                [batch_id],
                batch_row,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => JurnalError::UnknownBatch(batch_id),
                other => JurnalError::Db(other),
            })?;
        into_batch(raw)
    }

    fn status(&self, batch_id: i64) -> Result<BatchStatus> {
        let status: String = self
            .conn
            .query_row("SELECT status FROM batches WHERE id = ?1", [batch_id], |row| row.get(0))
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => JurnalError::UnknownBatch(batch_id),
                other => JurnalError::Db(other),
            })?;
        status.parse()
    }

    fn update_progress(&self, batch_id: i64, processed: i64, failed: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE batches SET processed_rows = ?1, failed_rows = ?2, updated_at = datetime('now') \
             WHERE id = ?3",
            rusqlite::params![processed, failed, batch_id],
        )?;
        Ok(())
    }

    fn set_status(&self, batch_id: i64, status: BatchStatus, message: Option<&str>) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE batches SET status = ?1, error_message = ?2, updated_at = datetime('now') WHERE id = ?3",
            rusqlite::params![status.as_str(), message, batch_id],
        )?;
        if changed == 0 {
            return Err(JurnalError::UnknownBatch(batch_id));
        }
        Ok(())
    }

    fn start_processing(&self, batch_id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE batches SET status = 'processing', error_message = NULL, updated_at = datetime('now') \
             WHERE id = ?1 AND status IN ('uploaded', 'processing')",
            [batch_id],
        )?;
        Ok(changed > 0)
    }

    fn complete_if_processing(&self, batch_id: i64, message: Option<&str>) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE batches SET status = 'completed', error_message = ?1, updated_at = datetime('now') \
             WHERE id = ?2 AND status = 'processing'",
            rusqlite::params![message, batch_id],
        )?;
        Ok(changed > 0)
    }

    fn cancel(&self, batch_id: i64) -> Result<bool> {
        // Surfaces UnknownBatch for a bad id.
        self.batch(batch_id)?;
        let changed = self.conn.execute(
            "UPDATE batches SET status = 'canceled', updated_at = datetime('now') \
             WHERE id = ?1 AND status IN ('uploaded', 'processing')",
            [batch_id],
        )?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{add_account, add_koreksi_rule, add_withholding_rule, create_batch, get_connection, init_db};
    use crate::models::{NewRow, TaxFlag};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn new_row(doc: &str, account: &str, description: &str, debit: f64, credit: f64) -> NewRow {
        NewRow {
            document_type: "JV".into(),
            document_number: doc.into(),
            posting_date: "2025-03-01".into(),
            account_code: account.into(),
            account_name: String::new(),
            description: description.into(),
            debit,
            credit,
        }
    }

    #[test]
    fn test_rule_lists_in_scan_order() {
        let (_dir, conn) = test_db();
        add_koreksi_rule(&conn, "pph", "A", None).unwrap();
        add_koreksi_rule(&conn, "pph 21", "B", Some("Non Koreksi")).unwrap();
        add_withholding_rule(&conn, "sewa", "wth_4_2", 0.1, 1).unwrap();
        add_withholding_rule(&conn, "jasa", "wth_23", 0.02, 5).unwrap();
        conn.execute("UPDATE koreksi_rules SET is_active = 0 WHERE value = 'A'", []).unwrap();
        add_koreksi_rule(&conn, "biaya", "C", None).unwrap();

        let store = SqliteStore::new(&conn);
        let koreksi = store.active_koreksi_rules().unwrap();
        let values: Vec<&str> = koreksi.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, vec!["C", "B"]);
        assert_eq!(koreksi[0].exclusion_value, None);
        assert_eq!(koreksi[1].exclusion_value.as_deref(), Some("Non Koreksi"));
        let wht: Vec<String> = store
            .active_withholding_tax_rules()
            .unwrap()
            .into_iter()
            .map(|r| r.keyword)
            .collect();
        assert_eq!(wht, vec!["jasa", "sewa"]);
    }

    #[test]
    fn test_inactive_accounts_not_loaded() {
        let (_dir, conn) = test_db();
        add_account(&conn, "1100", "Kas", "Asset", None, None).unwrap();
        add_account(&conn, "1200", "Bank", "Asset", None, None).unwrap();
        conn.execute("UPDATE accounts SET is_active = 0 WHERE account_code = '1200'", []).unwrap();
        let accounts = SqliteStore::new(&conn).active_accounts().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].code, "1100");
        assert_eq!(accounts[0].correction_tag, "");
    }

    #[test]
    fn test_page_excludes_processed_and_failed_rows() {
        let (_dir, conn) = test_db();
        let batch_id = create_batch(
            &conn,
            "feb.xlsx",
            &[
                new_row("D1", "1100", "a", 1.0, 0.0),
                new_row("D1", "1100", "b", 1.0, 0.0),
                new_row("D1", "1100", "c", 1.0, 0.0),
            ],
        )
        .unwrap();
        let store = SqliteStore::new(&conn);
        let page = store.unprocessed_page(batch_id, 10).unwrap();
        assert_eq!(page.len(), 3);
        assert!(page.windows(2).all(|w| w[0].id < w[1].id));

        store
            .persist_page(&[
                (page[0].id, RowOutcome::Classified(Derived::default())),
                (page[1].id, RowOutcome::Failed("bad amount".into())),
            ])
            .unwrap();

        let rest = store.unprocessed_page(batch_id, 10).unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].description, "c");

        let rows = store.classified_rows(batch_id).unwrap();
        assert!(rows[0].is_processed);
        assert!(!rows[1].is_processed);
        assert_eq!(rows[1].processing_error.as_deref(), Some("bad amount"));
    }

    #[test]
    fn test_page_size_limits_rows() {
        let (_dir, conn) = test_db();
        let rows: Vec<NewRow> = (0..5).map(|i| new_row("D", "1100", &format!("r{i}"), 1.0, 0.0)).collect();
        let batch_id = create_batch(&conn, "x.xlsx", &rows).unwrap();
        let page = SqliteStore::new(&conn).unprocessed_page(batch_id, 2).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].description, "r0");
    }

    #[test]
    fn test_null_and_zero_buckets_survive_storage() {
        let (_dir, conn) = test_db();
        let batch_id = create_batch(&conn, "x.xlsx", &[new_row("D1", "1100", "a", 0.0, 10.0)]).unwrap();
        let store = SqliteStore::new(&conn);
        let id = store.unprocessed_page(batch_id, 1).unwrap()[0].id;
        let mut derived = Derived::default();
        derived.buckets.wth_26 = Some(0.0);
        store.persist_page(&[(id, RowOutcome::Classified(derived))]).unwrap();

        let row = &store.classified_rows(batch_id).unwrap()[0];
        assert_eq!(row.derived.buckets.wth_26, Some(0.0));
        assert_eq!(row.derived.buckets.wth_21, None);
    }

    #[test]
    fn test_propagation_writes_only_buckets() {
        let (_dir, conn) = test_db();
        add_account(&conn, "2140", "Utang PPh 21", "Liability", Some(TaxFlag::Wth21), None).unwrap();
        add_account(&conn, "6100", "Beban Gaji", "Expense", None, None).unwrap();
        let batch_id = create_batch(
            &conn,
            "x.xlsx",
            &[
                new_row("D1", "2140", "utang pph 21", 0.0, 500_000.0),
                new_row("D1", "6100", "gaji", 500_000.0, 0.0),
            ],
        )
        .unwrap();
        let store = SqliteStore::new(&conn);
        let page = store.unprocessed_page(batch_id, 10).unwrap();
        let labelled = Derived {
            koreksi: Some("Koreksi Positif".into()),
            ..Default::default()
        };
        store
            .persist_page(&[
                (page[0].id, RowOutcome::Classified(Derived::default())),
                (page[1].id, RowOutcome::Classified(labelled)),
            ])
            .unwrap();

        let rules = RuleSet::load(&store).unwrap();
        assert_eq!(store.propagate_by_document_number(batch_id, &rules).unwrap(), 2);
        let rows = store.classified_rows(batch_id).unwrap();
        assert_eq!(rows[0].derived.buckets.wth_21, Some(500_000.0));
        assert_eq!(rows[1].derived.buckets.wth_21, Some(500_000.0));
        assert_eq!(rows[1].derived.koreksi.as_deref(), Some("Koreksi Positif"));
        assert_eq!(rows[0].derived.koreksi, None);

        assert_eq!(store.propagate_by_document_number(batch_id, &rules).unwrap(), 0);
        assert_eq!(store.classified_rows(batch_id).unwrap(), rows);
    }

    #[test]
    fn test_status_transitions() {
        let (_dir, conn) = test_db();
        let batch_id = create_batch(&conn, "x.xlsx", &[]).unwrap();
        let store = SqliteStore::new(&conn);
        assert_eq!(store.batch(batch_id).unwrap().status, BatchStatus::Uploaded);

        assert!(!store.complete_if_processing(batch_id, None).unwrap());
        assert!(store.start_processing(batch_id).unwrap());
        assert_eq!(store.status(batch_id).unwrap(), BatchStatus::Processing);
        // An interrupted run may start again.
        assert!(store.start_processing(batch_id).unwrap());
        assert!(store.cancel(batch_id).unwrap());
        assert!(!store.complete_if_processing(batch_id, None).unwrap());
        assert!(!store.start_processing(batch_id).unwrap());
        assert_eq!(store.status(batch_id).unwrap(), BatchStatus::Canceled);
        assert!(!store.cancel(batch_id).unwrap());
    }

    #[test]
    fn test_unknown_batch() {
        let (_dir, conn) = test_db();
        let store = SqliteStore::new(&conn);
        assert!(matches!(store.batch(42), Err(JurnalError::UnknownBatch(42))));
        assert!(matches!(store.status(42), Err(JurnalError::UnknownBatch(42))));
        assert!(matches!(store.cancel(42), Err(JurnalError::UnknownBatch(42))));
    }

    #[test]
    fn test_set_row_labels_is_row_local() {
        let (_dir, conn) = test_db();
        let batch_id = create_batch(
            &conn,
            "x.xlsx",
            &[new_row("D1", "1100", "a", 1.0, 0.0), new_row("D1", "1100", "b", 0.0, 1.0)],
        )
        .unwrap();
        let store = SqliteStore::new(&conn);
        let rows = store.classified_rows(batch_id).unwrap();
        store.set_row_labels(rows[0].row.id, Some("K"), Some("O")).unwrap();
        let rows = store.classified_rows(batch_id).unwrap();
        assert_eq!(rows[0].derived.koreksi_obyek.as_deref(), Some("K - O"));
        assert_eq!(rows[1].derived.koreksi_obyek, None);

        store.set_row_labels(rows[0].row.id, None, Some("O")).unwrap();
        let rows = store.classified_rows(batch_id).unwrap();
        assert_eq!(rows[0].derived.koreksi, None);
        assert_eq!(rows[0].derived.koreksi_obyek.as_deref(), Some("O"));

        assert!(store.set_row_labels(9_999, Some("K"), None).is_err());
    }
}
