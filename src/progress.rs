//! Progress surface read by polling clients. Writers never wait on readers; each key is
//! last-write-wins.

use std::sync::Arc;

use dashmap::DashMap;
use rusqlite::{Connection, OptionalExtension};

use crate::error::Result;

pub trait ProgressSink {
    fn publish(&self, key: &str, percentage: f64) -> Result<()>;
}

pub fn progress_key(batch_id: i64) -> String {
    format!("processing:progress:{batch_id}")
}

pub fn format_percentage(percentage: f64) -> String {
    format!("{percentage:.2}")
}

/// In-process progress for pollers living in the same process (the job queue).
#[derive(Clone, Default)]
pub struct MemoryProgress {
    store: Arc<DashMap<String, String>>,
}

impl MemoryProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.store.get(key).map(|v| v.value().clone())
    }
}

impl ProgressSink for MemoryProgress {
    fn publish(&self, key: &str, percentage: f64) -> Result<()> {
        self.store.insert(key.to_string(), format_percentage(percentage));
        Ok(())
    }
}

/// Progress kept in the database so that `jurnal status` in another process can poll it.
pub struct SqliteProgress<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteProgress<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM progress WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }
}

impl ProgressSink for SqliteProgress<'_> {
    fn publish(&self, key: &str, percentage: f64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO progress (key, value, updated_at) VALUES (?1, ?2, datetime('now')) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, format_percentage(percentage)],
        )?;
        Ok(())
    }
}

/// Publishes to several sinks; the first error is returned after every sink has been tried.
pub struct Fanout<'a> {
    sinks: Vec<&'a dyn ProgressSink>,
}

impl<'a> Fanout<'a> {
    pub fn new(sinks: Vec<&'a dyn ProgressSink>) -> Self {
        Self { sinks }
    }
}

impl ProgressSink for Fanout<'_> {
    fn publish(&self, key: &str, percentage: f64) -> Result<()> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.publish(key, percentage) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
