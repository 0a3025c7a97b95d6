use super::status_label;
use crate::db::get_connection;
use crate::error::Result;
use crate::progress::{progress_key, SqliteProgress};
use crate::settings::get_db_path;
use crate::store::{BatchStore, SqliteStore};

pub fn run(batch_id: i64) -> Result<()> {
    let db_path = get_db_path();
    if !db_path.exists() {
        println!("Database not found. Run `jurnal init` to set up.");
        return Ok(());
    }

    let conn = get_connection(&db_path)?;
    let batch = SqliteStore::new(&conn).batch(batch_id)?;
    let progress = SqliteProgress::new(&conn).get(&progress_key(batch_id))?;

    println!("Batch:      {}", batch.id);
    println!("File:       {}", batch.filename);
    println!("Status:     {}", status_label(batch.status));
    println!("Progress:   {}%", progress.as_deref().unwrap_or("0.00"));
    println!();
    println!("Total rows:  {}", batch.total_rows);
    println!("Processed:   {}", batch.processed_rows);
    println!("Failed:      {}", batch.failed_rows);
    if let Some(message) = batch.error_message {
        println!();
        println!("Message:     {message}");
    }
    Ok(())
}
