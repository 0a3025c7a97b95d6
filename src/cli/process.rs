use std::time::Duration;

use crossbeam::channel::RecvTimeoutError;

use crate::db::get_connection;
use crate::error::{JurnalError, Result};
use crate::processor::{repropagate, BatchProcessor, RunOutcome};
use crate::progress::{progress_key, SqliteProgress};
use crate::queue::JobQueue;
use crate::settings::{get_db_path, load_settings};
use crate::store::{BatchStore, SqliteStore};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

fn report(batch_id: i64, outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Skipped(status) => {
            println!("Batch {batch_id} is already {status}; nothing to do.");
        }
        RunOutcome::Canceled(stats) => {
            println!(
                "Batch {batch_id} canceled: {} processed, {} failed.",
                stats.processed, stats.failed
            );
        }
        RunOutcome::Completed(stats) => {
            println!(
                "Batch {batch_id} completed: {} processed, {} failed.",
                stats.processed, stats.failed
            );
            if !stats.propagated {
                println!("  Document propagation failed. Retry with `jurnal propagate {batch_id}`.");
            }
        }
    }
}

/// One id runs in the foreground; several run on the worker pool.
pub fn run(batch_ids: &[i64]) -> Result<()> {
    let settings = load_settings();
    let db_path = get_db_path();

    if let [batch_id] = batch_ids {
        let conn = get_connection(&db_path)?;
        let store = SqliteStore::new(&conn);
        let progress = SqliteProgress::new(&conn);
        let outcome = BatchProcessor::new(&store, &progress, settings.page_size).run(*batch_id)?;
        report(*batch_id, &outcome);
        return Ok(());
    }

    let queue = JobQueue::start(&db_path, settings.worker_concurrency.max(1), settings.page_size)?;
    let mut queued = Vec::new();
    for &batch_id in batch_ids {
        match queue.enqueue(batch_id) {
            Ok(()) => queued.push(batch_id),
            Err(e) => eprintln!("Skipping batch {batch_id}: {e}"),
        }
    }
    println!(
        "Queued {} batch(es) on {} worker(s).",
        queued.len(),
        settings.worker_concurrency.max(1)
    );

    let mut results = Vec::with_capacity(queued.len());
    while results.len() < queued.len() {
        match queue.results().recv_timeout(POLL_INTERVAL) {
            Ok(result) => results.push(result),
            Err(RecvTimeoutError::Timeout) => {
                for &batch_id in queued.iter().filter(|id| queue.is_active(**id)) {
                    if let Some(pct) = queue.progress().get(&progress_key(batch_id)) {
                        println!("  batch {batch_id}: {pct}%");
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    results.extend(queue.shutdown());
    results.sort_by_key(|r| r.batch_id);

    let mut failures = 0;
    for result in results {
        match &result.outcome {
            Ok(outcome) => report(result.batch_id, outcome),
            Err(e) => {
                failures += 1;
                eprintln!("Batch {} failed: {e}", result.batch_id);
            }
        }
    }
    if failures > 0 {
        return Err(JurnalError::Other(format!("{failures} batch(es) failed")));
    }
    Ok(())
}

pub fn cancel(batch_id: i64) -> Result<()> {
    let conn = get_connection(&get_db_path())?;
    let store = SqliteStore::new(&conn);
    if store.cancel(batch_id)? {
        println!("Canceled batch {batch_id}.");
    } else {
        let status = store.batch(batch_id)?.status;
        println!("Batch {batch_id} is already {status}.");
    }
    Ok(())
}

/// Re-run the propagation pass, e.g. after it failed at the end of a run.
pub fn propagate(batch_id: i64) -> Result<()> {
    let conn = get_connection(&get_db_path())?;
    let updates = repropagate(&SqliteStore::new(&conn), batch_id)?;
    println!("Propagated batch {batch_id}: {updates} bucket update(s).");
    Ok(())
}
