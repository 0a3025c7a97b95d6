use tracing::{error, info, warn};

use crate::classifier::classify;
use crate::error::{JurnalError, Result};
use crate::models::{BatchStatus, RowOutcome};
use crate::progress::{progress_key, ProgressSink};
use crate::rules::{RuleSet, RuleSource};
use crate::store::{BatchStore, TransactionStore};

pub const DEFAULT_PAGE_SIZE: usize = 5000;

/// Prefix of the batch message left when a run completes without propagation.
pub const PROPAGATION_CAVEAT: &str = "propagation failed";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub processed: i64,
    pub failed: i64,
    pub pages: usize,
    pub propagated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The batch was already terminal; nothing was touched.
    Skipped(BatchStatus),
    Canceled(RunStats),
    Completed(RunStats),
}

enum PageLoop {
    Exhausted,
    Canceled,
}

fn percentage(handled: i64, total: i64) -> f64 {
    if total <= 0 {
        100.0
    } else {
        (handled as f64 / total as f64 * 100.0).min(100.0)
    }
}

/// Drives one batch from `uploaded` (or an interrupted `processing`) to a terminal status.
///
/// Callers must not run two processors on the same batch at once.
pub struct BatchProcessor<'a, S, P: ?Sized> {
    store: &'a S,
    progress: &'a P,
    page_size: usize,
}

impl<'a, S, P> BatchProcessor<'a, S, P>
where
    S: RuleSource + TransactionStore + BatchStore,
    P: ProgressSink + ?Sized,
{
    pub fn new(store: &'a S, progress: &'a P, page_size: usize) -> Self {
        Self {
            store,
            progress,
            page_size: page_size.max(1),
        }
    }

    pub fn run(&self, batch_id: i64) -> Result<RunOutcome> {
        let batch = self.store.batch(batch_id)?;
        if batch.status.is_terminal() {
            info!(batch_id, status = %batch.status, "batch already terminal, skipping");
            return Ok(RunOutcome::Skipped(batch.status));
        }

        // Counters resume from what an interrupted run already recorded.
        let mut stats = RunStats {
            processed: batch.processed_rows,
            failed: batch.failed_rows,
            ..Default::default()
        };

        if !self.store.start_processing(batch_id)? {
            let status = self.store.status(batch_id)?;
            info!(batch_id, status = %status, "batch left before processing started");
            return Ok(match status {
                BatchStatus::Canceled => RunOutcome::Canceled(stats),
                other => RunOutcome::Skipped(other),
            });
        }
        info!(batch_id, total = batch.total_rows, "processing batch");

        let rules = match RuleSet::load(self.store) {
            Ok(rules) => rules,
            Err(e) => return Err(self.fail(batch_id, e)),
        };

        match self.process_pages(batch_id, batch.total_rows, &rules, &mut stats) {
            Err(e) => return Err(self.fail(batch_id, e)),
            Ok(PageLoop::Canceled) => {
                info!(batch_id, processed = stats.processed, failed = stats.failed, "batch canceled");
                return Ok(RunOutcome::Canceled(stats));
            }
            Ok(PageLoop::Exhausted) => {}
        }

        let caveat = match self.store.propagate_by_document_number(batch_id, &rules) {
            Ok(updates) => {
                stats.propagated = true;
                info!(batch_id, updates, "document numbers propagated");
                None
            }
            Err(e) => {
                warn!(batch_id, error = %e, "propagation failed, completing without it");
                Some(format!("{PROPAGATION_CAVEAT}: {e}"))
            }
        };

        if self.store.complete_if_processing(batch_id, caveat.as_deref())? {
            info!(batch_id, processed = stats.processed, failed = stats.failed, "batch completed");
            Ok(RunOutcome::Completed(stats))
        } else {
            info!(batch_id, "batch canceled before completion");
            Ok(RunOutcome::Canceled(stats))
        }
    }

    fn process_pages(
        &self,
        batch_id: i64,
        total_rows: i64,
        rules: &RuleSet,
        stats: &mut RunStats,
    ) -> Result<PageLoop> {
        loop {
            if self.store.status(batch_id)? == BatchStatus::Canceled {
                return Ok(PageLoop::Canceled);
            }

            let page = self.store.unprocessed_page(batch_id, self.page_size)?;
            if page.is_empty() {
                return Ok(PageLoop::Exhausted);
            }

            let mut failed = 0i64;
            let outcomes: Vec<(i64, RowOutcome)> = page
                .iter()
                .map(|row| match classify(row, rules) {
                    Ok(derived) => (row.id, RowOutcome::Classified(derived)),
                    Err(e) => {
                        warn!(batch_id = row.batch_id, row_id = row.id, error = %e, "row classification failed");
                        failed += 1;
                        (row.id, RowOutcome::Failed(e.to_string()))
                    }
                })
                .collect();

            self.store.persist_page(&outcomes)?;

            stats.pages += 1;
            stats.failed += failed;
            stats.processed += outcomes.len() as i64 - failed;
            self.store.update_progress(batch_id, stats.processed, stats.failed)?;

            let pct = percentage(stats.processed + stats.failed, total_rows);
            if let Err(e) = self.progress.publish(&progress_key(batch_id), pct) {
                warn!(batch_id, error = %e, "progress publish failed");
            }
            info!(
                batch_id,
                page = stats.pages,
                processed = stats.processed,
                failed = stats.failed,
                "page persisted ({pct:.2}%)"
            );
        }
    }

    fn fail(&self, batch_id: i64, err: JurnalError) -> JurnalError {
        error!(batch_id, error = %err, "batch failed");
        if let Err(e) = self
            .store
            .set_status(batch_id, BatchStatus::Failed, Some(&err.to_string()))
        {
            error!(batch_id, error = %e, "could not mark batch failed");
        }
        err
    }
}

/// Re-run the propagation pass on its own. A completed batch that carried the
/// propagation caveat has it cleared once the pass succeeds.
pub fn repropagate<S>(store: &S, batch_id: i64) -> Result<usize>
where
    S: RuleSource + TransactionStore + BatchStore,
{
    let batch = store.batch(batch_id)?;
    let rules = RuleSet::load(store)?;
    let updates = store.propagate_by_document_number(batch_id, &rules)?;
    info!(batch_id, updates, "document numbers propagated");

    let caveat = batch
        .error_message
        .as_deref()
        .is_some_and(|m| m.starts_with(PROPAGATION_CAVEAT));
    if batch.status == BatchStatus::Completed && caveat {
        store.set_status(batch_id, BatchStatus::Completed, None)?;
    }
    Ok(updates)
}
