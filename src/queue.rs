//! In-process job queue: a fixed pool of worker threads, each running one batch at a time on
//! its own SQLite connection.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use dashmap::DashSet;
use tracing::{debug, error, info};

use crate::db::get_connection;
use crate::error::{JurnalError, Result};
use crate::processor::{BatchProcessor, RunOutcome};
use crate::progress::{Fanout, MemoryProgress, ProgressSink, SqliteProgress};
use crate::store::SqliteStore;

#[derive(Debug)]
pub struct JobResult {
    pub batch_id: i64,
    pub outcome: Result<RunOutcome>,
}

struct Worker {
    db_path: PathBuf,
    page_size: usize,
    jobs: Receiver<i64>,
    results: Sender<JobResult>,
    active: Arc<DashSet<i64>>,
    progress: MemoryProgress,
}

impl Worker {
    fn run(self) {
        while let Ok(batch_id) = self.jobs.recv() {
            debug!(batch_id, "worker picked up batch");
            let outcome = self.process(batch_id);
            if let Err(e) = &outcome {
                error!(batch_id, error = %e, "job failed");
            }
            self.active.remove(&batch_id);
            // The receiving side may already be gone during shutdown.
            let _ = self.results.send(JobResult { batch_id, outcome });
        }
    }

    fn process(&self, batch_id: i64) -> Result<RunOutcome> {
        let conn = get_connection(&self.db_path)?;
        let store = SqliteStore::new(&conn);
        let db_progress = SqliteProgress::new(&conn);
        let sinks: Vec<&dyn ProgressSink> = vec![&self.progress, &db_progress];
        let progress = Fanout::new(sinks);
        BatchProcessor::new(&store, &progress, self.page_size).run(batch_id)
    }
}

pub struct JobQueue {
    jobs: Option<Sender<i64>>,
    queued: Receiver<i64>,
    results: Receiver<JobResult>,
    active: Arc<DashSet<i64>>,
    progress: MemoryProgress,
    workers: Vec<JoinHandle<()>>,
}

impl JobQueue {
    pub fn start(db_path: &Path, workers: usize, page_size: usize) -> Result<Self> {
        let (job_tx, job_rx) = channel::unbounded();
        let (result_tx, result_rx) = channel::unbounded();
        let active = Arc::new(DashSet::new());
        let progress = MemoryProgress::new();

        let mut handles = Vec::with_capacity(workers);
        for n in 0..workers {
            let worker = Worker {
                db_path: db_path.to_path_buf(),
                page_size,
                jobs: job_rx.clone(),
                results: result_tx.clone(),
                active: Arc::clone(&active),
                progress: progress.clone(),
            };
            let handle = thread::Builder::new()
                .name(format!("jurnal-worker-{n}"))
                .spawn(move || worker.run())?;
            handles.push(handle);
        }
        info!(workers, page_size, "job queue started");

        Ok(Self {
            jobs: Some(job_tx),
            queued: job_rx,
            results: result_rx,
            active,
            progress,
            workers: handles,
        })
    }

    /// Queue a batch. A batch that is already queued or running is rejected.
    pub fn enqueue(&self, batch_id: i64) -> Result<()> {
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| JurnalError::Queue("queue is shut down".into()))?;
        if !self.active.insert(batch_id) {
            return Err(JurnalError::Queue(format!("batch {batch_id} is already queued or running")));
        }
        if let Err(e) = jobs.send(batch_id) {
            self.active.remove(&batch_id);
            return Err(JurnalError::Queue(e.to_string()));
        }
        debug!(batch_id, pending = self.pending(), "batch queued");
        Ok(())
    }

    pub fn is_active(&self, batch_id: i64) -> bool {
        self.active.contains(&batch_id)
    }

    /// Jobs waiting for a free worker.
    pub fn pending(&self) -> usize {
        self.queued.len()
    }

    pub fn progress(&self) -> &MemoryProgress {
        &self.progress
    }

    pub fn results(&self) -> &Receiver<JobResult> {
        &self.results
    }

    /// Stop accepting jobs, let the workers drain the queue, and return the results not yet
    /// received through [`JobQueue::results`].
    pub fn shutdown(mut self) -> Vec<JobResult> {
        self.jobs.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("worker thread panicked");
            }
        }
        self.results.try_iter().collect()
    }
}
