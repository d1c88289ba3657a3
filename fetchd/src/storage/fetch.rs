use super::lock;
use crate::message::Job;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct FetchTable {
    next_id: i64,
    jobs: BTreeMap<i64, Job>,
}

/// Store of accepted jobs, keyed by an increasing integer starting at 0.
#[derive(Debug, Default)]
pub struct FetchStore {
    table: Mutex<FetchTable>,
}

impl FetchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next key and stores the job under it.
    pub fn create(&self, url: String, interval: u64) -> Job {
        let mut table = lock(&self.table);
        let id = table.next_id;
        table.next_id += 1;

        let job = Job { id, url, interval };
        table.jobs.insert(id, job.clone());
        tracing::debug!("fetch store: inserted job {} ({} stored)", id, table.jobs.len());
        job
    }

    /// Returns all jobs ordered by key.
    pub fn list(&self) -> Vec<Job> {
        lock(&self.table).jobs.values().cloned().collect()
    }

    pub fn get(&self, id: i64) -> Option<Job> {
        lock(&self.table).jobs.get(&id).cloned()
    }

    /// Removes a job. Keys are never reused.
    pub fn remove(&self, id: i64) -> Option<Job> {
        lock(&self.table).jobs.remove(&id)
    }
}
