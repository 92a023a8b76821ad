//! Ordered job storage with stable slot indices.

use crate::exporter::{
    error::{Error, Result},
    settings::Job,
};

/// Pending jobs in insertion order.
///
/// Every job keeps the slot index it was given when queued. Removing a job
/// leaves an empty slot behind, so indices handed out earlier stay valid.
#[derive(Clone, Debug, Default)]
pub struct JobQueue {
    slots: Vec<Option<Job>>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `job`, returning its slot. Rejects field-for-field duplicates
    /// of a pending job.
    pub fn push(&mut self, job: Job) -> Result<usize> {
        if self.iter().any(|(_, queued)| *queued == job) {
            return Err(Error::DuplicateJob);
        }
        self.slots.push(Some(job));
        Ok(self.slots.len() - 1)
    }

    pub fn get(&self, slot: usize) -> Option<&Job> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Take the job out of `slot`, leaving the slot empty.
    pub fn remove(&mut self, slot: usize) -> Option<Job> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    /// Number of pending jobs.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pending jobs with their slots, in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Job)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, job)| job.as_ref().map(|job| (slot, job)))
    }

    pub fn slots(&self) -> Vec<usize> {
        self.iter().map(|(slot, _)| slot).collect()
    }
}
