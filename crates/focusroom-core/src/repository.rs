//! Task repository collaborator.
//!
//! The focus controller never owns task storage. It reads snapshots through
//! [`TaskRepository::fetch`] and requests writes through
//! [`TaskRepository::persist`] after every transition.

use std::collections::HashMap;

use crate::error::RepositoryError;
use crate::task::{TaskRun, TaskSnapshot, TimingRecord};

pub trait TaskRepository {
    /// Current stored timing state of a task, `None` if it does not exist.
    fn fetch(&self, task_id: &str) -> Result<Option<TaskSnapshot>, RepositoryError>;

    /// Store the timing fields of a task.
    fn persist(&mut self, record: &TimingRecord) -> Result<(), RepositoryError>;

    /// Append a finished run to the work log.
    fn record_run(&mut self, _run: &TaskRun) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// In-memory repository for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MemoryTaskRepository {
    tasks: HashMap<String, TaskSnapshot>,
    runs: Vec<TaskRun>,
    persist_calls: usize,
    fail_persist: bool,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, task: TaskSnapshot) {
        self.tasks.insert(task.id.clone(), task);
    }

    pub fn with_task(mut self, task: TaskSnapshot) -> Self {
        self.insert(task);
        self
    }

    pub fn get(&self, task_id: &str) -> Option<&TaskSnapshot> {
        self.tasks.get(task_id)
    }

    pub fn runs(&self) -> &[TaskRun] {
        &self.runs
    }

    /// Number of `persist` calls received, including failed ones.
    pub fn persist_calls(&self) -> usize {
        self.persist_calls
    }

    /// Make every subsequent `persist` fail.
    pub fn set_fail_persist(&mut self, fail: bool) {
        self.fail_persist = fail;
    }
}

impl TaskRepository for MemoryTaskRepository {
    fn fetch(&self, task_id: &str) -> Result<Option<TaskSnapshot>, RepositoryError> {
        Ok(self.tasks.get(task_id).cloned())
    }

    fn persist(&mut self, record: &TimingRecord) -> Result<(), RepositoryError> {
        self.persist_calls += 1;
        if self.fail_persist {
            return Err(RepositoryError::Unavailable("persist disabled".into()));
        }
        let task = self
            .tasks
            .entry(record.task_id.clone())
            .or_insert_with(|| TaskSnapshot::new(record.task_id.clone(), ""));
        task.started_at = record.started_at;
        task.accumulated = record.accumulated;
        task.is_completed = record.is_completed;
        Ok(())
    }

    fn record_run(&mut self, run: &TaskRun) -> Result<(), RepositoryError> {
        self.runs.push(run.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn persist_updates_timing_fields_only() {
        let mut repo = MemoryTaskRepository::new()
            .with_task(TaskSnapshot::new("t1", "Draft").with_estimate(Duration::minutes(30)));
        let now = Utc::now();
        repo.persist(&TimingRecord {
            task_id: "t1".into(),
            is_in_progress: true,
            started_at: Some(now),
            accumulated: Duration::seconds(42),
            is_completed: false,
        })
        .unwrap();

        let task = repo.fetch("t1").unwrap().unwrap();
        assert_eq!(task.title, "Draft");
        assert_eq!(task.estimated, Some(Duration::minutes(30)));
        assert_eq!(task.started_at(), Some(now));
        assert_eq!(task.accumulated(), Duration::seconds(42));
        assert_eq!(repo.persist_calls(), 1);
    }

    #[test]
    fn failing_persist_reports_error() {
        let mut repo = MemoryTaskRepository::new();
        repo.set_fail_persist(true);
        let record = TimingRecord::from(&TaskSnapshot::new("t1", ""));
        assert!(repo.persist(&record).is_err());
        assert!(repo.fetch("t1").unwrap().is_none());
    }
}
