//! Operation report
//!
//! The error-reporting side channel for CRUD operations. Every failed
//! operation is recorded here exactly once before the error is returned to
//! the caller; the history is bounded and inspectable, which is how tests
//! assert the once-only discipline.

use crate::error::Operation;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// A single recorded failure.
#[derive(Debug, Clone)]
pub struct Report {
    pub id: Uuid,
    pub operation: Operation,
    /// URL or store path the operation ran against.
    pub target: String,
    pub message: String,
}

struct ReporterInner {
    reports: VecDeque<Report>,
    max_history: usize,
}

/// Shared failure log. Cloning yields another handle to the same log.
#[derive(Clone)]
pub struct Reporter {
    inner: Arc<Mutex<ReporterInner>>,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ReporterInner {
                reports: VecDeque::new(),
                max_history: 50,
            })),
        }
    }

    /// Record one failure. Recent first.
    pub fn failure(&self, operation: Operation, target: &str, message: String) {
        tracing::error!("{} {}: {}", operation, target, message);

        let mut inner = self.inner.lock().expect("reporter lock poisoned");
        inner.reports.push_front(Report {
            id: Uuid::new_v4(),
            operation,
            target: target.to_string(),
            message,
        });
        while inner.reports.len() > inner.max_history {
            inner.reports.pop_back();
        }
    }

    /// Snapshot of the recorded failures, most recent first.
    pub fn reports(&self) -> Vec<Report> {
        let inner = self.inner.lock().expect("reporter lock poisoned");
        inner.reports.iter().cloned().collect()
    }

    pub fn failure_count(&self) -> usize {
        let inner = self.inner.lock().expect("reporter lock poisoned");
        inner.reports.len()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("reporter lock poisoned");
        inner.reports.clear();
    }
}
