//! Local keyed collection of execution records.

use crate::{Execution, ExecutionStatus, Notification};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Default cap on the running list handed to consumers.
pub const DEFAULT_RUNNING_LIMIT: usize = 10;

/// Result of applying one update to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// Status held before the update, `None` if the record was absent or had no status
    pub previous_status: Option<ExecutionStatus>,
    /// Whether the update created the record
    pub inserted: bool,
    /// The record as stored after the update
    pub current: Execution,
}

impl Applied {
    /// Notification warranted by this update, if any.
    ///
    /// A first-seen record never notifies.
    pub fn notification(&self) -> Option<Notification> {
        if self.inserted {
            return None;
        }
        Notification::for_transition(self.previous_status, &self.current)
    }
}

/// Executions keyed by id, merged field by field as updates arrive.
///
/// Records are never removed; the collection lives as long as the session.
///
/// # Examples
///
/// ```
/// use execwatch_core::{Execution, ExecutionStatus, ExecutionStore};
///
/// let mut store = ExecutionStore::default();
/// store.apply(Execution { id: 2, status: Some(ExecutionStatus::Pending), ..Default::default() });
///
/// assert_eq!(store.len(), 1);
/// assert_eq!(store.running().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionStore {
    records: BTreeMap<i64, Execution>,
    running_limit: usize,
}

impl Default for ExecutionStore {
    fn default() -> Self {
        Self::with_running_limit(DEFAULT_RUNNING_LIMIT)
    }
}

impl ExecutionStore {
    /// Create an empty store with a custom running-list cap.
    pub fn with_running_limit(running_limit: usize) -> Self {
        Self {
            records: BTreeMap::new(),
            running_limit,
        }
    }

    /// Merge an update into the collection.
    ///
    /// Fields present in `update` overwrite the stored ones; absent fields are
    /// preserved. An unseen id is inserted verbatim.
    pub fn apply(&mut self, update: Execution) -> Applied {
        let id = update.id;
        match self.records.get_mut(&id) {
            Some(existing) => {
                let previous_status = existing.status;
                existing.merge(update);
                debug!(
                    execution_id = id,
                    previous = ?previous_status,
                    current = ?existing.status,
                    "Merged execution update"
                );
                Applied {
                    previous_status,
                    inserted: false,
                    current: existing.clone(),
                }
            }
            None => {
                trace!(execution_id = id, "Inserting first-seen execution");
                self.records.insert(id, update.clone());
                Applied {
                    previous_status: None,
                    inserted: true,
                    current: update,
                }
            }
        }
    }

    /// Look up one record.
    pub fn get(&self, id: i64) -> Option<&Execution> {
        self.records.get(&id)
    }

    /// Every record, keyed by id.
    pub fn records(&self) -> &BTreeMap<i64, Execution> {
        &self.records
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cap applied by [`ExecutionStore::running`].
    pub fn running_limit(&self) -> usize {
        self.running_limit
    }

    /// Pending and running executions, most relevant first, capped.
    ///
    /// Newest `created_at` comes first; records without a creation time sort
    /// after those with one, and ties fall back to the higher id.
    pub fn running(&self) -> Vec<Execution> {
        let mut running: Vec<&Execution> = self
            .records
            .values()
            .filter(|record| record.is_running())
            .collect();
        running.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        running
            .into_iter()
            .take(self.running_limit)
            .cloned()
            .collect()
    }
}
