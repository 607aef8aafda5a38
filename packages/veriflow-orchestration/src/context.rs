use crate::record::Record;
use serde::Serialize;
use uuid::Uuid;

/// Execution context threaded mutably through both pipeline phases.
///
/// One instance lives for exactly one run: setup plugins record the
/// resources they provision, the runner phase attaches the collected
/// result set and flips `passed`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionContext {
    pub run_id: Uuid,
    /// Resource names in the order they were provisioned, duplicate-free.
    /// Mutation goes through `track_resource`/`release_resource` so the
    /// ordering and uniqueness guarantees hold for rollback.
    added_resources: Vec<String>,
    pub results: Vec<Record>,
    /// True only after a runner plugin attached its full result set.
    /// Means "no error was raised through result collection", nothing more.
    pub passed: bool,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            added_resources: Vec::new(),
            results: Vec::new(),
            passed: false,
        }
    }

    /// Record a provisioned resource. Returns false (and leaves the list
    /// untouched) when the name is already tracked.
    pub fn track_resource(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.added_resources.iter().any(|r| r == &name) {
            return false;
        }
        self.added_resources.push(name);
        true
    }

    /// Remove a tracked resource. Idempotent: returns false when the name
    /// is not present, without error.
    pub fn release_resource(&mut self, name: &str) -> bool {
        match self.added_resources.iter().position(|r| r == name) {
            Some(idx) => {
                self.added_resources.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn has_resource(&self, name: &str) -> bool {
        self.added_resources.iter().any(|r| r == name)
    }

    /// Tracked resources in insertion order.
    pub fn added_resources(&self) -> &[String] {
        &self.added_resources
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
