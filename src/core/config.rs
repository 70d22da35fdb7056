/// What `process` does when a sink's `save` returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the failing entry. Entries after it stay queued, in order.
    Abort,
    /// Record the failure in the report and keep draining.
    Continue,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self::Continue
    }
}

#[derive(Clone, Copy, Debug)]
pub struct QueueConfig {
    pub failure_policy: FailurePolicy,
    /// Number of entries to preallocate.
    pub initial_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            initial_capacity: 0,
        }
    }
}

impl QueueConfig {
    pub fn abort_on_error() -> Self {
        Self {
            failure_policy: FailurePolicy::Abort,
            ..Self::default()
        }
    }
}
