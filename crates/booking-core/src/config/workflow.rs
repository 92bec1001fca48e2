//! Command pipeline configuration.

use serde::{Deserialize, Serialize};

/// Settings for the reservation command pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// How many times a command is re-run after an optimistic concurrency conflict.
    #[serde(default = "default_append_retries")]
    pub append_retries: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            append_retries: default_append_retries(),
        }
    }
}

fn default_append_retries() -> u32 {
    3
}
