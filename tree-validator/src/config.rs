//! Validator and scheduler settings.
//!
//! Both structs deserialise from the host node's configuration; durations
//! are written as whole milliseconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default upper bound on the depth of a content-addressed walk.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default time the scheduler waits for a new height before revalidating.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings for [`crate::MerkleTreeValidator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Deepest node a content-addressed walk may visit before it is
    /// treated as corrupt or cyclic data.
    pub max_depth: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Settings for [`crate::ValidatorScheduler`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// How long to wait for a height change before validating again.
    #[serde(rename = "wait_timeout_ms", with = "millis")]
    pub wait_timeout: Duration,
    /// Name of the background thread.
    pub thread_name: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            thread_name: "merkle-validator".to_owned(),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
