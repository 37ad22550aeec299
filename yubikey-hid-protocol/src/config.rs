use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing parameters for talking to a device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base timeout in seconds for a single wait on a status flag.
    pub default_timeout_secs: u8,

    /// Upper bound on the extended timeout a device may request while it waits
    /// on the user (e.g. a touch to approve the challenge).
    pub max_device_timeout_secs: u8,

    /// Delay after the first unsuccessful poll, doubled after each further one.
    #[serde(with = "serde_millis")]
    pub initial_interval: Duration,

    #[serde(with = "serde_millis")]
    pub max_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_timeout_secs: 2,
            max_device_timeout_secs: 20,
            initial_interval: Duration::from_millis(10),
            max_interval: Duration::from_millis(500),
        }
    }
}

mod serde_millis {
    use std::convert::TryFrom;
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::max_value()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
