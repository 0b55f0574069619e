//! Serde helpers for configuration values

/// `Duration` stored as whole seconds
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Limits {
///     #[serde(with = "epa_core::config::serde_utils::duration_secs")]
///     dispatch_timeout: Duration,
/// }
/// ```
pub mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Write the duration as a number of seconds
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    /// Read a number of seconds into a duration
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
