//! Serde helpers storing `chrono::Duration` as integer milliseconds.

use chrono::Duration;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(value.num_milliseconds())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let ms = i64::deserialize(deserializer)?;
    Ok(Duration::milliseconds(ms))
}

/// [`deserialize`], with negative values clamped to zero.
pub fn non_negative<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    Ok(deserialize(deserializer)?.max(Duration::zero()))
}

/// Optional durations. Negative values decode as zero.
pub mod option {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.num_milliseconds()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let ms = Option::<i64>::deserialize(deserializer)?;
        Ok(ms.map(|ms| Duration::milliseconds(ms).max(Duration::zero())))
    }
}
