//! Serialization helpers for configuration values

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Custom serialization module for Duration as milliseconds
///
/// Configuration files express every duration as an integer number of
/// milliseconds.
///
/// # Usage
/// ```rust
/// use std::time::Duration;
///
/// use courier_domain::duration_millis;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Example {
///     #[serde(with = "duration_millis")]
///     timeout: Duration,
/// }
/// ```
pub mod duration_millis {
    use super::{Deserialize, Deserializer, Duration, Serializer};

    /// Serde serialization result type
    type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

    /// Serialize a Duration as milliseconds (u64)
    pub fn serialize<S>(duration: &Duration, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    /// Deserialize milliseconds (u64) into a Duration
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct TestStruct {
        #[serde(with = "duration_millis")]
        timeout: Duration,
    }

    #[test]
    fn test_duration_millis_serialize() {
        let data = TestStruct { timeout: Duration::from_millis(1500) };
        let json = serde_json::to_string(&data).expect("Should serialize valid struct");
        assert_eq!(json, r#"{"timeout":1500}"#);
    }

    #[test]
    fn test_duration_millis_deserialize() {
        let data: TestStruct =
            serde_json::from_str(r#"{"timeout":250}"#).expect("Should deserialize millis");
        assert_eq!(data.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_duration_millis_rejects_negative() {
        let result = serde_json::from_str::<TestStruct>(r#"{"timeout":-1}"#);
        assert!(result.is_err());
    }
}
