use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One reading of a device's interface counters, appended to the traffic log.
///
/// A sample is created exactly once when a poll completes and is never
/// mutated afterwards. Counter fields are `None` when the corresponding SNMP
/// read failed; a partially failed poll still produces a sample.
///
/// On the wire this is one JSON object per log line. Counters are
/// string-encoded integers when present and absent otherwise, so existing
/// log files keep parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSample {
    pub timestamp: DateTime<Utc>,
    pub equipment_id: i32,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "octets_as_string"
    )]
    pub in_octets: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "octets_as_string"
    )]
    pub out_octets: Option<u64>,
}

/// Serializes octet counters as decimal strings, the format the log file
/// has always used.
mod octets_as_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_str(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(s) => s
                .parse::<u64>()
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_at(hour: u32) -> TrafficSample {
        TrafficSample {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
            equipment_id: 1,
            in_octets: Some(100),
            out_octets: Some(50),
        }
    }

    #[test]
    fn counters_serialize_as_strings() {
        let json = serde_json::to_string(&sample_at(10)).unwrap();
        assert!(json.contains(r#""in_octets":"100""#));
        assert!(json.contains(r#""out_octets":"50""#));
        assert!(json.contains(r#""equipment_id":1"#));
    }

    #[test]
    fn absent_counters_are_omitted() {
        let sample = TrafficSample {
            in_octets: None,
            out_octets: None,
            ..sample_at(10)
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert!(!json.contains("in_octets"));
        assert!(!json.contains("out_octets"));
    }

    #[test]
    fn round_trips_through_json() {
        let sample = TrafficSample {
            out_octets: None,
            ..sample_at(10)
        };
        let json = serde_json::to_string(&sample).unwrap();
        let parsed: TrafficSample = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample);
    }

    #[test]
    fn null_counter_reads_as_absent() {
        let json = r#"{"timestamp":"2024-03-01T10:00:00Z","equipment_id":3,"in_octets":"42","out_octets":null}"#;
        let parsed: TrafficSample = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.in_octets, Some(42));
        assert_eq!(parsed.out_octets, None);
    }

    #[test]
    fn non_numeric_counter_is_rejected() {
        let json = r#"{"timestamp":"2024-03-01T10:00:00Z","equipment_id":3,"in_octets":"lots"}"#;
        assert!(serde_json::from_str::<TrafficSample>(json).is_err());
    }
}
