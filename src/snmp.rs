use std::time::Duration;

use snmp2::{AsyncSession, Oid, Value};
use tokio::time::timeout;
use tracing::debug;

use crate::error::AppError;

/// sysDescr.0
pub const OID_SYS_DESCR: &str = "1.3.6.1.2.1.1.1.0";
/// sysUpTime.0
pub const OID_SYS_UPTIME: &str = "1.3.6.1.2.1.1.3.0";
/// sysName.0
pub const OID_SYS_NAME: &str = "1.3.6.1.2.1.1.5.0";
/// ifInOctets for interface index 4. The index is fixed rather than
/// configured per device.
pub const OID_IF_IN_OCTETS: &str = "1.3.6.1.2.1.2.2.1.10.4";
/// ifOutOctets for interface index 4.
pub const OID_IF_OUT_OCTETS: &str = "1.3.6.1.2.1.2.2.1.16.4";

/// Outcome of a single SNMP read.
///
/// Devices are expected to be intermittently unreachable, so a failed read
/// is data (`Unavailable`), not an error: callers decide whether that
/// becomes an absent counter or an "Unknown" label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnmpValue {
    Available(String),
    Unavailable,
}

impl SnmpValue {
    pub fn into_option(self) -> Option<String> {
        match self {
            SnmpValue::Available(value) => Some(value),
            SnmpValue::Unavailable => None,
        }
    }

    /// Parses the value as a non-negative counter.
    ///
    /// `None` when the read failed or the device returned something
    /// non-numeric.
    pub fn counter(&self) -> Option<u64> {
        match self {
            SnmpValue::Available(value) => value.parse().ok(),
            SnmpValue::Unavailable => None,
        }
    }

    /// The presentation fallback used where operators see the value.
    pub fn unwrap_or_unknown(self) -> String {
        self.into_option()
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Read-only SNMP v2c sampler for a single device.
///
/// Each read opens a fresh session, issues one GET for one OID and renders
/// the first variable binding as text.
pub struct SnmpSampler {
    target: String,
    community: Vec<u8>,
    timeout: Duration,
}

impl SnmpSampler {
    pub fn new(address: &str, community: &str, port: u16, timeout: Duration) -> Self {
        Self {
            target: format!("{address}:{port}"),
            community: community.as_bytes().to_vec(),
            timeout,
        }
    }

    /// Reads one OID. Any protocol error, error-status reply or transport
    /// failure degrades to [`SnmpValue::Unavailable`].
    pub async fn read_counter(&self, oid: &str) -> SnmpValue {
        let oid = match parse_oid(oid) {
            Ok(oid) => oid,
            Err(e) => {
                debug!(target = %self.target, error = %e, "Rejecting SNMP read");
                return SnmpValue::Unavailable;
            }
        };

        match timeout(self.timeout, self.get(&oid)).await {
            Ok(Ok(value)) => SnmpValue::Available(value),
            Ok(Err(e)) => {
                debug!(target = %self.target, error = %e, "SNMP GET failed");
                SnmpValue::Unavailable
            }
            Err(_) => {
                debug!(target = %self.target, "SNMP GET timed out");
                SnmpValue::Unavailable
            }
        }
    }

    /// Inbound octet count on the fixed monitored interface.
    pub async fn in_octets(&self) -> SnmpValue {
        self.read_counter(OID_IF_IN_OCTETS).await
    }

    /// Outbound octet count on the fixed monitored interface.
    pub async fn out_octets(&self) -> SnmpValue {
        self.read_counter(OID_IF_OUT_OCTETS).await
    }

    pub async fn sys_name(&self) -> SnmpValue {
        self.read_counter(OID_SYS_NAME).await
    }

    pub async fn sys_uptime(&self) -> SnmpValue {
        self.read_counter(OID_SYS_UPTIME).await
    }

    pub async fn sys_descr(&self) -> SnmpValue {
        self.read_counter(OID_SYS_DESCR).await
    }

    async fn get(&self, oid: &Oid<'_>) -> Result<String, String> {
        let mut session = AsyncSession::new_v2c(&self.target, &self.community, 0)
            .await
            .map_err(|e| format!("session: {e:?}"))?;

        let pdu = session
            .get(oid)
            .await
            .map_err(|e| format!("get: {e:?}"))?;

        let (_oid, value) = pdu
            .varbinds
            .into_iter()
            .next()
            .ok_or_else(|| "empty response".to_string())?;

        match value {
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => {
                Err("no such object".to_string())
            }
            value => Ok(render_value(&value)),
        }
    }
}

/// Parses a dotted-decimal OID string.
pub fn parse_oid(s: &str) -> Result<Oid<'static>, AppError> {
    let parts = s
        .trim()
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>())
        .collect::<Result<Vec<u64>, _>>()
        .map_err(|_| AppError::InvalidInput(format!("invalid OID: {s}")))?;

    if parts.is_empty() {
        return Err(AppError::InvalidInput(format!("invalid OID: {s}")));
    }

    Oid::from(&parts).map_err(|_| AppError::InvalidInput(format!("invalid OID: {s}")))
}

fn render_value(value: &Value<'_>) -> String {
    match value {
        Value::Integer(n) => n.to_string(),
        Value::Counter32(n) | Value::Unsigned32(n) | Value::Timeticks(n) => n.to_string(),
        Value::Counter64(n) => n.to_string(),
        Value::OctetString(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::IpAddress(octets) => {
            format!("{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3])
        }
        Value::Null => String::new(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_decimal_oid() {
        assert!(parse_oid(OID_IF_IN_OCTETS).is_ok());
        assert!(parse_oid(" 1.3.6.1 ").is_ok());
    }

    #[test]
    fn rejects_junk_oid() {
        assert!(parse_oid("not.an.oid").is_err());
        assert!(parse_oid("").is_err());
    }

    #[test]
    fn renders_counter_values_as_decimal() {
        assert_eq!(render_value(&Value::Counter32(1234)), "1234");
        assert_eq!(render_value(&Value::Counter64(u64::MAX)), u64::MAX.to_string());
        assert_eq!(render_value(&Value::Integer(-5)), "-5");
    }

    #[test]
    fn renders_octet_strings_as_text() {
        assert_eq!(render_value(&Value::OctetString(b"sw-core")), "sw-core");
    }

    #[test]
    fn renders_ip_addresses_dotted() {
        assert_eq!(render_value(&Value::IpAddress([10, 0, 0, 1])), "10.0.0.1");
    }

    #[test]
    fn counter_parses_available_numbers() {
        assert_eq!(SnmpValue::Available("100".into()).counter(), Some(100));
        assert_eq!(SnmpValue::Available("sw-core".into()).counter(), None);
        assert_eq!(SnmpValue::Unavailable.counter(), None);
    }

    #[test]
    fn unknown_fallback_applies_only_when_unavailable() {
        assert_eq!(SnmpValue::Available("up".into()).unwrap_or_unknown(), "up");
        assert_eq!(SnmpValue::Unavailable.unwrap_or_unknown(), "Unknown");
    }

    #[tokio::test]
    async fn invalid_oid_degrades_to_unavailable() {
        let sampler = SnmpSampler::new("192.0.2.1", "public", 161, Duration::from_millis(50));
        assert_eq!(sampler.read_counter("bogus").await, SnmpValue::Unavailable);
    }
}
