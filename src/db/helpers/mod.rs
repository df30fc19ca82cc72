use std::convert::TryFrom;

use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeZone, Utc};

/// Encodes a timestamp as 8 big-endian bytes of nanoseconds since the epoch.
pub fn encode_timestamp(value: DateTime<Utc>) -> Result<[u8; 8]> {
    let nanos = value
        .timestamp_nanos_opt()
        .ok_or_else(|| anyhow!("timestamp {value} is outside the nanosecond range"))?;
    Ok(nanos.to_be_bytes())
}

pub fn decode_timestamp(bytes: &[u8], field: &str) -> Result<DateTime<Utc>> {
    let raw = <[u8; 8]>::try_from(bytes)
        .map_err(|_| anyhow!("{field} holds {} bytes, expected 8", bytes.len()))?;
    Ok(Utc.timestamp_nanos(i64::from_be_bytes(raw)))
}
