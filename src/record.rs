//! JSON view of a single Kinesis record

use crate::error::{Result, SlurperError};
use aws_sdk_kinesis::types::Record;
use aws_smithy_types_convert::date_time::DateTimeExt;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::io::Write;

/// A record as emitted on the output: when it arrived and what it carried
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamItem {
    #[serde(rename = "Timestamp", serialize_with = "serialize_arrival")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "Payload")]
    pub payload: String,
}

impl StreamItem {
    /// Build the output view of `record`.
    ///
    /// The payload is decoded as UTF-8, replacing invalid sequences with U+FFFD.
    pub fn from_record(record: &Record) -> Result<Self> {
        let arrival = record.approximate_arrival_timestamp().ok_or_else(|| {
            SlurperError::MissingArrivalTimestamp(record.sequence_number().to_string())
        })?;

        let timestamp = arrival.to_chrono_utc().map_err(|_| {
            SlurperError::InvalidArrivalTimestamp(record.sequence_number().to_string())
        })?;

        Ok(Self {
            timestamp,
            payload: String::from_utf8_lossy(record.data().as_ref()).into_owned(),
        })
    }

    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// RFC3339 in UTC with a `Z` suffix and no trailing zeros in the fraction,
/// e.g. `2023-11-14T22:13:20.25Z`
pub fn format_arrival(timestamp: &DateTime<Utc>) -> String {
    let text = timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true);
    let Some((seconds, fraction)) = text.trim_end_matches('Z').rsplit_once('.') else {
        return text;
    };

    match fraction.trim_end_matches('0') {
        "" => format!("{}Z", seconds),
        digits => format!("{}.{}Z", seconds, digits),
    }
}

fn serialize_arrival<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_arrival(timestamp))
}

/// Serialize `item` and write it to `out` as a single line
pub fn write_json_line<W: Write + ?Sized>(out: &mut W, item: &StreamItem) -> Result<()> {
    let line = item.to_json_line()?;
    writeln!(out, "{}", line)?;
    Ok(())
}
