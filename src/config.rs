//! Command line flags and their validation

use crate::error::{Result, SlurperError};
use crate::slurper::SlurpRequest;
use chrono::{DateTime, Utc};
use clap::Parser;

/// Largest page `GetRecords` will hand out
pub const MAX_BATCH_LIMIT: i32 = 10_000;

/// Raw flags as given on the command line
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "kinesis-slurper",
    version,
    about = "Print the records of one Kinesis shard, from a timestamp onward, as JSON lines"
)]
pub struct Cli {
    /// Name of the Kinesis Data Stream to read from
    #[arg(long)]
    pub stream_name: Option<String>,

    /// Id of the shard to read from
    #[arg(long)]
    pub shard_id: Option<String>,

    /// Region that the stream resides in
    #[arg(long)]
    pub region: Option<String>,

    /// RFC3339 formatted timestamp to begin reading the stream from
    #[arg(long)]
    pub from_timestamp: Option<String>,

    /// Maximum number of records per GetRecords call
    #[arg(long)]
    pub limit: Option<i32>,

    /// Custom Kinesis endpoint, e.g. a local emulator
    #[arg(long)]
    pub endpoint_url: Option<String>,
}

/// Validated configuration for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlurpConfig {
    pub stream_name: String,
    pub shard_id: String,
    pub region: String,
    pub from_timestamp: DateTime<Utc>,
    pub batch_limit: Option<i32>,
    pub endpoint_url: Option<String>,
}

impl SlurpConfig {
    pub fn request(&self) -> SlurpRequest {
        SlurpRequest {
            stream_name: self.stream_name.clone(),
            shard_id: self.shard_id.clone(),
            from_timestamp: self.from_timestamp,
        }
    }
}

fn required(value: Option<String>, flag: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(SlurperError::ConfigError(format!("{} was not set.", flag))),
    }
}

/// Parse an RFC3339 timestamp into UTC
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

impl TryFrom<Cli> for SlurpConfig {
    type Error = SlurperError;

    fn try_from(cli: Cli) -> Result<Self> {
        let stream_name = required(cli.stream_name, "stream-name")?;
        let shard_id = required(cli.shard_id, "shard-id")?;
        let region = required(cli.region, "region")?;
        let from_timestamp = parse_timestamp(cli.from_timestamp.as_deref().unwrap_or_default())?;

        if let Some(limit) = cli.limit {
            if !(1..=MAX_BATCH_LIMIT).contains(&limit) {
                return Err(SlurperError::ConfigError(format!(
                    "limit must be between 1 and {}, got {}",
                    MAX_BATCH_LIMIT, limit
                )));
            }
        }

        Ok(Self {
            stream_name,
            shard_id,
            region,
            from_timestamp,
            batch_limit: cli.limit,
            endpoint_url: cli.endpoint_url.filter(|url| !url.is_empty()),
        })
    }
}
