//! Kinesis Slurper - dump one AWS Kinesis shard as JSON lines
//!
//! Reads a single shard from a point in time up to its current tip and writes
//! every record as `{"Timestamp": ..., "Payload": ...}` on its own line.

pub mod client;
pub mod config;
pub mod error;
pub mod record;
pub mod slurper;


pub use client::{create_client, KinesisClientError, KinesisClientTrait, RecordBatch};
pub use config::{Cli, SlurpConfig};
pub use error::{Result, SlurperError};
pub use record::StreamItem;
pub use slurper::{SlurpRequest, SlurpSummary, Slurper};
