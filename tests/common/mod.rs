// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use aws_sdk_kinesis::types::{Record, ShardIteratorType};
use aws_smithy_types::Blob;
use chrono::{DateTime, TimeZone, Utc};
use kinesis_slurper::{KinesisClientError, KinesisClientTrait, RecordBatch};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

pub const STREAM: &str = "test-stream";
pub const SHARD: &str = "shardId-000000000000";

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("kinesis_slurper=debug".parse().unwrap()),
            )
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// In-memory shard holding a fixed set of records.
///
/// Iterators are `shard-iterator-<position>`. Pages report lag until the last
/// record has been handed out; a closed shard stops handing out iterators at
/// its end.
#[derive(Debug, Clone)]
pub struct FakeShard {
    records: Arc<Vec<Record>>,
    page_size: usize,
    closed: bool,
    get_records_calls: Arc<AtomicUsize>,
}

impl FakeShard {
    /// `records` are `(arrival millis, payload)` pairs in arrival order
    pub fn new(records: &[(i64, &str)]) -> Self {
        let records = records
            .iter()
            .enumerate()
            .map(|(i, (millis, payload))| {
                Record::builder()
                    .sequence_number(format!("{:056}", i))
                    .data(Blob::new(payload.as_bytes().to_vec()))
                    .partition_key("pk")
                    .approximate_arrival_timestamp(aws_smithy_types::DateTime::from_millis(
                        *millis,
                    ))
                    .build()
                    .expect("Failed to build record")
            })
            .collect();

        Self {
            records: Arc::new(records),
            page_size: 10_000,
            closed: false,
            get_records_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn get_records_calls(&self) -> usize {
        self.get_records_calls.load(Ordering::SeqCst)
    }

    fn arrival_millis(record: &Record) -> i64 {
        record
            .approximate_arrival_timestamp()
            .and_then(|t| t.to_millis().ok())
            .unwrap_or_default()
    }

    fn token(position: usize) -> String {
        format!("shard-iterator-{}", position)
    }

    fn position(token: &str) -> Result<usize, KinesisClientError> {
        token
            .strip_prefix("shard-iterator-")
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| KinesisClientError::InvalidArgument(format!("bad iterator {}", token)))
    }
}

#[async_trait]
impl KinesisClientTrait for FakeShard {
    async fn get_shard_iterator(
        &self,
        stream_name: &str,
        shard_id: &str,
        iterator_type: ShardIteratorType,
        timestamp: Option<&DateTime<Utc>>,
    ) -> Result<String, KinesisClientError> {
        if stream_name != STREAM || shard_id != SHARD {
            return Err(KinesisClientError::ResourceNotFound(format!(
                "Shard {} in stream {} not found",
                shard_id, stream_name
            )));
        }

        let position = match (iterator_type, timestamp) {
            (ShardIteratorType::AtTimestamp, Some(ts)) => {
                let from = ts.timestamp_millis();
                self.records
                    .iter()
                    .position(|r| Self::arrival_millis(r) >= from)
                    .unwrap_or(self.records.len())
            }
            (ShardIteratorType::TrimHorizon, _) => 0,
            _ => {
                return Err(KinesisClientError::InvalidArgument(
                    "unsupported iterator type".to_string(),
                ))
            }
        };

        Ok(Self::token(position))
    }

    async fn get_records(
        &self,
        iterator: &str,
        limit: Option<i32>,
    ) -> Result<RecordBatch, KinesisClientError> {
        self.get_records_calls.fetch_add(1, Ordering::SeqCst);

        let start = Self::position(iterator)?.min(self.records.len());
        let page_size = limit
            .map(|l| l as usize)
            .unwrap_or(usize::MAX)
            .min(self.page_size);
        let end = start.saturating_add(page_size).min(self.records.len());
        let page = self.records[start..end].to_vec();

        let millis_behind_latest = match (page.last(), self.records.last()) {
            (Some(returned), Some(tip)) if end < self.records.len() => {
                (Self::arrival_millis(tip) - Self::arrival_millis(returned)).max(1)
            }
            _ => 0,
        };

        let next_shard_iterator = if self.closed && end == self.records.len() {
            None
        } else {
            Some(Self::token(end))
        };

        Ok(RecordBatch {
            records: page,
            next_shard_iterator,
            millis_behind_latest: Some(millis_behind_latest),
        })
    }
}

pub fn millis(ts: &str) -> i64 {
    DateTime::parse_from_rfc3339(ts)
        .expect("valid timestamp")
        .timestamp_millis()
}

pub fn at(ts: &str) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis(ts)).unwrap()
}

pub fn lines(out: Vec<u8>) -> Vec<String> {
    String::from_utf8(out)
        .expect("output is UTF-8")
        .lines()
        .map(String::from)
        .collect()
}
