//! Sequential reader for a single Kinesis shard
//!
//! The slurper opens an `AT_TIMESTAMP` iterator on one shard and follows the
//! chain of `NextShardIterator` tokens, one `GetRecords` call at a time, until
//! the service reports an empty page with zero lag or closes the shard. Every
//! record is turned into a [`StreamItem`] and written out as a JSON line.
//!
//! Nothing is retried: the first failure from the service, the serializer or
//! the output ends the run.

use crate::client::{KinesisClientTrait, RecordBatch};
use crate::error::{Result, SlurperError};
use crate::record::{write_json_line, StreamItem};
use aws_sdk_kinesis::types::{Record, ShardIteratorType};
use chrono::{DateTime, Utc};
use futures::stream::{self, Stream, TryStreamExt};
use std::io::Write;
use tracing::{debug, info, instrument, trace};

/// Where to read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlurpRequest {
    pub stream_name: String,
    pub shard_id: String,
    pub from_timestamp: DateTime<Utc>,
}

/// What a finished run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlurpSummary {
    pub records_written: u64,
    pub batches_fetched: u64,
}

/// Records of one `GetRecords` page plus the cursor for the next call.
///
/// `next_iterator` is `None` once the shard has nothing more to give.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub records: Vec<Record>,
    pub next_iterator: Option<String>,
}

impl Batch {
    fn end() -> Self {
        Self::default()
    }

    pub fn is_last(&self) -> bool {
        self.next_iterator.is_none()
    }
}

impl From<RecordBatch> for Batch {
    fn from(batch: RecordBatch) -> Self {
        // An empty page with no lag means we've caught up with the tip.
        if batch.records.is_empty() && batch.millis_behind_latest.unwrap_or(0) == 0 {
            return Batch::end();
        }

        Batch {
            records: batch.records,
            next_iterator: batch.next_shard_iterator,
        }
    }
}

enum Cursor {
    Start,
    Open(String),
    Done,
}

pub struct Slurper<C>
where
    C: KinesisClientTrait,
{
    client: C,
    batch_limit: Option<i32>,
}

impl<C> Slurper<C>
where
    C: KinesisClientTrait,
{
    pub fn new(client: C) -> Self {
        Self {
            client,
            batch_limit: None,
        }
    }

    /// Cap the number of records requested per `GetRecords` call
    pub fn with_batch_limit(mut self, limit: Option<i32>) -> Self {
        self.batch_limit = limit;
        self
    }

    #[instrument(skip(self))]
    pub async fn initial_iterator(
        &self,
        stream_name: &str,
        shard_id: &str,
        from: &DateTime<Utc>,
    ) -> Result<String> {
        let iterator = self
            .client
            .get_shard_iterator(
                stream_name,
                shard_id,
                ShardIteratorType::AtTimestamp,
                Some(from),
            )
            .await
            .map_err(SlurperError::get_iterator)?;

        if iterator.is_empty() {
            return Err(SlurperError::GetIteratorFailed(
                "no shard iterator returned".to_string(),
            ));
        }

        debug!("Obtained initial shard iterator");
        Ok(iterator)
    }

    /// Fetch the page at `iterator`
    pub async fn next_batch(&self, iterator: &str) -> Result<Batch> {
        let page = self
            .client
            .get_records(iterator, self.batch_limit)
            .await
            .map_err(SlurperError::get_records)?;

        debug!(
            records = page.records.len(),
            millis_behind_latest = ?page.millis_behind_latest,
            has_next = page.next_shard_iterator.is_some(),
            "Fetched batch"
        );

        Ok(Batch::from(page))
    }

    /// Pages of the shard from `request.from_timestamp` onward, following
    /// the iterator chain until the service reports the end.
    pub fn batches<'a>(
        &'a self,
        request: &'a SlurpRequest,
    ) -> impl Stream<Item = Result<Batch>> + 'a {
        stream::try_unfold(Cursor::Start, move |cursor| async move {
            let iterator = match cursor {
                Cursor::Start => {
                    self.initial_iterator(
                        &request.stream_name,
                        &request.shard_id,
                        &request.from_timestamp,
                    )
                    .await?
                }
                Cursor::Open(iterator) => iterator,
                Cursor::Done => return Ok(None),
            };

            let batch = self.next_batch(&iterator).await?;
            let next = match &batch.next_iterator {
                Some(next) => Cursor::Open(next.clone()),
                None => Cursor::Done,
            };

            Ok::<_, SlurperError>(Some((batch, next)))
        })
    }

    /// Lazily yield every item up to the tip of the shard, in arrival order.
    /// The stream ends after the first error.
    pub fn items<'a>(
        &'a self,
        request: &'a SlurpRequest,
    ) -> impl Stream<Item = Result<StreamItem>> + 'a {
        self.batches(request)
            .map_ok(|batch| {
                stream::iter(
                    batch
                        .records
                        .into_iter()
                        .map(|record| StreamItem::from_record(&record)),
                )
            })
            .try_flatten()
    }

    /// Write every item of `request` to `out`, one JSON object per line
    #[instrument(skip(self, out), fields(stream = %request.stream_name, shard = %request.shard_id))]
    pub async fn slurp<W: Write + ?Sized>(
        &self,
        request: &SlurpRequest,
        out: &mut W,
    ) -> Result<SlurpSummary> {
        info!(from = %request.from_timestamp, "Reading shard");

        let mut summary = SlurpSummary::default();
        let batches = self.batches(request);
        futures::pin_mut!(batches);

        while let Some(batch) = batches.try_next().await? {
            summary.batches_fetched += 1;
            for record in &batch.records {
                let item = StreamItem::from_record(record)?;
                write_json_line(out, &item)?;
                summary.records_written += 1;
            }
            trace!(records_written = summary.records_written, "Wrote batch");
        }
        out.flush()?;

        info!(
            records_written = summary.records_written,
            batches_fetched = summary.batches_fetched,
            "Reached the end of the shard"
        );
        Ok(summary)
    }
}
