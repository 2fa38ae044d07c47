use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_kinesis::{
    config::Region,
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    types::{Record, ShardIteratorType},
    Client,
};
use aws_smithy_types_convert::date_time::DateTimeExt;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

/// Failure reported by a Kinesis API call, classified by its error code
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KinesisClientError {
    #[error("Iterator expired")]
    ExpiredIterator,

    #[error("Provisioned throughput exceeded")]
    ThroughputExceeded,

    #[error("Access denied")]
    AccessDenied,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("KMS error: {0}")]
    KmsError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("{0}")]
    Other(String),
}

impl<E> From<SdkError<E>> for KinesisClientError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    fn from(err: SdkError<E>) -> Self {
        let context = DisplayErrorContext(&err).to_string();
        match &err {
            SdkError::TimeoutError(_) => return KinesisClientError::Timeout(context),
            SdkError::DispatchFailure(_) => return KinesisClientError::ConnectionError(context),
            _ => {}
        }

        let Some(service_err) = err.as_service_error() else {
            return KinesisClientError::Other(context);
        };

        let message = service_err.message().unwrap_or_default().to_string();
        match service_err.code() {
            Some("ExpiredIteratorException") => KinesisClientError::ExpiredIterator,
            Some("ProvisionedThroughputExceededException") => {
                KinesisClientError::ThroughputExceeded
            }
            Some("AccessDeniedException") => KinesisClientError::AccessDenied,
            Some("InvalidArgumentException") => KinesisClientError::InvalidArgument(message),
            Some("ResourceNotFoundException") => KinesisClientError::ResourceNotFound(message),
            Some(code) if code.starts_with("KMS") => {
                KinesisClientError::KmsError(format!("{}: {}", code, message))
            }
            Some(code) => KinesisClientError::Other(format!("{}: {}", code, message)),
            None => KinesisClientError::Other(context),
        }
    }
}

/// One page of a shard as returned by `GetRecords`
#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    pub records: Vec<Record>,
    /// Cursor for the following call; absent once the shard is closed
    pub next_shard_iterator: Option<String>,
    /// How far behind the tip of the shard this page is
    pub millis_behind_latest: Option<i64>,
}

#[async_trait]
pub trait KinesisClientTrait: Send + Sync {
    async fn get_shard_iterator(
        &self,
        stream_name: &str,
        shard_id: &str,
        iterator_type: ShardIteratorType,
        timestamp: Option<&DateTime<Utc>>,
    ) -> Result<String, KinesisClientError>;

    async fn get_records(
        &self,
        iterator: &str,
        limit: Option<i32>,
    ) -> Result<RecordBatch, KinesisClientError>;
}

#[async_trait]
impl KinesisClientTrait for Client {
    async fn get_shard_iterator(
        &self,
        stream_name: &str,
        shard_id: &str,
        iterator_type: ShardIteratorType,
        timestamp: Option<&DateTime<Utc>>,
    ) -> Result<String, KinesisClientError> {
        let mut req = self
            .get_shard_iterator()
            .stream_name(stream_name)
            .shard_id(shard_id)
            .shard_iterator_type(iterator_type);

        if let Some(ts) = timestamp {
            req = req.timestamp(aws_smithy_types::DateTime::from_chrono_utc(*ts));
        }

        let response = req.send().await?;
        Ok(response.shard_iterator.unwrap_or_default())
    }

    async fn get_records(
        &self,
        iterator: &str,
        limit: Option<i32>,
    ) -> Result<RecordBatch, KinesisClientError> {
        let response = self
            .get_records()
            .shard_iterator(iterator)
            .set_limit(limit)
            .send()
            .await?;

        Ok(RecordBatch {
            records: response.records,
            next_shard_iterator: response.next_shard_iterator,
            millis_behind_latest: response.millis_behind_latest,
        })
    }
}

/// Build a Kinesis client for `region` from the default credential chain
pub async fn create_client(region: &str, endpoint_url: Option<&str>) -> Client {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));

    if let Some(endpoint_url) = endpoint_url {
        debug!(endpoint_url = %endpoint_url, "Overriding Kinesis endpoint");
        loader = loader.endpoint_url(endpoint_url);
    }

    let shared_config = loader.load().await;
    Client::new(&shared_config)
}
