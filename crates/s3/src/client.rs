//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from bx-core.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_smithy_types::DateTime;
use jiff::Timestamp;
use tokio::io::AsyncWriteExt;

use bx_core::{
    BucketInfo, Error, ListPage, ListRequest, ObjectMetadata, ObjectStore, ObjectSummary, Result,
};

/// Error codes that mean the caller has to fix their credentials
const CREDENTIAL_ERROR_CODES: &[&str] = &[
    "ExpiredToken",
    "ExpiredTokenException",
    "InvalidAccessKeyId",
    "InvalidClientTokenId",
    "InvalidToken",
    "SignatureDoesNotMatch",
    "UnrecognizedClientException",
];

const NOT_FOUND_CODES: &[&str] = &["NoSuchKey", "NoSuchBucket", "NotFound"];

/// Settings used to build an [`S3Client`]
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Named profile from the shared AWS files; SDK default chain when `None`
    pub profile: Option<String>,
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible services; enables path-style addressing
    pub endpoint: Option<String>,
}

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Build a client and verify that credentials resolve
    ///
    /// Fails with [`Error::InvalidCredentials`] when the profile yields no
    /// usable credentials, so the caller can send the user back to profile
    /// selection before any listing starts.
    pub async fn connect(options: ClientOptions) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(profile) = &options.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &options.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(endpoint) = &options.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;

        let provider = config.credentials_provider().ok_or_else(|| {
            Error::InvalidCredentials("No credentials provider configured".into())
        })?;
        provider
            .provide_credentials()
            .await
            .map_err(|e| Error::InvalidCredentials(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!(
            profile = options.profile.as_deref().unwrap_or("<default chain>"),
            region = ?config.region(),
            "Resolved AWS credentials"
        );

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(options.endpoint.is_some())
            .build();

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
        })
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        let response = self
            .inner
            .list_buckets()
            .send()
            .await
            .map_err(|e| classify("ListBuckets", "account", e))?;

        let buckets = response
            .buckets()
            .iter()
            .map(|b| BucketInfo {
                name: b.name().unwrap_or_default().to_string(),
                creation_date: b.creation_date().and_then(to_timestamp),
            })
            .collect();

        Ok(buckets)
    }

    async fn list_objects(&self, bucket: &str, request: ListRequest) -> Result<ListPage> {
        let target = format!("{bucket}/{}", request.prefix);
        let mut call = self.inner.list_objects_v2().bucket(bucket);

        if !request.prefix.is_empty() {
            call = call.prefix(&request.prefix);
        }
        if let Some(delimiter) = &request.delimiter {
            call = call.delimiter(delimiter);
        }
        if let Some(max) = request.max_keys {
            call = call.max_keys(max);
        }
        if let Some(token) = &request.continuation_token {
            call = call.continuation_token(token);
        }

        let response = call
            .send()
            .await
            .map_err(|e| classify("ListObjectsV2", &target, e))?;

        let common_prefixes = response
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix().map(str::to_string))
            .collect();

        let contents = response
            .contents()
            .iter()
            .filter_map(|object| {
                Some(ObjectSummary {
                    key: object.key()?.to_string(),
                    size: object.size().unwrap_or(0).max(0) as u64,
                    last_modified: object.last_modified().and_then(to_timestamp),
                })
            })
            .collect();

        // Some S3-compatible services keep returning a token on the last page
        let next_continuation_token = if response.is_truncated().unwrap_or(false) {
            response.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ListPage {
            common_prefixes,
            contents,
            next_continuation_token,
        })
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        let response = self
            .inner
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify("HeadObject", &format!("{bucket}/{key}"), e))?;

        Ok(ObjectMetadata {
            content_type: response.content_type().map(str::to_string),
        })
    }

    async fn download_file(&self, bucket: &str, key: &str, local_path: &Path) -> Result<()> {
        let response = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify("GetObject", &format!("{bucket}/{key}"), e))?;

        let mut body = response.body;
        let mut file = tokio::fs::File::create(local_path).await?;
        let mut written = 0u64;

        while let Some(chunk) = body.try_next().await.map_err(|e| Error::Download {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: e.to_string(),
        })? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!(bucket, key, bytes = written, path = %local_path.display(), "Downloaded object");
        Ok(())
    }

    async fn presign_url(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<url::Url> {
        let config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| Error::General(format!("Invalid presign expiry: {e}")))?;

        let request = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|e| classify("PresignGetObject", &format!("{bucket}/{key}"), e))?;

        Ok(url::Url::parse(request.uri())?)
    }
}

fn to_timestamp(value: &DateTime) -> Option<Timestamp> {
    Timestamp::new(value.secs(), value.subsec_nanos() as i32).ok()
}

/// Map an SDK failure onto the explorer's error kinds
fn classify<E, R>(operation: &'static str, target: &str, err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(str::to_string);
    let message = DisplayErrorContext(&err).to_string();
    classify_code(operation, target, code.as_deref(), message)
}

fn classify_code(
    operation: &'static str,
    target: &str,
    code: Option<&str>,
    message: String,
) -> Error {
    match code {
        Some(code) if CREDENTIAL_ERROR_CODES.contains(&code) => {
            Error::InvalidCredentials(format!("{code}: {message}"))
        }
        Some(code) if NOT_FOUND_CODES.contains(&code) => Error::NotFound(target.to_string()),
        None if looks_like_credentials_failure(&message) => Error::InvalidCredentials(message),
        _ => Error::store_request(operation, target, message),
    }
}

// Identity resolution failures surface before any HTTP response exists.
fn looks_like_credentials_failure(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("credentials") && (lower.contains("failed") || lower.contains("no credentials"))
}
