use crate::domain::constants::MAX_SIGNATURE_BYTES;
use crate::domain::models::{LimitedBody, Request, ResourceKind};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("could not download {kind} from {url}: {source}")]
    Network {
        kind: ResourceKind,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not download {kind} from {url}: unexpected HTTP status {status}")]
    UnexpectedStatus {
        kind: ResourceKind,
        url: String,
        status: StatusCode,
    },
    #[error("could not read {kind} body from {url}: {source}")]
    Body {
        kind: ResourceKind,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("downloads did not finish within {0:?}")]
    DeadlineExceeded(Duration),
    #[error("download cancelled")]
    Cancelled,
}

/// An accepted (status 200) response whose body has not been read yet.
#[derive(Debug)]
pub struct FetchResult {
    pub kind: ResourceKind,
    pub url: String,
    pub size_limit: u64,
    response: Response,
}

impl FetchResult {
    /// Reads the body, keeping at most `size_limit` bytes.
    ///
    /// Exceeding the limit is not an error here: the body is cut and flagged,
    /// and the connection is dropped without draining the rest.
    pub async fn read_limited(mut self) -> Result<LimitedBody, FetchError> {
        let limit = usize::try_from(self.size_limit).unwrap_or(usize::MAX);
        let mut bytes = Vec::new();
        let mut truncated = false;
        while let Some(chunk) = self.response.chunk().await.map_err(|source| FetchError::Body {
            kind: self.kind,
            url: self.url.clone(),
            source,
        })? {
            let room = limit - bytes.len();
            if chunk.len() > room {
                bytes.extend_from_slice(&chunk[..room]);
                truncated = true;
                break;
            }
            bytes.extend_from_slice(&chunk);
        }
        debug!(kind = %self.kind, bytes = bytes.len(), truncated, "body read");
        Ok(LimitedBody {
            kind: self.kind,
            bytes,
            truncated,
        })
    }
}

/// Both accepted responses plus the deadline their bodies must be read by.
#[derive(Debug)]
pub struct FetchedPair {
    pub content: FetchResult,
    pub signature: FetchResult,
    pub deadline: Instant,
    download_timeout: Duration,
}

impl FetchedPair {
    /// Reads both bodies concurrently under the shared download deadline.
    pub async fn read_bodies(
        self,
        cancel: &CancellationToken,
    ) -> Result<(LimitedBody, LimitedBody), FetchError> {
        let reads = async {
            tokio::try_join!(self.content.read_limited(), self.signature.read_limited())
        };
        tokio::select! {
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            res = tokio::time::timeout_at(self.deadline, reads) => match res {
                Ok(bodies) => bodies,
                Err(_) => Err(FetchError::DeadlineExceeded(self.download_timeout)),
            },
        }
    }
}

pub fn build_client(download_timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(download_timeout).build()
}

/// Single GET, no retries. Anything but 200 is an error.
pub async fn fetch(
    client: &Client,
    kind: ResourceKind,
    url: &str,
    size_limit: u64,
) -> Result<FetchResult, FetchError> {
    debug!(%kind, url, "fetching");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Network {
            kind,
            url: url.to_string(),
            source,
        })?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::UnexpectedStatus {
            kind,
            url: url.to_string(),
            status,
        });
    }
    debug!(%kind, url, "response accepted");
    Ok(FetchResult {
        kind,
        url: url.to_string(),
        size_limit,
        response,
    })
}

/// Fetches content and signature concurrently under one deadline.
///
/// The first failure wins and the sibling request is dropped, which aborts
/// its connection. Callers get both responses or none.
pub async fn fetch_both(
    client: &Client,
    request: &Request,
    cancel: &CancellationToken,
) -> Result<FetchedPair, FetchError> {
    let deadline = Instant::now() + request.download_timeout;
    let both = async {
        tokio::try_join!(
            fetch(
                client,
                ResourceKind::Content,
                &request.content_url,
                request.max_bytes
            ),
            fetch(
                client,
                ResourceKind::Signature,
                &request.signature_url,
                MAX_SIGNATURE_BYTES
            ),
        )
    };
    tokio::select! {
        _ = cancel.cancelled() => Err(FetchError::Cancelled),
        res = tokio::time::timeout_at(deadline, both) => match res {
            Ok(Ok((content, signature))) => Ok(FetchedPair {
                content,
                signature,
                deadline,
                download_timeout: request.download_timeout,
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(FetchError::DeadlineExceeded(request.download_timeout)),
        },
    }
}
