use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use futures::StreamExt;
use futures::stream::FuturesUnordered;

use crate::assets::bitmap::{Bitmap, decode_image};
use crate::assets::source::ImageSource;
use crate::foundation::error::{FourcutError, FourcutResult};

/// Resolves one image reference into a decoded bitmap.
///
/// Implementations may complete out of order and run concurrently; [`fetch_all`] restores the
/// request order. Timeouts and retries are the implementation's own policy.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, source: &ImageSource) -> impl Future<Output = FourcutResult<Bitmap>> + Send;
}

/// Fetch every source concurrently and return the bitmaps in input order.
///
/// Resident bitmaps bypass `fetcher`. The first failure aborts the batch with
/// [`FourcutError::IncompleteFetch`]; fetches still in flight are dropped.
#[tracing::instrument(skip_all, fields(count = sources.len()))]
pub async fn fetch_all<F: ImageFetcher>(
    fetcher: &F,
    sources: &[ImageSource],
) -> FourcutResult<Vec<Bitmap>> {
    let mut pending = sources
        .iter()
        .enumerate()
        .map(|(index, source)| async move {
            let result = match source {
                ImageSource::Bitmap(b) => Ok(b.clone()),
                other => fetcher.fetch(other).await,
            };
            (index, result)
        })
        .collect::<FuturesUnordered<_>>();

    let mut tagged = Vec::with_capacity(sources.len());
    while let Some((index, result)) = pending.next().await {
        match result {
            Ok(bitmap) => {
                tracing::debug!(index, width = bitmap.width, height = bitmap.height, "fetched");
                tagged.push((index, bitmap));
            }
            Err(e) => {
                return Err(FourcutError::incomplete_fetch(
                    sources.len(),
                    tagged.len(),
                    format!("source #{index} ({}) failed: {e}", sources[index]),
                ));
            }
        }
    }

    assemble_in_order(sources.len(), tagged)
}

/// Fetch a single optional source, used for identity badges.
pub async fn fetch_optional<F: ImageFetcher>(
    fetcher: &F,
    source: Option<&ImageSource>,
) -> FourcutResult<Option<Bitmap>> {
    let Some(source) = source else {
        return Ok(None);
    };
    let result = match source {
        ImageSource::Bitmap(b) => Ok(b.clone()),
        other => fetcher.fetch(other).await,
    };
    result
        .map(Some)
        .map_err(|e| FourcutError::incomplete_fetch(1, 0, format!("badge ({source}) failed: {e}")))
}

/// Sort index-tagged results back into request order, rejecting gaps and duplicates.
pub(crate) fn assemble_in_order(
    expected: usize,
    mut tagged: Vec<(usize, Bitmap)>,
) -> FourcutResult<Vec<Bitmap>> {
    if tagged.len() != expected {
        return Err(FourcutError::incomplete_fetch(
            expected,
            tagged.len(),
            "result count does not match request count",
        ));
    }
    tagged.sort_by_key(|(index, _)| *index);
    if let Some((pos, (index, _))) = tagged
        .iter()
        .enumerate()
        .find(|(pos, (index, _))| pos != index)
    {
        return Err(FourcutError::incomplete_fetch(
            expected,
            pos,
            format!("missing result for source #{pos} (found #{index})"),
        ));
    }
    Ok(tagged.into_iter().map(|(_, bitmap)| bitmap).collect())
}

/// Fetch-side configuration.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout for remote sources, in seconds.
    pub timeout_secs: u64,
    /// Upper bound on encoded bytes accepted for one source.
    pub max_encoded_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_encoded_bytes: 32 * 1024 * 1024,
        }
    }
}

/// Default fetcher: `reqwest` for `http(s)` sources, `tokio::fs` for local files.
#[derive(Clone, Debug)]
pub struct SourceFetcher {
    http: reqwest::Client,
    max_encoded_bytes: u64,
}

impl SourceFetcher {
    pub fn new(config: &FetchConfig) -> FourcutResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            max_encoded_bytes: config.max_encoded_bytes,
        })
    }

    async fn read_remote(&self, url: &url::Url) -> FourcutResult<Vec<u8>> {
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url}"))?;
        if let Some(len) = resp.content_length() {
            self.check_len(len)?;
        }
        let bytes = resp
            .bytes()
            .await
            .with_context(|| format!("read body of {url}"))?;
        self.check_len(bytes.len() as u64)?;
        Ok(bytes.to_vec())
    }

    async fn read_file(&self, path: &std::path::Path) -> FourcutResult<Vec<u8>> {
        let meta = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("stat '{}'", path.display()))?;
        self.check_len(meta.len())?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("read '{}'", path.display()))?;
        Ok(bytes)
    }

    fn check_len(&self, len: u64) -> FourcutResult<()> {
        if len > self.max_encoded_bytes {
            return Err(FourcutError::validation(format!(
                "encoded image is {len} bytes (max {})",
                self.max_encoded_bytes
            )));
        }
        Ok(())
    }
}

impl ImageFetcher for SourceFetcher {
    async fn fetch(&self, source: &ImageSource) -> FourcutResult<Bitmap> {
        let bytes = match source {
            ImageSource::Bitmap(b) => return Ok(b.clone()),
            ImageSource::Remote(url) => self.read_remote(url).await?,
            ImageSource::File(path) => self.read_file(path).await?,
        };
        decode_image(&bytes)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
