use std::path::PathBuf;

use anyhow::Context;

/// Source of raw bytes for an asset and its sub-resources.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>>;
}

impl<F: Fetch> Fetch for &F {
    async fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        (**self).fetch(url).await
    }
}

/// Reads assets from a directory; urls are treated as relative paths.
#[derive(Clone, Debug)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for FileFetcher {
    fn default() -> Self {
        Self::new("./assets")
    }
}

impl Fetch for FileFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.root.join(url.trim_start_matches('/'));
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Cannot read {}", path.display()))
    }
}

/// Fetches over HTTP(S).
#[cfg(feature = "http")]
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()
            .with_context(|| format!("GET {url} failed"))?;
        Ok(response.bytes().await?.to_vec())
    }
}
