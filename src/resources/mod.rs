//! Asset loading: fetching, url remapping and glTF parsing.
//!
//! A load never touches a scene. It produces a [`LoadedAsset`] which is
//! appended to a scene only once every sub-resource has arrived, so a failed
//! attempt leaves nothing behind.

use anyhow::{Context, anyhow, bail};

use crate::resources::{fetch::Fetch, remap::UrlRemap};

pub mod document;
pub mod fetch;
pub mod remap;

pub use document::{AppendedAsset, AssetFormat, LoadedAsset, LoadedNode};

/// Everything a single load needs besides the url: where bytes come from
/// and how sub-resource urls are rewritten.
pub struct LoadSession<'a, F: Fetch> {
    pub fetcher: &'a F,
    pub remap: &'a UrlRemap,
}

impl<'a, F: Fetch> LoadSession<'a, F> {
    pub fn new(fetcher: &'a F, remap: &'a UrlRemap) -> Self {
        Self { fetcher, remap }
    }

    /// Resolves `uri` against the asset url and applies the remap.
    pub fn resolve(&self, asset_url: &str, uri: &str) -> anyhow::Result<String> {
        if uri.starts_with("data:") {
            bail!("Embedded data uris are not supported");
        }
        Ok(self.remap.resolve(&resolve_uri(asset_url, uri)?))
    }
}

/// Resolves `uri` against `base`.
///
/// Absolute bases are joined with [`url::Url::join`]. Bases that are plain
/// relative paths, as used with the file fetcher, get `uri` appended to their
/// directory.
fn resolve_uri(base: &str, uri: &str) -> anyhow::Result<String> {
    match url::Url::parse(base) {
        Ok(base_url) => {
            let joined = base_url
                .join(uri)
                .with_context(|| format!("Cannot resolve {uri:?} against {base}"))?;
            Ok(joined.into())
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            if url::Url::parse(uri).is_ok() || uri.starts_with('/') {
                return Ok(uri.to_string());
            }
            Ok(match base.rfind('/') {
                Some(idx) => format!("{}{}", &base[..=idx], uri),
                None => uri.to_string(),
            })
        }
        Err(e) => Err(e).with_context(|| format!("Malformed asset url {base}")),
    }
}

/// Loads `url` trying each of `formats` in order with the same url.
///
/// Only the error of the last attempt is kept; earlier ones are logged.
pub async fn load_asset<F: Fetch>(
    url: &str,
    formats: &[AssetFormat],
    session: &LoadSession<'_, F>,
) -> anyhow::Result<LoadedAsset> {
    let mut last_error = None;
    for &format in formats {
        match load_as(url, format, session).await {
            Ok(asset) => {
                log::info!("Loaded {url} as {format}");
                return Ok(asset);
            }
            Err(e) => {
                log::warn!("Loading {url} as {format} failed: {e:#}");
                last_error = Some(e);
            }
        }
    }
    let tried = formats
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let error = last_error.unwrap_or_else(|| anyhow!("No asset formats to try"));
    Err(error.context(format!("failed to load {url} as any of [{tried}]")))
}

/// Loads `url` as exactly one packaging format.
pub async fn load_as<F: Fetch>(
    url: &str,
    format: AssetFormat,
    session: &LoadSession<'_, F>,
) -> anyhow::Result<LoadedAsset> {
    let bytes = session
        .fetcher
        .fetch(url)
        .await
        .with_context(|| format!("Cannot fetch {url}"))?;
    let (document, mut blob) = document::parse(&bytes, format)?;

    // external buffers are fetched concurrently, the binary chunk is used as is
    let mut resources = Vec::new();
    let mut locations = Vec::new();
    for buffer in document.buffers() {
        let location = match buffer.source() {
            gltf::buffer::Source::Bin => None,
            gltf::buffer::Source::Uri(uri) => Some((uri, session.resolve(url, uri)?)),
        };
        locations.push(location);
    }
    let fetched = futures::future::try_join_all(locations.iter().map(|location| async move {
        match location {
            Some((uri, resolved)) => session
                .fetcher
                .fetch(resolved)
                .await
                .with_context(|| format!("Cannot fetch buffer {uri:?} from {resolved}"))
                .map(Some),
            None => Ok(None),
        }
    }))
    .await?;

    let mut buffers = Vec::new();
    for ((buffer, location), data) in document.buffers().zip(&locations).zip(fetched) {
        let data = match data {
            Some(data) => data,
            None => blob.take().with_context(|| {
                format!("Buffer {} refers to a missing binary chunk", buffer.index())
            })?,
        };
        if data.len() < buffer.length() {
            bail!(
                "Buffer {} holds {} bytes but declares {}",
                buffer.index(),
                data.len(),
                buffer.length()
            );
        }
        if let Some((_, resolved)) = location {
            resources.push(resolved.clone());
        }
        buffers.push(data);
    }

    let mut images = Vec::new();
    for image in document.images() {
        let resolved = match image.source() {
            gltf::image::Source::Uri { uri, .. } => {
                let resolved = session.resolve(url, uri)?;
                resources.push(resolved.clone());
                Some(resolved)
            }
            gltf::image::Source::View { .. } => None,
        };
        images.push(resolved);
    }

    document::to_loaded_asset(url, format, &document, &buffers, &images, resources)
}
