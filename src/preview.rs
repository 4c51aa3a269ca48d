//! The one-call wearable preview.

use std::collections::HashMap;

use anyhow::Context as _;

use crate::{
    camera::{WearableCategory, zoom_for_category},
    center::center,
    context::{Context, RenderTarget, RigConfig, create_scene},
    data_structures::scene_graph::NodeId,
    patch::patch_materials,
    resources::{
        AppendedAsset, AssetFormat, LoadSession, load_asset, fetch::Fetch, remap::UrlRemap,
    },
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewOptions {
    pub category: WearableCategory,
    /// `#RRGGBB` or `#RRGGBBAA`. Skin parts are hidden without it.
    pub skin: Option<String>,
    /// `#RRGGBB` or `#RRGGBBAA`. Hair parts are hidden without it.
    pub hair: Option<String>,
}

impl PreviewOptions {
    pub fn new(category: WearableCategory) -> Self {
        Self {
            category,
            skin: None,
            hair: None,
        }
    }

    pub fn with_skin(mut self, skin: impl Into<String>) -> Self {
        self.skin = Some(skin.into());
        self
    }

    pub fn with_hair(mut self, hair: impl Into<String>) -> Self {
        self.hair = Some(hair.into());
        self
    }
}

/// A running preview. Dropping it stops rendering.
#[derive(Debug)]
pub struct Preview<T: RenderTarget> {
    pub context: Context<T>,
    /// Synthetic root holding the whole wearable.
    pub root: NodeId,
    pub asset: AppendedAsset,
}

impl<T: RenderTarget> Preview<T> {
    pub fn dispose(&mut self) {
        self.context.dispose();
    }
}

/// Sets up the preview rig on `target`, loads the wearable at `url` and
/// frames it.
///
/// `mappings` maps file names referenced by the asset to their content urls.
/// Rendering starts before the asset arrives and keeps running after this
/// returns, so it must be called inside a [`tokio::task::LocalSet`].
pub async fn preview<T, F>(
    target: T,
    url: &str,
    mappings: HashMap<String, String>,
    options: PreviewOptions,
    fetcher: &F,
) -> anyhow::Result<Preview<T>>
where
    T: RenderTarget + 'static,
    F: Fetch,
{
    preview_with_config(target, url, mappings, options, fetcher, RigConfig::default()).await
}

/// [`preview`] with a custom rig.
pub async fn preview_with_config<T, F>(
    target: T,
    url: &str,
    mappings: HashMap<String, String>,
    options: PreviewOptions,
    fetcher: &F,
    config: RigConfig,
) -> anyhow::Result<Preview<T>>
where
    T: RenderTarget + 'static,
    F: Fetch,
{
    let zoom = zoom_for_category(options.category);
    let context = create_scene(target, zoom, config)?;

    let remap = UrlRemap::new(mappings);
    let session = LoadSession::new(fetcher, &remap);
    let loaded = load_asset(url, &AssetFormat::FALLBACK_ORDER, &session).await?;

    let (asset, root) = {
        let mut scene = context.scene_mut();
        let asset = loaded.append_to(&mut scene);
        patch_materials(
            &mut scene,
            &asset.materials,
            options.skin.as_deref(),
            options.hair.as_deref(),
        )
        .with_context(|| format!("Cannot apply the avatar colours to {url}"))?;
        let root = center(&mut scene);
        (asset, root)
    };
    log::info!(
        "Previewing {} ({}) with {} nodes and {} materials",
        url,
        options.category,
        asset.nodes.len(),
        asset.materials.len()
    );

    Ok(Preview {
        context,
        root,
        asset,
    })
}
