use std::collections::HashMap;

pub const DEFAULT_BASE_PATH: &str = "/content/contents/";

/// Rewrites sub-resource urls of an asset to their content-addressed
/// locations.
///
/// Assets reference their buffers and textures by file name. Resolved
/// against the asset url, those land below `base_path`; the remainder after
/// `base_path` is looked up in `mappings`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlRemap {
    base_path: String,
    mappings: HashMap<String, String>,
}

impl UrlRemap {
    pub fn new(mappings: HashMap<String, String>) -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            mappings,
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Returns the mapped url, or `url` itself when it is outside the base
    /// path or has no mapping.
    pub fn resolve(&self, url: &str) -> String {
        let key = match url.split_once(self.base_path.as_str()) {
            Some((_, key)) if !key.is_empty() => key,
            _ => return url.to_string(),
        };
        match self.mappings.get(key) {
            Some(mapped) => mapped.clone(),
            None => {
                log::warn!("No mapping for {key:?}, requesting {url} as is");
                url.to_string()
            }
        }
    }
}

impl Default for UrlRemap {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}
