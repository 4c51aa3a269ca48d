use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
    rc::Rc,
};

use serde_json::{Value, json};
use wearable_preview::{
    context::{EngineOptions, RenderTarget, Rig},
    data_structures::scene_graph::Scene,
    resources::fetch::Fetch,
};

/// Serves fixed bytes per url and remembers every request in order.
///
/// A url with several queued responses answers them in turn and repeats the
/// last one.
#[derive(Default)]
pub struct MockFetcher {
    files: RefCell<HashMap<String, VecDeque<Vec<u8>>>>,
    requests: RefCell<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, url: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.files
            .borrow_mut()
            .insert(url.to_string(), VecDeque::from([bytes.into()]));
        self
    }

    /// Queues `bytes` as the response after the ones already set for `url`.
    pub fn then(self, url: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.files
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .push_back(bytes.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Fetch for MockFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        self.requests.borrow_mut().push(url.to_string());
        let mut files = self.files.borrow_mut();
        let responses = files
            .get_mut(url)
            .filter(|responses| !responses.is_empty())
            .ok_or_else(|| anyhow::anyhow!("404: {url}"))?;
        if responses.len() > 1 {
            Ok(responses.pop_front().unwrap_or_default())
        } else {
            Ok(responses[0].clone())
        }
    }
}

/// Shared view on what a [`RecordingTarget`] went through.
#[derive(Clone, Default, Debug)]
pub struct Recording {
    pub configured: Rc<RefCell<Option<EngineOptions>>>,
    pub frames: Rc<Cell<u32>>,
    pub last_node_count: Rc<Cell<usize>>,
    pub last_alpha: Rc<Cell<f32>>,
    pub disposed: Rc<Cell<bool>>,
}

#[derive(Debug)]
pub struct RecordingTarget {
    recording: Recording,
}

impl RecordingTarget {
    pub fn new() -> (Self, Recording) {
        let recording = Recording::default();
        (
            Self {
                recording: recording.clone(),
            },
            recording,
        )
    }
}

impl RenderTarget for RecordingTarget {
    fn configure(&mut self, options: &EngineOptions) -> anyhow::Result<()> {
        *self.recording.configured.borrow_mut() = Some(*options);
        Ok(())
    }

    fn draw(&mut self, scene: &Scene, rig: &Rig) -> anyhow::Result<()> {
        self.recording.frames.set(self.recording.frames.get() + 1);
        self.recording.last_node_count.set(scene.node_count());
        self.recording.last_alpha.set(rig.camera.alpha);
        Ok(())
    }

    fn dispose(&mut self) {
        self.recording.disposed.set(true);
    }
}

/// Triangle shared by every mesh of the fixtures.
pub const TRIANGLE: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 4.0, 2.0]];

pub fn triangle_bin() -> Vec<u8> {
    TRIANGLE
        .iter()
        .flatten()
        .flat_map(|f| f.to_le_bytes())
        .collect()
}

/// A wearable with a shirt, hair and a skin part nested below the hair.
///
/// `buffer_uri` is `None` for GLB packaging, where the buffer is the binary
/// chunk.
pub fn wearable_json(buffer_uri: Option<&str>) -> Value {
    let mut buffer = json!({ "byteLength": 36 });
    if let Some(uri) = buffer_uri {
        buffer["uri"] = json!(uri);
    }
    let mesh = |material: usize| {
        json!({
            "primitives": [{ "attributes": { "POSITION": 0 }, "material": material }]
        })
    };
    json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0, 1] }],
        "nodes": [
            { "name": "Shirt", "mesh": 0, "translation": [1.0, 0.0, 0.0] },
            { "name": "Hair", "mesh": 1, "children": [2] },
            { "name": "Skin", "mesh": 2, "scale": [2.0, 2.0, 2.0] }
        ],
        "meshes": [mesh(0), mesh(1), mesh(2)],
        "materials": [
            { "name": "Shirt_MAT", "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 1.0] } },
            { "name": "Hair_MAT_01", "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } } },
            { "name": "AvatarSkin_MAT" }
        ],
        "textures": [{ "source": 0 }],
        "images": [{ "uri": "hair.png" }],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [2.0, 4.0, 2.0]
        }],
        "bufferViews": [{ "buffer": 0, "byteLength": 36 }],
        "buffers": [buffer]
    })
}

/// Packs a JSON document and a binary chunk into a GLB container.
pub fn to_glb(json: &Value, bin: &[u8]) -> Vec<u8> {
    let mut json_chunk = serde_json::to_vec(json).expect("fixture serializes");
    while json_chunk.len() % 4 != 0 {
        json_chunk.push(b' ');
    }
    let mut bin_chunk = bin.to_vec();
    while bin_chunk.len() % 4 != 0 {
        bin_chunk.push(0);
    }
    let length = 12 + 8 + json_chunk.len() + 8 + bin_chunk.len();

    let mut glb = Vec::with_capacity(length);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(length as u32).to_le_bytes());
    glb.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json_chunk);
    glb.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin_chunk);
    glb
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}
