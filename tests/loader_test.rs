use std::collections::HashMap;

use cgmath::Point3;
use serde_json::json;
use wearable_preview::{
    data_structures::{material::MaterialRole, scene_graph::Scene},
    resources::{AssetFormat, LoadSession, load_as, load_asset, remap::UrlRemap},
};

use crate::common::test_utils::{MockFetcher, to_glb, triangle_bin, wearable_json};

mod common;

const URL: &str = "https://peer.example/content/contents/QmWearable";

fn remap() -> UrlRemap {
    UrlRemap::new(HashMap::from([
        ("model.bin".to_string(), "https://cdn.example/QmBuffer".to_string()),
        ("hair.png".to_string(), "https://cdn.example/QmHairTexture".to_string()),
    ]))
}

#[tokio::test]
async fn should_load_glb_on_first_attempt() {
    let fetcher = MockFetcher::new().with(URL, to_glb(&wearable_json(None), &triangle_bin()));
    let remap = remap();
    let session = LoadSession::new(&fetcher, &remap);

    let asset = load_asset(URL, &AssetFormat::FALLBACK_ORDER, &session)
        .await
        .unwrap();

    assert_eq!(asset.format, AssetFormat::Binary);
    assert_eq!(fetcher.requests(), vec![URL.to_string()]);

    let names: Vec<_> = asset.nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, ["Shirt", "Hair"]);
    assert_eq!(asset.nodes[1].children[0].name, "Skin");

    let geometry = asset.nodes[0].geometry.unwrap();
    assert_eq!(geometry.min, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(geometry.max, Point3::new(2.0, 4.0, 2.0));
    assert_eq!(asset.nodes[0].transform.position.x, 1.0);

    let materials: Vec<_> = asset.materials.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(materials, ["Shirt_MAT", "Hair_MAT_01", "AvatarSkin_MAT"]);
    assert_eq!(asset.materials[0].albedo.r, 1.0);
    assert_eq!(asset.materials[0].albedo.g, 0.0);
    assert_eq!(
        asset.materials[1].base_color_texture.as_deref(),
        Some("https://cdn.example/QmHairTexture")
    );
    assert_eq!(asset.resources, vec!["https://cdn.example/QmHairTexture".to_string()]);
}

#[tokio::test]
async fn should_fall_back_to_text_with_the_same_url() {
    let json = serde_json::to_vec(&wearable_json(Some("model.bin"))).unwrap();
    let fetcher = MockFetcher::new()
        .with(URL, json)
        .with("https://cdn.example/QmBuffer", triangle_bin());
    let remap = remap();
    let session = LoadSession::new(&fetcher, &remap);

    let asset = load_asset(URL, &AssetFormat::FALLBACK_ORDER, &session)
        .await
        .unwrap();

    assert_eq!(asset.format, AssetFormat::Text);
    assert_eq!(
        fetcher.requests(),
        vec![
            URL.to_string(),
            URL.to_string(),
            "https://cdn.example/QmBuffer".to_string()
        ]
    );
    assert_eq!(
        asset.resources,
        vec![
            "https://cdn.example/QmBuffer".to_string(),
            "https://cdn.example/QmHairTexture".to_string()
        ]
    );
}

#[tokio::test]
async fn should_report_a_single_error_when_every_format_fails() {
    let fetcher = MockFetcher::new().with(URL, b"definitely not a model".to_vec());
    let remap = remap();
    let session = LoadSession::new(&fetcher, &remap);

    let error = load_asset(URL, &AssetFormat::FALLBACK_ORDER, &session)
        .await
        .unwrap_err();

    assert!(error.to_string().contains("[glb, gltf]"), "{error:#}");
    assert_eq!(fetcher.requests(), vec![URL.to_string(), URL.to_string()]);
}

#[tokio::test]
async fn should_not_keep_anything_from_a_failed_attempt() {
    // the GLB parses but its external buffer is missing, the retry serves text
    let mut broken = wearable_json(Some("broken.bin"));
    broken["nodes"][0]["name"] = json!("Broken");
    broken["materials"][0]["name"] = json!("Broken_MAT");
    let text = serde_json::to_vec(&wearable_json(Some("model.bin"))).unwrap();
    let fetcher = MockFetcher::new()
        .with(URL, to_glb(&broken, &triangle_bin()))
        .then(URL, text)
        .with("https://cdn.example/QmBuffer", triangle_bin());
    let remap = remap();
    let session = LoadSession::new(&fetcher, &remap);

    let asset = load_asset(URL, &AssetFormat::FALLBACK_ORDER, &session)
        .await
        .unwrap();
    assert_eq!(asset.format, AssetFormat::Text);
    assert!(
        fetcher
            .requests()
            .contains(&"https://peer.example/content/contents/broken.bin".to_string())
    );
    assert!(!asset.resources.iter().any(|r| r.contains("broken.bin")));

    let mut scene = Scene::default();
    let appended = asset.append_to(&mut scene);
    assert_eq!(scene.node_count(), 3);
    assert_eq!(appended.materials.len(), 3);
    assert!(scene.find_node("Broken").is_none());
    assert!(scene.find_node("Shirt").is_some());
    assert!(!scene.materials().any(|(_, m)| m.name == "Broken_MAT"));
}

#[tokio::test]
async fn should_fail_on_missing_external_buffer() {
    let json = serde_json::to_vec(&wearable_json(Some("model.bin"))).unwrap();
    let fetcher = MockFetcher::new().with(URL, json);
    let remap = remap();
    let session = LoadSession::new(&fetcher, &remap);

    let error = load_as(URL, AssetFormat::Text, &session).await.unwrap_err();
    assert!(format!("{error:#}").contains("model.bin"), "{error:#}");
}

#[tokio::test]
async fn should_fail_on_truncated_buffer() {
    let json = serde_json::to_vec(&wearable_json(Some("model.bin"))).unwrap();
    let fetcher = MockFetcher::new()
        .with(URL, json)
        .with("https://cdn.example/QmBuffer", vec![0u8; 12]);
    let remap = remap();
    let session = LoadSession::new(&fetcher, &remap);

    assert!(load_as(URL, AssetFormat::Text, &session).await.is_err());
}

#[tokio::test]
async fn should_reject_embedded_data_uris() {
    let json = serde_json::to_vec(&wearable_json(Some(
        "data:application/octet-stream;base64,AAAA",
    )))
    .unwrap();
    let fetcher = MockFetcher::new().with(URL, json);
    let remap = remap();
    let session = LoadSession::new(&fetcher, &remap);

    assert!(load_as(URL, AssetFormat::Text, &session).await.is_err());
    assert_eq!(fetcher.requests(), vec![URL.to_string()]);
}

#[tokio::test]
async fn should_read_material_roles_from_extras() {
    let mut document = wearable_json(None);
    document["materials"][0]["extras"] = json!({ "role": "hair" });
    document["materials"][1]["extras"] = json!({ "role": "eyebrows" });
    let fetcher = MockFetcher::new().with(URL, to_glb(&document, &triangle_bin()));
    let remap = remap();
    let session = LoadSession::new(&fetcher, &remap);

    let asset = load_as(URL, AssetFormat::Binary, &session).await.unwrap();

    assert_eq!(asset.materials[0].role, Some(MaterialRole::Hair));
    // unknown roles fall back to name matching
    assert_eq!(asset.materials[1].role, None);
    assert!(asset.materials[1].has_role(MaterialRole::Hair));
    assert_eq!(asset.materials[2].role, None);
}

#[tokio::test]
async fn should_append_nodes_and_materials_to_a_scene() {
    let fetcher = MockFetcher::new().with(URL, to_glb(&wearable_json(None), &triangle_bin()));
    let remap = remap();
    let session = LoadSession::new(&fetcher, &remap);
    let asset = load_as(URL, AssetFormat::Binary, &session).await.unwrap();

    let mut scene = Scene::default();
    let appended = asset.append_to(&mut scene);

    assert_eq!(scene.node_count(), 3);
    assert_eq!(scene.top_level_nodes(), appended.nodes);
    let hair = scene.find_node("Hair").unwrap();
    let skin = scene.find_node("Skin").unwrap();
    assert_eq!(scene.node(skin).parent(), Some(hair));
    assert_eq!(scene.node(hair).materials, vec![appended.materials[1]]);
    assert_eq!(scene.materials().count(), 3);
}
