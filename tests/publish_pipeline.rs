//! End-to-end publication pipeline tests
//!
//! Each test builds a synthetic data directory, shell tree, and asset root
//! inside a temp dir, saves scene document sets through the store, and
//! publishes them.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use scenebase::publish::{
    is_complete, BundleManifest, PublishConfig, PublishError, Publisher, MANIFEST_FILE,
};
use scenebase::scene::SceneStore;

struct Env {
    _temp: TempDir,
    store: Arc<SceneStore>,
    publisher: Publisher,
    bundle_root: std::path::PathBuf,
    asset_root: std::path::PathBuf,
}

fn setup() -> Env {
    let temp = TempDir::new().unwrap();

    let shell_dir = temp.path().join("shell");
    fs::create_dir_all(shell_dir.join("build")).unwrap();
    fs::write(
        shell_dir.join("index.html"),
        "<html><script>const base = location.origin; const scene = '__SCENE_ID__';</script></html>",
    )
    .unwrap();
    fs::write(shell_dir.join("build/app.js"), "// bundled editor").unwrap();
    fs::write(shell_dir.join("favicon.ico"), b"icon").unwrap();

    let asset_root = temp.path().join("public");
    fs::create_dir_all(&asset_root).unwrap();

    let bundle_root = temp.path().join("bundles");
    let config = PublishConfig {
        asset_root: asset_root.clone(),
        shell_dir,
        bundle_root: bundle_root.clone(),
        url_prefix: "/bundles".to_string(),
    };

    let store = Arc::new(SceneStore::open(temp.path()).unwrap());
    let publisher = Publisher::new(store.clone(), config);

    Env {
        _temp: temp,
        store,
        publisher,
        bundle_root,
        asset_root,
    }
}

fn write_asset(root: &Path, rel: &str, contents: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn audio_node(url: &str) -> Value {
    json!({
        "uuid": "audio-1",
        "metadata": {"generator": "AudioSerializer", "version": "1.0"},
        "userData": {"Url": url}
    })
}

#[test]
fn audio_scene_bundle_contains_asset_and_unchanged_snapshot() {
    let env = setup();
    write_asset(&env.asset_root, "Upload/Audio/2020/x.mp3", b"mp3");

    let meta = env.store.create("Audio hall", None).unwrap();
    let documents = vec![audio_node("/Upload/Audio/2020/x.mp3")];
    env.store.save(&meta.id, &documents).unwrap();

    let publication = env.publisher.publish(&meta.id, None).unwrap();
    let bundle_dir = env.bundle_root.join(&publication.bundle_id);

    assert!(bundle_dir.join("Upload/Audio/2020/x.mp3").exists());
    assert!(publication.warnings.is_empty());

    // Snapshot references the asset path unchanged
    let snapshot =
        fs::read_to_string(bundle_dir.join("Scene").join(format!("{}.json", meta.id))).unwrap();
    assert!(snapshot.contains("/Upload/Audio/2020/x.mp3"));

    let parsed: Vec<Value> = serde_json::from_str(&snapshot).unwrap();
    assert_eq!(parsed, documents);
}

#[test]
fn mesh_material_array_assets_all_copied() {
    let env = setup();
    write_asset(&env.asset_root, "Upload/Texture/n/normal.jpg", b"n");
    write_asset(&env.asset_root, "Upload/Texture/d/diffuse.jpg", b"d");

    let meta = env.store.create("Two materials", None).unwrap();
    let documents = vec![json!({
        "uuid": "mesh-1",
        "metadata": {"generator": "MeshSerializer", "version": "1.0"},
        "material": [
            {"normalMap": {"image": {"src": "/Upload/Texture/n/normal.jpg"}}},
            {"map": {"image": {"src": "/Upload/Texture/d/diffuse.jpg"}}}
        ]
    })];
    env.store.save(&meta.id, &documents).unwrap();

    let publication = env.publisher.publish(&meta.id, None).unwrap();
    let bundle_dir = env.bundle_root.join(&publication.bundle_id);

    assert!(bundle_dir.join("Upload/Texture/n/normal.jpg").exists());
    assert!(bundle_dir.join("Upload/Texture/d/diffuse.jpg").exists());

    let manifest = BundleManifest::read_from_file(&bundle_dir.join(MANIFEST_FILE)).unwrap();
    assert_eq!(manifest.asset_count, 2);
}

#[test]
fn missing_historical_version_is_not_found() {
    let env = setup();
    let meta = env.store.create("History", None).unwrap();

    env.store.save(&meta.id, &[audio_node("/a.mp3")]).unwrap();
    env.store.save(&meta.id, &[audio_node("/b.mp3")]).unwrap();

    let result = env.publisher.publish(&meta.id, Some(3));
    assert!(matches!(
        result,
        Err(PublishError::VersionNotFound { version: 3, .. })
    ));
}

#[test]
fn cube_background_copies_all_six_faces() {
    let env = setup();
    let faces: Vec<String> = (0..6)
        .map(|i| format!("/Upload/Texture/sky{}/face.jpg", i))
        .collect();
    for face in &faces {
        write_asset(&env.asset_root, face.trim_start_matches('/'), b"img");
    }

    let meta = env.store.create("Sky", None).unwrap();
    let documents = vec![json!({
        "uuid": "scene-root",
        "metadata": {"generator": "SceneSerializer", "version": "1.0"},
        "background": {
            "metadata": {"generator": "CubeTextureSerializer"},
            "image": faces.iter().map(|f| json!({"src": f})).collect::<Vec<_>>()
        }
    })];
    env.store.save(&meta.id, &documents).unwrap();

    let publication = env.publisher.publish(&meta.id, None).unwrap();
    let bundle_dir = env.bundle_root.join(&publication.bundle_id);

    for face in &faces {
        assert!(bundle_dir.join(face.trim_start_matches('/')).exists());
    }

    let manifest = BundleManifest::read_from_file(&bundle_dir.join(MANIFEST_FILE)).unwrap();
    assert_eq!(manifest.asset_count, 6);
}

#[test]
fn zero_reference_scene_still_bundles() {
    let env = setup();
    let meta = env.store.create("Plain group", None).unwrap();
    let documents = vec![json!({
        "uuid": "group-1",
        "metadata": {"generator": "GroupSerializer", "version": "1.0"}
    })];
    env.store.save(&meta.id, &documents).unwrap();

    let publication = env.publisher.publish(&meta.id, None).unwrap();
    let bundle_dir = env.bundle_root.join(&publication.bundle_id);

    assert!(bundle_dir.join("index.html").exists());
    assert!(bundle_dir
        .join("Scene")
        .join(format!("{}.json", meta.id))
        .exists());
    assert!(!bundle_dir.join("Upload").exists());
    assert!(is_complete(&bundle_dir));
    assert!(publication.warnings.is_empty());
}

#[test]
fn republishing_same_version_freezes_identical_snapshots() {
    let env = setup();
    write_asset(&env.asset_root, "Upload/Audio/2020/x.mp3", b"mp3");

    let meta = env.store.create("Stable", None).unwrap();
    env.store
        .save(&meta.id, &[audio_node("/Upload/Audio/2020/x.mp3")])
        .unwrap();

    // A later save must not affect the version-1 export
    env.store
        .save(&meta.id, &[audio_node("/Upload/Audio/2020/x.mp3"), json!({"uuid": "extra"})])
        .unwrap();

    let first = env.publisher.publish(&meta.id, Some(1)).unwrap();
    let second = env.publisher.publish(&meta.id, Some(1)).unwrap();

    assert_ne!(first.bundle_id, second.bundle_id);

    let snapshot_rel = Path::new("Scene").join(format!("{}.json", meta.id));
    let bytes_first = fs::read(env.bundle_root.join(&first.bundle_id).join(&snapshot_rel)).unwrap();
    let bytes_second =
        fs::read(env.bundle_root.join(&second.bundle_id).join(&snapshot_rel)).unwrap();
    assert_eq!(bytes_first, bytes_second);
}

#[test]
fn entry_page_rewritten_for_relocation() {
    let env = setup();
    let meta = env.store.create("Relocatable", None).unwrap();
    env.store.save(&meta.id, &[json!({"uuid": "n"})]).unwrap();

    let publication = env.publisher.publish(&meta.id, None).unwrap();
    let entry = fs::read_to_string(
        env.bundle_root
            .join(&publication.bundle_id)
            .join("index.html"),
    )
    .unwrap();

    assert!(!entry.contains("location.origin"));
    assert!(entry.contains("'.'"));
    assert!(entry.contains(&meta.id));
    assert!(!entry.contains("__SCENE_ID__"));

    assert_eq!(
        publication.url,
        format!(
            "/bundles/{}/index.html?sceneID={}",
            publication.bundle_id, meta.id
        )
    );
}

#[test]
fn missing_asset_surfaces_warning_but_bundle_completes() {
    let env = setup();
    let meta = env.store.create("Dangling", None).unwrap();
    env.store
        .save(&meta.id, &[audio_node("/Upload/Audio/1999/gone.mp3")])
        .unwrap();

    let publication = env.publisher.publish(&meta.id, None).unwrap();
    assert_eq!(publication.warnings.len(), 1);
    assert!(publication.warnings[0].contains("/Upload/Audio/1999/gone.mp3"));

    let bundle_dir = env.bundle_root.join(&publication.bundle_id);
    assert!(is_complete(&bundle_dir));

    let manifest = BundleManifest::read_from_file(&bundle_dir.join(MANIFEST_FILE)).unwrap();
    assert_eq!(manifest.warnings, publication.warnings);
}

#[test]
fn unknown_scene_is_not_found() {
    let env = setup();
    let result = env.publisher.publish("no-such-scene", None);
    assert!(matches!(result, Err(PublishError::SceneNotFound(_))));
}

#[test]
fn opaque_nodes_survive_in_snapshot_without_asset_scan() {
    let env = setup();
    let meta = env.store.create("Opaque", None).unwrap();
    let documents = vec![json!({
        "uuid": "mystery",
        "metadata": {"generator": "FutureSerializer", "version": "2.0"},
        "userData": {"Url": "/Upload/Model/never-copied.fbx"}
    })];
    env.store.save(&meta.id, &documents).unwrap();

    let publication = env.publisher.publish(&meta.id, None).unwrap();
    let bundle_dir = env.bundle_root.join(&publication.bundle_id);

    // Preserved verbatim in the snapshot
    let snapshot =
        fs::read_to_string(bundle_dir.join("Scene").join(format!("{}.json", meta.id))).unwrap();
    assert!(snapshot.contains("never-copied.fbx"));

    // But never scanned, so no copy attempt and no warning
    assert!(!bundle_dir.join("Upload").exists());
    assert!(publication.warnings.is_empty());
}
