//! Asset reference extraction
//!
//! Walks one serialized node and yields the set of root-prefixed file paths
//! it references, per node kind. Extraction is a pure function of the node:
//! the same payload always yields the same set.
//!
//! Only paths with a leading `/` address the asset storage root; anything
//! else (inline base64 data, external URLs) stays in the snapshot untouched
//! and is excluded here. Multi-path values are split on `;`, one reference
//! per non-empty segment.

use std::collections::BTreeSet;

use serde_json::Value;

use super::node::{classify, NodeKind};

/// Material map slots that may carry an image source.
const MATERIAL_MAP_SLOTS: [&str; 11] = [
    "alphaMap",
    "aoMap",
    "bumpMap",
    "displacementMap",
    "emissiveMap",
    "envMap",
    "lightMap",
    "map",
    "metalnessMap",
    "normalMap",
    "roughnessMap",
];

/// Nested sub-objects of a ServerObject's `userData` that carry their own Url.
const SERVER_OBJECT_SUB_KEYS: [&str; 3] = ["Animation", "CameraAnimation", "Audio"];

/// Extract the asset references of one node, given its kind.
pub fn extract_references(node: &Value, kind: NodeKind) -> BTreeSet<String> {
    let mut refs = BTreeSet::new();

    match kind {
        NodeKind::ServerObject => {
            if let Some(user_data) = node.get("userData") {
                collect_url(&mut refs, user_data.get("Url"));
                for key in SERVER_OBJECT_SUB_KEYS {
                    if let Some(sub) = user_data.get(key) {
                        collect_url(&mut refs, sub.get("Url"));
                    }
                }
            }
        }
        NodeKind::Scene => {
            if let Some(background) = node.get("background") {
                collect_background(&mut refs, background);
            }
        }
        NodeKind::Mesh | NodeKind::Sprite => {
            match node.get("material") {
                Some(Value::Array(materials)) => {
                    for material in materials {
                        collect_material(&mut refs, material);
                    }
                }
                Some(material) => collect_material(&mut refs, material),
                None => {}
            }
        }
        NodeKind::Audio => {
            if let Some(user_data) = node.get("userData") {
                collect_url(&mut refs, user_data.get("Url"));
            }
        }
        NodeKind::CubeTexture => {
            collect_cube_faces(&mut refs, node);
        }
        NodeKind::Opaque => {}
    }

    refs
}

/// Scene background: a cube texture contributes one reference per face,
/// any other texture contributes its single image source.
fn collect_background(refs: &mut BTreeSet<String>, background: &Value) {
    if classify(background) == NodeKind::CubeTexture {
        collect_cube_faces(refs, background);
    } else if let Some(image) = background.get("image") {
        collect_url(refs, image.get("src"));
    }
}

/// Cube texture faces live in the `image` array, one `src` per face.
fn collect_cube_faces(refs: &mut BTreeSet<String>, texture: &Value) {
    if let Some(Value::Array(faces)) = texture.get("image") {
        for face in faces {
            collect_url(refs, face.get("src"));
        }
    }
}

/// One material: every populated map slot contributes its image source.
fn collect_material(refs: &mut BTreeSet<String>, material: &Value) {
    for slot in MATERIAL_MAP_SLOTS {
        if let Some(map) = material.get(slot) {
            if let Some(image) = map.get("image") {
                collect_url(refs, image.get("src"));
            }
        }
    }
}

/// Split a path value on `;` and keep each non-empty root-prefixed segment.
fn collect_url(refs: &mut BTreeSet<String>, value: Option<&Value>) {
    let Some(path) = value.and_then(Value::as_str) else {
        return;
    };
    for segment in path.split(';') {
        let segment = segment.trim();
        if !segment.is_empty() && segment.starts_with('/') {
            refs.insert(segment.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extract(node: &Value) -> BTreeSet<String> {
        extract_references(node, classify(node))
    }

    #[test]
    fn test_server_object_primary_and_nested_urls() {
        let node = json!({
            "metadata": {"generator": "ServerObject"},
            "userData": {
                "Url": "/Upload/Model/2020/robot.fbx",
                "Animation": {"Url": "/Upload/Animation/walk.anim"},
                "CameraAnimation": {"Url": "/Upload/Animation/cam.anim"},
                "Audio": {"Url": "/Upload/Audio/hum.mp3"}
            }
        });

        let refs = extract(&node);
        assert_eq!(refs.len(), 4);
        assert!(refs.contains("/Upload/Model/2020/robot.fbx"));
        assert!(refs.contains("/Upload/Audio/hum.mp3"));
    }

    #[test]
    fn test_semicolon_multi_path_yields_one_ref_per_segment() {
        let node = json!({
            "metadata": {"generator": "ServerObject"},
            "userData": {"Url": "/Upload/Model/a.mtl;/Upload/Model/a.obj;/Upload/Model/a.tga"}
        });

        let refs = extract(&node);
        assert_eq!(refs.len(), 3);
        assert!(refs.contains("/Upload/Model/a.obj"));
    }

    #[test]
    fn test_empty_segments_dropped() {
        let node = json!({
            "metadata": {"generator": "ServerObject"},
            "userData": {"Url": ";/Upload/Model/a.obj;;"}
        });

        assert_eq!(extract(&node).len(), 1);
    }

    #[test]
    fn test_non_root_prefixed_values_excluded() {
        let node = json!({
            "metadata": {"generator": "ServerObject"},
            "userData": {
                "Url": "data:image/png;base64,iVBORw0KGgo",
                "Audio": {"Url": "http://elsewhere.example/x.mp3"}
            }
        });

        assert!(extract(&node).is_empty());
    }

    #[test]
    fn test_audio_single_url() {
        let node = json!({
            "metadata": {"generator": "AudioSerializer"},
            "userData": {"Url": "/Upload/Audio/2020/x.mp3"}
        });

        let refs = extract(&node);
        assert_eq!(refs.len(), 1);
        assert!(refs.contains("/Upload/Audio/2020/x.mp3"));
    }

    #[test]
    fn test_scene_background_cube_texture_six_faces() {
        let faces: Vec<Value> = (0..6)
            .map(|i| json!({"src": format!("/Upload/Texture/sky/face{}.jpg", i)}))
            .collect();
        let node = json!({
            "metadata": {"generator": "SceneSerializer"},
            "background": {
                "metadata": {"generator": "CubeTextureSerializer"},
                "image": faces
            }
        });

        let refs = extract(&node);
        assert_eq!(refs.len(), 6);
        for i in 0..6 {
            assert!(refs.contains(&format!("/Upload/Texture/sky/face{}.jpg", i)));
        }
    }

    #[test]
    fn test_cube_faces_order_independent() {
        let node_a = json!({
            "metadata": {"generator": "SceneSerializer"},
            "background": {
                "metadata": {"generator": "CubeTextureSerializer"},
                "image": [{"src": "/Upload/T/px.jpg"}, {"src": "/Upload/T/nx.jpg"}]
            }
        });
        let node_b = json!({
            "metadata": {"generator": "SceneSerializer"},
            "background": {
                "metadata": {"generator": "CubeTextureSerializer"},
                "image": [{"src": "/Upload/T/nx.jpg"}, {"src": "/Upload/T/px.jpg"}]
            }
        });

        assert_eq!(extract(&node_a), extract(&node_b));
    }

    #[test]
    fn test_scene_background_plain_texture() {
        let node = json!({
            "metadata": {"generator": "SceneSerializer"},
            "background": {
                "metadata": {"generator": "TextureSerializer"},
                "image": {"src": "/Upload/Texture/bg.jpg"}
            }
        });

        let refs = extract(&node);
        assert_eq!(refs.len(), 1);
        assert!(refs.contains("/Upload/Texture/bg.jpg"));
    }

    #[test]
    fn test_scene_color_background_has_no_refs() {
        let node = json!({
            "metadata": {"generator": "SceneSerializer"},
            "background": 0xaaccff
        });

        assert!(extract(&node).is_empty());
    }

    #[test]
    fn test_mesh_single_material_map_slots() {
        let node = json!({
            "metadata": {"generator": "MeshSerializer"},
            "material": {
                "map": {"image": {"src": "/Upload/Texture/diffuse.jpg"}},
                "normalMap": {"image": {"src": "/Upload/Texture/normal.jpg"}},
                "shininess": 30
            }
        });

        let refs = extract(&node);
        assert_eq!(refs.len(), 2);
        assert!(refs.contains("/Upload/Texture/diffuse.jpg"));
        assert!(refs.contains("/Upload/Texture/normal.jpg"));
    }

    #[test]
    fn test_mesh_material_array_two_materials() {
        let node = json!({
            "metadata": {"generator": "MeshSerializer"},
            "material": [
                {"normalMap": {"image": {"src": "/Upload/Texture/n.jpg"}}},
                {"map": {"image": {"src": "/Upload/Texture/d.jpg"}}}
            ]
        });

        let refs = extract(&node);
        assert_eq!(refs.len(), 2);
        assert!(refs.contains("/Upload/Texture/n.jpg"));
        assert!(refs.contains("/Upload/Texture/d.jpg"));
    }

    #[test]
    fn test_all_eleven_map_slots_scanned() {
        let mut material = serde_json::Map::new();
        for (i, slot) in MATERIAL_MAP_SLOTS.iter().enumerate() {
            material.insert(
                slot.to_string(),
                json!({"image": {"src": format!("/Upload/Texture/{}.jpg", i)}}),
            );
        }
        let node = json!({
            "metadata": {"generator": "SpriteSerializer"},
            "material": Value::Object(material)
        });

        assert_eq!(extract(&node).len(), 11);
    }

    #[test]
    fn test_standalone_cube_texture_node() {
        let node = json!({
            "metadata": {"generator": "CubeTextureSerializer"},
            "image": [{"src": "/Upload/T/a.jpg"}, {"src": "/Upload/T/b.jpg"}]
        });

        assert_eq!(extract(&node).len(), 2);
    }

    #[test]
    fn test_opaque_node_yields_nothing() {
        let node = json!({
            "metadata": {"generator": "GroupSerializer"},
            "userData": {"Url": "/Upload/Model/should-not-appear.fbx"}
        });

        assert!(extract(&node).is_empty());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let node = json!({
            "metadata": {"generator": "MeshSerializer"},
            "material": [
                {"map": {"image": {"src": "/Upload/Texture/d.jpg"}}},
                {"envMap": {"image": {"src": "/Upload/Texture/e.jpg"}}}
            ]
        });

        let first = extract(&node);
        for _ in 0..10 {
            assert_eq!(extract(&node), first);
        }
    }

    #[test]
    fn test_duplicate_references_collapse() {
        let node = json!({
            "metadata": {"generator": "MeshSerializer"},
            "material": [
                {"map": {"image": {"src": "/Upload/Texture/same.jpg"}}},
                {"map": {"image": {"src": "/Upload/Texture/same.jpg"}}}
            ]
        });

        assert_eq!(extract(&node).len(), 1);
    }
}
