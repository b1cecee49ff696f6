//! Node classification
//!
//! Every serialized node carries a discriminant tag at
//! `metadata.generator`. Classification is fail-open: a missing or
//! unrecognized tag yields [`NodeKind::Opaque`], which is preserved
//! verbatim in the frozen snapshot but contributes no asset references.

use serde_json::Value;

/// Discriminant kinds of serialized scene nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A model loaded from the server, with a primary Url and optional
    /// animation/camera/audio sub-references
    ServerObject,
    /// The scene root; only its background is asset-bearing
    Scene,
    /// A mesh with one or more materials
    Mesh,
    /// A sprite with one or more materials
    Sprite,
    /// An audio source with a single Url
    Audio,
    /// A six-faced cube texture
    CubeTexture,
    /// Unrecognized or untagged; never asset-scanned
    Opaque,
}

impl NodeKind {
    /// The discriminant tag value for this kind, if it has one.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            NodeKind::ServerObject => Some("ServerObject"),
            NodeKind::Scene => Some("SceneSerializer"),
            NodeKind::Mesh => Some("MeshSerializer"),
            NodeKind::Sprite => Some("SpriteSerializer"),
            NodeKind::Audio => Some("AudioSerializer"),
            NodeKind::CubeTexture => Some("CubeTextureSerializer"),
            NodeKind::Opaque => None,
        }
    }
}

/// Classify one serialized node by its `metadata.generator` tag.
pub fn classify(node: &Value) -> NodeKind {
    let tag = node
        .get("metadata")
        .and_then(|meta| meta.get("generator"))
        .and_then(Value::as_str);

    match tag {
        Some("ServerObject") => NodeKind::ServerObject,
        Some("SceneSerializer") => NodeKind::Scene,
        Some("MeshSerializer") => NodeKind::Mesh,
        Some("SpriteSerializer") => NodeKind::Sprite,
        Some("AudioSerializer") => NodeKind::Audio,
        Some("CubeTextureSerializer") => NodeKind::CubeTexture,
        _ => NodeKind::Opaque,
    }
}
