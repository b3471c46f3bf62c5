//! PersistentVolume ↔ PersistentVolumeClaim cross-references (§4.5).

use super::Context;
use crate::model::{json_path, Node, RelationshipKind, Uid};

pub(crate) fn persistent_volume_edges(node: &Node, ctx: &Context) -> Vec<(Uid, RelationshipKind)> {
    let Some(claim_ref) = json_path(&node.body, &["spec", "claimRef"]) else {
        return Vec::new();
    };
    let (Some(name), Some(namespace)) = (
        claim_ref.get("name").and_then(|v| v.as_str()),
        claim_ref.get("namespace").and_then(|v| v.as_str()),
    ) else {
        return Vec::new();
    };
    ctx.lookup("PersistentVolumeClaim", Some(namespace.to_string()), name)
        .into_iter()
        .map(|uid| (uid, RelationshipKind::PersistentVolumeClaim))
        .collect()
}

pub(crate) fn persistent_volume_claim_edges(node: &Node, ctx: &Context) -> Vec<(Uid, RelationshipKind)> {
    let Some(volume_name) = json_path(&node.body, &["spec", "volumeName"]).and_then(|v| v.as_str()) else {
        return Vec::new();
    };
    ctx.lookup("PersistentVolume", None, volume_name)
        .into_iter()
        .map(|uid| (uid, RelationshipKind::PersistentVolume))
        .collect()
}
