//! The one rule that applies to every object regardless of kind:
//! `metadata.ownerReferences` (§4.5 generic rules).

use crate::model::{json_path, Node, RelationshipKind, Uid};

pub(crate) fn owner_reference_edges(node: &Node) -> Vec<(Uid, RelationshipKind)> {
    let Some(owners) = json_path(&node.body, &["metadata", "ownerReferences"]).and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    let mut edges = Vec::new();
    for owner in owners {
        let Some(uid) = owner.get("uid").and_then(|v| v.as_str()) else {
            continue;
        };
        if uid == node.uid {
            continue; // a self-referential owner entry is malformed input, not a real edge
        }
        edges.push((uid.to_string(), RelationshipKind::OwnerReference));
        if owner.get("controller").and_then(|v| v.as_bool()) == Some(true) {
            edges.push((uid.to_string(), RelationshipKind::ControllerReference));
        }
    }
    edges
}
