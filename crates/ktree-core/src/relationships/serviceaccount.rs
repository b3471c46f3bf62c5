//! ServiceAccount rules: mounted and image-pull secrets (§4.5).

use super::Context;
use crate::model::{json_path, Node, RelationshipKind, Uid};

pub(crate) fn service_account_edges(node: &Node, ctx: &Context) -> Vec<(Uid, RelationshipKind)> {
    let mut edges = Vec::new();
    let namespace = node.namespace.clone();

    if let Some(secrets) = json_path(&node.body, &["secrets"]).and_then(|v| v.as_array()) {
        for secret in secrets {
            if let Some(name) = secret.get("name").and_then(|v| v.as_str()) {
                if let Some(uid) = ctx.lookup("Secret", namespace.clone(), name) {
                    edges.push((uid, RelationshipKind::ServiceAccountSecret));
                }
            }
        }
    }

    if let Some(secrets) = json_path(&node.body, &["imagePullSecrets"]).and_then(|v| v.as_array()) {
        for secret in secrets {
            if let Some(name) = secret.get("name").and_then(|v| v.as_str()) {
                if let Some(uid) = ctx.lookup("Secret", namespace.clone(), name) {
                    edges.push((uid, RelationshipKind::ServiceAccountImagePullSecret));
                }
            }
        }
    }

    edges
}
