//! Pod rules: node placement, priority/runtime class, service account,
//! volume sources, and image pull secrets (§4.5).

use super::Context;
use crate::model::{json_path, Node, RelationshipKind, Uid};

pub(crate) fn pod_edges(node: &Node, ctx: &Context) -> Vec<(Uid, RelationshipKind)> {
    let mut edges = Vec::new();
    let namespace = node.namespace.clone();

    if let Some(node_name) = json_path(&node.body, &["spec", "nodeName"]).and_then(|v| v.as_str()) {
        if let Some(uid) = ctx.lookup("Node", None, node_name) {
            edges.push((uid, RelationshipKind::PodNode));
        }
    }
    if let Some(name) = json_path(&node.body, &["spec", "priorityClassName"]).and_then(|v| v.as_str()) {
        if let Some(uid) = ctx.lookup("PriorityClass", None, name) {
            edges.push((uid, RelationshipKind::PodPriorityClass));
        }
    }
    if let Some(name) = json_path(&node.body, &["spec", "runtimeClassName"]).and_then(|v| v.as_str()) {
        if let Some(uid) = ctx.lookup("RuntimeClass", None, name) {
            edges.push((uid, RelationshipKind::PodRuntimeClass));
        }
    }
    if let Some(name) = json_path(&node.body, &["spec", "serviceAccountName"]).and_then(|v| v.as_str()) {
        if let Some(uid) = ctx.lookup("ServiceAccount", namespace.clone(), name) {
            edges.push((uid, RelationshipKind::PodServiceAccount));
        }
    }

    if let Some(volumes) = json_path(&node.body, &["spec", "volumes"]).and_then(|v| v.as_array()) {
        for volume in volumes {
            edges.extend(volume_source_edges(volume, &namespace, ctx));
        }
    }

    if let Some(secrets) = json_path(&node.body, &["spec", "imagePullSecrets"]).and_then(|v| v.as_array()) {
        for secret in secrets {
            if let Some(name) = secret.get("name").and_then(|v| v.as_str()) {
                if let Some(uid) = ctx.lookup("Secret", namespace.clone(), name) {
                    edges.push((uid, RelationshipKind::PodImagePullSecret));
                }
            }
        }
    }

    edges
}

/// One volume entry may reference a ConfigMap, a Secret, a PVC, or (via
/// `projected.sources[]`) several of the above at once.
fn volume_source_edges(volume: &serde_json::Value, namespace: &Option<String>, ctx: &Context) -> Vec<(Uid, RelationshipKind)> {
    let mut edges = Vec::new();

    if let Some(name) = json_path(volume, &["configMap", "name"]).and_then(|v| v.as_str()) {
        if let Some(uid) = ctx.lookup("ConfigMap", namespace.clone(), name) {
            edges.push((uid, RelationshipKind::PodVolume));
        }
    }
    if let Some(name) = json_path(volume, &["secret", "secretName"]).and_then(|v| v.as_str()) {
        if let Some(uid) = ctx.lookup("Secret", namespace.clone(), name) {
            edges.push((uid, RelationshipKind::PodVolume));
        }
    }
    if let Some(name) = json_path(volume, &["persistentVolumeClaim", "claimName"]).and_then(|v| v.as_str()) {
        if let Some(uid) = ctx.lookup("PersistentVolumeClaim", namespace.clone(), name) {
            edges.push((uid, RelationshipKind::PodVolume));
        }
    }
    if let Some(sources) = json_path(volume, &["projected", "sources"]).and_then(|v| v.as_array()) {
        for source in sources {
            if let Some(name) = json_path(source, &["configMap", "name"]).and_then(|v| v.as_str()) {
                if let Some(uid) = ctx.lookup("ConfigMap", namespace.clone(), name) {
                    edges.push((uid, RelationshipKind::PodVolume));
                }
            }
            if let Some(name) = json_path(source, &["secret", "name"]).and_then(|v| v.as_str()) {
                if let Some(uid) = ctx.lookup("Secret", namespace.clone(), name) {
                    edges.push((uid, RelationshipKind::PodVolume));
                }
            }
        }
    }

    edges
}
