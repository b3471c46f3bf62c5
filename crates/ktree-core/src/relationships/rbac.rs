//! RBAC rules: ClusterRole aggregation, and the role/subject references
//! carried by (Cluster)RoleBindings (§4.5).

use super::Context;
use crate::model::{json_path, Node, RelationshipKind, Uid};

/// `aggregationRule.clusterRoleSelectors[]` — each selector's `matchLabels`
/// is matched by equality against every other ClusterRole's labels.
pub(crate) fn cluster_role_edges(node: &Node, ctx: &Context) -> Vec<(Uid, RelationshipKind)> {
    let Some(selectors) = json_path(&node.body, &["aggregationRule", "clusterRoleSelectors"]).and_then(|v| v.as_array())
    else {
        return Vec::new();
    };

    let mut edges = Vec::new();
    for selector in selectors {
        let Some(match_labels) = selector.get("matchLabels").and_then(|v| v.as_object()) else {
            continue;
        };
        if match_labels.is_empty() {
            continue; // an empty selector matches nothing, same rule as Service selectors
        }
        for candidate in &ctx.cluster_roles {
            if candidate.uid == node.uid {
                continue;
            }
            let matches = match_labels
                .iter()
                .all(|(k, v)| v.as_str().is_some_and(|v| candidate.labels.get(k).map(String::as_str) == Some(v)));
            if matches {
                edges.push((candidate.uid.clone(), RelationshipKind::ClusterRoleAggregationRule));
            }
        }
    }
    edges
}

/// `roleRef` (always a ClusterRole for a ClusterRoleBinding) plus every
/// subject.
pub(crate) fn cluster_role_binding_edges(node: &Node, ctx: &Context) -> Vec<(Uid, RelationshipKind)> {
    let mut edges = Vec::new();

    if let Some(name) = json_path(&node.body, &["roleRef", "name"]).and_then(|v| v.as_str()) {
        if let Some(uid) = ctx.lookup("ClusterRole", None, name) {
            edges.push((uid, RelationshipKind::ClusterRoleBindingRole));
        }
    }

    edges.extend(subject_edges(node, None, ctx, RelationshipKind::ClusterRoleBindingSubject));
    edges
}

/// `roleRef` (Role in this namespace, or ClusterRole) plus every subject,
/// defaulting a ServiceAccount subject's namespace to the binding's own.
pub(crate) fn role_binding_edges(node: &Node, ctx: &Context) -> Vec<(Uid, RelationshipKind)> {
    let mut edges = Vec::new();

    if let (Some(kind), Some(name)) = (
        json_path(&node.body, &["roleRef", "kind"]).and_then(|v| v.as_str()),
        json_path(&node.body, &["roleRef", "name"]).and_then(|v| v.as_str()),
    ) {
        let namespace = if kind == "Role" { node.namespace.clone() } else { None };
        if let Some(uid) = ctx.lookup(kind, namespace, name) {
            edges.push((uid, RelationshipKind::RoleBindingRole));
        }
    }

    edges.extend(subject_edges(node, node.namespace.clone(), ctx, RelationshipKind::RoleBindingSubject));
    edges
}

/// Resolves a binding's `subjects[]`. `Group`/`User` subjects are virtual
/// and never produce an edge (§4.5 subject resolution).
fn subject_edges(
    node: &Node,
    default_namespace: Option<String>,
    ctx: &Context,
    label: RelationshipKind,
) -> Vec<(Uid, RelationshipKind)> {
    let Some(subjects) = json_path(&node.body, &["subjects"]).and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    let mut edges = Vec::new();
    for subject in subjects {
        let Some(kind) = subject.get("kind").and_then(|v| v.as_str()) else {
            continue;
        };
        if kind != "ServiceAccount" {
            continue; // Group and User are virtual subjects, no corresponding node
        }
        let Some(name) = subject.get("name").and_then(|v| v.as_str()) else {
            continue;
        };
        let namespace = subject
            .get("namespace")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| default_namespace.clone());
        if let Some(uid) = ctx.lookup("ServiceAccount", namespace, name) {
            edges.push((uid, label));
        }
    }
    edges
}
