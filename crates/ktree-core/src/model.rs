//! Core data types: object identity, nodes, and the relationship alphabet.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Universally-unique ID assigned by the API server; primary key of the graph.
pub type Uid = String;

/// `(group, kind)` — the reduced identity used for resolver dispatch and
/// kind-hint matching. Empty group denotes the core API group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKind {
    pub group: String,
    pub kind: String,
}

impl GroupKind {
    pub fn new(group: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
        }
    }
}

/// `(namespace, name)` — the reduced identity used for reference resolution.
/// `namespace` is `None` for cluster-scoped objects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NamespacedName {
    pub namespace: Option<String>,
    pub name: String,
}

/// The alphabet of edge labels a relationship can carry. Every row of the
/// kind-specific rule table in the component design has exactly one variant
/// here, plus the two generic owner-reference labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelationshipKind {
    OwnerReference,
    ControllerReference,
    ClusterRoleAggregationRule,
    ClusterRoleBindingRole,
    ClusterRoleBindingSubject,
    RoleBindingRole,
    RoleBindingSubject,
    EventRegarding,
    EventRelated,
    IngressService,
    IngressResource,
    IngressTls,
    IngressClass,
    WebhookService,
    PersistentVolumeClaim,
    PersistentVolume,
    PodNode,
    PodPriorityClass,
    PodRuntimeClass,
    PodServiceAccount,
    PodVolume,
    PodImagePullSecret,
    Service,
    ServiceAccountSecret,
    ServiceAccountImagePullSecret,
}

impl std::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::OwnerReference => "OwnerReference",
            Self::ControllerReference => "ControllerReference",
            Self::ClusterRoleAggregationRule => "ClusterRoleAggregationRule",
            Self::ClusterRoleBindingRole => "ClusterRoleBindingRole",
            Self::ClusterRoleBindingSubject => "ClusterRoleBindingSubject",
            Self::RoleBindingRole => "RoleBindingRole",
            Self::RoleBindingSubject => "RoleBindingSubject",
            Self::EventRegarding => "EventRegarding",
            Self::EventRelated => "EventRelated",
            Self::IngressService => "IngressService",
            Self::IngressResource => "IngressResource",
            Self::IngressTls => "IngressTLS",
            Self::IngressClass => "IngressClass",
            Self::WebhookService => "WebhookService",
            Self::PersistentVolumeClaim => "PersistentVolumeClaim",
            Self::PersistentVolume => "PersistentVolume",
            Self::PodNode => "PodNode",
            Self::PodPriorityClass => "PodPriorityClass",
            Self::PodRuntimeClass => "PodRuntimeClass",
            Self::PodServiceAccount => "PodServiceAccount",
            Self::PodVolume => "PodVolume",
            Self::PodImagePullSecret => "PodImagePullSecret",
            Self::Service => "Service",
            Self::ServiceAccountSecret => "ServiceAccountSecret",
            Self::ServiceAccountImagePullSecret => "ServiceAccountImagePullSecret",
        };
        f.write_str(s)
    }
}

/// An unordered set of relationship labels on a single (source, target) pair.
/// Duplicate labels collapse (invariant 3).
pub type RelationshipSet = BTreeSet<RelationshipKind>;

/// One fetched cluster object plus its resolved edges.
///
/// Nodes never hold direct references to each other — only UIDs — so the
/// graph stays cycle-safe regardless of what the cluster actually contains.
/// Nodes are immutable after fetch except for edge insertion, which is
/// monotonic (see [`crate::graph::Graph::insert_edge`]).
#[derive(Debug, Clone)]
pub struct Node {
    pub uid: Uid,
    pub group: String,
    pub version: String,
    pub kind: String,
    pub namespace: Option<String>,
    pub name: String,
    pub creation_timestamp: Option<DateTime<Utc>>,
    pub labels: BTreeMap<String, String>,
    /// The decoded object body (the full generic representation, metadata
    /// included), sufficient for JSON-path reads by the relationship rules.
    pub body: Value,
    pub namespaced: bool,
    pub dependencies: BTreeMap<Uid, RelationshipSet>,
    pub dependents: BTreeMap<Uid, RelationshipSet>,
}

impl Node {
    pub fn group_kind(&self) -> GroupKind {
        GroupKind::new(self.group.clone(), self.kind.clone())
    }

    pub fn namespaced_name(&self) -> NamespacedName {
        NamespacedName {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }

    /// Sort key used by the tree projector for stable child ordering:
    /// `(namespace, kind, group, name)`, ascending.
    pub fn sort_key(&self) -> (&str, &str, &str, &str) {
        (
            self.namespace.as_deref().unwrap_or(""),
            self.kind.as_str(),
            self.group.as_str(),
            self.name.as_str(),
        )
    }
}

/// Reads a nested field out of a generic object body, e.g.
/// `json_path(&body, &["spec", "selector"])`. Returns `None` at the first
/// missing segment rather than panicking — callers treat a missing field as
/// "this rule doesn't apply", never as an error.
pub fn json_path<'a>(value: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for segment in segments {
        current = current.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_path_walks_nested_object() {
        let body = serde_json::json!({"spec": {"selector": {"app": "web"}}});
        let found = json_path(&body, &["spec", "selector", "app"]);
        assert_eq!(found.and_then(Value::as_str), Some("web"));
    }

    #[test]
    fn json_path_missing_segment_returns_none() {
        let body = serde_json::json!({"spec": {}});
        assert!(json_path(&body, &["spec", "selector"]).is_none());
    }

    #[test]
    fn relationship_set_collapses_duplicates() {
        let mut set = RelationshipSet::new();
        set.insert(RelationshipKind::OwnerReference);
        set.insert(RelationshipKind::OwnerReference);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn node_sort_key_orders_namespace_first() {
        let mut a = make_node("b-ns", "Pod", "", "z-name");
        let b = make_node("a-ns", "Pod", "", "a-name");
        a.namespace = Some("a-ns".to_string());
        assert!(b.sort_key() <= a.sort_key());
    }

    fn make_node(ns: &str, kind: &str, group: &str, name: &str) -> Node {
        Node {
            uid: format!("uid-{name}"),
            group: group.to_string(),
            version: "v1".to_string(),
            kind: kind.to_string(),
            namespace: Some(ns.to_string()),
            name: name.to_string(),
            creation_timestamp: None,
            labels: BTreeMap::new(),
            body: Value::Null,
            namespaced: true,
            dependencies: BTreeMap::new(),
            dependents: BTreeMap::new(),
        }
    }
}
