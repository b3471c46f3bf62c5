//! The frozen-after-build NodeMap: UID to [`Node`], with symmetric edges.

use std::collections::HashMap;

use crate::model::{GroupKind, Node, RelationshipKind, Uid};

/// UID → Node. The graph owns every node; nodes refer to each other only by
/// UID, so cycles never pose an ownership problem (design note, §9).
///
/// Built once per invocation by the fetcher, then mutated only through
/// [`Graph::insert_edge`] by the relationship resolver, then read-only for
/// the remainder of the pipeline.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: HashMap<Uid, Node>,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    pub fn insert_node(&mut self, node: Node) {
        self.nodes.insert(node.uid.clone(), node);
    }

    pub fn get(&self, uid: &str) -> Option<&Node> {
        self.nodes.get(uid)
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.nodes.contains_key(uid)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Uid, &Node)> {
        self.nodes.iter()
    }

    /// Inserts a labeled edge `from -> to`, enforcing invariant 2 (symmetry)
    /// and invariant 3 (label sets dedup). Returns `false` without mutating
    /// anything if `to` is not in the map — a dangling reference, dropped
    /// per invariant 4; the caller is responsible for recording a warning.
    pub fn insert_edge(&mut self, from: &Uid, to: &Uid, kind: RelationshipKind) -> bool {
        if !self.nodes.contains_key(to) || !self.nodes.contains_key(from) {
            return false;
        }
        if let Some(node) = self.nodes.get_mut(from) {
            node.dependencies.entry(to.clone()).or_default().insert(kind);
        }
        if let Some(node) = self.nodes.get_mut(to) {
            node.dependents.entry(from.clone()).or_default().insert(kind);
        }
        true
    }

    /// Secondary read index over `(kind, namespace, name)`, built once by the
    /// relationship resolver before rule dispatch and used for resolving
    /// name-based references (roleRef, subjects, volume sources, ...). Not
    /// keyed on group: within a single cluster's built-in kinds the table in
    /// §4.5 covers, `(kind, namespace, name)` is unambiguous in practice.
    pub fn identity_index(&self) -> HashMap<(String, Option<String>, String), Uid> {
        self.nodes
            .values()
            .map(|n| {
                (
                    (n.kind.clone(), n.namespace.clone(), n.name.clone()),
                    n.uid.clone(),
                )
            })
            .collect()
    }

    /// Pods grouped by namespace, label-indexed for Service selector
    /// matching. Built once, read many times during resolution.
    pub fn pods_by_namespace(&self) -> HashMap<String, Vec<&Node>> {
        let mut index: HashMap<String, Vec<&Node>> = HashMap::new();
        for node in self.nodes.values() {
            if node.kind == "Pod" && node.group.is_empty() {
                if let Some(ns) = &node.namespace {
                    index.entry(ns.clone()).or_default().push(node);
                }
            }
        }
        index
    }

    /// ClusterRoles label-indexed for `aggregationRule.clusterRoleSelectors`
    /// matching.
    pub fn cluster_roles(&self) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|n| n.kind == "ClusterRole" && n.group == "rbac.authorization.k8s.io")
            .collect()
    }

    pub fn nodes_of_kind<'a>(&'a self, gk: &'a GroupKind) -> impl Iterator<Item = &'a Node> {
        self.nodes
            .values()
            .filter(move |n| n.group == gk.group && n.kind == gk.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;
    use std::collections::BTreeMap;
    use serde_json::Value;

    fn node(uid: &str, kind: &str) -> Node {
        Node {
            uid: uid.to_string(),
            group: String::new(),
            version: "v1".to_string(),
            kind: kind.to_string(),
            namespace: Some("default".to_string()),
            name: uid.to_string(),
            creation_timestamp: None,
            labels: BTreeMap::new(),
            body: Value::Null,
            namespaced: true,
            dependencies: BTreeMap::new(),
            dependents: BTreeMap::new(),
        }
    }

    #[test]
    fn insert_edge_is_symmetric() {
        let mut graph = Graph::new();
        graph.insert_node(node("a", "Pod"));
        graph.insert_node(node("b", "Pod"));

        assert!(graph.insert_edge(&"a".to_string(), &"b".to_string(), RelationshipKind::OwnerReference));

        let a = graph.get("a").unwrap();
        assert!(a.dependencies["b"].contains(&RelationshipKind::OwnerReference));
        let b = graph.get("b").unwrap();
        assert!(b.dependents["a"].contains(&RelationshipKind::OwnerReference));
    }

    #[test]
    fn insert_edge_dedups_labels() {
        let mut graph = Graph::new();
        graph.insert_node(node("a", "Pod"));
        graph.insert_node(node("b", "Pod"));
        graph.insert_edge(&"a".to_string(), &"b".to_string(), RelationshipKind::OwnerReference);
        graph.insert_edge(&"a".to_string(), &"b".to_string(), RelationshipKind::OwnerReference);
        assert_eq!(graph.get("a").unwrap().dependencies["b"].len(), 1);
    }

    #[test]
    fn insert_edge_drops_dangling_reference() {
        let mut graph = Graph::new();
        graph.insert_node(node("a", "Pod"));
        let inserted = graph.insert_edge(&"a".to_string(), &"missing".to_string(), RelationshipKind::OwnerReference);
        assert!(!inserted);
        assert!(graph.get("a").unwrap().dependencies.is_empty());
    }

    #[test]
    fn merge_idempotence() {
        let mut graph = Graph::new();
        graph.insert_node(node("a", "Pod"));
        graph.insert_node(node("b", "Pod"));
        for _ in 0..2 {
            graph.insert_edge(&"a".to_string(), &"b".to_string(), RelationshipKind::OwnerReference);
        }
        assert_eq!(graph.get("a").unwrap().dependencies["b"].len(), 1);
        assert_eq!(graph.get("b").unwrap().dependents["a"].len(), 1);
    }
}
