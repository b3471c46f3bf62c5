//! Relationship Resolver: dispatches each fetched node to a kind-specific
//! rule set (falling through to the generic owner-reference rule for
//! everything else) and merges the resulting edges into the graph.

mod event;
mod generic;
mod network;
mod pod;
mod rbac;
mod serviceaccount;
mod storage;

use std::collections::HashMap;

use crate::error::Warning;
use crate::graph::Graph;
use crate::model::{Node, RelationshipKind, Uid};

/// Read-only indices built once after fetch and shared across every rule
/// that needs to resolve a reference by identity rather than by UID.
pub(crate) struct Context<'a> {
    identity_index: HashMap<(String, Option<String>, String), Uid>,
    pods_by_namespace: HashMap<String, Vec<&'a Node>>,
    cluster_roles: Vec<&'a Node>,
}

impl<'a> Context<'a> {
    fn lookup(&self, kind: &str, namespace: Option<String>, name: &str) -> Option<Uid> {
        self.identity_index
            .get(&(kind.to_string(), namespace, name.to_string()))
            .cloned()
    }
}

/// Runs every rule over every node in `graph` and merges the resulting
/// edges in. Read-only over the NodeMap during rule evaluation; mutation is
/// confined to a single pass through [`Graph::insert_edge`] at the end.
pub fn resolve_all(graph: &mut Graph) -> Vec<Warning> {
    let ctx = Context {
        identity_index: graph.identity_index(),
        pods_by_namespace: graph.pods_by_namespace(),
        cluster_roles: graph.cluster_roles(),
    };

    let mut edges: Vec<(Uid, Uid, RelationshipKind)> = Vec::new();

    for (uid, node) in graph.iter() {
        edges.extend(
            generic::owner_reference_edges(node)
                .into_iter()
                .map(|(to, kind)| (uid.clone(), to, kind)),
        );

        let rule_edges = match (node.group.as_str(), node.kind.as_str()) {
            ("rbac.authorization.k8s.io", "ClusterRole") => rbac::cluster_role_edges(node, &ctx),
            ("rbac.authorization.k8s.io", "ClusterRoleBinding") => rbac::cluster_role_binding_edges(node, &ctx),
            ("rbac.authorization.k8s.io", "RoleBinding") => rbac::role_binding_edges(node, &ctx),
            ("", "Event") => event::core_event_edges(node, &ctx),
            ("events.k8s.io", "Event") => event::events_k8s_edges(node, &ctx),
            ("networking.k8s.io", "Ingress") => network::ingress_edges(node, &ctx),
            ("admissionregistration.k8s.io", "MutatingWebhookConfiguration")
            | ("admissionregistration.k8s.io", "ValidatingWebhookConfiguration") => network::webhook_edges(node, &ctx),
            ("", "Service") => network::service_edges(node, &ctx),
            ("", "PersistentVolume") => storage::persistent_volume_edges(node, &ctx),
            ("", "PersistentVolumeClaim") => storage::persistent_volume_claim_edges(node, &ctx),
            ("", "Pod") => pod::pod_edges(node, &ctx),
            ("", "ServiceAccount") => serviceaccount::service_account_edges(node, &ctx),
            _ => Vec::new(),
        };
        edges.extend(rule_edges.into_iter().map(|(to, kind)| (uid.clone(), to, kind)));
    }

    let mut warnings = Vec::new();
    for (from, to, kind) in edges {
        if !graph.insert_edge(&from, &to, kind) {
            warnings.push(Warning::dangling(&from, &to));
        }
    }
    warnings
}
