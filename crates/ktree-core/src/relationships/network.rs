//! Networking rules: Service selector matching, Ingress backends, and
//! admission webhook service references (§4.5).

use super::Context;
use crate::model::{json_path, Node, RelationshipKind, Uid};

/// Pods in the same namespace whose labels match `spec.selector` by
/// equality on every selector key. An empty selector matches nothing.
pub(crate) fn service_edges(node: &Node, ctx: &Context) -> Vec<(Uid, RelationshipKind)> {
    let Some(selector) = json_path(&node.body, &["spec", "selector"]).and_then(|v| v.as_object()) else {
        return Vec::new();
    };
    if selector.is_empty() {
        return Vec::new();
    }
    let Some(namespace) = &node.namespace else {
        return Vec::new();
    };
    let Some(pods) = ctx.pods_by_namespace.get(namespace) else {
        return Vec::new();
    };

    pods.iter()
        .filter(|pod| {
            selector
                .iter()
                .all(|(k, v)| v.as_str().is_some_and(|v| pod.labels.get(k).map(String::as_str) == Some(v)))
        })
        .map(|pod| (pod.uid.clone(), RelationshipKind::Service))
        .collect()
}

/// Default backend, per-rule backends, TLS secrets, and the ingress class.
pub(crate) fn ingress_edges(node: &Node, ctx: &Context) -> Vec<(Uid, RelationshipKind)> {
    let mut edges = Vec::new();
    let namespace = node.namespace.clone();

    if let Some(backend) = json_path(&node.body, &["spec", "defaultBackend"]) {
        edges.extend(backend_edges(backend, namespace.clone(), ctx));
    }

    if let Some(rules) = json_path(&node.body, &["spec", "rules"]).and_then(|v| v.as_array()) {
        for rule in rules {
            let Some(paths) = json_path(rule, &["http", "paths"]).and_then(|v| v.as_array()) else {
                continue;
            };
            for path in paths {
                if let Some(backend) = path.get("backend") {
                    edges.extend(backend_edges(backend, namespace.clone(), ctx));
                }
            }
        }
    }

    if let Some(tls) = json_path(&node.body, &["spec", "tls"]).and_then(|v| v.as_array()) {
        for entry in tls {
            if let Some(secret_name) = entry.get("secretName").and_then(|v| v.as_str()) {
                if let Some(uid) = ctx.lookup("Secret", namespace.clone(), secret_name) {
                    edges.push((uid, RelationshipKind::IngressTls));
                }
            }
        }
    }

    if let Some(class_name) = json_path(&node.body, &["spec", "ingressClassName"]).and_then(|v| v.as_str()) {
        if let Some(uid) = ctx.lookup("IngressClass", None, class_name) {
            edges.push((uid, RelationshipKind::IngressClass));
        }
    }

    edges
}

fn backend_edges(backend: &serde_json::Value, namespace: Option<String>, ctx: &Context) -> Vec<(Uid, RelationshipKind)> {
    let mut edges = Vec::new();
    if let Some(name) = json_path(backend, &["service", "name"]).and_then(|v| v.as_str()) {
        if let Some(uid) = ctx.lookup("Service", namespace.clone(), name) {
            edges.push((uid, RelationshipKind::IngressService));
        }
    }
    if let Some(name) = json_path(backend, &["resource", "name"]).and_then(|v| v.as_str()) {
        let kind = json_path(backend, &["resource", "kind"]).and_then(|v| v.as_str()).unwrap_or("");
        if let Some(uid) = ctx.lookup(kind, namespace, name) {
            edges.push((uid, RelationshipKind::IngressResource));
        }
    }
    edges
}

/// Each webhook entry's `clientConfig.service` → the target Service.
pub(crate) fn webhook_edges(node: &Node, ctx: &Context) -> Vec<(Uid, RelationshipKind)> {
    let Some(webhooks) = json_path(&node.body, &["webhooks"]).and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    let mut edges = Vec::new();
    for webhook in webhooks {
        let Some(service) = json_path(webhook, &["clientConfig", "service"]) else {
            continue;
        };
        let (Some(name), Some(namespace)) = (
            service.get("name").and_then(|v| v.as_str()),
            service.get("namespace").and_then(|v| v.as_str()),
        ) else {
            continue;
        };
        if let Some(uid) = ctx.lookup("Service", Some(namespace.to_string()), name) {
            edges.push((uid, RelationshipKind::WebhookService));
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap};

    fn node(uid: &str, ns: Option<&str>, kind: &str, labels: &[(&str, &str)], body: serde_json::Value) -> Node {
        Node {
            uid: uid.to_string(),
            group: String::new(),
            version: "v1".to_string(),
            kind: kind.to_string(),
            namespace: ns.map(str::to_string),
            name: uid.to_string(),
            creation_timestamp: None,
            labels: labels.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            body,
            namespaced: ns.is_some(),
            dependencies: BTreeMap::new(),
            dependents: BTreeMap::new(),
        }
    }

    #[test]
    fn service_matches_pods_by_label_equality() {
        let svc = node("svc", Some("default"), "Service", &[], json!({"spec": {"selector": {"app": "web"}}}));
        let pod_a = node("pod-a", Some("default"), "Pod", &[("app", "web")], json!({}));
        let pod_b = node("pod-b", Some("default"), "Pod", &[("app", "other")], json!({}));
        let ctx = Context {
            identity_index: HashMap::new(),
            pods_by_namespace: HashMap::from([("default".to_string(), vec![&pod_a, &pod_b])]),
            cluster_roles: Vec::new(),
        };
        let edges = service_edges(&svc, &ctx);
        assert_eq!(edges, vec![("pod-a".to_string(), RelationshipKind::Service)]);
    }

    #[test]
    fn empty_selector_matches_nothing() {
        let svc = node("svc", Some("default"), "Service", &[], json!({"spec": {"selector": {}}}));
        let pod_a = node("pod-a", Some("default"), "Pod", &[("app", "web")], json!({}));
        let ctx = Context {
            identity_index: HashMap::new(),
            pods_by_namespace: HashMap::from([("default".to_string(), vec![&pod_a])]),
            cluster_roles: Vec::new(),
        };
        assert!(service_edges(&svc, &ctx).is_empty());
    }

    #[test]
    fn ingress_resolves_backend_tls_and_class() {
        let body = json!({
            "spec": {
                "ingressClassName": "nginx",
                "tls": [{"secretName": "tls-cert"}],
                "rules": [{"http": {"paths": [{"backend": {"service": {"name": "web"}}}]}}]
            }
        });
        let ingress = node("ing", Some("default"), "Ingress", &[], body);
        let mut identity_index = HashMap::new();
        identity_index.insert(("Secret".to_string(), Some("default".to_string()), "tls-cert".to_string()), "secret-uid".to_string());
        identity_index.insert(("Service".to_string(), Some("default".to_string()), "web".to_string()), "service-uid".to_string());
        identity_index.insert(("IngressClass".to_string(), None, "nginx".to_string()), "class-uid".to_string());
        let ctx = Context {
            identity_index,
            pods_by_namespace: HashMap::new(),
            cluster_roles: Vec::new(),
        };
        let edges = ingress_edges(&ingress, &ctx);
        assert!(edges.contains(&("secret-uid".to_string(), RelationshipKind::IngressTls)));
        assert!(edges.contains(&("service-uid".to_string(), RelationshipKind::IngressService)));
        assert!(edges.contains(&("class-uid".to_string(), RelationshipKind::IngressClass)));
    }
}
