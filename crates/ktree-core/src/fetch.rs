//! Object Fetcher: concurrently lists every listable kind the catalog
//! advertises and wraps the results into a frozen [`Graph`].

use std::collections::BTreeMap;

use futures::stream::{self, StreamExt};
use kube::Client;
use kube::api::{Api, DynamicObject, ListParams};
use tokio_util::sync::CancellationToken;

use crate::discovery::{DiscoveryCatalog, ResourceInfo};
use crate::error::Warning;
use crate::graph::Graph;
use crate::model::Node;

/// Namespace restriction for a fetch. Cluster-scoped kinds are always
/// fetched in full regardless of this setting (§6: `-n` restricts fetch
/// scope unless `-A`, but only namespaced kinds are namespace-restricted).
#[derive(Debug, Clone)]
pub enum FetchScope {
    AllNamespaces,
    Namespace(String),
}

/// Default simultaneous list-call ceiling (§5).
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Result of a fetch: the built graph, any warnings, and whether the caller
/// canceled before every kind had a chance to be listed.
pub struct FetchResult {
    pub graph: Graph,
    pub warnings: Vec<Warning>,
    pub canceled: bool,
}

pub async fn fetch(
    client: &Client,
    catalog: &DiscoveryCatalog,
    scope: &FetchScope,
    concurrency: usize,
    cancel: &CancellationToken,
) -> FetchResult {
    let outcomes: Vec<(Vec<Node>, Vec<Warning>)> = stream::iter(catalog.resources())
        .map(|info| fetch_one(client, info, scope, cancel))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut graph = Graph::new();
    let mut warnings = Vec::new();

    for (nodes, kind_warnings) in outcomes {
        for node in nodes {
            graph.insert_node(node);
        }
        warnings.extend(kind_warnings);
    }

    tracing::info!(object_count = graph.len(), "fetch complete");

    FetchResult {
        graph,
        warnings,
        canceled: cancel.is_cancelled(),
    }
}

async fn fetch_one(
    client: &Client,
    info: &ResourceInfo,
    scope: &FetchScope,
    cancel: &CancellationToken,
) -> (Vec<Node>, Vec<Warning>) {
    if cancel.is_cancelled() {
        return (Vec::new(), Vec::new());
    }

    let api: Api<DynamicObject> = match (info.is_namespaced(), scope) {
        (true, FetchScope::Namespace(ns)) => Api::namespaced_with(client.clone(), ns, &info.api_resource),
        (true, FetchScope::AllNamespaces) | (false, _) => Api::all_with(client.clone(), &info.api_resource),
    };

    tracing::debug!(kind = %info.api_resource.kind, group = %info.api_resource.group, "listing resources");

    let list = tokio::select! {
        _ = cancel.cancelled() => return (Vec::new(), Vec::new()),
        result = api.list(&ListParams::default()) => result,
    };

    match list {
        Ok(list) => {
            let mut nodes = Vec::with_capacity(list.items.len());
            let mut warnings = Vec::new();
            for obj in list.items {
                match to_node(obj, info) {
                    Ok(node) => nodes.push(node),
                    Err(reason) => warnings.push(Warning::new(format!(
                        "fetch: dropped an unreadable {} object: {reason}",
                        info.api_resource.kind
                    ))),
                }
            }
            (nodes, warnings)
        }
        Err(kube::Error::Api(resp)) if resp.code == 403 => (
            Vec::new(),
            vec![Warning::new(format!(
                "fetch: access denied listing {} ({}), skipping",
                info.api_resource.kind, info.api_resource.group
            ))],
        ),
        Err(kube::Error::Api(resp)) if resp.code == 404 || resp.code == 405 => (Vec::new(), Vec::new()),
        Err(e) => (
            Vec::new(),
            vec![Warning::new(format!(
                "fetch: failed to list {} ({}): {e}",
                info.api_resource.kind, info.api_resource.group
            ))],
        ),
    }
}

fn to_node(obj: DynamicObject, info: &ResourceInfo) -> Result<Node, String> {
    let uid = obj
        .metadata
        .uid
        .clone()
        .ok_or_else(|| "object has no metadata.uid".to_string())?;
    let name = obj
        .metadata
        .name
        .clone()
        .ok_or_else(|| "object has no metadata.name".to_string())?;
    let namespace = obj.metadata.namespace.clone();
    let creation_timestamp = obj.metadata.creation_timestamp.as_ref().map(|t| t.0);
    let labels: BTreeMap<String, String> = obj.metadata.labels.clone().unwrap_or_default().into_iter().collect();

    let body = serde_json::to_value(&obj).map_err(|e| e.to_string())?;

    Ok(Node {
        uid,
        group: info.api_resource.group.clone(),
        version: info.api_resource.version.clone(),
        kind: info.api_resource.kind.clone(),
        namespace,
        name,
        creation_timestamp,
        labels,
        body,
        namespaced: info.is_namespaced(),
        dependencies: BTreeMap::new(),
        dependents: BTreeMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::{ApiResource as DynApiResource, GroupVersionKind, ObjectMeta, TypeMeta};

    fn info(namespaced: bool) -> ResourceInfo {
        let gvk = GroupVersionKind::gvk("", "v1", "Pod");
        ResourceInfo {
            api_resource: DynApiResource::from_gvk_with_plural(&gvk, "pods"),
            scope: if namespaced {
                kube::discovery::Scope::Namespaced
            } else {
                kube::discovery::Scope::Cluster
            },
            singular: "pod".to_string(),
            short_names: vec!["po".to_string()],
            verbs: vec!["list".to_string()],
        }
    }

    #[test]
    fn to_node_rejects_object_without_uid() {
        let obj = DynamicObject {
            types: Some(TypeMeta {
                api_version: "v1".to_string(),
                kind: "Pod".to_string(),
            }),
            metadata: ObjectMeta {
                name: Some("x".to_string()),
                ..Default::default()
            },
            data: serde_json::json!({}),
        };
        assert!(to_node(obj, &info(true)).is_err());
    }

    #[test]
    fn to_node_captures_full_body() {
        let obj = DynamicObject {
            types: Some(TypeMeta {
                api_version: "v1".to_string(),
                kind: "Pod".to_string(),
            }),
            metadata: ObjectMeta {
                name: Some("x".to_string()),
                namespace: Some("default".to_string()),
                uid: Some("abc-123".to_string()),
                ..Default::default()
            },
            data: serde_json::json!({"spec": {"nodeName": "node-1"}}),
        };
        let node = to_node(obj, &info(true)).unwrap();
        assert_eq!(node.uid, "abc-123");
        assert_eq!(node.namespace.as_deref(), Some("default"));
        assert_eq!(node.body["spec"]["nodeName"], "node-1");
    }
}
