//! Event rules: both the core v1 `Event` (`involvedObject`) and the
//! `events.k8s.io` `Event` (`regarding`/`related`) APIs (§4.5).

use super::Context;
use crate::model::{json_path, Node, RelationshipKind, Uid};

pub(crate) fn core_event_edges(node: &Node, ctx: &Context) -> Vec<(Uid, RelationshipKind)> {
    json_path(&node.body, &["involvedObject"])
        .and_then(|obj| reference_target(obj, ctx))
        .map(|uid| vec![(uid, RelationshipKind::EventRegarding)])
        .unwrap_or_default()
}

pub(crate) fn events_k8s_edges(node: &Node, ctx: &Context) -> Vec<(Uid, RelationshipKind)> {
    let mut edges = Vec::new();
    if let Some(uid) = json_path(&node.body, &["regarding"]).and_then(|obj| reference_target(obj, ctx)) {
        edges.push((uid, RelationshipKind::EventRegarding));
    }
    if let Some(uid) = json_path(&node.body, &["related"]).and_then(|obj| reference_target(obj, ctx)) {
        edges.push((uid, RelationshipKind::EventRelated));
    }
    edges
}

fn reference_target(object_ref: &serde_json::Value, ctx: &Context) -> Option<Uid> {
    let kind = object_ref.get("kind").and_then(|v| v.as_str())?;
    let name = object_ref.get("name").and_then(|v| v.as_str())?;
    let namespace = object_ref.get("namespace").and_then(|v| v.as_str()).map(str::to_string);
    ctx.lookup(kind, namespace, name)
}
