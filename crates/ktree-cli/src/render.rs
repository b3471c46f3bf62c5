//! Minimal renderer: box-drawing text and JSON. Full `-o wide`/`split`
//! rendering (glyphs, colors, column layout) is out of scope (§15) — these
//! two formats exist to exercise the engine end-to-end, not to reproduce a
//! complete tree viewer.

use std::collections::HashMap;

use console::style;
use ktree_core::{Graph, Node, ProjectedTree, RelationshipSet};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Wide,
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wide" => Ok(Self::Wide),
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            "split" => Err("output format 'split' is not implemented by this renderer".to_string()),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

pub struct RenderOptions {
    pub show_group: bool,
    pub show_labels: bool,
    pub show_namespace: bool,
}

pub fn render(format: OutputFormat, graph: &Graph, tree: &ProjectedTree, opts: &RenderOptions) -> String {
    match format {
        OutputFormat::Wide => render_text(graph, tree, opts),
        OutputFormat::Json => render_json(graph, tree),
        OutputFormat::Yaml => render_yaml(graph, tree),
    }
}

fn label(node: &Node, opts: &RenderOptions) -> String {
    let mut s = String::new();
    if opts.show_group && !node.group.is_empty() {
        s.push_str(&format!("{}/", node.group));
    }
    s.push_str(&node.kind);
    s.push('/');
    s.push_str(&node.name);
    if opts.show_namespace {
        if let Some(ns) = &node.namespace {
            s.push_str(&format!(" (ns={ns})"));
        }
    }
    if opts.show_labels && !node.labels.is_empty() {
        let pairs: Vec<String> = node.labels.iter().map(|(k, v)| format!("{k}={v}")).collect();
        s.push_str(&format!(" [{}]", pairs.join(",")));
    }
    s
}

fn render_text(graph: &Graph, tree: &ProjectedTree, opts: &RenderOptions) -> String {
    let mut out = String::new();
    let Some(root) = graph.get(&tree.root) else {
        return out;
    };
    out.push_str(&label(root, opts));
    out.push('\n');

    // Group children by parent so siblings at the same depth print together
    // under a running prefix, the same way box-drawing CLIs (e.g. `tree`)
    // track an open/closed-branch stack per ancestor.
    let mut children_of: HashMap<&str, Vec<&ktree_core::ProjectedEdge>> = HashMap::new();
    for edge in &tree.edges {
        children_of.entry(edge.parent.as_str()).or_default().push(edge);
    }

    write_children(graph, &tree.root, "", &children_of, opts, &mut out);
    out
}

fn write_children<'a>(
    graph: &Graph,
    parent: &str,
    prefix: &str,
    children_of: &HashMap<&'a str, Vec<&'a ktree_core::ProjectedEdge>>,
    opts: &RenderOptions,
    out: &mut String,
) {
    let Some(children) = children_of.get(parent) else {
        return;
    };
    for edge in children {
        let Some(child) = graph.get(&edge.child) else {
            continue;
        };
        let connector = if edge.last_child { "└── " } else { "├── " };
        let relationship = format_relationship(&edge.relationship);
        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(&label(child, opts));
        out.push_str(&style(format!(" [{relationship}]")).dim().to_string());
        out.push('\n');

        let child_prefix = format!("{prefix}{}", if edge.last_child { "    " } else { "│   " });
        write_children(graph, edge.child.as_str(), &child_prefix, children_of, opts, out);
    }
}

fn format_relationship(set: &RelationshipSet) -> String {
    set.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(",")
}

#[derive(Serialize)]
struct JsonNode<'a> {
    uid: &'a str,
    group: &'a str,
    kind: &'a str,
    namespace: Option<&'a str>,
    name: &'a str,
}

#[derive(Serialize)]
struct JsonEdge<'a> {
    depth: u32,
    parent: &'a str,
    child: JsonNode<'a>,
    relationship: Vec<String>,
}

fn json_tree(graph: &Graph, tree: &ProjectedTree) -> Vec<JsonEdge<'_>> {
    tree.edges
        .iter()
        .filter_map(|edge| {
            let child = graph.get(&edge.child)?;
            Some(JsonEdge {
                depth: edge.depth,
                parent: &edge.parent,
                child: JsonNode {
                    uid: &child.uid,
                    group: &child.group,
                    kind: &child.kind,
                    namespace: child.namespace.as_deref(),
                    name: &child.name,
                },
                relationship: edge.relationship.iter().map(|k| k.to_string()).collect(),
            })
        })
        .collect()
}

fn render_json(graph: &Graph, tree: &ProjectedTree) -> String {
    serde_json::to_string_pretty(&json_tree(graph, tree)).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

fn render_yaml(graph: &Graph, tree: &ProjectedTree) -> String {
    serde_yaml::to_string(&json_tree(graph, tree)).unwrap_or_else(|e| format!("error: {e}"))
}
