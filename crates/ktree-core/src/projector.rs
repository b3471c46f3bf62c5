//! Tree Projector: a depth-bounded, cycle-safe depth-first walk of the
//! dependents (or dependencies) sub-graph rooted at one UID.

use std::collections::HashSet;

use crate::error::{EngineError, Result};
use crate::graph::Graph;
use crate::model::{RelationshipSet, Uid};

/// Which adjacency map the walk follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Follow `dependents`: what points at this node (the default; shows
    /// what would break if the root were removed).
    Dependents,
    /// Follow `dependencies`: what this node points at.
    Dependencies,
}

/// One edge of a projected tree: the relationship(s) from `parent` to
/// `child`, at `child`'s depth.
#[derive(Debug, Clone)]
pub struct ProjectedEdge {
    pub depth: u32,
    pub parent: Uid,
    pub child: Uid,
    pub relationship: RelationshipSet,
    /// Whether `child` is the last sibling under `parent`, for renderers
    /// drawing box-art connectors.
    pub last_child: bool,
}

/// The result of a projection: the root UID plus every edge visited, in
/// pre-order.
#[derive(Debug, Clone)]
pub struct ProjectedTree {
    pub root: Uid,
    pub edges: Vec<ProjectedEdge>,
}

/// Walks `graph` from `root` in pre-order, following `direction`. `max_depth
/// == 0` means unbounded; otherwise descent stops past `max_depth` but the
/// node at exactly `max_depth` is still emitted (§4.6).
pub fn project(graph: &Graph, root: &Uid, direction: Direction, max_depth: u32) -> Result<ProjectedTree> {
    if !graph.contains(root) {
        return Err(EngineError::InconsistentGraph {
            detail: format!("root {root} is not in the fetched set"),
        });
    }

    let mut edges = Vec::new();
    let mut visited = HashSet::new();
    visited.insert(root.clone());

    walk(graph, root, 0, direction, max_depth, &mut visited, &mut edges)?;

    Ok(ProjectedTree {
        root: root.clone(),
        edges,
    })
}

/// Projects a Helm release: `anchor` becomes the tree's root, and every
/// member object becomes a direct child at depth 1 (the Helm Release
/// Expander's anchor contract, §4.4), with each member's own subtree walked
/// beneath it. A member already reached through an earlier member's subtree
/// is not revisited (the same cycle guard as a single-root projection,
/// extended across the whole forest).
pub fn project_forest(graph: &Graph, anchor: &Uid, members: &[Uid], direction: Direction, max_depth: u32) -> Result<ProjectedTree> {
    if !graph.contains(anchor) {
        return Err(EngineError::InconsistentGraph {
            detail: format!("Helm anchor {anchor} is not in the fetched set"),
        });
    }

    let mut edges = Vec::new();
    let mut visited = HashSet::new();
    visited.insert(anchor.clone());

    let mut ordered: Vec<&Uid> = members.iter().filter(|m| graph.contains(m)).collect();
    ordered.sort_by_key(|uid| graph.get(uid).map(|n| n.sort_key()).unwrap_or(("", "", "", uid.as_str())));

    let last_index = ordered.iter().filter(|uid| !visited.contains(**uid)).count().checked_sub(1);
    let mut emitted = 0usize;
    for member in ordered {
        if visited.contains(member) {
            continue;
        }
        visited.insert(member.clone());
        edges.push(ProjectedEdge {
            depth: 1,
            parent: anchor.clone(),
            child: member.clone(),
            relationship: RelationshipSet::new(),
            last_child: last_index == Some(emitted),
        });
        emitted += 1;

        if max_depth == 0 || 1 < max_depth {
            walk(graph, member, 1, direction, max_depth, &mut visited, &mut edges)?;
        }
    }

    Ok(ProjectedTree {
        root: anchor.clone(),
        edges,
    })
}

fn walk(
    graph: &Graph,
    parent: &Uid,
    parent_depth: u32,
    direction: Direction,
    max_depth: u32,
    visited: &mut HashSet<Uid>,
    edges: &mut Vec<ProjectedEdge>,
) -> Result<()> {
    let parent_node = graph.get(parent).ok_or_else(|| EngineError::InconsistentGraph {
        detail: format!("node {parent} referenced but not present in the fetched set"),
    })?;

    let adjacency = match direction {
        Direction::Dependents => &parent_node.dependents,
        Direction::Dependencies => &parent_node.dependencies,
    };

    let mut children: Vec<(&Uid, &RelationshipSet)> = adjacency
        .iter()
        .filter(|(uid, _)| !visited.contains(*uid))
        .collect();

    children.sort_by_key(|(uid, _)| {
        graph
            .get(uid)
            .map(|n| n.sort_key())
            .unwrap_or(("", "", "", uid.as_str()))
    });

    let child_depth = parent_depth + 1;
    let last_index = children.len().checked_sub(1);

    for (index, (child_uid, relationship)) in children.into_iter().enumerate() {
        if !graph.contains(child_uid) {
            return Err(EngineError::InconsistentGraph {
                detail: format!("edge {parent} -> {child_uid} references an absent node"),
            });
        }

        edges.push(ProjectedEdge {
            depth: child_depth,
            parent: parent.clone(),
            child: child_uid.clone(),
            relationship: relationship.clone(),
            last_child: last_index == Some(index),
        });

        if max_depth == 0 || child_depth < max_depth {
            visited.insert(child_uid.clone());
            walk(graph, child_uid, child_depth, direction, max_depth, visited, edges)?;
        }
    }

    Ok(())
}
