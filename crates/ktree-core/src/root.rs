//! Root Resolver: maps a user-supplied reference to the unique [`Node`] (or
//! set of nodes, for a Helm release) that a projection should be rooted at.

use crate::discovery::DiscoveryCatalog;
use crate::error::{EngineError, Result};
use crate::graph::Graph;
use crate::model::Uid;

/// A root reference as parsed from the CLI surface.
#[derive(Debug, Clone)]
pub enum RootReference {
    /// `kind-hint`, `name`, optional namespace restriction.
    ByKind {
        kind_hint: String,
        name: String,
        namespace: Option<String>,
    },
    /// A Helm release name, resolved by the release expander rather than
    /// directly against the NodeMap.
    Helm {
        release: String,
        namespace: Option<String>,
    },
}

impl RootReference {
    pub fn reference_label(&self) -> String {
        match self {
            Self::ByKind {
                kind_hint,
                name,
                namespace,
            } => match namespace {
                Some(ns) => format!("{kind_hint}/{name} -n {ns}"),
                None => format!("{kind_hint}/{name}"),
            },
            Self::Helm { release, namespace } => match namespace {
                Some(ns) => format!("helm release {release} -n {ns}"),
                None => format!("helm release {release}"),
            },
        }
    }
}

/// Resolves a `(kind-hint, name, namespace)` reference to the single
/// matching node's UID. The kind hint is first matched against the
/// discovery catalog (§4.3) to collect every `(group, kind)` it could mean,
/// then nodes are filtered by that set of kinds plus name/namespace.
pub fn resolve_by_kind(
    graph: &Graph,
    catalog: &DiscoveryCatalog,
    kind_hint: &str,
    name: &str,
    namespace: Option<&str>,
) -> Result<Uid> {
    let matching_kinds: Vec<(String, String)> = catalog
        .find_by_hint(kind_hint)
        .into_iter()
        .map(|info| (info.api_resource.group.clone(), info.api_resource.kind.clone()))
        .collect();

    let reference = match namespace {
        Some(ns) => format!("{kind_hint}/{name} -n {ns}"),
        None => format!("{kind_hint}/{name}"),
    };

    if matching_kinds.is_empty() {
        return Err(EngineError::RootNotFound { reference });
    }

    let candidates: Vec<&crate::model::Node> = graph
        .iter()
        .map(|(_, node)| node)
        .filter(|node| matching_kinds.iter().any(|(g, k)| &node.group == g && &node.kind == k))
        .filter(|node| node.name == name)
        .filter(|node| match namespace {
            Some(ns) => node.namespace.as_deref() == Some(ns),
            None => true,
        })
        .collect();

    match candidates.len() {
        0 => Err(EngineError::RootNotFound { reference }),
        1 => Ok(candidates[0].uid.clone()),
        _ => {
            let mut labels: Vec<String> = candidates
                .iter()
                .map(|n| {
                    format!(
                        "{}/{} ({}{})",
                        n.kind,
                        n.name,
                        n.group,
                        n.namespace.as_deref().map(|ns| format!(", ns={ns}")).unwrap_or_default()
                    )
                })
                .collect();
            labels.sort();
            Err(EngineError::AmbiguousRoot {
                reference,
                candidates: labels,
            })
        }
    }
}
