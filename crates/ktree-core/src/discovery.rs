//! Discovery Catalog: enumerates every API group/version/resource the
//! cluster advertises and collapses duplicate kinds to their preferred
//! version.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use kube::Client;
use kube::discovery::{ApiResource, Scope};

use crate::error::Warning;
use crate::model::GroupKind;

/// One listable resource kind, as advertised by the cluster, carrying the
/// fields the Root Resolver needs for kind-hint matching (plural, singular,
/// short names) that `kube`'s higher-level discovery types don't expose.
#[derive(Debug, Clone)]
pub struct ResourceInfo {
    pub api_resource: ApiResource,
    pub scope: Scope,
    pub singular: String,
    pub short_names: Vec<String>,
    pub verbs: Vec<String>,
}

impl ResourceInfo {
    pub fn group_kind(&self) -> GroupKind {
        GroupKind::new(self.api_resource.group.clone(), self.api_resource.kind.clone())
    }

    pub fn is_namespaced(&self) -> bool {
        matches!(self.scope, Scope::Namespaced)
    }

    pub fn supports_list(&self) -> bool {
        self.verbs.iter().any(|v| v == "list")
    }

    /// Kind-hint matching per §4.3: exact resource-name, exact plural, exact
    /// singular, kind (case-insensitive), or short name.
    pub fn matches_hint(&self, hint: &str) -> bool {
        let hint_lower = hint.to_ascii_lowercase();
        self.api_resource.plural == hint
            || self.singular == hint
            || self.api_resource.kind.eq_ignore_ascii_case(hint)
            || self.short_names.iter().any(|s| s == &hint_lower || s == hint)
    }
}

/// The enumerated catalog of listable resources, collapsed to one entry per
/// `(group, kind)`.
#[derive(Debug, Default)]
pub struct DiscoveryCatalog {
    resources: Vec<ResourceInfo>,
}

impl DiscoveryCatalog {
    /// Builds a catalog directly from an already-filtered resource list
    /// (used by the CLI's `--scopes` restriction).
    pub fn from_resources(resources: Vec<ResourceInfo>) -> Self {
        Self { resources }
    }

    pub fn resources(&self) -> &[ResourceInfo] {
        &self.resources
    }

    pub fn find_by_hint<'a>(&'a self, hint: &str) -> Vec<&'a ResourceInfo> {
        self.resources.iter().filter(|r| r.matches_hint(hint)).collect()
    }

    #[cfg(test)]
    pub(crate) fn push_for_test(&mut self, info: ResourceInfo) {
        self.resources.push(info);
    }

    /// Runs discovery against the live cluster. A group that cannot be
    /// listed is skipped with a warning (§4.1); discovery only fails fatally
    /// if the top-level group list itself cannot be retrieved.
    pub async fn discover(client: &Client) -> Result<(Self, Vec<Warning>), kube::Error> {
        let mut warnings = Vec::new();
        let mut resources = Vec::new();

        #[allow(deprecated)]
        let api_groups = client.list_api_groups().await?;

        for group in api_groups.groups {
            let preferred_version = group.preferred_version.as_ref().map(|v| v.version.clone());
            let mut per_version: Vec<(String, APIResourceList)> = Vec::new();
            let mut group_failed = false;

            for v in &group.versions {
                tracing::debug!(group = %group.name, version = %v.version, "listing group version resources");
                #[allow(deprecated)]
                match client.list_api_group_resources(&v.group_version).await {
                    Ok(list) => per_version.push((v.version.clone(), list)),
                    Err(e) => {
                        warnings.push(Warning::new(format!(
                            "discovery: group '{}' is unreachable, skipping: {e}",
                            group.name
                        )));
                        group_failed = true;
                        break;
                    }
                }
            }
            if group_failed {
                continue;
            }

            resources.extend(collapse_versions(preferred_version.as_deref(), per_version));
        }

        #[allow(deprecated)]
        let core_versions = client.list_core_api_versions().await?;
        let mut core_per_version = Vec::new();
        for v in core_versions.versions {
            tracing::debug!(group = "", version = %v, "listing core version resources");
            #[allow(deprecated)]
            match client.list_core_api_resources(&v).await {
                Ok(list) => core_per_version.push((v, list)),
                Err(e) => {
                    warnings.push(Warning::new(format!(
                        "discovery: core API is partially unreachable: {e}"
                    )));
                }
            }
        }
        // Core group always prefers v1.
        resources.extend(collapse_versions(Some("v1"), core_per_version));

        resources.retain(|r: &ResourceInfo| r.supports_list());

        tracing::info!(resource_count = resources.len(), "discovery complete");
        Ok((Self { resources }, warnings))
    }
}

/// Collapses resources seen under multiple versions of the same group down
/// to one entry per kind: the preferred version if it carries that kind,
/// otherwise the lexicographically greatest version that does (§4.1).
fn collapse_versions(
    preferred: Option<&str>,
    per_version: Vec<(String, APIResourceList)>,
) -> Vec<ResourceInfo> {
    use std::collections::HashMap;

    let mut by_kind: HashMap<String, Vec<(String, ResourceInfo)>> = HashMap::new();

    for (version, list) in per_version {
        for raw in &list.resources {
            if raw.name.contains('/') {
                continue; // sub-resources excluded
            }
            #[allow(deprecated)]
            let api_resource = ApiResource::from_apiresource(raw, &list.group_version);
            let scope = if raw.namespaced {
                Scope::Namespaced
            } else {
                Scope::Cluster
            };
            let info = ResourceInfo {
                api_resource,
                scope,
                singular: raw.singular_name.clone(),
                short_names: raw.short_names.clone().unwrap_or_default(),
                verbs: raw.verbs.clone(),
            };
            by_kind.entry(raw.kind.clone()).or_default().push((version.clone(), info));
        }
    }

    let mut out = Vec::with_capacity(by_kind.len());
    for (_, mut versions) in by_kind {
        let chosen = if let Some(pref) = preferred {
            versions.iter().position(|(v, _)| v == pref)
        } else {
            None
        };
        let index = chosen.unwrap_or_else(|| {
            versions
                .iter()
                .enumerate()
                .max_by(|(_, (a, _)), (_, (b, _))| a.cmp(b))
                .map(|(i, _)| i)
                .unwrap_or(0)
        });
        out.push(versions.swap_remove(index).1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource_list(group_version: &str, kinds: &[(&str, &str)]) -> APIResourceList {
        use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResource;

        APIResourceList {
            group_version: group_version.to_string(),
            resources: kinds
                .iter()
                .map(|(name, kind)| APIResource {
                    name: name.to_string(),
                    singular_name: name.trim_end_matches('s').to_string(),
                    namespaced: true,
                    group: None,
                    version: None,
                    kind: kind.to_string(),
                    verbs: vec!["list".to_string(), "get".to_string()],
                    short_names: Some(vec![]),
                    categories: None,
                    storage_version_hash: None,
                })
                .collect(),
        }
    }

    #[test]
    fn collapse_prefers_preferred_version() {
        let per_version = vec![
            ("v1beta1".to_string(), resource_list("widgets.example.io/v1beta1", &[("widgets", "Widget")])),
            ("v1".to_string(), resource_list("widgets.example.io/v1", &[("widgets", "Widget")])),
        ];
        let collapsed = collapse_versions(Some("v1"), per_version);
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed[0].api_resource.version, "v1");
    }

    #[test]
    fn collapse_falls_back_to_lexicographically_greatest_on_no_preference() {
        let per_version = vec![
            ("v1alpha1".to_string(), resource_list("widgets.example.io/v1alpha1", &[("widgets", "Widget")])),
            ("v1beta2".to_string(), resource_list("widgets.example.io/v1beta2", &[("widgets", "Widget")])),
            ("v1beta10".to_string(), resource_list("widgets.example.io/v1beta10", &[("widgets", "Widget")])),
        ];
        let collapsed = collapse_versions(None, per_version);
        assert_eq!(collapsed.len(), 1);
        // plain lexicographic comparison, not semantic version ordering
        assert_eq!(collapsed[0].api_resource.version, "v1beta2");
    }

    #[test]
    fn subresources_are_excluded() {
        let list = resource_list("apps/v1", &[("deployments", "Deployment")]);
        let mut list = list;
        list.resources.push(k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResource {
            name: "deployments/status".to_string(),
            singular_name: String::new(),
            namespaced: true,
            group: None,
            version: None,
            kind: "Deployment".to_string(),
            verbs: vec!["get".to_string(), "update".to_string()],
            short_names: None,
            categories: None,
            storage_version_hash: None,
        });
        let collapsed = collapse_versions(Some("v1"), vec![("v1".to_string(), list)]);
        assert_eq!(collapsed.len(), 1);
    }

    #[test]
    fn only_list_capable_resources_survive_filtering() {
        let info = ResourceInfo {
            api_resource: ApiResource::from_gvk_with_plural(
                &kube::core::GroupVersionKind::gvk("", "v1", "ComponentStatus"),
                "componentstatuses",
            ),
            scope: Scope::Cluster,
            singular: "componentstatus".to_string(),
            short_names: vec![],
            verbs: vec!["get".to_string()],
        };
        assert!(!info.supports_list());
    }

    #[test]
    fn matches_hint_on_short_name_kind_and_plural() {
        let info = ResourceInfo {
            api_resource: ApiResource::from_gvk_with_plural(
                &kube::core::GroupVersionKind::gvk("", "v1", "Pod"),
                "pods",
            ),
            scope: Scope::Namespaced,
            singular: "pod".to_string(),
            short_names: vec!["po".to_string()],
            verbs: vec!["list".to_string()],
        };
        assert!(info.matches_hint("pods"));
        assert!(info.matches_hint("pod"));
        assert!(info.matches_hint("Pod"));
        assert!(info.matches_hint("po"));
        assert!(!info.matches_hint("deployments"));
    }
}
