//! Helm Release Expander: resolves a release name to the set of object
//! identities it rendered, using the already-fetched NodeMap — no extra
//! network round-trip is needed since the release record's payload was
//! captured verbatim during the ordinary fetch.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use flate2::read::GzDecoder;
use std::io::Read;

use crate::error::{EngineError, Result, Warning};
use crate::graph::Graph;
use crate::model::{json_path, GroupKind, Node, Uid};

/// One object identity extracted from a release manifest, before resolution
/// against the fetched NodeMap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelmIdentity {
    pub group_kind: GroupKind,
    pub namespace: Option<String>,
    pub name: String,
}

/// The result of expanding a Helm release: the release record itself (used
/// as an anchor root) plus every UID its manifest resolved to.
#[derive(Debug, Clone)]
pub struct ExpandedRelease {
    pub anchor: Uid,
    pub members: Vec<Uid>,
}

/// Finds the latest non-superseded revision record for `release` in
/// `namespace`, decodes its manifest, and resolves each rendered object
/// against `graph` (§4.4).
pub fn expand_release(graph: &Graph, release: &str, namespace: &str) -> Result<(ExpandedRelease, Vec<Warning>)> {
    let mut warnings = Vec::new();

    let mut candidates: Vec<&Node> = graph
        .iter()
        .map(|(_, node)| node)
        .filter(|node| node.group.is_empty() && (node.kind == "Secret" || node.kind == "ConfigMap"))
        .filter(|node| node.namespace.as_deref() == Some(namespace))
        .filter(|node| node.labels.get("owner").map(String::as_str) == Some("helm"))
        .filter(|node| node.labels.get("name").map(String::as_str) == Some(release))
        .collect();

    if candidates.is_empty() {
        return Err(EngineError::HelmReleaseNotFound {
            release: release.to_string(),
            namespace: namespace.to_string(),
        });
    }

    // Prefer the deployed revision; if none is marked deployed, fall back to
    // the highest revision regardless of status (§4.4, §9).
    let deployed: Vec<&Node> = candidates
        .iter()
        .copied()
        .filter(|node| node.labels.get("status").map(String::as_str) == Some("deployed"))
        .collect();
    if !deployed.is_empty() {
        candidates = deployed;
    }

    let chosen = candidates
        .into_iter()
        .max_by_key(|node| node.labels.get("version").and_then(|v| v.parse::<u32>().ok()).unwrap_or(0))
        .expect("non-empty by construction");

    let manifest = decode_manifest(chosen).map_err(|reason| EngineError::HelmReleaseDecodeFailed {
        release: release.to_string(),
        reason,
    })?;

    let identities = parse_manifest(&manifest, &mut warnings);

    let index = graph.identity_index();
    let mut members = Vec::with_capacity(identities.len());
    for identity in identities {
        match index.get(&(identity.group_kind.kind.clone(), identity.namespace.clone(), identity.name.clone())) {
            Some(uid) => members.push(uid.clone()),
            None => warnings.push(Warning::new(format!(
                "helm: release '{release}' references {} '{}' which was not fetched",
                identity.group_kind.kind, identity.name
            ))),
        }
    }

    Ok((
        ExpandedRelease {
            anchor: chosen.uid.clone(),
            members,
        },
        warnings,
    ))
}

/// Decodes a release record's stored payload into the rendered manifest
/// text. Secrets store their `data` values base64-encoded a second time (the
/// ordinary Kubernetes Secret encoding, on top of Helm's own), ConfigMaps
/// store them as plain strings.
fn decode_manifest(node: &Node) -> std::result::Result<String, String> {
    let raw = json_path(&node.body, &["data", "release"])
        .and_then(|v| v.as_str())
        .ok_or_else(|| "release record has no data.release field".to_string())?;

    let inner_b64 = if node.kind == "Secret" {
        let once = BASE64.decode(raw).map_err(|e| format!("outer base64 decode failed: {e}"))?;
        String::from_utf8(once).map_err(|e| format!("decoded payload is not valid UTF-8: {e}"))?
    } else {
        raw.to_string()
    };

    let gzipped = BASE64
        .decode(inner_b64.trim())
        .map_err(|e| format!("inner base64 decode failed: {e}"))?;

    let mut decoder = GzDecoder::new(gzipped.as_slice());
    let mut json_text = String::new();
    decoder
        .read_to_string(&mut json_text)
        .map_err(|e| format!("gzip decompression failed: {e}"))?;

    let release_doc: serde_json::Value =
        serde_json::from_str(&json_text).map_err(|e| format!("release JSON is malformed: {e}"))?;

    json_path(&release_doc, &["manifest"])
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| "release document has no 'manifest' field".to_string())
}

/// Splits a rendered manifest into its constituent YAML documents and
/// extracts each one's identity. Documents that don't parse as an object
/// carrying `kind`/`apiVersion`/`metadata.name` are silently dropped — a
/// release can render comments-only or empty documents between `---`
/// separators and that's expected, not an error.
fn parse_manifest(manifest: &str, warnings: &mut Vec<Warning>) -> Vec<HelmIdentity> {
    let mut identities = Vec::new();

    for doc in manifest.split("\n---") {
        let doc = doc.trim();
        if doc.is_empty() {
            continue;
        }
        let value: serde_yaml::Value = match serde_yaml::from_str(doc) {
            Ok(v) => v,
            Err(_) => continue,
        };
        if value.is_null() {
            continue;
        }

        let kind = value.get("kind").and_then(|v| v.as_str());
        let api_version = value.get("apiVersion").and_then(|v| v.as_str());
        let name = value.get("metadata").and_then(|m| m.get("name")).and_then(|v| v.as_str());

        match (kind, api_version, name) {
            (Some(kind), Some(api_version), Some(name)) => {
                let namespace = value
                    .get("metadata")
                    .and_then(|m| m.get("namespace"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                let group = api_version.split_once('/').map(|(g, _)| g.to_string()).unwrap_or_default();
                identities.push(HelmIdentity {
                    group_kind: GroupKind::new(group, kind.to_string()),
                    namespace,
                    name: name.to_string(),
                });
            }
            _ => warnings.push(Warning::new("helm: dropped a manifest document missing kind/apiVersion/metadata.name".to_string())),
        }
    }

    identities
}
