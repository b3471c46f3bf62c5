//! ktree: prints the dependency tree of a Kubernetes object, or of every
//! object belonging to a Helm release.

mod client;
mod error;
mod exit_codes;
mod render;

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use error::{CliError, Result};
use ktree_core::{Direction, DiscoveryCatalog, FetchScope, RootReference};
use render::{OutputFormat, RenderOptions};

/// Prints the dependency tree of a Kubernetes object or Helm release.
#[derive(Parser, Debug)]
#[command(name = "ktree", version, about)]
struct Cli {
    /// Kind hint, or `<kind>/<name>`, or a release name with --helm.
    reference: String,

    /// Object name, if not given as `<kind>/<name>` in the first argument.
    name: Option<String>,

    /// Restrict the fetch (and the root lookup) to one namespace.
    #[arg(short = 'n', long)]
    namespace: Option<String>,

    /// Fetch every namespace (overrides -n for namespaced kinds).
    #[arg(short = 'A', long = "all-namespaces")]
    all_namespaces: bool,

    /// Maximum tree depth to print; 0 means unbounded.
    #[arg(short = 'd', long, default_value_t = 0)]
    depth: u32,

    /// Walk dependencies (what the root points at) instead of dependents.
    #[arg(long)]
    dependencies: bool,

    /// Restrict discovery to these GroupKinds (`<kind>` or `<group>/<kind>`), comma-separated.
    #[arg(short = 's', long = "scopes", value_delimiter = ',')]
    scopes: Vec<String>,

    /// Output format.
    #[arg(short = 'o', long, default_value = "wide")]
    output: String,

    #[arg(long = "show-group")]
    show_group: bool,

    #[arg(long = "show-labels")]
    show_labels: bool,

    #[arg(long = "show-namespace")]
    show_namespace: bool,

    /// Treat the root reference as a Helm release name.
    #[arg(long)]
    helm: bool,

    /// Repeatable: raises log verbosity (-v debug, -vv trace).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Explicit kubeconfig path, overriding the ambient one.
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use.
    #[arg(long)]
    context: Option<String>,

    /// Per-request timeout, in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.exit_code());
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "ktree=info",
        1 => "ktree=debug,ktree_core=debug",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().init();
}

async fn run(cli: Cli) -> Result<()> {
    let output_format = OutputFormat::from_str(&cli.output).map_err(CliError::InvalidOutputFormat)?;
    let render_opts = RenderOptions {
        show_group: cli.show_group,
        show_labels: cli.show_labels,
        show_namespace: cli.show_namespace,
    };
    let direction = if cli.dependencies {
        Direction::Dependencies
    } else {
        Direction::Dependents
    };

    let client = client::build(cli.kubeconfig.as_deref(), cli.context.as_deref(), cli.timeout).await?;

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let (mut catalog, discovery_warnings) = DiscoveryCatalog::discover(&client)
        .await
        .map_err(|source| ktree_core::EngineError::DiscoveryUnavailable { source })?;
    log_warnings(&discovery_warnings);

    if !cli.scopes.is_empty() {
        catalog = filter_scopes(catalog, &cli.scopes)?;
    }

    let scope = match (&cli.namespace, cli.all_namespaces) {
        (_, true) => FetchScope::AllNamespaces,
        (Some(ns), false) => FetchScope::Namespace(ns.clone()),
        (None, false) => FetchScope::AllNamespaces,
    };

    let fetch_result = ktree_core::fetch::fetch(&client, &catalog, &scope, ktree_core::fetch::DEFAULT_CONCURRENCY, &cancel).await;
    log_warnings(&fetch_result.warnings);
    if fetch_result.canceled {
        return Err(CliError::Engine(ktree_core::EngineError::Canceled));
    }
    let mut graph = fetch_result.graph;

    let reference = parse_reference(&cli)?;

    let tree = match &reference {
        RootReference::Helm { release, namespace } => {
            let namespace = namespace.as_ref().ok_or(CliError::HelmNamespaceRequired)?;
            let resolve_warnings = ktree_core::relationships::resolve_all(&mut graph);
            log_warnings(&resolve_warnings);

            let (expanded, helm_warnings) =
                ktree_core::helm::expand_release(&graph, release, namespace).map_err(CliError::Engine)?;
            log_warnings(&helm_warnings);

            ktree_core::project_forest(&graph, &expanded.anchor, &expanded.members, direction, cli.depth)
                .map_err(CliError::Engine)?
        }
        RootReference::ByKind {
            kind_hint,
            name,
            namespace,
        } => {
            let root_uid = ktree_core::root::resolve_by_kind(&graph, &catalog, kind_hint, name, namespace.as_deref())
                .map_err(CliError::Engine)?;
            let resolve_warnings = ktree_core::relationships::resolve_all(&mut graph);
            log_warnings(&resolve_warnings);

            ktree_core::project(&graph, &root_uid, direction, cli.depth).map_err(CliError::Engine)?
        }
    };

    println!("{}", render::render(output_format, &graph, &tree, &render_opts));

    watcher.abort();
    Ok(())
}

fn parse_reference(cli: &Cli) -> Result<RootReference> {
    if cli.helm {
        return Ok(RootReference::Helm {
            release: cli.reference.clone(),
            namespace: cli.namespace.clone(),
        });
    }

    if let Some(name) = &cli.name {
        return Ok(RootReference::ByKind {
            kind_hint: cli.reference.clone(),
            name: name.clone(),
            namespace: cli.namespace.clone(),
        });
    }

    match cli.reference.split_once('/') {
        Some((kind, name)) if !kind.is_empty() && !name.is_empty() => Ok(RootReference::ByKind {
            kind_hint: kind.to_string(),
            name: name.to_string(),
            namespace: cli.namespace.clone(),
        }),
        _ => Err(CliError::InvalidReference(cli.reference.clone())),
    }
}

fn filter_scopes(catalog: DiscoveryCatalog, scopes: &[String]) -> Result<DiscoveryCatalog> {
    let parsed: Vec<(Option<String>, String)> = scopes
        .iter()
        .map(|s| match s.split_once('/') {
            Some((group, kind)) => (Some(group.to_string()), kind.to_string()),
            None => (None, s.clone()),
        })
        .collect();

    let resources = catalog
        .resources()
        .iter()
        .filter(|info| {
            parsed.iter().any(|(group, kind)| {
                info.api_resource.kind.eq_ignore_ascii_case(kind) && group.as_deref().is_none_or(|g| g == info.api_resource.group)
            })
        })
        .cloned()
        .collect();

    Ok(DiscoveryCatalog::from_resources(resources))
}

fn log_warnings(warnings: &[ktree_core::Warning]) {
    for warning in warnings {
        tracing::warn!("{warning}");
    }
}
