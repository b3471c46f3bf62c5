//! Builds the `kube::Client` from either the ambient kubeconfig or an
//! explicit override (§12).

use std::path::Path;
use std::time::Duration;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

use crate::error::Result;

pub async fn build(
    kubeconfig: Option<&Path>,
    context: Option<&str>,
    timeout_secs: u64,
) -> Result<Client> {
    let mut config = match kubeconfig {
        Some(path) => {
            let raw = Kubeconfig::read_from(path)?;
            let options = KubeConfigOptions {
                context: context.map(str::to_string),
                ..Default::default()
            };
            Config::from_custom_kubeconfig(raw, &options).await?
        }
        None => match context {
            Some(ctx) => {
                let options = KubeConfigOptions {
                    context: Some(ctx.to_string()),
                    ..Default::default()
                };
                Config::from_kubeconfig(&options).await?
            }
            None => Config::infer().await?,
        },
    };

    config.read_timeout = Some(Duration::from_secs(timeout_secs));

    Ok(Client::try_from(config)?)
}
