//! Server version query

use anyhow::{Context, Result};
use clap::Args;
use nf_rest_client::NifiClient;

/// Arguments for the version command
#[derive(Args, Debug, Default)]
pub struct VersionArgs {}

impl VersionArgs {
    pub async fn run(self, client: &NifiClient) -> Result<()> {
        let version = client
            .nifi_version()
            .await
            .context("Failed to get version")?;
        println!("NiFi version: {}", version);
        Ok(())
    }
}
