//! Readiness and authentication check

use anyhow::{bail, Context, Result};
use clap::Args;
use nf_rest_client::NifiClient;

use crate::output::print_header;

const TOKEN_PREVIEW_CHARS: usize = 50;

/// Arguments for the setup command
#[derive(Args, Debug, Default)]
pub struct SetupArgs {}

impl SetupArgs {
    pub async fn run(self, client: &NifiClient) -> Result<()> {
        print_header("NiFi Setup Check");

        println!("Checking if NiFi is ready...");
        if !client.is_ready().await {
            bail!(
                "NiFi is not ready at {}. Make sure it is running and reachable",
                client.base_url()
            );
        }
        println!("✓ NiFi is ready");
        println!();

        println!("Authenticating...");
        let token = client
            .authenticate()
            .await
            .context("Authentication failed")?;
        println!("✓ Authentication successful");
        println!(
            "  Token (first {} chars): {}...",
            TOKEN_PREVIEW_CHARS,
            token.preview(TOKEN_PREVIEW_CHARS)
        );
        println!();

        let version = client
            .nifi_version()
            .await
            .context("Failed to get version")?;
        println!("✓ NiFi version: {}", version);
        println!();

        let root_group_id = client
            .root_process_group_id()
            .await
            .context("Failed to look up the root process group")?;
        println!("✓ Root process group ID: {}", root_group_id);
        println!();

        println!("Setup complete! NiFi is ready to use.");
        Ok(())
    }
}
