//! Connection settings shared by every command

use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::Args;
use nf_rest_client::{
    ClientConfig, Credentials, NifiClient, TlsMode, DEFAULT_BASE_URL, DEFAULT_PASSWORD,
    DEFAULT_USERNAME,
};
use std::path::PathBuf;
use std::time::Duration;

/// How to reach and authenticate against the NiFi instance
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// NiFi base URL
    #[arg(long, env = "NIFI_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub url: String,

    /// Username for the token endpoint
    #[arg(long, env = "NIFI_USERNAME", default_value = DEFAULT_USERNAME, global = true)]
    pub username: String,

    /// Password for the token endpoint
    #[arg(
        long,
        env = "NIFI_PASSWORD",
        default_value = DEFAULT_PASSWORD,
        hide_env_values = true,
        hide_default_value = true,
        global = true
    )]
    pub password: String,

    /// Skip TLS certificate verification (self-signed development servers)
    #[arg(
        long,
        env = "NIFI_INSECURE",
        value_parser = FalseyValueParser::new(),
        conflicts_with = "ca_cert",
        global = true
    )]
    pub insecure: bool,

    /// PEM bundle of additional trusted CA certificates
    #[arg(long = "ca-cert", env = "NIFI_CA_CERT", value_name = "FILE", global = true)]
    pub ca_cert: Option<PathBuf>,

    /// Per-request timeout
    #[arg(
        long,
        env = "NIFI_TIMEOUT",
        value_name = "SECONDS",
        default_value_t = 30,
        global = true
    )]
    pub timeout: u64,
}

impl ConnectionArgs {
    pub fn tls_mode(&self) -> TlsMode {
        match (&self.ca_cert, self.insecure) {
            (Some(path), _) => TlsMode::CustomCa(path.clone()),
            (None, true) => TlsMode::Insecure,
            (None, false) => TlsMode::Verify,
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(
            self.url.clone(),
            Credentials::new(self.username.clone(), self.password.clone()),
        )
        .with_tls(self.tls_mode())
        .with_request_timeout(Duration::from_secs(self.timeout))
    }

    /// Build the client; no request is sent yet
    pub fn connect(&self) -> Result<NifiClient> {
        NifiClient::new(self.client_config())
            .with_context(|| format!("Failed to configure client for {}", self.url))
    }
}
