//! TLS verification settings

use reqwest::{Certificate, ClientBuilder};
use std::path::PathBuf;
use tracing::warn;

use crate::error::{RestClientError, RestClientResult};

/// How the client verifies the server certificate
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Verify against the platform trust roots
    #[default]
    Verify,
    /// Accept any certificate (self-signed development servers)
    Insecure,
    /// Additionally trust the certificates of a PEM bundle
    CustomCa(PathBuf),
}

impl TlsMode {
    pub(crate) fn configure(&self, builder: ClientBuilder) -> RestClientResult<ClientBuilder> {
        match self {
            TlsMode::Verify => Ok(builder),
            TlsMode::Insecure => {
                warn!("TLS certificate verification is disabled");
                Ok(builder.danger_accept_invalid_certs(true))
            }
            TlsMode::CustomCa(path) => {
                let pem = std::fs::read(path).map_err(|e| {
                    RestClientError::Config(format!(
                        "failed to read CA bundle {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                let certs = Certificate::from_pem_bundle(&pem).map_err(|e| {
                    RestClientError::Config(format!(
                        "failed to parse CA bundle {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                if certs.is_empty() {
                    return Err(RestClientError::Config(format!(
                        "CA bundle {} contains no certificates",
                        path.display()
                    )));
                }

                Ok(certs
                    .into_iter()
                    .fold(builder, |builder, cert| builder.add_root_certificate(cert)))
            }
        }
    }
}
