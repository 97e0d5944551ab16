//! TLS client configuration for https backends.

use std::sync::Arc;

use rustls::{ClientConfig, RootCertStore};

/// Client TLS settings trusting the platform's root certificates.
///
/// An empty root store is not fatal: plain-http routes still work, and
/// https handshakes fail as unreachable backends.
pub fn client_config() -> Result<ClientConfig, rustls::Error> {
    let native = rustls_native_certs::load_native_certs();
    for error in &native.errors {
        tracing::warn!(error = %error, "Failed to load a platform root certificate");
    }

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(native.certs);
    if added == 0 {
        tracing::warn!("No platform root certificates found; https backends will be rejected");
    }
    tracing::debug!(added, ignored, "Loaded TLS root certificates");

    let config = ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_speaks_no_alpn() {
        // The connector negotiates HTTP/1.1 itself and rejects a preset ALPN list.
        let config = client_config().unwrap();
        assert!(config.alpn_protocols.is_empty());
    }
}
