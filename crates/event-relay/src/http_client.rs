// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use core::time::Duration;
use reqwest::ClientBuilder;
use std::error::Error;
#[cfg(feature = "fips")]
use tracing::debug;

/// Installs the FIPS crypto provider as the process-wide rustls default.
/// Must run before the first client is built.
#[cfg(feature = "fips")]
pub fn prepare_client_provider() -> Result<(), Box<dyn Error>> {
    rustls::crypto::default_fips_provider()
        .install_default()
        .map_err(|e| format!("Failed to set up fips provider: {e:?}").into())
}

/// No-op outside FIPS builds; reqwest brings its own provider.
#[cfg(not(feature = "fips"))]
pub fn prepare_client_provider() -> Result<(), Box<dyn Error>> {
    Ok(())
}

/// Creates a reqwest client builder using rustls.
#[cfg(not(feature = "fips"))]
pub fn create_reqwest_client_builder() -> Result<ClientBuilder, Box<dyn Error>> {
    Ok(reqwest::Client::builder().use_rustls_tls())
}

/// Creates a reqwest client builder whose TLS stack runs on the installed FIPS
/// provider and trusts the native root certificates.
#[cfg(feature = "fips")]
pub fn create_reqwest_client_builder() -> Result<ClientBuilder, Box<dyn Error>> {
    let provider = rustls::crypto::CryptoProvider::get_default()
        .filter(|provider| provider.fips())
        .ok_or("no FIPS-compliant crypto provider installed")?;

    let mut roots = rustls::RootCertStore::empty();
    let (added, ignored) =
        roots.add_parsable_certificates(rustls_native_certs::load_native_certs().certs);
    debug!("Loaded {added} native root certificates, ignored {ignored}");
    if added == 0 {
        return Err("no usable native root certificates".into());
    }

    let tls = rustls::ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots)
        .with_no_client_auth();
    if !tls.fips() {
        return Err("TLS configuration is not FIPS-compliant".into());
    }
    Ok(reqwest::Client::builder().use_preconfigured_tls(tls))
}

/// Builds a reqwest client with an optional HTTPS proxy and request timeout.
///
/// Without a timeout requests may wait on the data plane indefinitely.
pub fn build_client(
    proxy_url: Option<&str>,
    timeout: Option<Duration>,
) -> Result<reqwest::Client, Box<dyn Error>> {
    let mut builder = create_reqwest_client_builder()?;
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(proxy) = proxy_url {
        builder = builder.proxy(reqwest::Proxy::https(proxy)?);
    }
    Ok(builder.build()?)
}
