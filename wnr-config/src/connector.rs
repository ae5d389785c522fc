// SPDX-License-Identifier: MIT
//
// WNR Client Configuration: Entropy Source Factory
// Copyright (c) 2025 Valer Bocan, PhD, CSSLP
// Email: valer.bocan@upt.ro
//
// Department of Computer and Information Technology
// Politehnica University of Timisoara
//
// https://github.com/vbocan/qrng-data-diode

//! Entropy source connectors
//!
//! The configuration layer never talks to an entropy source. It validates the
//! settings of a source and hands them to a [`SourceFactory`], which builds the
//! connector the polling loop will later drive. A connector is released when its
//! box is dropped.
//!
//! [`DefaultFactory`] builds unopened connectors: the network connector owns a
//! configured HTTPS client but has not issued any request yet.

use crate::buffer::BufferLimits;
use crate::crypto::{HmacKey, PacketVerifier};
use crate::source::{FileConfig, NetworkConfig, QrngConfig, SourceKind};
use crate::{Error, Result};
use reqwest::{Client, ClientBuilder};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Live handle on an entropy source
pub trait EntropySource: fmt::Debug + Send {
    fn kind(&self) -> SourceKind;

    fn buffer(&self) -> BufferLimits;

    /// Authenticate responses with a static HMAC key
    fn set_static_hmac_key(&mut self, key: &HmacKey) -> Result<()> {
        let _ = key;
        Err(Error::Construction(format!(
            "{} sources do not accept an HMAC key",
            self.kind()
        )))
    }
}

/// Constructors for each entropy source variant.
///
/// Implementations report failures as [`Error::Construction`].
pub trait SourceFactory {
    fn network(&self, config: &NetworkConfig, buffer: BufferLimits) -> Result<Box<dyn EntropySource>>;

    fn file(&self, config: &FileConfig, buffer: BufferLimits) -> Result<Box<dyn EntropySource>>;

    fn qrng(&self, config: &QrngConfig, buffer: BufferLimits) -> Result<Box<dyn EntropySource>>;
}

impl<F: SourceFactory + ?Sized> SourceFactory for &F {
    fn network(&self, config: &NetworkConfig, buffer: BufferLimits) -> Result<Box<dyn EntropySource>> {
        (**self).network(config, buffer)
    }

    fn file(&self, config: &FileConfig, buffer: BufferLimits) -> Result<Box<dyn EntropySource>> {
        (**self).file(config, buffer)
    }

    fn qrng(&self, config: &QrngConfig, buffer: BufferLimits) -> Result<Box<dyn EntropySource>> {
        (**self).qrng(config, buffer)
    }
}

/// Factory producing the connectors shipped with this crate
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFactory;

impl SourceFactory for DefaultFactory {
    fn network(&self, config: &NetworkConfig, buffer: BufferLimits) -> Result<Box<dyn EntropySource>> {
        Ok(Box::new(NetworkConnector::new(config, buffer)?))
    }

    fn file(&self, config: &FileConfig, buffer: BufferLimits) -> Result<Box<dyn EntropySource>> {
        Ok(Box::new(FileConnector::new(&config.path, buffer)))
    }

    fn qrng(&self, config: &QrngConfig, buffer: BufferLimits) -> Result<Box<dyn EntropySource>> {
        Ok(Box::new(QrngConnector::new(&config.instance_name, buffer)))
    }
}

/// HTTPS connector for a remote entropy service
#[derive(Debug)]
pub struct NetworkConnector {
    client: Client,
    endpoint: Url,
    client_id: String,
    max_reconnects: i64,
    buffer: BufferLimits,
    verifier: Option<PacketVerifier>,
}

impl NetworkConnector {
    /// Request timeout of the underlying client
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(config: &NetworkConfig, buffer: BufferLimits) -> Result<Self> {
        let endpoint = endpoint_url(config)?;

        let mut builder = ClientBuilder::new()
            .timeout(Self::REQUEST_TIMEOUT)
            .pool_max_idle_per_host(1)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .use_rustls_tls();

        // Connect to the configured address while presenting the hostname
        if config.address != config.hostname {
            if let Ok(ip) = config.address.parse::<IpAddr>() {
                builder = builder.resolve(&config.hostname, SocketAddr::new(ip, config.port));
            }
        }

        let client = builder.build().map_err(|e| {
            Error::Construction(format!("Error creating HTTP client for {}: {}", endpoint, e))
        })?;

        debug!(
            "Network source {} -> {} (address {})",
            config.client_id, endpoint, config.address
        );

        Ok(Self {
            client,
            endpoint,
            client_id: config.client_id.clone(),
            max_reconnects: config.max_reconnects,
            buffer,
            verifier: None,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn max_reconnects(&self) -> i64 {
        self.max_reconnects
    }

    /// Verifier for responses, present once a static key is attached
    pub fn verifier(&self) -> Option<&PacketVerifier> {
        self.verifier.as_ref()
    }

    /// Build the URL of a request for `bytes` bytes of entropy
    pub fn request_url(&self, bytes: usize) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("bytes", &bytes.to_string());
        url
    }
}

impl EntropySource for NetworkConnector {
    fn kind(&self) -> SourceKind {
        SourceKind::Network
    }

    fn buffer(&self) -> BufferLimits {
        self.buffer
    }

    fn set_static_hmac_key(&mut self, key: &HmacKey) -> Result<()> {
        if key.is_empty() {
            return Err(Error::Construction(
                "Failed to set static HMAC key: key is empty".to_string(),
            ));
        }
        self.verifier = Some(PacketVerifier::new(key)?);
        Ok(())
    }
}

fn endpoint_url(config: &NetworkConfig) -> Result<Url> {
    let host = match config.hostname.parse::<IpAddr>() {
        Ok(IpAddr::V6(ip)) => format!("[{}]", ip),
        _ => config.hostname.clone(),
    };

    let invalid = |reason: String| {
        Error::Construction(format!(
            "Invalid endpoint for {}:{}{}: {}",
            config.hostname, config.port, config.uri, reason
        ))
    };

    let base = Url::parse(&format!("https://{}:{}/", host, config.port))
        .map_err(|e| invalid(e.to_string()))?;
    let endpoint = base.join(&config.uri).map_err(|e| invalid(e.to_string()))?;

    // The URI may only contribute a path and query
    if endpoint.scheme() != base.scheme()
        || endpoint.host() != base.host()
        || endpoint.port_or_known_default() != base.port_or_known_default()
    {
        return Err(invalid("URI overrides the configured host".to_string()));
    }

    Ok(endpoint)
}

/// Connector reading entropy from a local file or device
#[derive(Debug, Clone)]
pub struct FileConnector {
    path: PathBuf,
    buffer: BufferLimits,
}

impl FileConnector {
    pub fn new(path: impl AsRef<Path>, buffer: BufferLimits) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            buffer,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EntropySource for FileConnector {
    fn kind(&self) -> SourceKind {
        SourceKind::FilePath
    }

    fn buffer(&self) -> BufferLimits {
        self.buffer
    }
}

/// Connector for a quantum RNG device instance
#[derive(Debug, Clone)]
pub struct QrngConnector {
    instance_name: String,
    buffer: BufferLimits,
}

impl QrngConnector {
    pub fn new(instance_name: &str, buffer: BufferLimits) -> Self {
        Self {
            instance_name: instance_name.to_string(),
            buffer,
        }
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }
}

impl EntropySource for QrngConnector {
    fn kind(&self) -> SourceKind {
        SourceKind::Qrng
    }

    fn buffer(&self) -> BufferLimits {
        self.buffer
    }
}
