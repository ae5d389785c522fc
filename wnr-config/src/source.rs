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

//! Entropy source descriptors
//!
//! A source subtree looks like:
//!
//! ```yaml
//! seed:
//!   type: network            # network | filepath | qrng
//!   buffer_size: 4096
//!   buffer_threshold: 1024
//!   client_id: client-1
//!   hostname: entropy.example.com
//!   port: 443
//!   URI: /api/entropy
//!   hmac_key: c2VjcmV0       # optional, base64
//! ```
//!
//! [`build_source`] validates the common keys, then the keys of the selected
//! variant, and asks a [`SourceFactory`] for the connector. It never returns a
//! partially validated descriptor.

use crate::buffer::BufferLimits;
use crate::connector::{EntropySource, SourceFactory};
use crate::crypto::{self, HmacKey};
use crate::document::Setting;
use crate::limits::{DEFAULT_MAX_RECONNECTS, DEFAULT_QRNG_INSTANCE};
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Entropy source variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Remote entropy service
    Network,
    /// Local file or character device
    FilePath,
    /// Quantum RNG device, requires the `qrng` feature
    Qrng,
}

impl SourceKind {
    const ALL: [SourceKind; 3] = [SourceKind::Network, SourceKind::FilePath, SourceKind::Qrng];

    /// Resolve a `type` string.
    ///
    /// Returns `None` for unknown types and for types this build does not support.
    pub fn resolve(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .filter(|kind| kind.is_available())
    }

    /// Whether this build can construct sources of this kind
    pub fn is_available(self) -> bool {
        match self {
            SourceKind::Qrng => cfg!(feature = "qrng"),
            SourceKind::Network | SourceKind::FilePath => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Network => "network",
            SourceKind::FilePath => "filepath",
            SourceKind::Qrng => "qrng",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings of a network source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkConfig {
    pub client_id: String,
    pub address: String,
    pub hostname: String,
    pub port: u16,
    pub uri: String,
    /// Static key, decoded from base64
    #[serde(skip)]
    pub hmac_key: Option<HmacKey>,
    /// Not range checked
    pub max_reconnects: i64,
}

/// Settings of a file source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileConfig {
    pub path: PathBuf,
}

impl FileConfig {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Settings of a QRNG source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QrngConfig {
    pub instance_name: String,
}

/// Variant-specific settings of a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Network(NetworkConfig),
    FilePath(FileConfig),
    Qrng(QrngConfig),
}

impl SourceConfig {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceConfig::Network(_) => SourceKind::Network,
            SourceConfig::FilePath(_) => SourceKind::FilePath,
            SourceConfig::Qrng(_) => SourceKind::Qrng,
        }
    }
}

/// Validated entropy source together with its connector.
///
/// The connector is released when the descriptor is dropped. Equality compares
/// the validated settings only.
#[derive(Debug, Serialize)]
pub struct SourceDescriptor {
    name: String,
    buffer: BufferLimits,
    #[serde(flatten)]
    config: SourceConfig,
    #[serde(skip)]
    connector: Box<dyn EntropySource>,
}

impl SourceDescriptor {
    /// Name of the subtree this source was built from (`seed` or `stream`)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SourceKind {
        self.config.kind()
    }

    pub fn buffer(&self) -> BufferLimits {
        self.buffer
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    pub fn connector(&self) -> &dyn EntropySource {
        self.connector.as_ref()
    }

    pub fn connector_mut(&mut self) -> &mut dyn EntropySource {
        self.connector.as_mut()
    }
}

impl PartialEq for SourceDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.buffer == other.buffer && self.config == other.config
    }
}

impl Drop for SourceDescriptor {
    fn drop(&mut self) {
        debug!("Releasing {} entropy source ({})", self.name, self.kind());
    }
}

/// Build the entropy source described by `setting`
pub fn build_source<F: SourceFactory + ?Sized>(
    setting: &Setting<'_>,
    factory: &F,
) -> Result<SourceDescriptor> {
    let name = setting.name();

    let type_str = setting.require_str("type")?;
    let kind = SourceKind::resolve(&type_str).ok_or_else(|| {
        Error::invalid(
            setting.key_path("type"),
            format!("invalid {} source type '{}'", name, type_str),
        )
    })?;

    let buffer_size = setting.require_int("buffer_size")?;
    let buffer_threshold = setting.require_int("buffer_threshold")?;
    let buffer = BufferLimits::validate(
        (&setting.key_path("buffer_size"), buffer_size),
        (&setting.key_path("buffer_threshold"), buffer_threshold),
        1,
        i64::MAX,
    )?;

    let (config, connector) = match kind {
        SourceKind::Network => build_network(setting, buffer, factory)?,
        SourceKind::FilePath => {
            let config = FileConfig {
                path: setting.require_str("path")?.into(),
            };
            let connector = factory.file(&config, buffer)?;
            (SourceConfig::FilePath(config), connector)
        }
        SourceKind::Qrng => {
            let config = QrngConfig {
                instance_name: setting
                    .lookup_str("instance_name")?
                    .unwrap_or_else(|| DEFAULT_QRNG_INSTANCE.to_string()),
            };
            let connector = factory.qrng(&config, buffer)?;
            (SourceConfig::Qrng(config), connector)
        }
    };

    debug!(
        "Built {} source: type {}, buffer {}/{}",
        name, kind, buffer.size, buffer.threshold
    );

    Ok(SourceDescriptor {
        name: name.to_string(),
        buffer,
        config,
        connector,
    })
}

fn build_network<F: SourceFactory + ?Sized>(
    setting: &Setting<'_>,
    buffer: BufferLimits,
    factory: &F,
) -> Result<(SourceConfig, Box<dyn EntropySource>)> {
    let client_id = setting.require_str("client_id")?;

    // Either of address/hostname stands in for the other
    let (address, hostname) = match (setting.lookup_str("address")?, setting.lookup_str("hostname")?) {
        (Some(address), Some(hostname)) => (address, hostname),
        (Some(address), None) => (address.clone(), address),
        (None, Some(hostname)) => (hostname.clone(), hostname),
        (None, None) => return Err(Error::MissingField(setting.key_path("address"))),
    };

    let port = setting.require_int("port")?;
    let port = u16::try_from(port)
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| Error::out_of_range(setting.key_path("port"), port, "must be between 1 and 65535"))?;

    let uri = setting.require_str("URI")?;
    if !is_relative_reference(&uri) {
        return Err(Error::invalid(
            setting.key_path("URI"),
            format!("URI '{}' must be a path relative to the configured host", uri),
        ));
    }
    let hmac_text = setting.lookup_str("hmac_key")?;
    let max_reconnects = setting
        .lookup_int("max_reconnects")?
        .unwrap_or(DEFAULT_MAX_RECONNECTS);

    let mut config = NetworkConfig {
        client_id,
        address,
        hostname,
        port,
        uri,
        hmac_key: None,
        max_reconnects,
    };

    // `connector` is dropped on every error return below
    let mut connector = factory.network(&config, buffer)?;

    if let Some(text) = hmac_text {
        let key = crypto::decode_base64(&text).map_err(|e| {
            Error::invalid(
                setting.key_path("hmac_key"),
                format!("Error base64 decoding static HMAC key: {}", e),
            )
        })?;
        connector.set_static_hmac_key(&key)?;
        config.hmac_key = Some(key);
    }

    Ok((SourceConfig::Network(config), connector))
}

/// A URI that cannot replace the scheme, host or port of the endpoint
fn is_relative_reference(uri: &str) -> bool {
    let authority = uri
        .chars()
        .take(2)
        .filter(|c| *c == '/' || *c == '\\')
        .count()
        == 2;
    !authority && Url::parse(uri).is_err()
}
