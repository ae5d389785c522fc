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

//! WNR Client Configuration Library
//!
//! This crate turns a hand-edited configuration document into the runtime context of an
//! entropy client: which entropy sources to poll, how the deterministic random bit generator
//! (DRBG) is seeded and reseeded, and the buffering/polling parameters of the client.
//!
//! # Architecture
//!
//! Control flows strictly downward:
//!
//! ```text
//! loader (path / reader / text)
//!    └── document   (parse, dotted-path lookup)
//!         └── config    (context assembler)
//!              └── source   (per-source descriptor builder)
//!                   └── connector (external constructors)
//! ```
//!
//! - `limits`: immutable configuration limits
//! - `document`: configuration document handle
//! - `config`: validation of the top-level document
//! - `source`: validation of a single entropy source subtree
//! - `connector`: seam to the entropy-source connectors
//! - `context`: the populated runtime context
//! - `loader`: public load entry points
//! - `error`: unified error types
//!
//! No I/O is performed against entropy sources; descriptors only carry what the
//! connectors and the DRBG need to start.

pub mod buffer;
pub mod config;
pub mod connector;
pub mod context;
pub mod crypto;
pub mod document;
pub mod drbg;
pub mod error;
pub mod limits;
pub mod loader;
pub mod source;

pub use buffer::BufferLimits;
pub use connector::{DefaultFactory, EntropySource, SourceFactory};
pub use context::{GenerateMode, WnrContext};
pub use drbg::{DrbgParams, DrbgType};
pub use error::{Error, Result};
pub use loader::{load_from_path, load_from_reader, load_from_str, ConfigLoader};
pub use source::{SourceConfig, SourceDescriptor, SourceKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
