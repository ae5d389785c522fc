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

//! Configuration load entry points
//!
//! Every entry point reads text, parses it into a [`Document`], validates it into
//! the caller's [`WnrContext`] and releases the document and any file handle on
//! every exit path. Failures are logged with their full diagnostic and returned.

use crate::config::parse_context;
use crate::connector::{DefaultFactory, SourceFactory};
use crate::context::WnrContext;
use crate::document::Document;
use crate::Result;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{error, info, instrument};

/// Loads configuration documents, building sources with `F`
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader<F = DefaultFactory> {
    factory: F,
}

impl ConfigLoader<DefaultFactory> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: SourceFactory> ConfigLoader<F> {
    pub fn with_factory(factory: F) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Load from a configuration file
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load_path<P: AsRef<Path>>(&self, ctx: &mut WnrContext, path: P) -> Result<()> {
        let path = path.as_ref();

        let text = {
            let mut file = File::open(path).map_err(|e| {
                error!("Error opening \"{}\": {}", path.display(), e);
                e
            })?;
            read_text(&mut file)
        };

        text.and_then(|text| self.load_text(ctx, &text)).map_err(|e| {
            error!("Error loading configuration file \"{}\": {}", path.display(), e);
            e
        })
    }

    /// Load from an open readable stream
    #[instrument(skip_all)]
    pub fn load_reader<R: Read>(&self, ctx: &mut WnrContext, mut reader: R) -> Result<()> {
        read_text(&mut reader)
            .and_then(|text| self.load_text(ctx, &text))
            .map_err(|e| {
                error!("Error loading configuration stream: {}", e);
                e
            })
    }

    /// Load from configuration text
    #[instrument(skip_all)]
    pub fn load_str(&self, ctx: &mut WnrContext, text: &str) -> Result<()> {
        self.load_text(ctx, text).map_err(|e| {
            error!("Error loading configuration text: {}", e);
            e
        })
    }

    fn load_text(&self, ctx: &mut WnrContext, text: &str) -> Result<()> {
        let document = Document::parse(text)?;
        parse_context(ctx, &document, &self.factory)?;

        info!(
            "Configuration loaded: generate mode {:#04b}, {} source(s), buffer {}/{} bytes, poll interval {} ms",
            ctx.generate_mode().bits(),
            ctx.sources().count(),
            ctx.buffer.size,
            ctx.buffer.threshold,
            ctx.poll_interval_ms
        );
        Ok(())
    }
}

fn read_text<R: Read>(reader: &mut R) -> Result<String> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text)
}

/// Load a configuration file into `ctx`
pub fn load_from_path(ctx: &mut WnrContext, path: impl AsRef<Path>) -> Result<()> {
    ConfigLoader::new().load_path(ctx, path)
}

/// Load configuration from an open readable stream into `ctx`
pub fn load_from_reader<R: Read>(ctx: &mut WnrContext, reader: R) -> Result<()> {
    ConfigLoader::new().load_reader(ctx, reader)
}

/// Load configuration text into `ctx`
pub fn load_from_str(ctx: &mut WnrContext, text: &str) -> Result<()> {
    ConfigLoader::new().load_str(ctx, text)
}
