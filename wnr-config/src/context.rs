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

//! Runtime context populated by a configuration load

use crate::buffer::BufferLimits;
use crate::drbg::DrbgParams;
use crate::loader;
use crate::source::SourceDescriptor;
use crate::Result;
use serde::Serialize;
use std::io::Read;
use std::ops::{BitOr, BitOrAssign};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which entropy sources feed the generator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GenerateMode(u8);

impl GenerateMode {
    pub const SEED: Self = Self(0b01);
    pub const STREAM: Self = Self(0b10);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for GenerateMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for GenerateMode {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Operational parameters of the entropy client.
///
/// A context is only meaningful after a successful load. When a load fails the
/// context is left partially written and must be discarded.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct WnrContext {
    pub working_dir: PathBuf,
    pub socket_dir: PathBuf,
    pub drbg: DrbgParams,
    /// Client entropy buffer
    pub buffer: BufferLimits,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
    pub seed_source: Option<SourceDescriptor>,
    pub stream_source: Option<SourceDescriptor>,
}

impl WnrContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a fresh context from a configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut ctx = Self::new();
        loader::load_from_path(&mut ctx, path)?;
        Ok(ctx)
    }

    /// Load a fresh context from a readable stream
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut ctx = Self::new();
        loader::load_from_reader(&mut ctx, reader)?;
        Ok(ctx)
    }

    /// Load a fresh context from configuration text
    pub fn from_text(text: &str) -> Result<Self> {
        let mut ctx = Self::new();
        loader::load_from_str(&mut ctx, text)?;
        Ok(ctx)
    }

    /// Derived from the configured sources
    pub fn generate_mode(&self) -> GenerateMode {
        let mut mode = GenerateMode::empty();
        if self.seed_source.is_some() {
            mode |= GenerateMode::SEED;
        }
        if self.stream_source.is_some() {
            mode |= GenerateMode::STREAM;
        }
        mode
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Configured sources, seed first
    pub fn sources(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.seed_source.iter().chain(self.stream_source.iter())
    }
}
