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

//! Deterministic random bit generator parameters

use crate::limits::DEFAULT_SECURITY_STRENGTH;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Supported DRBG algorithms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DrbgType {
    /// Hash_DRBG over SHA-256
    #[default]
    Sha256,
}

impl DrbgType {
    pub fn as_str(self) -> &'static str {
        match self {
            DrbgType::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for DrbgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DrbgType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("sha256") {
            Ok(DrbgType::Sha256)
        } else {
            Err(format!("unsupported DRBG type '{}' (expected 'sha256')", s))
        }
    }
}

/// How the DRBG is instantiated and reseeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrbgParams {
    pub drbg_type: DrbgType,
    /// Generate calls between reseeds, at least 1
    pub reseed_interval: u64,
    /// Target strength in bits
    pub security_strength: u64,
}

impl Default for DrbgParams {
    fn default() -> Self {
        Self {
            drbg_type: DrbgType::default(),
            reseed_interval: 1,
            security_strength: DEFAULT_SECURITY_STRENGTH,
        }
    }
}
