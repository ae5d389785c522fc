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

//! Static HMAC key material for network entropy sources

use crate::{Error, Result};
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Binary HMAC key, wiped from memory on drop
#[derive(Clone, PartialEq, Eq)]
pub struct HmacKey(Zeroizing<Vec<u8>>);

impl HmacKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HmacKey(<{} bytes redacted>)", self.len())
    }
}

/// Decode base64 key text (standard alphabet, padded)
pub fn decode_base64(s: &str) -> std::result::Result<HmacKey, base64::DecodeError> {
    base64::engine::general_purpose::STANDARD
        .decode(s)
        .map(HmacKey::new)
}

/// HMAC-SHA256 verifier for entropy responses signed with a static key
#[derive(Clone)]
pub struct PacketVerifier {
    mac: HmacSha256,
    key_len: usize,
}

impl PacketVerifier {
    pub fn new(key: &HmacKey) -> Result<Self> {
        let mac = <HmacSha256 as Mac>::new_from_slice(key.as_bytes())
            .map_err(|e| Error::Construction(format!("Invalid HMAC key length: {}", e)))?;
        Ok(Self {
            mac,
            key_len: key.len(),
        })
    }

    /// Compute the HMAC-SHA256 tag of `data`
    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }

    /// Verify a tag using constant-time comparison
    pub fn verify(&self, data: &[u8], tag: &[u8]) -> bool {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.verify_slice(tag).is_ok()
    }
}

impl fmt::Debug for PacketVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketVerifier")
            .field("key_len", &self.key_len)
            .finish_non_exhaustive()
    }
}
