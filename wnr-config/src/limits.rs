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

//! Configuration limits
//!
//! Bounds and defaults applied while validating a configuration document.

/// Largest entropy buffer the client will allocate (64 KiB)
pub const MAXIMUM_ENTROPY_REQUEST: usize = 65_536;

/// Smallest accepted top-level entropy buffer
pub const MINIMUM_BUFFER_SIZE: usize = 1024;

/// Default refill threshold of the top-level buffer
pub const DEFAULT_ENTROPY_THRESHOLD: usize = 512;

/// Polling interval lower bound in milliseconds
pub const MINIMUM_POLLING_INTERVAL: u64 = 5;

/// Polling interval upper bound in milliseconds (1 hour)
pub const MAXIMUM_POLLING_INTERVAL: u64 = 60 * 60 * 1000;

/// DRBG security strength in bits when none is configured
pub const DEFAULT_SECURITY_STRENGTH: u64 = 256;

/// Reconnect attempts of a network source when none is configured
pub const DEFAULT_MAX_RECONNECTS: i64 = 5;

/// Instance name of a QRNG source when none is configured
pub const DEFAULT_QRNG_INSTANCE: &str = "QRNG_DEFAULT";

const _: () = assert!(DEFAULT_ENTROPY_THRESHOLD < MINIMUM_BUFFER_SIZE);
const _: () = assert!(MINIMUM_BUFFER_SIZE <= MAXIMUM_ENTROPY_REQUEST);
const _: () = assert!(MINIMUM_POLLING_INTERVAL <= MAXIMUM_POLLING_INTERVAL);
