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

//! Configuration validation for the entropy client
//!
//! Validates a parsed document and writes the result into a [`WnrContext`].
//! Validation is fail-fast: the first violation aborts the load. Two values are
//! softened instead of rejected: a non-positive reseed interval becomes 1, and a
//! network source's address/hostname fill in for each other.

use crate::buffer::BufferLimits;
use crate::connector::SourceFactory;
use crate::context::WnrContext;
use crate::document::Document;
use crate::limits::{
    DEFAULT_ENTROPY_THRESHOLD, DEFAULT_SECURITY_STRENGTH, MAXIMUM_ENTROPY_REQUEST,
    MAXIMUM_POLLING_INTERVAL, MINIMUM_BUFFER_SIZE, MINIMUM_POLLING_INTERVAL,
};
use crate::source::build_source;
use crate::{Error, Result};
use std::path::PathBuf;
use tracing::{debug, warn};

pub const WORKING_DIR: &str = "WnrClient.dir.working";
pub const SOCKET_DIR: &str = "WnrClient.dir.socket";
pub const DRBG_TYPE: &str = "WnrClient.drbg.type";
pub const RESEED_INTERVAL: &str = "WnrClient.drbg.reseed_interval";
pub const SECURITY_STRENGTH: &str = "WnrClient.drbg.security_strength";
pub const BUFFER_SIZE: &str = "WnrClient.buffer.size";
pub const BUFFER_THRESHOLD: &str = "WnrClient.buffer.threshold";
pub const POLL_INTERVAL: &str = "WnrClient.polling.interval";
pub const SOURCES: &str = "WnrClient.source";
pub const SEED_SOURCE: &str = "WnrClient.source.seed";
pub const STREAM_SOURCE: &str = "WnrClient.source.stream";

/// Populate `ctx` from `document`, building sources through `factory`
pub fn parse_context<F: SourceFactory + ?Sized>(
    ctx: &mut WnrContext,
    document: &Document,
    factory: &F,
) -> Result<()> {
    ctx.working_dir = required_dir(document, WORKING_DIR)?;
    ctx.socket_dir = required_dir(document, SOCKET_DIR)?;

    let drbg_type = document.require_str(DRBG_TYPE)?;
    ctx.drbg.drbg_type = drbg_type
        .parse()
        .map_err(|reason: String| Error::invalid(DRBG_TYPE, reason))?;

    let reseed_interval = document.require_int(RESEED_INTERVAL)?;
    ctx.drbg.reseed_interval = if reseed_interval <= 0 {
        warn!("DRBG reseed interval was less than 1. Set reseed interval to 1.");
        1
    } else {
        reseed_interval as u64
    };

    ctx.drbg.security_strength = match document.lookup_int(SECURITY_STRENGTH)? {
        Some(strength) if strength < 0 => {
            return Err(Error::out_of_range(
                SECURITY_STRENGTH,
                strength,
                "must be greater than or equal to 0",
            ))
        }
        Some(strength) => strength as u64,
        None => DEFAULT_SECURITY_STRENGTH,
    };

    debug!(
        "DRBG: type {}, reseed interval {}, security strength {}",
        ctx.drbg.drbg_type, ctx.drbg.reseed_interval, ctx.drbg.security_strength
    );

    let buffer_size = document
        .lookup_int(BUFFER_SIZE)?
        .unwrap_or(MAXIMUM_ENTROPY_REQUEST as i64);
    let buffer_threshold = document
        .lookup_int(BUFFER_THRESHOLD)?
        .unwrap_or(DEFAULT_ENTROPY_THRESHOLD as i64);
    ctx.buffer = BufferLimits::validate(
        (BUFFER_SIZE, buffer_size),
        (BUFFER_THRESHOLD, buffer_threshold),
        MINIMUM_BUFFER_SIZE as i64,
        MAXIMUM_ENTROPY_REQUEST as i64,
    )?;

    ctx.poll_interval_ms = match document.lookup_int(POLL_INTERVAL)? {
        Some(interval)
            if interval < MINIMUM_POLLING_INTERVAL as i64
                || interval > MAXIMUM_POLLING_INTERVAL as i64 =>
        {
            return Err(Error::out_of_range(
                POLL_INTERVAL,
                interval,
                format!(
                    "must be between {} and {} ms",
                    MINIMUM_POLLING_INTERVAL, MAXIMUM_POLLING_INTERVAL
                ),
            ))
        }
        Some(interval) => interval as u64,
        None => MINIMUM_POLLING_INTERVAL,
    };

    debug!(
        "Buffer {}/{} bytes, polling every {} ms",
        ctx.buffer.size, ctx.buffer.threshold, ctx.poll_interval_ms
    );

    let seed = document.setting(SEED_SOURCE)?;
    let stream = document.setting(STREAM_SOURCE)?;
    if seed.is_none() && stream.is_none() {
        return Err(Error::MissingField(SOURCES.to_string()));
    }

    // A built seed source is released if the stream source fails
    let seed_source = seed.map(|s| build_source(&s, factory)).transpose()?;
    let stream_source = stream.map(|s| build_source(&s, factory)).transpose()?;
    ctx.seed_source = seed_source;
    ctx.stream_source = stream_source;

    Ok(())
}

fn required_dir(document: &Document, path: &str) -> Result<PathBuf> {
    let dir = document.require_str(path)?;
    if dir.is_empty() {
        return Err(Error::invalid(path, "directory must not be empty"));
    }
    Ok(PathBuf::from(dir))
}
