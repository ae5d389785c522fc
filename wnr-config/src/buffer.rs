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

//! Entropy buffer sizing
//!
//! The client buffer and every source buffer share one invariant:
//! `0 < threshold < size`.

use crate::{Error, Result};
use serde::Serialize;

/// Size and refill threshold of an entropy buffer, in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BufferLimits {
    pub size: usize,
    pub threshold: usize,
}

impl BufferLimits {
    pub fn new(size: usize, threshold: usize) -> Self {
        Self { size, threshold }
    }

    /// Validate a raw size/threshold pair.
    ///
    /// `size` and `threshold` are `(dotted path, value)` pairs; the paths only
    /// feed the error message. The size must lie in `[min_size, max_size]`.
    pub(crate) fn validate(
        size: (&str, i64),
        threshold: (&str, i64),
        min_size: i64,
        max_size: i64,
    ) -> Result<Self> {
        let (size_path, size) = size;
        let (threshold_path, threshold) = threshold;

        if size < min_size || size > max_size {
            let expected = if max_size == i64::MAX {
                format!("must be at least {}", min_size)
            } else {
                format!("must be between {} and {}", min_size, max_size)
            };
            return Err(Error::out_of_range(size_path, size, expected));
        }

        if threshold <= 0 || threshold >= size {
            return Err(Error::out_of_range(
                threshold_path,
                threshold,
                format!("must be greater than 0 and less than buffer size {}", size),
            ));
        }

        let size = usize::try_from(size)
            .map_err(|_| Error::out_of_range(size_path, size, "does not fit in memory"))?;
        let threshold = usize::try_from(threshold)
            .map_err(|_| Error::out_of_range(threshold_path, threshold, "does not fit in memory"))?;

        Ok(Self { size, threshold })
    }
}
