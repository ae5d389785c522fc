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

//! End-to-end loading through the public entry points

use proptest::prelude::*;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wnr_config::buffer::BufferLimits;
use wnr_config::crypto::HmacKey;
use wnr_config::limits::{
    DEFAULT_ENTROPY_THRESHOLD, MAXIMUM_ENTROPY_REQUEST, MAXIMUM_POLLING_INTERVAL,
    MINIMUM_POLLING_INTERVAL,
};
use wnr_config::source::{FileConfig, NetworkConfig, QrngConfig, SourceConfig};
use wnr_config::{
    ConfigLoader, EntropySource, Error, GenerateMode, SourceFactory, SourceKind, WnrContext,
};

/// Counts connectors alive and keys attached
#[derive(Debug, Default)]
struct Tracker {
    created: AtomicUsize,
    live: AtomicUsize,
    keys: AtomicUsize,
}

#[derive(Debug, Clone, Default)]
struct TrackingFactory {
    tracker: Arc<Tracker>,
}

impl TrackingFactory {
    fn live(&self) -> usize {
        self.tracker.live.load(Ordering::SeqCst)
    }

    fn created(&self) -> usize {
        self.tracker.created.load(Ordering::SeqCst)
    }

    fn keys(&self) -> usize {
        self.tracker.keys.load(Ordering::SeqCst)
    }

    fn connector(&self, kind: SourceKind, buffer: BufferLimits) -> Box<dyn EntropySource> {
        self.tracker.created.fetch_add(1, Ordering::SeqCst);
        self.tracker.live.fetch_add(1, Ordering::SeqCst);
        Box::new(TrackedSource {
            kind,
            buffer,
            tracker: Arc::clone(&self.tracker),
        })
    }
}

impl SourceFactory for TrackingFactory {
    fn network(&self, _: &NetworkConfig, buffer: BufferLimits) -> wnr_config::Result<Box<dyn EntropySource>> {
        Ok(self.connector(SourceKind::Network, buffer))
    }

    fn file(&self, _: &FileConfig, buffer: BufferLimits) -> wnr_config::Result<Box<dyn EntropySource>> {
        Ok(self.connector(SourceKind::FilePath, buffer))
    }

    fn qrng(&self, _: &QrngConfig, buffer: BufferLimits) -> wnr_config::Result<Box<dyn EntropySource>> {
        Ok(self.connector(SourceKind::Qrng, buffer))
    }
}

#[derive(Debug)]
struct TrackedSource {
    kind: SourceKind,
    buffer: BufferLimits,
    tracker: Arc<Tracker>,
}

impl EntropySource for TrackedSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn buffer(&self) -> BufferLimits {
        self.buffer
    }

    fn set_static_hmac_key(&mut self, _key: &HmacKey) -> wnr_config::Result<()> {
        self.tracker.keys.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for TrackedSource {
    fn drop(&mut self) {
        self.tracker.live.fetch_sub(1, Ordering::SeqCst);
    }
}

const HEADER: &str = "
WnrClient:
  dir:
    working: /var/lib/wnr
    socket: /var/run/wnr
  drbg:
    type: sha256
    reseed_interval: 500
";

fn seed_network(hmac_key: &str) -> String {
    format!(
        "
  source:
    seed:
      type: network
      buffer_size: 4096
      buffer_threshold: 1024
      client_id: client-1
      hostname: entropy.example.com
      port: 443
      URI: /api/entropy
      hmac_key: \"{}\"
",
        hmac_key
    )
}

const STREAM_FILE: &str = "
    stream:
      type: filepath
      path: /dev/hwrng
      buffer_size: 2048
      buffer_threshold: 256
";

fn load_with(factory: &TrackingFactory, text: &str) -> wnr_config::Result<WnrContext> {
    let loader = ConfigLoader::with_factory(factory);
    let mut ctx = WnrContext::new();
    loader.load_str(&mut ctx, text)?;
    Ok(ctx)
}

#[test]
fn minimal_document_gets_defaults() {
    let text = format!("{}{}", HEADER, seed_network("c2VjcmV0"));
    let ctx = WnrContext::from_text(&text).unwrap();

    assert_eq!(ctx.buffer.size, MAXIMUM_ENTROPY_REQUEST);
    assert_eq!(ctx.buffer.threshold, DEFAULT_ENTROPY_THRESHOLD);
    assert_eq!(ctx.poll_interval_ms, MINIMUM_POLLING_INTERVAL);
    assert_eq!(ctx.drbg.security_strength, 256);
    assert_eq!(ctx.drbg.reseed_interval, 500);
    assert_eq!(ctx.generate_mode(), GenerateMode::SEED);
}

#[test]
fn sources_are_attached_and_released() {
    let factory = TrackingFactory::default();
    let text = format!("{}{}{}", HEADER, seed_network("c2VjcmV0"), STREAM_FILE);

    let ctx = load_with(&factory, &text).unwrap();
    assert_eq!(ctx.generate_mode(), GenerateMode::SEED | GenerateMode::STREAM);
    assert_eq!(factory.live(), 2);
    assert_eq!(factory.keys(), 1);

    let seed = ctx.seed_source.as_ref().unwrap();
    assert_eq!(seed.connector().kind(), SourceKind::Network);
    assert_eq!(seed.connector().buffer(), BufferLimits::new(4096, 1024));
    match seed.config() {
        SourceConfig::Network(config) => {
            assert_eq!(config.address, "entropy.example.com");
            assert_eq!(config.hmac_key.as_ref().unwrap().as_bytes(), b"secret");
        }
        other => panic!("expected network source, got {:?}", other),
    }

    drop(ctx);
    assert_eq!(factory.live(), 0);
}

#[test]
fn invalid_hmac_key_leaks_nothing() {
    let factory = TrackingFactory::default();
    let text = format!("{}{}", HEADER, seed_network("*** not base64 ***"));

    for round in 1..=5 {
        let err = load_with(&factory, &text).unwrap_err();
        assert!(matches!(&err, Error::InvalidValue { path, .. } if path.ends_with("hmac_key")));
        assert_eq!(factory.created(), round);
        assert_eq!(factory.live(), 0);
    }
    assert_eq!(factory.keys(), 0);
}

#[test]
fn failing_stream_releases_seed() {
    let factory = TrackingFactory::default();
    let stream = STREAM_FILE.replace("buffer_threshold: 256", "buffer_threshold: 2048");
    let text = format!("{}{}{}", HEADER, seed_network("c2VjcmV0"), stream);

    let mut ctx = WnrContext::new();
    let err = ConfigLoader::with_factory(&factory)
        .load_str(&mut ctx, &text)
        .unwrap_err();
    assert!(matches!(&err, Error::OutOfRange { path, .. } if path == "WnrClient.source.stream.buffer_threshold"));
    assert_eq!(factory.created(), 1);
    assert_eq!(factory.live(), 0);
}

#[test]
fn missing_sources_fail() {
    let err = WnrContext::from_text(HEADER).unwrap_err();
    assert!(matches!(err, Error::MissingField(_)));
}

#[test]
fn file_and_text_loads_agree() {
    let text = format!("{}{}{}", HEADER, seed_network("c2VjcmV0"), STREAM_FILE);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();

    let from_path = WnrContext::from_path(file.path()).unwrap();
    let from_text = WnrContext::from_text(&text).unwrap();
    let from_reader = WnrContext::from_reader(text.as_bytes()).unwrap();

    assert_eq!(from_path, from_text);
    assert_eq!(from_reader, from_text);
}

fn with_polling(ms: i64) -> String {
    format!(
        "{}  polling:\n    interval: {}\n{}",
        HEADER,
        ms,
        seed_network("c2VjcmV0")
    )
}

fn with_buffer(size: i64, threshold: i64) -> String {
    format!(
        "{}  buffer:\n    size: {}\n    threshold: {}\n{}",
        HEADER,
        size,
        threshold,
        seed_network("c2VjcmV0")
    )
}

#[test]
fn polling_interval_bounds_are_inclusive() {
    let min = MINIMUM_POLLING_INTERVAL as i64;
    let max = MAXIMUM_POLLING_INTERVAL as i64;
    assert!(WnrContext::from_text(&with_polling(min)).is_ok());
    assert!(WnrContext::from_text(&with_polling(max)).is_ok());
    assert!(WnrContext::from_text(&with_polling(min - 1)).is_err());
    assert!(WnrContext::from_text(&with_polling(max + 1)).is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn proptest_polling_interval(ms in -10i64..(MAXIMUM_POLLING_INTERVAL as i64 + 10_000)) {
        let result = WnrContext::from_text(&with_polling(ms));
        let in_range = (MINIMUM_POLLING_INTERVAL as i64..=MAXIMUM_POLLING_INTERVAL as i64).contains(&ms);
        prop_assert_eq!(result.is_ok(), in_range, "interval {}", ms);
        if let Ok(ctx) = result {
            prop_assert_eq!(ctx.poll_interval_ms, ms as u64);
        }
    }

    #[test]
    fn proptest_client_buffer_threshold(size in 1024i64..=(MAXIMUM_ENTROPY_REQUEST as i64), offset in -2i64..=2) {
        let threshold = size - 1 + offset;
        let result = WnrContext::from_text(&with_buffer(size, threshold));
        prop_assert_eq!(result.is_ok(), threshold > 0 && threshold < size);
    }

    #[test]
    fn proptest_reseed_interval_never_rejected(interval in i64::MIN / 2..1000i64) {
        let text = format!("{}{}", HEADER, seed_network("c2VjcmV0"))
            .replace("reseed_interval: 500", &format!("reseed_interval: {}", interval));
        let ctx = WnrContext::from_text(&text).unwrap();
        let expected = if interval <= 0 { 1 } else { interval as u64 };
        prop_assert_eq!(ctx.drbg.reseed_interval, expected);
    }
}
