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

//! WNR Check - configuration validator for the WNR entropy client
//!
//! Loads a client configuration file exactly as the client would, builds every
//! configured entropy source (without contacting it) and reports the resulting
//! runtime context. Exits with a non-zero status if the configuration is rejected.
//!
//! ```text
//! wnr-check /etc/wnr/client.yaml
//! wnr-check --json /etc/wnr/client.yaml
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use wnr_config::source::SourceConfig;
use wnr_config::{GenerateMode, WnrContext};

#[derive(Parser, Debug)]
#[command(name = "wnr-check")]
#[command(about = "WNR Check - Validates an entropy client configuration file", long_about = None)]
struct Args {
    /// Configuration file
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Print the loaded context as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = args
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr);
    if args.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!("WNR Check v{}", wnr_config::VERSION);

    let ctx = WnrContext::from_path(&args.config)
        .with_context(|| format!("Configuration {} rejected", args.config.display()))?;

    if args.json {
        let report = serde_json::to_string_pretty(&ctx).context("Failed to serialize context")?;
        println!("{}", report);
    } else {
        report(&ctx);
    }

    Ok(())
}

fn report(ctx: &WnrContext) {
    info!("Working directory: {}", ctx.working_dir.display());
    info!("Socket directory: {}", ctx.socket_dir.display());
    info!(
        "DRBG: {} (reseed interval {}, security strength {} bits)",
        ctx.drbg.drbg_type, ctx.drbg.reseed_interval, ctx.drbg.security_strength
    );
    info!(
        "Entropy buffer: {} bytes, threshold {} bytes",
        ctx.buffer.size, ctx.buffer.threshold
    );
    info!("Polling interval: {:?}", ctx.poll_interval());

    let mode = ctx.generate_mode();
    info!(
        "Generate mode: seed={} stream={}",
        mode.contains(GenerateMode::SEED),
        mode.contains(GenerateMode::STREAM)
    );

    for source in ctx.sources() {
        let buffer = source.buffer();
        match source.config() {
            SourceConfig::Network(net) => info!(
                "  {} source: network {} -> {}:{}{} (client {}, max reconnects {}, static key: {})",
                source.name(),
                net.hostname,
                net.address,
                net.port,
                net.uri,
                net.client_id,
                net.max_reconnects,
                if net.hmac_key.is_some() { "yes" } else { "no" }
            ),
            SourceConfig::FilePath(file) => info!(
                "  {} source: file {}",
                source.name(),
                file.path.display()
            ),
            SourceConfig::Qrng(qrng) => info!(
                "  {} source: qrng instance {}",
                source.name(),
                qrng.instance_name
            ),
        }
        info!("    buffer {} bytes, threshold {} bytes", buffer.size, buffer.threshold);
    }
}
