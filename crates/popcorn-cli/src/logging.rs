use anyhow::Result;
use std::io;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Set to "true" or "false" to force structured output either way
const LOG_JSON_ENV: &str = "POPCORN_LOG_JSON";

pub fn init_logging(
    verbose_level: u8,
    quiet: bool,
    default_level: Option<&str>,
    log_file: Option<PathBuf>,
) -> Result<()> {
    let filter = build_filter(verbose_level, quiet, default_level);

    let json = std::env::var(LOG_JSON_ENV)
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal());

    let registry = Registry::default().with(filter);

    if let Some(log_path) = log_file {
        let (log_dir, log_filename) = rotation_target(&log_path)?;
        std::fs::create_dir_all(&log_dir)?;
        let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, log_filename);

        if json {
            let json_layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(file_appender);
            registry.with(json_layer).try_init()?;
        } else {
            let fmt_layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false)
                .with_writer(file_appender);
            registry.with(fmt_layer).try_init()?;
        }
    } else if json {
        let json_layer = fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);
        registry.with(json_layer).try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);
        registry.with(fmt_layer).try_init()?;
    }

    Ok(())
}

/// Directory and file name for the daily appender. The whole file name is
/// the prefix, so `popcorn.log` rotates into `popcorn.log.2026-01-17`.
fn rotation_target(log_path: &Path) -> Result<(PathBuf, String)> {
    let log_dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let log_filename = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log filename: {}", log_path.display()))?;
    Ok((log_dir, log_filename.to_string()))
}

/// 0 = configured level (warn if unset), 1 = debug without hyper noise, 2+ = trace.
/// `RUST_LOG` wins over everything except `--quiet`.
fn build_filter(verbose_level: u8, quiet: bool, default_level: Option<&str>) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }

    let filter_str = match verbose_level {
        0 => default_level.unwrap_or("warn"),
        1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn",
        _ => "trace",
    };

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str))
}
