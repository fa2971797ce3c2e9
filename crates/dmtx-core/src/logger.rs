//! Minimal stderr logger for the `log` facade.
//!
//! Records from the `dmtx*` crates are printed at the requested level as
//! `[elapsed LEVEL module] message`; records from other crates only from
//! `Warn` up. With the `tracing` feature, [`init_tracing`] and
//! [`init_tracing_with_level`] install a `tracing-subscriber` formatter
//! instead.

use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

/// Level cap for records outside the toolkit.
const FOREIGN_LEVEL: LevelFilter = LevelFilter::Warn;

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

fn is_own_target(target: &str) -> bool {
    target == "dmtx" || target.starts_with("dmtx_") || target.starts_with("dmtx::")
}

fn max_level_for(target: &str, level: LevelFilter) -> LevelFilter {
    if is_own_target(target) {
        level
    } else {
        level.min(FOREIGN_LEVEL)
    }
}

fn format_line(elapsed_s: f64, level: Level, target: &str, args: fmt::Arguments<'_>) -> String {
    let module = target.rsplit("::").next().unwrap_or(target);
    format!("[{elapsed_s:7.3}s {level:>5} {module}] {args}")
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= max_level_for(metadata.target(), self.level)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            *record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger; `level` applies to the `dmtx*` crates.
///
/// Only the first call installs a logger; later calls keep the first level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level.max(FOREIGN_LEVEL));
    }
    Ok(())
}

/// `EnvFilter` directives used when `RUST_LOG` is unset.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
fn default_directives(level: LevelFilter) -> String {
    let level = level.as_str().to_ascii_lowercase();
    ["dmtx", "dmtx_core", "dmtx_codec", "dmtx_engine"]
        .iter()
        .fold(String::from("warn"), |acc, krate| format!("{acc},{krate}={level}"))
}

/// Install a `tracing` fmt subscriber on stderr, filtered by `RUST_LOG`
/// (default: `info` for the toolkit, `warn` elsewhere).
///
/// `json = true` emits one flattened JSON object per event. Span close
/// events carry busy/idle timings in both modes.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    init_tracing_with_level(json, LevelFilter::Info);
}

/// Like [`init_tracing`], with `level` for the toolkit crates when
/// `RUST_LOG` is unset.
#[cfg(feature = "tracing")]
pub fn init_tracing_with_level(json: bool, level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(tracing_subscriber::fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}
