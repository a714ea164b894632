//! Logging helper
//!
//! Used by all other crates, and their tests, to implement consistent logging

// Imports
use {
	anyhow::Context,
	std::env,
	tracing::level_filters::LevelFilter,
	tracing_subscriber::{EnvFilter, prelude::*, util::TryInitError},
};

/// Initializes logging.
///
/// Logs are filtered by `RUST_LOG`, defaulting to `info`, and colored
/// unless `RUST_LOG_COLOR` is set to something other than `1`, `yes` or `true`.
pub fn init() {
	if let Err(err) = self::try_init() {
		eprintln!("Unable to initialize logging: {err:?}");
	}
}

/// Initializes logging, returning an error if a logger was already installed
pub fn try_init() -> anyhow::Result<()> {
	let log_use_color = env::var("RUST_LOG_COLOR").map_or(true, |value| {
		matches!(value.trim().to_uppercase().as_str(), "1" | "YES" | "TRUE")
	});

	let layer = tracing_subscriber::fmt::layer()
		.with_ansi(log_use_color)
		.with_filter(self::env_filter());

	tracing_subscriber::registry()
		.with(layer)
		.try_init()
		.context("Unable to set global logger")
}

/// Initializes logging for tests.
///
/// Output is captured by the test harness. Calling this more than once is fine.
pub fn init_test() {
	let layer = tracing_subscriber::fmt::layer()
		.with_test_writer()
		.with_filter(self::env_filter());

	// Note: Every test calls this, so only the first one installs the logger
	let _: Result<(), TryInitError> = tracing_subscriber::registry().with(layer).try_init();
}

/// Creates the environment filter
fn env_filter() -> EnvFilter {
	EnvFilter::builder()
		.with_default_directive(LevelFilter::INFO.into())
		.from_env_lossy()
}
