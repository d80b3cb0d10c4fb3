use std::fs::OpenOptions;
use std::path::Path;

use anyhow::Context;
use simplelog::{Config, LevelFilter, WriteLogger};

/// Appends log records to `path`. Without a path nothing is logged; standard
/// error is reserved for diagnostics.
pub fn init(path: Option<&Path>, level: LevelFilter) -> anyhow::Result<()> {
	let Some(path) = path else {
		return Ok(());
	};
	let file = OpenOptions::new()
		.create(true)
		.append(true)
		.open(path)
		.with_context(|| format!("cannot open log file {}", path.display()))?;
	WriteLogger::init(level, Config::default(), file).context("logger already initialized")?;
	Ok(())
}
