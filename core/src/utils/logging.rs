// core/src/utils/logging.rs
use anyhow::{Context, Result};
use log::LevelFilter;
use std::path::Path;

/// Parses a level name from the settings file. Unknown names fall back to Info.
pub fn level_from_name(name: &str) -> LevelFilter {
    match name.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Installs the global logger.
///
/// Records go to `log_file` (if any) at `file_level`; with `verbose` they are
/// also echoed to stderr at debug level. Without either, nothing is logged.
pub fn init(log_file: Option<&Path>, file_level: LevelFilter, verbose: bool) -> Result<()> {
    let mut dispatch = fern::Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "{} - {} - {} - {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            message
        ))
    });

    let mut max_level = LevelFilter::Off;
    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }
        let file = fern::log_file(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        dispatch = dispatch.chain(fern::Dispatch::new().level(file_level).chain(file));
        max_level = max_level.max(file_level);
    }
    if verbose {
        dispatch = dispatch.chain(fern::Dispatch::new().level(LevelFilter::Debug).chain(std::io::stderr()));
        max_level = max_level.max(LevelFilter::Debug);
    }

    dispatch
        .level(max_level)
        .apply()
        .context("Failed to initialize logger")?;
    Ok(())
}
