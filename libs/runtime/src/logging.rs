use crate::config::{LoggingConfig, Section};
use std::{
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::{level_filters::LevelFilter, Level};
use tracing_subscriber::{
    filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

// -------- level helpers --------

fn parse_tracing_level(s: &str) -> Option<Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

fn level_filter(s: &str) -> LevelFilter {
    parse_tracing_level(s)
        .map(LevelFilter::from_level)
        .unwrap_or(LevelFilter::OFF)
}

// -------- rotating writer for files --------

#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl<'a> fmt::MakeWriter<'a> for RotWriter {
    type Writer = RotWriterHandle;
    fn make_writer(&'a self) -> Self::Writer {
        RotWriterHandle(self.0.clone())
    }
}

#[derive(Clone)]
struct RotWriterHandle(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

// -------- path resolution helpers --------

/// Resolve a log file path against `base_dir` (home_dir).
/// Absolute paths are kept as-is; relative paths are joined with `base_dir`.
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Create a rotating writer, ensuring the parent directory exists.
fn create_rotating_writer(section: &Section, base_dir: &Path) -> Option<RotWriter> {
    if section.file.trim().is_empty() {
        return None;
    }
    let log_path = resolve_log_path(&section.file, base_dir);
    if let Some(parent) = log_path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            eprintln!("Failed to create log dir '{}'", parent.to_string_lossy());
            return None;
        }
    }
    let max_bytes = section.max_size_mb.unwrap_or(100) * 1024 * 1024;
    let rot = FileRotate::new(
        &log_path,
        AppendTimestamp::default(FileLimit::Age(chrono::Duration::days(1))),
        ContentLimit::BytesSurpassed(max_bytes as usize),
        Compression::None,
        #[cfg(unix)]
        None, // file permissions (Unix only)
    );
    Some(RotWriter(Arc::new(Mutex::new(rot))))
}

// -------- filter construction --------

fn console_targets(cfg: &LoggingConfig) -> Targets {
    let default_level = cfg
        .get("default")
        .map(|s| level_filter(&s.console_level))
        .unwrap_or(LevelFilter::INFO);

    let mut targets = Targets::new().with_default(default_level);
    for (subsystem, section) in cfg.iter().filter(|(k, _)| k.as_str() != "default") {
        targets = targets.with_target(subsystem.clone(), level_filter(&section.console_level));
    }
    targets
}

fn file_targets(cfg: &LoggingConfig) -> Targets {
    let default_level = cfg
        .get("default")
        .map(|s| file_level_filter(s))
        .unwrap_or(LevelFilter::DEBUG);

    let mut targets = Targets::new().with_default(default_level);
    for (subsystem, section) in cfg.iter().filter(|(k, _)| k.as_str() != "default") {
        if !section.file_level.trim().is_empty() {
            targets = targets.with_target(subsystem.clone(), level_filter(&section.file_level));
        }
    }
    targets
}

fn file_level_filter(section: &Section) -> LevelFilter {
    if section.file_level.trim().is_empty() {
        LevelFilter::DEBUG
    } else {
        level_filter(&section.file_level)
    }
}

// -------- public init --------

/// Initialize logging from a configuration.
/// - `cfg`: logging sections ("default" plus per-subsystem overrides)
/// - `base_dir`: base directory used to resolve relative log file paths
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let console = fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stdout().is_terminal())
        .with_filter(console_targets(cfg));

    let file = cfg
        .get("default")
        .and_then(|section| create_rotating_writer(section, base_dir))
        .map(|writer| {
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(file_targets(cfg))
        });

    let _ = tracing_subscriber::registry().with(console).with(file).try_init();
}

fn init_default_logging() {
    let _ = fmt()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

/// Apply `-v` CLI verbosity on top of the configured console level
/// (-v info, -vv debug, -vvv trace).
pub fn apply_verbosity(cfg: &mut LoggingConfig, verbose: u8) {
    if verbose == 0 {
        return;
    }
    let level = match verbose {
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    cfg.entry("default".to_string())
        .or_insert_with(|| Section {
            console_level: String::new(),
            file: String::new(),
            file_level: String::new(),
            max_size_mb: None,
        })
        .console_level = level.to_string();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_levels_fall_back_to_info() {
        assert_eq!(parse_tracing_level("bogus"), Some(Level::INFO));
        assert_eq!(parse_tracing_level("off"), None);
    }

    #[test]
    fn relative_paths_resolve_against_base_dir() {
        let base = Path::new("/tmp/feedscope-home");
        assert_eq!(
            resolve_log_path("logs/feedscope.log", base),
            base.join("logs/feedscope.log")
        );
        assert_eq!(
            resolve_log_path("/var/log/feedscope.log", base),
            PathBuf::from("/var/log/feedscope.log")
        );
    }

    #[test]
    fn verbosity_overrides_default_console_level() {
        let mut cfg = crate::config::default_logging_config();
        apply_verbosity(&mut cfg, 2);
        assert_eq!(cfg.get("default").unwrap().console_level, "debug");

        apply_verbosity(&mut cfg, 0);
        assert_eq!(cfg.get("default").unwrap().console_level, "debug");
    }
}
