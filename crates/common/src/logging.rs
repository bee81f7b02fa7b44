//! Logging and tracing initialization.

use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber with the given configuration.
///
/// When `config.file` is set, output is appended to that file instead of stderr.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let (writer, ansi) = log_writer(config);

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(ansi);
    if config.json {
        let subscriber = builder.json().finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = builder
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

/// The configured log file, or stderr when there is none or it cannot be
/// opened. The flag says whether ANSI colors suit the destination.
fn log_writer(config: &LoggingConfig) -> (BoxMakeWriter, bool) {
    let file = config.file.as_ref().and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| eprintln!("Cannot open log file {}: {e}", path.display()))
            .ok()
    });
    match file {
        Some(file) => (BoxMakeWriter::new(Mutex::new(file)), false),
        None => (BoxMakeWriter::new(std::io::stderr), true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn test_log_file_is_appended_without_colors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("booth.log");
        std::fs::write(&path, "earlier\n").unwrap();
        let config = LoggingConfig {
            file: Some(path.clone()),
            ..LoggingConfig::default()
        };

        let (writer, ansi) = log_writer(&config);
        assert!(!ansi);
        writer.make_writer().write_all(b"later\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "earlier\nlater\n");
    }

    #[test]
    fn test_unopenable_log_file_falls_back_to_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            file: Some(dir.path().join("missing").join("booth.log")),
            ..LoggingConfig::default()
        };
        let (_, ansi) = log_writer(&config);
        assert!(ansi);
        assert!(!dir.path().join("missing").exists());
    }
}
