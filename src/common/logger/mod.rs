use std::{fs, path::Path, sync::OnceLock};

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub mod formatter;
pub mod writer;

pub use formatter::*;
pub use writer::*;

use crate::configs::LoggingConfig;

pub(crate) static GLOBAL_FILE_WRITER: OnceLock<CircularFileWriter> = OnceLock::new();

#[macro_export]
macro_rules! log_println {
    () => {{
        std::println!();
        $crate::common::logger::append_to_file_raw("\n");
    }};
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        std::println!("{}", msg);
        $crate::common::logger::append_to_file_raw(&format!("{}\n", msg));
    }};
}

/// Mirrors raw stdout output into the log file, once one is configured.
pub fn append_to_file_raw(msg: &str) {
    if let Some(mut writer) = GLOBAL_FILE_WRITER.get().cloned() {
        use std::io::Write;
        let _ = writer.write_all(strip_ansi_escapes(msg).as_bytes());
    }
}

/// Directive string handed to `EnvFilter` when `RUST_LOG` is unset.
///
/// Noisy HTTP internals are pinned to `warn` unless the user filters say
/// otherwise.
pub fn filter_directives(config: Option<&LoggingConfig>) -> String {
    let level = config.and_then(|l| l.level.as_deref()).unwrap_or("info");
    let filters = config.and_then(|l| l.filters.as_deref()).unwrap_or("");

    if filters.is_empty() {
        format!("{},hyper=warn,reqwest=warn", level)
    } else {
        format!("{},hyper=warn,reqwest=warn,{}", level, filters)
    }
}

pub fn init(config: Option<&LoggingConfig>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let stdout_layer = fmt::layer()
        .event_format(CustomFormatter::new(true))
        .with_ansi(true);

    let file_layer = config.and_then(|l| l.file.as_ref()).map(|file_config| {
        if let Some(parent) = Path::new(&file_config.path).parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Failed to create log directory: {}", e);
            }
        }

        let writer = CircularFileWriter::new(file_config.path.clone(), file_config.max_lines);
        let _ = GLOBAL_FILE_WRITER.set(writer.clone());
        fmt::layer()
            .with_writer(writer)
            .event_format(CustomFormatter::new(false))
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives_defaults_to_info() {
        assert_eq!(filter_directives(None), "info,hyper=warn,reqwest=warn");
    }

    #[test]
    fn test_filter_directives_appends_user_filters() {
        let cfg = LoggingConfig {
            level: Some("debug".into()),
            filters: Some("rustream::proxy=trace".into()),
            file: None,
        };
        assert_eq!(
            filter_directives(Some(&cfg)),
            "debug,hyper=warn,reqwest=warn,rustream::proxy=trace"
        );
    }
}
