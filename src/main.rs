mod app;
mod cli;

use bcexport::config::Config;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;

/// Where tracing output goes for this run
#[derive(Debug, PartialEq, Eq)]
enum LogWriter {
    Stderr,
    /// Full-screen UI active: append to the debug log instead
    File(PathBuf),
    /// Full-screen UI active and no debug log configured
    Discard,
}

fn log_writer(owns_terminal: bool, debug_log: Option<PathBuf>) -> LogWriter {
    match (owns_terminal, debug_log) {
        (false, _) => LogWriter::Stderr,
        (true, Some(path)) => LogWriter::File(path),
        (true, None) => LogWriter::Discard,
    }
}

fn init_tracing(verbose: u8, configured: &str, writer: LogWriter) {
    let level = match verbose {
        0 => configured.parse().unwrap_or(LevelFilter::WARN),
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    match writer {
        LogWriter::Stderr => builder.with_writer(std::io::stderr).init(),
        LogWriter::File(path) => {
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => builder
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .init(),
                Err(e) => {
                    eprintln!("Warning: could not open log {}: {}", path.display(), e);
                    builder.with_writer(std::io::sink).init();
                }
            }
        }
        LogWriter::Discard => builder.with_writer(std::io::sink).init(),
    }
}

fn main() {
    let cli = cli::parse();
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: {:#}", e);
        Config::default()
    });

    let writer = log_writer(cli.owns_terminal(), config.debug_log_path());
    init_tracing(cli.verbose, &config.logging.level, writer);
    app::run(cli, config);
}
