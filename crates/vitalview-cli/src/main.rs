//! VitalView recording summarizer.

use std::io::{self, IsTerminal, Write};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;
use vitalview_cli::commands::load_dataset;
use vitalview_cli::logging::{LogConfig, LogFormat, init_logging};
use vitalview_cli::report::render_report;

mod cli;

use crate::cli::{Cli, LogFormatArg, LogLevelArg};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match load_dataset(&cli.recording) {
        Ok(dataset) => {
            let report = render_report(&dataset);
            match io::stdout().lock().write_all(report.as_bytes()) {
                Ok(()) => 0,
                Err(error) => {
                    eprintln!("error: write report: {error}");
                    1
                }
            }
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };

    let mut config = LogConfig::default()
        .with_level_filter(level_filter)
        .with_format(format)
        .with_log_file(cli.log_file.clone())
        .with_ansi(with_ansi);
    // Explicit flags win over RUST_LOG.
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    config
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn explicit_flags_reach_the_log_config() {
        let cli = Cli::try_parse_from([
            "vitalview",
            "--log-level",
            "debug",
            "--log-format",
            "compact",
            "--color",
            "never",
            "--log-file",
            "run.log",
            "study.tdms",
        ])
        .unwrap();
        let config = log_config_from_cli(&cli);
        assert_eq!(config.level_filter, LevelFilter::DEBUG);
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.log_file, Some(PathBuf::from("run.log")));
        assert!(!config.with_ansi);
        assert!(!config.use_env_filter);
    }

    #[test]
    fn defaults_defer_to_rust_log() {
        let cli = Cli::try_parse_from(["vitalview", "--color", "always", "study.tdms"]).unwrap();
        let config = log_config_from_cli(&cli);
        assert_eq!(config.level_filter, LevelFilter::WARN);
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.log_file, None);
        assert!(config.with_ansi);
        assert!(config.use_env_filter);
    }

    #[test]
    fn verbosity_flags_raise_the_level() {
        let cli = Cli::try_parse_from(["vitalview", "-vv", "study.tdms"]).unwrap();
        let config = log_config_from_cli(&cli);
        assert_eq!(config.level_filter, LevelFilter::DEBUG);
        assert!(!config.use_env_filter);
    }
}
