use std::io::{self, Write};
use std::process;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use cb::cli::commands::{dispatch, report_parse_error};
use cb::cli::{Cli, CliResult};
use cb::config::Settings;
use cb::infrastructure::di::ServiceContainer;

fn main() {
    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = report_parse_error(&e, &mut out, &mut err);
            let _ = out.flush();
            process::exit(code);
        }
    };

    setup_logging(cli.verbose);

    let code = dispatch(&cli, connect, &mut out, &mut err);
    let _ = out.flush();
    process::exit(code);
}

/// Resolve settings (file, environment, flags) and build the selected backend.
fn connect(cli: &Cli) -> CliResult<ServiceContainer> {
    let settings = Settings::load(cli.config.as_deref())?.merge_with(&cli.settings_overrides());
    tracing::debug!("settings: {:?}", settings);
    Ok(ServiceContainer::new(settings)?)
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    // stdout carries command output only
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    if filter > LevelFilter::WARN {
        tracing::info!("log level: {}", filter);
    }
}
