use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressState, ProgressStyle};
use std::time::Duration;
use tracing::Level;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

mod arguments;
mod commands;
mod progress;

use arguments::{Cli, Commands};
use scubex::config::ScubexConfig;

fn setup_logging(verbose: u8) -> Result<()> {
    let log_level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let indicatif_layer = IndicatifLayer::new()
        .with_progress_style(
            ProgressStyle::with_template(
                "{color_start}{span_child_prefix}{span_fields} -- {span_name} {wide_msg} {elapsed_subsec}{color_end}",
            )?
                .with_key(
                    "elapsed_subsec",
                    progress::elapsed_subsec,
                )
                .with_key(
                    "color_start",
                    |state: &ProgressState, writer: &mut dyn std::fmt::Write| {
                        let elapsed = state.elapsed();

                        if elapsed > Duration::from_secs(8) {
                            // Red
                            let _ = write!(writer, "\x1b[{}m", 1 + 30);
                        } else if elapsed > Duration::from_secs(4) {
                            // Yellow
                            let _ = write!(writer, "\x1b[{}m", 3 + 30);
                        }
                    },
                )
                .with_key(
                    "color_end",
                    |state: &ProgressState, writer: &mut dyn std::fmt::Write| {
                        if state.elapsed() > Duration::from_secs(4) {
                            let _ = write!(writer, "\x1b[0m");
                        }
                    },
                ),
        )
        .with_span_child_prefix_symbol("↳ ")
        .with_span_child_prefix_indent(" ")
        .with_max_progress_bars(
            20,
            Some(
                ProgressStyle::with_template(
                    "...and {pending_progress_bars} more not shown above.",
                )?
            ),
        );

    // Logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_filter(Targets::default().with_default(Level::TRACE)),
        )
        .with(indicatif_layer)
        .with(
            Targets::default()
                .with_target("scubex", log_level)
                .with_target("surf", LevelFilter::OFF),
        )
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(args.verbose)?;

    let config = ScubexConfig::load(args.config.as_deref())?;

    match &args.command {
        Commands::Scan(options) => commands::scan::zone_scan(options, &config).await?,
        Commands::Serve(options) => commands::serve::species_service(options, &config).await?,
    }

    Ok(())
}
