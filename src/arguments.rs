use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

#[derive(Parser, Debug)]
#[command(author, about, version, name = "Scubex")]
pub struct Cli {
    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    /// Path to the configuration file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a map position for marine species
    Scan(ScanOptions),
    /// Run the species aggregation service
    Serve(ServeOptions),
}

#[derive(Args, Debug)]
pub struct ScanOptions {
    /// Latitude of the viewport center
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,
    /// Longitude of the viewport center
    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,
    /// Map zoom level the search radius derives from
    #[arg(short, long, default_value_t = 10.0)]
    pub zoom: f64,
    /// Species service endpoint, overriding the configuration file
    #[arg(short, long)]
    pub endpoint: Option<String>,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
    /// Destination file for CSV output
    #[arg(short, long, value_hint = ValueHint::FilePath, required_if_eq("output", "csv"))]
    pub dest: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
}

#[derive(Args, Debug)]
pub struct ServeOptions {
    /// Listen address, overriding the configuration file
    #[arg(short, long)]
    pub listen: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_scan_arguments_parse() {
        let cli = Cli::try_parse_from([
            "scubex", "scan", "--lat", "36.52", "--lng", "-5.98", "--zoom", "12",
        ])
        .expect("valid arguments");

        match cli.command {
            Commands::Scan(options) => {
                assert_eq!(options.lat, 36.52);
                assert_eq!(options.lng, -5.98);
                assert_eq!(options.zoom, 12.0);
                assert_eq!(options.output, OutputFormat::Table);
            }
            _ => panic!("expected scan command"),
        }
    }

    #[test]
    fn test_csv_output_requires_destination() {
        let result = Cli::try_parse_from([
            "scubex", "scan", "--lat", "36.52", "--lng", "-5.98", "--output", "csv",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_accumulates() {
        let cli = Cli::try_parse_from(["scubex", "-vv", "serve"]).expect("valid arguments");
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Serve(_)));
    }
}
