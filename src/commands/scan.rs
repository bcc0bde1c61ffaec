use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use comfy_table::*;
use console::{style, Emoji};
use itertools::Itertools;

use scubex::config::ScubexConfig;
use scubex::geo::LatLng;
use scubex::scan::{ScanSession, ScanSnapshot, ScanStatus};
use scubex::species::{SpeciesClient, SpeciesReport};

use crate::arguments::{OutputFormat, ScanOptions};

static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍  ", "");
static FISH: Emoji<'_, '_> = Emoji("🐠  ", "");

pub(crate) async fn zone_scan(options: &ScanOptions, config: &ScubexConfig) -> anyhow::Result<()> {
    let endpoint = options
        .endpoint
        .as_deref()
        .unwrap_or(&config.species_service_url);
    let session = ScanSession::new(Arc::new(SpeciesClient::new(endpoint)));

    println!(
        "{} {}Scanning for marine species...",
        style("[1/2]").bold().dim(),
        LOOKING_GLASS
    );
    let center = LatLng::new(options.lat, options.lng);
    session.scan(center, options.zoom).await?;

    let snapshot = session.snapshot();
    if let Some(request) = &snapshot.request {
        println!(
            "{} {}Surveyed {request}",
            style("[2/2]").bold().dim(),
            FISH
        );
    }

    match options.output {
        OutputFormat::Table => print_report(&snapshot),
        OutputFormat::Csv => match &options.dest {
            Some(dest) => export_csv(&snapshot.report, dest)?,
            None => anyhow::bail!("CSV output needs a destination file"),
        },
    }

    if snapshot.status == ScanStatus::Error {
        if let Some(message) = &snapshot.error {
            eprintln!("{}", style(message).red());
        }
    }

    Ok(())
}

fn print_report(snapshot: &ScanSnapshot) {
    let report = &snapshot.report;

    let mut table = Table::new();
    table
        .load_preset("││──╞═╪╡┆    ┬┴┌┐└┘")
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Scientific name").add_attribute(Attribute::Bold),
            Cell::new("Common name").add_attribute(Attribute::Bold),
            Cell::new("Occurrences").add_attribute(Attribute::Bold),
            Cell::new("Last record").add_attribute(Attribute::Bold),
            Cell::new("Phylum").add_attribute(Attribute::Bold),
        ]);

    for species in &report.species {
        table.add_row(vec![
            Cell::new(&species.scientific_name),
            Cell::new(species.common_name.as_deref().unwrap_or("-")),
            Cell::new(species.occurrence_count),
            Cell::new(&species.last_record_date),
            Cell::new(species.phylum.as_deref().unwrap_or("-")),
        ]);
    }

    println!("{table}");
    println!(
        "{} taxa, {} occurrences. Sources: {}",
        report.total_taxa,
        report.total_occurrences,
        report.sources.iter().join(", ")
    );
}

fn export_csv(report: &SpeciesReport, dest: &Path) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(File::create(dest)?);
    wtr.write_record([
        "taxon_id",
        "scientific_name",
        "common_name",
        "occurrences",
        "last_record_date",
        "photo_url",
        "phylum",
    ])?;
    report
        .species
        .iter()
        .map(|species| {
            let occurrences = species.occurrence_count.to_string();
            wtr.write_record([
                species.taxon_id.as_str(),
                species.scientific_name.as_str(),
                species.common_name.as_deref().unwrap_or_default(),
                occurrences.as_str(),
                species.last_record_date.as_str(),
                species.photo_url.as_deref().unwrap_or_default(),
                species.phylum.as_deref().unwrap_or_default(),
            ])
        })
        .collect::<Result<Vec<_>, _>>()?;
    wtr.flush()?;

    Ok(())
}
