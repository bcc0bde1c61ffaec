use std::collections::BTreeMap;

use chrono::NaiveDate;
use futures::StreamExt;
use tracing::{debug, instrument};

use crate::config::ScubexConfig;
use crate::errors::UpstreamError;
use crate::geo::{circle_polygon_wkt, LatLng};
use crate::server::inaturalist::{InatClient, TaxonLookup, TaxonSummary};
use crate::server::obis::{ObisClient, ObisOccurrence};
use crate::species::dates::parse_event_date;
use crate::species::SpeciesPayload;

/// Builds the species list for one search zone.
///
/// Occurrences come from OBIS, grouped per scientific name; each group is
/// enriched with a common name and photo from iNaturalist. Groups without a
/// matching taxon are dropped, which keeps plankton and other microscopic
/// noise out of the list.
pub struct ZoneSurvey {
    obis: ObisClient,
    inaturalist: InatClient,
}

impl ZoneSurvey {
    pub fn new(config: &ScubexConfig) -> Self {
        Self {
            obis: ObisClient::new(&config.obis_api_url),
            inaturalist: InatClient::new(&config.inaturalist_api_url),
        }
    }

    #[instrument(name = "zone-survey", skip(self))]
    pub async fn species_in_zone(
        &self,
        center: LatLng,
        radius_m: u32,
    ) -> Result<Vec<SpeciesPayload>, UpstreamError> {
        let geometry = circle_polygon_wkt(center, radius_m);
        debug!(%geometry, "Built search polygon");

        let occurrences = self.obis.occurrences_within(&geometry).await?;
        let grouped = group_by_species(occurrences);
        debug!(species = grouped.len(), "Grouped occurrence page");

        let species: Vec<SpeciesPayload> = futures::stream::iter(grouped)
            .filter_map(|(scientific_name, occurrences)| {
                let inaturalist = &self.inaturalist;
                async move {
                    match inaturalist.best_match(&scientific_name).await {
                        Ok(TaxonLookup::Found(summary)) => {
                            Some(payload_for(scientific_name, &occurrences, Some(summary)))
                        }
                        Ok(TaxonLookup::NotFound) => None,
                        Err(error) => {
                            tracing::error!(
                                scientific_name = scientific_name.as_str(),
                                %error,
                                "Taxon lookup failed"
                            );
                            Some(payload_for(scientific_name, &occurrences, None))
                        }
                    }
                }
            })
            .collect()
            .await;

        Ok(species)
    }
}

/// Occurrences keyed by scientific name. Records without one are skipped.
fn group_by_species(occurrences: Vec<ObisOccurrence>) -> BTreeMap<String, Vec<ObisOccurrence>> {
    let mut grouped: BTreeMap<String, Vec<ObisOccurrence>> = BTreeMap::new();
    for occurrence in occurrences {
        let name = match occurrence.scientific_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        grouped.entry(name).or_default().push(occurrence);
    }
    grouped
}

fn event_date_of(occurrence: &ObisOccurrence) -> Option<NaiveDate> {
    occurrence.event_date.as_deref().and_then(parse_event_date)
}

/// The youngest dated occurrence. Falls back to the first record when dates
/// are missing or unparseable.
fn most_recent(occurrences: &[ObisOccurrence]) -> &ObisOccurrence {
    let mut best = &occurrences[0];
    let mut best_date = event_date_of(best);

    for occurrence in occurrences {
        let date = event_date_of(occurrence);
        if let (Some(candidate), Some(current)) = (date, best_date) {
            if candidate > current {
                best = occurrence;
                best_date = date;
            }
        }
    }

    best
}

fn payload_for(
    scientific_name: String,
    occurrences: &[ObisOccurrence],
    taxon: Option<TaxonSummary>,
) -> SpeciesPayload {
    let newest = most_recent(occurrences);
    let phylum = newest
        .phylum
        .clone()
        .or_else(|| occurrences.iter().find_map(|o| o.phylum.clone()));
    let taxon = taxon.unwrap_or_default();

    SpeciesPayload {
        scientific_name,
        common_name: taxon.common_name,
        number_of_occurrences: occurrences.len() as u64,
        latitude: newest.decimal_latitude,
        longitude: newest.decimal_longitude,
        record_date: newest.event_date.clone(),
        photo_url: taxon.photo_url,
        phylum,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn occurrence(name: Option<&str>, date: Option<&str>, phylum: Option<&str>) -> ObisOccurrence {
        ObisOccurrence {
            scientific_name: name.map(str::to_string),
            decimal_latitude: Some(36.51),
            decimal_longitude: Some(-5.97),
            event_date: date.map(str::to_string),
            phylum: phylum.map(str::to_string),
        }
    }

    #[test]
    fn test_grouping_skips_unnamed_records() {
        let grouped = group_by_species(vec![
            occurrence(Some("Sparus aurata"), None, None),
            occurrence(None, None, None),
            occurrence(Some("  "), None, None),
            occurrence(Some("Sparus aurata"), Some("2020"), None),
            occurrence(Some("Octopus vulgaris"), None, None),
        ]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["Sparus aurata"].len(), 2);
        assert_eq!(grouped["Octopus vulgaris"].len(), 1);
    }

    #[test]
    fn test_most_recent_prefers_youngest_parseable_date() {
        let occurrences = vec![
            occurrence(Some("Sparus aurata"), Some("2019-05-01"), None),
            occurrence(Some("Sparus aurata"), Some("2023-08-15T10:30:00Z"), None),
            occurrence(Some("Sparus aurata"), Some("2021"), None),
        ];

        let newest = most_recent(&occurrences);
        assert_eq!(newest.event_date.as_deref(), Some("2023-08-15T10:30:00Z"));
    }

    #[test]
    fn test_most_recent_keeps_first_when_dates_unusable() {
        let occurrences = vec![
            occurrence(Some("Sparus aurata"), None, None),
            occurrence(Some("Sparus aurata"), Some("2023-08-15"), None),
        ];

        // The first record has no date to compare against, so it wins.
        let newest = most_recent(&occurrences);
        assert_eq!(newest.event_date, None);
    }

    #[test]
    fn test_payload_counts_and_falls_back_for_phylum() {
        let occurrences = vec![
            occurrence(Some("Sparus aurata"), Some("2023-08-15"), None),
            occurrence(Some("Sparus aurata"), Some("2019-05-01"), Some("Chordata")),
        ];

        let payload = payload_for("Sparus aurata".to_string(), &occurrences, None);
        assert_eq!(payload.number_of_occurrences, 2);
        assert_eq!(payload.record_date.as_deref(), Some("2023-08-15"));
        assert_eq!(payload.phylum.as_deref(), Some("Chordata"));
        assert_eq!(payload.common_name, None);
        assert_eq!(payload.photo_url, None);
    }

    #[test]
    fn test_payload_takes_taxon_fields() {
        let occurrences = vec![occurrence(Some("Sparus aurata"), Some("2023-08-15"), None)];
        let taxon = TaxonSummary {
            common_name: Some("Gilthead Bream".to_string()),
            photo_url: Some("https://static.example/photos/1.jpg".to_string()),
        };

        let payload = payload_for("Sparus aurata".to_string(), &occurrences, Some(taxon));
        assert_eq!(payload.common_name.as_deref(), Some("Gilthead Bream"));
        assert_eq!(
            payload.photo_url.as_deref(),
            Some("https://static.example/photos/1.jpg")
        );
    }
}
