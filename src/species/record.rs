use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::FetchError;
use crate::species::dates;

/// Provenance labels attached to a successful scan.
pub const DATA_SOURCES: [&str; 2] = ["OBIS", "iNaturalist"];
/// Provenance label attached to a failed scan.
pub const ERROR_SOURCE: &str = "Error";

/// One element of the JSON array served by `GET /api/species`.
///
/// The same shape is decoded by the fetch client and encoded by the
/// aggregation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesPayload {
    pub scientific_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    #[serde(default)]
    pub number_of_occurrences: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phylum: Option<String>,
}

/// Display-ready species entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesRecord {
    /// Position of the record in the original response array, stringified.
    pub taxon_id: String,
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub occurrence_count: u64,
    /// `YYYY-MM-DD` or one of the fallback markers from [`dates`].
    pub last_record_date: String,
    pub photo_url: Option<String>,
    pub phylum: Option<String>,
}

/// One scan's results in display order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpeciesReport {
    pub species: Vec<SpeciesRecord>,
    pub total_taxa: usize,
    pub total_occurrences: u64,
    pub sources: BTreeSet<String>,
}

impl SpeciesReport {
    /// Builds the report from the raw response array.
    ///
    /// Taxon ids are assigned from response positions before the descending
    /// sort, so they keep referring to the original order. The sort is
    /// stable; ties stay in response order.
    pub fn from_payload(payload: Vec<SpeciesPayload>) -> Self {
        let mut species: Vec<SpeciesRecord> = payload
            .into_iter()
            .enumerate()
            .map(|(index, entry)| SpeciesRecord {
                taxon_id: index.to_string(),
                scientific_name: entry.scientific_name,
                common_name: entry.common_name,
                occurrence_count: entry.number_of_occurrences,
                last_record_date: dates::normalize_record_date(entry.record_date.as_deref()),
                photo_url: entry.photo_url,
                phylum: entry.phylum,
            })
            .collect();
        species.sort_by(|a, b| b.occurrence_count.cmp(&a.occurrence_count));

        let total_occurrences = species.iter().map(|s| s.occurrence_count).sum();

        Self {
            total_taxa: species.len(),
            total_occurrences,
            sources: DATA_SOURCES.iter().map(|s| s.to_string()).collect(),
            species,
        }
    }

    /// Failure form: the error itself becomes the single visible record,
    /// with connection problems worded differently than server answers.
    pub fn from_failure(error: &FetchError) -> Self {
        let (common_name, scientific_name) = match error {
            FetchError::Connection { endpoint, .. } => (
                "Connection error",
                format!("Check that the species service is reachable at {endpoint}"),
            ),
            _ => ("Server error", error.to_string()),
        };

        Self {
            species: vec![SpeciesRecord {
                taxon_id: "error-1".to_string(),
                scientific_name,
                common_name: Some(common_name.to_string()),
                occurrence_count: 0,
                last_record_date: "N/A".to_string(),
                photo_url: None,
                phylum: None,
            }],
            total_taxa: 0,
            total_occurrences: 0,
            sources: BTreeSet::from([ERROR_SOURCE.to_string()]),
        }
    }

    /// True when the report is the failure form rather than scan results.
    pub fn is_failure(&self) -> bool {
        self.sources.contains(ERROR_SOURCE)
    }
}
