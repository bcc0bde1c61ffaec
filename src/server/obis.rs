use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::UpstreamError;

const OBIS_SERVICE: &str = "OBIS";
/// One page is plenty for a dive-sized search area.
const OCCURRENCE_PAGE_SIZE: u32 = 1000;
/// Animalia, Plantae and Chromista. Keeps bacteria and fungi out of the
/// results before they ever reach the enrichment step.
const OCCURRENCE_TAXA: &str = "2,3,4";
const OCCURRENCE_FIELDS: &str =
    "scientificName,decimalLatitude,decimalLongitude,eventDate,phylum";

#[derive(Debug, Serialize)]
struct OccurrenceQuery {
    geometry: String,
    size: u32,
    fields: &'static str,
    taxonid: &'static str,
}

/// One occurrence record as OBIS reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObisOccurrence {
    pub scientific_name: Option<String>,
    pub decimal_latitude: Option<f64>,
    pub decimal_longitude: Option<f64>,
    pub event_date: Option<String>,
    pub phylum: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObisPage {
    #[serde(default)]
    results: Vec<ObisOccurrence>,
    #[serde(default)]
    total: Option<u64>,
}

/// Client for the OBIS occurrence API.
pub struct ObisClient {
    base_url: String,
}

impl ObisClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Occurrence records within a WKT polygon.
    #[instrument(name = "obis-occurrences", skip_all, fields(endpoint = %self.base_url))]
    pub async fn occurrences_within(
        &self,
        geometry: &str,
    ) -> Result<Vec<ObisOccurrence>, UpstreamError> {
        let request = surf::get(format!("{}/occurrence", self.base_url))
            .query(&OccurrenceQuery {
                geometry: geometry.to_string(),
                size: OCCURRENCE_PAGE_SIZE,
                fields: OCCURRENCE_FIELDS,
                taxonid: OCCURRENCE_TAXA,
            })
            .map_err(|e| UpstreamError::Request {
                service: OBIS_SERVICE,
                message: e.to_string(),
            })?;

        let mut res = request.await.map_err(|e| UpstreamError::Request {
            service: OBIS_SERVICE,
            message: e.to_string(),
        })?;

        let status = res.status();
        if !status.is_success() {
            return Err(UpstreamError::Request {
                service: OBIS_SERVICE,
                message: format!("HTTP {} {}", u16::from(status), status.canonical_reason()),
            });
        }

        let page: ObisPage = res.body_json().await.map_err(|e| UpstreamError::Decode {
            service: OBIS_SERVICE,
            message: e.to_string(),
        })?;

        debug!(
            total = page.total,
            results = page.results.len(),
            "Fetched occurrence page"
        );
        Ok(page.results)
    }
}
