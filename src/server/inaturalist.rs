use std::time::Duration;

use governor::clock::QuantaClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Jitter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::UpstreamError;
use crate::server::names::clean_scientific_name;

/// iNaturalist asks for at most one request per second.
static INAT_API_LIMIT: Lazy<RateLimiter<NotKeyed, InMemoryState, QuantaClock>> =
    Lazy::new(|| RateLimiter::direct(Quota::per_second(nonzero!(1u32))));

const INAT_SERVICE: &str = "iNaturalist";

#[derive(Debug, Serialize)]
struct TaxaQuery {
    q: String,
    per_page: u32,
    order: &'static str,
    order_by: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
struct TaxonPhoto {
    url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TaxonHit {
    preferred_common_name: Option<String>,
    default_photo: Option<TaxonPhoto>,
}

#[derive(Debug, Deserialize)]
struct TaxaPage {
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    results: Vec<TaxonHit>,
}

/// Display-oriented taxon data for one scientific name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxonSummary {
    pub common_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Outcome of a taxon lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum TaxonLookup {
    /// A taxon matched; individual fields may still be absent.
    Found(TaxonSummary),
    /// Zero matches. Mostly plankton and other taxa iNaturalist does not
    /// track.
    NotFound,
}

/// Client for the iNaturalist taxa API.
pub struct InatClient {
    base_url: String,
}

impl InatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Most-observed taxon matching a scientific name.
    #[instrument(name = "taxon-lookup", skip(self))]
    pub async fn best_match(&self, scientific_name: &str) -> Result<TaxonLookup, UpstreamError> {
        INAT_API_LIMIT
            .until_ready_with_jitter(Jitter::new(
                Duration::from_millis(50),
                Duration::from_millis(250),
            ))
            .await;

        let request = surf::get(format!("{}/taxa", self.base_url))
            .query(&TaxaQuery {
                q: clean_scientific_name(scientific_name),
                per_page: 1,
                order: "desc",
                order_by: "observations_count",
            })
            .map_err(|e| UpstreamError::Request {
                service: INAT_SERVICE,
                message: e.to_string(),
            })?;

        let mut res = request.await.map_err(|e| UpstreamError::Request {
            service: INAT_SERVICE,
            message: e.to_string(),
        })?;

        let status = res.status();
        if !status.is_success() {
            return Err(UpstreamError::Request {
                service: INAT_SERVICE,
                message: format!("HTTP {} {}", u16::from(status), status.canonical_reason()),
            });
        }

        let page: TaxaPage = res.body_json().await.map_err(|e| UpstreamError::Decode {
            service: INAT_SERVICE,
            message: e.to_string(),
        })?;

        if page.total_results == 0 {
            debug!(scientific_name, "No matching taxon");
            return Ok(TaxonLookup::NotFound);
        }

        let summary = page
            .results
            .first()
            .map(TaxonSummary::from)
            .unwrap_or_default();
        Ok(TaxonLookup::Found(summary))
    }
}

impl From<&TaxonHit> for TaxonSummary {
    fn from(hit: &TaxonHit) -> Self {
        Self {
            common_name: hit
                .preferred_common_name
                .as_deref()
                .map(|v| change_case::title_case(v.trim())),
            photo_url: hit.default_photo.as_ref().and_then(|p| p.url.clone()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_page_decodes_nested_photo() {
        let page: TaxaPage = serde_json::from_str(
            r#"{
                "total_results": 1,
                "results": [{
                    "preferred_common_name": "gilt-head bream",
                    "default_photo": {"url": "https://static.example/photos/1.jpg"}
                }]
            }"#,
        )
        .expect("valid page");

        assert_eq!(page.total_results, 1);
        let summary = TaxonSummary::from(&page.results[0]);
        assert_eq!(summary.common_name.as_deref(), Some("Gilt Head Bream"));
        assert_eq!(
            summary.photo_url.as_deref(),
            Some("https://static.example/photos/1.jpg")
        );
    }

    #[test]
    fn test_summary_tolerates_absent_fields() {
        let page: TaxaPage =
            serde_json::from_str(r#"{"total_results": 3, "results": [{}]}"#).expect("valid page");

        let summary = TaxonSummary::from(&page.results[0]);
        assert_eq!(summary, TaxonSummary::default());
    }

    #[test]
    fn test_empty_page_defaults_to_zero_results() {
        let page: TaxaPage = serde_json::from_str("{}").expect("valid page");
        assert_eq!(page.total_results, 0);
        assert!(page.results.is_empty());
    }
}
