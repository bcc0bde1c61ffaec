use async_trait::async_trait;
use tracing::instrument;

use crate::errors::FetchError;
use crate::scan::ScanRequest;
use crate::species::{SpeciesPayload, SpeciesReport};

/// Fetch seam between the scan session and the species service.
#[async_trait]
pub trait SpeciesProvider: Send + Sync {
    /// Fetches and normalizes the species report for a scan request.
    async fn zone_species(&self, request: &ScanRequest) -> Result<SpeciesReport, FetchError>;
}

/// HTTP client for the species aggregation service.
#[derive(Debug, Clone)]
pub struct SpeciesClient {
    base_url: String,
}

impl SpeciesClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Base endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.base_url
    }

    fn request_url(&self, request: &ScanRequest) -> String {
        format!(
            "{base}/api/species?lat={lat:.6}&lng={lng:.6}&radius={radius}",
            base = self.base_url,
            lat = request.lat,
            lng = request.lng,
            radius = request.radius
        )
    }

    #[instrument(name = "zone-species", skip(self), fields(endpoint = %self.base_url))]
    async fn fetch(&self, request: &ScanRequest) -> Result<Vec<SpeciesPayload>, FetchError> {
        let url = self.request_url(request);
        tracing::debug!(url = url.as_str(), "Requesting zone species");

        let mut res = surf::get(&url).await.map_err(|e| FetchError::Connection {
            endpoint: self.base_url.clone(),
            message: e.to_string(),
        })?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.into(),
                status_text: status.canonical_reason().to_string(),
            });
        }

        res.body_json::<Vec<SpeciesPayload>>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SpeciesProvider for SpeciesClient {
    async fn zone_species(&self, request: &ScanRequest) -> Result<SpeciesReport, FetchError> {
        let payload = self.fetch(request).await?;
        Ok(SpeciesReport::from_payload(payload))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geo::LatLng;

    #[test]
    fn test_request_url_renders_six_decimal_coordinates() {
        let client = SpeciesClient::new("http://localhost:8080");
        let request = ScanRequest::from_viewport(LatLng::new(36.52, -5.98), 10.0);

        assert_eq!(
            client.request_url(&request),
            "http://localhost:8080/api/species?lat=36.520000&lng=-5.980000&radius=5000"
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed_from_base_url() {
        let client = SpeciesClient::new("http://localhost:8080/");

        assert_eq!(client.endpoint(), "http://localhost:8080");
    }
}
