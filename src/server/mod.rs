use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ScubexConfig;
use crate::geo::LatLng;

mod aggregate;
mod inaturalist;
mod names;
mod obis;

pub use aggregate::ZoneSurvey;
pub use inaturalist::{InatClient, TaxonLookup, TaxonSummary};
pub use obis::{ObisClient, ObisOccurrence};

#[derive(Clone)]
struct AppState {
    survey: Arc<ZoneSurvey>,
}

#[derive(Debug, Deserialize)]
struct ZoneQuery {
    lat: f64,
    lng: f64,
    radius: u32,
}

impl ZoneQuery {
    fn validate(&self) -> Result<(), &'static str> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err("lat must be within [-90, 90]");
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err("lng must be within [-180, 180]");
        }
        if self.radius == 0 {
            return Err("radius must be positive");
        }
        Ok(())
    }
}

/// The species service: `/api/species` plus a health probe.
pub fn router(config: &ScubexConfig) -> Router {
    let state = AppState {
        survey: Arc::new(ZoneSurvey::new(config)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::OPTIONS]);

    Router::new()
        .route("/api/species", get(zone_species))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured listen address and serves until shutdown.
pub async fn serve(config: &ScubexConfig) -> std::io::Result<()> {
    let app = router(config);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(
        "Species service listening on http://{}",
        listener.local_addr()?
    );
    axum::serve(listener, app).await
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn zone_species(State(state): State<AppState>, Query(query): Query<ZoneQuery>) -> Response {
    if let Err(reason) = query.validate() {
        return (StatusCode::BAD_REQUEST, reason).into_response();
    }

    let center = LatLng::new(query.lat, query.lng);
    match state.survey.species_in_zone(center, query.radius).await {
        Ok(species) => Json(species).into_response(),
        Err(error) => {
            error!(%error, "Zone survey failed");
            (StatusCode::BAD_GATEWAY, error.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn query(lat: f64, lng: f64, radius: u32) -> ZoneQuery {
        ZoneQuery { lat, lng, radius }
    }

    #[test]
    fn test_in_range_query_is_accepted() {
        assert!(query(36.52, -5.98, 5_000).validate().is_ok());
        assert!(query(-90.0, 180.0, 1).validate().is_ok());
    }

    #[test]
    fn test_out_of_range_coordinates_are_rejected() {
        assert!(query(90.5, 0.0, 1_000).validate().is_err());
        assert!(query(-91.0, 0.0, 1_000).validate().is_err());
        assert!(query(0.0, 180.5, 1_000).validate().is_err());
        assert!(query(0.0, -181.0, 1_000).validate().is_err());
    }

    #[test]
    fn test_zero_radius_is_rejected() {
        assert!(query(36.52, -5.98, 0).validate().is_err());
    }
}
