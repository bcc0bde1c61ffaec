use std::sync::Arc;

use strum::Display;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::errors::ScanError;
use crate::geo::LatLng;
use crate::scan::ScanRequest;
use crate::species::{SpeciesProvider, SpeciesReport};

/// Lifecycle of a scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum ScanStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// State published to subscribers on every transition.
#[derive(Debug, Clone, Default)]
pub struct ScanSnapshot {
    pub status: ScanStatus,
    /// Request being served while loading, or the last one served.
    pub request: Option<ScanRequest>,
    /// Latest report; retained across a re-trigger until replaced.
    pub report: SpeciesReport,
    pub error: Option<String>,
}

/// Scan state machine with an at-most-one in-flight fetch guard.
///
/// Sessions are plain values wired to a provider; share one via `Arc` when
/// the trigger and the observers live on different tasks.
pub struct ScanSession {
    provider: Arc<dyn SpeciesProvider>,
    state: watch::Sender<ScanSnapshot>,
}

impl ScanSession {
    pub fn new(provider: Arc<dyn SpeciesProvider>) -> Self {
        let (state, _) = watch::channel(ScanSnapshot::default());
        Self { provider, state }
    }

    /// Receiver observing every state transition.
    pub fn subscribe(&self) -> watch::Receiver<ScanSnapshot> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn snapshot(&self) -> ScanSnapshot {
        self.state.borrow().clone()
    }

    /// Runs one scan for the given viewport center and zoom.
    ///
    /// Rejected while a fetch is in flight; the running fetch keeps its slot
    /// and its result still lands. On failure the report is replaced by the
    /// failure form, so the error itself is the visible content.
    pub async fn scan(&self, center: LatLng, zoom: f64) -> Result<ScanStatus, ScanError> {
        let request = ScanRequest::from_viewport(center, zoom);

        let mut rejected = false;
        self.state.send_modify(|state| {
            if state.status == ScanStatus::Loading {
                rejected = true;
                return;
            }
            state.status = ScanStatus::Loading;
            state.request = Some(request);
            state.error = None;
        });
        if rejected {
            debug!(%request, "Scan rejected, another one is in flight");
            return Err(ScanError::AlreadyScanning);
        }

        debug!(%request, "Scan started");
        match self.provider.zone_species(&request).await {
            Ok(report) => {
                debug!(total_taxa = report.total_taxa, "Scan succeeded");
                self.state.send_modify(|state| {
                    state.status = ScanStatus::Success;
                    state.report = report;
                    state.error = None;
                });
                Ok(ScanStatus::Success)
            }
            Err(error) => {
                warn!("Scan failed: {error}");
                let report = SpeciesReport::from_failure(&error);
                self.state.send_modify(|state| {
                    state.status = ScanStatus::Error;
                    state.report = report;
                    state.error = Some(error.to_string());
                });
                Ok(ScanStatus::Error)
            }
        }
    }

    /// Clears results and returns to `Idle`.
    pub fn reset(&self) {
        self.state.send_modify(|state| {
            *state = ScanSnapshot::default();
        });
    }
}
