use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tracing::debug;

use crate::geo::{GeoBounds, LatLng};

/// Quiet period between the last movement and an emission.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

const VIEWPORT_CHANNEL_CAPACITY: usize = 16;

/// Read seam to the rendering surface.
///
/// The renderer itself lives outside this crate; anything that can answer
/// these three questions can drive the tracker.
pub trait MapSurface: Send + Sync {
    fn center(&self) -> LatLng;
    fn zoom(&self) -> f64;
    fn bounds(&self) -> GeoBounds;
}

/// Camera signals reported by the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The surface finished its initial load.
    Loaded,
    /// A pan or zoom gesture settled.
    MoveEnd,
}

/// Snapshot of the viewport at emission time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub center: LatLng,
    pub zoom: f64,
    pub bounds: GeoBounds,
}

/// Cancellable timer guarding the debounce quiet period.
///
/// Arming while armed replaces the deadline, restarting the period.
#[derive(Debug)]
struct QuietWindow {
    period: Duration,
    deadline: Option<Instant>,
}

impl QuietWindow {
    fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
        }
    }

    fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.period);
    }

    fn cancel(&mut self) {
        self.deadline = None;
    }

    fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Resolves when the deadline passes; pends forever without one.
    async fn elapsed(deadline: Option<Instant>) {
        match deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }
}

/// Debounces surface movement into settled-viewport emissions.
///
/// Emissions are advisory: consumers keep the latest viewport around for the
/// next user-triggered scan, they are not scan triggers themselves.
pub struct ViewportTracker {
    surface: Arc<dyn MapSurface>,
    events: mpsc::UnboundedReceiver<SurfaceEvent>,
    window: QuietWindow,
    viewports: broadcast::Sender<ViewportState>,
}

impl ViewportTracker {
    pub fn new(
        surface: Arc<dyn MapSurface>,
        events: mpsc::UnboundedReceiver<SurfaceEvent>,
    ) -> Self {
        Self::with_quiet_period(surface, events, DEFAULT_QUIET_PERIOD)
    }

    pub fn with_quiet_period(
        surface: Arc<dyn MapSurface>,
        events: mpsc::UnboundedReceiver<SurfaceEvent>,
        period: Duration,
    ) -> Self {
        let (viewports, _) = broadcast::channel(VIEWPORT_CHANNEL_CAPACITY);
        Self {
            surface,
            events,
            window: QuietWindow::new(period),
            viewports,
        }
    }

    /// New receiver for viewport emissions.
    pub fn subscribe(&self) -> broadcast::Receiver<ViewportState> {
        self.viewports.subscribe()
    }

    /// Current surface snapshot, bypassing the debounce.
    pub fn current(&self) -> ViewportState {
        ViewportState {
            center: self.surface.center(),
            zoom: self.surface.zoom(),
            bounds: self.surface.bounds(),
        }
    }

    /// Consumes surface events until the channel closes.
    ///
    /// `Loaded` emits immediately. `MoveEnd` (re)arms the quiet window; the
    /// snapshot goes out once the window elapses, one emission per movement
    /// burst. A window still pending at shutdown is discarded.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(SurfaceEvent::Loaded) => {
                        debug!("Surface loaded, emitting initial viewport");
                        self.emit();
                    }
                    Some(SurfaceEvent::MoveEnd) => self.window.arm(),
                    None => break,
                },
                _ = QuietWindow::elapsed(self.window.deadline()), if self.window.is_armed() => {
                    self.window.cancel();
                    self.emit();
                }
            }
        }
    }

    fn emit(&self) {
        let viewport = self.current();
        debug!(zoom = viewport.zoom, "Viewport settled");
        // Emissions without subscribers are dropped.
        let _ = self.viewports.send(viewport);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;
    use tokio::task::yield_now;
    use tokio::time::advance;

    struct StaticSurface {
        center: LatLng,
        zoom: f64,
        bounds: GeoBounds,
    }

    impl StaticSurface {
        fn cadiz() -> Self {
            Self {
                center: LatLng::new(36.52, -5.98),
                zoom: 8.0,
                bounds: GeoBounds::new(-6.48, 36.12, -5.48, 36.92),
            }
        }
    }

    impl MapSurface for StaticSurface {
        fn center(&self) -> LatLng {
            self.center
        }

        fn zoom(&self) -> f64 {
            self.zoom
        }

        fn bounds(&self) -> GeoBounds {
            self.bounds
        }
    }

    fn tracker_fixture() -> (
        mpsc::UnboundedSender<SurfaceEvent>,
        broadcast::Receiver<ViewportState>,
        tokio::task::JoinHandle<()>,
    ) {
        let (events, event_rx) = mpsc::unbounded_channel();
        let tracker = ViewportTracker::new(Arc::new(StaticSurface::cadiz()), event_rx);
        let viewports = tracker.subscribe();
        let worker = tokio::spawn(tracker.run());

        (events, viewports, worker)
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_load_emits_immediately() {
        let (events, mut viewports, _worker) = tracker_fixture();

        events.send(SurfaceEvent::Loaded).expect("send");
        yield_now().await;

        let viewport = viewports.try_recv().expect("immediate emission");
        assert_eq!(viewport.center, LatLng::new(36.52, -5.98));
        assert_eq!(viewport.zoom, 8.0);
        assert!(matches!(viewports.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_into_one_emission() {
        let (events, mut viewports, _worker) = tracker_fixture();

        // Five move-ends 100ms apart, all inside each other's quiet window.
        for _ in 0..5 {
            events.send(SurfaceEvent::MoveEnd).expect("send");
            yield_now().await;
            advance(Duration::from_millis(100)).await;
            yield_now().await;
        }
        assert!(matches!(viewports.try_recv(), Err(TryRecvError::Empty)));

        // 499ms after the last move-end the window is still open.
        advance(Duration::from_millis(399)).await;
        yield_now().await;
        assert!(matches!(viewports.try_recv(), Err(TryRecvError::Empty)));

        // One more millisecond closes it.
        advance(Duration::from_millis(1)).await;
        yield_now().await;
        let viewport = viewports.try_recv().expect("settled emission");
        assert_eq!(viewport.zoom, 8.0);
        assert!(matches!(viewports.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_movement_restarts_the_window() {
        let (events, mut viewports, _worker) = tracker_fixture();

        events.send(SurfaceEvent::MoveEnd).expect("send");
        yield_now().await;
        advance(Duration::from_millis(400)).await;
        yield_now().await;
        assert!(matches!(viewports.try_recv(), Err(TryRecvError::Empty)));

        events.send(SurfaceEvent::MoveEnd).expect("send");
        yield_now().await;
        advance(Duration::from_millis(499)).await;
        yield_now().await;
        assert!(matches!(viewports.try_recv(), Err(TryRecvError::Empty)));

        advance(Duration::from_millis(1)).await;
        yield_now().await;
        assert!(viewports.try_recv().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_leaves_a_pending_window_running() {
        let (events, mut viewports, _worker) = tracker_fixture();

        events.send(SurfaceEvent::MoveEnd).expect("send");
        yield_now().await;
        advance(Duration::from_millis(100)).await;
        yield_now().await;

        events.send(SurfaceEvent::Loaded).expect("send");
        yield_now().await;
        assert!(viewports.try_recv().is_ok(), "load emission");

        advance(Duration::from_millis(400)).await;
        yield_now().await;
        assert!(viewports.try_recv().is_ok(), "debounced emission");
    }

    #[tokio::test(start_paused = true)]
    async fn test_closing_events_stops_the_tracker() {
        let (events, mut viewports, worker) = tracker_fixture();

        events.send(SurfaceEvent::MoveEnd).expect("send");
        yield_now().await;
        drop(events);

        worker.await.expect("clean shutdown");
        // The pending window is discarded, nothing was emitted.
        assert!(matches!(viewports.try_recv(), Err(TryRecvError::Closed)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_quiet_period() {
        let (events, event_rx) = mpsc::unbounded_channel();
        let tracker = ViewportTracker::with_quiet_period(
            Arc::new(StaticSurface::cadiz()),
            event_rx,
            Duration::from_millis(50),
        );
        let mut viewports = tracker.subscribe();
        let _worker = tokio::spawn(tracker.run());

        events.send(SurfaceEvent::MoveEnd).expect("send");
        yield_now().await;
        advance(Duration::from_millis(50)).await;
        yield_now().await;

        assert!(viewports.try_recv().is_ok());
    }
}
