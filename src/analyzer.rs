//! Public facade: attaches/detaches a transport, exposes the current
//! levels, and lets observers subscribe to change events.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

use tokio::task::JoinHandle;

use crate::{
    config::AnalyzerConfig,
    driver::{Driver, TickOutcome},
    emitter::{EventHandlers, SubscriptionId},
    error::AnalyzerError,
    model::{MediaKind, PeerDirection, QualityLevel, TransportState},
    stats::StatsSource,
};

/// State held while a transport is attached.
struct AttachedState {
    source: Arc<dyn StatsSource>,
    driver: Driver,
    /// Bumped on every transport transition out of the connected set (in
    /// addition to on attach); in-flight `read_stats()` results captured
    /// under a stale value are dropped, never applied.
    transition_epoch: u64,
}

struct Inner {
    config: AnalyzerConfig,
    state: Mutex<Option<AttachedState>>,
    task: Mutex<Option<JoinHandle<()>>>,
    epoch_seq: AtomicU64,
    quality_audio: EventHandlers<QualityLevel>,
    quality_video: EventHandlers<QualityLevel>,
    stats_audio: EventHandlers<()>,
    stats_video: EventHandlers<()>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.task.lock().unwrap().take() {
            handle.abort();
        }
    }
}

impl Inner {
    fn next_epoch(&self) -> u64 {
        self.epoch_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn level(&self, kind: MediaKind) -> QualityLevel {
        match self.state.lock().unwrap().as_ref() {
            Some(attached) => attached.driver.level(kind),
            None => QualityLevel::Unknown,
        }
    }

    /// Called from whatever thread the transport notifies on. Resets
    /// the driver silently when the transport leaves the connected set;
    /// does nothing special when it (re)enters it — the next tick will
    /// simply find `read_stats` callable again.
    fn on_transport_state_change(
        self: &Arc<Self>,
        new_state: TransportState,
    ) {
        let mut state = self.state.lock().unwrap();
        if let Some(attached) = state.as_mut() {
            if !new_state.is_analyzable() {
                attached.transition_epoch = self.next_epoch();
                attached.driver.reset(attached.transition_epoch);
                log::info!(
                    "connection quality analysis paused: transport state is \
                     no longer connected ({:?})",
                    new_state,
                );
            }
        }
    }

    fn attach(
        self: &Arc<Self>,
        source: Arc<dyn StatsSource>,
        direction: PeerDirection,
    ) {
        if let Some(handle) = self.task.lock().unwrap().take() {
            handle.abort();
        }

        let transition_epoch = self.next_epoch();
        *self.state.lock().unwrap() = Some(AttachedState {
            source: Arc::clone(&source),
            driver: Driver::new(direction, &self.config),
            transition_epoch,
        });

        let weak_for_state_change = Arc::downgrade(self);
        source.on_state_change(Box::new(move |new_state| {
            if let Some(this) = weak_for_state_change.upgrade() {
                this.on_transport_state_change(new_state);
            }
        }));

        let weak_for_loop = Arc::downgrade(self);
        let period = self.config.tick_period;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval
                .set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match weak_for_loop.upgrade() {
                    Some(this) => this.tick().await,
                    None => return,
                }
            }
        });
        *self.task.lock().unwrap() = Some(handle);
        log::info!("connection quality analyzer attached ({:?})", direction);
    }

    fn detach(self: &Arc<Self>) {
        let had_attachment = self.state.lock().unwrap().take().is_some();
        if !had_attachment {
            return;
        }
        if let Some(handle) = self.task.lock().unwrap().take() {
            handle.abort();
        }
        log::info!("connection quality analyzer detached");
    }

    async fn tick(self: &Arc<Self>) {
        let (source, transition_epoch) = {
            let state = self.state.lock().unwrap();
            let attached = match state.as_ref() {
                Some(attached) => attached,
                None => return,
            };
            if !attached.source.state().is_analyzable() {
                return;
            }
            (Arc::clone(&attached.source), attached.transition_epoch)
        };

        let read_result = source.read_stats().await;

        let outcome = {
            let mut state = self.state.lock().unwrap();
            let attached = match state.as_mut() {
                Some(attached) if attached.transition_epoch == transition_epoch => {
                    attached
                }
                _ => return,
            };

            let snapshot = match &read_result {
                Ok(records) => Some(records.as_slice()),
                Err(err) => {
                    log::warn!(
                        "transient connection-quality stats read failure: {}",
                        err
                    );
                    None
                }
            };

            attached.driver.advance(snapshot)
        };

        self.dispatch_tick_outcome(outcome);
    }

    fn dispatch_tick_outcome(&self, outcome: TickOutcome) {
        for result in outcome.results {
            let (quality_handlers, stats_handlers) = match result.kind {
                MediaKind::Audio => (&self.quality_audio, &self.stats_audio),
                MediaKind::Video => (&self.quality_video, &self.stats_video),
            };
            if result.changed {
                if result.level == QualityLevel::NoTransmittedData {
                    log::warn!(
                        "{:?} channel dropped to NoTransmittedData",
                        result.kind
                    );
                }
                quality_handlers.dispatch(result.level);
            }
            stats_handlers.dispatch(());
        }
    }
}

/// Periodic sampler that classifies the perceived quality of a live
/// media transport into an ordered [`QualityLevel`] per
/// (direction × media-kind) channel.
///
/// Inert until [`Self::set_peer_connection`] attaches a
/// [`StatsSource`]. Cheaply cloneable — every clone refers to the same
/// underlying analyzer.
#[derive(Clone)]
pub struct ConnectionQualityAnalyzer(Arc<Inner>);

impl Default for ConnectionQualityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionQualityAnalyzer {
    /// Constructs an analyzer with the default 1 Hz / N=5 calibration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    /// Constructs an analyzer with a custom [`AnalyzerConfig`]. Production
    /// callers should use [`Self::new`]; this exists for deterministic
    /// tests that want a shorter tick period.
    #[must_use]
    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self(Arc::new(Inner {
            config,
            state: Mutex::new(None),
            task: Mutex::new(None),
            epoch_seq: AtomicU64::new(0),
            quality_audio: EventHandlers::new(),
            quality_video: EventHandlers::new(),
            stats_audio: EventHandlers::new(),
            stats_video: EventHandlers::new(),
        }))
    }

    /// Attaches or detaches a transport. `None` detaches: resets all
    /// channel state, cancels any pending read, and emits no residual
    /// events. Calling with `None` while already detached is a no-op.
    ///
    /// Attaching while already attached replaces the previous
    /// attachment (starting a fresh epoch and warmup phase) rather than
    /// erroring; see [`Self::try_set_peer_connection`] for the strict
    /// variant.
    pub fn set_peer_connection(
        &self,
        source: Option<Arc<dyn StatsSource>>,
        direction: PeerDirection,
    ) {
        match source {
            Some(source) => self.0.attach(source, direction),
            None => self.0.detach(),
        }
    }

    /// Like [`Self::set_peer_connection`] for the attach case, but
    /// returns [`AnalyzerError::AlreadyAttached`] instead of replacing
    /// an existing attachment.
    pub fn try_set_peer_connection(
        &self,
        source: Arc<dyn StatsSource>,
        direction: PeerDirection,
    ) -> Result<(), AnalyzerError> {
        if self.0.state.lock().unwrap().is_some() {
            return Err(AnalyzerError::AlreadyAttached);
        }
        self.0.attach(source, direction);
        Ok(())
    }

    /// Current audio channel level for the attached direction, or
    /// [`QualityLevel::Unknown`] if no transport is attached.
    #[must_use]
    pub fn connection_quality_audio(&self) -> QualityLevel {
        self.0.level(MediaKind::Audio)
    }

    /// Current video channel level for the attached direction, or
    /// [`QualityLevel::Unknown`] if no transport is attached.
    #[must_use]
    pub fn connection_quality_video(&self) -> QualityLevel {
        self.0.level(MediaKind::Video)
    }

    /// Subscribes to audio quality-change events. Fires only when the
    /// emitted level differs from the previous one.
    pub fn on_quality_changed_audio(
        &self,
        handler: impl Fn(QualityLevel) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.0.quality_audio.subscribe(handler)
    }

    pub fn off_quality_changed_audio(&self, id: SubscriptionId) {
        self.0.quality_audio.unsubscribe(id);
    }

    /// Subscribes to video quality-change events.
    pub fn on_quality_changed_video(
        &self,
        handler: impl Fn(QualityLevel) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.0.quality_video.subscribe(handler)
    }

    pub fn off_quality_changed_video(&self, id: SubscriptionId) {
        self.0.quality_video.unsubscribe(id);
    }

    /// Subscribes to audio stats-updated events, fired on every
    /// successful tick regardless of whether the level changed.
    pub fn on_stats_updated_audio(
        &self,
        handler: impl Fn() + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.0.stats_audio.subscribe(move |()| handler())
    }

    pub fn off_stats_updated_audio(&self, id: SubscriptionId) {
        self.0.stats_audio.unsubscribe(id);
    }

    /// Subscribes to video stats-updated events.
    pub fn on_stats_updated_video(
        &self,
        handler: impl Fn() + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.0.stats_video.subscribe(move |()| handler())
    }

    pub fn off_stats_updated_video(&self, id: SubscriptionId) {
        self.0.stats_video.unsubscribe(id);
    }
}
