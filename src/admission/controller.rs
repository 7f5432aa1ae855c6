use super::channels::{ActiveChannelSet, ChannelHandle};
use crate::lo::{ListenerId, LoEvent, LocalOscillatorState};
use crate::planner::{plan, PlanOutcome};
use crate::types::{ChannelSpan, ConfigError, TunerConfig};
use parking_lot::Mutex;
use thiserror::Error;

/// Reasons an admission request is rejected. All are local, recoverable
/// outcomes; none of them leaves the registry or center frequency changed.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// The span is outside the device's absolute tunable range
    #[error("span {min_frequency} - {max_frequency} Hz is outside the device tuning range")]
    OutOfRange { min_frequency: u64, max_frequency: u64 },

    /// Dead zone aside, the span cannot be packed alongside the active
    /// channels within the usable bandwidth
    #[error("span {min_frequency} - {max_frequency} Hz does not fit the usable bandwidth alongside active channels")]
    InsufficientBandwidth { min_frequency: u64, max_frequency: u64 },

    /// Bandwidth fits but no center frequency clears the dead zone search
    #[error("no feasible center frequency for the requested channel set")]
    NoFeasibleCenter,

    /// An external collaborator failed after the plan was otherwise feasible
    #[error("downstream collaborator unavailable: {0}")]
    DownstreamUnavailable(String),
}

/// Applies a committed center frequency to the physical device.
///
/// Injected into the controller so planning stays free of device-specific
/// code. A failed apply rejects the admission and rolls the registry back.
pub trait HardwareApplier: Send {
    fn apply(&mut self, center_frequency: u64) -> anyhow::Result<()>;
}

/// Applier for tests and simulations with no physical device attached
#[derive(Debug, Default)]
pub struct NoopApplier;

impl HardwareApplier for NoopApplier {
    fn apply(&mut self, _center_frequency: u64) -> anyhow::Result<()> {
        Ok(())
    }
}

struct ControllerInner {
    lo: LocalOscillatorState,
    channels: ActiveChannelSet,
    applier: Box<dyn HardwareApplier>,
}

/// Admission entry point for one wideband device.
///
/// Owns the per-device allocation lock: admissions, releases and direct
/// state changes all run inside one critical section, so no caller ever
/// observes a half-updated registry or a center frequency inconsistent
/// with it. Shared across threads behind an `Arc`.
pub struct AdmissionController {
    inner: Mutex<ControllerInner>,
}

impl AdmissionController {
    /// Create a controller for a device. The configuration is validated
    /// once, here.
    pub fn new(
        config: TunerConfig,
        applier: Box<dyn HardwareApplier>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        log::info!(
            "tuner controller ready: range {} - {} Hz, {} Hz usable, dead zone {} Hz",
            config.min_frequency,
            config.max_frequency,
            config.usable_bandwidth(),
            config.dead_zone_half_width * 2
        );

        Ok(Self {
            inner: Mutex::new(ControllerInner {
                lo: LocalOscillatorState::from_config(&config),
                channels: ActiveChannelSet::new(),
                applier,
            }),
        })
    }

    /// Admit a channel span, retuning the device when required.
    ///
    /// Listeners observe the new center before this returns. On rejection
    /// the registry and the center frequency are exactly as they were.
    pub fn try_admit(&self, span: ChannelSpan) -> Result<ChannelHandle, AdmissionError> {
        self.inner.lock().admit(span)
    }

    /// Admit a span and run the caller's downstream pipeline factory inside
    /// the same critical section. A factory error releases the tentative
    /// channel and surfaces as `DownstreamUnavailable`; a center committed
    /// along the way stays, serving one channel fewer than planned.
    pub fn try_admit_with<T>(
        &self,
        span: ChannelSpan,
        build: impl FnOnce(&ChannelHandle) -> anyhow::Result<T>,
    ) -> Result<(ChannelHandle, T), AdmissionError> {
        let mut inner = self.inner.lock();
        let handle = inner.admit(span)?;

        match build(&handle) {
            Ok(value) => Ok((handle, value)),
            Err(e) => {
                inner.channels.remove(handle.id());
                log::warn!(
                    "downstream pipeline failed for channel {} - {} Hz: {}",
                    span.min_frequency,
                    span.max_frequency,
                    e
                );
                Err(AdmissionError::DownstreamUnavailable(e.to_string()))
            }
        }
    }

    /// Release an admitted channel. Unknown or already-released handles are
    /// a no-op. Never replans; the device keeps its extra margin until the
    /// next admission.
    pub fn release(&self, handle: &ChannelHandle) {
        let mut inner = self.inner.lock();
        if inner.channels.remove(handle.id()) {
            log::info!(
                "released channel {} - {} Hz, {} channel(s) remain",
                handle.span().min_frequency,
                handle.span().max_frequency,
                inner.channels.len()
            );
        } else {
            log::debug!("ignoring release of unknown channel handle");
        }
    }

    /// Current center frequency in Hz
    pub fn frequency(&self) -> u64 {
        self.inner.lock().lo.center_frequency()
    }

    /// Set the center frequency directly, bypassing admission planning.
    ///
    /// This is the hook for the hardware-facing layer to reflect a retune
    /// performed outside admission. The value is validated against the
    /// absolute range and broadcast; active channels are not revalidated.
    pub fn set_frequency(&self, frequency: u64) -> anyhow::Result<()> {
        self.inner.lock().lo.set_frequency(frequency)
    }

    /// Current correction offset in Hz
    pub fn frequency_correction(&self) -> i64 {
        self.inner.lock().lo.frequency_correction()
    }

    /// Update the correction offset. Takes the allocation lock for the
    /// write and the broadcast, never replans.
    pub fn set_frequency_correction(&self, correction: i64) {
        self.inner.lock().lo.set_frequency_correction(correction)
    }

    /// Device bandwidth in Hz
    pub fn bandwidth(&self) -> u64 {
        self.inner.lock().lo.bandwidth()
    }

    /// Change the device bandwidth. Refused while any channel is active,
    /// since admitted spans were planned against the current window.
    pub fn set_bandwidth(&self, bandwidth: u64) -> anyhow::Result<()> {
        let mut inner = self.inner.lock();
        if !inner.channels.is_empty() {
            anyhow::bail!(
                "cannot change bandwidth while {} channel(s) are active",
                inner.channels.len()
            );
        }
        inner.lo.set_bandwidth(bandwidth)
    }

    /// Bandwidth available for channel placement in Hz
    pub fn usable_bandwidth(&self) -> u64 {
        self.inner.lock().lo.usable_bandwidth()
    }

    /// Half-width of the dead zone in Hz
    pub fn dead_zone_half_width(&self) -> u64 {
        self.inner.lock().lo.dead_zone_half_width()
    }

    /// Lowest tunable frequency in Hz
    pub fn min_frequency(&self) -> u64 {
        self.inner.lock().lo.tuning_range().min_frequency
    }

    /// Highest tunable frequency in Hz
    pub fn max_frequency(&self) -> u64 {
        self.inner.lock().lo.tuning_range().max_frequency
    }

    /// Lower edge of the current usable window in Hz
    pub fn min_tuned(&self) -> u64 {
        self.inner.lock().lo.min_tuned()
    }

    /// Upper edge of the current usable window in Hz
    pub fn max_tuned(&self) -> u64 {
        self.inner.lock().lo.max_tuned()
    }

    /// Number of admitted channels
    pub fn channel_count(&self) -> usize {
        self.inner.lock().channels.len()
    }

    /// Snapshot of the admitted spans in ascending order
    pub fn active_spans(&self) -> Vec<ChannelSpan> {
        self.inner.lock().channels.spans().collect()
    }

    /// Whether the current center already serves the span without a retune
    pub fn is_tuned_for(&self, span: &ChannelSpan) -> bool {
        self.inner.lock().lo.is_tuned_for(span)
    }

    /// Register a listener for committed oscillator changes.
    ///
    /// Listeners run synchronously inside the allocation lock, in
    /// registration order, before the triggering call returns. They must
    /// not call back into the controller.
    pub fn add_frequency_listener(
        &self,
        listener: impl FnMut(&LoEvent) + Send + 'static,
    ) -> ListenerId {
        self.inner.lock().lo.add_listener(listener)
    }

    /// Remove a registered listener; false when the id is unknown
    pub fn remove_frequency_listener(&self, id: ListenerId) -> bool {
        self.inner.lock().lo.remove_listener(id)
    }
}

impl ControllerInner {
    fn admit(&mut self, span: ChannelSpan) -> Result<ChannelHandle, AdmissionError> {
        if span.min_frequency >= span.max_frequency
            || !self.lo.tuning_range().contains_span(&span)
        {
            log::warn!(
                "rejecting channel {} - {} Hz: outside tunable range",
                span.min_frequency,
                span.max_frequency
            );
            return Err(AdmissionError::OutOfRange {
                min_frequency: span.min_frequency,
                max_frequency: span.max_frequency,
            });
        }

        // Cheap pre-check against the pre-insertion extremes. An empty set
        // imposes no bandwidth constraint yet.
        if let Some((min_locked, max_locked)) = self.channels.extremes() {
            let usable = self.lo.usable_bandwidth();

            let nested = min_locked <= span.min_frequency && span.max_frequency <= max_locked;
            let extends_up = span.max_frequency > min_locked
                && span.max_frequency - min_locked <= usable;
            let extends_down = span.min_frequency < max_locked
                && max_locked - span.min_frequency <= usable;

            if !(nested || extends_up || extends_down) {
                log::warn!(
                    "rejecting channel {} - {} Hz: exceeds usable bandwidth of {} Hz",
                    span.min_frequency,
                    span.max_frequency,
                    usable
                );
                return Err(AdmissionError::InsufficientBandwidth {
                    min_frequency: span.min_frequency,
                    max_frequency: span.max_frequency,
                });
            }
        }

        let handle = self.channels.insert(span);

        if !self.requires_replan() {
            log::debug!(
                "channel {} - {} Hz served at current center {} Hz",
                span.min_frequency,
                span.max_frequency,
                self.lo.center_frequency()
            );
            return Ok(handle);
        }

        match plan(&self.channels, &self.lo) {
            PlanOutcome::Infeasible => {
                self.channels.remove(handle.id());
                log::warn!(
                    "rejecting channel {} - {} Hz: no feasible center frequency",
                    span.min_frequency,
                    span.max_frequency
                );
                Err(AdmissionError::NoFeasibleCenter)
            }
            PlanOutcome::Feasible(center) if center == self.lo.center_frequency() => {
                // The fresh plan landed on the current center; nothing to
                // retune or broadcast
                log::debug!(
                    "channel {} - {} Hz admitted, center {} Hz unchanged",
                    span.min_frequency,
                    span.max_frequency,
                    center
                );
                Ok(handle)
            }
            PlanOutcome::Feasible(center) => {
                if let Err(e) = self.applier.apply(center) {
                    self.channels.remove(handle.id());
                    log::error!("device retune to {} Hz failed: {}", center, e);
                    return Err(AdmissionError::DownstreamUnavailable(e.to_string()));
                }

                self.lo.commit_frequency(center);
                log::info!(
                    "admitted channel {} - {} Hz, center frequency now {} Hz",
                    span.min_frequency,
                    span.max_frequency,
                    center
                );
                Ok(handle)
            }
        }
    }

    /// A replan is due unless the current center already serves every
    /// admitted span, the tentative one included.
    fn requires_replan(&self) -> bool {
        !self.channels.spans().all(|span| self.lo.is_tuned_for(&span))
    }
}
