use super::listener::{ListenerId, ListenerRegistry, LoEvent};
use crate::types::{ChannelSpan, TunerConfig, TuningRange};

/// Oscillator state for a single wideband device: center frequency,
/// correction offset, bandwidth and the usable window derived from them.
///
/// Carries no lock of its own; the admission controller guards it. Reads
/// are public, writes go through the controller's critical section.
#[derive(Debug)]
pub struct LocalOscillatorState {
    center_frequency: u64,
    frequency_correction: i64,
    bandwidth: u64,
    usable_bandwidth_fraction: f64,
    dead_zone_half_width: u64,
    tuning_range: TuningRange,
    listeners: ListenerRegistry,
}

impl LocalOscillatorState {
    /// Build the initial state from a validated configuration
    pub fn from_config(config: &TunerConfig) -> Self {
        Self {
            center_frequency: config.initial_frequency,
            frequency_correction: 0,
            bandwidth: config.bandwidth,
            usable_bandwidth_fraction: config.usable_bandwidth_fraction,
            dead_zone_half_width: config.dead_zone_half_width,
            tuning_range: config.tuning_range(),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Current center frequency in Hz
    pub fn center_frequency(&self) -> u64 {
        self.center_frequency
    }

    /// Current correction offset in Hz
    pub fn frequency_correction(&self) -> i64 {
        self.frequency_correction
    }

    /// Device bandwidth in Hz
    pub fn bandwidth(&self) -> u64 {
        self.bandwidth
    }

    /// Half-width of the forbidden zone around the center in Hz
    pub fn dead_zone_half_width(&self) -> u64 {
        self.dead_zone_half_width
    }

    /// Absolute tunable bounds of the device
    pub fn tuning_range(&self) -> TuningRange {
        self.tuning_range
    }

    /// Bandwidth available for channel placement in Hz (rounded down)
    pub fn usable_bandwidth(&self) -> u64 {
        (self.bandwidth as f64 * self.usable_bandwidth_fraction) as u64
    }

    /// Half of the usable bandwidth in Hz
    pub fn usable_half_bandwidth(&self) -> u64 {
        self.usable_bandwidth() / 2
    }

    /// Lower edge of the usable window in Hz
    pub fn min_tuned(&self) -> u64 {
        self.center_frequency
            .saturating_sub(self.usable_half_bandwidth())
    }

    /// Upper edge of the usable window in Hz
    pub fn max_tuned(&self) -> u64 {
        self.center_frequency
            .saturating_add(self.usable_half_bandwidth())
    }

    /// The forbidden interval around the center, or None when disabled
    pub fn dead_zone(&self) -> Option<(u64, u64)> {
        if self.dead_zone_half_width == 0 {
            return None;
        }
        Some((
            self.center_frequency.saturating_sub(self.dead_zone_half_width),
            self.center_frequency.saturating_add(self.dead_zone_half_width),
        ))
    }

    /// Check whether the usable window contains the span (edges included)
    pub fn covers(&self, span: &ChannelSpan) -> bool {
        self.min_tuned() <= span.min_frequency && span.max_frequency <= self.max_tuned()
    }

    /// Check whether the current center already serves a span: inside the
    /// usable window with positive clearance from the dead zone. A span
    /// touching a zone edge is servable but flagged for fresh planning on
    /// the next admission, so it does not count as served here.
    pub fn is_tuned_for(&self, span: &ChannelSpan) -> bool {
        if !self.covers(span) {
            return false;
        }
        match self.dead_zone() {
            None => true,
            Some((zone_min, zone_max)) => span.clears(zone_min, zone_max),
        }
    }

    /// Set the center frequency directly, outside of admission planning.
    /// Rejects frequencies the hardware cannot tune.
    pub(crate) fn set_frequency(&mut self, frequency: u64) -> anyhow::Result<()> {
        if !self.tuning_range.contains(frequency) {
            anyhow::bail!(
                "frequency {} Hz is outside the tunable range ({} - {} Hz)",
                frequency,
                self.tuning_range.min_frequency,
                self.tuning_range.max_frequency
            );
        }

        self.center_frequency = frequency;
        log::info!("center frequency set to {} Hz", frequency);
        self.broadcast(LoEvent::FrequencyChanged(frequency));
        Ok(())
    }

    /// Commit a planned center frequency. The planner has already checked
    /// the value against the tuning range.
    pub(crate) fn commit_frequency(&mut self, frequency: u64) {
        self.center_frequency = frequency;
        log::debug!("committed planned center frequency {} Hz", frequency);
        self.broadcast(LoEvent::FrequencyChanged(frequency));
    }

    /// Update the correction offset. Never touches the channel registry.
    pub(crate) fn set_frequency_correction(&mut self, correction: i64) {
        self.frequency_correction = correction;
        log::debug!("frequency correction set to {} Hz", correction);
        self.broadcast(LoEvent::CorrectionChanged(correction));
    }

    /// Change the device bandwidth. The controller refuses this while
    /// channels are active.
    pub(crate) fn set_bandwidth(&mut self, bandwidth: u64) -> anyhow::Result<()> {
        if bandwidth == 0 {
            anyhow::bail!("bandwidth must be greater than zero");
        }

        self.bandwidth = bandwidth;
        log::info!(
            "bandwidth set to {} Hz ({} Hz usable)",
            bandwidth,
            self.usable_bandwidth()
        );
        self.broadcast(LoEvent::BandwidthChanged(bandwidth));
        Ok(())
    }

    pub(crate) fn add_listener(
        &mut self,
        listener: impl FnMut(&LoEvent) + Send + 'static,
    ) -> ListenerId {
        self.listeners.add(listener)
    }

    pub(crate) fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn broadcast(&mut self, event: LoEvent) {
        self.listeners.notify(&event);
    }
}
