//! Center frequency planning for the admitted channel set.
//!
//! Given the channel registry (with a tentative span already inserted) and
//! the oscillator state, computes a center frequency that keeps every span
//! inside the usable window and strictly clear of the dead zone, or reports
//! that none exists. Pure computation; the admission controller holds the
//! allocation lock and commits the result.

use crate::admission::ActiveChannelSet;
use crate::lo::LocalOscillatorState;

/// Result of a planning pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanOutcome {
    /// A center frequency serving every admitted channel
    Feasible(u64),
    /// No center frequency can serve the current set
    Infeasible,
}

/// Compute a center frequency for the admitted channels.
///
/// One channel sits just above the dead zone tucked under its lower edge.
/// Multiple channels pack the highest one against the top of the usable
/// window, then the center walks upward past any channel the dead zone
/// lands on. Every accepted center is tunable and keeps the containment
/// and dead-zone invariants; anything else is `Infeasible`.
pub fn plan(channels: &ActiveChannelSet, lo: &LocalOscillatorState) -> PlanOutcome {
    let (min_locked, max_locked) = match channels.extremes() {
        Some(extremes) => extremes,
        // Nothing admitted constrains the center
        None => return PlanOutcome::Feasible(lo.center_frequency()),
    };

    let usable = lo.usable_bandwidth();
    let half = lo.usable_half_bandwidth();
    let dead_zone_half_width = lo.dead_zone_half_width();

    let candidate = if channels.len() == 1 {
        // Single channel: center just below it, dead zone ending flush at
        // the channel's lower edge
        match min_locked.checked_sub(dead_zone_half_width) {
            Some(candidate) => candidate,
            None => return PlanOutcome::Infeasible,
        }
    } else {
        // The full set must fit the window before any dead zone juggling
        if max_locked - min_locked > usable {
            log::debug!(
                "locked span of {} Hz exceeds usable bandwidth of {} Hz",
                max_locked - min_locked,
                usable
            );
            return PlanOutcome::Infeasible;
        }

        // Pack the highest channel at the top edge of the usable window
        let mut candidate = match max_locked.checked_sub(half) {
            Some(candidate) => candidate,
            None => return PlanOutcome::Infeasible,
        };

        if dead_zone_half_width > 0 {
            // Walk the dead zone upward past each channel it lands on. A
            // shift puts the zone's lower edge exactly on the conflict's
            // upper edge, and the zone only ever moves up, so each channel
            // conflicts at most once and the loop is bounded by the
            // channel count.
            loop {
                let zone_min = match candidate.checked_sub(dead_zone_half_width) {
                    Some(zone_min) => zone_min,
                    None => return PlanOutcome::Infeasible,
                };
                let zone_max = candidate.saturating_add(dead_zone_half_width);

                let conflict = channels
                    .spans()
                    .find(|span| span.overlaps(zone_min, zone_max));

                match conflict {
                    None => break,
                    Some(span) => {
                        // Overlap guarantees zone_min < span.max, so the
                        // shift is strictly positive
                        let adjustment = span.max_frequency - zone_min;
                        let shifted = candidate.saturating_add(adjustment);

                        // Shifting must not walk the lowest channel out of
                        // the bottom of the window
                        if shifted.saturating_sub(half) > min_locked {
                            log::debug!(
                                "shift past channel {}-{} Hz would drop {} Hz out of the window",
                                span.min_frequency,
                                span.max_frequency,
                                min_locked
                            );
                            return PlanOutcome::Infeasible;
                        }

                        candidate = shifted;
                    }
                }
            }
        }

        candidate
    };

    // A center the hardware cannot reach is no plan at all
    if !lo.tuning_range().contains(candidate) {
        log::debug!("candidate center {} Hz is outside the tunable range", candidate);
        return PlanOutcome::Infeasible;
    }

    // The window around the candidate must hold every channel
    if candidate.saturating_sub(half) > min_locked || candidate.saturating_add(half) < max_locked {
        log::debug!(
            "candidate center {} Hz cannot contain channels {}-{} Hz",
            candidate,
            min_locked,
            max_locked
        );
        return PlanOutcome::Infeasible;
    }

    log::debug!(
        "planned center {} Hz for {} channel(s)",
        candidate,
        channels.len()
    );
    PlanOutcome::Feasible(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChannelSpan, TunerConfig};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn test_state() -> LocalOscillatorState {
        LocalOscillatorState::from_config(&TunerConfig {
            min_frequency: 100_000_000,
            max_frequency: 200_000_000,
            bandwidth: 1_000_000,
            usable_bandwidth_fraction: 0.80,
            dead_zone_half_width: 6_000,
            initial_frequency: 100_000_000,
        })
    }

    fn set_of(spans: &[(u64, u64)]) -> ActiveChannelSet {
        let mut set = ActiveChannelSet::new();
        for (min, max) in spans {
            set.insert(ChannelSpan::new(*min, *max));
        }
        set
    }

    #[test]
    fn test_empty_set_keeps_current_center() {
        let lo = test_state();
        assert_eq!(
            plan(&ActiveChannelSet::new(), &lo),
            PlanOutcome::Feasible(100_000_000)
        );
    }

    #[test]
    fn test_single_channel_sits_above_dead_zone() {
        let lo = test_state();
        let channels = set_of(&[(150_100_000, 150_112_500)]);
        assert_eq!(plan(&channels, &lo), PlanOutcome::Feasible(150_094_000));
    }

    #[test]
    fn test_two_channels_pack_against_window_top() {
        let lo = test_state();
        let channels = set_of(&[(150_100_000, 150_112_500), (150_300_000, 150_312_500)]);
        // maxLocked - usable/2, with the dead zone landing below both spans
        assert_eq!(plan(&channels, &lo), PlanOutcome::Feasible(149_912_500));
    }

    #[test]
    fn test_dead_zone_shift_clears_conflicting_channel() {
        let lo = test_state();
        let channels = set_of(&[(149_700_000, 149_712_500), (150_100_000, 150_112_500)]);
        // Packing at 149,712,500 drops the zone onto the lower channel;
        // one 6,000 Hz shift leaves the zone flush against its upper edge
        assert_eq!(plan(&channels, &lo), PlanOutcome::Feasible(149_718_500));
    }

    #[test]
    fn test_shift_walking_lowest_channel_out_is_infeasible() {
        let lo = test_state();
        let channels = set_of(&[
            (149_700_000, 149_712_500),
            (150_090_000, 150_102_500),
            (150_486_500, 150_499_000),
        ]);
        // The middle channel forces a shift that would push the lowest one
        // below the window bottom
        assert_eq!(plan(&channels, &lo), PlanOutcome::Infeasible);
    }

    #[test]
    fn test_coverage_beyond_usable_bandwidth_is_infeasible() {
        let lo = test_state();
        let channels = set_of(&[(149_600_000, 149_612_500), (150_450_000, 150_462_500)]);
        assert_eq!(plan(&channels, &lo), PlanOutcome::Infeasible);
    }

    #[test]
    fn test_zero_dead_zone_accepts_packed_center() {
        let lo = LocalOscillatorState::from_config(&TunerConfig {
            min_frequency: 100_000_000,
            max_frequency: 200_000_000,
            bandwidth: 1_000_000,
            usable_bandwidth_fraction: 0.80,
            dead_zone_half_width: 0,
            initial_frequency: 100_000_000,
        });

        let single = set_of(&[(150_100_000, 150_112_500)]);
        assert_eq!(plan(&single, &lo), PlanOutcome::Feasible(150_100_000));

        let pair = set_of(&[(150_100_000, 150_112_500), (150_300_000, 150_312_500)]);
        assert_eq!(plan(&pair, &lo), PlanOutcome::Feasible(149_912_500));
    }

    #[test]
    fn test_channel_at_range_floor_is_infeasible() {
        let lo = test_state();
        // The placement rule would put the center below the tunable range
        let channels = set_of(&[(100_001_000, 100_013_500)]);
        assert_eq!(plan(&channels, &lo), PlanOutcome::Infeasible);
    }

    #[test]
    fn test_overwide_single_channel_is_infeasible() {
        let lo = test_state();
        // 500 kHz span cannot fit between the dead zone and the window top
        let channels = set_of(&[(150_000_000, 150_500_000)]);
        assert_eq!(plan(&channels, &lo), PlanOutcome::Infeasible);
    }

    #[test]
    fn test_feasible_plans_satisfy_invariants_on_random_sets() {
        let lo = test_state();
        let half = lo.usable_half_bandwidth();
        let zone_half = lo.dead_zone_half_width();
        let mut rng = StdRng::seed_from_u64(0x5EED);

        for _ in 0..500 {
            let mut channels = ActiveChannelSet::new();
            let count = rng.gen_range(1..=8);
            // Tight spreads exercise the shift loop, wide ones infeasibility
            let spread: u64 = if rng.gen_bool(0.5) { 250_000 } else { 1_500_000 };
            let base = rng.gen_range(100_000_000..=197_900_000);

            for _ in 0..count {
                let min = base + rng.gen_range(0..=spread);
                let width = rng.gen_range(5_000..=25_000);
                channels.insert(ChannelSpan::new(min, min + width));
            }

            // Termination: plan returns for every input
            if let PlanOutcome::Feasible(center) = plan(&channels, &lo) {
                assert!(lo.tuning_range().contains(center));
                for span in channels.spans() {
                    assert!(center - half <= span.min_frequency);
                    assert!(span.max_frequency <= center + half);
                    if zone_half > 0 {
                        assert!(!span.overlaps(center - zone_half, center + zone_half));
                    }
                }
            }
        }
    }
}
