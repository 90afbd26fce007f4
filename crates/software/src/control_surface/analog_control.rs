//! Per-potentiometer state: a smoothing filter plus the last value the host has actually seen.

use super::smoothing::{Ema, quantize};
use wmidi::{ControlFunction, ControlValue, U7};

/// Tracks one potentiometer from raw reading to delivered Control Change value.
///
/// Detecting a change and recording its delivery are deliberately separate steps.
/// [`sample`][Self::sample] reports a change without recording it; only [`commit`][Self::commit] advances
/// the last-delivered value. A caller whose transport is down simply skips the commit, and the same change
/// is reported again on a later cycle instead of being lost.
#[derive(Debug)]
pub struct AnalogControl {
    /// The Control Change number this potentiometer reports as. Fixed at construction.
    control: ControlFunction,
    /// Smoothing filter fed by every raw reading.
    filter: Ema,
    /// The last quantized value delivered to the host.
    ///
    /// Starts at zero, which doubles as "nothing delivered yet": a pot resting at exactly zero stays
    /// silent until it moves away from the bottom of its travel.
    last_sent: ControlValue,
}

impl AnalogControl {
    /// A control at its power-on state, reporting as `control`.
    pub fn new(control: ControlFunction) -> Self {
        Self {
            control,
            filter: Ema::new(),
            last_sent: U7::from_u8_lossy(0),
        }
    }

    /// The Control Change number this potentiometer reports as.
    pub fn control(&self) -> ControlFunction {
        self.control
    }

    /// Feed one raw reading through the filter and compare against the last delivered value.
    ///
    /// Returns `Some` with the quantized value when it differs from what the host last saw, `None` when
    /// the host is already up to date. The filter state advances either way.
    pub fn sample(&mut self, raw: u16) -> Option<ControlValue> {
        let quantized = quantize(self.filter.update(raw));
        (quantized != self.last_sent).then_some(quantized)
    }

    /// Record that `value` reached the host.
    pub fn commit(&mut self, value: ControlValue) {
        self.last_sent = value;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AnalogControl {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "AnalogControl {{ control: {}, filtered: {}, last_sent: {} }}",
            u8::from(self.control),
            self.filter.value(),
            u8::from(self.last_sent)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_surface::ADC_FULL_SCALE;

    fn control() -> AnalogControl {
        AnalogControl::new(ControlFunction(U7::from_u8_lossy(1)))
    }

    #[test]
    fn reports_the_first_change_from_rest() {
        let mut control = control();
        assert_eq!(
            Some(U7::from_u8_lossy(31)),
            control.sample(ADC_FULL_SCALE),
            "Expected left but got right"
        );
    }

    #[test]
    fn zero_reading_at_power_on_stays_silent() {
        let mut control = control();
        assert_eq!(None, control.sample(0));
    }

    #[test]
    fn delivered_value_is_not_reported_again() {
        let mut control = control();
        let value = control.sample(ADC_FULL_SCALE).expect("full scale from rest should be a change");
        control.commit(value);

        // a reading near the current filter state leaves the quantized value where it was
        assert_eq!(None, control.sample(1024));
    }

    #[test]
    fn undelivered_change_is_reported_until_committed() {
        let mut control = control();
        let first = control.sample(ADC_FULL_SCALE).expect("full scale from rest should be a change");

        // the transport was down, so nothing was committed; the change shows up again next cycle
        assert_eq!(Some(first), control.sample(1024));

        control.commit(first);
        assert_eq!(None, control.sample(1024));
    }

    #[test]
    fn early_steps_match_the_filter_settling_curve() {
        let mut control = control();
        for expected in [31, 55, 73, 86] {
            let value = control.sample(ADC_FULL_SCALE).expect("filter is still climbing");
            assert_eq!(U7::from_u8_lossy(expected), value, "Expected left but got right");
            control.commit(value);
        }
    }

    #[test]
    fn climbs_to_full_scale_then_goes_quiet() {
        let mut control = control();
        let mut last_emitted = U7::from_u8_lossy(0);
        for _ in 0..100 {
            if let Some(value) = control.sample(ADC_FULL_SCALE) {
                assert!(last_emitted < value, "values only climb while the filter settles");
                control.commit(value);
                last_emitted = value;
            }
        }

        // the filter's f32 fixpoint sits just below full scale, so truncation tops out one step shy of 127
        assert_eq!(U7::from_u8_lossy(126), last_emitted, "Expected left but got right");

        for _ in 0..100 {
            assert_eq!(None, control.sample(ADC_FULL_SCALE));
        }
    }
}
