use wmidi::{Channel, ControlFunction, U7};

mod analog_control;
pub use analog_control::*;

mod smoothing;
pub use smoothing::*;

/// The MIDI channel every Control Change goes out on.
pub const MIDI_CHANNEL: Channel = Channel::Ch1;

/// Number of potentiometers on the device.
pub const CONTROL_COUNT: usize = 3;

/// Control Change numbers assigned to the pots, in sampling order.
const CC_ASSIGNMENTS: [u8; CONTROL_COUNT] = [1, 2, 3];

/// The fixed set of analog controls the device exposes.
///
/// Exactly [`CONTROL_COUNT`] controls exist for the lifetime of the process. The surface is built once at
/// startup and owned by the sampling loop, which walks the controls in array order every cycle so that bus
/// traffic is deterministic.
pub struct ControlSurface {
    controls: [AnalogControl; CONTROL_COUNT],
}

impl ControlSurface {
    /// A surface with every control at its power-on state.
    pub fn new() -> Self {
        Self {
            controls: CC_ASSIGNMENTS
                .map(|cc| AnalogControl::new(ControlFunction(U7::from_u8_lossy(cc)))),
        }
    }

    /// The controls, in the fixed order they are sampled.
    pub fn controls_mut(&mut self) -> &mut [AnalogControl; CONTROL_COUNT] {
        &mut self.controls
    }
}

impl Default for ControlSurface {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_consecutive_control_numbers() {
        let mut surface = ControlSurface::new();
        let mut expected = 1;
        for control in surface.controls_mut() {
            assert_eq!(expected, u8::from(control.control()));
            expected += 1;
        }
    }

    #[test]
    fn controls_are_independent() {
        let mut surface = ControlSurface::new();
        let [first, second, third] = surface.controls_mut();

        let value = first.sample(ADC_FULL_SCALE).expect("full scale from rest should be a change");
        first.commit(value);

        // the other controls are still at rest, so a zero reading produces nothing
        assert_eq!(None, second.sample(0));
        assert_eq!(None, third.sample(0));
    }
}
