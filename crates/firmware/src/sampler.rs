//! The periodic task that drives the whole pipeline: read each pot, smooth, and report changes to the host.

use crate::UsbDriver;
use defmt::{debug, info, panic};
use embassy_stm32::{
    adc::{Adc, AnyAdcChannel},
    peripherals::ADC1,
};
use embassy_time::{Duration, Ticker};
use embassy_usb::{class::midi::MidiClass, driver::EndpointError};
use triknob_lib::{
    control_surface::{AnalogControl, CONTROL_COUNT, ControlSurface, MIDI_CHANNEL},
    usb_midi,
};
use wmidi::ControlValue;

/// Interval between sampling sweeps. Each sweep reads every pot once, in a fixed order.
const SAMPLE_PERIOD: Duration = Duration::from_millis(10);

/// Samples every control on a fixed cadence and reports quantized changes to the host.
///
/// A change that cannot be delivered because no host is listening is left uncommitted, so it is detected
/// and delivered again on a later sweep once the endpoint comes back.
#[embassy_executor::task]
pub async fn sampler(
    mut adc: Adc<'static, ADC1>,
    mut pots: [AnyAdcChannel<ADC1>; CONTROL_COUNT],
    mut surface: ControlSurface,
    mut class: MidiClass<'static, UsbDriver>,
) -> ! {
    let mut ticker = Ticker::every(SAMPLE_PERIOD);
    let mut connected = false;
    loop {
        ticker.next().await;
        for (control, pot) in surface.controls_mut().iter_mut().zip(&mut pots) {
            let raw = adc.blocking_read(pot);
            let Some(value) = control.sample(raw) else {
                continue;
            };
            match deliver(&mut class, control, value).await {
                Ok(()) => {
                    if !connected {
                        info!("USB host connected");
                        connected = true;
                    }
                    control.commit(value);
                }
                Err(Disconnected {}) => {
                    if connected {
                        info!("USB host disconnected");
                        connected = false;
                    }
                }
            }
        }
    }
}

/// Helper function to render a single Control Change and hand it to the USB stack.
async fn deliver(
    class: &mut MidiClass<'static, UsbDriver>,
    control: &AnalogControl,
    value: ControlValue,
) -> Result<(), Disconnected> {
    let packet = usb_midi::control_change_packet(MIDI_CHANNEL, control.control(), value);
    class.write_packet(&packet).await?;
    debug!("Sent CC {}: {}", u8::from(control.control()), u8::from(value));
    Ok(())
}

#[doc(hidden)]
struct Disconnected {}

impl From<EndpointError> for Disconnected {
    fn from(val: EndpointError) -> Self {
        match val {
            EndpointError::BufferOverflow => panic!("Buffer overflow"),
            EndpointError::Disabled => Disconnected {},
        }
    }
}
