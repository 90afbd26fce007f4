//! Triknob is [Embassy](https://embassy.dev)-based firmware for a small USB MIDI controller with three
//! potentiometers. The firmware runs on the [Nucleo-F767ZI development
//! board](https://www.st.com/en/evaluation-tools/nucleo-f767zi.html), which is powered by an F7-series
//! STM32 microcontroller.
//!
//! The pots are wired to the Arduino header's analog positions and sampled on a fixed cadence. Each reading
//! is smoothed and quantized to the 7-bit MIDI value range, and a Control Change message goes out only when
//! the quantized value changes, so bus traffic is bounded by knob movement rather than by the sampling rate.
//! All of that logic lives in [`triknob_lib`]; this crate is the hardware glue around it.

#![no_std]
#![no_main]

mod configuration;
mod sampler;

use crate::configuration::DEVICE_IDENTITY;
use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_stm32::{
    Config, bind_interrupts,
    adc::{Adc, AdcChannel, AnyAdcChannel, Resolution, SampleTime},
    peripherals::{self, ADC1},
    time::Hertz,
    usb,
};
use embassy_usb::{Builder, UsbDevice, class::midi::MidiClass};
use static_cell::StaticCell;
use triknob_lib::control_surface::{CONTROL_COUNT, ControlSurface};

#[cfg(feature = "panic-probe")]
use {defmt_rtt as _, panic_probe as _};
#[cfg(not(feature = "panic-probe"))]
use panic_halt as _;

bind_interrupts!(
    #[doc(hidden)]
    struct Irqs {
        OTG_FS => usb::InterruptHandler<peripherals::USB_OTG_FS>;
    }
);

type UsbDriver = usb::Driver<'static, peripherals::USB_OTG_FS>;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Initializing Triknob");

    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        // hse: high-speed external clock
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Bypass,
        });

        // pll: phase-locked loop, crucial for dividing clock
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL216,
            divp: Some(PllPDiv::DIV2), // 8mhz / 4 * 216 / 2 = 216Mhz
            // per section 5.2 of RM0410: most peripheral clocks are derived from their bus clock, but the 48MHz clock used for USB OTG FS
            // is derived from main PLL VCO (PLLQ clock) or PLLSAI VCO (PLLSAI clock)
            divq: Some(PllQDiv::DIV9), // 8mhz / 4 * 216 / 9 = 48Mhz
            divr: None,
        });
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
        config.rcc.sys = Sysclk::PLL1_P;
        config.rcc.mux.clk48sel = mux::Clk48sel::PLL1_Q;
    }
    let p = embassy_stm32::init(config);

    // One-time converter bring-up: 12-bit readings, with a sample time long enough to settle through the
    // pots' source impedance.
    let mut adc = Adc::new(p.ADC1);
    adc.set_resolution(Resolution::BITS12);
    adc.set_sample_time(SampleTime::CYCLES144);

    // The pots sit on the Arduino header's A0/A1/A2 positions.
    let pots: [AnyAdcChannel<ADC1>; CONTROL_COUNT] = [
        p.PA3.degrade_adc(),
        p.PC0.degrade_adc(),
        p.PC3.degrade_adc(),
    ];

    // Create the driver, from the HAL.
    static ENDPOINT_OUT_BUFFER: StaticCell<[u8; 256]> = StaticCell::new();
    let mut config = embassy_stm32::usb::Config::default();

    // The device is powered by the host it talks to, so vbus sensing isn't required; see docs on
    // `vbus_detection` for details.
    config.vbus_detection = false;

    let driver = usb::Driver::new_fs(
        p.USB_OTG_FS,
        Irqs,
        p.PA12,
        p.PA11,
        ENDPOINT_OUT_BUFFER.init([0; 256]),
        config,
    );

    // Create embassy-usb DeviceBuilder using the driver and config.
    // It needs some buffers for building the descriptors.
    static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();

    let mut builder = Builder::new(
        driver,
        DEVICE_IDENTITY.usb_config(),
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [], // no msos descriptors
        CONTROL_BUFFER.init([0; 64]),
    );

    // A single MIDI streaming interface; one virtual cable in each direction.
    let class = MidiClass::new(&mut builder, 1, 1, 64);

    let usb = builder.build();

    unwrap!(spawner.spawn(usb_task(usb)));
    info!("USB MIDI initialized");

    unwrap!(spawner.spawn(sampler::sampler(adc, pots, ControlSurface::new(), class)));
    info!("Sampling task started");
}

#[embassy_executor::task]
async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    usb.run().await
}
