//! Encoding of Control Change messages as USB-MIDI Event Packets.
//!
//! USB-MIDI frames every MIDI event as a 32-bit packet: a header byte carrying the virtual cable number
//! and a Code Index Number classifying the event, followed by the MIDI bytes themselves.

use wmidi::{Channel, ControlFunction, ControlValue, MidiMessage};

/// The virtual cable all traffic goes out on. The device exposes a single MIDI port.
pub const CABLE: u8 = 0;

/// Code Index Number for a three-byte Control Change event.
const CIN_CONTROL_CHANGE: u8 = 0xB;

/// Render a Control Change as the 4-byte USB-MIDI Event Packet a host expects.
pub fn control_change_packet(
    channel: Channel,
    control: ControlFunction,
    value: ControlValue,
) -> [u8; 4] {
    let mut packet = [(CABLE << 4) | CIN_CONTROL_CHANGE, 0, 0, 0];
    // a Control Change always renders as exactly three bytes, so the tail of the packet fits it
    MidiMessage::ControlChange(channel, control, value)
        .copy_to_slice(&mut packet[1..])
        .unwrap();
    packet
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmidi::U7;

    #[test]
    fn packet_is_bit_exact() {
        let packet = control_change_packet(
            Channel::Ch1,
            ControlFunction(U7::from_u8_lossy(2)),
            U7::from_u8_lossy(64),
        );
        assert_eq!([0x0B, 0xB0, 0x02, 0x40], packet, "Expected left but got right");
    }

    #[test]
    fn status_byte_carries_the_channel() {
        let packet = control_change_packet(
            Channel::Ch16,
            ControlFunction(U7::from_u8_lossy(1)),
            U7::from_u8_lossy(0),
        );
        assert_eq!(0xBF, packet[1]);
    }
}
