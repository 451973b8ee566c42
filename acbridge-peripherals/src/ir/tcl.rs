use itertools::Itertools;

use acbridge_core::ac::{AcState, FanSpeed, Mode, Swing};

use super::{IrPulse, IrSequence};

pub const FRAME_LENGTH: usize = 14;

/// Marks and spaces per frame: leader pair, two pulses per bit, stop
/// mark plus trailing gap.
pub const SEQ_LENGTH: usize = 2 + FRAME_LENGTH * 8 * 2 + 2;

// timing in microseconds
const HDR_MARK: u64 = 3100;
const HDR_SPACE: u64 = 1600;
const BIT_MARK: u64 = 500;
const ONE_SPACE: u64 = 1050;
const ZERO_SPACE: u64 = 325;
const GAP: u64 = 10000;

const FRAME_BASE: [u8; FRAME_LENGTH] = [
    0x23, 0xcb, 0x26, 0x01, 0x00, 0x24, 0x03, 0x07, 0x40, 0x00, 0x00, 0x00, 0x00, 0x00,
];
const POWER_BIT: u8 = 0x04;

fn mode_code(mode: Mode) -> u8 {
    match mode {
        Mode::Auto => 8,
        Mode::Cool => 3,
        Mode::Heat => 1,
        Mode::Dry => 2,
    }
}

fn fan_code(fan: FanSpeed) -> u8 {
    match fan {
        FanSpeed::Auto => 0,
        FanSpeed::Low => 2,
        FanSpeed::Medium => 3,
        FanSpeed::High => 5,
    }
}

fn swing_code(swing: Swing) -> u8 {
    match swing {
        Swing::On => 7,
        Swing::Off => 0,
    }
}

/// Builds the remote frame for a state. Temperature is carried as an
/// offset from the protocol maximum, the last byte is an additive
/// checksum over the rest.
pub fn frame(state: &AcState) -> [u8; FRAME_LENGTH] {
    let mut frame = FRAME_BASE;
    if state.power() {
        frame[5] |= POWER_BIT;
    }
    frame[6] = (frame[6] & 0xf0) | mode_code(state.mode());
    frame[7] = 31 - state.temperature().get();
    frame[8] = fan_code(state.fan()) | (swing_code(state.swing()) << 3);
    frame[FRAME_LENGTH - 1] = checksum(&frame[..FRAME_LENGTH - 1]);
    frame
}

pub fn encode(state: &AcState) -> IrSequence {
    let mut code = Vec::with_capacity(SEQ_LENGTH);
    code.push(HDR_MARK);
    code.push(HDR_SPACE);
    for byte in frame(state) {
        let mut bits = byte;
        for _ in 0..8 {
            code.push(BIT_MARK);
            if (bits & 1) == 0 {
                code.push(ZERO_SPACE);
            } else {
                code.push(ONE_SPACE);
            }
            bits >>= 1;
        }
    }
    code.push(BIT_MARK);
    code.push(GAP);
    IrSequence(code.into_iter().map(IrPulse).collect())
}

fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

pub fn hex(frame: &[u8]) -> String {
    frame.iter().map(|b| format!("0x{:02X}", b)).join(", ")
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use strum::IntoEnumIterator;

    use acbridge_core::ac::Temperature;

    use super::*;

    #[test]
    fn all_temperature_frames_unique() {
        let mut all_frames: Vec<_> = (Temperature::MIN..=Temperature::MAX)
            .map(|t| {
                let mut state = AcState::new(true);
                state.set_temperature(Temperature::try_from(t as i64).unwrap());
                frame(&state)
            })
            .collect();
        assert_eq!(all_frames.len(), 16);
        all_frames.sort_unstable();
        all_frames.dedup();
        assert_eq!(all_frames.len(), 16);
    }

    #[test]
    fn all_mode_frames_carry_their_code() {
        for mode in Mode::iter() {
            let mut state = AcState::new(true);
            state.set_mode(mode);
            assert_eq!(frame(&state)[6] & 0x0f, mode_code(mode));
        }
    }

    #[test]
    fn fan_and_swing_share_a_byte() {
        let mut state = AcState::new(true);
        state.set_fan(FanSpeed::High);
        state.set_swing(Swing::On);
        assert_eq!(frame(&state)[8], 5 | (7 << 3));

        state.set_swing(Swing::Off);
        assert_eq!(frame(&state)[8], 5);
    }

    #[test]
    fn power_flips_a_single_bit() {
        let on = frame(&AcState::new(true));
        let off = frame(&AcState::new(false));
        assert_eq!(on[5] & POWER_BIT, POWER_BIT);
        assert_eq!(off[5] & POWER_BIT, 0);
        // everything but the power byte and the checksum is identical
        assert_eq!(on[..5], off[..5]);
        assert_eq!(on[6..FRAME_LENGTH - 1], off[6..FRAME_LENGTH - 1]);
    }

    #[test]
    fn last_byte_is_the_additive_checksum() {
        let frame = frame(&AcState::new(true));
        let sum = frame[..FRAME_LENGTH - 1]
            .iter()
            .fold(0u8, |acc, b| acc.wrapping_add(*b));
        assert_eq!(frame[FRAME_LENGTH - 1], sum);
    }

    #[test]
    fn encoded_sequence_has_the_expected_length() {
        let sequence = encode(&AcState::new(true));
        assert_eq!(sequence.as_ref().len(), SEQ_LENGTH);
        assert_eq!(sequence.as_ref()[0], IrPulse(HDR_MARK));
        assert_eq!(sequence.as_ref()[SEQ_LENGTH - 1], IrPulse(GAP));
    }

    #[test]
    fn bits_are_emitted_lsb_first() {
        let mut state = AcState::new(false);
        state.set_temperature(Temperature::try_from(31).unwrap());
        let sequence = encode(&state);
        // byte 0 is 0x23: bits 1,1,0,0,0,1,0,0 from the low end
        let spaces: Vec<u64> = sequence.as_ref()[2..18]
            .iter()
            .skip(1)
            .step_by(2)
            .map(|p| p.into_inner())
            .collect();
        assert_eq!(
            spaces,
            vec![
                ONE_SPACE, ONE_SPACE, ZERO_SPACE, ZERO_SPACE, ZERO_SPACE, ONE_SPACE, ZERO_SPACE,
                ZERO_SPACE
            ]
        );
    }
}
