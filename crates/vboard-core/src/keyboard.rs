use std::collections::VecDeque;

use crate::pins;
use crate::registry::PinRegistry;

/// An 11-bit PS/2 frame being clocked out, plus the half-cycle phase.
struct FrameShifter {
    bits: u16,
    remaining: u8,
    clock_low: bool,
}

/// PS/2 keyboard device emulation.
///
/// The host feeds set-2 scancode bytes into the queue; the device serializes
/// them as 11-bit frames (start 0, 8 data bits LSB first, odd parity,
/// stop 1) on `PS2_CLK`/`PS2_DAT`. Data is placed on the line while the
/// clock is high and held through the falling edge, where the design samples
/// it. One board step advances one half clock cycle.
pub struct Keyboard {
    queue: VecDeque<u8>,
    shifter: Option<FrameShifter>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            shifter: None,
        }
    }

    /// Queue a raw scancode byte.
    pub fn push_scancode(&mut self, code: u8) {
        self.queue.push_back(code);
    }

    /// Queue the make or break sequence for a key. Break codes carry the
    /// 0xF0 prefix.
    pub fn push_key(&mut self, code: u8, pressed: bool) {
        if !pressed {
            self.queue.push_back(0xF0);
        }
        self.queue.push_back(code);
    }

    /// True when no frame is in flight and nothing is queued.
    pub fn is_idle(&self) -> bool {
        self.shifter.is_none() && self.queue.is_empty()
    }

    /// Advance the line by one half clock cycle.
    pub fn step(&mut self, pins: &PinRegistry) {
        if self.shifter.is_none() {
            let Some(code) = self.queue.pop_front() else {
                return;
            };
            self.shifter = Some(FrameShifter {
                bits: encode_frame(code),
                remaining: 11,
                clock_low: false,
            });
        }
        let Some(shifter) = self.shifter.as_mut() else {
            return;
        };

        if shifter.clock_low {
            // Falling edge: the design samples here.
            pins.write(pins::PS2_CLK, 0);
            shifter.bits >>= 1;
            shifter.remaining -= 1;
            shifter.clock_low = false;
            if shifter.remaining == 0 {
                self.shifter = None;
                // Release the line to its idle state.
                pins.write(pins::PS2_CLK, 1);
                pins.write(pins::PS2_DAT, 1);
            }
        } else {
            pins.write(pins::PS2_DAT, (shifter.bits & 1) as u8);
            pins.write(pins::PS2_CLK, 1);
            shifter.clock_low = true;
        }
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

/// start(0) + data LSB first + odd parity + stop(1), low bit shifted first.
fn encode_frame(code: u8) -> u16 {
    let parity = u16::from(code.count_ones() % 2 == 0);
    (u16::from(code) << 1) | (parity << 9) | (1 << 10)
}
