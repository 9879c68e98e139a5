use std::collections::VecDeque;

use vboard_core::board::Board;
use vboard_core::pins::{
    self, NR_BUTTONS, NR_LEDS, NR_SEG_DIGITS, NR_SWITCHES, SEGS_PER_DIGIT, PinId,
};
use vboard_core::registry::{SignalRef, signal};

/// Seven-segment patterns for hex digits, bit 7 = segment A down to
/// bit 1 = segment G, bit 0 = decimal point (off).
const SEG_HEX: [u8; 16] = [
    0xFC, 0x60, 0xDA, 0xF2, 0x66, 0xB6, 0xBE, 0xE0, 0xFE, 0xF6, 0xEE, 0x3E, 0x9C, 0x7A, 0x9E, 0x8E,
];

const GREETING: &[u8] = b"hello from vboard\r\n";
const GREETING_PERIOD: u64 = 2_000_000;

/// Built-in demo design.
///
/// Stands in for a real simulated circuit: a free-running counter shows on
/// the LEDs (XORed with the switches) and in hex on the seven-segment
/// display, the center button resets it, the VGA color pins sweep a test
/// pattern, and a greeting is shifted out on the UART TX line every few
/// million cycles. One `step` call is one cycle of the simulated clock.
pub struct Demo {
    counter: u64,
    switches: SignalRef,
    buttons: SignalRef,
    leds: SignalRef,
    segs: Vec<SignalRef>,
    rgb: SignalRef,
    uart_tx: SignalRef,
    tx_queue: VecDeque<u8>,
    tx_frame: u16,
    tx_bits_left: u8,
    tx_bit_cnt: i32,
    bit_period: i32,
}

impl Demo {
    /// Wire the demo's signals to the board pins.
    pub fn new(board: &mut Board) -> Self {
        let switches = signal(0);
        let buttons = signal(0);
        let leds = signal(0);
        let rgb = signal(0);
        let uart_tx = signal(1); // UART line idles high
        let vga_ctl = signal(0b111); // HSYNC, VSYNC, BLANK_N all high

        // Highest-numbered pin first, so SW15/LD15 carry the MSB.
        let sw_ids: Vec<PinId> = (0..NR_SWITCHES).rev().map(pins::sw).collect();
        board.bind_pin(&switches, &sw_ids);
        let btn_ids: Vec<PinId> = (0..NR_BUTTONS).map(pins::btn).collect();
        board.bind_pin(&buttons, &btn_ids);
        let led_ids: Vec<PinId> = (0..NR_LEDS).rev().map(pins::led).collect();
        board.bind_pin(&leds, &led_ids);

        let mut segs = Vec::with_capacity(NR_SEG_DIGITS);
        for d in 0..NR_SEG_DIGITS {
            let sig = signal(0);
            let ids: Vec<PinId> = (0..SEGS_PER_DIGIT).map(|s| pins::seg(d, s)).collect();
            board.bind_pin(&sig, &ids);
            segs.push(sig);
        }

        let mut color_ids: Vec<PinId> = Vec::new();
        color_ids.extend_from_slice(&pins::VGA_R);
        color_ids.extend_from_slice(&pins::VGA_G);
        color_ids.extend_from_slice(&pins::VGA_B);
        board.bind_pin(&rgb, &color_ids);
        board.bind_pin(
            &vga_ctl,
            &[pins::VGA_HSYNC, pins::VGA_VSYNC, pins::VGA_BLANK_N],
        );

        board.bind_pin(&uart_tx, &[pins::UART_TX]);

        let bit_period = board.uart_divisor();
        Self {
            counter: 0,
            switches,
            buttons,
            leds,
            segs,
            rgb,
            uart_tx,
            tx_queue: VecDeque::new(),
            tx_frame: 0,
            tx_bits_left: 0,
            tx_bit_cnt: bit_period - 1,
            bit_period,
        }
    }

    /// One simulated clock cycle.
    pub fn step(&mut self) {
        // BTNC (first bound id, MSB of the button vector) resets the count.
        if self.buttons.get() >> (NR_BUTTONS - 1) & 1 != 0 {
            self.counter = 0;
        }
        self.counter += 1;

        let count = (self.counter >> 16) as u16;
        self.leds.set(u64::from(count ^ self.switches.get() as u16));

        if self.counter & 0xFFFF == 0 {
            let shown = self.counter >> 16;
            for (d, sig) in self.segs.iter().enumerate() {
                let nibble = (shown >> ((NR_SEG_DIGITS - 1 - d) * 4)) & 0xF;
                sig.set(u64::from(SEG_HEX[nibble as usize]));
            }
        }

        self.rgb
            .set(u64::from((self.counter as u32).wrapping_mul(0x01_02_03) & 0xFF_FF_FF));

        if self.counter % GREETING_PERIOD == 0 {
            self.tx_queue.extend(GREETING);
        }
        self.uart_step();
    }

    /// Shift the queued UART bytes out at one bit per divisor period,
    /// matching the rate the board samples the TX pin at.
    fn uart_step(&mut self) {
        self.tx_bit_cnt -= 1;
        if self.tx_bit_cnt >= 0 {
            return;
        }
        self.tx_bit_cnt = self.bit_period - 1;

        if self.tx_bits_left == 0 {
            match self.tx_queue.pop_front() {
                Some(byte) => {
                    // start(0) + data LSB first + stop(1)
                    self.tx_frame = (u16::from(byte) << 1) | (1 << 9);
                    self.tx_bits_left = 10;
                }
                None => {
                    self.uart_tx.set(1);
                    return;
                }
            }
        }

        self.uart_tx.set(u64::from(self.tx_frame & 1));
        self.tx_frame >>= 1;
        self.tx_bits_left -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vboard_core::board::{Board, NullView, TARGET_FPS};
    use vboard_core::pacer::WallClock;

    struct JumpClock {
        now: u64,
    }

    impl WallClock for JumpClock {
        fn now_micros(&mut self) -> u64 {
            self.now += 1_000_000 / TARGET_FPS as u64 + 1;
            self.now
        }
    }

    #[test]
    fn greeting_arrives_over_the_uart() {
        let mut board = Board::with_clock(1, TARGET_FPS, Box::new(JumpClock { now: 0 }));
        let mut demo = Demo::new(&mut board);
        let mut view = NullView;

        let mut received = Vec::new();
        let mut steps = 0u64;
        while received.len() < GREETING.len() {
            demo.step();
            board.step(&mut view);
            received.extend(board.uart.take_output());
            steps += 1;
            assert!(steps < 3 * GREETING_PERIOD, "no greeting after {steps} steps");
        }
        assert_eq!(&received[..GREETING.len()], GREETING);
    }

    #[test]
    fn center_button_resets_the_counter() {
        let mut board = Board::with_clock(1, TARGET_FPS, Box::new(JumpClock { now: 0 }));
        let mut demo = Demo::new(&mut board);
        let mut view = NullView;

        for _ in 0..0x2_0000 {
            demo.step();
            board.step(&mut view);
        }
        // Two carry-outs into the LED range by now: LD1 is lit.
        assert_eq!(board.pins.read(pins::led(1)), 1);

        board.pins.write(pins::BTNC, 1);
        demo.step();
        board.pins.write(pins::BTNC, 0);
        for _ in 0..0x1_0000 {
            demo.step();
        }
        // Counter restarted: only LD0 can be lit this soon after the reset.
        assert_eq!(board.pins.read(pins::led(1)), 0);
        assert_eq!(board.pins.read(pins::led(0)), 1);
    }
}
