//!  Pins    |     Function      |      Notes
//! ---------+-------------------+----------------------------------
//!   0- 15  | SW0..SW15         | Toggle switches (design inputs)
//!  16- 20  | BTNC/U/D/L/R      | Momentary push buttons
//!  21- 36  | LD0..LD15         | LEDs (design outputs)
//!  37-100  | SEG digit 0..7    | Seven-segment, 8 pins per digit (A..G, DP)
//! 101-124  | VGA R/G/B         | 8 bits per channel, MSB first
//! 125-127  | VGA sync          | HSYNC, VSYNC, BLANK_N
//! 128-129  | UART              | TX (design out), RX (design in)
//! 130-131  | PS/2              | CLK, DAT (keyboard to design)

/// Index of a pin in the registry.
pub type PinId = u16;

pub const NR_SWITCHES: usize = 16;
pub const NR_BUTTONS: usize = 5;
pub const NR_LEDS: usize = 16;
pub const NR_SEG_DIGITS: usize = 8;
pub const SEGS_PER_DIGIT: usize = 8;

const SW_BASE: u16 = 0;
const BTN_BASE: u16 = 16;
const LD_BASE: u16 = 21;
const SEG_BASE: u16 = 37;
const VGA_R_BASE: u16 = 101;
const VGA_G_BASE: u16 = 109;
const VGA_B_BASE: u16 = 117;

pub const VGA_HSYNC: PinId = 125;
pub const VGA_VSYNC: PinId = 126;
pub const VGA_BLANK_N: PinId = 127;
pub const UART_TX: PinId = 128;
pub const UART_RX: PinId = 129;
pub const PS2_CLK: PinId = 130;
pub const PS2_DAT: PinId = 131;

/// Total number of registry slots.
pub const NR_PINS: usize = 132;

pub const BTNC: PinId = BTN_BASE;
pub const BTNU: PinId = BTN_BASE + 1;
pub const BTND: PinId = BTN_BASE + 2;
pub const BTNL: PinId = BTN_BASE + 3;
pub const BTNR: PinId = BTN_BASE + 4;

/// 8-bit VGA red channel pins, MSB first.
pub const VGA_R: [PinId; 8] = vga_channel(VGA_R_BASE);
/// 8-bit VGA green channel pins, MSB first.
pub const VGA_G: [PinId; 8] = vga_channel(VGA_G_BASE);
/// 8-bit VGA blue channel pins, MSB first.
pub const VGA_B: [PinId; 8] = vga_channel(VGA_B_BASE);

const fn vga_channel(base: u16) -> [PinId; 8] {
    [
        base + 7,
        base + 6,
        base + 5,
        base + 4,
        base + 3,
        base + 2,
        base + 1,
        base,
    ]
}

/// Switch `i` (0..16).
pub fn sw(i: usize) -> PinId {
    assert!(i < NR_SWITCHES, "switch index {i} out of range");
    SW_BASE + i as u16
}

/// Push button `i` (0..5), in C/U/D/L/R order.
pub fn btn(i: usize) -> PinId {
    assert!(i < NR_BUTTONS, "button index {i} out of range");
    BTN_BASE + i as u16
}

/// LED `i` (0..16).
pub fn led(i: usize) -> PinId {
    assert!(i < NR_LEDS, "led index {i} out of range");
    LD_BASE + i as u16
}

/// Segment pin of a seven-segment digit. Segment order is A..G then DP, so
/// `seg(d, 0)` is segment A of digit `d`.
pub fn seg(digit: usize, segment: usize) -> PinId {
    assert!(digit < NR_SEG_DIGITS, "digit index {digit} out of range");
    assert!(segment < SEGS_PER_DIGIT, "segment index {segment} out of range");
    SEG_BASE + (digit * SEGS_PER_DIGIT + segment) as u16
}
