use vboard_core::board::{Board, HostInput, View};
use vboard_core::pins::{self, NR_BUTTONS, NR_LEDS, NR_SEG_DIGITS, NR_SWITCHES, SEGS_PER_DIGIT};
use vboard_core::vga::{VGA_HEIGHT, VGA_WIDTH};

/// Logical frame size: the VGA area with the widget panel below it.
pub const WIDTH: usize = VGA_WIDTH;
pub const HEIGHT: usize = VGA_HEIGHT + PANEL_HEIGHT;

const PANEL_HEIGHT: usize = 140;
const PANEL_TOP: usize = VGA_HEIGHT;

const LED_Y: usize = PANEL_TOP + 10;
const LED_SIZE: usize = 12;
const SW_Y: usize = PANEL_TOP + 30;
const SW_W: usize = 12;
const SW_H: usize = 24;
const BTN_Y: usize = PANEL_TOP + 64;
const BTN_SIZE: usize = 16;
const SEG_Y: usize = PANEL_TOP + 88;
const SEG_PITCH: usize = 32;
const SEG_X0: usize = WIDTH - NR_SEG_DIGITS * SEG_PITCH - 10;
const SLOT_PITCH: usize = 16;
const PANEL_X0: usize = 10;

const COLOR_PANEL: u32 = 0x20_30_20;
const COLOR_LED_ON: u32 = 0xFF_30_30;
const COLOR_LED_OFF: u32 = 0x50_20_20;
const COLOR_SW_BODY: u32 = 0x40_40_48;
const COLOR_SW_KNOB: u32 = 0xC0_C0_C8;
const COLOR_BTN_UP: u32 = 0x40_40_48;
const COLOR_BTN_DOWN: u32 = 0xD0_D0_30;
const COLOR_SEG_ON: u32 = 0x30_FF_60;
const COLOR_SEG_OFF: u32 = 0x18_38_20;

/// Host input captured by the event loop, in logical frame coordinates.
pub enum HostEvent {
    Mouse { x: usize, y: usize, pressed: bool },
    Key { scancode: u8, pressed: bool },
}

/// Desktop widget renderer and event translator.
///
/// The event loop queues [`HostEvent`]s between frames; the board drains
/// them through `poll_events` at the frame boundary the pacer picks. The
/// drawn frame lives here as packed 0x00RRGGBB pixels and is copied to the
/// surface when the board asks for a present.
pub struct DesktopView {
    pub frame: Vec<u32>,
    events: Vec<HostEvent>,
    widget_state: Option<Vec<u8>>,
    button_held: Option<usize>,
    needs_present: bool,
}

impl DesktopView {
    pub fn new() -> Self {
        Self {
            frame: vec![0; WIDTH * HEIGHT],
            events: Vec::new(),
            widget_state: None,
            button_held: None,
            needs_present: false,
        }
    }

    pub fn push_event(&mut self, event: HostEvent) {
        self.events.push(event);
    }

    /// True once per present request; the event loop turns this into a
    /// redraw.
    pub fn take_present(&mut self) -> bool {
        std::mem::take(&mut self.needs_present)
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(HEIGHT) {
            let line = &mut self.frame[row * WIDTH..(row + 1) * WIDTH];
            for px in &mut line[x..(x + w).min(WIDTH)] {
                *px = color;
            }
        }
    }

    /// Slot index under a point, given the row's base position, or None.
    fn slot_at(x: usize, y: usize, y0: usize, h: usize, count: usize, pitch: usize) -> Option<usize> {
        if y < y0 || y >= y0 + h || x < PANEL_X0 {
            return None;
        }
        let i = (x - PANEL_X0) / pitch;
        (i < count && (x - PANEL_X0) % pitch < pitch - 2).then_some(i)
    }

    fn apply_mouse(&mut self, host: &mut HostInput<'_>, x: usize, y: usize, pressed: bool) {
        if pressed {
            // Switch slots show the MSB (highest index) leftmost.
            if let Some(i) = Self::slot_at(x, y, SW_Y, SW_H, NR_SWITCHES, SLOT_PITCH) {
                let id = pins::sw(NR_SWITCHES - 1 - i);
                let cur = host.pins.read(id);
                host.pins.write(id, cur ^ 1);
                *host.dirty = true;
            } else if let Some(i) = Self::slot_at(x, y, BTN_Y, BTN_SIZE, NR_BUTTONS, 20) {
                host.pins.write(pins::btn(i), 1);
                self.button_held = Some(i);
                *host.dirty = true;
            }
        } else if let Some(i) = self.button_held.take() {
            host.pins.write(pins::btn(i), 0);
            *host.dirty = true;
        }
    }

    /// Read every widget-facing pin into one vector for change detection.
    fn sample_widgets(board: &Board) -> Vec<u8> {
        let pins = &board.pins;
        let mut state = Vec::with_capacity(
            NR_LEDS + NR_SWITCHES + NR_BUTTONS + NR_SEG_DIGITS * SEGS_PER_DIGIT,
        );
        for i in 0..NR_LEDS {
            state.push(pins.read(pins::led(i)));
        }
        for i in 0..NR_SWITCHES {
            state.push(pins.read(pins::sw(i)));
        }
        for i in 0..NR_BUTTONS {
            state.push(pins.read(pins::btn(i)));
        }
        for d in 0..NR_SEG_DIGITS {
            for s in 0..SEGS_PER_DIGIT {
                state.push(pins.read(pins::seg(d, s)));
            }
        }
        state
    }

    fn draw_panel(&mut self, state: &[u8]) {
        self.fill_rect(0, PANEL_TOP, WIDTH, PANEL_HEIGHT, COLOR_PANEL);

        let (leds, rest) = state.split_at(NR_LEDS);
        let (switches, rest) = rest.split_at(NR_SWITCHES);
        let (buttons, segs) = rest.split_at(NR_BUTTONS);

        // LEDs and switches, MSB leftmost.
        for i in 0..NR_LEDS {
            let on = leds[NR_LEDS - 1 - i] != 0;
            let x = PANEL_X0 + i * SLOT_PITCH;
            let color = if on { COLOR_LED_ON } else { COLOR_LED_OFF };
            self.fill_rect(x, LED_Y, LED_SIZE, LED_SIZE, color);
        }
        for i in 0..NR_SWITCHES {
            let on = switches[NR_SWITCHES - 1 - i] != 0;
            let x = PANEL_X0 + i * SLOT_PITCH;
            self.fill_rect(x, SW_Y, SW_W, SW_H, COLOR_SW_BODY);
            let knob_y = if on { SW_Y } else { SW_Y + SW_H / 2 };
            self.fill_rect(x, knob_y, SW_W, SW_H / 2, COLOR_SW_KNOB);
        }
        for (i, &down) in buttons.iter().enumerate() {
            let x = PANEL_X0 + i * 20;
            let color = if down != 0 { COLOR_BTN_DOWN } else { COLOR_BTN_UP };
            self.fill_rect(x, BTN_Y, BTN_SIZE, BTN_SIZE, color);
        }
        for d in 0..NR_SEG_DIGITS {
            let x0 = SEG_X0 + d * SEG_PITCH;
            for s in 0..SEGS_PER_DIGIT {
                let on = segs[d * SEGS_PER_DIGIT + s] != 0;
                let color = if on { COLOR_SEG_ON } else { COLOR_SEG_OFF };
                let (sx, sy, w, h) = SEG_RECTS[s];
                self.fill_rect(x0 + sx, SEG_Y + sy, w, h, color);
            }
        }
    }

    fn blit_vga(&mut self, board: &Board) {
        let fb = board.vga.framebuffer();
        for y in 0..VGA_HEIGHT {
            let src = &fb[y * VGA_WIDTH..(y + 1) * VGA_WIDTH];
            self.frame[y * WIDTH..y * WIDTH + VGA_WIDTH].copy_from_slice(src);
        }
    }
}

impl Default for DesktopView {
    fn default() -> Self {
        Self::new()
    }
}

/// Segment rectangles inside a digit cell, A..G then DP.
const SEG_RECTS: [(usize, usize, usize, usize); 8] = [
    (4, 0, 16, 4),   // A
    (20, 4, 4, 16),  // B
    (20, 24, 4, 16), // C
    (4, 40, 16, 4),  // D
    (0, 24, 4, 16),  // E
    (0, 4, 4, 16),   // F
    (4, 20, 16, 4),  // G
    (26, 40, 4, 4),  // DP
];

impl View for DesktopView {
    fn poll_events(&mut self, mut host: HostInput<'_>) {
        let events = std::mem::take(&mut self.events);
        for event in events {
            match event {
                HostEvent::Mouse { x, y, pressed } => self.apply_mouse(&mut host, x, y, pressed),
                HostEvent::Key { scancode, pressed } => {
                    host.keyboard.push_key(scancode, pressed);
                }
            }
        }
    }

    fn refresh(&mut self, board: &Board) -> bool {
        self.blit_vga(board);

        let state = Self::sample_widgets(board);
        let changed = self.widget_state.as_ref() != Some(&state);
        if changed {
            self.draw_panel(&state);
            self.widget_state = Some(state);
        }
        changed
    }

    fn present(&mut self) {
        self.needs_present = true;
    }
}
