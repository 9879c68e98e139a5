use crate::pins;
use crate::registry::PinRegistry;

pub const VGA_WIDTH: usize = 640;
pub const VGA_HEIGHT: usize = 480;

/// VGA raster emulation.
///
/// The board invokes [`Vga::update`] once per simulation step while the
/// design asserts `VGA_BLANK_N`, so each (divided) call corresponds to one
/// visible pixel clock. The raster keeps its own x/y counters, sampling the
/// color pin groups into the framebuffer and resynchronizing to the top of
/// the frame when it observes VSYNC pulled low.
pub struct Vga {
    framebuffer: Vec<u32>,
    x: usize,
    y: usize,
    clk_cycle: u32,
    clk_cnt: u32,
    prev_vsync: u8,
}

impl Vga {
    /// `clk_cycle` is the number of simulation steps per pixel clock.
    pub fn new(clk_cycle: u32) -> Self {
        assert!(clk_cycle > 0, "vga clk_cycle must be nonzero");
        Self {
            framebuffer: vec![0; VGA_WIDTH * VGA_HEIGHT],
            x: 0,
            y: 0,
            clk_cycle,
            clk_cnt: 0,
            prev_vsync: 1,
        }
    }

    /// Packed 0x00RRGGBB pixels, row major.
    pub fn framebuffer(&self) -> &[u32] {
        &self.framebuffer
    }

    /// Advance the raster by one step. Returns true if a pixel changed.
    pub fn update(&mut self, pins: &PinRegistry) -> bool {
        self.clk_cnt += 1;
        if self.clk_cnt < self.clk_cycle {
            return false;
        }
        self.clk_cnt = 0;

        let vsync = pins.read(pins::VGA_VSYNC);
        if self.prev_vsync != 0 && vsync == 0 {
            self.x = 0;
            self.y = 0;
        }
        self.prev_vsync = vsync;

        let r = pins.read_vec(&pins::VGA_R) as u32;
        let g = pins.read_vec(&pins::VGA_G) as u32;
        let b = pins.read_vec(&pins::VGA_B) as u32;
        let pixel = (r << 16) | (g << 8) | b;

        let idx = self.y * VGA_WIDTH + self.x;
        let changed = self.framebuffer[idx] != pixel;
        self.framebuffer[idx] = pixel;

        self.x += 1;
        if self.x == VGA_WIDTH {
            self.x = 0;
            self.y += 1;
            if self.y == VGA_HEIGHT {
                self.y = 0;
            }
        }

        changed
    }
}
