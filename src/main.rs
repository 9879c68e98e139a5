mod demo;
mod keymap;
mod view;

use clap::Parser;
use log::info;
use pixels::{Pixels, SurfaceTexture};
use vboard_core::board::{Board, NullView};
use winit::dpi::PhysicalPosition;
use winit::{
    event::{ElementState, Event, MouseButton, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use crate::view::{DesktopView, HostEvent};

/// Simulation steps run per event-loop pass. The pacer inside the board
/// decides which of those steps become visible frames.
const STEPS_PER_PASS: u64 = 200_000;

#[derive(Parser)]
struct Args {
    /// Window scale factor
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Simulation steps per VGA pixel clock
    #[arg(long, default_value_t = 1)]
    vga_clk: u32,

    /// Target refresh rate, frames per second
    #[arg(long, default_value_t = vboard_core::board::TARGET_FPS)]
    fps: u32,

    /// Simulation steps per UART bit
    #[arg(long)]
    uart_divisor: Option<i32>,

    /// Run without opening a window
    #[arg(long)]
    headless: bool,

    /// Number of steps to run in headless mode
    #[arg(long)]
    steps: Option<u64>,
}

/// Forward design-to-host UART bytes to the log, line-buffered.
struct UartConsole {
    line: String,
}

impl UartConsole {
    fn new() -> Self {
        Self {
            line: String::new(),
        }
    }

    fn feed(&mut self, bytes: &[u8]) {
        for &b in bytes {
            match b {
                b'\n' => {
                    info!("[UART] {}", self.line);
                    self.line.clear();
                }
                b'\r' => {}
                _ if b.is_ascii_graphic() || b == b' ' => self.line.push(b as char),
                _ => self.line.push_str(&format!("\\x{b:02X}")),
            }
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut board = Board::new(args.vga_clk, args.fps);
    if let Some(divisor) = args.uart_divisor {
        board.set_uart_divisor(divisor);
    }
    let mut demo = demo::Demo::new(&mut board);
    let mut console = UartConsole::new();

    if args.headless {
        let mut view = NullView;
        let steps = args.steps.unwrap_or(50_000_000);
        for _ in 0..steps {
            demo.step();
            board.step(&mut view);
            let out = board.uart.take_output();
            if !out.is_empty() {
                console.feed(&out);
            }
        }
        return;
    }

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("vboard")
        .with_inner_size(winit::dpi::LogicalSize::new(
            view::WIDTH as f64 * args.scale,
            view::HEIGHT as f64 * args.scale,
        ))
        .build(&event_loop)
        .expect("Failed to create window");

    let size = window.inner_size();
    let surface = SurfaceTexture::new(size.width, size.height, &window);
    let mut pixels = Pixels::new(view::WIDTH as u32, view::HEIGHT as u32, surface)
        .expect("Pixels error");

    let mut view = DesktopView::new();
    let mut cursor_pos = PhysicalPosition::new(0.0, 0.0);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,
                WindowEvent::Resized(size) => {
                    if let Err(err) = pixels.resize_surface(size.width, size.height) {
                        log::error!("surface resize failed: {err}");
                        *control_flow = ControlFlow::Exit;
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    cursor_pos = position;
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => {
                    let pressed = state == ElementState::Pressed;
                    if let Ok((x, y)) =
                        pixels.window_pos_to_pixel((cursor_pos.x as f32, cursor_pos.y as f32))
                    {
                        view.push_event(HostEvent::Mouse { x, y, pressed });
                    } else if !pressed {
                        // Releases count even when the cursor left the frame.
                        view.push_event(HostEvent::Mouse {
                            x: 0,
                            y: 0,
                            pressed: false,
                        });
                    }
                }
                WindowEvent::KeyboardInput { input, .. } => {
                    if let Some(key) = input.virtual_keycode {
                        let pressed = input.state == ElementState::Pressed;
                        if key == VirtualKeyCode::Escape {
                            if pressed {
                                *control_flow = ControlFlow::Exit;
                            }
                        } else if let Some(scancode) = keymap::scancode(key) {
                            view.push_event(HostEvent::Key { scancode, pressed });
                        }
                    }
                }
                _ => {}
            },
            Event::MainEventsCleared => {
                for _ in 0..STEPS_PER_PASS {
                    demo.step();
                    board.step(&mut view);
                }

                let out = board.uart.take_output();
                if !out.is_empty() {
                    console.feed(&out);
                }

                if view.take_present() {
                    window.request_redraw();
                }
            }
            Event::RedrawRequested(_) => {
                let pixel_frame: &mut [u32] = bytemuck::cast_slice_mut(pixels.frame_mut());
                for (dst, src) in pixel_frame.iter_mut().zip(&view.frame) {
                    let r = ((src >> 16) & 0xFF) as u8;
                    let g = ((src >> 8) & 0xFF) as u8;
                    let b = (src & 0xFF) as u8;
                    *dst = u32::from_ne_bytes([r, g, b, 0xFF]);
                }
                if pixels.render().is_err() {
                    *control_flow = ControlFlow::Exit;
                }
            }
            _ => {}
        }
    });
}
