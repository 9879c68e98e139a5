use winit::event::VirtualKeyCode;

/// PS/2 set-2 make code for a host key, if the board keyboard knows it.
/// Extended (0xE0-prefixed) keys are not mapped.
pub fn scancode(key: VirtualKeyCode) -> Option<u8> {
    use VirtualKeyCode::*;
    let code = match key {
        A => 0x1C,
        B => 0x32,
        C => 0x21,
        D => 0x23,
        E => 0x24,
        F => 0x2B,
        G => 0x34,
        H => 0x33,
        I => 0x43,
        J => 0x3B,
        K => 0x42,
        L => 0x4B,
        M => 0x3A,
        N => 0x31,
        O => 0x44,
        P => 0x4D,
        Q => 0x15,
        R => 0x2D,
        S => 0x1B,
        T => 0x2C,
        U => 0x3C,
        V => 0x2A,
        W => 0x1D,
        X => 0x22,
        Y => 0x35,
        Z => 0x1A,
        Key0 => 0x45,
        Key1 => 0x16,
        Key2 => 0x1E,
        Key3 => 0x26,
        Key4 => 0x25,
        Key5 => 0x2E,
        Key6 => 0x36,
        Key7 => 0x3D,
        Key8 => 0x3E,
        Key9 => 0x46,
        Space => 0x29,
        Return => 0x5A,
        Back => 0x66,
        Tab => 0x0D,
        LShift => 0x12,
        RShift => 0x59,
        LControl => 0x14,
        _ => return None,
    };
    Some(code)
}
