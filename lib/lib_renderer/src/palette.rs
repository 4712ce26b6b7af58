use bytemuck::{Pod, Zeroable};

/// Palette index reserved for missing pictures and glyphs.
pub const DEBUG_COLOR: u8 = 255;

/// Linear RGBA color, as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const MAGENTA: Color = Color::new(1.0, 0.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from 8-bit sRGB components.
    pub fn srgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(linear(r), linear(g), linear(b), 1.0)
    }
}

fn linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;

    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// The 256-entry color table the canvas indices refer to.
///
/// Every modification marks the palette as changed, and the renderer
/// uploads it on the next flush.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: [Color; 256],
    changed: bool,
}

impl Palette {
    pub fn new(colors: [Color; 256]) -> Self {
        Self {
            colors,
            changed: true,
        }
    }

    pub fn colors(&self) -> &[Color; 256] {
        &self.colors
    }

    pub fn get(&self, index: u8) -> Color {
        self.colors[index as usize]
    }

    pub fn set(&mut self, index: u8, color: Color) {
        self.colors[index as usize] = color;
        self.changed = true;
    }

    pub fn replace(&mut self, colors: [Color; 256]) {
        self.colors = colors;
        self.changed = true;
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub(crate) fn take_changed(&mut self) -> bool {
        std::mem::replace(&mut self.changed, false)
    }
}

impl Default for Palette {
    fn default() -> Self {
        const RAMP: [(u8, u8, u8); 16] = [
            (0x00, 0x00, 0x00),
            (0x1D, 0x2B, 0x53),
            (0x7E, 0x25, 0x53),
            (0x00, 0x87, 0x51),
            (0xAB, 0x52, 0x36),
            (0x5F, 0x57, 0x4F),
            (0xC2, 0xC3, 0xC7),
            (0xFF, 0xF1, 0xE8),
            (0xFF, 0x00, 0x4D),
            (0xFF, 0xA3, 0x00),
            (0xFF, 0xEC, 0x27),
            (0x00, 0xE4, 0x36),
            (0x29, 0xAD, 0xFF),
            (0x83, 0x76, 0x9C),
            (0xFF, 0x77, 0xA8),
            (0xFF, 0xCC, 0xAA),
        ];

        let mut colors = [Color::MAGENTA; 256];
        colors[0] = Color::TRANSPARENT;
        for (i, &(r, g, b)) in RAMP.iter().enumerate() {
            colors[i + 1] = Color::srgb8(r, g, b);
        }

        Self::new(colors)
    }
}
