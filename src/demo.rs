use std::time::Duration;

use glam::{I16Vec2, i16vec2};
use image::{GrayImage, Luma};
use lib_app::{AppContext, AppEvent, AppFlow, AppHandler};
use lib_renderer::{Assets, Color, FontId, Frame, PictureId, SetupError};
use winit::keyboard::{KeyCode, PhysicalKey};

/// 3x5 digits, one bit per pixel, rows top to bottom.
const DIGITS: [u16; 10] = [
    0b111_101_101_101_111,
    0b010_110_010_010_111,
    0b111_001_111_100_111,
    0b111_001_011_001_111,
    0b101_101_111_001_001,
    0b111_100_111_001_111,
    0b111_100_111_101_111,
    0b111_001_010_010_010,
    0b111_101_111_101_111,
    0b111_101_111_001_111,
];

const PULSE: u8 = 16;

#[derive(Debug)]
pub struct Demo {
    ball: PictureId,
    tile: PictureId,
    digits: FontId,
    elapsed: Duration,
    frames: u32,
    cursor: Option<I16Vec2>,
}

impl AppHandler for Demo {
    fn new(assets: &mut Assets, _ctx: AppContext<'_>) -> Result<Self, SetupError> {
        let ball = assets.pictures.declare("ball", ball_picture(12))?;
        let tile = assets.pictures.declare("tile", tile_picture(16))?;
        let digits = assets
            .fonts
            .declare_strip(&mut assets.pictures, "digits", &digit_strip(), '0')?;

        Ok(Self {
            ball,
            tile,
            digits,
            elapsed: Duration::ZERO,
            frames: 0,
            cursor: None,
        })
    }

    fn update(&mut self, delta_time: Duration, _ctx: AppContext<'_>) -> AppFlow {
        self.elapsed += delta_time;

        AppFlow::Continue
    }

    fn event(&mut self, event: AppEvent<'_>, _ctx: AppContext<'_>) -> AppFlow {
        match event {
            AppEvent::CloseRequested => return AppFlow::Exit,
            AppEvent::CursorMoved(cursor) => self.cursor = cursor,
            AppEvent::Key(key)
                if key.state.is_pressed()
                    && key.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                return AppFlow::Exit;
            }
            _ => {}
        }

        AppFlow::Continue
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        self.frames += 1;

        let t = self.elapsed.as_secs_f32();
        let canvas = frame.canvas_size().as_i16vec2();

        frame.clear(1);

        if self.frames % 30 == 0 {
            let level = ((t.sin() * 0.5 + 0.5) * 255.0) as u8;
            frame
                .palette_mut()
                .set(PULSE, Color::srgb8(level, 64, 255 - level));
        }

        for y in (0..canvas.y).step_by(32) {
            for x in (0..canvas.x).step_by(32) {
                frame.draw_picture(self.tile, i16vec2(x, y), -10);
            }
        }

        let bounce = i16vec2(
            ((t * 1.3).sin() * 0.4 * canvas.x as f32) as i16 + canvas.x / 2,
            ((t * 2.1).cos() * 0.3 * canvas.y as f32) as i16 + canvas.y / 2,
        );
        frame.draw_picture(self.ball, bounce, 5);
        let shift = ((t * 4.0) as u32 % 255) as u8;
        frame.draw_picture_shifted(self.ball, bounce + i16vec2(16, 0), 5, shift);

        frame.draw_box(i16vec2(8, 8), i16vec2(64, 24), 0, 3, PULSE, 8);
        frame.draw_text(self.digits, i16vec2(14, 22), 1, 8, &self.frames.to_string());

        let center = canvas / 2;
        frame.draw_triangle(
            center + i16vec2(-20, 30),
            center + i16vec2(20, 30),
            center + i16vec2(0, 0),
            -1,
            12,
        );

        for i in 0..8 {
            let angle = t + i as f32 * std::f32::consts::TAU / 8.0;
            let tip = center + i16vec2((angle.cos() * 40.0) as i16, (angle.sin() * 40.0) as i16);
            frame.draw_line(center, tip, 2, 2 + i as u8);
        }

        if let Some(cursor) = self.cursor {
            for offset in [
                i16vec2(0, 0),
                i16vec2(-2, 0),
                i16vec2(2, 0),
                i16vec2(0, -2),
                i16vec2(0, 2),
            ] {
                frame.draw_point(cursor + offset, 100, 8);
            }
        }
    }
}

fn ball_picture(size: u32) -> GrayImage {
    let r = size as f32 / 2.0;

    GrayImage::from_fn(size, size, |x, y| {
        let d = ((x as f32 + 0.5 - r).powi(2) + (y as f32 + 0.5 - r).powi(2)).sqrt();
        match d {
            d if d < r * 0.4 => Luma([11]),
            d if d < r - 1.0 => Luma([10]),
            d if d < r => Luma([9]),
            _ => Luma([0]),
        }
    })
}

fn tile_picture(size: u32) -> GrayImage {
    GrayImage::from_fn(size, size, |x, y| {
        if x == 0 || y == 0 { Luma([2]) } else { Luma([0]) }
    })
}

/// A strip of the digit glyphs with the baseline marked on the last glyph
/// row and every glyph column marked on the extra bottom row.
fn digit_strip() -> GrayImage {
    let mut strip = GrayImage::new(1 + DIGITS.len() as u32 * 4, 6);
    strip.put_pixel(0, 4, Luma([1]));

    for (i, &bits) in DIGITS.iter().enumerate() {
        let left = 1 + i as u32 * 4;
        for x in 0..3 {
            for y in 0..5 {
                if (bits >> (14 - (y * 3 + x))) & 1 == 1 {
                    strip.put_pixel(left + x, y, Luma([1]));
                }
            }
            strip.put_pixel(left + x, 5, Luma([1]));
        }
    }

    strip
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_strip_declares_ten_glyphs() {
        let mut assets = Assets::new(64);
        let font = assets
            .fonts
            .declare_strip(&mut assets.pictures, "digits", &digit_strip(), '0')
            .unwrap();

        let font = assets.fonts.font(font).unwrap();
        assert_eq!(font.glyph_count(), 10);
        assert_eq!(font.height(), 5);
        assert_eq!(font.baseline(), 4);
        assert_eq!(assets.pictures.size(font.glyph('7')), Some(i16vec2(3, 5)));
    }

    #[test]
    fn demo_pictures_fit_one_bin() {
        let mut assets = Assets::new(64);
        assets.pictures.declare("ball", ball_picture(12)).unwrap();
        assets.pictures.declare("tile", tile_picture(16)).unwrap();
        assets.pack().unwrap();

        assert_eq!(assets.atlas().bin_count(), 1);
    }
}
