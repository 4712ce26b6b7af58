use glam::{I16Vec2, UVec2};

use crate::{
    Assets, BoxParams, Command, DrawQueue, FontId, GlyphParams, LineParams, Palette,
    PictureId, PictureParams, PointParams, TextParams, TriangleParams,
};

/// Drawing handle for the frame being accumulated.
///
/// Positions are canvas pixels, layers are depths: higher layers are drawn in
/// front, and among equal layers the later command wins. Colors are palette
/// indices; index 0 is transparent.
pub struct Frame<'a> {
    pub(crate) queue: &'a mut DrawQueue,
    pub(crate) palette: &'a mut Palette,
    pub(crate) clear: &'a mut Option<u8>,
    pub(crate) assets: &'a Assets,
    pub(crate) canvas: UVec2,
}

impl<'a> Frame<'a> {
    pub fn canvas_size(&self) -> UVec2 {
        self.canvas
    }

    pub fn assets(&self) -> &Assets {
        self.assets
    }

    pub fn palette_mut(&mut self) -> &mut Palette {
        self.palette
    }

    /// Fills the canvas with `color` before this frame's commands are drawn.
    pub fn clear(&mut self, color: u8) {
        *self.clear = Some(color);
    }

    pub fn push(&mut self, command: &Command) {
        self.queue.push(command);
    }

    pub fn draw_picture(&mut self, picture: PictureId, position: I16Vec2, layer: i16) {
        self.draw_picture_shifted(picture, position, layer, 0);
    }

    /// Draws a picture with every non-transparent index offset by `shift`,
    /// wrapping around past 255.
    pub fn draw_picture_shifted(
        &mut self,
        picture: PictureId,
        position: I16Vec2,
        layer: i16,
        shift: u8,
    ) {
        let resolved = self.assets.pictures.resolve(picture);
        if resolved != picture {
            log::warn!("drawing unpacked picture {picture:?}");
        }

        self.queue.push(&Command::Picture(PictureParams {
            picture: resolved.0 as i16,
            x: position.x,
            y: position.y,
            layer,
            shift: shift as i16,
        }));
    }

    /// A filled rectangle with a one pixel border and bevelled corners.
    /// The corner is clamped to half the smaller side.
    pub fn draw_box(
        &mut self,
        position: I16Vec2,
        size: I16Vec2,
        layer: i16,
        corner: i16,
        fill: u8,
        border: u8,
    ) {
        if size.x <= 0 || size.y <= 0 {
            return;
        }

        self.queue.push(&Command::Box(BoxParams {
            fill: fill as i16,
            border: border as i16,
            corner: corner.clamp(0, size.x.min(size.y) / 2),
            x: position.x,
            y: position.y,
            w: size.x,
            h: size.y,
            layer,
        }));
    }

    pub fn draw_point(&mut self, position: I16Vec2, layer: i16, color: u8) {
        self.queue.push(&Command::Point(PointParams {
            color: color as i16,
            x: position.x,
            y: position.y,
            layer,
        }));
    }

    pub fn draw_line(&mut self, from: I16Vec2, to: I16Vec2, layer: i16, color: u8) {
        self.queue.push(&Command::Line(LineParams {
            color: color as i16,
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
            layer,
        }));
    }

    pub fn draw_triangle(&mut self, a: I16Vec2, b: I16Vec2, c: I16Vec2, layer: i16, color: u8) {
        self.queue.push(&Command::Triangle(TriangleParams {
            color: color as i16,
            x1: a.x,
            y1: a.y,
            x2: b.x,
            y2: b.y,
            x3: c.x,
            y3: c.y,
            layer,
        }));
    }

    /// Draws `text` with its first baseline at `position` and returns the
    /// cursor after the last character.
    ///
    /// Glyph pixels are offset so that index 1 in the font strip is drawn
    /// with `color`.
    pub fn draw_text(
        &mut self,
        font: FontId,
        position: I16Vec2,
        layer: i16,
        color: u8,
        text: &str,
    ) -> I16Vec2 {
        let Some(f) = self.assets.fonts.font(font) else {
            log::warn!("drawing text with unknown font {font:?}");
            return position;
        };

        let mut cursor = position;
        let mut glyphs = Vec::with_capacity(text.len());

        for c in text.chars() {
            if c == '\n' {
                self.push_run(f.baseline(), cursor.y, layer, color, &glyphs);
                glyphs.clear();

                cursor.x = position.x;
                cursor.y = cursor.y.saturating_add(f.interline());
                continue;
            }

            let picture = self.assets.pictures.resolve(f.glyph(c));
            let width = self.assets.pictures.size(picture).map_or(0, |size| size.x);

            glyphs.push(GlyphParams {
                picture: picture.0 as i16,
                x: cursor.x,
            });
            cursor.x = cursor.x.saturating_add(width + f.spacing());
        }

        self.push_run(f.baseline(), cursor.y, layer, color, &glyphs);

        cursor
    }

    fn push_run(&mut self, baseline: i16, y: i16, layer: i16, color: u8, glyphs: &[GlyphParams]) {
        let header = TextParams {
            color: color as i16,
            y: y.saturating_sub(baseline),
            layer,
        };

        self.queue.append_text(header, glyphs);
    }
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma};

    use crate::{CommandGroup, CommandTag};

    use super::*;

    struct Fixture {
        assets: Assets,
        queue: DrawQueue,
        palette: Palette,
        clear: Option<u8>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                assets: Assets::new(64),
                queue: DrawQueue::new(),
                palette: Palette::default(),
                clear: None,
            }
        }

        fn frame(&mut self) -> Frame<'_> {
            Frame {
                queue: &mut self.queue,
                palette: &mut self.palette,
                clear: &mut self.clear,
                assets: &self.assets,
                canvas: UVec2::new(320, 180),
            }
        }
    }

    /// Three glyphs for '0', '1', '2': 3, 1 and 3 pixels wide, 5 high.
    fn digits() -> GrayImage {
        let mut strip = GrayImage::new(11, 6);
        strip.put_pixel(0, 4, Luma([1]));
        for x in [1, 2, 3, 5, 7, 8, 9] {
            strip.put_pixel(x, 5, Luma([1]));
        }
        strip
    }

    #[test]
    fn unknown_pictures_draw_the_debug_picture() {
        let mut fixture = Fixture::new();
        let hero = fixture
            .assets
            .pictures
            .declare("hero", GrayImage::new(4, 4))
            .unwrap();

        fixture.frame().draw_picture(hero, I16Vec2::new(1, 2), 3);

        assert_eq!(
            fixture.queue.commands(),
            [Command::Picture(PictureParams {
                picture: 0,
                x: 1,
                y: 2,
                layer: 3,
                shift: 0
            })]
        );
    }

    #[test]
    fn box_corner_is_clamped() {
        let mut fixture = Fixture::new();
        let mut frame = fixture.frame();

        frame.draw_box(I16Vec2::ZERO, I16Vec2::new(10, 6), 0, 9, 1, 2);
        frame.draw_box(I16Vec2::ZERO, I16Vec2::new(0, 6), 0, 1, 1, 2);

        let commands = fixture.queue.commands();
        assert_eq!(commands.len(), 1);
        let Command::Box(params) = commands[0] else {
            panic!("expected a box, got {:?}", commands[0]);
        };
        assert_eq!(params.corner, 3);
    }

    #[test]
    fn text_advances_by_glyph_width_and_breaks_lines() {
        let mut fixture = Fixture::new();
        let font = fixture
            .assets
            .fonts
            .declare_strip(&mut fixture.assets.pictures, "digits", &digits(), '0')
            .unwrap();
        fixture.assets.pack().unwrap();

        let end = fixture
            .frame()
            .draw_text(font, I16Vec2::new(10, 20), 1, 7, "012\n1");

        // Widths 3, 1, 3 plus one pixel of spacing each; interline is 5 + 1.
        assert_eq!(end, I16Vec2::new(12, 26));

        let groups = fixture.queue.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups[0],
            CommandGroup {
                tag: CommandTag::Text,
                base: 0,
                count: 3
            }
        );

        let Command::Text { header, glyphs } = &fixture.queue.commands()[0] else {
            panic!("expected text");
        };
        assert_eq!(header.y, 16);
        assert_eq!(
            glyphs.iter().map(|g| g.x).collect::<Vec<_>>(),
            [10, 14, 16]
        );
    }

    #[test]
    fn clear_and_palette_are_recorded() {
        let mut fixture = Fixture::new();
        fixture.palette.take_changed();

        {
            let mut frame = fixture.frame();
            frame.clear(4);
            frame.palette_mut().set(2, crate::Color::MAGENTA);
        }

        assert_eq!(fixture.clear, Some(4));
        assert!(fixture.palette.is_changed());
    }
}
