use std::collections::HashMap;

use image::{GrayImage, imageops};

use crate::{PictureId, Pictures, SetupError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub(crate) u8);

/// A bitmap font: one anonymous picture per glyph, for a contiguous range of
/// characters.
#[derive(Debug, Clone)]
pub struct Font {
    first: char,
    glyphs: Vec<PictureId>,
    height: i16,
    baseline: i16,
    spacing: i16,
}

impl Font {
    pub fn height(&self) -> i16 {
        self.height
    }

    /// Distance from the top of a glyph to its baseline row.
    pub fn baseline(&self) -> i16 {
        self.baseline
    }

    /// Vertical advance between lines.
    pub fn interline(&self) -> i16 {
        self.height + self.height / 4
    }

    /// Horizontal gap inserted after each glyph.
    pub fn spacing(&self) -> i16 {
        self.spacing
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// The picture for `c`, falling back to `'?'`, then to the first glyph.
    pub fn glyph(&self, c: char) -> PictureId {
        self.lookup(c)
            .or_else(|| self.lookup('?'))
            .unwrap_or(self.glyphs[0])
    }

    fn lookup(&self, c: char) -> Option<PictureId> {
        let index = (c as u32).checked_sub(self.first as u32)?;
        self.glyphs.get(index as usize).copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Fonts {
    names: HashMap<String, FontId>,
    fonts: Vec<Font>,
}

impl Fonts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cuts a font strip into glyphs, starting at character `first`.
    ///
    /// The last row of the strip marks the glyph columns with non-zero
    /// pixels; glyphs are separated by at least one zero. The first column
    /// marks the baseline with its topmost non-zero pixel. Glyphs start at
    /// the second column.
    pub fn declare_strip(
        &mut self,
        pictures: &mut Pictures,
        name: &str,
        strip: &GrayImage,
        first: char,
    ) -> Result<FontId, SetupError> {
        if self.names.contains_key(name) {
            return Err(SetupError::DuplicateFont(name.to_owned()));
        }

        if self.fonts.len() > u8::MAX as usize {
            return Err(SetupError::InvalidFont {
                name: name.to_owned(),
                reason: "too many fonts",
            });
        }

        let (width, height) = strip.dimensions();
        if height < 2 || width < 2 {
            return Err(SetupError::InvalidFont {
                name: name.to_owned(),
                reason: "strip needs a marker row, a baseline column and one glyph",
            });
        }

        let h = height - 1;
        let marked = |x: u32| strip.get_pixel(x, h).0[0] != 0;

        let baseline = (0..h)
            .find(|&y| strip.get_pixel(0, y).0[0] != 0)
            .unwrap_or(h - 1);

        let mut glyphs = Vec::new();
        let mut x = 1;
        loop {
            while x < width && !marked(x) {
                x += 1;
            }
            if x >= width {
                break;
            }

            let start = x;
            while x < width && marked(x) {
                x += 1;
            }

            let glyph = imageops::crop_imm(strip, start, 0, x - start, h).to_image();
            glyphs.push(pictures.declare("", glyph)?);
        }

        if glyphs.is_empty() {
            return Err(SetupError::InvalidFont {
                name: name.to_owned(),
                reason: "no glyph columns marked",
            });
        }

        log::debug!(
            "declared font \"{name}\": {} glyphs from {first:?}, height {h}, baseline {baseline}",
            glyphs.len(),
        );

        let id = FontId(self.fonts.len() as u8);
        self.fonts.push(Font {
            first,
            glyphs,
            height: h as i16,
            baseline: baseline as i16,
            spacing: 1,
        });
        self.names.insert(name.to_owned(), id);

        Ok(id)
    }

    pub fn get(&self, name: &str) -> Option<FontId> {
        self.names.get(name).copied()
    }

    pub fn font(&self, id: FontId) -> Option<&Font> {
        self.fonts.get(id.0 as usize)
    }
}

#[cfg(test)]
mod tests {
    use image::Luma;

    use super::*;

    /// Two glyphs, 2 and 3 pixels wide, 4 pixels high, baseline at row 2.
    fn strip() -> GrayImage {
        let mut strip = GrayImage::new(8, 5);
        strip.put_pixel(0, 2, Luma([1]));
        for x in [1, 2, 4, 5, 6] {
            strip.put_pixel(x, 4, Luma([1]));
        }
        strip.put_pixel(1, 0, Luma([5]));
        strip.put_pixel(6, 3, Luma([6]));
        strip
    }

    #[test]
    fn strip_is_cut_at_marker_gaps() {
        let mut pictures = Pictures::new();
        let mut fonts = Fonts::new();

        let id = fonts
            .declare_strip(&mut pictures, "small", &strip(), 'a')
            .unwrap();
        let font = fonts.font(id).unwrap();

        assert_eq!(font.glyph_count(), 2);
        assert_eq!(font.height(), 4);
        assert_eq!(font.baseline(), 2);

        let a = pictures.image(font.glyph('a')).unwrap();
        assert_eq!(a.dimensions(), (2, 4));
        assert_eq!(a.get_pixel(0, 0), &Luma([5]));

        let b = pictures.image(font.glyph('b')).unwrap();
        assert_eq!(b.dimensions(), (3, 4));
        assert_eq!(b.get_pixel(2, 3), &Luma([6]));
    }

    #[test]
    fn missing_characters_fall_back() {
        let mut pictures = Pictures::new();
        let mut fonts = Fonts::new();

        let id = fonts
            .declare_strip(&mut pictures, "small", &strip(), '>')
            .unwrap();
        let font = fonts.font(id).unwrap();

        // '>' and '?' are the two glyphs.
        assert_eq!(font.glyph('z'), font.glyph('?'));
        assert_ne!(font.glyph('>'), font.glyph('?'));

        let id = fonts
            .declare_strip(&mut pictures, "other", &strip(), 'a')
            .unwrap();
        let font = fonts.font(id).unwrap();
        assert_eq!(font.glyph(' '), font.glyph('a'));
    }

    #[test]
    fn invalid_strips_are_rejected() {
        let mut pictures = Pictures::new();
        let mut fonts = Fonts::new();

        assert!(matches!(
            fonts.declare_strip(&mut pictures, "flat", &GrayImage::new(8, 1), 'a'),
            Err(SetupError::InvalidFont { .. })
        ));
        assert!(matches!(
            fonts.declare_strip(&mut pictures, "blank", &GrayImage::new(8, 8), 'a'),
            Err(SetupError::InvalidFont { .. })
        ));

        fonts
            .declare_strip(&mut pictures, "small", &strip(), 'a')
            .unwrap();
        assert!(matches!(
            fonts.declare_strip(&mut pictures, "small", &strip(), 'a'),
            Err(SetupError::DuplicateFont(_))
        ));
    }
}
