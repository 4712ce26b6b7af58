use image::GrayImage;
use lib_atlas::Atlas;

use crate::{Fonts, Pictures, SetupError};

/// Pictures and fonts declared by the application, and the atlas they are
/// packed into.
#[derive(Debug, Clone)]
pub struct Assets {
    pub pictures: Pictures,
    pub fonts: Fonts,
    atlas: Atlas,
}

impl Assets {
    pub fn new(bin_size: i16) -> Self {
        Self {
            pictures: Pictures::new(),
            fonts: Fonts::new(),
            atlas: Atlas::new(bin_size, bin_size),
        }
    }

    pub fn atlas(&self) -> &Atlas {
        &self.atlas
    }

    /// Packs every picture declared since the last call.
    pub fn pack(&mut self) -> Result<(), SetupError> {
        let pending = self.pictures.unpacked();
        if pending.is_empty() {
            return Ok(());
        }

        self.atlas.pack(&pending, &mut self.pictures)?;

        log::info!(
            "packed {} pictures into {} atlas bins",
            pending.len(),
            self.atlas.bin_count(),
        );

        Ok(())
    }

    /// One image of palette indices per bin, ready for upload.
    pub fn paint_bins(&self) -> Result<Vec<GrayImage>, SetupError> {
        let (width, height) = self.atlas.bin_size();

        (0..self.atlas.bin_count())
            .map(|bin| {
                let mut image = GrayImage::new(width as u32, height as u32);
                self.atlas.paint(bin, &mut image, &self.pictures)?;
                Ok(image)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use image::Luma;
    use lib_atlas::PackError;

    use crate::PictureId;

    use super::*;

    #[test]
    fn pack_places_every_picture_and_paints_them() {
        let mut assets = Assets::new(64);
        let a = assets
            .pictures
            .declare("a", GrayImage::from_pixel(32, 16, Luma([3])))
            .unwrap();
        let b = assets
            .pictures
            .declare("b", GrayImage::from_pixel(16, 16, Luma([4])))
            .unwrap();

        assets.pack().unwrap();

        assert!(assets.pictures.is_packed(PictureId::DEBUG));
        assert!(assets.pictures.is_packed(a));
        assert!(assets.pictures.is_packed(b));
        assert!(assets.pictures.unpacked().is_empty());

        let bins = assets.paint_bins().unwrap();
        assert_eq!(bins.len(), 1);

        let m = assets.pictures.mapping(b).unwrap();
        assert_eq!(
            bins[0].get_pixel(m.x as u32 + 15, m.y as u32 + 15),
            &Luma([4])
        );
    }

    #[test]
    fn later_declarations_pack_incrementally() {
        let mut assets = Assets::new(64);
        assets.pack().unwrap();
        let debug = *assets.pictures.mapping(PictureId::DEBUG).unwrap();

        let late = assets
            .pictures
            .declare("late", GrayImage::new(8, 8))
            .unwrap();
        assets.pack().unwrap();

        assert_eq!(assets.pictures.mapping(PictureId::DEBUG), Some(&debug));
        assert!(assets.pictures.is_packed(late));
        assert_eq!(assets.atlas().bin_count(), 1);
    }

    #[test]
    fn oversized_picture_fails_the_pack() {
        let mut assets = Assets::new(16);
        assets
            .pictures
            .declare("big", GrayImage::new(17, 4))
            .unwrap();

        let err = assets.pack().unwrap_err();

        assert!(matches!(
            err,
            SetupError::Pack(PackError::TooLarge { id: 1, .. })
        ));
        assert_eq!(assets.atlas().bin_count(), 0);
    }
}
