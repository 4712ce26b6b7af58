use std::collections::HashMap;

use glam::I16Vec2;
use image::{GrayImage, Luma, imageops};
use lib_atlas::{AtlasItems, Placement};

use crate::{DEBUG_COLOR, Mapping, SetupError};

/// Index of a picture in the mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PictureId(pub(crate) u16);

impl PictureId {
    /// Stand-in drawn for anything missing: a small square of [`DEBUG_COLOR`].
    pub const DEBUG: PictureId = PictureId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

const DEBUG_SIZE: u32 = 8;

/// Every picture known to the renderer, with its atlas location once packed.
#[derive(Debug, Clone)]
pub struct Pictures {
    names: HashMap<String, PictureId>,
    images: Vec<GrayImage>,
    mapping: Vec<Mapping>,
}

impl Pictures {
    /// Parameter values are `i16`, so ids stay below this.
    pub const MAX: usize = i16::MAX as usize;

    pub fn new() -> Self {
        let mut result = Self {
            names: HashMap::new(),
            images: Vec::new(),
            mapping: Vec::new(),
        };

        let debug = GrayImage::from_pixel(DEBUG_SIZE, DEBUG_SIZE, Luma([DEBUG_COLOR]));
        result.push(debug);

        result
    }

    /// Registers a picture of palette indices. An empty name declares an
    /// anonymous picture that can only be reached through its id.
    pub fn declare(&mut self, name: &str, image: GrayImage) -> Result<PictureId, SetupError> {
        if !name.is_empty() && self.names.contains_key(name) {
            return Err(SetupError::DuplicatePicture(name.to_owned()));
        }

        if self.images.len() >= Self::MAX {
            return Err(SetupError::TooManyPictures { max: Self::MAX });
        }

        let (width, height) = image.dimensions();
        if width > i16::MAX as u32 || height > i16::MAX as u32 {
            return Err(SetupError::PictureTooLarge {
                name: name.to_owned(),
                width,
                height,
                max: i16::MAX,
            });
        }

        let id = self.push(image);
        if !name.is_empty() {
            self.names.insert(name.to_owned(), id);
        }

        log::trace!("declared picture {id:?} \"{name}\" ({width}x{height})");

        Ok(id)
    }

    fn push(&mut self, image: GrayImage) -> PictureId {
        let id = PictureId(self.images.len() as u16);

        self.mapping.push(Mapping {
            bin: -1,
            w: image.width() as i16,
            h: image.height() as i16,
            ..Default::default()
        });
        self.images.push(image);

        id
    }

    pub fn get(&self, name: &str) -> Option<PictureId> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn size(&self, id: PictureId) -> Option<I16Vec2> {
        self.mapping.get(id.index()).map(|m| I16Vec2::new(m.w, m.h))
    }

    pub fn image(&self, id: PictureId) -> Option<&GrayImage> {
        self.images.get(id.index())
    }

    pub fn mapping(&self, id: PictureId) -> Option<&Mapping> {
        self.mapping.get(id.index())
    }

    pub fn is_packed(&self, id: PictureId) -> bool {
        self.mapping(id).is_some_and(|m| m.bin >= 0)
    }

    /// `id` itself if it can be drawn, [`PictureId::DEBUG`] otherwise.
    pub fn resolve(&self, id: PictureId) -> PictureId {
        if self.is_packed(id) { id } else { PictureId::DEBUG }
    }

    /// Pictures still waiting for a place in the atlas.
    pub fn unpacked(&self) -> Vec<u32> {
        (0..self.mapping.len() as u32)
            .filter(|&id| self.mapping[id as usize].bin < 0)
            .collect()
    }

    /// The table the draw shader indexes by picture id.
    pub fn mapping_table(&self) -> &[Mapping] {
        &self.mapping
    }
}

impl Default for Pictures {
    fn default() -> Self {
        Self::new()
    }
}

impl AtlasItems for Pictures {
    type Image = GrayImage;
    type Error = SetupError;

    fn size(&self, id: u32) -> (i16, i16) {
        let m = &self.mapping[id as usize];
        (m.w, m.h)
    }

    fn place(&mut self, id: u32, at: Placement) {
        let m = &mut self.mapping[id as usize];
        m.bin = at.bin;
        m.x = at.x;
        m.y = at.y;
    }

    fn paint(&self, id: u32, at: Placement, dest: &mut GrayImage) -> Result<(), SetupError> {
        let image = &self.images[id as usize];

        if at.x as u32 + image.width() > dest.width() || at.y as u32 + image.height() > dest.height()
        {
            return Err(SetupError::Paint {
                bin: at.bin as usize,
                reason: format!("picture {id} does not fit at {},{}", at.x, at.y),
            });
        }

        imageops::replace(dest, image, at.x as i64, at.y as i64);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_picture_is_reserved() {
        let pictures = Pictures::new();

        assert_eq!(pictures.len(), 1);
        assert_eq!(pictures.size(PictureId::DEBUG), Some(I16Vec2::new(8, 8)));
        assert_eq!(
            pictures.image(PictureId::DEBUG).unwrap().get_pixel(3, 3),
            &Luma([DEBUG_COLOR])
        );
    }

    #[test]
    fn names_are_unique_but_anonymous_pictures_are_not() {
        let mut pictures = Pictures::new();

        let a = pictures.declare("hero", GrayImage::new(4, 4)).unwrap();
        assert_eq!(pictures.get("hero"), Some(a));
        assert!(matches!(
            pictures.declare("hero", GrayImage::new(2, 2)),
            Err(SetupError::DuplicatePicture(name)) if name == "hero"
        ));

        let b = pictures.declare("", GrayImage::new(1, 1)).unwrap();
        let c = pictures.declare("", GrayImage::new(1, 1)).unwrap();
        assert_ne!(b, c);
        assert_eq!(pictures.get(""), None);
    }

    #[test]
    fn unpacked_pictures_resolve_to_debug() {
        let mut pictures = Pictures::new();
        let id = pictures.declare("wall", GrayImage::new(4, 2)).unwrap();

        assert_eq!(pictures.resolve(id), PictureId::DEBUG);
        assert_eq!(pictures.resolve(PictureId(99)), PictureId::DEBUG);
        assert_eq!(pictures.unpacked(), vec![0, 1]);

        pictures.place(id.0 as u32, Placement { bin: 2, x: 10, y: 20 });

        assert_eq!(pictures.resolve(id), id);
        assert_eq!(
            pictures.mapping(id),
            Some(&Mapping {
                bin: 2,
                x: 10,
                y: 20,
                w: 4,
                h: 2
            })
        );
    }

    #[test]
    fn paint_copies_indices() {
        let mut pictures = Pictures::new();
        let id = pictures
            .declare("dot", GrayImage::from_pixel(2, 2, Luma([7])))
            .unwrap();
        let mut dest = GrayImage::new(8, 8);

        pictures
            .paint(id.0 as u32, Placement { bin: 0, x: 6, y: 6 }, &mut dest)
            .unwrap();

        assert_eq!(dest.get_pixel(7, 7), &Luma([7]));
        assert_eq!(dest.get_pixel(5, 5), &Luma([0]));
        assert!(
            pictures
                .paint(id.0 as u32, Placement { bin: 0, x: 7, y: 0 }, &mut dest)
                .is_err()
        );
    }
}
