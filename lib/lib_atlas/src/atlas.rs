use std::{cmp::Reverse, collections::HashSet};

use crate::{Bounds, PackError, Placement, Region};

/// The collaborator owning the rectangles that get packed.
///
/// Rectangles are identified by an index into the implementor's own table.
pub trait AtlasItems {
    type Image;
    type Error;

    /// Width and height of a rectangle.
    fn size(&self, id: u32) -> (i16, i16);

    /// Records the location assigned to a rectangle.
    fn place(&mut self, id: u32, at: Placement);

    /// Copies the pixels of a rectangle into `dest` at `at`.
    fn paint(&self, id: u32, at: Placement, dest: &mut Self::Image) -> Result<(), Self::Error>;
}

/// Mapping of a set of rectangles into an array of fixed-size bins.
#[derive(Debug, Clone)]
pub struct Atlas {
    bin_width: i16,
    bin_height: i16,
    bins: Vec<Region>,
    ideal: u64,
}

impl Atlas {
    pub fn new(bin_width: i16, bin_height: i16) -> Self {
        Self {
            bin_width,
            bin_height,
            bins: Vec::new(),
            ideal: 0,
        }
    }

    pub fn bin_size(&self) -> (i16, i16) {
        (self.bin_width, self.bin_height)
    }

    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    pub fn bin(&self, bin: usize) -> Option<&Region> {
        self.bins.get(bin)
    }

    /// Pixels of all bins not covered by any packed rectangle.
    pub fn unused(&self) -> u64 {
        let capacity = self.bins.len() as u64 * self.bin_width as u64 * self.bin_height as u64;
        capacity.saturating_sub(self.ideal)
    }

    /// Places every rectangle of `rects`, opening new bins when needed.
    ///
    /// Rectangles are inserted by decreasing perimeter. Nothing is placed if
    /// any of them is empty, larger than a bin, or listed twice.
    pub fn pack<I: AtlasItems>(&mut self, rects: &[u32], items: &mut I) -> Result<(), PackError> {
        let mut seen = HashSet::with_capacity(rects.len());

        for &id in rects {
            if !seen.insert(id) {
                return Err(PackError::Duplicate { id });
            }

            let (width, height) = items.size(id);

            if width <= 0 || height <= 0 {
                return Err(PackError::Empty { id, width, height });
            }

            if width > self.bin_width || height > self.bin_height {
                return Err(PackError::TooLarge {
                    id,
                    width,
                    height,
                    bin_width: self.bin_width,
                    bin_height: self.bin_height,
                });
            }
        }

        let mut sorted = rects.to_vec();
        sorted.sort_by_key(|&id| {
            let (width, height) = items.size(id);
            Reverse(2 * width as i32 + 2 * height as i32)
        });

        let bins_before = self.bins.len();

        for id in sorted {
            let (width, height) = items.size(id);
            self.ideal += width as u64 * height as u64;

            let placed = self
                .bins
                .iter_mut()
                .enumerate()
                .find_map(|(bin, region)| region.insert(id, width, height, bin as i16));

            let placement = match placed {
                Some(placement) => placement,
                None => {
                    let bin = self.bins.len();
                    let mut region =
                        Region::new(Bounds::new(0, 0, self.bin_width, self.bin_height));

                    let placement = region
                        .insert(id, width, height, bin as i16)
                        .ok_or(PackError::Unplaced { id })?;

                    self.bins.push(region);
                    placement
                }
            };

            items.place(id, placement);
        }

        log::debug!(
            "packed {} rectangles: {} bins ({} new), {} unused pixels",
            rects.len(),
            self.bins.len(),
            self.bins.len() - bins_before,
            self.unused(),
        );

        Ok(())
    }

    /// Paints every rectangle assigned to `bin` into `dest`.
    ///
    /// # Panics
    ///
    /// Panics if `bin` is not below [`Atlas::bin_count`].
    pub fn paint<I: AtlasItems>(
        &self,
        bin: usize,
        dest: &mut I::Image,
        items: &I,
    ) -> Result<(), I::Error> {
        assert!(bin < self.bins.len(), "bin {bin} out of range");

        self.bins[bin].try_visit(&mut |id, bounds| {
            let at = Placement {
                bin: bin as i16,
                x: bounds.x,
                y: bounds.y,
            };

            items.paint(id, at, dest)
        })
    }

    /// Every rectangle assigned to `bin`, with its bounds.
    pub fn placements(&self, bin: usize) -> Vec<(u32, Bounds)> {
        let mut out = Vec::new();

        if let Some(region) = self.bins.get(bin) {
            region.visit(&mut |id, bounds| out.push((id, bounds)));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    #[derive(Debug, Default)]
    struct Rects {
        sizes: Vec<(i16, i16)>,
        placed: HashMap<u32, Placement>,
        puts: usize,
    }

    impl Rects {
        fn new(sizes: &[(i16, i16)]) -> Self {
            Self {
                sizes: sizes.to_vec(),
                ..Default::default()
            }
        }

        fn ids(&self) -> Vec<u32> {
            (0..self.sizes.len() as u32).collect()
        }
    }

    impl AtlasItems for Rects {
        type Image = Vec<Vec<Option<u32>>>;
        type Error = String;

        fn size(&self, id: u32) -> (i16, i16) {
            self.sizes[id as usize]
        }

        fn place(&mut self, id: u32, at: Placement) {
            self.puts += 1;
            self.placed.insert(id, at);
        }

        fn paint(&self, id: u32, at: Placement, dest: &mut Self::Image) -> Result<(), String> {
            let (w, h) = self.size(id);
            for y in at.y..at.y + h {
                for x in at.x..at.x + w {
                    let pixel = &mut dest[y as usize][x as usize];
                    if pixel.is_some() {
                        return Err(format!("pixel {x},{y} painted twice"));
                    }
                    *pixel = Some(id);
                }
            }
            Ok(())
        }
    }

    fn assert_invariants(atlas: &Atlas, rects: &Rects) {
        let (bw, bh) = atlas.bin_size();
        let bin_bounds = Bounds::new(0, 0, bw, bh);
        let mut seen = 0;

        for bin in 0..atlas.bin_count() {
            let placements = atlas.placements(bin);
            seen += placements.len();

            for (i, (id, a)) in placements.iter().enumerate() {
                assert!(bin_bounds.contains(a), "{a:?} outside of bin");
                assert_eq!((a.width, a.height), rects.size(*id));

                let placed = rects.placed[id];
                assert_eq!((placed.bin as usize, placed.x, placed.y), (bin, a.x, a.y));

                for (_, b) in &placements[i + 1..] {
                    assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
                }
            }
        }

        assert_eq!(seen, rects.sizes.len());
        assert_eq!(rects.puts, rects.sizes.len());
    }

    #[test]
    fn four_squares_share_one_bin() {
        let mut rects = Rects::new(&[(64, 64), (32, 32), (32, 32), (16, 16)]);
        let mut atlas = Atlas::new(128, 128);

        atlas.pack(&rects.ids(), &mut rects).unwrap();

        assert_eq!(atlas.bin_count(), 1);
        assert_invariants(&atlas, &rects);
        assert_eq!(atlas.unused(), 128 * 128 - (64 * 64 + 2 * 32 * 32 + 16 * 16));
    }

    #[test]
    fn oversized_rectangle_is_reported() {
        let mut rects = Rects::new(&[(16, 16), (200, 200)]);
        let mut atlas = Atlas::new(128, 128);

        let err = atlas.pack(&rects.ids(), &mut rects).unwrap_err();

        assert_eq!(
            err,
            PackError::TooLarge {
                id: 1,
                width: 200,
                height: 200,
                bin_width: 128,
                bin_height: 128,
            }
        );
        assert_eq!(atlas.bin_count(), 0);
        assert_eq!(rects.puts, 0);
    }

    #[test]
    fn one_oversized_dimension_is_enough_to_fail() {
        let mut rects = Rects::new(&[(8, 129)]);
        let mut atlas = Atlas::new(128, 128);

        assert!(matches!(
            atlas.pack(&rects.ids(), &mut rects),
            Err(PackError::TooLarge { id: 0, .. })
        ));
    }

    #[test]
    fn empty_rectangle_is_reported() {
        let mut rects = Rects::new(&[(0, 8)]);
        let mut atlas = Atlas::new(128, 128);

        assert_eq!(
            atlas.pack(&rects.ids(), &mut rects),
            Err(PackError::Empty {
                id: 0,
                width: 0,
                height: 8
            })
        );
    }

    #[test]
    fn repeated_id_is_reported() {
        let mut rects = Rects::new(&[(8, 8), (16, 16)]);
        let mut atlas = Atlas::new(64, 64);

        assert_eq!(
            atlas.pack(&[0, 1, 0], &mut rects),
            Err(PackError::Duplicate { id: 0 })
        );
        assert_eq!(atlas.bin_count(), 0);
        assert_eq!(rects.puts, 0);
    }

    #[test]
    #[should_panic(expected = "bin 1 out of range")]
    fn painting_a_missing_bin_panics() {
        let mut rects = Rects::new(&[(8, 8)]);
        let mut atlas = Atlas::new(64, 64);
        atlas.pack(&rects.ids(), &mut rects).unwrap();

        let mut image = vec![vec![None; 64]; 64];
        let _ = atlas.paint(1, &mut image, &rects);
    }

    #[test]
    fn largest_perimeter_goes_first() {
        let mut rects = Rects::new(&[(8, 8), (64, 8), (32, 32)]);
        let mut atlas = Atlas::new(64, 64);

        atlas.pack(&rects.ids(), &mut rects).unwrap();

        assert_eq!(rects.placed[&1], Placement { bin: 0, x: 0, y: 0 });
        assert_eq!(rects.placed[&2], Placement { bin: 0, x: 0, y: 8 });
        assert_invariants(&atlas, &rects);
    }

    #[test]
    fn full_bins_open_new_ones() {
        let mut rects = Rects::new(&[(64, 64); 5]);
        let mut atlas = Atlas::new(64, 128);

        atlas.pack(&rects.ids(), &mut rects).unwrap();

        assert_eq!(atlas.bin_count(), 3);
        assert_eq!(atlas.unused(), 64 * 64);
        assert_invariants(&atlas, &rects);
    }

    #[test]
    fn incremental_packs_reuse_free_space() {
        let mut rects = Rects::new(&[(64, 32), (64, 32)]);
        let mut atlas = Atlas::new(64, 64);

        atlas.pack(&[0], &mut rects).unwrap();
        atlas.pack(&[1], &mut rects).unwrap();

        assert_eq!(atlas.bin_count(), 1);
        assert_eq!(rects.placed[&1], Placement { bin: 0, x: 0, y: 32 });
        assert_eq!(atlas.unused(), 0);
    }

    #[test]
    fn paint_visits_every_rectangle_once() {
        let mut rects = Rects::new(&[(30, 10), (10, 30), (20, 20), (5, 5), (40, 8)]);
        let mut atlas = Atlas::new(64, 64);
        atlas.pack(&rects.ids(), &mut rects).unwrap();

        let mut painted = 0;
        for bin in 0..atlas.bin_count() {
            let mut image = vec![vec![None; 64]; 64];
            atlas.paint(bin, &mut image, &rects).unwrap();
            painted += image.iter().flatten().flatten().count();
        }

        let expected: usize = rects
            .sizes
            .iter()
            .map(|&(w, h)| w as usize * h as usize)
            .sum();
        assert_eq!(painted, expected);
    }

    #[test]
    fn random_batches_never_lose_or_overlap() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..20 {
            let count = rng.gen_range(1..200);
            let sizes: Vec<(i16, i16)> = (0..count)
                .map(|_| (rng.gen_range(1..=100), rng.gen_range(1..=100)))
                .collect();
            let mut rects = Rects::new(&sizes);
            let mut atlas = Atlas::new(128, 128);

            let ids = rects.ids();
            let (first, rest) = ids.split_at(ids.len() / 2);
            atlas.pack(first, &mut rects).unwrap();
            atlas.pack(rest, &mut rects).unwrap();

            assert_invariants(&atlas, &rects);
        }
    }
}
