use std::fmt;

/// An axis-aligned rectangle inside a bin, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub x: i16,
    pub y: i16,
    pub width: i16,
    pub height: i16,
}

/// Where a rectangle ended up: the bin index and its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub bin: i16,
    pub x: i16,
    pub y: i16,
}

/// A node of the per-bin packing tree.
///
/// A region is either a free leaf, a leaf holding exactly one rectangle, or a
/// split node owning two children that partition its area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    bounds: Bounds,
    assigned: Option<u32>,
    children: Option<Box<[Region; 2]>>,
}

impl Bounds {
    pub const fn new(x: i16, y: i16, width: i16, height: i16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u32 {
        (self.width.max(0) as u32) * (self.height.max(0) as u32)
    }

    pub fn right(&self) -> i32 {
        self.x as i32 + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y as i32 + self.height as i32
    }

    pub fn overlaps(&self, other: &Bounds) -> bool {
        (self.x as i32) < other.right()
            && (other.x as i32) < self.right()
            && (self.y as i32) < other.bottom()
            && (other.y as i32) < self.bottom()
    }

    pub fn contains(&self, other: &Bounds) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Guillotine cut leaving a `width`x`height` corner in the first half.
    ///
    /// The cut runs along the axis with more slack: a vertical cut when the
    /// leftover width is strictly larger than the leftover height, a
    /// horizontal cut otherwise.
    fn split(&self, width: i16, height: i16) -> (Bounds, Bounds) {
        let dw = self.width - width;
        let dh = self.height - height;

        if dw > dh {
            (
                Bounds::new(self.x, self.y, width, self.height),
                Bounds::new(self.x + width, self.y, dw, self.height),
            )
        } else {
            (
                Bounds::new(self.x, self.y, self.width, height),
                Bounds::new(self.x, self.y + height, self.width, dh),
            )
        }
    }
}

impl Region {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            assigned: None,
            children: None,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn assigned(&self) -> Option<u32> {
        self.assigned
    }

    pub fn children(&self) -> Option<(&Region, &Region)> {
        self.children.as_deref().map(|[first, second]| (first, second))
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Finds room for a `width`x`height` rectangle in this subtree, splitting
    /// leaves as needed. Returns `None` when the subtree has no leaf large
    /// enough.
    pub fn insert(&mut self, id: u32, width: i16, height: i16, bin: i16) -> Option<Placement> {
        if let Some(children) = &mut self.children {
            let [first, second] = &mut **children;

            return first
                .insert(id, width, height, bin)
                .or_else(|| second.insert(id, width, height, bin));
        }

        if self.assigned.is_some() || width <= 0 || height <= 0 {
            return None;
        }

        if width > self.bounds.width || height > self.bounds.height {
            return None;
        }

        if width == self.bounds.width && height == self.bounds.height {
            self.assigned = Some(id);

            return Some(Placement {
                bin,
                x: self.bounds.x,
                y: self.bounds.y,
            });
        }

        let (first, second) = self.bounds.split(width, height);
        let children = self
            .children
            .insert(Box::new([Region::new(first), Region::new(second)]));

        children[0].insert(id, width, height, bin)
    }

    /// Calls `f` once for every assigned leaf, depth first.
    pub fn visit(&self, f: &mut impl FnMut(u32, Bounds)) {
        let _ = self.try_visit(&mut |id, bounds| {
            f(id, bounds);
            Ok::<(), ()>(())
        });
    }

    /// Like [`Region::visit`], stopping at the first error.
    pub fn try_visit<E>(
        &self,
        f: &mut impl FnMut(u32, Bounds) -> Result<(), E>,
    ) -> Result<(), E> {
        if let Some(id) = self.assigned {
            return f(id, self.bounds);
        }

        if let Some((first, second)) = self.children() {
            first.try_visit(f)?;
            second.try_visit(f)?;
        }

        Ok(())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.children() {
            Some((first, second)) => write!(f, "{{ {first}, {second} }}"),
            None if self.assigned.is_some() => {
                write!(f, "{}x{}", self.bounds.width, self.bounds.height)
            }
            None => write!(f, "nil"),
        }
    }
}
