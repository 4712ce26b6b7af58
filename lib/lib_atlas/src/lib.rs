//! Packing of many small pixel rectangles into a growable list of fixed-size
//! texture bins.
//!
//! Each bin is the root of a binary [`Region`] tree that is split along one
//! full edge every time a rectangle is inserted into a leaf larger than it.
//! The [`Atlas`] sorts rectangles by perimeter, tries every existing bin in
//! order and opens a new bin when none of them has room.

mod atlas;
mod error;
mod region;
pub use atlas::*;
pub use error::*;
pub use region::*;
