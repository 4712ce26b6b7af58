use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    #[error("rectangle {id} ({width}x{height}) does not fit in a {bin_width}x{bin_height} bin")]
    TooLarge {
        id: u32,
        width: i16,
        height: i16,
        bin_width: i16,
        bin_height: i16,
    },

    #[error("rectangle {id} has an empty size ({width}x{height})")]
    Empty { id: u32, width: i16, height: i16 },

    #[error("rectangle {id} is listed more than once")]
    Duplicate { id: u32 },

    #[error("rectangle {id} could not be placed in a fresh bin")]
    Unplaced { id: u32 },
}
