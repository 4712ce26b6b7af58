//! Parameter layouts shared by the host encoder and the draw shader.
//!
//! Every layout is a `#[repr(C)]` struct of `i16` fields. The WGSL constants
//! describing strides and field offsets are generated from the same structs
//! and prepended to the shader source.

use std::{fmt::Write, mem::offset_of};

use bytemuck::{Pod, Zeroable};

macro_rules! param_layout {
    ($(#[$meta:meta])* $name:ident => $prefix:literal { $($field:ident),* $(,)? }) => {
        $(#[$meta])*
        #[repr(C)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
        pub struct $name {
            $(pub $field: i16,)*
        }

        impl $name {
            /// Number of `i16` values in one record.
            pub const STRIDE: usize = size_of::<Self>() / size_of::<i16>();

            pub fn encode(&self, out: &mut Vec<i16>) {
                out.extend_from_slice(bytemuck::cast_slice(std::slice::from_ref(self)));
            }

            /// Reads one record from the start of `params`.
            pub fn decode(params: &[i16]) -> Self {
                bytemuck::pod_read_unaligned(bytemuck::cast_slice(&params[..Self::STRIDE]))
            }

            fn write_wgsl(out: &mut String) {
                let _ = writeln!(out, "const {}_STRIDE: u32 = {}u;", $prefix, Self::STRIDE);
                $(
                    let _ = writeln!(
                        out,
                        "const {}_{}: u32 = {}u;",
                        $prefix,
                        stringify!($field).to_ascii_uppercase(),
                        offset_of!($name, $field) / size_of::<i16>(),
                    );
                )*
            }
        }
    };
}

param_layout! {
    /// Location of a picture inside the atlas. `bin` is negative until the
    /// picture has been packed.
    Mapping => "MAPPING" { bin, x, y, w, h }
}

param_layout! {
    PictureParams => "PICTURE" { picture, x, y, layer, shift }
}

param_layout! {
    PointParams => "POINT" { color, x, y, layer }
}

param_layout! {
    LineParams => "LINE" { color, x1, y1, x2, y2, layer }
}

param_layout! {
    TriangleParams => "TRIANGLE" { color, x1, y1, x2, y2, x3, y3, layer }
}

param_layout! {
    BoxParams => "BOX" { fill, border, corner, x, y, w, h, layer }
}

param_layout! {
    /// Header of a text run; one [`GlyphParams`] per character follows.
    TextParams => "TEXT" { color, y, layer }
}

param_layout! {
    GlyphParams => "GLYPH" { picture, x }
}

/// Command kinds, as stored in command groups and tested by the shader.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandTag {
    Picture = 1,
    Point = 2,
    Line = 3,
    Triangle = 4,
    Box = 5,
    Text = 6,
}

impl CommandTag {
    pub const ALL: [CommandTag; 6] = [
        CommandTag::Picture,
        CommandTag::Point,
        CommandTag::Line,
        CommandTag::Triangle,
        CommandTag::Box,
        CommandTag::Text,
    ];

    /// Whether consecutive commands of this kind share one instanced draw.
    /// Text runs merge only with an identical header, see `DrawQueue`.
    pub fn is_instanced(self) -> bool {
        !matches!(self, CommandTag::Triangle | CommandTag::Text)
    }

    /// Parameters per instance. For text this is the per-glyph part.
    pub fn stride(self) -> usize {
        match self {
            CommandTag::Picture => PictureParams::STRIDE,
            CommandTag::Point => PointParams::STRIDE,
            CommandTag::Line => LineParams::STRIDE,
            CommandTag::Triangle => TriangleParams::STRIDE,
            CommandTag::Box => BoxParams::STRIDE,
            CommandTag::Text => GlyphParams::STRIDE,
        }
    }

    pub fn from_u32(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| *tag as u32 == value)
    }

    fn wgsl_name(self) -> &'static str {
        match self {
            CommandTag::Picture => "CMD_PICTURE",
            CommandTag::Point => "CMD_POINT",
            CommandTag::Line => "CMD_LINE",
            CommandTag::Triangle => "CMD_TRIANGLE",
            CommandTag::Box => "CMD_BOX",
            CommandTag::Text => "CMD_TEXT",
        }
    }
}

/// Vertices issued per command group; the shader derives the group index
/// from the vertex index.
pub const VERTICES_PER_GROUP: u32 = 6;

/// WGSL declarations matching the layouts above.
pub fn wgsl_layout() -> String {
    let mut out = String::new();

    let _ = writeln!(out, "const VERTICES_PER_GROUP: u32 = {VERTICES_PER_GROUP}u;");
    for tag in CommandTag::ALL {
        let _ = writeln!(out, "const {}: u32 = {}u;", tag.wgsl_name(), tag as u32);
    }

    Mapping::write_wgsl(&mut out);
    PictureParams::write_wgsl(&mut out);
    PointParams::write_wgsl(&mut out);
    LineParams::write_wgsl(&mut out);
    TriangleParams::write_wgsl(&mut out);
    BoxParams::write_wgsl(&mut out);
    TextParams::write_wgsl(&mut out);
    GlyphParams::write_wgsl(&mut out);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_match_field_counts() {
        assert_eq!(Mapping::STRIDE, 5);
        assert_eq!(PictureParams::STRIDE, 5);
        assert_eq!(PointParams::STRIDE, 4);
        assert_eq!(LineParams::STRIDE, 6);
        assert_eq!(TriangleParams::STRIDE, 8);
        assert_eq!(BoxParams::STRIDE, 8);
        assert_eq!(TextParams::STRIDE, 3);
        assert_eq!(GlyphParams::STRIDE, 2);
    }

    #[test]
    fn encode_keeps_field_order() {
        let mut out = Vec::new();
        LineParams {
            color: 9,
            x1: -1,
            y1: 2,
            x2: 300,
            y2: 4,
            layer: -7,
        }
        .encode(&mut out);

        assert_eq!(out, [9, -1, 2, 300, 4, -7]);
        assert_eq!(LineParams::decode(&out).x2, 300);
    }

    #[test]
    fn wgsl_constants_follow_layouts() {
        let wgsl = wgsl_layout();

        assert!(wgsl.contains("const CMD_PICTURE: u32 = 1u;"));
        assert!(wgsl.contains("const CMD_TEXT: u32 = 6u;"));
        assert!(wgsl.contains("const PICTURE_STRIDE: u32 = 5u;"));
        assert!(wgsl.contains("const PICTURE_SHIFT: u32 = 4u;"));
        assert!(wgsl.contains("const BOX_LAYER: u32 = 7u;"));
        assert!(wgsl.contains("const GLYPH_X: u32 = 1u;"));
        assert!(wgsl.contains("const MAPPING_H: u32 = 4u;"));
    }

    #[test]
    fn tags_round_trip_through_u32() {
        for tag in CommandTag::ALL {
            assert_eq!(CommandTag::from_u32(tag as u32), Some(tag));
        }
        assert_eq!(CommandTag::from_u32(0), None);
    }
}
