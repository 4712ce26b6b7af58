use crate::{
    BoxParams, CommandTag, GlyphParams, LineParams, PictureParams, PointParams, TextParams,
    TriangleParams,
};

/// A single drawing command, as recorded in a [`DrawQueue`](crate::DrawQueue).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Picture(PictureParams),
    Point(PointParams),
    Line(LineParams),
    Triangle(TriangleParams),
    Box(BoxParams),
    Text {
        header: TextParams,
        glyphs: Vec<GlyphParams>,
    },
}

impl Command {
    pub fn tag(&self) -> CommandTag {
        match self {
            Command::Picture(_) => CommandTag::Picture,
            Command::Point(_) => CommandTag::Point,
            Command::Line(_) => CommandTag::Line,
            Command::Triangle(_) => CommandTag::Triangle,
            Command::Box(_) => CommandTag::Box,
            Command::Text { .. } => CommandTag::Text,
        }
    }

    /// Appends the parameters of this command to `out`.
    pub fn encode(&self, out: &mut Vec<i16>) {
        match self {
            Command::Picture(p) => p.encode(out),
            Command::Point(p) => p.encode(out),
            Command::Line(p) => p.encode(out),
            Command::Triangle(p) => p.encode(out),
            Command::Box(p) => p.encode(out),
            Command::Text { header, glyphs } => {
                header.encode(out);
                for glyph in glyphs {
                    glyph.encode(out);
                }
            }
        }
    }

    /// Reads `count` commands of kind `tag` from the start of `params`.
    pub fn decode(tag: CommandTag, params: &[i16], count: usize) -> Vec<Command> {
        if tag == CommandTag::Text {
            let glyphs = params[TextParams::STRIDE..]
                .chunks_exact(GlyphParams::STRIDE)
                .take(count)
                .map(GlyphParams::decode)
                .collect();

            return vec![Command::Text {
                header: TextParams::decode(params),
                glyphs,
            }];
        }

        params
            .chunks_exact(tag.stride())
            .take(count)
            .map(|p| match tag {
                CommandTag::Picture => Command::Picture(PictureParams::decode(p)),
                CommandTag::Point => Command::Point(PointParams::decode(p)),
                CommandTag::Line => Command::Line(LineParams::decode(p)),
                CommandTag::Triangle => Command::Triangle(TriangleParams::decode(p)),
                CommandTag::Box => Command::Box(BoxParams::decode(p)),
                CommandTag::Text => unreachable!(),
            })
            .collect()
    }
}
