use bytemuck::{Pod, Zeroable};

use crate::{Command, CommandTag, GlyphParams, TextParams};

/// A run of consecutive commands drawn with a single instanced draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandGroup {
    pub tag: CommandTag,
    /// Offset of the first parameter in the stream, in `i16` units.
    pub base: u32,
    /// Number of instances. For text, the number of glyphs.
    pub count: u32,
}

/// [`CommandGroup`] as read by the draw shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct GpuGroup {
    pub tag: u32,
    pub base: u32,
    pub count: u32,
    pub _pad: u32,
}

impl From<&CommandGroup> for GpuGroup {
    fn from(group: &CommandGroup) -> Self {
        Self {
            tag: group.tag as u32,
            base: group.base,
            count: group.count,
            _pad: 0,
        }
    }
}

/// Drawing commands recorded during one frame, as a parameter stream
/// partitioned into command groups.
#[derive(Debug, Clone)]
pub struct DrawQueue {
    groups: Vec<CommandGroup>,
    params: Vec<i16>,
}

impl DrawQueue {
    pub const INITIAL_GROUPS: usize = 1024;
    pub const INITIAL_PARAMS: usize = 4096;

    pub fn new() -> Self {
        Self::with_capacity(Self::INITIAL_GROUPS, Self::INITIAL_PARAMS)
    }

    pub fn with_capacity(groups: usize, params: usize) -> Self {
        Self {
            groups: Vec::with_capacity(groups),
            params: Vec::with_capacity(params),
        }
    }

    /// Appends commands of kind `tag` given as raw parameters.
    ///
    /// For instanced kinds `params` may hold several records back to back;
    /// they join the last group when it has the same tag. Triangles always
    /// get a group each. For text, `params` is a header followed by glyphs.
    pub fn append(&mut self, tag: CommandTag, params: &[i16]) {
        if tag == CommandTag::Text {
            if params.len() >= TextParams::STRIDE {
                let (header, glyphs) = params.split_at(TextParams::STRIDE);
                self.append_text_raw(header, glyphs);
            }
            return;
        }

        let stride = tag.stride();
        debug_assert_eq!(params.len() % stride, 0, "partial {tag:?} record");
        let count = (params.len() / stride) as u32;
        if count == 0 {
            return;
        }

        if tag.is_instanced() {
            match self.groups.last_mut() {
                Some(last) if last.tag == tag => last.count += count,
                _ => self.groups.push(CommandGroup {
                    tag,
                    base: self.params.len() as u32,
                    count,
                }),
            }
            self.params.extend_from_slice(&params[..count as usize * stride]);
        } else {
            for record in params.chunks_exact(stride) {
                self.groups.push(CommandGroup {
                    tag,
                    base: self.params.len() as u32,
                    count: 1,
                });
                self.params.extend_from_slice(record);
            }
        }
    }

    /// Appends a text run. It extends the previous run when both share the
    /// same header.
    pub fn append_text(&mut self, header: TextParams, glyphs: &[GlyphParams]) {
        let mut raw = Vec::with_capacity(TextParams::STRIDE);
        header.encode(&mut raw);
        self.append_text_raw(&raw, bytemuck::cast_slice(glyphs));
    }

    fn append_text_raw(&mut self, header: &[i16], glyphs: &[i16]) {
        let count = (glyphs.len() / GlyphParams::STRIDE) as u32;
        if count == 0 {
            return;
        }
        let glyphs = &glyphs[..count as usize * GlyphParams::STRIDE];

        if let Some(last) = self.groups.last_mut() {
            let base = last.base as usize;
            if last.tag == CommandTag::Text && self.params[base..base + TextParams::STRIDE] == *header
            {
                last.count += count;
                self.params.extend_from_slice(glyphs);
                return;
            }
        }

        self.groups.push(CommandGroup {
            tag: CommandTag::Text,
            base: self.params.len() as u32,
            count,
        });
        self.params.extend_from_slice(header);
        self.params.extend_from_slice(glyphs);
    }

    pub fn push(&mut self, command: &Command) {
        match command {
            Command::Text { header, glyphs } => self.append_text(*header, glyphs),
            _ => {
                let mut raw = Vec::with_capacity(8);
                command.encode(&mut raw);
                self.append(command.tag(), &raw);
            }
        }
    }

    pub fn groups(&self) -> &[CommandGroup] {
        &self.groups
    }

    pub fn params(&self) -> &[i16] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Commands in the order they will be drawn, rebuilt from the stream.
    pub fn commands(&self) -> Vec<Command> {
        self.groups
            .iter()
            .flat_map(|group| {
                Command::decode(
                    group.tag,
                    &self.params[group.base as usize..],
                    group.count as usize,
                )
            })
            .collect()
    }

    /// Empties the queue, keeping its allocations.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.params.clear();
    }
}

impl Default for DrawQueue {
    fn default() -> Self {
        Self::new()
    }
}
