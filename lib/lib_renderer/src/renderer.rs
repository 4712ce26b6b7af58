use glam::UVec2;

use crate::{
    Assets, CommandGroup, DrawQueue, Frame, GpuGroup, Palette, RenderError, StickyError,
};

/// GPU operations needed to present one frame.
///
/// Errors are reported to the caller, which records them without
/// interrupting the frame.
pub trait RenderBackend {
    fn upload_palette(&mut self, palette: &Palette) -> Result<(), RenderError>;

    /// Uploads the group table and the whole parameter stream.
    fn upload_commands(&mut self, groups: &[GpuGroup], params: &[i16]) -> Result<(), RenderError>;

    /// Starts the canvas pass, optionally filling it with a palette index.
    fn begin_canvas(&mut self, clear: Option<u8>);

    /// Draws `group.count` instances of the group at position `index` in
    /// the uploaded table.
    fn draw(&mut self, index: u32, group: &CommandGroup);

    fn end_canvas(&mut self) -> Result<(), RenderError>;

    /// Copies the canvas to the display with integer zoom and letterboxing.
    fn blit(&mut self) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Idle,
    Accumulating,
    Flushing,
}

/// Per-frame command accumulation and submission.
#[derive(Debug)]
pub struct Renderer {
    queue: DrawQueue,
    palette: Palette,
    clear: Option<u8>,
    state: FrameState,
    error: StickyError,
    frames: u64,
    gpu_groups: Vec<GpuGroup>,
}

impl Renderer {
    pub fn new(palette: Palette) -> Self {
        Self {
            queue: DrawQueue::new(),
            palette,
            clear: None,
            state: FrameState::Idle,
            error: StickyError::default(),
            frames: 0,
            gpu_groups: Vec::with_capacity(DrawQueue::INITIAL_GROUPS),
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Number of completed flushes.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    pub fn queue(&self) -> &DrawQueue {
        &self.queue
    }

    /// Starts (or continues) accumulating the current frame.
    pub fn frame<'a>(&'a mut self, assets: &'a Assets, canvas: UVec2) -> Frame<'a> {
        self.state = FrameState::Accumulating;

        Frame {
            queue: &mut self.queue,
            palette: &mut self.palette,
            clear: &mut self.clear,
            assets,
            canvas,
        }
    }

    /// Submits everything accumulated since the last flush and empties the
    /// queue. Failures go to the sticky error; the frame always completes.
    pub fn flush(&mut self, backend: &mut impl RenderBackend) {
        self.state = FrameState::Flushing;

        if self.palette.take_changed() {
            if let Err(err) = backend.upload_palette(&self.palette) {
                self.error.set(err);
            }
        }

        let clear = self.clear.take();

        if !self.queue.is_empty() || clear.is_some() {
            let uploaded = self.queue.is_empty() || self.upload(backend);

            backend.begin_canvas(clear);
            if uploaded {
                for (index, group) in self.queue.groups().iter().enumerate() {
                    backend.draw(index as u32, group);
                }
            }
            if let Err(err) = backend.end_canvas() {
                self.error.set(err);
            }
        }

        if let Err(err) = backend.blit() {
            self.error.set(err);
        }

        self.queue.clear();
        self.frames += 1;
        self.state = FrameState::Idle;
    }

    fn upload(&mut self, backend: &mut impl RenderBackend) -> bool {
        self.gpu_groups.clear();
        self.gpu_groups
            .extend(self.queue.groups().iter().map(GpuGroup::from));

        match backend.upload_commands(&self.gpu_groups, self.queue.params()) {
            Ok(()) => true,
            Err(err) => {
                log::warn!(
                    "dropping {} command groups of frame {}",
                    self.gpu_groups.len(),
                    self.frames
                );
                self.error.set(err);
                false
            }
        }
    }

    /// Reports a failure that happened outside of `flush`, such as a
    /// surface or canvas reallocation.
    pub fn report(&mut self, err: RenderError) {
        self.error.set(err);
    }

    pub fn has_error(&self) -> bool {
        self.error.is_set()
    }

    /// The first error since the last call, if any.
    pub fn take_error(&mut self) -> Option<RenderError> {
        self.error.take()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}
