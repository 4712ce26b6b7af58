use wgpu::{Buffer, BufferDescriptor, BufferUsages, COPY_BUFFER_ALIGNMENT, ErrorFilter};

use crate::{RenderContext, RenderError};

/// A GPU buffer rewritten every frame, reallocated when the data outgrows it.
/// It never shrinks.
#[derive(Debug)]
pub struct GpuBuffer {
    label: &'static str,
    usage: BufferUsages,
    buf: Buffer,
    generation: u64,
    padding: Vec<u8>,
}

impl GpuBuffer {
    pub fn new(label: &'static str, usage: BufferUsages, cap: u64, ctx: RenderContext<'_>) -> Self {
        let buf = ctx.device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size: align(cap.max(COPY_BUFFER_ALIGNMENT)),
            usage: usage | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            label,
            usage: usage | BufferUsages::COPY_DST,
            buf,
            generation: 0,
            padding: Vec::new(),
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buf
    }

    pub fn capacity(&self) -> u64 {
        self.buf.size()
    }

    /// Number of reallocations so far. Bind groups built at an older
    /// generation refer to a dropped buffer.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Copies `data` to the start of the buffer. Returns `true` when the
    /// buffer had to be reallocated, in which case bind groups referring to
    /// it are stale.
    pub fn write(&mut self, data: &[u8], ctx: RenderContext<'_>) -> Result<bool, RenderError> {
        let size = align(data.len() as u64);
        let grown = size > self.buf.size();

        if grown {
            self.grow(size, ctx)?;
        }

        if data.is_empty() {
            return Ok(grown);
        }

        if size == data.len() as u64 {
            ctx.queue.write_buffer(&self.buf, 0, data);
        } else {
            self.padding.clear();
            self.padding.extend_from_slice(data);
            self.padding.resize(size as usize, 0);
            ctx.queue.write_buffer(&self.buf, 0, &self.padding);
        }

        Ok(grown)
    }

    fn grow(&mut self, needed: u64, ctx: RenderContext<'_>) -> Result<(), RenderError> {
        let max = if self.usage.contains(BufferUsages::STORAGE) {
            ctx.device.limits().max_storage_buffer_binding_size as u64
        } else {
            ctx.device.limits().max_buffer_size
        };
        let size = grown_size(self.label, self.buf.size(), needed, max)?;

        ctx.device.push_error_scope(ErrorFilter::OutOfMemory);
        let buf = ctx.device.create_buffer(&BufferDescriptor {
            label: Some(self.label),
            size,
            usage: self.usage,
            mapped_at_creation: false,
        });
        if let Some(err) = pollster::block_on(ctx.device.pop_error_scope()) {
            return Err(RenderError::BufferAllocation {
                label: self.label,
                size,
                reason: err.to_string(),
            });
        }

        log::debug!("{} grown from {} to {size} bytes", self.label, self.buf.size());
        self.buf = buf;
        self.generation += 1;

        Ok(())
    }
}

/// Capacity for a buffer of `current` bytes that must hold `needed` bytes:
/// at least double the current one, capped at `max`. Never less than
/// `current`.
pub fn grown_size(
    label: &'static str,
    current: u64,
    needed: u64,
    max: u64,
) -> Result<u64, RenderError> {
    let needed = align(needed);
    if needed <= current {
        return Ok(current);
    }

    if needed > max {
        return Err(RenderError::BufferTooLarge {
            label,
            size: needed,
            max,
        });
    }

    Ok(align(needed.max(current.saturating_mul(2)).min(max)))
}

fn align(size: u64) -> u64 {
    size.div_ceil(COPY_BUFFER_ALIGNMENT) * COPY_BUFFER_ALIGNMENT
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u64 = 1 << 20;

    #[test]
    fn growth_doubles_the_capacity() {
        assert_eq!(grown_size("test", 1024, 1028, MAX), Ok(2048));
        assert_eq!(grown_size("test", 1024, 1500, MAX), Ok(2048));
    }

    #[test]
    fn growth_covers_large_jumps() {
        assert_eq!(grown_size("test", 1024, 5000, MAX), Ok(5000));
        assert_eq!(grown_size("test", 4, 4096, MAX), Ok(4096));
    }

    #[test]
    fn exact_fit_keeps_the_buffer() {
        assert_eq!(grown_size("test", 1024, 1024, MAX), Ok(1024));
    }

    #[test]
    fn sizes_are_padded_to_the_copy_alignment() {
        assert_eq!(grown_size("test", 1024, 1022, MAX), Ok(1024));
        assert_eq!(grown_size("test", 0, 5, MAX), Ok(8));
        assert_eq!(align(10), 12);
    }

    #[test]
    fn growth_is_capped_at_the_device_limit() {
        assert_eq!(grown_size("test", MAX - 1024, MAX - 512, MAX), Ok(MAX));
        assert_eq!(
            grown_size("test", MAX, MAX + 4, MAX),
            Err(RenderError::BufferTooLarge {
                label: "test",
                size: MAX + 4,
                max: MAX,
            })
        );
    }

    #[test]
    fn smaller_data_never_shrinks() {
        assert_eq!(grown_size("test", 4096, 16, MAX), Ok(4096));
        assert_eq!(grown_size("test", 4096, 0, MAX), Ok(4096));
    }
}
