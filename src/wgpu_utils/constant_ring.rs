// src/wgpu_utils/constant_ring.rs
//! Per-frame constant storage addressed by dynamic offsets
//!
//! Every draw in a frame may bind different constant bytes to the same slot.
//! The bytes are staged on the CPU in fixed-size blocks, uploaded once before
//! the frame's render pass, and each draw selects its block with a dynamic
//! offset. Block 0 is always zero-filled and serves draws that bound nothing.

/// CPU side of the ring: fixed-size blocks, repeated data reuses the last block.
#[derive(Debug)]
pub struct ConstantStaging {
    block_size: usize,
    bytes: Vec<u8>,
    last: Option<(Vec<u8>, u32)>,
}

impl ConstantStaging {
    /// `block_size` must be a multiple of the device's uniform offset alignment.
    pub fn new(block_size: usize) -> Self {
        let mut staging = Self {
            block_size,
            bytes: Vec::new(),
            last: None,
        };
        staging.reset();
        staging
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Drops every block but the zero block.
    pub fn reset(&mut self) {
        self.bytes.clear();
        self.bytes.resize(self.block_size, 0);
        self.last = None;
    }

    /// Stages `data` and returns the byte offset of its block.
    ///
    /// `data` longer than a block is truncated; callers validate sizes first.
    pub fn push(&mut self, data: &[u8]) -> u32 {
        if let Some((previous, offset)) = &self.last {
            if previous.as_slice() == data {
                return *offset;
            }
        }

        let offset = self.bytes.len();
        let len = data.len().min(self.block_size);
        self.bytes.extend_from_slice(&data[..len]);
        self.bytes.resize(offset + self.block_size, 0);

        let offset = offset as u32;
        self.last = Some((data.to_vec(), offset));
        offset
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn block_count(&self) -> usize {
        self.bytes.len() / self.block_size
    }
}

/// GPU buffer backing a [`ConstantStaging`], grown on demand.
pub struct ConstantRing {
    label: String,
    buffer: wgpu::Buffer,
    capacity: u64,
    pub staging: ConstantStaging,
}

impl ConstantRing {
    pub fn new(device: &wgpu::Device, label: &str, block_size: usize, initial_blocks: usize) -> Self {
        let capacity = (block_size * initial_blocks.max(1)) as u64;
        Self {
            label: label.to_string(),
            buffer: Self::create_buffer(device, label, capacity),
            capacity,
            staging: ConstantStaging::new(block_size),
        }
    }

    fn create_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Writes the staged blocks. Returns true when the buffer had to be
    /// recreated, in which case bind groups referencing it are stale.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> bool {
        let needed = self.staging.bytes().len() as u64;
        let mut grown = false;
        if needed > self.capacity {
            let capacity = needed.next_power_of_two();
            log::debug!(
                "Growing {} to {} bytes for {} blocks",
                self.label,
                capacity,
                self.staging.block_count()
            );
            self.buffer = Self::create_buffer(device, &self.label, capacity);
            self.capacity = capacity;
            grown = true;
        }
        queue.write_buffer(&self.buffer, 0, self.staging.bytes());
        grown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_block_reserved() {
        let staging = ConstantStaging::new(256);
        assert_eq!(staging.block_count(), 1);
        assert!(staging.bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_push_aligns_to_blocks() {
        let mut staging = ConstantStaging::new(256);
        assert_eq!(staging.push(&[1; 64]), 256);
        assert_eq!(staging.push(&[2; 200]), 512);
        assert_eq!(staging.block_count(), 3);
        assert_eq!(staging.bytes()[256], 1);
        assert_eq!(staging.bytes()[256 + 64], 0);
    }

    #[test]
    fn test_repeated_data_reuses_block() {
        let mut staging = ConstantStaging::new(256);
        let first = staging.push(&[7; 32]);
        assert_eq!(staging.push(&[7; 32]), first);
        assert_ne!(staging.push(&[8; 32]), first);
        // Only the most recent block is reused.
        assert_ne!(staging.push(&[7; 32]), first);
    }

    #[test]
    fn test_reset_keeps_only_zero_block() {
        let mut staging = ConstantStaging::new(256);
        staging.push(&[1; 16]);
        staging.reset();
        assert_eq!(staging.block_count(), 1);
        assert_eq!(staging.push(&[1; 16]), 256);
    }
}
