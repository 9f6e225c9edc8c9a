use crate::aes_128::Block;
use std::ops::Index;

pub const REGISTER_BYTES: usize = 16;

/// 16-byte register written one byte per cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteRegister(Block);

impl ByteRegister {
    pub fn bytes(&self) -> &Block {
        &self.0
    }

    pub fn bytes_mut(&mut self) -> &mut Block {
        &mut self.0
    }

    pub fn clear(&mut self) {
        self.0 = Default::default();
    }
}

impl From<Block> for ByteRegister {
    fn from(block: Block) -> Self {
        Self(block)
    }
}

impl Index<usize> for ByteRegister {
    type Output = u8;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Position of the next byte in a load phase, saturating at [`REGISTER_BYTES`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteCounter(u8);

impl ByteCounter {
    pub fn value(&self) -> usize {
        self.0 as usize
    }

    pub fn is_saturated(&self) -> bool {
        self.value() >= REGISTER_BYTES
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Writes `byte` at the current position and advances. Returns `false` and leaves the register
    /// untouched once 16 bytes have been accepted.
    pub fn accept(&mut self, register: &mut ByteRegister, byte: u8) -> bool {
        if self.is_saturated() {
            return false;
        }
        register.0[self.value()] = byte;
        self.0 += 1;
        true
    }
}
