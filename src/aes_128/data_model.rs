use crate::aes_128::Block;
use std::ops::{BitXor, BitXorAssign, Index, IndexMut};

/// State of 4 rows each of 4 bytes. Block byte `i` lives in row `i % 4`, column `i / 4`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct State([Word; 4]);

impl State {
    pub fn from_array(block: &Block) -> Self {
        let mut this = Self::default();
        for (i, byte) in block.iter().enumerate() {
            this[i % 4][i / 4] = *byte;
        }
        this
    }

    pub fn to_array(&self) -> Block {
        let mut array: Block = Default::default();
        for (i, byte) in array.iter_mut().enumerate() {
            *byte = self[i % 4][i / 4];
        }
        array
    }

    pub fn bytes_mut(&mut self) -> impl Iterator<Item = &mut u8> {
        self.0.iter_mut().flat_map(|row| row.bytes_mut())
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut Word> {
        self.0.iter_mut()
    }

    pub fn column(&self, j: usize) -> Word {
        Word(self.0.each_ref().map(|row| row[j]))
    }

    pub fn set_column(&mut self, j: usize, column: Word) {
        for (row, byte) in self.0.iter_mut().zip(column.bytes()) {
            row[j] = byte;
        }
    }
}

/// XOR of four key words, word `j` applied to column `j`
impl BitXorAssign<&[Word; 4]> for State {
    fn bitxor_assign(&mut self, rhs: &[Word; 4]) {
        for (j, word) in rhs.iter().enumerate() {
            let column = self.column(j) ^ *word;
            self.set_column(j, column);
        }
    }
}

impl Index<usize> for State {
    type Output = Word;

    fn index(&self, row: usize) -> &Self::Output {
        &self.0[row]
    }
}

impl IndexMut<usize> for State {
    fn index_mut(&mut self, row: usize) -> &mut Self::Output {
        &mut self.0[row]
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Word(pub [u8; 4]);

impl Word {
    pub const fn zero() -> Self {
        Self([0; 4])
    }

    pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    pub fn bytes_mut(&mut self) -> impl Iterator<Item = &mut u8> {
        self.0.iter_mut()
    }

    pub fn rotate_left(mut self, mid: usize) -> Self {
        self.0.rotate_left(mid);
        self
    }
}

impl BitXorAssign for Word {
    fn bitxor_assign(&mut self, rhs: Self) {
        for (byte, rhs_byte) in self.bytes_mut().zip(rhs.0) {
            *byte ^= rhs_byte;
        }
    }
}

impl BitXor for Word {
    type Output = Word;

    fn bitxor(mut self, rhs: Self) -> Self::Output {
        self.bitxor_assign(rhs);
        self
    }
}

impl Index<usize> for Word {
    type Output = u8;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for Word {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}
