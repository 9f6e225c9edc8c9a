//! Control port byte layout:
//!
//! | bits | field     |
//! |------|-----------|
//! | 0    | `start`   |
//! | 2:1  | `opcode`  |
//! | 7:3  | `address` |

const START_BIT: u8 = 0x01;
const OPCODE_SHIFT: u32 = 1;
const OPCODE_MASK: u8 = 0b11;
const ADDRESS_SHIFT: u32 = 3;
const ADDRESS_MASK: u8 = 0b1_1111;

/// Mask applied to the address field when selecting a data register byte
pub const OUTPUT_ADDRESS_MASK: u8 = 0x0f;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Opcode {
    #[default]
    KeyLoad,
    DataLoad,
    Encrypt,
    Output,
}

impl Opcode {
    fn from_bits(bits: u8) -> Self {
        match bits & OPCODE_MASK {
            0b00 => Opcode::KeyLoad,
            0b01 => Opcode::DataLoad,
            0b10 => Opcode::Encrypt,
            _ => Opcode::Output,
        }
    }

    fn bits(self) -> u8 {
        match self {
            Opcode::KeyLoad => 0b00,
            Opcode::DataLoad => 0b01,
            Opcode::Encrypt => 0b10,
            Opcode::Output => 0b11,
        }
    }
}

/// Decoded control byte. Every byte value decodes; there is no invalid command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlByte {
    pub start: bool,
    pub opcode: Opcode,
    /// Raw 5-bit address field, see [`ControlByte::output_address`]
    pub address: u8,
}

impl ControlByte {
    pub fn decode(byte: u8) -> Self {
        Self {
            start: byte & START_BIT != 0,
            opcode: Opcode::from_bits(byte >> OPCODE_SHIFT),
            address: (byte >> ADDRESS_SHIFT) & ADDRESS_MASK,
        }
    }

    pub fn encode(&self) -> u8 {
        (self.start as u8)
            | (self.opcode.bits() << OPCODE_SHIFT)
            | ((self.address & ADDRESS_MASK) << ADDRESS_SHIFT)
    }

    pub fn command(opcode: Opcode, start: bool) -> Self {
        Self {
            start,
            opcode,
            address: 0,
        }
    }

    pub fn read(address: u8) -> Self {
        Self {
            start: false,
            opcode: Opcode::Output,
            address,
        }
    }

    /// Data register index selected by this byte. Addresses 16..=31 alias onto 0..=15.
    pub fn output_address(&self) -> usize {
        (self.address & OUTPUT_ADDRESS_MASK) as usize
    }

    pub fn is_output(&self) -> bool {
        self.opcode == Opcode::Output
    }
}
