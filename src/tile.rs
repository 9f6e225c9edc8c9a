//! Cycle-accurate model of the AES-128 tile. [`AesTile::tick`] is one rising clock edge.

use crate::aes_128::{Block, Key};
use crate::tile::fsm::{ControlState, ControlUnit};
use crate::tile::pins::{PinInputs, PinOutputs, UIO_ALL_INPUTS};
use crate::tile::protocol::ControlByte;
use tracing::trace;

pub mod datapath;
pub mod fsm;
pub mod key_expansion;
pub mod output;
pub mod pins;
pub mod protocol;
pub mod registers;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AesTile {
    unit: ControlUnit,
    /// Set while `rst_n` is low, consumed by the first edge after release
    reset_pending: bool,
}

impl AesTile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asynchronous reset, callable at any point between edges
    pub fn reset(&mut self) {
        self.unit.reset();
    }

    /// One clock edge. Reset has priority over enable, enable gates every other update.
    pub fn tick(&mut self, pins: &PinInputs) -> PinOutputs {
        if !pins.rst_n {
            self.reset_pending = true;
            self.reset();
        } else if self.reset_pending {
            self.reset_pending = false;
            self.reset();
        } else if pins.ena {
            self.unit.clock(ControlByte::decode(pins.ui_in), pins.uio_in);
        } else {
            trace!(state = ?self.unit.state(), "clock gated");
        }
        self.outputs(pins)
    }

    /// Combinational outputs for the presented inputs
    pub fn outputs(&self, pins: &PinInputs) -> PinOutputs {
        PinOutputs {
            uo_out: output::select(self.unit.data(), ControlByte::decode(pins.ui_in)),
            uio_out: 0,
            uio_oe: UIO_ALL_INPUTS,
        }
    }

    pub fn state(&self) -> ControlState {
        self.unit.state()
    }

    pub fn key_register(&self) -> &Key {
        self.unit.key()
    }

    pub fn data_register(&self) -> &Block {
        self.unit.data()
    }

    pub fn control_unit(&self) -> &ControlUnit {
        &self.unit
    }
}
