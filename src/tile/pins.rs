/// Inputs sampled on a clock edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinInputs {
    /// Control port
    pub ui_in: u8,
    /// Bidirectional port, input half
    pub uio_in: u8,
    pub ena: bool,
    /// Active-low reset
    pub rst_n: bool,
}

impl Default for PinInputs {
    fn default() -> Self {
        Self {
            ui_in: 0,
            uio_in: 0,
            ena: true,
            rst_n: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinOutputs {
    /// Dedicated output port
    pub uo_out: u8,
    pub uio_out: u8,
    /// Output enable of the bidirectional port, 0 = input
    pub uio_oe: u8,
}

/// `uio_oe` value: all bidirectional pins are inputs
pub const UIO_ALL_INPUTS: u8 = 0x00;
