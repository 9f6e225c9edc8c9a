use crate::aes_128::Block;
use crate::tile::protocol::ControlByte;

/// Byte driven on `uo_out` for the presented control byte: the addressed data register byte in
/// OUTPUT, otherwise 0. Reads never change state.
pub fn select(data: &Block, control: ControlByte) -> u8 {
    if control.is_output() {
        data[control.output_address()]
    } else {
        0
    }
}
