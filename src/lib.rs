/// AES-128 reference primitives shared by the tile datapath
pub mod aes_128;
/// Stimulus driver stepping the tile through the reference pin sequencing
pub mod host;
pub mod logger;
/// Cycle-accurate model of the pin-limited AES-128 tile
pub mod tile;
mod util;
