//! Host side stimulus: drives an [`AesTile`] through the reference pin sequencing one clock edge at
//! a time.

use crate::aes_128::{Block, Key};
use crate::tile::fsm::{ControlState, ENCRYPT_LATENCY};
use crate::tile::pins::{PinInputs, PinOutputs};
use crate::tile::protocol::{ControlByte, Opcode};
use crate::tile::AesTile;
use crate::util;
use hashbrown::HashMap;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, warn};

/// Cycle timing used by [`Harness`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Cycles `rst_n` is held low at power on
    pub reset_cycles: usize,
    /// Idle cycles after reset release before the first command
    pub settle_cycles: usize,
    /// Idle cycles after clearing `start` at the end of a load
    pub gap_cycles: usize,
    /// Cycles waited after the encrypt trigger edge before reading
    pub encrypt_cycles: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            reset_cycles: 10,
            settle_cycles: 5,
            gap_cycles: 2,
            encrypt_cycles: 50,
        }
    }
}

/// Clock edges observed per control state (sampled before each edge)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleStats {
    by_state: HashMap<ControlState, u64>,
    gated: u64,
    in_reset: u64,
}

impl CycleStats {
    pub fn cycles_in(&self, state: ControlState) -> u64 {
        self.by_state.get(&state).copied().unwrap_or_default()
    }

    pub fn gated_cycles(&self) -> u64 {
        self.gated
    }

    pub fn reset_cycles(&self) -> u64 {
        self.in_reset
    }

    pub fn total(&self) -> u64 {
        self.by_state.values().sum::<u64>() + self.gated + self.in_reset
    }

    fn record(&mut self, state: ControlState, pins: &PinInputs) {
        if !pins.rst_n {
            self.in_reset += 1;
        } else if !pins.ena {
            self.gated += 1;
        } else {
            *self.by_state.entry(state).or_default() += 1;
        }
    }
}

pub struct Harness {
    tile: AesTile,
    pins: PinInputs,
    config: HarnessConfig,
    cycles: u64,
    stats: CycleStats,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        if config.encrypt_cycles + 1 < ENCRYPT_LATENCY {
            warn!(
                encrypt_cycles = config.encrypt_cycles,
                latency = ENCRYPT_LATENCY,
                "encrypt wait shorter than tile latency, reads will observe intermediate rounds"
            );
        }
        Self {
            tile: AesTile::new(),
            pins: PinInputs::default(),
            config,
            cycles: 0,
            stats: CycleStats::default(),
        }
    }

    pub fn tile(&self) -> &AesTile {
        &self.tile
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub fn pins(&self) -> &PinInputs {
        &self.pins
    }

    pub fn set_control(&mut self, control: ControlByte) {
        self.pins.ui_in = control.encode();
    }

    pub fn set_control_byte(&mut self, ui_in: u8) {
        self.pins.ui_in = ui_in;
    }

    pub fn set_data(&mut self, uio_in: u8) {
        self.pins.uio_in = uio_in;
    }

    pub fn set_enable(&mut self, ena: bool) {
        self.pins.ena = ena;
    }

    /// Advance `cycles` clock edges with the current pins, returning outputs after the last edge
    pub fn clock(&mut self, cycles: usize) -> PinOutputs {
        for _ in 0..cycles {
            self.stats.record(self.tile.state(), &self.pins);
            self.tile.tick(&self.pins);
            self.cycles += 1;
        }
        self.tile.outputs(&self.pins)
    }

    /// Reference power-on sequence: enable, clear inputs, hold reset, release and settle
    pub fn power_on_reset(&mut self) {
        self.pins = PinInputs {
            ui_in: 0,
            uio_in: 0,
            ena: true,
            rst_n: true,
        };
        self.assert_reset(self.config.reset_cycles);
        self.clock(self.config.settle_cycles);
        debug!(cycles = self.cycles, "power on reset done");
    }

    /// Hold `rst_n` low for `cycles` edges, then release it. The tile consumes the next edge.
    pub fn assert_reset(&mut self, cycles: usize) {
        debug!(state = ?self.tile.state(), cycles, "asserting reset");
        self.pins.rst_n = false;
        self.clock(cycles);
        self.pins.rst_n = true;
    }

    /// Deassert enable for `cycles` edges, leaving every other pin as is
    pub fn hold_disabled(&mut self, cycles: usize) {
        let ena = self.pins.ena;
        self.pins.ena = false;
        self.clock(cycles);
        self.pins.ena = ena;
    }

    pub fn load_key(&mut self, key: &Key) {
        self.load(Opcode::KeyLoad, key);
    }

    pub fn load_plaintext(&mut self, block: &Block) {
        self.load(Opcode::DataLoad, block);
    }

    /// Byte-serial load of `bytes`, with `start` held for the whole transfer. More than 16 bytes
    /// are presented as given.
    pub fn load(&mut self, opcode: Opcode, bytes: &[u8]) {
        debug!(?opcode, len = bytes.len(), "loading");
        self.set_control(ControlByte::command(opcode, true));
        self.clock(1);
        for byte in bytes {
            self.set_data(*byte);
            self.clock(1);
        }
        self.set_control(ControlByte::default());
        self.clock(self.config.gap_cycles);
    }

    /// Pulse encrypt for one edge, keep the opcode and wait `encrypt_cycles`
    pub fn encrypt(&mut self) {
        self.set_control(ControlByte::command(Opcode::Encrypt, true));
        self.clock(1);
        self.set_control(ControlByte::command(Opcode::Encrypt, false));
        self.clock(self.config.encrypt_cycles);
    }

    /// Present an OUTPUT control byte for one edge and sample `uo_out`
    pub fn read_byte(&mut self, address: u8) -> u8 {
        self.read_byte_with_start(address, false)
    }

    pub fn read_byte_with_start(&mut self, address: u8, start: bool) -> u8 {
        self.set_control(ControlByte {
            start,
            ..ControlByte::read(address)
        });
        self.clock(1).uo_out
    }

    pub fn read_block(&mut self) -> Block {
        util::collect_array((0..16).map(|address| self.read_byte(address)))
    }

    /// Full reference scenario on the current tile: load key and plaintext, encrypt, read back
    pub fn encrypt_block(&mut self, key: &Key, block: &Block) -> Block {
        self.load_key(key);
        self.load_plaintext(block);
        self.encrypt();
        let ciphertext = self.read_block();
        info!(
            plaintext = %hex::encode(block),
            ciphertext = %hex::encode(ciphertext),
            cycles = self.cycles,
            "block encrypted"
        );
        ciphertext
    }
}

/// Encrypt each block on its own freshly reset tile, in parallel
pub fn encrypt_blocks(config: HarnessConfig, key: Key, blocks: &[Block]) -> Vec<Block> {
    blocks
        .par_iter()
        .map(|block| {
            let mut harness = Harness::new(config);
            harness.power_on_reset();
            harness.encrypt_block(&key, block)
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::aes_128::{aes_lib, plain, test_helper};
    use crate::logger;
    use itertools::Itertools;
    use tracing::level_filters::LevelFilter;

    fn started() -> Harness {
        logger::test_init(LevelFilter::INFO);
        let mut harness = Harness::new(HarnessConfig::default());
        harness.power_on_reset();
        harness
    }

    fn encrypted_fips_197() -> Harness {
        let mut harness = started();
        harness.load_key(&test_helper::FIPS_197_KEY);
        harness.load_plaintext(&test_helper::FIPS_197_PLAINTEXT);
        harness.encrypt();
        harness
    }

    #[test]
    fn test_known_vector() {
        let mut harness = encrypted_fips_197();
        assert_eq!(harness.tile().state(), ControlState::Idle);
        assert_eq!(harness.read_block(), test_helper::FIPS_197_CIPHERTEXT);
    }

    #[test]
    fn test_reset_abort_idempotence() {
        let mut aborted = started();
        aborted.set_control(ControlByte::command(Opcode::KeyLoad, true));
        aborted.clock(1);
        aborted.set_data(0xaa);
        aborted.clock(3);
        assert_eq!(aborted.tile().state(), ControlState::KeyLoad);
        aborted.assert_reset(5);
        assert_eq!(aborted.tile().state(), ControlState::Idle);
        assert_eq!(aborted.tile().control_unit().byte_counter().value(), 0);
        assert_eq!(aborted.tile().key_register(), &[0; 16]);
        aborted.set_control(ControlByte::default());
        aborted.clock(5);
        assert_eq!(aborted.tile().state(), ControlState::Idle);

        let mut cold = started();

        for harness in [&mut aborted, &mut cold] {
            assert_eq!(
                harness.encrypt_block(
                    &test_helper::FIPS_197_KEY,
                    &test_helper::FIPS_197_PLAINTEXT
                ),
                test_helper::FIPS_197_CIPHERTEXT
            );
        }
        assert_eq!(aborted.tile(), cold.tile());
    }

    #[test]
    fn test_output_start_orthogonality() {
        let mut harness = encrypted_fips_197();
        for (address, start) in (0..16u8).cartesian_product([true, false, true]) {
            assert_eq!(
                harness.read_byte_with_start(address, start),
                test_helper::FIPS_197_CIPHERTEXT[address as usize]
            );
        }
        assert_eq!(harness.tile().state(), ControlState::Output);
        assert_eq!(harness.tile().key_register(), &test_helper::FIPS_197_KEY);
    }

    #[test]
    fn test_reverse_and_repeated_reads() {
        let mut harness = encrypted_fips_197();
        let snapshot = *harness.tile().data_register();

        for address in (0..16u8).rev() {
            assert_eq!(harness.read_byte(address), snapshot[address as usize]);
        }
        let first = harness.read_byte(7);
        let second = harness.read_byte(7);
        assert_eq!(first, second);
        assert_eq!(harness.read_block(), snapshot);
    }

    #[test]
    fn test_enable_gating_during_encrypt() {
        let mut harness = started();
        harness.load_key(&test_helper::FIPS_197_KEY);
        harness.load_plaintext(&test_helper::FIPS_197_PLAINTEXT);
        harness.set_control(ControlByte::command(Opcode::Encrypt, true));
        harness.clock(1);
        harness.set_control(ControlByte::command(Opcode::Encrypt, false));
        harness.clock(13);

        let frozen = harness.tile().clone();
        harness.hold_disabled(25);
        assert_eq!(harness.tile(), &frozen);
        assert_eq!(harness.stats().gated_cycles(), 25);
        assert!(harness.pins().ena);

        harness.clock(ENCRYPT_LATENCY - 14);
        assert_eq!(harness.tile().state(), ControlState::Idle);
        assert_eq!(harness.read_block(), test_helper::FIPS_197_CIPHERTEXT);
    }

    #[test]
    fn test_enable_gating_during_load() {
        let mut harness = started();
        harness.set_control(ControlByte::command(Opcode::DataLoad, true));
        harness.clock(1);
        for (i, byte) in test_helper::FIPS_197_PLAINTEXT.iter().enumerate() {
            harness.set_data(*byte);
            harness.clock(1);
            if i == 5 {
                harness.set_data(0xee);
                harness.hold_disabled(4);
            }
        }
        harness.set_control(ControlByte::default());
        harness.clock(2);

        assert_eq!(
            harness.tile().data_register(),
            &test_helper::FIPS_197_PLAINTEXT
        );
    }

    #[test]
    fn test_byte_counter_saturation() {
        let mut harness = started();
        let mut bytes = test_helper::FIPS_197_KEY.to_vec();
        bytes.extend([0xde, 0xad, 0xbe, 0xef, 0x00]);
        harness.load(Opcode::KeyLoad, &bytes);
        harness.load_plaintext(&test_helper::FIPS_197_PLAINTEXT);

        assert_eq!(harness.tile().key_register(), &test_helper::FIPS_197_KEY);
        harness.encrypt();
        assert_eq!(harness.read_block(), test_helper::FIPS_197_CIPHERTEXT);
    }

    #[test]
    fn test_partial_load_mixes_bytes() {
        let mut harness = started();
        harness.load_key(&[0x11; 16]);
        harness.load(Opcode::KeyLoad, &[0x22; 4]);

        let key = harness.tile().key_register();
        assert_eq!(key[..4], [0x22; 4]);
        assert_eq!(key[4..], [0x11; 12]);
    }

    #[test]
    fn test_encrypt_before_load_is_deterministic() {
        let mut a = started();
        let mut b = started();
        a.encrypt();
        b.encrypt();

        let expected = plain::encrypt_block(&plain::key_schedule(&[0; 16]), [0; 16]);
        assert_eq!(a.read_block(), expected);
        assert_eq!(b.read_block(), expected);
    }

    #[test]
    fn test_mid_encrypt_reads_are_transient() {
        let mut harness = started();
        harness.load_key(&test_helper::FIPS_197_KEY);
        harness.load_plaintext(&test_helper::FIPS_197_PLAINTEXT);
        harness.set_control(ControlByte::command(Opcode::Encrypt, true));
        harness.clock(1);

        // reads do not disturb the run
        let mut observed = Vec::new();
        for _ in 1..ENCRYPT_LATENCY {
            observed.push(harness.read_byte(0));
        }
        assert_eq!(harness.tile().state(), ControlState::Idle);
        assert_eq!(observed.last(), Some(&test_helper::FIPS_197_CIPHERTEXT[0]));
        assert!(observed.iter().unique().count() > 1);
        assert_eq!(harness.read_block(), test_helper::FIPS_197_CIPHERTEXT);
    }

    #[test]
    fn test_output_with_start_held() {
        let mut harness = started();
        harness.set_control_byte(0x07);
        harness.clock(5);
        harness.set_control_byte(0x00);
        harness.clock(2);

        assert_eq!(harness.tile().state(), ControlState::Idle);
        assert_eq!(harness.tile().data_register(), &[0; 16]);
        assert_eq!(harness.tile().key_register(), &[0; 16]);
    }

    #[test]
    fn test_cycle_stats() {
        let harness = encrypted_fips_197();
        let stats = harness.stats();

        assert_eq!(
            stats.reset_cycles(),
            harness.config().reset_cycles as u64
        );
        assert_eq!(stats.cycles_in(ControlState::Encrypt), ENCRYPT_LATENCY as u64 - 1);
        assert_eq!(stats.cycles_in(ControlState::KeyLoad), 17);
        assert_eq!(stats.cycles_in(ControlState::DataLoad), 17);
        assert_eq!(stats.total(), harness.cycles());
    }

    #[test]
    fn test_parallel_blocks_vs_aes_lib() {
        let mut rng = test_helper::seeded_rng(7);
        let (key, blocks) = test_helper::random_key_and_blocks(&mut rng, 4);

        let encrypted = encrypt_blocks(HarnessConfig::default(), key, &blocks);

        assert_eq!(encrypted, aes_lib::encrypt_blocks(key, &blocks));
    }

    #[cfg(feature = "long_running_tests")]
    #[test]
    fn test_many_random_keys_vs_aes_lib() {
        let mut rng = test_helper::seeded_rng(11);
        for _ in 0..64 {
            let (key, blocks) = test_helper::random_key_and_blocks(&mut rng, 16);
            assert_eq!(
                encrypt_blocks(HarnessConfig::default(), key, &blocks),
                aes_lib::encrypt_blocks(key, &blocks)
            );
        }
    }
}
