use anyhow::{bail, ensure, Context};
use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::time::Instant;
use tracing::metadata::LevelFilter;
use tracing::{debug, info};
use tt_aes_tile::aes_128::{aes_lib, Block, Key};
use tt_aes_tile::host::{self, Harness, HarnessConfig};
use tt_aes_tile::logger;
use tt_aes_tile::tile::fsm::ControlState;
use tt_aes_tile::tile::pins::UIO_ALL_INPUTS;
use tt_aes_tile::tile::protocol::{ControlByte, Opcode};

const FIPS_197_KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";
const FIPS_197_PLAINTEXT: &str = "3243f6a8885a308d313198a2e0370734";
const FIPS_197_CIPHERTEXT: &str = "3925841d02dc09fbdc118597196a0b32";

#[derive(Parser, Debug)]
#[command(about = "Cycle-accurate AES-128 tile simulator")]
struct Cli {
    /// Default log level, overridden by RUST_LOG
    #[arg(long, global = true, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    #[command(flatten)]
    timing: TimingArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct TimingArgs {
    #[arg(long, global = true)]
    reset_cycles: Option<usize>,
    #[arg(long, global = true)]
    settle_cycles: Option<usize>,
    #[arg(long, global = true)]
    gap_cycles: Option<usize>,
    #[arg(long, global = true)]
    encrypt_cycles: Option<usize>,
}

impl TimingArgs {
    fn config(&self) -> HarnessConfig {
        let default = HarnessConfig::default();
        HarnessConfig {
            reset_cycles: self.reset_cycles.unwrap_or(default.reset_cycles),
            settle_cycles: self.settle_cycles.unwrap_or(default.settle_cycles),
            gap_cycles: self.gap_cycles.unwrap_or(default.gap_cycles),
            encrypt_cycles: self.encrypt_cycles.unwrap_or(default.encrypt_cycles),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load key and plaintext through the pins, encrypt and read back the ciphertext
    Encrypt {
        /// 16 byte key as hex
        #[arg(long)]
        key: String,
        /// 16 byte plaintext block as hex
        #[arg(long)]
        plaintext: String,
    },
    /// Reference vector and reference suite scenarios
    Selftest,
    /// Random keys and blocks through tiles in parallel, checked against the aes crate
    Sweep {
        #[arg(long, default_value_t = 64)]
        count: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.log_level);
    let config = cli.timing.config();
    debug!(?config, "harness config");

    match cli.command {
        Command::Encrypt { key, plaintext } => {
            let key: Key = parse_block(&key).context("invalid key")?;
            let plaintext: Block = parse_block(&plaintext).context("invalid plaintext")?;
            encrypt(config, key, plaintext)
        }
        Command::Selftest => selftest(config),
        Command::Sweep { count, seed } => sweep(config, count, seed),
    }
}

fn parse_block(text: &str) -> anyhow::Result<Block> {
    let bytes = hex::decode(text.trim()).context("not a hex string")?;
    match Block::try_from(bytes.as_slice()) {
        Ok(block) => Ok(block),
        Err(_) => bail!("expected 16 bytes, got {}", bytes.len()),
    }
}

fn encrypt(config: HarnessConfig, key: Key, plaintext: Block) -> anyhow::Result<()> {
    let mut harness = Harness::new(config);
    harness.power_on_reset();
    let ciphertext = harness.encrypt_block(&key, &plaintext);

    println!("{}", hex::encode(ciphertext));
    print_stats(&harness);

    ensure!(
        ciphertext == aes_lib::encrypt_block(key, plaintext),
        "tile ciphertext differs from reference, is --encrypt-cycles too short?"
    );
    Ok(())
}

fn print_stats(harness: &Harness) {
    let stats = harness.stats();
    let line = [
        ControlState::Idle,
        ControlState::KeyLoad,
        ControlState::DataLoad,
        ControlState::Encrypt,
        ControlState::Output,
    ]
    .into_iter()
    .map(|state| format!("{:?}={}", state, stats.cycles_in(state)))
    .chain([
        format!("gated={}", stats.gated_cycles()),
        format!("reset={}", stats.reset_cycles()),
    ])
    .join(" ");
    println!("cycles: {} ({})", harness.cycles(), line);
}

fn selftest(config: HarnessConfig) -> anyhow::Result<()> {
    let key = parse_block(FIPS_197_KEY)?;
    let plaintext = parse_block(FIPS_197_PLAINTEXT)?;
    let expected = parse_block(FIPS_197_CIPHERTEXT)?;

    // known vector
    let mut harness = Harness::new(config);
    harness.power_on_reset();
    let ciphertext = harness.encrypt_block(&key, &plaintext);
    for (address, (got, want)) in ciphertext.iter().zip(expected.iter()).enumerate() {
        ensure!(
            got == want,
            "mismatch at byte {}: got {:#04x}, expected {:#04x}",
            address,
            got,
            want
        );
    }
    info!("known vector passed");

    // OUTPUT with start held must leave the state machine in a safe state
    let mut harness = Harness::new(config);
    harness.power_on_reset();
    harness.set_control_byte(0x07);
    harness.clock(5);
    harness.set_control_byte(0x00);
    harness.clock(2);
    ensure!(
        harness.tile().state() == ControlState::Idle,
        "state machine left idle after output with start, now {:?}",
        harness.tile().state()
    );
    info!("state machine scenario passed");

    // reset during key load
    let mut harness = Harness::new(config);
    harness.power_on_reset();
    harness.set_control(ControlByte::command(Opcode::KeyLoad, true));
    harness.clock(1);
    harness.set_data(0xaa);
    harness.clock(3);
    harness.assert_reset(5);
    harness.clock(config.settle_cycles);
    harness.set_control_byte(0x00);
    harness.clock(5);
    ensure!(
        harness.tile().state() == ControlState::Idle,
        "reset during key load did not return to idle"
    );
    ensure!(
        harness.encrypt_block(&key, &plaintext) == expected,
        "encryption after aborted key load differs"
    );
    info!("reset scenario passed");

    // bidirectional port stays an input
    let mut harness = Harness::new(config);
    harness.power_on_reset();
    harness.set_control(ControlByte::command(Opcode::KeyLoad, true));
    for value in [0x00, 0xff, 0xaa, 0x55, 0x12, 0x34] {
        harness.set_data(value);
        let outputs = harness.clock(1);
        ensure!(
            outputs.uio_oe == UIO_ALL_INPUTS,
            "uio_oe {:#04x} during key load",
            outputs.uio_oe
        );
    }
    info!("io pin scenario passed");

    println!("selftest passed");
    Ok(())
}

fn sweep(config: HarnessConfig, count: usize, seed: u64) -> anyhow::Result<()> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut key: Key = Default::default();
    rng.fill(&mut key);
    let blocks: Vec<Block> = (0..count)
        .map(|_| {
            let mut block: Block = Default::default();
            rng.fill(&mut block);
            block
        })
        .collect();

    let start = Instant::now();
    let encrypted = host::encrypt_blocks(config, key, &blocks);
    println!(
        "{} blocks through tiles in: {:?}",
        encrypted.len(),
        start.elapsed()
    );

    let reference = aes_lib::encrypt_blocks(key, &blocks);
    let mismatches = encrypted
        .iter()
        .zip(&reference)
        .positions(|(tile, reference)| tile != reference)
        .collect_vec();
    ensure!(
        mismatches.is_empty(),
        "{} of {} blocks differ from reference (key {}), first at index {}",
        mismatches.len(),
        count,
        hex::encode(key),
        mismatches[0]
    );
    println!("sweep passed");
    Ok(())
}
