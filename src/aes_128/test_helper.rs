use crate::aes_128::{aes_lib, plain, Block, Key, ROUNDS};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// FIPS-197 appendix B
pub const FIPS_197_KEY: Key = [
    0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f, 0x3c,
];
pub const FIPS_197_PLAINTEXT: Block = [
    0x32, 0x43, 0xf6, 0xa8, 0x88, 0x5a, 0x30, 0x8d, 0x31, 0x31, 0x98, 0xa2, 0xe0, 0x37, 0x07, 0x34,
];
pub const FIPS_197_CIPHERTEXT: Block = [
    0x39, 0x25, 0x84, 0x1d, 0x02, 0xdc, 0x09, 0xfb, 0xdc, 0x11, 0x85, 0x97, 0x19, 0x6a, 0x0b, 0x32,
];

pub fn seeded_rng(seed: u8) -> ChaCha20Rng {
    ChaCha20Rng::from_seed([seed; 32])
}

pub fn random_key_and_blocks(rng: &mut ChaCha20Rng, count: usize) -> (Key, Vec<Block>) {
    let mut key: Key = Default::default();
    rng.fill(&mut key);
    let blocks = (0..count)
        .map(|_| {
            let mut block: Block = Default::default();
            rng.fill(&mut block);
            block
        })
        .collect();
    (key, blocks)
}

pub fn test_vs_aes(encrypt_fn: fn(key: Key, blocks: &[Block], rounds: usize) -> Vec<Block>) {
    let mut rng = seeded_rng(0);
    let (key, blocks) = random_key_and_blocks(&mut rng, 2);

    let encrypted = (encrypt_fn)(key, &blocks, ROUNDS);

    assert_eq!(encrypted, aes_lib::encrypt_blocks(key, &blocks));
}

pub fn test_vs_plain(
    encrypt_fn: fn(key: Key, blocks: &[Block], rounds: usize) -> Vec<Block>,
    rounds: usize,
) {
    let mut rng = seeded_rng(1);
    let (key, blocks) = random_key_and_blocks(&mut rng, 1);

    let encrypted = (encrypt_fn)(key, &blocks, rounds);

    assert_eq!(
        encrypted,
        plain::expand_key_and_encrypt_blocks(key, &blocks, rounds)
    );
}
