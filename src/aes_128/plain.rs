use crate::aes_128::data_model::{State, Word};
use crate::aes_128::{Block, Key, RC, ROUNDS, SBOX};

/// Number of 4-byte words in the expanded AES-128 key
pub const EXPANDED_KEY_WORDS: usize = 4 * (ROUNDS + 1);

pub fn substitute(byte: u8) -> u8 {
    SBOX[byte as usize]
}

pub fn sub_bytes(state: &mut State) {
    for byte in state.bytes_mut() {
        *byte = substitute(*byte);
    }
}

pub fn shift_rows(state: &mut State) {
    for (i, row) in state.rows_mut().enumerate() {
        *row = row.rotate_left(i);
    }
}

/// Multiplication in F_2[X]/(X^8 + X^4 + X^3 + X + 1)
pub fn gf_256_mul(mut a: u8, mut b: u8) -> u8 {
    let mut res = 0u8;
    while b != 0 {
        if b & 1 == 1 {
            res ^= a;
        }
        let high_bit = a & 0x80;
        a <<= 1;
        if high_bit == 0x80 {
            a ^= 0x1b;
        }
        b >>= 1;
    }
    res
}

pub fn mix_columns(state: &mut State) {
    for j in 0..4 {
        let col = state.column(j);
        let mut mixed = Word::zero();
        for i in 0..4 {
            mixed[i] = gf_256_mul(col[i], 2)
                ^ gf_256_mul(col[(i + 1) % 4], 3)
                ^ col[(i + 2) % 4]
                ^ col[(i + 3) % 4];
        }
        state.set_column(j, mixed);
    }
}

pub fn add_round_key(state: &mut State, round_key: &[Word; 4]) {
    *state ^= round_key;
}

fn sub_word(mut word: Word) -> Word {
    for byte in word.bytes_mut() {
        *byte = substitute(*byte);
    }
    word
}

pub fn key_schedule(key: &Key) -> [Word; EXPANDED_KEY_WORDS] {
    let mut expanded_key = [Word::zero(); EXPANDED_KEY_WORDS];

    for (word, chunk) in expanded_key.iter_mut().zip(key.chunks_exact(4)) {
        word.0.copy_from_slice(chunk);
    }

    for i in 4..EXPANDED_KEY_WORDS {
        if i % 4 == 0 {
            let mut rcon = Word::zero();
            rcon[0] = RC[i / 4];
            expanded_key[i] =
                expanded_key[i - 4] ^ sub_word(expanded_key[i - 1].rotate_left(1)) ^ rcon;
        } else {
            expanded_key[i] = expanded_key[i - 4] ^ expanded_key[i - 1];
        }
    }

    expanded_key
}

/// Round key words for `round` (0 is the initial whitening key)
pub fn round_key_words(expanded_key: &[Word; EXPANDED_KEY_WORDS], round: usize) -> &[Word; 4] {
    expanded_key[round * 4..(round + 1) * 4]
        .try_into()
        .expect("array length 4")
}

pub fn encrypt_block(expanded_key: &[Word; EXPANDED_KEY_WORDS], block: Block) -> Block {
    encrypt_block_for_rounds(expanded_key, block, ROUNDS)
}

/// Encrypt running only the first `rounds` rounds (MixColumns is omitted on round 10 only). The
/// result equals the tile data register after `rounds` complete rounds.
pub fn encrypt_block_for_rounds(
    expanded_key: &[Word; EXPANDED_KEY_WORDS],
    block: Block,
    rounds: usize,
) -> Block {
    let mut state = State::from_array(&block);

    add_round_key(&mut state, round_key_words(expanded_key, 0));

    for round in 1..=rounds.min(ROUNDS) {
        sub_bytes(&mut state);
        shift_rows(&mut state);
        if round != ROUNDS {
            mix_columns(&mut state);
        }
        add_round_key(&mut state, round_key_words(expanded_key, round));
    }

    state.to_array()
}

pub fn expand_key_and_encrypt_blocks(key: Key, blocks: &[Block], rounds: usize) -> Vec<Block> {
    let expanded_key = key_schedule(&key);
    blocks
        .iter()
        .map(|block| encrypt_block_for_rounds(&expanded_key, *block, rounds))
        .collect()
}
