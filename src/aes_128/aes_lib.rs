use crate::aes_128::{Block, Key};
use aes::cipher::{BlockEncrypt, KeyInit};

pub fn encrypt_block(key: Key, block: Block) -> Block {
    let aes = aes::Aes128::new(&key.into());
    let mut block = block.into();
    aes.encrypt_block(&mut block);
    block.into()
}

pub fn encrypt_blocks(key: Key, blocks: &[Block]) -> Vec<Block> {
    let aes = aes::Aes128::new(&key.into());
    blocks
        .iter()
        .map(|block| {
            let mut block = (*block).into();
            aes.encrypt_block(&mut block);
            block.into()
        })
        .collect()
}
