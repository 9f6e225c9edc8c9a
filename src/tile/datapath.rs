//! Round datapath. One AES round is spread over four clock edges, selected by the phase counter.

use crate::aes_128::data_model::State;
use crate::aes_128::{plain, Block, ROUNDS};
use crate::tile::key_expansion::RoundKeySchedule;
use tracing::trace;

pub const STAGES_PER_ROUND: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundStage {
    SubBytes,
    ShiftRows,
    MixColumns,
    AddRoundKey,
}

impl RoundStage {
    pub fn from_phase(phase: usize) -> Self {
        match phase % STAGES_PER_ROUND {
            0 => RoundStage::SubBytes,
            1 => RoundStage::ShiftRows,
            2 => RoundStage::MixColumns,
            _ => RoundStage::AddRoundKey,
        }
    }
}

/// Round and phase counters of an encrypt run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundCursor {
    round: u8,
    phase: u8,
}

impl RoundCursor {
    pub fn round(&self) -> usize {
        self.round as usize
    }

    pub fn phase(&self) -> usize {
        self.phase as usize
    }

    pub fn stage(&self) -> RoundStage {
        RoundStage::from_phase(self.phase())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Moves to the next stage. Returns `true` once the last stage of round 10 has been passed.
    fn advance(&mut self) -> bool {
        if self.phase() + 1 < STAGES_PER_ROUND {
            self.phase += 1;
            return false;
        }
        if self.round() == ROUNDS {
            return true;
        }
        self.phase = 0;
        self.round += 1;
        false
    }
}

fn xor_round_key(data: &mut Block, round_key: &Block) {
    for (byte, key_byte) in data.iter_mut().zip(round_key) {
        *byte ^= key_byte;
    }
}

/// Round 0 key addition, applied on the encrypt trigger edge. Leaves the cursor at round 1, phase 0.
pub fn initial_round(data: &mut Block, schedule: &RoundKeySchedule, cursor: &mut RoundCursor) {
    cursor.reset();
    xor_round_key(data, schedule.round_key(0));
    cursor.round = 1;
}

/// Applies the stage selected by `cursor` to `data` and advances. Returns `true` when the run is
/// complete and `data` holds the ciphertext.
pub fn clock_stage(data: &mut Block, schedule: &RoundKeySchedule, cursor: &mut RoundCursor) -> bool {
    let round = cursor.round();
    let stage = cursor.stage();
    trace!(round, ?stage, "round stage");

    match stage {
        RoundStage::SubBytes => with_state(data, plain::sub_bytes),
        RoundStage::ShiftRows => with_state(data, plain::shift_rows),
        RoundStage::MixColumns => {
            if round != ROUNDS {
                with_state(data, plain::mix_columns);
            }
        }
        RoundStage::AddRoundKey => xor_round_key(data, schedule.round_key(round)),
    }

    cursor.advance()
}

fn with_state(data: &mut Block, op: fn(&mut State)) {
    let mut state = State::from_array(data);
    op(&mut state);
    *data = state.to_array();
}
