use crate::aes_128::{Block, Key};
use crate::tile::datapath::{self, RoundCursor, STAGES_PER_ROUND};
use crate::tile::key_expansion::RoundKeySchedule;
use crate::tile::protocol::{ControlByte, Opcode};
use crate::tile::registers::{ByteCounter, ByteRegister};
use tracing::{debug, trace};

/// Clock edges from the encrypt trigger until the ciphertext is resident, trigger edge included
pub const ENCRYPT_LATENCY: usize = 1 + crate::aes_128::ROUNDS * STAGES_PER_ROUND;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ControlState {
    #[default]
    Idle,
    KeyLoad,
    DataLoad,
    Encrypt,
    /// Host is addressing result bytes. Transitions are the same as from `Idle`.
    Output,
}

#[derive(Debug, Clone, Copy)]
enum LoadTarget {
    Key,
    Data,
}

/// Control FSM together with every register it owns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlUnit {
    state: ControlState,
    key: ByteRegister,
    data: ByteRegister,
    schedule: RoundKeySchedule,
    byte_counter: ByteCounter,
    cursor: RoundCursor,
}

impl ControlUnit {
    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn key(&self) -> &Key {
        self.key.bytes()
    }

    pub fn data(&self) -> &Block {
        self.data.bytes()
    }

    pub fn schedule(&self) -> &RoundKeySchedule {
        &self.schedule
    }

    pub fn byte_counter(&self) -> ByteCounter {
        self.byte_counter
    }

    pub fn cursor(&self) -> RoundCursor {
        self.cursor
    }

    /// Reinitialise state, counters and registers
    pub fn reset(&mut self) {
        if self.state != ControlState::Idle {
            debug!(from = ?self.state, "reset aborts phase");
        }
        self.state = ControlState::Idle;
        self.key.clear();
        self.data.clear();
        self.schedule = RoundKeySchedule::default();
        self.byte_counter.reset();
        self.cursor.reset();
    }

    /// One enabled clock edge
    pub fn clock(&mut self, control: ControlByte, data_in: u8) {
        trace!(state = ?self.state, ?control, data_in, "clock");

        match self.state {
            ControlState::Idle | ControlState::Output => self.dispatch(control),
            ControlState::KeyLoad => self.load(LoadTarget::Key, control, data_in),
            ControlState::DataLoad => self.load(LoadTarget::Data, control, data_in),
            ControlState::Encrypt => self.encrypt_stage(),
        }
    }

    fn dispatch(&mut self, control: ControlByte) {
        let next = match (control.opcode, control.start) {
            (Opcode::Output, _) => ControlState::Output,
            (_, false) => ControlState::Idle,
            (Opcode::KeyLoad, true) => {
                self.byte_counter.reset();
                ControlState::KeyLoad
            }
            (Opcode::DataLoad, true) => {
                self.byte_counter.reset();
                ControlState::DataLoad
            }
            (Opcode::Encrypt, true) => {
                self.schedule = RoundKeySchedule::expand(self.key.bytes());
                datapath::initial_round(self.data.bytes_mut(), &self.schedule, &mut self.cursor);
                ControlState::Encrypt
            }
        };
        self.transition(next);
    }

    fn load(&mut self, target: LoadTarget, control: ControlByte, data_in: u8) {
        if !control.start {
            debug!(
                ?target,
                bytes = self.byte_counter.value(),
                "load phase finished"
            );
            self.transition(ControlState::Idle);
            return;
        }

        let register = match target {
            LoadTarget::Key => &mut self.key,
            LoadTarget::Data => &mut self.data,
        };
        if !self.byte_counter.accept(register, data_in) {
            trace!(?target, data_in, "load byte absorbed, register full");
        }
    }

    fn encrypt_stage(&mut self) {
        if datapath::clock_stage(self.data.bytes_mut(), &self.schedule, &mut self.cursor) {
            debug!(ciphertext = %hex::encode(self.data.bytes()), "encryption complete");
            self.transition(ControlState::Idle);
        }
    }

    fn transition(&mut self, next: ControlState) {
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "control state transition");
            self.state = next;
        }
    }
}
