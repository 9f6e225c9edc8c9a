use crate::aes_128::{plain, Block, Key, ROUNDS};
use crate::util;
use tracing::trace;

pub const ROUND_KEYS: usize = ROUNDS + 1;

/// Round keys 0..=10 as 16-byte blocks in data register byte order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundKeySchedule([Block; ROUND_KEYS]);

impl Default for RoundKeySchedule {
    fn default() -> Self {
        Self([[0; 16]; ROUND_KEYS])
    }
}

impl RoundKeySchedule {
    pub fn expand(key: &Key) -> Self {
        let expanded_key = plain::key_schedule(key);
        let schedule = Self(util::collect_array((0..ROUND_KEYS).map(|round| {
            let words = plain::round_key_words(&expanded_key, round);
            util::collect_array(words.iter().flat_map(|word| word.bytes()))
        })));
        trace!(last_round_key = %hex::encode(schedule.round_key(ROUNDS)), "key expanded");
        schedule
    }

    pub fn round_key(&self, round: usize) -> &Block {
        &self.0[round]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::aes_128::test_helper;

    #[test]
    fn test_fips_197_round_keys() {
        let schedule = RoundKeySchedule::expand(&test_helper::FIPS_197_KEY);

        assert_eq!(schedule.round_key(0), &test_helper::FIPS_197_KEY);
        assert_eq!(
            hex::encode(schedule.round_key(1)),
            "a0fafe1788542cb123a339392a6c7605"
        );
        assert_eq!(
            hex::encode(schedule.round_key(10)),
            "d014f9a8c9ee2589e13f0cc8b6630ca6"
        );
    }

    #[test]
    fn test_schedule_follows_key() {
        let a = RoundKeySchedule::expand(&[0; 16]);
        let b = RoundKeySchedule::expand(&[1; 16]);
        assert_ne!(a, b);
        assert_eq!(a, RoundKeySchedule::expand(&[0; 16]));
    }
}
