// Dice sources used by initiative and combat resolution.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Produces uniformly distributed six-sided die results.
pub trait DiceSource: Send {
    fn roll_d6(&mut self) -> u8;

    fn roll_2d6(&mut self) -> [u8; 2] {
        [self.roll_d6(), self.roll_d6()]
    }
}

/// Seedable RNG-backed dice. The same seed yields the same roll sequence.
#[derive(Debug, Clone)]
pub struct RandomDice {
    rng: ChaCha8Rng,
}

impl RandomDice {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { rng }
    }
}

impl DiceSource for RandomDice {
    fn roll_d6(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }
}

/// Replays a fixed list of results, cycling once exhausted.
///
/// Used by tests and by tooling that needs to reproduce a recorded match.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    script: Vec<u8>,
    pending: VecDeque<u8>,
}

impl ScriptedDice {
    pub fn new(script: impl Into<Vec<u8>>) -> Self {
        let script: Vec<u8> = script
            .into()
            .into_iter()
            .map(|value| value.clamp(1, 6))
            .collect();
        Self {
            pending: script.iter().copied().collect(),
            script,
        }
    }
}

impl DiceSource for ScriptedDice {
    fn roll_d6(&mut self) -> u8 {
        if self.pending.is_empty() {
            self.pending.extend(self.script.iter().copied());
        }
        // An empty script always rolls the minimum.
        self.pending.pop_front().unwrap_or(1)
    }
}

pub fn total(roll: &[u8]) -> u32 {
    roll.iter().map(|&die| u32::from(die)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_dice_repeat_the_same_sequence() {
        let mut a = RandomDice::new(Some(7));
        let mut b = RandomDice::new(Some(7));
        let first: Vec<u8> = (0..32).map(|_| a.roll_d6()).collect();
        let second: Vec<u8> = (0..32).map(|_| b.roll_d6()).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|v| (1..=6).contains(v)));
    }

    #[test]
    fn scripted_dice_cycle_through_their_script() {
        let mut dice = ScriptedDice::new(vec![3, 4]);
        assert_eq!(dice.roll_2d6(), [3, 4]);
        assert_eq!(dice.roll_d6(), 3);
        assert_eq!(total(&dice.roll_2d6()), 7);
    }
}
