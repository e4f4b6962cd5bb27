//! Key generation for new blocks, spans and annotations.

use crate::constants::GENERATED_KEY_LEN;
use rand::Rng;

/// Source of fresh `_key` values.
pub trait KeyGenerator {
    /// Produce a key not previously returned by this generator.
    fn next_key(&mut self) -> String;
}

/// Random lowercase-hex keys, the production default.
#[derive(Debug, Default, Clone)]
pub struct RandomKeys;

impl KeyGenerator for RandomKeys {
    fn next_key(&mut self) -> String {
        const HEX: &[u8] = b"0123456789abcdef";
        let mut rng = rand::thread_rng();
        (0..GENERATED_KEY_LEN)
            .map(|_| HEX[rng.gen_range(0..HEX.len())] as char)
            .collect()
    }
}

/// Deterministic `<prefix><n>` keys for replays and tests.
#[derive(Debug, Clone)]
pub struct SequentialKeys {
    prefix: String,
    next: u64,
}

impl SequentialKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl Default for SequentialKeys {
    fn default() -> Self {
        Self::new("k")
    }
}

impl KeyGenerator for SequentialKeys {
    fn next_key(&mut self) -> String {
        let key = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn random_keys_have_fixed_length_and_are_distinct() {
        let mut keys = RandomKeys;
        let generated: HashSet<String> = (0..64).map(|_| keys.next_key()).collect();
        assert_eq!(generated.len(), 64);
        assert!(generated.iter().all(|k| k.len() == GENERATED_KEY_LEN));
    }

    #[test]
    fn sequential_keys_count_up() {
        let mut keys = SequentialKeys::new("b");
        assert_eq!(keys.next_key(), "b0");
        assert_eq!(keys.next_key(), "b1");
    }
}
