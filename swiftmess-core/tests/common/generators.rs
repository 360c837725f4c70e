//! Stochastic message generators for test variations
//!
//! Uses seeded RNG for reproducibility. Print seed on failure for replay.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use swiftmess_core::{BlockBuilder, MessageBuilder};

/// Seeded generator for reproducible stochastic tests
pub struct Gen {
    pub rng: StdRng,
    pub seed: u64,
}

impl Gen {
    /// Create with specific seed (for reproduction)
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create from environment or random seed
    pub fn from_env_or_random() -> Self {
        let seed = std::env::var("SWIFTMESS_TEST_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(rand::random);
        Self::new(seed)
    }

    /// Geometric distribution: count until rand > alpha
    /// Returns 0, 1, 2, ... with decreasing probability
    pub fn geometric(&mut self, alpha: f64) -> usize {
        let mut n = 0;
        while self.rng.gen::<f64>() < alpha {
            n += 1;
        }
        n
    }

    /// Poisson-like count (simplified)
    pub fn poisson(&mut self, lambda: f64) -> usize {
        let l = (-lambda).exp();
        let mut k = 0;
        let mut p = 1.0;
        loop {
            k += 1;
            p *= self.rng.gen::<f64>();
            if p <= l {
                break;
            }
        }
        k - 1
    }

    /// Random boolean with probability p
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }

    /// Random block id, mostly the well-known 1..=5
    pub fn block_id(&mut self) -> u64 {
        if self.chance(0.8) {
            self.rng.gen_range(1..=5)
        } else {
            self.rng.gen_range(100..1000)
        }
    }

    /// Random field name like `20`, `77E` or `98A`
    pub fn field_name(&mut self) -> String {
        let mut name = self.rng.gen_range(10..100).to_string();
        if self.chance(0.4) {
            name.push(self.rng.gen_range(b'A'..=b'Z') as char);
        }
        name
    }

    /// Random non-empty value text that cannot be mistaken for markup
    pub fn value_text(&mut self) -> String {
        let len = 1 + self.geometric(0.85);
        let first = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789/-";
        let rest = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789 /-.,:{";
        let mut text = String::with_capacity(len);
        text.push(first[self.rng.gen_range(0..first.len())] as char);
        for _ in 1..len {
            text.push(rest[self.rng.gen_range(0..rest.len())] as char);
        }
        text
    }

    /// Random block with values, fields and, below `depth`, nested blocks
    pub fn block(&mut self, depth: usize) -> BlockBuilder {
        let mut block = BlockBuilder::new(self.block_id());
        let lines = self.geometric(0.7);
        for index in 0..lines {
            let last = index + 1 == lines;
            block = match self.rng.gen_range(0..4) {
                0 if !last => block.value(""),
                0 | 1 => block.value(self.value_text()),
                _ => {
                    let name = self.field_name();
                    let value = if self.chance(0.1) { String::new() } else { self.value_text() };
                    block.field(name, value)
                }
            };
        }
        if depth > 0 {
            for _ in 0..self.geometric(0.3) {
                block = block.block(self.block(depth - 1));
            }
        }
        block
    }

    /// Random complete message
    pub fn message(&mut self) -> MessageBuilder {
        let mut message = MessageBuilder::new();
        for _ in 0..1 + self.geometric(0.6) {
            message = message.block(self.block(2));
        }
        message
    }

    /// Rendered random message
    pub fn message_text(&mut self) -> String {
        self.message()
            .render()
            .unwrap_or_else(|e| panic!("generated message must render (seed {}): {}", self.seed, e))
    }
}

#[test]
fn test_reproducibility() {
    let mut g1 = Gen::new(42);
    let mut g2 = Gen::new(42);

    for _ in 0..10 {
        assert_eq!(g1.message(), g2.message());
        assert_eq!(g1.geometric(0.9), g2.geometric(0.9));
    }
}

#[test]
fn test_generated_messages_render() {
    let mut gen = Gen::new(12345);
    for _ in 0..200 {
        assert!(gen.message().render().is_ok());
    }
}
