//! Stochastic content generators for test variations
//!
//! Uses seeded RNG for reproducibility. Print seed on failure for replay.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

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
        let seed = std::env::var("TAGBIND_TEST_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(rand::random);
        Self::new(seed)
    }

    /// Geometric distribution: count until rand > alpha
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

    fn pick<'s>(&mut self, options: &[&'s str]) -> &'s str {
        options[self.rng.gen_range(0..options.len())]
    }

    /// Random element or attribute name (ASCII subset of valid names)
    pub fn name(&mut self) -> String {
        let len = 1 + self.geometric(0.7);
        let mut name = String::with_capacity(len);
        name.push(self.rng.gen_range(b'a'..=b'z') as char);
        let chars = b"abcdefghijklmnopqrstuvwxyz0123456789-_.";
        for _ in 1..len {
            name.push(chars[self.rng.gen_range(0..chars.len())] as char);
        }
        name
    }

    /// Random markup-escaped text, never empty
    pub fn text(&mut self) -> String {
        let pieces = ["word", " ", "&amp;", "&lt;", "&gt;", "&quot;", "&apos;", "&#233;", "π", "\n"];
        let count = 1 + self.geometric(0.6);
        (0..count).map(|_| self.pick(&pieces)).collect()
    }

    /// Random well-formed document with nested elements and attributes
    pub fn document(&mut self) -> String {
        let mut out = String::new();
        self.element(&mut out, 0);
        out
    }

    fn element(&mut self, out: &mut String, depth: usize) {
        let name = self.name();
        out.push('<');
        out.push_str(&name);
        let attrs = self.geometric(0.3);
        for i in 0..attrs {
            // Suffix keeps names unique within the tag
            out.push_str(&format!(" {}{}=\"{}\"", self.name(), i, self.text()));
        }
        let children = if depth >= 4 { 0 } else { self.geometric(0.6) };
        if children == 0 && self.chance(0.5) {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for _ in 0..children {
            if self.chance(0.4) {
                out.push_str(&self.text());
            } else {
                self.element(out, depth + 1);
            }
        }
        out.push_str("</");
        out.push_str(&name);
        out.push('>');
    }

    /// Markup that produces no events before the root element
    pub fn prolog(&mut self) -> Vec<u8> {
        let mut out = String::new();
        if self.chance(0.4) {
            out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        }
        for _ in 0..self.geometric(0.4) {
            let piece = self.pick(&[
                "<!-- prolog comment -->",
                "\n",
                "  ",
                "<!DOCTYPE books [ <!ENTITY x \"y\"> ]>",
                "<?xml-stylesheet href=\"s.css\"?>",
            ]);
            out.push_str(piece);
        }
        out.into_bytes()
    }

    /// Markup that produces no events after the root element
    pub fn epilog(&mut self) -> Vec<u8> {
        let mut out = String::new();
        for _ in 0..self.geometric(0.4) {
            let piece = self.pick(&["\n", "<!-- trailing -->", "\t", "<?pi done?>"]);
            out.push_str(piece);
        }
        out.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reproducibility() {
        let mut g1 = Gen::new(42);
        let mut g2 = Gen::new(42);

        for _ in 0..10 {
            assert_eq!(g1.name(), g2.name());
            assert_eq!(g1.document(), g2.document());
        }
    }

    #[test]
    fn test_geometric_distribution() {
        let mut gen = Gen::new(12345);
        let samples: Vec<usize> = (0..1000).map(|_| gen.geometric(0.9)).collect();

        // With α=0.9, we expect mean ≈ 9 (geometric mean = α/(1-α))
        let mean: f64 = samples.iter().sum::<usize>() as f64 / samples.len() as f64;
        assert!(mean > 5.0 && mean < 15.0, "Mean {} out of expected range", mean);
    }
}
