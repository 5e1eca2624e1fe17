use rand::RngCore;

/// Accumulating string-mash used only during [`Alea::from_seed_bytes`] to
/// fold seed bytes into the three floats of initial state.
struct Mash {
    n: u32,
}

impl Mash {
    fn new() -> Self {
        Self { n: 0xefc8249d }
    }

    fn apply(&mut self, data: &[u8]) -> f64 {
        for &byte in data {
            self.n = self.n.wrapping_add(byte as u32);
            let mut h = 0.02519603282416938_f64 * self.n as f64;
            self.n = h as u32;
            h -= self.n as f64;
            h *= self.n as f64;
            self.n = h as u32;
            h -= self.n as f64;
            self.n = self.n.wrapping_add((h * 0x1_0000_0000_u64 as f64) as u32);
        }
        self.n as f64 * 2.3283064365386963e-10
    }
}

/// Seeded PRNG whose entire state is four `f64`s (the *alea* algorithm,
/// Glossary). Reseeded from the activation's randomness seed bytes at
/// `init_runtime`; every `Math.random`-equivalent read in workflow code must
/// go through this, never the host RNG, so that two runs seeded identically
/// produce identical command sequences (testable property 2).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Alea {
    s0: f64,
    s1: f64,
    s2: f64,
    c: f64,
}

impl Alea {
    pub fn from_seed_bytes(seed: &[u8]) -> Self {
        let mut mash = Mash::new();
        let mut s0 = mash.apply(b" ");
        let mut s1 = mash.apply(b" ");
        let mut s2 = mash.apply(b" ");

        s0 -= mash.apply(seed);
        if s0 < 0.0 {
            s0 += 1.0;
        }
        s1 -= mash.apply(seed);
        if s1 < 0.0 {
            s1 += 1.0;
        }
        s2 -= mash.apply(seed);
        if s2 < 0.0 {
            s2 += 1.0;
        }

        Self { s0, s1, s2, c: 1.0 }
    }

    /// Next value in `[0, 1)`, advancing the state in place.
    pub fn next_f64(&mut self) -> f64 {
        let t = 2091639.0 * self.s0 + self.c * 2.3283064365386963e-10;
        self.s0 = self.s1;
        self.s1 = self.s2;
        self.c = t.floor();
        self.s2 = t - self.c;
        self.s2
    }
}

impl RngCore for Alea {
    fn next_u32(&mut self) -> u32 {
        (self.next_f64() * 4_294_967_296.0) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let high = self.next_u32() as u64;
        let low = self.next_u32() as u64;
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        let mut chunks = dst.chunks_exact_mut(4);
        for chunk in &mut chunks {
            chunk.copy_from_slice(&self.next_u32().to_le_bytes());
        }
        let rem = chunks.into_remainder();
        if !rem.is_empty() {
            let bytes = self.next_u32().to_le_bytes();
            rem.copy_from_slice(&bytes[..rem.len()]);
        }
    }
}
