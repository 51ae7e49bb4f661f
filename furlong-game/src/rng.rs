//! Seedable randomness plumbing.
//!
//! Every probabilistic decision in the core draws from an explicit
//! generator so tests can inject a fixed seed and assert exact outcomes.
//! Streams are domain-separated so that, say, extra scout draws never
//! shift horse generation.

use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use std::cell::{RefCell, RefMut};

/// Bundle of domain-separated RNG streams derived from one user seed.
///
/// `stable` covers horse generation, breeding, and market offers;
/// `economy` covers upgrade and boost rolls; `scout` covers intel leaks.
/// Race engines take an owned per-race generator via [`Self::race_rng`]
/// so an aborted or re-run race never perturbs the session streams.
#[derive(Debug)]
pub struct RngBundle {
    user_seed: u64,
    stable: RefCell<CountingRng<SmallRng>>,
    economy: RefCell<CountingRng<SmallRng>>,
    scout: RefCell<CountingRng<SmallRng>>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        let stable = CountingRng::new(derive_stream_seed(seed, b"stable"));
        let economy = CountingRng::new(derive_stream_seed(seed, b"economy"));
        let scout = CountingRng::new(derive_stream_seed(seed, b"scout"));
        Self {
            user_seed: seed,
            stable: RefCell::new(stable),
            economy: RefCell::new(economy),
            scout: RefCell::new(scout),
        }
    }

    /// Access the stable-management RNG stream.
    #[must_use]
    pub fn stable(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.stable.borrow_mut()
    }

    /// Access the economy RNG stream.
    #[must_use]
    pub fn economy(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.economy.borrow_mut()
    }

    /// Access the scout RNG stream.
    #[must_use]
    pub fn scout(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.scout.borrow_mut()
    }

    /// Fork an owned generator for one race. ChaCha keeps the stream
    /// portable across platforms so shared seeds replay identically.
    #[must_use]
    pub fn race_rng(&self, race_number: u32) -> ChaCha20Rng {
        let mut tag = Vec::with_capacity(9);
        tag.extend_from_slice(b"race-");
        tag.extend_from_slice(&race_number.to_le_bytes());
        ChaCha20Rng::seed_from_u64(derive_stream_seed(self.user_seed, &tag))
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes())
        .expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}

/// Pick one item by weight using a cumulative draw.
///
/// Returns `None` for an empty list or a non-positive total weight.
/// This is the single weighted-choice implementation shared by phase
/// selection and upgrade selection.
pub fn weighted_choice<'a, T, R: Rng + ?Sized>(
    rng: &mut R,
    items: &'a [(T, f64)],
) -> Option<&'a T> {
    let total: f64 = items.iter().map(|(_, w)| w.max(0.0)).sum();
    if items.is_empty() || total <= 0.0 {
        return None;
    }
    let mut roll = rng.r#gen::<f64>() * total;
    for (item, weight) in items {
        let weight = weight.max(0.0);
        if weight == 0.0 {
            continue;
        }
        roll -= weight;
        if roll <= 0.0 {
            return Some(item);
        }
    }
    items.first().map(|(item, _)| item)
}

/// Sample a normal distribution via Box-Muller.
pub fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let mut u = 0.0f64;
    let mut v = 0.0f64;
    while u == 0.0 {
        u = rng.r#gen::<f64>();
    }
    while v == 0.0 {
        v = rng.r#gen::<f64>();
    }
    mean + std_dev * (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn streams_are_seed_stable_and_independent() {
        let one = RngBundle::from_user_seed(7);
        let two = RngBundle::from_user_seed(7);
        assert_eq!(one.stable().next_u64(), two.stable().next_u64());
        assert_eq!(one.economy().next_u64(), two.economy().next_u64());
        // A drained scout stream must not shift the stable stream.
        for _ in 0..32 {
            let _ = one.scout().next_u64();
        }
        assert_eq!(one.stable().next_u64(), two.stable().next_u64());
    }

    #[test]
    fn race_rng_varies_by_race_number() {
        let bundle = RngBundle::from_user_seed(11);
        let mut a = bundle.race_rng(1);
        let mut b = bundle.race_rng(2);
        let mut a2 = bundle.race_rng(1);
        assert_eq!(a.next_u64(), a2.next_u64());
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn counting_rng_tracks_draws() {
        let bundle = RngBundle::from_user_seed(3);
        let mut rng = bundle.stable();
        let _ = rng.next_u32();
        let _ = rng.next_u64();
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    fn weighted_choice_handles_edges() {
        let bundle = RngBundle::from_user_seed(5);
        let mut rng = bundle.economy();
        let empty: [(u8, f64); 0] = [];
        assert!(weighted_choice(&mut *rng, &empty).is_none());
        assert!(weighted_choice(&mut *rng, &[("a", 0.0)]).is_none());
        let only = [("solo", 2.5)];
        assert_eq!(weighted_choice(&mut *rng, &only), Some(&"solo"));
    }

    #[test]
    fn weighted_choice_respects_weights() {
        let bundle = RngBundle::from_user_seed(13);
        let mut rng = bundle.economy();
        let items = [("heavy", 100.0), ("light", 0.001)];
        let mut heavy = 0;
        for _ in 0..200 {
            if weighted_choice(&mut *rng, &items) == Some(&"heavy") {
                heavy += 1;
            }
        }
        assert!(heavy > 190);
    }

    #[test]
    fn normal_sampling_centers_on_mean() {
        let bundle = RngBundle::from_user_seed(17);
        let mut rng = bundle.stable();
        let mean: f64 = (0..2000).map(|_| normal(&mut *rng, 5.0, 2.0)).sum::<f64>() / 2000.0;
        assert!((mean - 5.0).abs() < 0.5, "sample mean {mean} drifted");
    }
}
