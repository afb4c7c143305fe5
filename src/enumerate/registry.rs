//! Content-addressed set of rays for duplicate suppression.
//!
//! Each stored ray is kept in primitive form and indexed by a 64-bit
//! signature over the sign-magnitude encoding of its coordinates. The map
//! is keyed directly by that signature; colliding signatures fall back to a
//! full coordinate comparison within the bucket.

use smallvec::SmallVec;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hasher};

use crate::polyhedral::RayVec;

// Fixed seeds keep signatures reproducible from run to run.
const SIGNATURE_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

#[derive(Clone, Copy, Debug, Default)]
struct BuildIdentityHasher;

#[derive(Clone, Copy, Debug, Default)]
struct IdentityHasher(u64);

impl Hasher for IdentityHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        debug_assert_eq!(bytes.len(), 8, "IdentityHasher expects u64 keys");
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        self.0 = u64::from_ne_bytes(arr);
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.0 = i;
    }
}

impl BuildHasher for BuildIdentityHasher {
    type Hasher = IdentityHasher;

    #[inline]
    fn build_hasher(&self) -> Self::Hasher {
        IdentityHasher(0)
    }
}

/// A set of rays compared by content, remembering insertion order.
#[derive(Clone, Debug)]
pub struct RayRegistry {
    rays: Vec<RayVec>,
    index: HashMap<u64, SmallVec<[usize; 2]>, BuildIdentityHasher>,
    state: ahash::RandomState,
}

impl Default for RayRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RayRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        let [k0, k1, k2, k3] = SIGNATURE_SEEDS;
        Self {
            rays: Vec::new(),
            index: HashMap::default(),
            state: ahash::RandomState::with_seeds(k0, k1, k2, k3),
        }
    }

    /// The content signature of a ray, as stored.
    pub fn signature(&self, ray: &RayVec) -> u64 {
        let mut hasher = self.state.build_hasher();
        for coord in ray.iter() {
            coord.hash_sign_magnitude(&mut hasher);
        }
        hasher.write_usize(ray.len());
        hasher.finish()
    }

    /// Insert `ray` (after reducing it to primitive form) unless an equal
    /// ray is already present. Returns `true` if it was inserted.
    pub fn insert_if_new(&mut self, mut ray: RayVec) -> bool {
        ray.normalise();
        let sig = self.signature(&ray);
        let bucket = self.index.entry(sig).or_default();
        if bucket.iter().any(|&id| self.rays[id] == ray) {
            return false;
        }
        bucket.push(self.rays.len());
        self.rays.push(ray);
        true
    }

    /// Is a ray equal to the primitive form of `ray` present?
    pub fn contains(&self, ray: &RayVec) -> bool {
        let ray = ray.clone().normalised();
        let sig = self.signature(&ray);
        self.index
            .get(&sig)
            .is_some_and(|bucket| bucket.iter().any(|&id| self.rays[id] == ray))
    }

    /// Number of distinct rays stored.
    pub fn len(&self) -> usize {
        self.rays.len()
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.rays.is_empty()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.rays.clear();
        self.index.clear();
    }

    /// Iterate over the stored rays in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, RayVec> {
        self.rays.iter()
    }

    /// Take every stored ray, in insertion order, leaving the registry empty.
    pub fn take_rays(&mut self) -> Vec<RayVec> {
        self.index.clear();
        std::mem::take(&mut self.rays)
    }
}
