//! Seed-fixed MurmurHash3 fingerprints of byte strings.
//!
//! Both sketches hash items through here rather than through a randomly
//! seeded `Hasher`, so a sketch built in one process can be merged with, or
//! compared against, a sketch built in another.

const SEED: u32 = 0;

/// 32-bit fingerprint (MurmurHash3 x86_32).
#[inline]
pub fn hash32(bytes: &[u8]) -> u32 {
    mur3::murmurhash3_x86_32(bytes, SEED)
}

/// 64-bit fingerprint: the first half of MurmurHash3 x64_128.
#[inline]
pub fn hash64(bytes: &[u8]) -> u64 {
    mur3::murmurhash3_x64_128(bytes, SEED).0
}
