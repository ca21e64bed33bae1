//! Stable hashing for string values.
//!
//! String literals and string parameters never survive into the VM as
//! text; they are collapsed to a stable FNV-1a 64-bit hash at compile
//! time. Equality and set membership over strings are therefore hash
//! comparisons, which must be a deterministic consequence of the input
//! bytes alone.
//!
//! NOTE: FNV-1a is **not** cryptographically secure. It is used
//! strictly for stable value identity; callers accept the theoretical
//! collision risk.

/// 64-bit FNV-1a offset basis.
pub const FNV1A_OFFSET_BASIS_64: u64 = 0xcbf29ce484222325;
/// 64-bit FNV-1a prime.
pub const FNV1A_PRIME_64: u64 = 0x0000_0100_0000_01B3;

/// Mix bytes into an existing FNV-1a 64-bit hash state.
///
/// For each byte, XOR it into the hash and multiply by the FNV prime.
/// Start from [`FNV1A_OFFSET_BASIS_64`] for a fresh hash.
#[inline]
pub const fn fnv1a64_mix(mut hash: u64, bytes: &[u8]) -> u64 {
    let mut i = 0usize;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV1A_PRIME_64);
        i += 1;
    }
    hash
}

/// Hash an arbitrary byte slice with FNV-1a 64-bit.
#[inline]
pub const fn fnv1a64(bytes: &[u8]) -> u64 {
    fnv1a64_mix(FNV1A_OFFSET_BASIS_64, bytes)
}

/// Hash a UTF-8 string with FNV-1a 64-bit.
#[inline]
pub const fn fnv1a64_str(s: &str) -> u64 {
    fnv1a64(s.as_bytes())
}
