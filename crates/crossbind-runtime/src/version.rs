//! Version compatibility gate.
//!
//! Versions are dot-separated non-negative integer tuples. Identical
//! literal strings are compatible immediately, even when malformed, so a
//! component built against the exact same string always passes. Anything
//! else failing the tuple pattern fails closed.
//!
//! Tuple ordering is deliberate: equal-length tuples compare integer by
//! integer at the leftmost divergence; unequal-length tuples make the
//! longer one newer without consulting digits. "1.9" is therefore older
//! than "1.2.0.0". Components in the field rely on this, so it is kept
//! as-is.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

static VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d+)*$").unwrap());

/// Outcome of gating a discovered version against the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// Discovered component is not older than expected.
    Compatible,
    /// Discovered component is older than expected, or either string is
    /// malformed.
    Incompatible,
}

/// Order two version strings.
///
/// Returns `None` when either string fails the tuple pattern. The
/// ordering is discovered relative to expected: `Greater` means the
/// discovered tuple is newer.
pub fn compare(discovered: &str, expected: &str) -> Option<Ordering> {
    if !VERSION_RE.is_match(discovered) || !VERSION_RE.is_match(expected) {
        return None;
    }

    let lib: Vec<u64> = discovered.split('.').map(|t| t.parse().ok()).collect::<Option<_>>()?;
    let client: Vec<u64> = expected.split('.').map(|t| t.parse().ok()).collect::<Option<_>>()?;

    if lib.len() == client.len() {
        for (l, c) in lib.iter().zip(client.iter()) {
            if l != c {
                return Some(l.cmp(c));
            }
        }
        Some(Ordering::Equal)
    } else {
        // Length decides on its own; digits are not consulted.
        Some(lib.len().cmp(&client.len()))
    }
}

/// Gate a discovered version string against the expected one.
///
/// Identical strings short-circuit to compatible. Otherwise the
/// discovered version must parse and be not older than expected.
pub fn check(discovered: &str, expected: &str) -> Compatibility {
    if discovered == expected {
        return Compatibility::Compatible;
    }
    match compare(discovered, expected) {
        Some(Ordering::Greater) | Some(Ordering::Equal) => Compatibility::Compatible,
        Some(Ordering::Less) | None => Compatibility::Incompatible,
    }
}
