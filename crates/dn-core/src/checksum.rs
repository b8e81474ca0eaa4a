//! SHA-256 checksum utilities for change detection.

use sha2::{Digest, Sha256};

/// Compute the SHA256 checksum of several parts in order.
///
/// Parts are length-prefixed before hashing so that `["ab", "c"]` and
/// `["a", "bc"]` produce different digests.
pub fn compute_checksum_parts<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha256::new();
    for part in parts {
        let bytes = part.as_ref().as_bytes();
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_stable() {
        assert_eq!(
            compute_checksum_parts(["x = 1"]),
            compute_checksum_parts(["x = 1"])
        );
        assert_ne!(
            compute_checksum_parts(["x = 1"]),
            compute_checksum_parts(["x = 2"])
        );
    }

    #[test]
    fn parts_are_length_prefixed() {
        assert_ne!(
            compute_checksum_parts(["ab", "c"]),
            compute_checksum_parts(["a", "bc"])
        );
    }
}
