use sha2::{Digest, Sha256};
use std::fmt::Write as _;

///
/// Fingerprint
///
/// Stable digest of generated statement text. Emitters use the short form
/// as a prepared statement name, so the hashing scheme is versioned.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    #[must_use]
    pub fn of_statement(kind: &str, sql: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"stmtfp:v1");
        write_str(&mut hasher, kind);
        write_str(&mut hasher, sql);

        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);

        Self(out)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex of the full digest.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex(&self.0)
    }

    /// First eight bytes as lowercase hex.
    #[must_use]
    pub fn short(&self) -> String {
        hex(&self.0[..8])
    }
}

fn write_str(hasher: &mut Sha256, value: &str) {
    let len = u32::try_from(value.len()).unwrap_or(u32::MAX);
    hasher.update(len.to_be_bytes());
    hasher.update(value.as_bytes());
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_for_identical_input() {
        let a = Fingerprint::of_statement("select", "SELECT 1");
        let b = Fingerprint::of_statement("select", "SELECT 1");

        assert_eq!(a, b);
        assert_eq!(a.to_hex().len(), 64);
        assert_eq!(a.short().len(), 16);
    }

    #[test]
    fn fingerprint_separates_kind_and_text() {
        let a = Fingerprint::of_statement("select", "SELECT 1");
        let b = Fingerprint::of_statement("delete", "SELECT 1");
        let c = Fingerprint::of_statement("select", "SELECT 2");

        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
