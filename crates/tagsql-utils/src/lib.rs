//! Small shared helpers for the tagsql crates: identifier casing and
//! stable statement fingerprints.

pub mod case;
pub mod fingerprint;
