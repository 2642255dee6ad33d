//! Resource id synthesis
//!
//! Ids look like `dataprocsparkbatch-20240131235959-0a1b2c3d`: the lowercased
//! kind, the UTC submission time, and 32 random bits. The timestamp lets an
//! operator line an id up with logs; the suffix keeps retried invocations
//! from colliding.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Generate a fresh id for a resource of the given kind
pub fn generate_resource_id(kind: &str) -> String {
    let entropy: u32 = rand::thread_rng().r#gen();
    resource_id_at(kind, Utc::now(), entropy)
}

/// Deterministic form of [`generate_resource_id`]
pub fn resource_id_at(kind: &str, now: DateTime<Utc>, entropy: u32) -> String {
    format!(
        "{}-{}-{:08x}",
        kind.to_lowercase(),
        now.format("%Y%m%d%H%M%S"),
        entropy
    )
}
