//! Composite process identity.

/// Opaque grouping key for a process: `"pid:desc:ppid"` as lowercase hex.
///
/// Only used to tell processes apart; it is never decoded.
pub fn identity_key(pid: i32, desc: &str, ppid: i32) -> String {
    hex::encode(format!("{pid}:{desc}:{ppid}"))
}
