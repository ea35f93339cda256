//! Short id generation.
//!
//! Each escalation carries a full UUID for internal bookkeeping and an
//! 8-hex-character short id for use in chat messages, derived from the
//! UUID's simple (no-dash) form and collision-resolved by regenerating the
//! UUID rather than the id scheme itself.

use uuid::Uuid;

/// Derives the short id for a UUID: `esc-` followed by its first 8 hex
/// characters.
pub fn short_id_of(id: Uuid) -> String {
    format!("esc-{}", &id.simple().to_string()[..8])
}

/// Generates a UUID/short-id pair, regenerating the UUID whenever `exists`
/// reports the candidate short id is already in use.
pub fn generate_unique_id(mut exists: impl FnMut(&str) -> bool) -> (Uuid, String) {
    loop {
        let id = Uuid::new_v4();
        let short_id = short_id_of(id);
        if !exists(&short_id) {
            return (id, short_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_is_prefixed_and_eight_hex_chars() {
        let id = Uuid::new_v4();
        let short = short_id_of(id);
        assert!(short.starts_with("esc-"));
        assert_eq!(short.len(), "esc-".len() + 8);
    }

    #[test]
    fn collision_triggers_regeneration() {
        let mut calls = 0;
        let (_, short) = generate_unique_id(|_| {
            calls += 1;
            calls == 1
        });
        assert!(short.starts_with("esc-"));
        assert_eq!(calls, 2);
    }
}
