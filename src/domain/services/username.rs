//! Username allocation for accounts created from a Telegram chat.

use std::collections::HashSet;

/// Prefix of usernames synthesized for chats without a public username.
pub const FALLBACK_USERNAME_PREFIX: &str = "tg_";

/// Fallback username for a chat without a public username.
pub fn fallback_username(chat_id: i64) -> String {
    format!("{}{}", FALLBACK_USERNAME_PREFIX, chat_id)
}

/// Pick a free username given every taken name of the form `base` or
/// `base<digits>`.
///
/// Returns `base` itself when free, otherwise `base` with the smallest
/// positive numeric suffix not yet taken. The flag reports whether a
/// suffix was added.
pub fn resolve_unique_username<S: AsRef<str>>(base: &str, taken: &[S]) -> (String, bool) {
    let taken: HashSet<&str> = taken.iter().map(AsRef::as_ref).collect();
    if !taken.contains(base) {
        return (base.to_string(), false);
    }

    let mut suffix: u64 = 1;
    loop {
        let candidate = format!("{}{}", base, suffix);
        if !taken.contains(candidate.as_str()) {
            return (candidate, true);
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn free_base_is_kept() {
        let taken: [&str; 0] = [];
        assert_eq!(resolve_unique_username("alice", &taken), ("alice".to_string(), false));
        assert_eq!(
            resolve_unique_username("alice", &["alice1"]),
            ("alice".to_string(), false)
        );
    }

    #[test]
    fn picks_smallest_free_suffix() {
        assert_eq!(
            resolve_unique_username("alice", &["alice", "alice1"]),
            ("alice2".to_string(), true)
        );
        assert_eq!(
            resolve_unique_username("alice", &["alice", "alice2"]),
            ("alice1".to_string(), true)
        );
    }

    #[test]
    fn fallback_uses_chat_id() {
        assert_eq!(fallback_username(123456), "tg_123456");
    }
}
