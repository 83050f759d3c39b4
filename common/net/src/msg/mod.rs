pub mod client;
pub mod server;

// Reexports
pub use self::client::{ClientMsg, SoldierInput};
pub use self::server::{ServerError, ServerMsg, SoldierState};

pub const MAX_NICKNAME_LEN: usize = 24;

/// Whether a nickname is fit to show to other players: nonempty after
/// trimming, bounded, no control characters.
pub fn validate_nickname(nickname: &str) -> bool {
    !nickname.trim().is_empty()
        && nickname.len() <= MAX_NICKNAME_LEN
        && nickname.chars().all(|c| !c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nickname_validation() {
        assert!(validate_nickname("grunt"));
        assert!(validate_nickname("Maj. Boobage"));
        assert!(!validate_nickname(""));
        assert!(!validate_nickname("   "));
        assert!(!validate_nickname("new\nline"));
        assert!(!validate_nickname(&"x".repeat(MAX_NICKNAME_LEN + 1)));
    }
}
