//! UUID utilities

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse UUID from string
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(s)
}

/// True if `s` is a well-formed UUID
pub fn is_valid(s: &str) -> bool {
    parse(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_valid_and_distinct() {
        let a = generate();
        let b = generate();
        assert_ne!(a, b);
        assert!(is_valid(&a.to_string()));
    }

    #[test]
    fn test_rejects_malformed_ids() {
        assert!(!is_valid("not-a-uuid"));
        assert!(!is_valid(""));
        assert!(!is_valid("123"));
    }
}
