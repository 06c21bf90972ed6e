//! Redis key layout for stored boosters

use shared::ActorId;

/// Per-actor hash: field = booster type key, value = JSON record
pub const ACTOR_KEY_PREFIX: &str = "boosters:actor:";

/// Set of actor ids that currently have a hash
const ACTOR_INDEX: &str = "boosters:actors";

pub fn actor_key(actor: ActorId) -> String {
    format!("{}{}", ACTOR_KEY_PREFIX, actor)
}

pub fn actor_index_key() -> &'static str {
    ACTOR_INDEX
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_actor_key_format() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(actor_key(id), "boosters:actor:550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn test_index_key_is_constant() {
        assert_eq!(actor_index_key(), "boosters:actors");
    }
}
