//! Actor presence and permissions
//!
//! The booster manager only needs to know whether an actor is online and
//! which permission nodes it holds. Game servers plug in their own
//! directory; `InMemoryActorDirectory` backs the HTTP session endpoints.

use shared::ActorId;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub trait ActorDirectory: Send + Sync {
    fn is_online(&self, actor: ActorId) -> bool;

    fn has_permission(&self, actor: ActorId, permission: &str) -> bool;
}

/// Session table keyed by actor, holding each online actor's permissions
#[derive(Debug, Default)]
pub struct InMemoryActorDirectory {
    sessions: RwLock<HashMap<ActorId, HashSet<String>>>,
}

impl InMemoryActorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an actor online, replacing any previous permission set
    pub fn join<I, S>(&self, actor: ActorId, permissions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let permissions = permissions.into_iter().map(Into::into).collect();
        self.write().insert(actor, permissions);
    }

    /// Mark an actor offline; returns whether it was online
    pub fn quit(&self, actor: ActorId) -> bool {
        self.write().remove(&actor).is_some()
    }

    pub fn online_count(&self) -> usize {
        self.read().len()
    }

    /// A writer that panicked leaves the table consistent, so poisoning is recovered
    fn read(&self) -> RwLockReadGuard<'_, HashMap<ActorId, HashSet<String>>> {
        self.sessions.read().unwrap_or_else(|poisoned| {
            tracing::warn!("Actor session table lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ActorId, HashSet<String>>> {
        self.sessions.write().unwrap_or_else(|poisoned| {
            tracing::warn!("Actor session table lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl ActorDirectory for InMemoryActorDirectory {
    fn is_online(&self, actor: ActorId) -> bool {
        self.read().contains_key(&actor)
    }

    fn has_permission(&self, actor: ActorId, permission: &str) -> bool {
        self.read()
            .get(&actor)
            .map(|granted| granted.contains(permission))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_join_and_quit() {
        let directory = InMemoryActorDirectory::new();
        let actor = Uuid::new_v4();

        assert!(!directory.is_online(actor));
        directory.join(actor, ["booster.permission.points.3"]);
        assert!(directory.is_online(actor));
        assert!(directory.has_permission(actor, "booster.permission.points.3"));
        assert!(!directory.has_permission(actor, "booster.permission.points.4"));

        assert!(directory.quit(actor));
        assert!(!directory.quit(actor));
        assert!(!directory.has_permission(actor, "booster.permission.points.3"));
    }

    #[test]
    fn test_join_survives_poisoned_lock() {
        let directory = std::sync::Arc::new(InMemoryActorDirectory::new());
        let poisoner = directory.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.sessions.write().unwrap();
            panic!("poison the session table");
        })
        .join();
        assert!(directory.sessions.is_poisoned());

        let actor = Uuid::new_v4();
        directory.join(actor, ["booster.permission.exp.2"]);
        assert!(directory.is_online(actor));
        assert!(directory.has_permission(actor, "booster.permission.exp.2"));
        assert_eq!(directory.online_count(), 1);
        assert!(directory.quit(actor));
        assert!(!directory.is_online(actor));
    }
}
