//! In-memory registry of live sessions, keyed by interview id.
//!
//! A slot is `Loading` while the question set is being fetched and `Ready` once the
//! walker exists. Each ready session sits behind its own async mutex, so actions on a
//! single session are serialized while different sessions proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::session::walker::McqSession;

pub type SharedSession = Arc<Mutex<McqSession>>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no session for interview {0}")]
    NotFound(Uuid),

    #[error("session for interview {0} belongs to another user")]
    Forbidden(Uuid),

    #[error("session for interview {0} is still loading")]
    Loading(Uuid),
}

enum Slot {
    Loading { owner: Uuid },
    Ready { owner: Uuid, session: SharedSession },
}

impl Slot {
    fn owner(&self) -> Uuid {
        match self {
            Slot::Loading { owner } | Slot::Ready { owner, .. } => *owner,
        }
    }
}

/// Result of looking up a slot.
pub enum Lookup {
    Loading,
    Ready(SharedSession),
}

/// Result of asking to load a session.
pub enum LoadStart {
    /// A `Loading` slot was reserved; finish it with `LoadTicket::complete`.
    Started(LoadTicket),
    /// The interview already has a ready session for this user.
    Existing(SharedSession),
}

#[derive(Clone, Default)]
pub struct SessionRegistry {
    slots: Arc<RwLock<HashMap<Uuid, Slot>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_load(&self, interview_id: Uuid, owner: Uuid) -> Result<LoadStart, RegistryError> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        match slots.get(&interview_id) {
            Some(slot) if slot.owner() != owner => Err(RegistryError::Forbidden(interview_id)),
            Some(Slot::Loading { .. }) => Err(RegistryError::Loading(interview_id)),
            Some(Slot::Ready { session, .. }) => Ok(LoadStart::Existing(session.clone())),
            None => {
                slots.insert(interview_id, Slot::Loading { owner });
                Ok(LoadStart::Started(LoadTicket {
                    registry: self.clone(),
                    interview_id,
                    owner,
                    completed: false,
                }))
            }
        }
    }

    pub fn lookup(&self, interview_id: Uuid, owner: Uuid) -> Result<Lookup, RegistryError> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        match slots.get(&interview_id) {
            None => Err(RegistryError::NotFound(interview_id)),
            Some(slot) if slot.owner() != owner => Err(RegistryError::Forbidden(interview_id)),
            Some(Slot::Loading { .. }) => Ok(Lookup::Loading),
            Some(Slot::Ready { session, .. }) => Ok(Lookup::Ready(session.clone())),
        }
    }

    /// Like `lookup`, but a session that is still loading is an error.
    pub fn ready(&self, interview_id: Uuid, owner: Uuid) -> Result<SharedSession, RegistryError> {
        match self.lookup(interview_id, owner)? {
            Lookup::Ready(session) => Ok(session),
            Lookup::Loading => Err(RegistryError::Loading(interview_id)),
        }
    }

    /// Releases a ready slot. Callers that still hold the session keep their handle;
    /// the next lookup answers `NotFound`.
    pub fn remove(&self, interview_id: Uuid) -> bool {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        if matches!(slots.get(&interview_id), Some(Slot::Ready { .. })) {
            slots.remove(&interview_id);
            true
        } else {
            false
        }
    }

    /// Drops every slot owned by `owner`.
    pub fn remove_owned_by(&self, owner: Uuid) -> usize {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let before = slots.len();
        slots.retain(|_, slot| slot.owner() != owner);
        before - slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Reservation of a `Loading` slot. Dropping it without `complete` frees the slot,
/// so a failed or abandoned load leaves no partial state behind.
pub struct LoadTicket {
    registry: SessionRegistry,
    interview_id: Uuid,
    owner: Uuid,
    completed: bool,
}

impl LoadTicket {
    pub fn complete(mut self, session: McqSession) -> SharedSession {
        let shared = Arc::new(Mutex::new(session));
        let mut slots = self
            .registry
            .slots
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        slots.insert(
            self.interview_id,
            Slot::Ready {
                owner: self.owner,
                session: shared.clone(),
            },
        );
        self.completed = true;
        shared
    }
}

impl Drop for LoadTicket {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        let mut slots = self
            .registry
            .slots
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if matches!(slots.get(&self.interview_id), Some(Slot::Loading { .. })) {
            slots.remove(&self.interview_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::Language;
    use crate::session::models::{McqOption, Question, QuestionSet};

    fn session() -> McqSession {
        let set = QuestionSet {
            interview_id: "iv".to_string(),
            position_title: "QA".to_string(),
            cv_name: None,
            language: Language::Hu,
            questions: vec![Question {
                id: "q1".to_string(),
                order: 1,
                text: "?".to_string(),
                options: vec![McqOption {
                    id: "a".to_string(),
                    text: "A".to_string(),
                }],
                correct_option_id: "a".to_string(),
            }],
        };
        McqSession::new(set).unwrap()
    }

    fn started(start: LoadStart) -> LoadTicket {
        match start {
            LoadStart::Started(ticket) => ticket,
            LoadStart::Existing(_) => panic!("expected a fresh load"),
        }
    }

    #[test]
    fn test_second_load_while_loading_conflicts() {
        let registry = SessionRegistry::new();
        let (iv, user) = (Uuid::new_v4(), Uuid::new_v4());
        let _ticket = started(registry.begin_load(iv, user).unwrap());
        assert_eq!(
            registry.begin_load(iv, user).err(),
            Some(RegistryError::Loading(iv))
        );
        assert!(matches!(registry.lookup(iv, user), Ok(Lookup::Loading)));
    }

    #[test]
    fn test_dropped_ticket_frees_slot() {
        let registry = SessionRegistry::new();
        let (iv, user) = (Uuid::new_v4(), Uuid::new_v4());
        drop(started(registry.begin_load(iv, user).unwrap()));
        assert_eq!(registry.len(), 0);
        assert_eq!(
            registry.lookup(iv, user).err(),
            Some(RegistryError::NotFound(iv))
        );
    }

    #[test]
    fn test_completed_load_is_reused() {
        let registry = SessionRegistry::new();
        let (iv, user) = (Uuid::new_v4(), Uuid::new_v4());
        started(registry.begin_load(iv, user).unwrap()).complete(session());
        assert!(matches!(
            registry.begin_load(iv, user),
            Ok(LoadStart::Existing(_))
        ));
        assert!(registry.ready(iv, user).is_ok());
    }

    #[test]
    fn test_other_users_are_forbidden() {
        let registry = SessionRegistry::new();
        let (iv, owner, intruder) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        started(registry.begin_load(iv, owner).unwrap()).complete(session());
        assert_eq!(
            registry.ready(iv, intruder).err(),
            Some(RegistryError::Forbidden(iv))
        );
        assert_eq!(
            registry.begin_load(iv, intruder).err(),
            Some(RegistryError::Forbidden(iv))
        );
    }

    #[test]
    fn test_remove_releases_ready_slot_only() {
        let registry = SessionRegistry::new();
        let (ready, loading, user) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let handle = started(registry.begin_load(ready, user).unwrap()).complete(session());
        let _ticket = started(registry.begin_load(loading, user).unwrap());

        assert!(registry.remove(ready));
        assert!(!registry.remove(loading));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.ready(ready, user).err(),
            Some(RegistryError::NotFound(ready))
        );
        // Outstanding handles stay usable.
        assert_eq!(handle.try_lock().unwrap().total_questions(), 1);
    }

    #[test]
    fn test_remove_owned_by_only_touches_that_user() {
        let registry = SessionRegistry::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        started(registry.begin_load(Uuid::new_v4(), a).unwrap()).complete(session());
        started(registry.begin_load(Uuid::new_v4(), b).unwrap()).complete(session());
        assert_eq!(registry.remove_owned_by(a), 1);
        assert_eq!(registry.len(), 1);
    }
}
