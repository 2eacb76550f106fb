//! Shared coordination surface for the actors of one encounter instance.
//!
//! The instance owns the context (`Rc<RefCell<_>>`); actors hold only a
//! `Weak` back-reference. Execution is single-threaded and cooperative, so
//! `RefCell` borrows never overlap.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use praetor_core::constants::INVALID_KILL_FLAG;
use praetor_core::enums::{ActorRole, EncounterStatus};
use praetor_core::types::{EntityId, FlagId};

/// Strong handle held by whoever owns the instance.
pub type SharedContext = Rc<RefCell<EncounterContext>>;

/// Instance-level key/value flags, read by external accounting.
pub trait InstanceStore {
    fn set_flag(&mut self, flag: FlagId, value: u32);
    /// Unset flags read as zero.
    fn flag(&self, flag: FlagId) -> u32;
}

/// In-memory [`InstanceStore`].
#[derive(Debug, Clone, Default)]
pub struct InstanceFlags {
    values: HashMap<FlagId, u32>,
}

impl InstanceStore for InstanceFlags {
    fn set_flag(&mut self, flag: FlagId, value: u32) {
        self.values.insert(flag, value);
    }

    fn flag(&self, flag: FlagId) -> u32 {
        self.values.get(&flag).copied().unwrap_or(0)
    }
}

pub struct EncounterContext {
    roles: HashMap<ActorRole, EntityId>,
    status: EncounterStatus,
    store: Box<dyn InstanceStore>,
}

impl Default for EncounterContext {
    fn default() -> Self {
        Self::with_store(Box::new(InstanceFlags::default()))
    }
}

impl EncounterContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: Box<dyn InstanceStore>) -> Self {
        Self {
            roles: HashMap::new(),
            status: EncounterStatus::default(),
            store,
        }
    }

    /// Wrap in the shared handle the instance keeps alive.
    pub fn shared(self) -> SharedContext {
        Rc::new(RefCell::new(self))
    }

    /// Record which entity plays `role`. Replaces any previous holder.
    pub fn register(&mut self, role: ActorRole, id: EntityId) {
        self.roles.insert(role, id);
    }

    /// Forget `role`, but only if `id` still holds it.
    pub fn unregister(&mut self, role: ActorRole, id: EntityId) {
        if self.roles.get(&role) == Some(&id) {
            self.roles.remove(&role);
        }
    }

    pub fn lookup(&self, role: ActorRole) -> Option<EntityId> {
        self.roles.get(&role).copied()
    }

    pub fn status(&self) -> EncounterStatus {
        self.status
    }

    pub fn set_status(&mut self, status: EncounterStatus) {
        self.status = status;
    }

    pub fn set_flag(&mut self, flag: FlagId, value: u32) {
        self.store.set_flag(flag, value);
    }

    pub fn flag(&self, flag: FlagId) -> u32 {
        self.store.flag(flag)
    }

    /// A player died to an encounter actor: the kill can no longer be clean.
    pub fn clear_invalid_kill(&mut self) {
        self.store.set_flag(INVALID_KILL_FLAG, 0);
    }
}

impl std::fmt::Debug for EncounterContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncounterContext")
            .field("roles", &self.roles)
            .field("status", &self.status)
            .field("invalid_kill_flag", &self.store.flag(INVALID_KILL_FLAG))
            .finish()
    }
}
