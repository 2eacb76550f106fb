//! Per-actor lifecycle state.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use praetor_core::enums::{ActorPhase, ActorRole};
use praetor_core::types::EntityId;

use crate::context::{EncounterContext, SharedContext};

/// Lifecycle flags of one actor plus its back-reference to the encounter.
#[derive(Debug, Clone)]
pub struct ActorState {
    id: EntityId,
    role: ActorRole,
    phase: ActorPhase,
    /// A non-instant action is in flight; suppresses new ability selection.
    casting: bool,
    context: Weak<RefCell<EncounterContext>>,
}

impl ActorState {
    pub fn new(id: EntityId, role: ActorRole, context: &SharedContext) -> Self {
        Self {
            id,
            role,
            phase: ActorPhase::Idle,
            casting: false,
            context: Rc::downgrade(context),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn role(&self) -> ActorRole {
        self.role
    }

    pub fn phase(&self) -> ActorPhase {
        self.phase
    }

    pub fn is_engaged(&self) -> bool {
        self.phase == ActorPhase::Engaged
    }

    pub fn is_alive(&self) -> bool {
        self.phase != ActorPhase::Dead
    }

    pub fn is_casting(&self) -> bool {
        self.casting
    }

    pub fn set_casting(&mut self, casting: bool) {
        self.casting = casting;
    }

    /// Idle → Engaged. Returns `false` (and changes nothing) from any other phase.
    pub fn engage(&mut self) -> bool {
        if self.phase != ActorPhase::Idle {
            return false;
        }
        debug!(actor = %self.id, role = ?self.role, "engaged");
        self.phase = ActorPhase::Engaged;
        true
    }

    /// Back to Idle with flags cleared. Dead actors stay dead.
    pub fn reset(&mut self) -> bool {
        if self.phase == ActorPhase::Dead {
            return false;
        }
        self.phase = ActorPhase::Idle;
        self.casting = false;
        true
    }

    /// Any phase → Dead. Returns `false` if already dead.
    pub fn kill(&mut self) -> bool {
        if self.phase == ActorPhase::Dead {
            return false;
        }
        debug!(actor = %self.id, role = ?self.role, "died");
        self.phase = ActorPhase::Dead;
        self.casting = false;
        true
    }

    /// Run `f` against the shared context. `None` once the instance is gone.
    pub fn with_context<T>(&self, f: impl FnOnce(&mut EncounterContext) -> T) -> Option<T> {
        match self.context.upgrade() {
            Some(context) => Some(f(&mut context.borrow_mut())),
            None => {
                warn!(actor = %self.id, "encounter context dropped; ignoring");
                None
            }
        }
    }
}
