//! Authenticated actor and the admin-override authorization rule.
//!
//! Identity is an external collaborator: the engine receives an already
//! authenticated (user id, role) pair and only decides whether that actor
//! may see or modify another user's data.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// The role carried by an authenticated actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A regular employee, restricted to their own records.
    Employee,
    /// An administrator, allowed to act on any user's records.
    Admin,
}

/// An authenticated (user id, role) pair, trusted as-is by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The acting user's id.
    pub user_id: Uuid,
    /// The acting user's role.
    pub role: Role,
}

impl Actor {
    /// Creates an employee actor.
    pub fn employee(user_id: Uuid) -> Self {
        Actor {
            user_id,
            role: Role::Employee,
        }
    }

    /// Creates an admin actor.
    pub fn admin(user_id: Uuid) -> Self {
        Actor {
            user_id,
            role: Role::Admin,
        }
    }

    /// Returns true when the actor may act on the target user's records.
    pub fn can_act_on(&self, target: Uuid) -> bool {
        self.role == Role::Admin || self.user_id == target
    }

    /// Fails with [`EngineError::Authorization`] unless the actor may act
    /// on the target user's records.
    pub fn authorize(&self, target: Uuid) -> EngineResult<()> {
        if self.can_act_on(target) {
            Ok(())
        } else {
            Err(EngineError::authorization(format!(
                "actor {} may not act on records of user {}",
                self.user_id, target
            )))
        }
    }

    /// Fails with [`EngineError::Authorization`] unless the actor is an
    /// administrator. Used by rate and holiday mutations.
    pub fn require_admin(&self) -> EngineResult<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(EngineError::authorization(format!(
                "actor {} is not an administrator",
                self.user_id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_may_only_touch_own_records() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        let actor = Actor::employee(own);

        assert!(actor.authorize(own).is_ok());
        assert!(matches!(
            actor.authorize(other),
            Err(EngineError::Authorization { .. })
        ));
        assert!(actor.require_admin().is_err());
    }

    #[test]
    fn test_admin_may_touch_any_records() {
        let actor = Actor::admin(Uuid::new_v4());
        assert!(actor.authorize(Uuid::new_v4()).is_ok());
        assert!(actor.require_admin().is_ok());
    }
}
