use std::fmt;
use serde::{Serialize, Deserialize};

mod status;
mod role;
mod status_update;
mod update_error;
pub mod transitions;
pub use status::Status;
pub use role::Role;
pub use status_update::StatusUpdate;
pub use update_error::UpdateError;
pub use transitions::{allowed_transitions, allowed_transitions_by_id};
use crate::Offset;
use crate::DateTime;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
         Serialize, Deserialize)]
#[repr(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
         Serialize, Deserialize)]
#[repr(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whoever is asking, and in which capacity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub const fn new(id: UserId, role: Role) -> Actor {
        Actor { id, role }
    }
}

/// Who gets attached to an order after it's created
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignment {
    Supplier(UserId),
    DeliveryAssociate(UserId),
}

/// One applied status change
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: Status,
    pub to: Status,
    pub by: Actor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub at: DateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    /// Id of this order, None if not persisted in the database
    pub id: Option<OrderId>,

    pub name: String,

    /// Who placed this order
    pub customer: UserId,

    /// Who fulfils it, if anybody was assigned yet
    pub supplier: Option<UserId>,

    /// Who carries it, if anybody was assigned yet
    pub delivery_associate: Option<UserId>,

    pub status: Status,

    pub created_at: DateTime,

    /// Every status change, oldest first
    #[serde(default)]
    pub history: Vec<StatusChange>,
}

impl Order {
    pub fn new<S: Into<String>>(name: S, customer: UserId) -> Order {
        Order {
            id: None,
            name: name.into(),
            customer,
            supplier: None,
            delivery_associate: None,
            status: Status::Pending,
            created_at: Offset::now(),
            history: Vec::new(),
        }
    }

    /// Returns true if `actor` has something to do with this order
    pub fn is_party(&self, actor: Actor) -> bool {
        match actor.role {
            Role::Admin             => true,
            Role::Customer          => self.customer == actor.id,
            Role::Supplier          => self.supplier == Some(actor.id),
            Role::DeliveryAssociate => self.delivery_associate == Some(actor.id),
        }
    }

    /// Statuses `actor` may move this order to right now
    pub fn allowed_transitions(&self, actor: Actor) -> Vec<Status> {
        if ! self.is_party(actor) {
            return Vec::new()
        }
        allowed_transitions(self.status, actor.role)
    }

    pub fn is_update_permitted(&self, actor: Actor, status: Status) -> bool {
        self.allowed_transitions(actor).contains(&status)
    }

    /// Applies `update` and returns previous status
    pub fn apply_update(
        &mut self,
        actor: Actor,
        update: &StatusUpdate,
    ) -> Result<Status, UpdateError> {
        if self.id != Some(update.order_id) {
            return Err(UpdateError::OrderNotFound(update.order_id))
        }
        // Orders of others look the same as missing ones
        if ! self.is_party(actor) {
            return Err(UpdateError::OrderNotFound(update.order_id))
        }
        if self.status.is_terminal() {
            return Err(UpdateError::Terminal(self.status))
        }
        if ! self.is_update_permitted(actor, update.status) {
            return Err(UpdateError::NotPermitted {
                role: actor.role,
                from: self.status,
                to: update.status,
            })
        }

        let prev_status = self.status;
        self.status = update.status;
        self.history.push(StatusChange {
            from: prev_status,
            to: update.status,
            by: actor,
            note: update.note.clone(),
            at: Offset::now(),
        });

        Ok(prev_status)
    }

    /// Attaches a supplier or a delivery associate, admins only
    pub fn assign(
        &mut self,
        actor: Actor,
        assignment: Assignment,
    ) -> Result<(), UpdateError> {
        if ! self.is_party(actor) {
            return Err(UpdateError::OrderNotFound(self.id.unwrap_or_default()))
        }
        if actor.role != Role::Admin {
            return Err(UpdateError::AdminOnly)
        }
        if self.status.is_terminal() {
            return Err(UpdateError::Terminal(self.status))
        }

        match assignment {
            Assignment::Supplier(uid) => {
                self.supplier = Some(uid);
            },
            Assignment::DeliveryAssociate(uid) => {
                self.delivery_associate = Some(uid);
            },
        }
        Ok(())
    }
}
