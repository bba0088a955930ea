use crate::order::{OrderId, Role, Status};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateError {
    /// Could not find the specified order
    OrderNotFound(OrderId),

    /// The order has nowhere to go from here
    Terminal(Status),

    /// Only admins get to do this
    AdminOnly,

    /// This role can't move the order from `from` to `to`
    NotPermitted { role: Role, from: Status, to: Status },

    /// Some other technical error
    Other,
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::OrderNotFound(oid) => {
                write!(f, "Could not find order {oid}. \
It may have been removed or the id is wrong")
            },
            UpdateError::Terminal(status) => {
                write!(f, "The order is already {}, no further changes \
are possible", status.id())
            },
            UpdateError::AdminOnly => {
                write!(f, "Only admins can assign suppliers and delivery associates")
            },
            UpdateError::NotPermitted { role, from, to } => {
                write!(f, "A {role} cannot change an order from {} to {}",
                       from.id(), to.id())
            },
            UpdateError::Other => { write!(f, "Some error occured") }
        }
    }
}

impl std::error::Error for UpdateError {}
