use crate::error::Error;
use crate::order::{Actor, Assignment, Order, OrderId, Status,
                   StatusUpdate, UpdateError};

pub mod mem;
#[cfg(feature = "redis_db")]
pub mod redis_db;

#[cfg(feature = "redis_db")]
pub use redis_db::Db;
#[cfg(not(feature = "redis_db"))]
pub use mem::Db;

/// Where orders live
///
/// Both stores re-check every status change with the same rules
/// that produce `Order::allowed_transitions`
#[allow(async_fn_in_trait)]
pub trait Store {
    /// Returns new order's `OrderId`
    /// Also updates the order itself
    async fn add_order(&mut self, order: &mut Order) -> Result<OrderId, Error>;

    /// Returns Ok(None) if there is no such order
    async fn get_order(&mut self, oid: OrderId) -> Result<Option<Order>, Error>;

    /// All orders, oldest first
    async fn list_orders(&mut self) -> Result<Vec<Order>, Error>;

    async fn orders_by_status(&mut self, status: Status)
        -> Result<Vec<Order>, Error>;

    /// Performs the update and returns previous status and the Order
    async fn update_status(
        &mut self,
        actor: Actor,
        update: StatusUpdate,
    ) -> Result<(Status, Order), UpdateError>;

    async fn assign(
        &mut self,
        actor: Actor,
        oid: OrderId,
        assignment: Assignment,
    ) -> Result<Order, UpdateError>;
}
