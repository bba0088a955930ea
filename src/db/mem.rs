use tokio::task::spawn_blocking;
use std::sync::{Arc, RwLock};
use std::collections::BTreeMap;
use crate::db::Store;
use crate::error::Error;
use crate::order::{Actor, Assignment, Order, OrderId, Status,
                   StatusUpdate, UpdateError};

/// Wrapper for InnerDb that is Send, Sync, and async
#[derive(Clone, Default)]
pub struct Db {
    db: Arc<RwLock<InnerDb>>,
}

impl Db {
    pub fn new() -> Self {
        Db::default()
    }
}

impl Store for Db {
    async fn add_order(&mut self, order: &mut Order) -> Result<OrderId, Error> {
        let db = self.db.clone();
        let mut o = order.clone();
        let oid = spawn_blocking(move || -> Result<OrderId, Error> {
            let mut db = db.write().map_err(|e| format!("lock: {e:?}"))?;
            Ok(db.add_order(&mut o))
        }).await.map_err(|e| format!("{e:?}"))??;
        order.id = Some(oid);
        Ok(oid)
    }

    async fn get_order(&mut self, oid: OrderId) -> Result<Option<Order>, Error> {
        let db = self.db.clone();
        spawn_blocking(move || -> Result<Option<Order>, Error> {
            let db = db.read().map_err(|e| format!("Rlock: {e:?}"))?;
            Ok(db.orders.get(&oid).cloned())
        }).await.map_err(|e| format!("{e:?}"))?
    }

    async fn list_orders(&mut self) -> Result<Vec<Order>, Error> {
        let db = self.db.clone();
        spawn_blocking(move || -> Result<Vec<Order>, Error> {
            let db = db.read().map_err(|e| format!("Rlock: {e:?}"))?;
            Ok(db.orders.values().cloned().collect())
        }).await.map_err(|e| format!("{e:?}"))?
    }

    async fn orders_by_status(
        &mut self,
        status: Status,
    ) -> Result<Vec<Order>, Error> {
        let db = self.db.clone();
        spawn_blocking(move || -> Result<Vec<Order>, Error> {
            let db = db.read().map_err(|e| format!("Rlock: {e:?}"))?;
            Ok(db.orders_by_status(status))
        }).await.map_err(|e| format!("{e:?}"))?
    }

    async fn update_status(
        &mut self,
        actor: Actor,
        update: StatusUpdate,
    ) -> Result<(Status, Order), UpdateError> {
        let db = self.db.clone();
        let res = spawn_blocking(move || {
            let mut db = match db.write() {
                Ok(db) => db,
                Err(e) => {
                    log::warn!("WLock: {e:?}");
                    return Err(UpdateError::Other);
                },
            };
            db.update_status(actor, &update)
        }).await;

        match res {
            Ok(res) => res,
            Err(e) => {
                log::warn!("Error while updating status: {e:?}");
                Err(UpdateError::Other)
            }
        }
    }

    async fn assign(
        &mut self,
        actor: Actor,
        oid: OrderId,
        assignment: Assignment,
    ) -> Result<Order, UpdateError> {
        let db = self.db.clone();
        let res = spawn_blocking(move || {
            let mut db = match db.write() {
                Ok(db) => db,
                Err(e) => {
                    log::warn!("WLock: {e:?}");
                    return Err(UpdateError::Other);
                },
            };
            db.assign(actor, oid, assignment)
        }).await;

        match res {
            Ok(res) => res,
            Err(e) => {
                log::warn!("Error while assigning: {e:?}");
                Err(UpdateError::Other)
            }
        }
    }
}

#[derive(Debug, Default)]
struct InnerDb {
    max_id: OrderId,
    orders: BTreeMap<OrderId, Order>,
}

impl InnerDb {
    fn next_id(&mut self) -> OrderId {
        self.max_id.0 += 1;
        self.max_id
    }

    fn add_order(&mut self, order: &mut Order) -> OrderId {
        let new_id = self.next_id();
        order.id = Some(new_id);
        log::info!("Added order {order:?} new id = {new_id}");
        self.orders.insert(new_id, order.clone());
        new_id
    }

    fn orders_by_status(&self, status: Status) -> Vec<Order> {
        log::info!("Listing orders of status {status}");
        self.orders.values()
            .filter(|o| o.status == status)
            .cloned()
            .collect()
    }

    /// Updates the order, returns previous status and the updated order
    fn update_status(
        &mut self,
        actor: Actor,
        update: &StatusUpdate,
    ) -> Result<(Status, Order), UpdateError> {
        log::info!("db.update_status {actor:?} {update:?}");
        let order = self.orders.get_mut(&update.order_id)
            .ok_or(UpdateError::OrderNotFound(update.order_id))?;
        let prev_status = order.apply_update(actor, update)?;
        Ok((prev_status, order.clone()))
    }

    fn assign(
        &mut self,
        actor: Actor,
        oid: OrderId,
        assignment: Assignment,
    ) -> Result<Order, UpdateError> {
        log::info!("db.assign {actor:?} {oid} {assignment:?}");
        let order = self.orders.get_mut(&oid)
            .ok_or(UpdateError::OrderNotFound(oid))?;
        order.assign(actor, assignment)?;
        Ok(order.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{Role, UserId};

    const ADMIN: Actor = Actor::new(UserId(100), Role::Admin);
    const CUSTOMER: Actor = Actor::new(UserId(1), Role::Customer);
    const SUPPLIER: Actor = Actor::new(UserId(2), Role::Supplier);

    async fn db_with_order() -> (Db, OrderId) {
        let mut db = Db::new();
        let mut order = Order::new("ordername", CUSTOMER.id);
        let oid = db.add_order(&mut order).await.unwrap();
        assert_eq!(Some(oid), order.id);
        db.assign(ADMIN, oid, Assignment::Supplier(SUPPLIER.id)).await.unwrap();
        (db, oid)
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let mut db = Db::new();
        let a = db.add_order(&mut Order::new("a", CUSTOMER.id)).await.unwrap();
        let b = db.add_order(&mut Order::new("b", CUSTOMER.id)).await.unwrap();
        assert_eq!(OrderId(1), a);
        assert_eq!(OrderId(2), b);
        assert_eq!(2, db.list_orders().await.unwrap().len());
    }

    #[tokio::test]
    async fn test_update_is_persisted() {
        let (mut db, oid) = db_with_order().await;

        let (prev, order) = db.update_status(
            SUPPLIER, StatusUpdate::new(oid, Status::Processing)).await.unwrap();
        assert_eq!(Status::Pending, prev);
        assert_eq!(Status::Processing, order.status);

        let stored = db.get_order(oid).await.unwrap().unwrap();
        assert_eq!(Status::Processing, stored.status);
        assert_eq!(1, stored.history.len());

        assert!(db.orders_by_status(Status::Pending).await.unwrap().is_empty());
        assert_eq!(1, db.orders_by_status(Status::Processing).await.unwrap().len());
    }

    #[tokio::test]
    async fn test_rejected_update_changes_nothing() {
        let (mut db, oid) = db_with_order().await;

        let res = db.update_status(
            CUSTOMER, StatusUpdate::new(oid, Status::Processing)).await;
        assert_eq!(Err(UpdateError::NotPermitted {
                       role: Role::Customer,
                       from: Status::Pending,
                       to: Status::Processing,
                   }),
                   res.map(|(prev, _)| prev));

        let stored = db.get_order(oid).await.unwrap().unwrap();
        assert_eq!(Status::Pending, stored.status);
        assert!(stored.history.is_empty());
    }

    #[tokio::test]
    async fn test_missing_order() {
        let mut db = Db::new();
        assert!(db.get_order(OrderId(5)).await.unwrap().is_none());
        let res = db.update_status(
            ADMIN, StatusUpdate::new(OrderId(5), Status::Cancelled)).await;
        assert_eq!(Err(UpdateError::OrderNotFound(OrderId(5))),
                   res.map(|(prev, _)| prev));
        let res = db.assign(ADMIN, OrderId(5), Assignment::Supplier(SUPPLIER.id)).await;
        assert_eq!(Err(UpdateError::OrderNotFound(OrderId(5))),
                   res.map(|o| o.id));
    }
}
