//! JSON-lines protocol spoken by the admin dashboard.
//!
//! Every line is one `Request` tagged by `op`, every answer is one
//! `Response` tagged by `result`. The store is the source of truth,
//! the transitions it reports are the ones it would accept.

use serde::{Serialize, Deserialize};
use crate::db::Store;
use crate::error::Error;
use crate::order::{Actor, Assignment, Order, OrderId, Role, Status,
                   StatusUpdate, UpdateError, UserId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Customers create orders for themselves, admins for anybody
    CreateOrder {
        actor: Actor,
        name: String,
        #[serde(default)]
        customer: Option<UserId>,
    },
    GetOrder {
        actor: Actor,
        order_id: OrderId,
    },
    ListOrders {
        actor: Actor,
        #[serde(default)]
        status: Option<Status>,
        #[serde(default)]
        offset: Option<usize>,
        #[serde(default)]
        limit: Option<usize>,
    },
    AllowedTransitions {
        actor: Actor,
        order_id: OrderId,
    },
    UpdateStatus {
        actor: Actor,
        order_id: OrderId,
        status: Status,
        #[serde(default)]
        note: Option<String>,
    },
    Assign {
        actor: Actor,
        order_id: OrderId,
        assignment: Assignment,
    },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Response {
    Order { order: Order },
    /// One page of orders, `total` counts all of them
    Orders { orders: Vec<Order>, total: usize },
    Transitions { order_id: OrderId, current: Status, allowed: Vec<Status> },
    Updated { order_id: OrderId, previous: Status, current: Status },
    Error { message: String },
}

impl Response {
    pub fn error<E: std::fmt::Display>(e: E) -> Response {
        Response::Error { message: e.to_string() }
    }
}

impl From<UpdateError> for Response {
    fn from(e: UpdateError) -> Response {
        Response::error(e)
    }
}

pub fn parse_line(line: &str) -> Result<Request, serde_json::Error> {
    serde_json::from_str(line.trim())
}

/// Runs `req` against `db`, errors become `Response::Error`
pub async fn handle<S: Store>(db: &mut S, req: Request) -> Response {
    log::debug!("handle {req:?}");
    let res = match req {
        Request::CreateOrder { actor, name, customer } =>
            create_order(db, actor, name, customer).await,
        Request::GetOrder { actor, order_id } =>
            visible_order(db, actor, order_id).await
                .map(|res| res.map_or_else(Response::from,
                                           |order| Response::Order { order })),
        Request::ListOrders { actor, status, offset, limit } =>
            list_orders(db, actor, status, offset, limit).await,
        Request::AllowedTransitions { actor, order_id } =>
            visible_order(db, actor, order_id).await
                .map(|res| res.map_or_else(Response::from, |order| {
                    Response::Transitions {
                        order_id,
                        current: order.status,
                        allowed: order.allowed_transitions(actor),
                    }
                })),
        Request::UpdateStatus { actor, order_id, status, note } => {
            let update = StatusUpdate { order_id, status, note };
            Ok(match db.update_status(actor, update).await {
                Ok((previous, order)) => Response::Updated {
                    order_id,
                    previous,
                    current: order.status,
                },
                Err(e) => e.into(),
            })
        },
        Request::Assign { actor, order_id, assignment } =>
            Ok(match db.assign(actor, order_id, assignment).await {
                Ok(order) => Response::Order { order },
                Err(e) => e.into(),
            }),
    };

    match res {
        Ok(response) => response,
        Err(e) => {
            log::warn!("handle : {e:?}");
            UpdateError::Other.into()
        }
    }
}

async fn create_order<S: Store>(
    db: &mut S,
    actor: Actor,
    name: String,
    customer: Option<UserId>,
) -> Result<Response, Error> {
    let customer = match (actor.role, customer) {
        (Role::Admin, Some(customer)) => customer,
        (Role::Admin, None) =>
            return Ok(Response::error("Which customer is this order for?")),
        (Role::Customer, None) => actor.id,
        (Role::Customer, Some(customer)) if customer == actor.id => customer,
        (Role::Customer, Some(_)) =>
            return Ok(Response::error("Customers can only order for themselves")),
        (Role::Supplier, _) | (Role::DeliveryAssociate, _) =>
            return Ok(Response::error("Only customers and admins can create orders")),
    };
    if name.trim().is_empty() {
        return Ok(Response::error("The order needs a name"))
    }

    let mut order = Order::new(name.trim(), customer);
    db.add_order(&mut order).await?;
    Ok(Response::Order { order })
}

/// The order if `actor` may see it
///
/// Orders of others look the same as missing ones
async fn visible_order<S: Store>(
    db: &mut S,
    actor: Actor,
    oid: OrderId,
) -> Result<Result<Order, UpdateError>, Error> {
    let order = db.get_order(oid).await?
        .filter(|o| o.is_party(actor));
    Ok(order.ok_or(UpdateError::OrderNotFound(oid)))
}

async fn list_orders<S: Store>(
    db: &mut S,
    actor: Actor,
    status: Option<Status>,
    offset: Option<usize>,
    limit: Option<usize>,
) -> Result<Response, Error> {
    let orders = match status {
        Some(status) => db.orders_by_status(status).await?,
        None => db.list_orders().await?,
    };
    let orders: Vec<Order> = orders.into_iter()
        .filter(|o| o.is_party(actor))
        .collect();
    let total = orders.len();
    let orders = orders.into_iter()
        .skip(offset.unwrap_or(0))
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    Ok(Response::Orders { orders, total })
}
