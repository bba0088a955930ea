#![cfg(feature = "redis_db")]

use crate::config::Config;
use crate::db::Store;
use crate::error::Error;
use crate::order::{Actor, Assignment, Order, OrderId, Status,
                   StatusUpdate, UpdateError};

fn to_err(e: redis::RedisError) -> Error {
    format!("Redis error: {e:?}").into()
}

/// How many times a change is re-validated when somebody else
/// keeps changing the same order
const MAX_UPDATE_ATTEMPTS: usize = 5;

/// KEYS: order, its new status set, then every status set
/// ARGV: blob the change was validated against, new blob, order id
///
/// Writes nothing and returns 0 if the order changed since it was read
const SAVE_ORDER_SCRIPT: &str = r"
local current = redis.call('GET', KEYS[1])
if current ~= ARGV[1] then
    return 0
end
redis.call('SET', KEYS[1], ARGV[2])
for i = 3, #KEYS do
    if KEYS[i] ~= KEYS[2] then
        redis.call('SREM', KEYS[i], ARGV[3])
    end
end
redis.call('SADD', KEYS[2], ARGV[3])
return 1
";

/// Structure:
///   {prefix}_num_orders               u64
///   {prefix}_orders                   Set<OrderId>
///   {prefix}_order:id                 SerializedData
///   {prefix}_status:status:orders     Set<OrderId>
#[derive(Clone, Debug)]
struct Keys {
    prefix: String,
}

impl Keys {
    fn key(&self, k: &str) -> String {
        let p = &self.prefix;
        format!("{p}_{k}")
    }

    fn num_orders(&self) -> String {
        self.key("num_orders")
    }

    fn orders(&self) -> String {
        self.key("orders")
    }

    fn order(&self, oid: OrderId) -> String {
        self.key(&format!("order:{oid}"))
    }

    fn status_orders(&self, status: Status) -> String {
        self.key(&format!("status:{}:orders", status.id()))
    }

    /// KEYS of `SAVE_ORDER_SCRIPT`
    fn save_order(&self, oid: OrderId, status: Status) -> Vec<String> {
        let mut keys = Vec::with_capacity(2 + Status::ALL.len());
        keys.push(self.order(oid));
        keys.push(self.status_orders(status));
        keys.extend(Status::ALL.iter().map(|s| self.status_orders(*s)));
        keys
    }
}

#[derive(Clone)]
pub struct Db {
    c: redis::aio::ConnectionManager,
    keys: Keys,
}

impl Db {
    pub async fn new(config: &Config) -> Result<Self, Error> {
        let client = redis::Client::open(config.redis_url.as_str())
            .map_err(to_err)?;
        let connection = client.get_tokio_connection_manager()
            .await.map_err(to_err)?;

        let db = Db {
            c: connection,
            keys: Keys { prefix: config.key_prefix.clone() },
        };

        Ok(db)
    }

    /// Fetches and deserializes orders stored under `oids`
    async fn orders_by_ids(&mut self, oids: Vec<u64>) -> Result<Vec<Order>, Error> {
        let keys: Vec<String> = oids.into_iter()
            .map(|oid| self.keys.order(OrderId(oid)))
            .collect();
        // Redis doesn't allow to query for no keys,
        // so it's not just an optimization
        if keys.is_empty() {
            return Ok(Vec::new())
        }

        let num_keys = keys.len();
        let mut pipe = redis::pipe();
        for key in keys.into_iter() {
            pipe.get(key);
        }
        let bin_orders: Vec<Vec<u8>> =
            pipe.query_async(&mut self.c).await.map_err(to_err)?;
        let mut orders: Vec<Order> = Vec::with_capacity(num_keys);
        for b in bin_orders.into_iter() {
            orders.push(serde_json::from_slice(&b)?);
        }
        orders.sort_by_key(|o| o.id);
        Ok(orders)
    }

    /// Raw serialized order, exactly as stored
    async fn order_data(&mut self, oid: OrderId) -> Result<Option<Vec<u8>>, Error> {
        redis::Cmd::get(self.keys.order(oid))
            .query_async(&mut self.c).await.map_err(to_err)
    }

    /// Writes `order` and moves it into its status set, but only if
    /// the stored order is still `expected`
    ///
    /// Returns false if somebody else changed it first
    async fn save_order_if_unchanged(
        &mut self,
        expected: &[u8],
        order: &Order,
    ) -> Result<bool, Error> {
        let oid = order.id.ok_or("order has no id")?;
        let data: Vec<u8> = serde_json::to_vec(order)?;

        let script = redis::Script::new(SAVE_ORDER_SCRIPT);
        let mut invocation = script.prepare_invoke();
        for key in self.keys.save_order(oid, order.status) {
            invocation.key(key);
        }
        invocation.arg(expected).arg(data).arg(oid.0);
        let saved: i64 = invocation.invoke_async(&mut self.c)
            .await.map_err(to_err)?;
        Ok(saved == 1)
    }

    /// Loads the order, applies `change`, and saves the result
    ///
    /// If the order changed in between, `change` is validated again
    /// against the fresh order
    async fn modify_order<F>(
        &mut self,
        oid: OrderId,
        change: F,
    ) -> Result<(Status, Order), UpdateError>
    where
        F: Fn(&mut Order) -> Result<Status, UpdateError>,
    {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let data = self.order_data(oid).await
                .map_err(|e| {
                    log::warn!("order_data {oid} : {e:?}");
                    UpdateError::Other
                })?
                .ok_or(UpdateError::OrderNotFound(oid))?;
            let mut order: Order = serde_json::from_slice(&data)
                .map_err(|e| {
                    log::warn!("order {oid} is unreadable : {e:?}");
                    UpdateError::Other
                })?;

            let prev_status = change(&mut order)?;

            let saved = self.save_order_if_unchanged(&data, &order).await
                .map_err(|e| {
                    log::warn!("save_order {oid} : {e:?}");
                    UpdateError::Other
                })?;
            if saved {
                return Ok((prev_status, order))
            }
            log::info!("order {oid} changed concurrently, attempt {attempt}");
        }

        log::warn!("gave up changing order {oid} after {MAX_UPDATE_ATTEMPTS} attempts");
        Err(UpdateError::Other)
    }
}

impl Store for Db {
    async fn add_order(&mut self, order: &mut Order) -> Result<OrderId, Error> {
        log::debug!("add_order {:?}", order.id);

        let oid: u64 = redis::Cmd::incr(self.keys.num_orders(), 1)
            .query_async(&mut self.c).await.map_err(to_err)?;
        let oid = OrderId(oid);
        order.id = Some(oid);

        redis::pipe()
            .atomic()
            .set(self.keys.order(oid), serde_json::to_vec(order)?)
            .sadd(self.keys.orders(), oid.0)
            .sadd(self.keys.status_orders(order.status), oid.0)
            .query_async::<_, ()>(&mut self.c).await.map_err(to_err)?;
        log::info!("Added order {oid}");
        Ok(oid)
    }

    async fn get_order(&mut self, oid: OrderId) -> Result<Option<Order>, Error> {
        log::debug!("get_order {oid}");

        match self.order_data(oid).await? {
            None => Ok(None),
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
        }
    }

    async fn list_orders(&mut self) -> Result<Vec<Order>, Error> {
        log::debug!("list_orders");

        let oids: Vec<u64> = redis::Cmd::smembers(self.keys.orders())
            .query_async(&mut self.c).await.map_err(to_err)?;
        self.orders_by_ids(oids).await
    }

    async fn orders_by_status(
        &mut self,
        status: Status,
    ) -> Result<Vec<Order>, Error> {
        log::debug!("orders_by_status {status:?}");

        let oids: Vec<u64> =
            redis::Cmd::smembers(self.keys.status_orders(status))
            .query_async(&mut self.c).await.map_err(to_err)?;
        let orders = self.orders_by_ids(oids).await?;
        Ok(orders.into_iter().filter(|o| o.status == status).collect())
    }

    async fn update_status(
        &mut self,
        actor: Actor,
        update: StatusUpdate,
    ) -> Result<(Status, Order), UpdateError> {
        log::debug!("update_status {actor:?} {update:?}");

        let (prev_status, order) = self.modify_order(
            update.order_id,
            |order| order.apply_update(actor, &update),
        ).await?;
        log::info!("update_status {} : {prev_status} => {}",
                   update.order_id, order.status);
        Ok((prev_status, order))
    }

    async fn assign(
        &mut self,
        actor: Actor,
        oid: OrderId,
        assignment: Assignment,
    ) -> Result<Order, UpdateError> {
        log::debug!("assign {actor:?} {oid} {assignment:?}");

        let (_status, order) = self.modify_order(oid, |order| {
            order.assign(actor, assignment)?;
            Ok(order.status)
        }).await?;
        Ok(order)
    }
}
