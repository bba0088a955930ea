pub mod config;
pub mod db;
pub mod error;
pub mod order;
pub mod request;
mod utils;

pub use order::Order;
pub use db::{Db, Store};

pub type Offset = chrono::offset::Utc;
pub type DateTime = chrono::DateTime<Offset>;
