use std::fmt;
use serde::{Serialize, Deserialize};
use crate::order::Status;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Admin,
    Supplier,
    DeliveryAssociate,
    Customer,
}

impl Role {
    pub const ALL: &'static [Role] =
        &[ Role::Admin,
           Role::Supplier,
           Role::DeliveryAssociate,
           Role::Customer ];

    pub const fn id(self) -> &'static str {
        match self {
            Role::Admin             => "admin",
            Role::Supplier          => "supplier",
            Role::DeliveryAssociate => "deliveryAssociate",
            Role::Customer          => "customer",
        }
    }

    pub fn from_id(id: &str) -> Option<Role> {
        Role::ALL.iter().cloned().find(|r| r.id() == id)
    }

    /// Ids of the statuses this role may ever set, regardless of
    /// where the order currently is
    ///
    /// Delivery associates track their own sub-statuses, only
    /// `delivered` of them exists in `Status`
    pub const fn permitted_ids(self) -> &'static [&'static str] {
        match self {
            Role::Admin =>
                &["pending",
                  "processing",
                  "out_for_delivery",
                  "delivered",
                  "cancelled",
                  "returned",
                  "damaged"],
            Role::Supplier =>
                &["processing",
                  "out_for_delivery",
                  "cancelled",
                  "damaged"],
            Role::DeliveryAssociate =>
                &["picked_up",
                  "on_the_way",
                  "delivered"],
            Role::Customer =>
                &["cancelled",
                  "returned"],
        }
    }

    /// Statuses an order has to be in for this role to act on it at all
    pub const fn acts_from(self) -> &'static [Status] {
        match self {
            Role::Admin => Status::ALL,
            Role::Supplier =>
                &[Status::Pending, Status::Processing],
            Role::DeliveryAssociate =>
                &[Status::OutForDelivery],
            Role::Customer =>
                &[Status::Pending, Status::Processing, Status::Delivered],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
