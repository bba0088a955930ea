use serde::{Serialize, Deserialize};
use crate::order::{OrderId, Status};

/// Request to move a specific order to a new status
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub order_id: OrderId,
    pub status: Status,
    /// Free text kept in the order history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl StatusUpdate {
    pub fn new(order_id: OrderId, status: Status) -> StatusUpdate {
        StatusUpdate { order_id, status, note: None }
    }

    pub fn with_note<S: Into<String>>(mut self, note: S) -> StatusUpdate {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let update: StatusUpdate = serde_json::from_str(
            r#"{"order_id": 7, "status": "cancelled", "note": "changed my mind"}"#)
            .unwrap();
        assert_eq!(StatusUpdate::new(OrderId(7), Status::Cancelled)
                       .with_note("changed my mind"),
                   update);

        let update: StatusUpdate = serde_json::from_str(
            r#"{"order_id": 7, "status": "delivered"}"#).unwrap();
        assert_eq!(None, update.note);
        assert_eq!(r#"{"order_id":7,"status":"delivered"}"#,
                   serde_json::to_string(&update).unwrap());
    }
}
