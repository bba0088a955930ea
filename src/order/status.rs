use std::fmt;
use serde::{Serialize, Deserialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
         Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Processing,
    OutForDelivery,
    Delivered,
    Cancelled,
    Returned,
    Damaged,
}

impl Status {
    pub const ALL: &'static [Status] =
        &[ Status::Pending,
           Status::Processing,
           Status::OutForDelivery,
           Status::Delivered,
           Status::Cancelled,
           Status::Returned,
           Status::Damaged ];

    pub const fn id(self) -> &'static str {
        match self {
            Status::Pending        => "pending",
            Status::Processing     => "processing",
            Status::OutForDelivery => "out_for_delivery",
            Status::Delivered      => "delivered",
            Status::Cancelled      => "cancelled",
            Status::Returned       => "returned",
            Status::Damaged        => "damaged",
        }
    }

    pub const fn human_name(self) -> &'static str {
        match self {
            Status::Pending        => "Pending",
            Status::Processing     => "Processing",
            Status::OutForDelivery => "Out for delivery",
            Status::Delivered      => "Delivered",
            Status::Cancelled      => "Cancelled",
            Status::Returned       => "Returned",
            Status::Damaged        => "Damaged",
        }
    }

    /// Converts str to Status, returns None if it doesn't
    /// match any of the status ids
    pub fn from_id(id: &str) -> Option<Status> {
        Status::ALL.iter().cloned().find(|s| s.id() == id)
    }

    /// Statuses directly reachable from this one, whoever asks
    pub const fn next(self) -> &'static [Status] {
        match self {
            Status::Pending =>
                &[Status::Processing, Status::Cancelled],
            Status::Processing =>
                &[Status::OutForDelivery, Status::Cancelled],
            Status::OutForDelivery =>
                &[Status::Delivered, Status::Damaged],
            Status::Delivered =>
                &[Status::Returned],
            Status::Cancelled => &[],
            Status::Returned  => &[],
            Status::Damaged   => &[],
        }
    }

    pub const fn is_terminal(self) -> bool {
        self.next().is_empty()
    }

    /// Every order starts here
    pub const fn is_initial(self) -> bool {
        matches!(self, Status::Pending)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.human_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrips() {
        for s in Status::ALL.iter().cloned() {
            assert_eq!(s, Status::from_id(s.id()).unwrap());
        }
    }

    #[test]
    fn test_some_cases() {
        assert_eq!(Some(Status::OutForDelivery), Status::from_id("out_for_delivery"));
        assert_eq!(None,                         Status::from_id("picked_up"));
        assert_eq!(None,                         Status::from_id("on_the_way"));
        assert_eq!(None,                         Status::from_id("Pending"));
        assert_eq!(None,                         Status::from_id(" pending"));
    }

    #[test]
    fn test_terminal_statuses() {
        let terminal: Vec<Status> = Status::ALL.iter().cloned()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(vec![Status::Cancelled, Status::Returned, Status::Damaged],
                   terminal);
    }

    #[test]
    fn test_pending_is_sole_initial_state() {
        for s in Status::ALL.iter().cloned() {
            let reachable = Status::ALL.iter().any(|from| from.next().contains(&s));
            assert_eq!(s.is_initial(), !reachable, "{s:?}");
        }
    }

    #[test]
    fn test_graph_has_no_cycles() {
        // Every walk ends in a terminal status within |ALL| steps
        fn depth(s: Status, steps: usize) -> usize {
            assert!(steps <= Status::ALL.len(), "cycle through {s:?}");
            s.next().iter()
                .map(|n| depth(*n, steps + 1))
                .max()
                .unwrap_or(steps)
        }
        assert_eq!(4, depth(Status::Pending, 0));
    }

    #[test]
    fn test_serde_uses_ids() {
        for s in Status::ALL.iter().cloned() {
            let json = serde_json::to_string(&s).unwrap();
            assert_eq!(format!("\"{}\"", s.id()), json);
        }
    }
}
