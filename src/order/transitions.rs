//! Which statuses an actor of a given role may move an order to.
//!
//! Pure lookups over `Status::next` and `Role::permitted_ids`, with the
//! per-role `Role::acts_from` guard in front. The store re-checks the
//! same rule before it writes anything.

use crate::order::{Role, Status};
use crate::utils::dumb_intersection_by;

/// Statuses `role` may move an order in `current` status to,
/// in transition table order
pub fn allowed_transitions(current: Status, role: Role) -> Vec<Status> {
    if ! role.acts_from().contains(&current) {
        return Vec::new()
    }

    dumb_intersection_by(current.next(), role.permitted_ids(),
                         |status, id| status.id() == *id)
}

/// Same as `allowed_transitions` for untyped callers
///
/// Unknown status or role ids mean there is nothing to do, not an error
pub fn allowed_transitions_by_id(current: &str, role: &str) -> Vec<Status> {
    match (Status::from_id(current), Role::from_id(role)) {
        (Some(current), Some(role)) => allowed_transitions(current, role),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Status::*;

    fn check(role: Role, expected: &[(Status, &[Status])]) {
        for status in Status::ALL.iter().cloned() {
            let want: &[Status] = expected.iter()
                .find(|(s, _)| *s == status)
                .map(|(_, allowed)| *allowed)
                .unwrap_or(&[]);
            assert_eq!(want, allowed_transitions(status, role).as_slice(),
                       "{role:?} from {status:?}");
        }
    }

    #[test]
    fn test_admin_follows_the_graph() {
        for status in Status::ALL.iter().cloned() {
            assert_eq!(status.next(),
                       allowed_transitions(status, Role::Admin).as_slice());
        }
    }

    #[test]
    fn test_supplier() {
        check(Role::Supplier, &[
            (Pending,    &[Processing, Cancelled]),
            (Processing, &[OutForDelivery, Cancelled]),
        ]);
    }

    #[test]
    fn test_delivery_associate() {
        check(Role::DeliveryAssociate, &[
            (OutForDelivery, &[Delivered]),
        ]);
    }

    #[test]
    fn test_customer() {
        check(Role::Customer, &[
            (Pending,    &[Cancelled]),
            (Processing, &[Cancelled]),
            (Delivered,  &[Returned]),
        ]);
    }

    #[test]
    fn test_terminal_statuses_are_dead_ends() {
        for role in Role::ALL.iter().cloned() {
            for status in [Cancelled, Returned, Damaged] {
                assert!(allowed_transitions(status, role).is_empty(),
                        "{role:?} from {status:?}");
            }
        }
    }

    #[test]
    fn test_result_is_a_subset_of_the_graph_and_permissions() {
        for role in Role::ALL.iter().cloned() {
            for status in Status::ALL.iter().cloned() {
                for next in allowed_transitions(status, role) {
                    assert!(status.next().contains(&next));
                    assert!(role.permitted_ids().contains(&next.id()));
                }
            }
        }
    }

    #[test]
    fn test_repeated_calls_agree() {
        for role in Role::ALL.iter().cloned() {
            for status in Status::ALL.iter().cloned() {
                assert_eq!(allowed_transitions(status, role),
                           allowed_transitions(status, role));
            }
        }
        // tables are untouched
        assert_eq!(&[Processing, Cancelled], Pending.next());
        assert_eq!(&["cancelled", "returned"], Role::Customer.permitted_ids());
    }

    #[test]
    fn test_by_id() {
        assert_eq!(vec![Processing, Cancelled],
                   allowed_transitions_by_id("pending", "admin"));
        assert_eq!(vec![Delivered],
                   allowed_transitions_by_id("out_for_delivery", "deliveryAssociate"));
        for status in Status::ALL.iter() {
            assert!(allowed_transitions_by_id(status.id(), "guest").is_empty());
        }
        assert!(allowed_transitions_by_id("picked_up", "admin").is_empty());
        assert!(allowed_transitions_by_id("", "").is_empty());
    }

    #[test]
    fn test_scenarios() {
        assert_eq!(vec![Processing, Cancelled],
                   allowed_transitions(Pending, Role::Admin));
        assert!(allowed_transitions(OutForDelivery, Role::Supplier).is_empty());
        assert_eq!(vec![Returned],
                   allowed_transitions(Delivered, Role::Customer));
        assert!(allowed_transitions(Damaged, Role::Admin).is_empty());
    }
}
