//! Pure operations on a working list of orders.

use std::collections::HashSet;

use uuid::Uuid;

use geoplan_db::models::{Order, Point};

use super::command::DropLocation;
use crate::error::PlanningError;

/// Candidates whose id is not already in `existing`, stamped with `plan_id`.
///
/// The comparison is by id only. A candidate repeated within the batch is
/// kept once, at its first position.
pub fn new_orders(existing: &[Order], candidates: Vec<Order>, plan_id: Uuid) -> Vec<Order> {
    let mut seen: HashSet<Uuid> = existing.iter().map(|o| o.id).collect();
    candidates
        .into_iter()
        .filter(|o| seen.insert(o.id))
        .map(|o| Order { plan_id, ..o })
        .collect()
}

/// Move `dragged` next to `target`, above or below it.
///
/// Returns `Ok(false)` without touching the list when both ids are the same.
/// Every other order keeps its relative position.
pub fn move_order(
    orders: &mut Vec<Order>,
    dragged: Uuid,
    target: Uuid,
    location: DropLocation,
) -> Result<bool, PlanningError> {
    if dragged == target {
        return Ok(false);
    }
    if !orders.iter().any(|o| o.id == target) {
        return Err(PlanningError::OrderNotOnBoard(target));
    }
    let from = position(orders, dragged)?;
    let order = orders.remove(from);

    let target_at = position(orders, target)?;
    let insert_at = match location {
        DropLocation::Above => target_at,
        DropLocation::Below => target_at + 1,
    };
    orders.insert(insert_at, order);
    Ok(true)
}

/// Overwrite the point of `order_id`. Returns whether the point changed.
pub fn set_point(orders: &mut [Order], order_id: Uuid, point: Point) -> bool {
    match orders.iter_mut().find(|o| o.id == order_id) {
        Some(order) if order.point != Some(point) => {
            order.point = Some(point);
            true
        }
        _ => false,
    }
}

fn position(orders: &[Order], id: Uuid) -> Result<usize, PlanningError> {
    orders
        .iter()
        .position(|o| o.id == id)
        .ok_or(PlanningError::OrderNotOnBoard(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders(names: &[&str]) -> Vec<Order> {
        let plan_id = Uuid::new_v4();
        names.iter().map(|n| Order::new(*n, None, plan_id)).collect()
    }

    fn names(orders: &[Order]) -> Vec<&str> {
        orders.iter().map(|o| o.name.as_str()).collect()
    }

    #[test]
    fn new_orders_skips_known_ids_and_stamps_plan() {
        let plan_id = Uuid::new_v4();
        let existing = orders(&["A1"]);
        let other_plan = Uuid::new_v4();
        let b2 = Order::new("B2", None, other_plan);
        let candidates = vec![existing[0].clone(), b2.clone()];

        let added = new_orders(&existing, candidates, plan_id);
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].id, b2.id);
        assert_eq!(added[0].plan_id, plan_id);
    }

    #[test]
    fn new_orders_is_idempotent() {
        let plan_id = Uuid::new_v4();
        let fetched = orders(&["x", "y", "z"]);

        let mut list = Vec::new();
        list.extend(new_orders(&list, fetched.clone(), plan_id));
        assert_eq!(list.len(), 3);

        let again = new_orders(&list, fetched, plan_id);
        assert!(again.is_empty());
    }

    #[test]
    fn new_orders_drops_repeats_within_batch() {
        let plan_id = Uuid::new_v4();
        let batch = orders(&["x"]);
        let doubled = vec![batch[0].clone(), batch[0].clone()];
        assert_eq!(new_orders(&[], doubled, plan_id).len(), 1);
    }

    #[test]
    fn move_up_above_first() {
        let mut list = orders(&["a", "b", "c", "d"]);
        let (c, a) = (list[2].id, list[0].id);
        assert!(move_order(&mut list, c, a, DropLocation::Above).unwrap());
        assert_eq!(names(&list), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn move_down_below_target() {
        let mut list = orders(&["a", "b", "c", "d"]);
        let (a, c) = (list[0].id, list[2].id);
        move_order(&mut list, a, c, DropLocation::Below).unwrap();
        assert_eq!(names(&list), vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn move_down_above_target() {
        let mut list = orders(&["a", "b", "c", "d"]);
        let (a, d) = (list[0].id, list[3].id);
        move_order(&mut list, a, d, DropLocation::Above).unwrap();
        assert_eq!(names(&list), vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn move_below_last() {
        let mut list = orders(&["a", "b", "c"]);
        let (a, c) = (list[0].id, list[2].id);
        move_order(&mut list, a, c, DropLocation::Below).unwrap();
        assert_eq!(names(&list), vec!["b", "c", "a"]);
    }

    #[test]
    fn move_onto_itself_is_noop() {
        let mut list = orders(&["a", "b"]);
        let a = list[0].id;
        assert!(!move_order(&mut list, a, a, DropLocation::Below).unwrap());
        assert_eq!(names(&list), vec!["a", "b"]);
    }

    #[test]
    fn move_preserves_every_other_relative_order() {
        let all = ["a", "b", "c", "d", "e", "f"];
        for from in 0..all.len() {
            for to in 0..all.len() {
                for location in [DropLocation::Above, DropLocation::Below] {
                    if from == to {
                        continue;
                    }
                    let mut list = orders(&all);
                    let (dragged, target) = (list[from].id, list[to].id);
                    let others: Vec<Uuid> = list
                        .iter()
                        .map(|o| o.id)
                        .filter(|id| *id != dragged)
                        .collect();

                    move_order(&mut list, dragged, target, location).unwrap();

                    assert_eq!(list.len(), all.len());
                    let d = list.iter().position(|o| o.id == dragged).unwrap();
                    let t = list.iter().position(|o| o.id == target).unwrap();
                    match location {
                        DropLocation::Above => assert_eq!(d + 1, t),
                        DropLocation::Below => assert_eq!(t + 1, d),
                    }
                    let rest: Vec<Uuid> = list
                        .iter()
                        .map(|o| o.id)
                        .filter(|id| *id != dragged)
                        .collect();
                    assert_eq!(rest, others);
                }
            }
        }
    }

    #[test]
    fn move_unknown_order_fails_without_change() {
        let mut list = orders(&["a", "b"]);
        let a = list[0].id;
        let stranger = Uuid::new_v4();

        let err = move_order(&mut list, stranger, a, DropLocation::Above).unwrap_err();
        assert!(matches!(err, PlanningError::OrderNotOnBoard(id) if id == stranger));
        let err = move_order(&mut list, a, stranger, DropLocation::Above).unwrap_err();
        assert!(matches!(err, PlanningError::OrderNotOnBoard(id) if id == stranger));
        assert_eq!(names(&list), vec!["a", "b"]);
    }

    #[test]
    fn set_point_reports_change() {
        let mut list = orders(&["a"]);
        let a = list[0].id;
        assert!(set_point(&mut list, a, Point::new(1.0, 2.0)));
        assert!(!set_point(&mut list, a, Point::new(1.0, 2.0)));
        assert!(!set_point(&mut list, Uuid::new_v4(), Point::new(1.0, 2.0)));
    }
}
