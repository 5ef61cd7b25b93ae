//! Fractional sort keys for drag-and-drop repositioning.
//!
//! New keys are midpoints between neighbors, so a reposition writes exactly one
//! task. Repeated bisection eventually exhausts the gap between two keys; when
//! neighbors get too close the whole column is renormalized back to evenly
//! spaced keys before the insertion key is computed.

/// Spacing between keys after renormalization, and the step above the current
/// maximum for newly created tasks.
pub const ORDER_STEP: f64 = 1000.0;

/// Offset applied when inserting before the first or after the last sibling.
pub const ORDER_GAP: f64 = 100.0;

/// Neighbors closer than this can no longer be bisected meaningfully; the
/// column is renormalized instead.
pub const COLLISION_THRESHOLD: f64 = 10.0;

/// Result of planning an insertion: the key for the moving task, plus fresh
/// keys for every existing sibling when a renormalization was required.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertionPlan {
    pub key: f64,
    pub renormalized: Option<Vec<f64>>,
}

/// Computes the sort key that places a task at `target_index` among
/// `sibling_orders` (ascending, excluding the moving task). Pure; the caller
/// applies the plan to state and issues the writes.
pub fn compute_insertion_order(sibling_orders: &[f64], target_index: usize) -> InsertionPlan {
    let index = target_index.min(sibling_orders.len());
    if needs_renormalization(sibling_orders, index) {
        let fresh = renormalized_keys(sibling_orders.len());
        let key = insertion_key(&fresh, index);
        return InsertionPlan {
            key,
            renormalized: Some(fresh),
        };
    }
    InsertionPlan {
        key: insertion_key(sibling_orders, index),
        renormalized: None,
    }
}

/// Evenly spaced keys for `count` siblings: 1000, 2000, ...
pub fn renormalized_keys(count: usize) -> Vec<f64> {
    (1..=count).map(|i| i as f64 * ORDER_STEP).collect()
}

fn needs_renormalization(orders: &[f64], index: usize) -> bool {
    if index == 0 || index >= orders.len() {
        // Edge insertions extend past the extremes and never collide.
        return false;
    }
    orders[index] - orders[index - 1] < COLLISION_THRESHOLD
}

fn insertion_key(orders: &[f64], index: usize) -> f64 {
    match (index.checked_sub(1).and_then(|i| orders.get(i)), orders.get(index)) {
        (None, None) => ORDER_STEP,
        (None, Some(first)) => first - ORDER_GAP,
        (Some(last), None) => last + ORDER_GAP,
        (Some(prev), Some(next)) => (prev + next) / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_lands_at(orders: &[f64], index: usize, key: f64) {
        let mut resorted: Vec<f64> = orders.to_vec();
        resorted.push(key);
        resorted.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(resorted.iter().position(|&o| o == key), Some(index));
    }

    #[test]
    fn empty_column_gets_the_base_step() {
        let plan = compute_insertion_order(&[], 0);
        assert_eq!(plan.key, ORDER_STEP);
        assert!(plan.renormalized.is_none());
    }

    #[test]
    fn inserting_before_all_goes_below_the_first_key() {
        let plan = compute_insertion_order(&[1000.0], 0);
        assert_eq!(plan.key, 900.0);
        assert!(plan.renormalized.is_none());
    }

    #[test]
    fn inserting_after_all_goes_above_the_last_key() {
        let plan = compute_insertion_order(&[1000.0, 2000.0], 2);
        assert_eq!(plan.key, 2100.0);
    }

    #[test]
    fn inserting_between_takes_the_midpoint() {
        let plan = compute_insertion_order(&[1000.0, 2000.0], 1);
        assert_eq!(plan.key, 1500.0);
        assert!(plan.renormalized.is_none());
    }

    #[test]
    fn target_index_past_the_end_is_clamped() {
        let plan = compute_insertion_order(&[1000.0], 99);
        assert_eq!(plan.key, 1100.0);
    }

    #[test]
    fn new_key_sorts_to_the_requested_index() {
        let orders = [250.0, 1000.0, 1500.0, 4000.0];
        for index in 0..=orders.len() {
            let plan = compute_insertion_order(&orders, index);
            assert!(plan.renormalized.is_none());
            assert_lands_at(&orders, index, plan.key);
        }
    }

    #[test]
    fn close_neighbors_trigger_renormalization() {
        // Orders 1000 and 1004 differ by 4, under the collision threshold.
        let plan = compute_insertion_order(&[1000.0, 1004.0], 1);
        assert_eq!(plan.renormalized, Some(vec![1000.0, 2000.0]));
        assert_eq!(plan.key, 1500.0);
    }

    #[test]
    fn renormalized_keys_are_evenly_spaced() {
        assert_eq!(renormalized_keys(3), vec![1000.0, 2000.0, 3000.0]);
        assert!(renormalized_keys(0).is_empty());
    }

    #[test]
    fn renormalized_insertion_is_distinguishable_from_neighbors() {
        let orders = [1000.0, 1000.5, 1001.0];
        let plan = compute_insertion_order(&orders, 2);
        let fresh = plan.renormalized.expect("collision must renormalize");
        assert_eq!(fresh, vec![1000.0, 2000.0, 3000.0]);
        assert!((plan.key - fresh[1]).abs() >= COLLISION_THRESHOLD);
        assert!((fresh[2] - plan.key).abs() >= COLLISION_THRESHOLD);
        assert_lands_at(&fresh, 2, plan.key);
    }

    #[test]
    fn edge_insertions_never_renormalize() {
        let plan = compute_insertion_order(&[1000.0, 1001.0], 0);
        assert!(plan.renormalized.is_none());
        assert_eq!(plan.key, 900.0);
    }
}
