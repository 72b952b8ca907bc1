//! Mode ordering for fiber tensors
//!
//! Each mode `m` of a fiber tensor is built under its own permutation of the
//! tensor's modes:
//!
//! - slot 0 is `m` itself (the slice axis),
//! - the last slot is the largest remaining mode (the innermost fiber axis),
//! - the slots in between hold the other modes in cyclic order from `m + 1`.
//!
//! Putting the longest mode innermost makes fibers as long as possible for a
//! fixed nonzero count, which keeps `fptr`/`fids` small relative to `inds`/`vals`.
//!
//! # Examples
//!
//! ```
//! use tenrso_fiber::order::{mode_order_for, plan_mode_orders};
//!
//! let dims = [3, 100, 5];
//! assert_eq!(mode_order_for(&dims, 0).as_slice(), &[0, 2, 1]);
//!
//! let orders = plan_mode_orders(&dims);
//! assert_eq!(orders.len(), 3);
//! assert_eq!(orders[2].as_slice(), &[2, 0, 1]);
//! ```

use smallvec::SmallVec;

use crate::coord::MAX_NMODES;
use crate::error::ValidationError;

/// Permutation of mode indices with inline capacity for [`MAX_NMODES`] modes
pub type ModeOrder = SmallVec<[usize; MAX_NMODES]>;

/// Computes the mode permutation used to build mode `mode`.
///
/// Ties for the largest remaining mode go to the first one met when scanning
/// cyclically from `mode + 1`.
///
/// # Panics
///
/// Panics if `mode >= dims.len()`.
pub fn mode_order_for(dims: &[usize], mode: usize) -> ModeOrder {
    let nmodes = dims.len();
    assert!(mode < nmodes, "mode {} out of range for {} modes", mode, nmodes);

    let mut order = ModeOrder::new();
    order.push(mode);
    if nmodes == 1 {
        return order;
    }

    let cyclic = (1..nmodes).map(|offset| (mode + offset) % nmodes);

    let mut longest = (mode + 1) % nmodes;
    for m in cyclic.clone() {
        if dims[m] > dims[longest] {
            longest = m;
        }
    }

    order.extend(cyclic.filter(|&m| m != longest));
    order.push(longest);
    order
}

/// Computes one mode permutation per mode.
///
/// # Complexity
///
/// O(nmodes²)
pub fn plan_mode_orders(dims: &[usize]) -> Vec<ModeOrder> {
    let orders: Vec<ModeOrder> = (0..dims.len()).map(|m| mode_order_for(dims, m)).collect();
    crate::tracing_support::record_plan(dims, &orders);
    orders
}

/// Checks that `order` is a permutation of `0..nmodes`.
pub fn validate_mode_order(order: &[usize], nmodes: usize) -> Result<(), ValidationError> {
    if order.len() != nmodes {
        return Err(ValidationError::InvalidModeOrder {
            reason: format!("mode order length {} != nmodes {}", order.len(), nmodes),
        });
    }

    let mut seen = [false; MAX_NMODES];
    for &m in order {
        if m >= nmodes || m >= MAX_NMODES {
            return Err(ValidationError::InvalidModeOrder {
                reason: format!("mode {} out of range in {:?}", m, order),
            });
        }
        if seen[m] {
            return Err(ValidationError::InvalidModeOrder {
                reason: format!("mode {} repeated in {:?}", m, order),
            });
        }
        seen[m] = true;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_largest_mode_goes_last() {
        let dims = [3, 100, 5];
        assert_eq!(mode_order_for(&dims, 0).as_slice(), &[0, 2, 1]);
        assert_eq!(mode_order_for(&dims, 1).as_slice(), &[1, 0, 2]);
        assert_eq!(mode_order_for(&dims, 2).as_slice(), &[2, 0, 1]);
    }

    #[test]
    fn test_ties_keep_first_cyclic_mode() {
        let dims = [2, 2, 2];
        assert_eq!(mode_order_for(&dims, 0).as_slice(), &[0, 2, 1]);
        assert_eq!(mode_order_for(&dims, 1).as_slice(), &[1, 0, 2]);
        assert_eq!(mode_order_for(&dims, 2).as_slice(), &[2, 1, 0]);

        // 7 and 7 tie for mode 1; scanning starts at mode 2
        let dims = [7, 3, 7];
        assert_eq!(mode_order_for(&dims, 1).as_slice(), &[1, 0, 2]);
    }

    #[test]
    fn test_already_natural_order() {
        let dims = [4, 5, 6];
        assert_eq!(mode_order_for(&dims, 0).as_slice(), &[0, 1, 2]);
        assert_eq!(mode_order_for(&dims, 1).as_slice(), &[1, 0, 2]);
        assert_eq!(mode_order_for(&dims, 2).as_slice(), &[2, 0, 1]);
    }

    #[test]
    fn test_four_modes() {
        let dims = [10, 2, 30, 4];
        assert_eq!(mode_order_for(&dims, 0).as_slice(), &[0, 1, 3, 2]);
        assert_eq!(mode_order_for(&dims, 2).as_slice(), &[2, 3, 1, 0]);
    }

    #[test]
    fn test_degenerate_orders() {
        assert_eq!(mode_order_for(&[9], 0).as_slice(), &[0]);
        assert_eq!(mode_order_for(&[9, 4], 0).as_slice(), &[0, 1]);
        assert_eq!(mode_order_for(&[9, 4], 1).as_slice(), &[1, 0]);
        assert!(plan_mode_orders(&[]).is_empty());
    }

    #[test]
    fn test_plans_are_permutations() {
        let dims = [5, 1, 8, 8, 2];
        for (m, order) in plan_mode_orders(&dims).iter().enumerate() {
            assert_eq!(order[0], m);
            validate_mode_order(order, dims.len()).unwrap();
        }
    }

    #[test]
    fn test_validate_mode_order() {
        assert!(validate_mode_order(&[0, 1, 2], 3).is_ok());
        assert!(validate_mode_order(&[0, 1], 3).is_err());
        assert!(validate_mode_order(&[0, 0, 1], 3).is_err());
        assert!(validate_mode_order(&[0, 1, 3], 3).is_err());
    }
}
