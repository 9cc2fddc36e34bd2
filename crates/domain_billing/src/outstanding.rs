//! Outstanding balance of a billable

use serde::{Deserialize, Serialize};

use core_kernel::Money;

use crate::billable::Billable;

/// Remaining payable amount of a billable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outstanding {
    /// Original loan amount
    pub principal: Money,
    /// Total payable amount
    pub bill: Money,
    /// Accumulated payments so far
    pub paid: Money,
    /// `bill - paid`, negative when overpaid
    pub outstanding: Money,
}

impl Outstanding {
    /// Computes the outstanding balance given the accumulated paid amount
    pub fn compute(billable: &Billable, paid: Money) -> Self {
        Self {
            principal: billable.principal,
            bill: billable.amount,
            paid,
            outstanding: billable.amount.saturating_sub(paid),
        }
    }

    /// Returns true once the bill has been fully paid (or overpaid)
    pub fn is_settled(&self) -> bool {
        !self.outstanding.is_positive()
    }
}
