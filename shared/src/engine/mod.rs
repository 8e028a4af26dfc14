//! Profit/loss calculation engine
//!
//! Every calculator surface goes through these functions. They are total:
//! malformed numbers were already coerced to zero at the boundary, and every
//! ratio short-circuits to zero instead of dividing by zero.

pub mod advisor;
pub mod aggregator;
pub mod cost;
pub mod profit;

pub use advisor::{
    compute_safe_buy, compute_safe_buy_with_factor, default_safe_buy_factor,
    SAFE_BUY_BUFFER_PERCENT,
};
pub use aggregator::GradeTotals;
pub use cost::LineCosts;
pub use profit::{compute_result, compute_result_at};
