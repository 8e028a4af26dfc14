//! Business logic services for the Anar trade calculator

pub mod average;
pub mod history;
pub mod trade;

pub use average::AverageService;
pub use history::{HistoryStore, LocalHistoryStore, PostgresHistoryStore, SharedHistoryStore};
pub use trade::TradeService;
