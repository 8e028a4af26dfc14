//! HTTP handlers

pub mod averages;
pub mod calculator;
pub mod health;
pub mod history;
pub mod trades;

pub use averages::*;
pub use calculator::*;
pub use health::*;
pub use history::*;
pub use trades::*;
