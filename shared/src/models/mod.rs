//! Domain models for the Anar trade calculator

mod average;
mod calculation;
mod grade;
mod settings;
mod sheet;
mod trade;

pub use average::*;
pub use calculation::*;
pub use grade::*;
pub use settings::*;
pub use sheet::*;
pub use trade::*;
