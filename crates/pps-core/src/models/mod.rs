//! Domain models for PPS survey records.

mod antibiotic;
mod entity;
mod indication;
mod optional_var;
mod patient;
mod report;
mod specimen;

pub use antibiotic::*;
pub use entity::*;
pub use indication::*;
pub use optional_var::*;
pub use patient::*;
pub use report::*;
pub use specimen::*;
