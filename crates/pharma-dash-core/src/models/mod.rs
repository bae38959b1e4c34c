//! Domain models for the pharmacy dashboard.

mod panel;
mod record;

pub use panel::*;
pub use record::*;
