//! Domain models for the TickWatch platform

mod analysis;
mod animal;
mod climate;
mod farm;
mod history;

pub use analysis::*;
pub use animal::*;
pub use climate::*;
pub use farm::*;
pub use history::*;
