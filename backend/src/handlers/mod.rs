//! HTTP request handlers

pub mod analysis;
pub mod animal;
pub mod climate;
pub mod farm;
pub mod health;
pub mod history;
pub mod risk;

pub use analysis::*;
pub use animal::*;
pub use climate::*;
pub use farm::*;
pub use health::*;
pub use history::*;
pub use risk::*;
