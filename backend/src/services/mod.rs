//! Business logic services for the TickWatch platform

pub mod analysis;
pub mod animal;
pub mod climate;
pub mod farm;
pub mod history;
pub mod risk;

pub use analysis::AnalysisService;
pub use animal::AnimalService;
pub use climate::ClimateService;
pub use farm::FarmService;
pub use history::HistoryService;
pub use risk::RiskService;
