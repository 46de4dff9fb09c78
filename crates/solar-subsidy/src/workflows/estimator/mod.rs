//! Rooftop sizing and central subsidy estimation.

mod catalog;
pub mod domain;
mod engine;
pub mod router;
pub mod tariff;

pub use catalog::{default_regions, estimate_for_region, InMemoryRegionCatalog, RegionCatalog};
pub use domain::{EstimateError, EstimateView, RegionCoefficients, SizingInput, SizingResult};
pub use engine::estimate;
pub use router::{calculator_router, CalculatorState, EstimateRequest};
