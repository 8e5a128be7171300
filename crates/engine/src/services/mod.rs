//! Stateful services over the repository layer.
//!
//! Each service holds a `PgPool` and composes the pure algorithms from
//! `larder-core` with the queries in [`crate::db`].

pub mod availability;
pub mod deduction;
pub mod projector;
pub mod registry;
pub mod reorder;

pub use availability::AvailabilityAnalyzer;
pub use deduction::DeductionEngine;
pub use projector::DeploymentProjector;
pub use registry::RecipeTemplateRegistry;
pub use reorder::ReorderTrigger;
