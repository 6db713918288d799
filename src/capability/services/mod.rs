//! Catalog and orchestration services.
//!
//! [`Repository`] is the generic name-keyed catalog. [`ActionRepository`] and
//! [`TemplateRepository`] bind a catalog to its two protocol operations, and
//! [`Registry`] owns both and manages the dispatcher binding.

mod actions;
mod registry;
mod repository;
mod templates;

pub use actions::{ActionRepository, CallParams};
pub use registry::{
    RegistrationSummary, Registry, RegistryConfig, RegistryError, RegistryResult, RegistryStatus,
    SummaryEntry,
};
pub use repository::Repository;
pub use templates::TemplateRepository;
