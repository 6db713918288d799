//! Registry orchestrating both catalogs and the dispatcher binding.
//!
//! The lifecycle runs `collecting → initializing → ready`. A failed binding
//! moves the registry to `error`, which is terminal; recovery means building
//! a new registry.

use super::{ActionRepository, TemplateRepository};
use crate::capability::{
    domain::{
        Action, ActionCapability, CapabilityError, CapabilityName, Component, DefinitionError,
        NamePrefix, Template, TemplateCapability,
    },
    ports::{Dispatcher, DispatcherError},
};
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{error, info, warn};

/// Lifecycle state of a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryStatus {
    /// Accepting registrations; no dispatcher bound.
    Collecting,
    /// Wiring handlers onto the dispatcher.
    Initializing,
    /// Bound and serving.
    Ready,
    /// Binding failed.
    Error,
}

impl RegistryStatus {
    /// Returns the canonical lowercase representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collecting => "collecting",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for RegistryStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Errors returned by registry operations.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// A catalog operation failed.
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// The capability definition could not become a component.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// A dispatcher has already been bound.
    #[error("a dispatcher is already bound to this registry")]
    AlreadyBound,

    /// The registry is wiring its handlers.
    #[error("the registry is initializing")]
    Initializing,

    /// A previous binding failed; the registry no longer accepts changes.
    #[error("the registry is in the error state after a failed binding")]
    Errored,

    /// Wiring handlers onto the dispatcher failed.
    #[error("dispatcher binding failed: {0}")]
    Initialization(#[source] DispatcherError),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Namespace prefix applied to every declared name.
    pub prefix: NamePrefix,
}

impl RegistryConfig {
    /// Creates a configuration with the given prefix.
    #[must_use]
    pub const fn new(prefix: NamePrefix) -> Self {
        Self { prefix }
    }
}

/// One registered capability in a [`RegistrationSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    /// Prefixed wire name.
    pub name: String,
    /// Human-readable summary.
    pub description: String,
}

impl SummaryEntry {
    fn of<C: ?Sized + Component>(component: &C) -> Self {
        Self {
            name: component.name().to_string(),
            description: component.description().to_owned(),
        }
    }
}

/// Catalog contents at the moment a dispatcher was bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationSummary {
    /// Registered actions in insertion order.
    pub actions: Vec<SummaryEntry>,
    /// Registered templates in insertion order.
    pub templates: Vec<SummaryEntry>,
    /// When the binding completed.
    pub bound_at: DateTime<Utc>,
}

impl RegistrationSummary {
    /// Returns the number of actions.
    #[must_use]
    pub const fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Returns the number of templates.
    #[must_use]
    pub const fn template_count(&self) -> usize {
        self.templates.len()
    }
}

struct Lifecycle {
    status: RegistryStatus,
    dispatcher: Option<Arc<dyn Dispatcher>>,
    last_error: Option<RegistryError>,
}

/// Owner of the action and template catalogs and the dispatcher binding.
///
/// One instance is built per process and passed to whatever needs it.
/// Registering while requests are in flight is unsupported.
pub struct Registry {
    config: RegistryConfig,
    actions: Arc<ActionRepository>,
    templates: Arc<TemplateRepository>,
    clock: Arc<dyn Clock + Send + Sync>,
    lifecycle: Mutex<Lifecycle>,
}

impl Registry {
    /// Creates a registry in the `collecting` state.
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_clock(config, Arc::new(DefaultClock))
    }

    /// Creates a registry that timestamps summaries with `clock`.
    #[must_use]
    pub fn with_clock(config: RegistryConfig, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            config,
            actions: Arc::new(ActionRepository::new()),
            templates: Arc::new(TemplateRepository::new()),
            clock,
            lifecycle: Mutex::new(Lifecycle {
                status: RegistryStatus::Collecting,
                dispatcher: None,
                last_error: None,
            }),
        }
    }

    /// Builds an action from `capability` and adds it to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Definition`] for an invalid name,
    /// [`RegistryError::Capability`] for a duplicate, and
    /// [`RegistryError::Initializing`] or [`RegistryError::Errored`] when the
    /// lifecycle forbids registration.
    pub fn register_action<I, O>(
        &self,
        capability: ActionCapability<I, O>,
    ) -> RegistryResult<CapabilityName>
    where
        I: Send + 'static,
        O: Serialize + Send + 'static,
    {
        let status = self.registration_status()?;
        let action = Action::new(capability, &self.config.prefix)?;
        let name = action.name().clone();
        self.actions.catalog().register(Arc::new(action))?;
        log_registration("action", &name, status);
        Ok(name)
    }

    /// Builds a template from `capability` and adds it to the catalog.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`Registry::register_action`].
    pub fn register_template<A>(
        &self,
        capability: TemplateCapability<A>,
    ) -> RegistryResult<CapabilityName>
    where
        A: Send + 'static,
    {
        let status = self.registration_status()?;
        let template = Template::new(capability, &self.config.prefix)?;
        let name = template.name().clone();
        self.templates.catalog().register(Arc::new(template))?;
        log_registration("template", &name, status);
        Ok(name)
    }

    /// Removes the action registered under the prefixed `name`.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` when absent, or a lifecycle error.
    pub fn unregister_action(&self, name: &str) -> RegistryResult<()> {
        self.registration_status()?;
        self.actions.catalog().unregister(name)?;
        info!(action = name, "action unregistered");
        Ok(())
    }

    /// Removes the template registered under the prefixed `name`.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` when absent, or a lifecycle error.
    pub fn unregister_template(&self, name: &str) -> RegistryResult<()> {
        self.registration_status()?;
        self.templates.catalog().unregister(name)?;
        info!(template = name, "template unregistered");
        Ok(())
    }

    /// Wires both catalogs onto `dispatcher` and moves to `ready`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyBound`] when a dispatcher is already
    /// bound, [`RegistryError::Errored`] after a failed binding, and
    /// [`RegistryError::Initialization`] when wiring fails. The last case
    /// moves the registry to `error` and retains the error.
    ///
    /// Wiring is not transactional. Handlers installed before the failing
    /// operation stay registered on `dispatcher` and keep answering, so a
    /// caller that observes [`RegistryError::Initialization`] must stop
    /// serving through that dispatcher.
    pub fn bind_dispatcher(
        &self,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> RegistryResult<RegistrationSummary> {
        let target = {
            let mut lifecycle = self.lifecycle();
            if lifecycle.status == RegistryStatus::Error {
                return Err(RegistryError::Errored);
            }
            if lifecycle.dispatcher.is_some() {
                return Err(RegistryError::AlreadyBound);
            }
            lifecycle.status = RegistryStatus::Initializing;
            Arc::clone(lifecycle.dispatcher.insert(dispatcher))
        };
        info!("binding registry to dispatcher");

        let wiring = self
            .actions
            .bind(target.as_ref())
            .and_then(|()| self.templates.bind(target.as_ref()));

        match wiring {
            Ok(()) => {
                self.lifecycle().status = RegistryStatus::Ready;
                let summary = self.summary();
                log_summary(&summary);
                Ok(summary)
            }
            Err(cause) => {
                let failure = RegistryError::Initialization(cause);
                let mut lifecycle = self.lifecycle();
                lifecycle.status = RegistryStatus::Error;
                lifecycle.last_error = Some(failure.clone());
                error!(error = %failure, "registry initialization failed");
                Err(failure)
            }
        }
    }

    /// Returns a summary of the current catalog contents.
    #[must_use]
    pub fn summary(&self) -> RegistrationSummary {
        RegistrationSummary {
            actions: self
                .actions
                .catalog()
                .get_all()
                .iter()
                .map(|action| SummaryEntry::of(action.as_ref()))
                .collect(),
            templates: self
                .templates
                .catalog()
                .get_all()
                .iter()
                .map(|template| SummaryEntry::of(template.as_ref()))
                .collect(),
            bound_at: self.clock.utc(),
        }
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub fn status(&self) -> RegistryStatus {
        self.lifecycle().status
    }

    /// Returns the error retained from a failed binding.
    #[must_use]
    pub fn last_error(&self) -> Option<RegistryError> {
        self.lifecycle().last_error.clone()
    }

    /// Returns `true` once a dispatcher has been recorded.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.lifecycle().dispatcher.is_some()
    }

    /// Returns the action repository.
    #[must_use]
    pub fn actions(&self) -> Arc<ActionRepository> {
        Arc::clone(&self.actions)
    }

    /// Returns the template repository.
    #[must_use]
    pub fn templates(&self) -> Arc<TemplateRepository> {
        Arc::clone(&self.templates)
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn registration_status(&self) -> RegistryResult<RegistryStatus> {
        match self.lifecycle().status {
            RegistryStatus::Error => Err(RegistryError::Errored),
            RegistryStatus::Initializing => Err(RegistryError::Initializing),
            status => Ok(status),
        }
    }

    // Lifecycle updates are single assignments, so a poisoned guard holds a
    // valid state.
    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Registry")
            .field("config", &self.config)
            .field("status", &self.status())
            .field("actions", &self.actions)
            .field("templates", &self.templates)
            .finish_non_exhaustive()
    }
}

fn log_registration(kind: &'static str, name: &CapabilityName, status: RegistryStatus) {
    if status == RegistryStatus::Ready {
        warn!(
            kind,
            name = %name,
            "registered after the registry became ready; concurrent registration during dispatch is unsupported"
        );
    } else {
        info!(kind, name = %name, "capability registered");
    }
}

fn log_summary(summary: &RegistrationSummary) {
    info!(
        actions = summary.action_count(),
        templates = summary.template_count(),
        "registry ready"
    );
    for entry in &summary.actions {
        info!(action = %entry.name, description = %entry.description, "action available");
    }
    for entry in &summary.templates {
        info!(template = %entry.name, description = %entry.description, "template available");
    }
}
