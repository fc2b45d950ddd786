//! Wayfinder: declarative UI navigation for test automation
//!
//! Test code asks for a destination ("the Details page of zone `east`") and
//! wayfinder works out how to get there from wherever the browser is now.
//! Each page is a registered *step* with a view predicate, a prerequisite
//! step and a transition action.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                    WAYFINDER Architecture                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐             │
//! │   │ Subject    │    │ Step       │    │ Navigator  │             │
//! │   │ (app,      │───►│ Registry   │───►│ plan +     │───► Session │
//! │   │  entity)   │    │ (kind,name)│    │ execute    │             │
//! │   └────────────┘    └────────────┘    └────────────┘             │
//! │         │                                   │                    │
//! │         └──────── View predicates ◄─────────┘                    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use wayfinder::prelude::*;
//!
//! let navigator: Navigator<Browser> = Navigator::new(NavigatorConfig::load("nav.yaml")?);
//! navigator.registry().register::<Application, _>("LoggedIn", logged_in)?;
//! navigator.registry().register::<Zones, _>("All", all_zones)?;
//! navigator.registry().register::<Zone, _>("Details", zone_details)?;
//! navigator.registry().seal();
//!
//! let view = navigator.navigate_to(&mut browser, &zone, "Details")?;
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Lazily computed, explicitly invalidated values
mod cache;

/// Navigator configuration loaded from YAML
pub mod config;

/// Tracing subscriber setup
pub mod logging;

/// Test doubles for sessions
///
/// Exposed so downstream step libraries can unit test their steps without
/// a browser.
pub mod mock;

/// Chain planning and execution
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod navigator;

/// The (subject kind, step name) registry
mod registry;

mod result;

/// Navigate steps and sessions
mod step;

/// Navigable subjects and their parent chain
mod subject;

/// View predicates
mod view;

/// Polling helpers
pub mod wait;

pub use cache::Cached;
pub use config::{LogConfig, LogFormat, NavigatorConfig};
pub use logging::init_logging;
pub use navigator::{
    ActiveView, NavigateOptions, Navigation, NavigationPlan, Navigator, PlannedStep, StepRecord,
    MAX_CHAIN_DEPTH, MAX_STEP_RETRIES,
};
pub use registry::{StepKey, StepOverride, StepRef, StepRegistry};
pub use result::{NavError, NavResult};
pub use step::{NavigateStep, Prerequisite, Session, StepContext, StepDef};
pub use subject::{ancestors, root_of, Application, Collection, Subject, SubjectKind, SubjectRef};
pub use view::{BoundView, View, ViewDescriptor, ViewKind};
pub use wait::{wait_for, wait_for_with, WaitOptions, WaitResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::cache::Cached;
    pub use super::config::*;
    pub use super::navigator::*;
    pub use super::registry::*;
    pub use super::result::*;
    pub use super::step::*;
    pub use super::subject::*;
    pub use super::view::*;
    pub use super::wait::{wait_for, wait_for_with, WaitOptions, WaitResult};
}
