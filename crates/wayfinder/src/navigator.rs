//! The navigation resolver
//!
//! `navigate_to(subject, "Details")` plans the chain of prerequisite steps
//! leading to the destination, then executes it:
//!
//! ```text
//!   plan (backward)                       execute (forward)
//!   Zone::Details      not displayed  ─┐   1. Zones::All     go + check
//!   Zones::All         not displayed   │   2. Zone::Details  go + check
//!   Application::LoggedIn  displayed ──┘   (anchor, nothing to do)
//! ```
//!
//! Planning stops at the first step whose view is already displayed (the
//! anchor) or at a root step. Predicates are always evaluated live; the
//! cached active view is informational only.

use crate::cache::Cached;
use crate::config::NavigatorConfig;
use crate::registry::{StepKey, StepRef, StepRegistry};
use crate::result::{NavError, NavResult};
use crate::step::{Session, StepContext};
use crate::subject::{SubjectKind, SubjectRef};
use crate::view::BoundView;
use crate::wait::{wait_for, WaitOptions};
use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, trace, warn};
use uuid::Uuid;

/// Retries of a single step after its view failed to show up
pub const MAX_STEP_RETRIES: u32 = 1;

/// Longest prerequisite chain planning will follow.
///
/// A graph that keeps producing new subjects never repeats a
/// `(type, key, step)` triple, so it is cut off here and reported as
/// [`NavError::CyclicNavigation`].
pub const MAX_CHAIN_DEPTH: usize = 64;

/// Per-call navigation options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Allow one refresh-and-retry when a view does not show up
    pub use_resetter: bool,
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self { use_resetter: true }
    }
}

impl NavigateOptions {
    /// Disable refresh-and-retry
    #[must_use]
    pub const fn without_resetter() -> Self {
        Self {
            use_resetter: false,
        }
    }
}

impl From<&NavigatorConfig> for NavigateOptions {
    fn from(config: &NavigatorConfig) -> Self {
        Self {
            use_resetter: config.use_resetter,
        }
    }
}

/// The view last reached by a successful navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveView {
    /// Destination step
    pub step: StepKey,
    /// Subject key
    pub subject: String,
}

/// One step of a plan, in execution order
pub struct PlannedStep<S: Session> {
    /// Registration key
    pub key: StepKey,
    /// Subject the step runs against
    pub subject: SubjectRef,
    /// The step itself
    pub step: StepRef<S>,
    /// View the step must end on
    pub view: BoundView<S>,
}

impl<S: Session> PlannedStep<S> {
    /// `Kind::Step[subject]`
    #[must_use]
    pub fn label(&self) -> String {
        step_label(&self.key, &self.subject)
    }
}

impl<S: Session> fmt::Debug for PlannedStep<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlannedStep")
            .field("key", &self.key.to_string())
            .field("subject", &self.subject.label())
            .field("view", &self.view.name())
            .finish()
    }
}

/// Result of the backward walk: what must run to reach the destination
pub struct NavigationPlan<S: Session> {
    /// Resolution context id, shared with the navigation's log span
    pub id: Uuid,
    /// Destination step
    pub destination: StepKey,
    /// Destination view bound to the subject
    pub target: BoundView<S>,
    /// Already displayed view the chain starts from, if any
    pub anchor: Option<BoundView<S>>,
    /// Steps to execute, prerequisite first
    pub steps: Vec<PlannedStep<S>>,
}

impl<S: Session> NavigationPlan<S> {
    /// Whether the destination is already displayed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of steps to execute
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Step labels in execution order
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.steps.iter().map(PlannedStep::label).collect()
    }

    /// Render the plan as a Graphviz digraph.
    ///
    /// The anchor, when present, is drawn filled; the destination is
    /// double-circled.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        dot.push_str("digraph Navigation {\n");
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=box];\n");

        let mut previous: Option<String> = None;
        if let Some(anchor) = &self.anchor {
            let key = StepKey::new(anchor.subject().kind(), anchor.step());
            let label = step_label(&key, anchor.subject());
            dot.push_str(&format!(
                "  \"{label}\" [style=filled, tooltip=\"{}\"];\n",
                anchor.name()
            ));
            previous = Some(label);
        }

        let last = self.steps.len().saturating_sub(1);
        for (i, planned) in self.steps.iter().enumerate() {
            let label = planned.label();
            let shape = if i == last { ", peripheries=2" } else { "" };
            dot.push_str(&format!(
                "  \"{label}\" [tooltip=\"{}\"{shape}];\n",
                planned.view.name()
            ));
            if let Some(prev) = &previous {
                dot.push_str(&format!("  \"{prev}\" -> \"{label}\";\n"));
            }
            previous = Some(label);
        }

        dot.push_str("}\n");
        dot
    }
}

impl<S: Session> fmt::Debug for NavigationPlan<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationPlan")
            .field("id", &self.id)
            .field("destination", &self.destination.to_string())
            .field("anchor", &self.anchor)
            .field("steps", &self.labels())
            .finish()
    }
}

/// What happened to one executed step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// `Kind::Step` of the executed step
    pub step: String,
    /// Subject key
    pub subject: String,
    /// View the step ended on
    pub view: String,
    /// `go` invocations (2 when the retry was used)
    pub attempts: u32,
    /// Time spent, including settling and the retry
    pub elapsed: Duration,
}

/// Outcome of a successful navigation
pub struct Navigation<S: Session> {
    /// Resolution context id
    pub id: Uuid,
    /// Destination view
    pub view: BoundView<S>,
    /// Executed steps, in order
    pub executed: Vec<StepRecord>,
}

impl<S: Session> Navigation<S> {
    /// Number of `go` invocations, retries included
    #[must_use]
    pub fn go_count(&self) -> u32 {
        self.executed.iter().map(|r| r.attempts).sum()
    }

    /// Number of steps that needed the retry
    #[must_use]
    pub fn retries(&self) -> usize {
        self.executed.iter().filter(|r| r.attempts > 1).count()
    }
}

impl<S: Session> fmt::Debug for Navigation<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigation")
            .field("id", &self.id)
            .field("view", &self.view)
            .field("executed", &self.executed)
            .finish()
    }
}

/// Per-call resolution state
struct ResolutionContext {
    id: Uuid,
    seen: HashSet<(SubjectKind, String, String)>,
    visited: Vec<String>,
}

impl ResolutionContext {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            seen: HashSet::new(),
            visited: Vec::new(),
        }
    }

    /// Record a visit; fail on the second visit of the same step and subject,
    /// or once the chain exceeds [`MAX_CHAIN_DEPTH`]
    fn visit(&mut self, key: &StepKey, subject: &SubjectRef) -> NavResult<()> {
        let label = step_label(key, subject);
        self.visited.push(label);
        let repeated = !self.seen.insert((key.kind, subject.key(), key.name.clone()));
        if repeated || self.visited.len() > MAX_CHAIN_DEPTH {
            return Err(NavError::CyclicNavigation {
                chain: std::mem::take(&mut self.visited),
            });
        }
        Ok(())
    }
}

fn step_label(key: &StepKey, subject: &SubjectRef) -> String {
    format!("{key}[{}]", subject.key())
}

/// Resolves and executes navigation chains against a [`StepRegistry`].
///
/// # Example
///
/// ```
/// use wayfinder::mock::RecordingSession;
/// use wayfinder::prelude::*;
///
/// fn page(name: &'static str) -> StepDef<RecordingSession> {
///     let view = ViewDescriptor::new(name, move |s: &RecordingSession, _: &dyn Subject| {
///         s.page() == name
///     });
///     StepDef::new(view.shared()).with_action(move |s: &mut RecordingSession, _| {
///         s.visit(name);
///         Ok(())
///     })
/// }
///
/// let navigator: Navigator<RecordingSession> = Navigator::new(NavigatorConfig::immediate());
/// navigator
///     .registry()
///     .register::<Application, _>("LoggedIn", page("dashboard"))?;
/// navigator.registry().register::<Application, _>(
///     "Settings",
///     page("settings").with_prerequisite(Prerequisite::sibling("LoggedIn")),
/// )?;
/// navigator.registry().seal();
///
/// let app: SubjectRef = Application::shared("cloud");
/// let mut session = RecordingSession::new("login");
/// let view = navigator.navigate_to(&mut session, &app, "Settings")?;
/// assert!(view.is_displayed(&session));
/// assert_eq!(session.visits(), vec!["dashboard", "settings"]);
/// # Ok::<(), wayfinder::NavError>(())
/// ```
pub struct Navigator<S: Session> {
    registry: StepRegistry<S>,
    config: NavigatorConfig,
    current: Cached<ActiveView>,
}

impl<S: Session> Default for Navigator<S> {
    fn default() -> Self {
        Self::new(NavigatorConfig::default())
    }
}

impl<S: Session> Navigator<S> {
    /// Navigator with an empty registry
    #[must_use]
    pub fn new(config: NavigatorConfig) -> Self {
        Self::with_registry(StepRegistry::new(), config)
    }

    /// Navigator over an existing registry
    #[must_use]
    pub fn with_registry(registry: StepRegistry<S>, config: NavigatorConfig) -> Self {
        Self {
            registry,
            config,
            current: Cached::new(),
        }
    }

    /// The step registry
    #[must_use]
    pub fn registry(&self) -> &StepRegistry<S> {
        &self.registry
    }

    /// The configuration
    #[must_use]
    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// The view reached by the last successful navigation.
    ///
    /// Cleared at the start of every navigation. Never used to skip a
    /// predicate check.
    #[must_use]
    pub fn current_view(&self) -> Option<ActiveView> {
        self.current.get()
    }

    /// Compute the chain needed to reach `step` for `subject`, without
    /// executing anything.
    ///
    /// # Errors
    ///
    /// [`NavError::UnknownStep`], [`NavError::CyclicNavigation`],
    /// [`NavError::MissingParent`].
    pub fn plan(
        &self,
        session: &S,
        subject: &SubjectRef,
        step: &str,
    ) -> NavResult<NavigationPlan<S>> {
        let destination = StepKey::new(subject.kind(), step);
        let destination_step = self.registry.lookup(destination.kind, step)?;
        let target = destination_step.resolve_view(subject, step);

        let mut ctx = ResolutionContext::new();
        let mut chain: Vec<PlannedStep<S>> = Vec::new();
        let mut anchor = None;
        let mut current = (subject.clone(), destination.clone(), destination_step);

        loop {
            let (node_subject, key, nav_step) = current;
            ctx.visit(&key, &node_subject)?;

            let view = nav_step.resolve_view(&node_subject, &key.name);
            if view.is_displayed(session) {
                trace!(step = %key, view = view.name(), "view already displayed");
                anchor = Some(view);
                break;
            }

            let prerequisite = nav_step.prerequisite(&node_subject);
            chain.push(PlannedStep {
                key: key.clone(),
                subject: node_subject.clone(),
                step: nav_step,
                view,
            });

            let Some(prerequisite) = prerequisite else {
                break;
            };
            let (next_subject, next_name) = prerequisite.resolve(&node_subject, &key.name)?;
            let next_key = StepKey::new(next_subject.kind(), next_name);
            let next_step = self.registry.lookup(next_key.kind, &next_key.name)?;
            current = (next_subject, next_key, next_step);
        }

        chain.reverse();
        Ok(NavigationPlan {
            id: ctx.id,
            destination,
            target,
            anchor,
            steps: chain,
        })
    }

    /// Navigate to `step` for `subject` using the configured options
    pub fn navigate_to(
        &self,
        session: &mut S,
        subject: &SubjectRef,
        step: &str,
    ) -> NavResult<BoundView<S>> {
        self.navigate_to_with(session, subject, step, NavigateOptions::from(&self.config))
    }

    /// Navigate to `step` for `subject` with explicit options
    pub fn navigate_to_with(
        &self,
        session: &mut S,
        subject: &SubjectRef,
        step: &str,
        options: NavigateOptions,
    ) -> NavResult<BoundView<S>> {
        self.navigate(session, subject, step, options)
            .map(|navigation| navigation.view)
    }

    /// Navigate and report every executed step.
    ///
    /// # Errors
    ///
    /// Planning errors (see [`Navigator::plan`]), any error returned by a
    /// step's `go` or `reset`, and [`NavError::NavigationFailed`] when a
    /// view does not show up after the retry.
    pub fn navigate(
        &self,
        session: &mut S,
        subject: &SubjectRef,
        step: &str,
        options: NavigateOptions,
    ) -> NavResult<Navigation<S>> {
        self.current.invalidate();

        let plan = self.plan(session, subject, step)?;
        let span = info_span!(
            "navigate",
            id = %plan.id,
            destination = %plan.destination,
            subject = %subject.key(),
        );
        let _entered = span.enter();

        if plan.is_empty() {
            debug!("destination already displayed");
        } else {
            debug!(chain = ?plan.labels(), "executing navigation chain");
        }

        let settle = self.config.settle_options();
        let mut previous = plan.anchor;
        let mut executed = Vec::with_capacity(plan.steps.len());
        for planned in plan.steps {
            let record = self.execute(session, &planned, previous.as_ref(), options, &settle)?;
            executed.push(record);
            previous = Some(planned.view);
        }

        self.current.set(ActiveView {
            step: plan.destination.clone(),
            subject: subject.key(),
        });
        info!(steps = executed.len(), "navigation complete");

        Ok(Navigation {
            id: plan.id,
            view: plan.target,
            executed,
        })
    }

    /// Whether `step` can be reached for `subject`.
    ///
    /// `false` when a step reports the object as absent; other failures
    /// are returned as errors.
    pub fn exists(&self, session: &mut S, subject: &SubjectRef, step: &str) -> NavResult<bool> {
        match self.navigate_to(session, subject, step) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => {
                debug!(subject = %subject.label(), error = %e, "object does not exist");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn execute(
        &self,
        session: &mut S,
        planned: &PlannedStep<S>,
        previous: Option<&BoundView<S>>,
        options: NavigateOptions,
        settle: &WaitOptions,
    ) -> NavResult<StepRecord> {
        let started = Instant::now();
        let max_attempts = if options.use_resetter {
            1 + MAX_STEP_RETRIES
        } else {
            1
        };
        let mut attempt = 1;

        loop {
            let ctx = StepContext {
                subject: &planned.subject,
                step: &planned.key.name,
                prerequisite_view: previous,
                attempt,
            };
            debug!(step = %planned.key, attempt, "running step");
            planned.step.go(session, &ctx)?;

            if Self::settled(session, &planned.view, settle)? {
                return Ok(StepRecord {
                    step: planned.key.to_string(),
                    subject: planned.subject.key(),
                    view: planned.view.name().to_string(),
                    attempts: attempt,
                    elapsed: started.elapsed(),
                });
            }

            if attempt >= max_attempts {
                let observed = session.describe_state();
                warn!(step = %planned.key, attempt, %observed, "view not displayed, giving up");
                return Err(NavError::NavigationFailed {
                    step: planned.key.to_string(),
                    subject: planned.subject.key(),
                    observed,
                });
            }

            warn!(step = %planned.key, "view not displayed, resetting and retrying");
            planned.step.reset(session, &planned.subject)?;
            attempt += 1;
        }
    }

    fn settled(session: &S, view: &BoundView<S>, options: &WaitOptions) -> NavResult<bool> {
        match wait_for(|| Ok(view.is_displayed(session)), options) {
            Ok(_) => Ok(true),
            Err(NavError::Timeout { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl<S: Session> fmt::Debug for Navigator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("current", &self.current)
            .finish()
    }
}
