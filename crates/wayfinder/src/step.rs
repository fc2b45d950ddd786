//! Navigate steps: nodes of the navigation graph
//!
//! A step knows which view it leads to, which step must be satisfied
//! before it, and how to get from that step's view to its own.

use crate::result::{NavError, NavResult};
use crate::subject::{root_of, SubjectRef};
use crate::view::{BoundView, View};
use std::fmt;
use std::sync::Arc;

/// The live interaction channel (browser, terminal, API client...).
///
/// The navigator borrows the session mutably for the whole of one
/// navigation, so only one chain runs against it at a time.
pub trait Session {
    /// Reload the current page
    fn refresh(&mut self) -> NavResult<()>;

    /// Short description of what the session currently shows
    fn describe_state(&self) -> String {
        String::from("<unknown>")
    }
}

/// Reference to the step that must be satisfied before another one
#[derive(Clone)]
pub enum Prerequisite {
    /// Another step on the same subject
    Sibling(String),
    /// A step on the subject's parent
    Parent(String),
    /// A step on the top-most ancestor (e.g. the logged-in landing page)
    Root(String),
    /// A step on an explicit subject
    Object {
        /// Subject to navigate
        subject: SubjectRef,
        /// Step on that subject
        step: String,
    },
}

impl Prerequisite {
    /// Step on the same subject
    #[must_use]
    pub fn sibling(step: impl Into<String>) -> Self {
        Self::Sibling(step.into())
    }

    /// Step on the parent subject
    #[must_use]
    pub fn parent(step: impl Into<String>) -> Self {
        Self::Parent(step.into())
    }

    /// Step on the root subject
    #[must_use]
    pub fn root(step: impl Into<String>) -> Self {
        Self::Root(step.into())
    }

    /// Step on an explicit subject
    #[must_use]
    pub fn object(subject: SubjectRef, step: impl Into<String>) -> Self {
        Self::Object {
            subject,
            step: step.into(),
        }
    }

    /// Name of the referenced step
    #[must_use]
    pub fn step(&self) -> &str {
        match self {
            Self::Sibling(step) | Self::Parent(step) | Self::Root(step) => step,
            Self::Object { step, .. } => step,
        }
    }

    /// Resolve against `subject` into the concrete subject and step to visit.
    ///
    /// `declared_by` names the step owning this prerequisite, for errors.
    pub fn resolve(
        &self,
        subject: &SubjectRef,
        declared_by: &str,
    ) -> NavResult<(SubjectRef, String)> {
        let target = match self {
            Self::Sibling(_) => subject.clone(),
            Self::Parent(_) => subject.parent().ok_or_else(|| NavError::MissingParent {
                subject: subject.label(),
                step: declared_by.to_string(),
            })?,
            Self::Root(_) => root_of(subject),
            Self::Object { subject, .. } => subject.clone(),
        };
        Ok((target, self.step().to_string()))
    }
}

impl fmt::Debug for Prerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sibling(step) => f.debug_tuple("Sibling").field(step).finish(),
            Self::Parent(step) => f.debug_tuple("Parent").field(step).finish(),
            Self::Root(step) => f.debug_tuple("Root").field(step).finish(),
            Self::Object { subject, step } => f
                .debug_struct("Object")
                .field("subject", &subject.label())
                .field("step", step)
                .finish(),
        }
    }
}

/// What a step's `go` gets to work with
pub struct StepContext<'a, S> {
    /// Subject being navigated
    pub subject: &'a SubjectRef,
    /// Name of the step being executed
    pub step: &'a str,
    /// View of the satisfied prerequisite, `None` for root steps
    pub prerequisite_view: Option<&'a BoundView<S>>,
    /// 1 for the first attempt, 2 for the retry
    pub attempt: u32,
}

impl<S> StepContext<'_, S> {
    /// Downcast the subject to its concrete type
    #[must_use]
    pub fn subject_as<T: crate::subject::Subject>(&self) -> Option<&T> {
        self.subject.downcast_ref::<T>()
    }

    /// Shortcut for a [`NavError::StepFailed`] naming this step
    #[must_use]
    pub fn fail(&self, message: impl Into<String>) -> NavError {
        NavError::step_failed(self.step, message)
    }

    /// Shortcut for a [`NavError::ObjectNotFound`] naming this subject
    #[must_use]
    pub fn not_found(&self, message: impl Into<String>) -> NavError {
        NavError::not_found(self.subject.label(), message)
    }
}

impl<S> fmt::Debug for StepContext<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepContext")
            .field("subject", &self.subject.label())
            .field("step", &self.step)
            .field("prerequisite_view", &self.prerequisite_view)
            .field("attempt", &self.attempt)
            .finish()
    }
}

/// A node in the navigation graph.
///
/// Implement this trait for steps with their own state, or build one from
/// closures with [`StepDef`].
pub trait NavigateStep<S: Session>: Send + Sync {
    /// View reached by this step
    fn view(&self) -> Arc<dyn View<S>>;

    /// Step to satisfy first, `None` for a root step
    fn prerequisite(&self, _subject: &SubjectRef) -> Option<Prerequisite> {
        None
    }

    /// Bind this step's view to `subject`. No side effects.
    fn resolve_view(&self, subject: &SubjectRef, step: &str) -> BoundView<S> {
        BoundView::new(self.view(), subject.clone(), step)
    }

    /// Perform the transition, assuming the prerequisite view is displayed.
    ///
    /// # Errors
    ///
    /// [`NavError::StepFailed`] when the transition cannot be performed,
    /// [`NavError::ObjectNotFound`] when the subject does not exist.
    fn go(&self, session: &mut S, ctx: &StepContext<'_, S>) -> NavResult<()>;

    /// Refresh action run before the single retry
    fn reset(&self, session: &mut S, _subject: &SubjectRef) -> NavResult<()> {
        session.refresh()
    }
}

type Action<S> = dyn Fn(&mut S, &StepContext<'_, S>) -> NavResult<()> + Send + Sync;
type Resetter<S> = dyn Fn(&mut S, &SubjectRef) -> NavResult<()> + Send + Sync;

/// A step assembled from a view, a prerequisite and closures.
///
/// # Example
///
/// ```
/// use wayfinder::mock::RecordingSession;
/// use wayfinder::{
///     Application, NavigateStep, Prerequisite, StepContext, StepDef, Subject, SubjectRef,
///     ViewDescriptor,
/// };
///
/// let zones = ViewDescriptor::new("Zones", |s: &RecordingSession, _: &dyn Subject| {
///     s.page() == "zones"
/// });
/// let all = StepDef::new(zones.shared())
///     .with_prerequisite(Prerequisite::root("LoggedIn"))
///     .with_action(|session: &mut RecordingSession, ctx| {
///         session.record(format!("menu:{}", ctx.step));
///         session.visit("zones");
///         Ok(())
///     });
///
/// let app: SubjectRef = Application::shared("cloud");
/// let mut session = RecordingSession::new("dashboard");
/// let ctx = StepContext {
///     subject: &app,
///     step: "All",
///     prerequisite_view: None,
///     attempt: 1,
/// };
/// all.go(&mut session, &ctx)?;
/// assert!(all.resolve_view(&app, "All").is_displayed(&session));
/// assert_eq!(session.actions(), ["menu:All", "visit:zones"]);
/// # Ok::<(), wayfinder::NavError>(())
/// ```
pub struct StepDef<S> {
    view: Arc<dyn View<S>>,
    prerequisite: Option<Prerequisite>,
    action: Option<Box<Action<S>>>,
    resetter: Option<Box<Resetter<S>>>,
}

impl<S: Session> StepDef<S> {
    /// Step leading to `view`, with no prerequisite and no action
    #[must_use]
    pub fn new(view: Arc<dyn View<S>>) -> Self {
        Self {
            view,
            prerequisite: None,
            action: None,
            resetter: None,
        }
    }

    /// Declare the prerequisite step
    #[must_use]
    pub fn with_prerequisite(mut self, prerequisite: Prerequisite) -> Self {
        self.prerequisite = Some(prerequisite);
        self
    }

    /// Set the transition action
    #[must_use]
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut S, &StepContext<'_, S>) -> NavResult<()> + Send + Sync + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    /// Replace the default refresh action
    #[must_use]
    pub fn with_resetter<F>(mut self, resetter: F) -> Self
    where
        F: Fn(&mut S, &SubjectRef) -> NavResult<()> + Send + Sync + 'static,
    {
        self.resetter = Some(Box::new(resetter));
        self
    }
}

impl<S: Session> NavigateStep<S> for StepDef<S> {
    fn view(&self) -> Arc<dyn View<S>> {
        Arc::clone(&self.view)
    }

    fn prerequisite(&self, _subject: &SubjectRef) -> Option<Prerequisite> {
        self.prerequisite.clone()
    }

    fn go(&self, session: &mut S, ctx: &StepContext<'_, S>) -> NavResult<()> {
        match &self.action {
            Some(action) => action(session, ctx),
            None => Ok(()),
        }
    }

    fn reset(&self, session: &mut S, subject: &SubjectRef) -> NavResult<()> {
        match &self.resetter {
            Some(resetter) => resetter(session, subject),
            None => session.refresh(),
        }
    }
}

impl<S> fmt::Debug for StepDef<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDef")
            .field("view", &self.view.name())
            .field("prerequisite", &self.prerequisite)
            .field("has_action", &self.action.is_some())
            .field("has_resetter", &self.resetter.is_some())
            .finish()
    }
}
