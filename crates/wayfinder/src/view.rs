//! Views: "is this page currently displayed?"
//!
//! A view answers a single question against the live session. Concrete
//! views are either hand-written [`View`] implementations or
//! [`ViewDescriptor`]s built from a predicate.

use crate::subject::{Subject, SubjectRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Broad category of a view, used for diagnostics and plan rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Generic page (dashboards, explorers, logged-in landing page)
    #[default]
    Page,
    /// Listing of a collection
    Listing,
    /// Summary page of a single entity
    Details,
    /// Add/edit form
    Form,
    /// Modal dialog
    Dialog,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Page => "page",
            Self::Listing => "listing",
            Self::Details => "details",
            Self::Form => "form",
            Self::Dialog => "dialog",
        };
        f.write_str(name)
    }
}

/// A UI page or region with a display predicate.
///
/// The predicate receives the subject the view is bound to, so a details
/// view can check that it shows *this* object and not a sibling.
pub trait View<S>: Send + Sync {
    /// View name for logging
    fn name(&self) -> &str;

    /// View category
    fn kind(&self) -> ViewKind {
        ViewKind::Page
    }

    /// Whether the view is currently displayed for `subject`
    fn is_displayed(&self, session: &S, subject: &dyn Subject) -> bool;
}

type Predicate<S> = dyn Fn(&S, &dyn Subject) -> bool + Send + Sync;

/// A typed view built from a name, a kind and a display predicate.
///
/// # Example
///
/// ```
/// use wayfinder::mock::RecordingSession;
/// use wayfinder::{Application, View, ViewDescriptor, ViewKind};
///
/// let details = ViewDescriptor::new("ZoneDetails", |page: &RecordingSession, zone| {
///     page.page() == format!("{} (Summary)", zone.key())
/// })
/// .with_kind(ViewKind::Details);
///
/// let session = RecordingSession::new("east (Summary)");
/// assert!(details.is_displayed(&session, &Application::new("east")));
/// assert!(!details.is_displayed(&session, &Application::new("west")));
/// ```
pub struct ViewDescriptor<S> {
    name: String,
    kind: ViewKind,
    predicate: Box<Predicate<S>>,
}

impl<S> ViewDescriptor<S> {
    /// Create a descriptor of kind [`ViewKind::Page`]
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&S, &dyn Subject) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: ViewKind::Page,
            predicate: Box::new(predicate),
        }
    }

    /// Set the view kind
    #[must_use]
    pub fn with_kind(mut self, kind: ViewKind) -> Self {
        self.kind = kind;
        self
    }

    /// Wrap into a shared handle
    #[must_use]
    pub fn shared(self) -> Arc<dyn View<S>>
    where
        S: 'static,
    {
        Arc::new(self)
    }
}

impl<S> View<S> for ViewDescriptor<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ViewKind {
        self.kind
    }

    fn is_displayed(&self, session: &S, subject: &dyn Subject) -> bool {
        (self.predicate)(session, subject)
    }
}

impl<S> fmt::Debug for ViewDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A view bound to the subject and step it was resolved for
pub struct BoundView<S> {
    view: Arc<dyn View<S>>,
    subject: SubjectRef,
    step: String,
}

impl<S> BoundView<S> {
    /// Bind `view` to `subject` for `step`
    #[must_use]
    pub fn new(view: Arc<dyn View<S>>, subject: SubjectRef, step: impl Into<String>) -> Self {
        Self {
            view,
            subject,
            step: step.into(),
        }
    }

    /// Evaluate the display predicate against the live session
    #[must_use]
    pub fn is_displayed(&self, session: &S) -> bool {
        self.view.is_displayed(session, &*self.subject)
    }

    /// Name of the underlying view
    #[must_use]
    pub fn name(&self) -> &str {
        self.view.name()
    }

    /// Kind of the underlying view
    #[must_use]
    pub fn kind(&self) -> ViewKind {
        self.view.kind()
    }

    /// Subject this view is bound to
    #[must_use]
    pub fn subject(&self) -> &SubjectRef {
        &self.subject
    }

    /// Step that resolved this view
    #[must_use]
    pub fn step(&self) -> &str {
        &self.step
    }
}

impl<S> Clone for BoundView<S> {
    fn clone(&self) -> Self {
        Self {
            view: Arc::clone(&self.view),
            subject: Arc::clone(&self.subject),
            step: self.step.clone(),
        }
    }
}

impl<S> fmt::Debug for BoundView<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundView")
            .field("view", &self.view.name())
            .field("kind", &self.view.kind())
            .field("subject", &self.subject.label())
            .field("step", &self.step)
            .finish()
    }
}
