//! Navigable subjects: Entities, Collections and the Application root
//!
//! Subjects mirror objects in the remote application. They form a strict
//! tree: every Entity belongs to one Collection, every Collection belongs to
//! one Entity or to the [`Application`] root.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Shared handle to a type-erased subject
pub type SubjectRef = Arc<dyn Subject>;

/// Upcast helper so subjects can be downcast to their concrete type.
pub trait AsAny {
    /// View as [`Any`]
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An object navigation steps can be registered against.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// struct AvailabilityZone {
///     name: String,
///     collection: SubjectRef,
/// }
///
/// impl Subject for AvailabilityZone {
///     fn key(&self) -> String {
///         self.name.clone()
///     }
///
///     fn parent(&self) -> Option<SubjectRef> {
///         Some(self.collection.clone())
///     }
/// }
/// ```
pub trait Subject: AsAny + fmt::Debug + Send + Sync + 'static {
    /// Stable identity of this object among subjects of the same type
    fn key(&self) -> String;

    /// Owning subject, `None` for the root
    fn parent(&self) -> Option<SubjectRef> {
        None
    }

    /// Type name used in diagnostics
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl dyn Subject {
    /// Downcast to a concrete subject type
    #[must_use]
    pub fn downcast_ref<T: Subject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Registry kind of this subject
    #[must_use]
    pub fn kind(&self) -> SubjectKind {
        SubjectKind {
            id: self.as_any().type_id(),
            name: self.type_name(),
        }
    }

    /// Human-readable label, `Type(key)`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}({})", short_type_name(self.type_name()), self.key())
    }
}

/// Type identity used as the first half of a step key
#[derive(Debug, Clone, Copy)]
pub struct SubjectKind {
    id: TypeId,
    name: &'static str,
}

impl SubjectKind {
    /// Kind of a concrete subject type
    #[must_use]
    pub fn of<T: Subject>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified type name
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }
}

impl PartialEq for SubjectKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SubjectKind {}

impl Hash for SubjectKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

fn short_type_name(name: &'static str) -> &'static str {
    // Generic arguments may contain `::`, only strip the outer path
    let head = name.split('<').next().unwrap_or(name);
    match head.rfind("::") {
        Some(idx) => &name[idx + 2..],
        None => name,
    }
}

/// Root context of the subject tree
#[derive(Debug, Clone, Default)]
pub struct Application {
    name: String,
}

impl Application {
    /// Create a root context with a display name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Shared handle to a new root
    #[must_use]
    pub fn shared(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(name))
    }
}

impl Subject for Application {
    fn key(&self) -> String {
        if self.name.is_empty() {
            "application".to_string()
        } else {
            self.name.clone()
        }
    }
}

/// A factory of Entities of one kind, scoped to a parent.
pub trait Collection: Subject + Sized {
    /// Entity type produced by this collection
    type Entity: Subject;

    /// Build an Entity owned by this collection.
    ///
    /// The builder receives the collection handle, which the Entity must
    /// report as its parent.
    fn instantiate<F>(self: &Arc<Self>, build: F) -> Arc<Self::Entity>
    where
        F: FnOnce(SubjectRef) -> Self::Entity,
    {
        let owner: SubjectRef = self.clone();
        Arc::new(build(owner))
    }
}

/// Ancestors of a subject, nearest first
#[must_use]
pub fn ancestors(subject: &SubjectRef) -> Vec<SubjectRef> {
    let mut chain = Vec::new();
    let mut current = subject.parent();
    while let Some(parent) = current {
        current = parent.parent();
        chain.push(parent);
    }
    chain
}

/// Top-most ancestor, or the subject itself when it has no parent
#[must_use]
pub fn root_of(subject: &SubjectRef) -> SubjectRef {
    ancestors(subject)
        .pop()
        .unwrap_or_else(|| subject.clone())
}
