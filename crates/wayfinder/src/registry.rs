//! Step registry: `(subject type, step name) -> step`
//!
//! Populated once at startup, then sealed. Tests may temporarily replace a
//! step with [`StepRegistry::override_step`]; the returned guard puts the
//! previous binding back when it goes out of scope.

use crate::result::{NavError, NavResult};
use crate::step::{NavigateStep, Session};
use crate::subject::{Subject, SubjectKind};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

/// Registration key of a step
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepKey {
    /// Subject type the step is registered for
    pub kind: SubjectKind,
    /// Step name
    pub name: String,
}

impl StepKey {
    /// Create a key
    #[must_use]
    pub fn new(kind: SubjectKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Key for a concrete subject type
    #[must_use]
    pub fn of<T: Subject>(name: impl Into<String>) -> Self {
        Self::new(SubjectKind::of::<T>(), name)
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.kind, self.name)
    }
}

/// Shared handle to a registered step
pub type StepRef<S> = Arc<dyn NavigateStep<S>>;

/// Process-wide table of navigation steps.
///
/// # Example
///
/// ```ignore
/// static NAVIGATOR: LazyLock<Navigator<Browser>> = LazyLock::new(|| {
///     let navigator = Navigator::new(NavigatorConfig::default());
///     zones::register_steps(navigator.registry()).expect("zone steps");
///     domains::register_steps(navigator.registry()).expect("domain steps");
///     navigator.registry().seal();
///     navigator
/// });
/// ```
pub struct StepRegistry<S: Session> {
    steps: RwLock<HashMap<StepKey, StepRef<S>>>,
    sealed: AtomicBool,
}

impl<S: Session> Default for StepRegistry<S> {
    fn default() -> Self {
        Self {
            steps: RwLock::new(HashMap::new()),
            sealed: AtomicBool::new(false),
        }
    }
}

impl<S: Session> StepRegistry<S> {
    /// Create an empty, unsealed registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<StepKey, StepRef<S>>> {
        self.steps.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<StepKey, StepRef<S>>> {
        self.steps.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `step` as `name` for subject type `T`.
    ///
    /// # Errors
    ///
    /// [`NavError::DuplicateStep`] if the key is taken (the existing step
    /// is kept), [`NavError::RegistrySealed`] after [`StepRegistry::seal`].
    pub fn register<T, N>(&self, name: impl Into<String>, step: N) -> NavResult<()>
    where
        T: Subject,
        N: NavigateStep<S> + 'static,
    {
        self.register_kind(SubjectKind::of::<T>(), name, Arc::new(step))
    }

    /// Register an already shared step under an explicit kind
    pub fn register_kind(
        &self,
        kind: SubjectKind,
        name: impl Into<String>,
        step: StepRef<S>,
    ) -> NavResult<()> {
        let key = StepKey::new(kind, name);
        // Checked under the write guard so a concurrent seal cannot interleave
        let mut steps = self.write();
        if self.is_sealed() {
            return Err(NavError::RegistrySealed {
                subject_type: key.kind.to_string(),
                step: key.name,
            });
        }
        if steps.contains_key(&key) {
            return Err(NavError::DuplicateStep {
                subject_type: key.kind.to_string(),
                step: key.name,
            });
        }
        debug!(step = %key, "registered navigation step");
        let _ = steps.insert(key, step);
        Ok(())
    }

    /// Find the step registered as `name` for `kind`
    pub fn lookup(&self, kind: SubjectKind, name: &str) -> NavResult<StepRef<S>> {
        let key = StepKey::new(kind, name);
        self.read()
            .get(&key)
            .cloned()
            .ok_or_else(|| NavError::UnknownStep {
                subject_type: kind.to_string(),
                step: name.to_string(),
            })
    }

    /// Whether `name` is registered for `kind`
    #[must_use]
    pub fn contains(&self, kind: SubjectKind, name: &str) -> bool {
        self.read().contains_key(&StepKey::new(kind, name))
    }

    /// Number of registered steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no step is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// All keys, sorted by display form
    #[must_use]
    pub fn keys(&self) -> Vec<StepKey> {
        let mut keys: Vec<StepKey> = self.read().keys().cloned().collect();
        keys.sort_by_cached_key(ToString::to_string);
        keys
    }

    /// Step names registered for `kind`, sorted
    #[must_use]
    pub fn step_names(&self, kind: SubjectKind) -> Vec<String> {
        let mut names: Vec<String> = self
            .read()
            .keys()
            .filter(|k| k.kind == kind)
            .map(|k| k.name.clone())
            .collect();
        names.sort();
        names
    }

    /// End the load-time phase; later registrations fail
    pub fn seal(&self) {
        let _steps = self.write();
        self.sealed.store(true, Ordering::SeqCst);
    }

    /// Whether [`StepRegistry::seal`] was called
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::SeqCst)
    }

    /// Temporarily bind `name` for `T` to `step`.
    ///
    /// Works on sealed registries. The previous binding, or its absence, is
    /// restored when the guard drops; guards nest.
    #[must_use = "the override is undone as soon as the guard is dropped"]
    pub fn override_step<T, N>(&self, name: impl Into<String>, step: N) -> StepOverride<'_, S>
    where
        T: Subject,
        N: NavigateStep<S> + 'static,
    {
        self.override_kind(StepKey::of::<T>(name), Arc::new(step))
    }

    /// Temporarily bind `key` to an already shared step
    #[must_use = "the override is undone as soon as the guard is dropped"]
    pub fn override_kind(&self, key: StepKey, step: StepRef<S>) -> StepOverride<'_, S> {
        let previous = self.write().insert(key.clone(), step);
        trace!(step = %key, replaced = previous.is_some(), "step override pushed");
        StepOverride {
            registry: self,
            key,
            previous,
        }
    }
}

impl<S: Session> fmt::Debug for StepRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self.keys().iter().map(ToString::to_string).collect();
        f.debug_struct("StepRegistry")
            .field("steps", &keys)
            .field("sealed", &self.is_sealed())
            .finish()
    }
}

/// Guard returned by [`StepRegistry::override_step`]
pub struct StepOverride<'a, S: Session> {
    registry: &'a StepRegistry<S>,
    key: StepKey,
    previous: Option<StepRef<S>>,
}

impl<S: Session> StepOverride<'_, S> {
    /// Key being overridden
    #[must_use]
    pub fn key(&self) -> &StepKey {
        &self.key
    }
}

impl<S: Session> Drop for StepOverride<'_, S> {
    fn drop(&mut self) {
        let mut steps = self.registry.write();
        match self.previous.take() {
            Some(step) => {
                let _ = steps.insert(self.key.clone(), step);
            }
            None => {
                let _ = steps.remove(&self.key);
            }
        }
        trace!(step = %self.key, "step override popped");
    }
}

impl<S: Session> fmt::Debug for StepOverride<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepOverride")
            .field("key", &self.key.to_string())
            .field("restores", &self.previous.is_some())
            .finish()
    }
}
