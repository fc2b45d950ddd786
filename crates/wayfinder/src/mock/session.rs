//! Recording session double.

use crate::result::{NavError, NavResult};
use crate::step::Session;

/// A fake session that records what happened to it
#[derive(Debug, Clone, Default)]
pub struct RecordingSession {
    page: String,
    actions: Vec<String>,
    refreshes: usize,
    refresh_page: Option<String>,
    fail_refresh: bool,
}

impl RecordingSession {
    /// Session currently showing `page`
    #[must_use]
    pub fn new(page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            ..Default::default()
        }
    }

    /// Page shown after a refresh (default: stay on the current page)
    #[must_use]
    pub fn with_refresh_page(mut self, page: impl Into<String>) -> Self {
        self.refresh_page = Some(page.into());
        self
    }

    /// Make every refresh fail
    #[must_use]
    pub const fn with_failing_refresh(mut self) -> Self {
        self.fail_refresh = true;
        self
    }

    /// Currently shown page
    #[must_use]
    pub fn page(&self) -> &str {
        &self.page
    }

    /// Change the page without recording it (an external state change)
    pub fn set_page(&mut self, page: impl Into<String>) {
        self.page = page.into();
    }

    /// Navigate to `page` and record the visit
    pub fn visit(&mut self, page: impl Into<String>) {
        let page = page.into();
        self.actions.push(format!("visit:{page}"));
        self.page = page;
    }

    /// Record an arbitrary action
    pub fn record(&mut self, action: impl Into<String>) {
        self.actions.push(action.into());
    }

    /// Every recorded action, in order
    #[must_use]
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Visited pages, in order
    #[must_use]
    pub fn visits(&self) -> Vec<&str> {
        self.actions
            .iter()
            .filter_map(|a| a.strip_prefix("visit:"))
            .collect()
    }

    /// Number of refreshes
    #[must_use]
    pub const fn refresh_count(&self) -> usize {
        self.refreshes
    }

    /// Forget recorded actions and refreshes, keep the current page
    pub fn clear(&mut self) {
        self.actions.clear();
        self.refreshes = 0;
    }
}

impl Session for RecordingSession {
    fn refresh(&mut self) -> NavResult<()> {
        if self.fail_refresh {
            return Err(NavError::step_failed("refresh", "browser refresh failed"));
        }
        self.refreshes += 1;
        self.actions.push("refresh".to_string());
        if let Some(page) = &self.refresh_page {
            self.page = page.clone();
        }
        Ok(())
    }

    fn describe_state(&self) -> String {
        format!("page={}", self.page)
    }
}
