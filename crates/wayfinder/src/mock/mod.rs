//! Test doubles for sessions
//!
//! [`RecordingSession`] stands in for a browser: it holds the name of the
//! current page and records every visit and refresh, so tests can assert
//! exactly which transitions the navigator performed.
//!
//! ## Example
//!
//! ```
//! use wayfinder::mock::RecordingSession;
//! use wayfinder::Session;
//!
//! let mut session = RecordingSession::new("login").with_refresh_page("login");
//! session.visit("dashboard");
//! session.refresh()?;
//! assert_eq!(session.visits(), vec!["dashboard"]);
//! assert_eq!(session.refresh_count(), 1);
//! assert_eq!(session.page(), "login");
//! # Ok::<(), wayfinder::NavError>(())
//! ```

mod session;

pub use session::RecordingSession;
