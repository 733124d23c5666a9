//! The seam between StayLane and the browser.
//!
//! Every browser capability the extension touches goes through [`TabHost`]
//! (both execution contexts) or [`PanelHost`] (background worker only). The
//! browser binding lives in `chrome`; tests use an in-memory host.

use std::rc::Rc;

use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use thiserror::Error;

use crate::messages::BackgroundRequest;
use crate::tab_data::{ClosedEntry, RawGroup, RawTab};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// The host rejected the call (permissions, stale id, internal error).
    #[error("{call} was rejected: {message}")]
    Rejected { call: &'static str, message: String },

    /// The capability does not exist in this execution context.
    #[error("{0} is unavailable in this context")]
    Unavailable(&'static str),

    /// The host answered with something that does not fit the expected shape.
    #[error("could not decode {what}: {message}")]
    Decode { what: &'static str, message: String },
}

impl HostError {
    pub fn rejected(call: &'static str, message: impl Into<String>) -> HostError {
        HostError::Rejected {
            call,
            message: message.into(),
        }
    }

    pub fn decode(what: &'static str, message: impl Into<String>) -> HostError {
        HostError::Decode {
            what,
            message: message.into(),
        }
    }
}

/// Browser lifecycle events either context may observe.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    TabCreated { tab_id: Option<i32> },
    TabUpdated {
        tab_id: i32,
        status: Option<String>,
        url: Option<String>,
    },
    TabRemoved { tab_id: i32 },
    TabActivated { tab_id: i32 },
    /// `None` when focus left every browser window.
    WindowFocusChanged { window_id: Option<i32> },
    GroupUpdated { group_id: i32 },
    GroupMoved { group_id: i32 },
}

pub type Listener = Rc<dyn Fn(HostEvent)>;

/// Registered host listeners. Dropping the guard deregisters all of them.
#[must_use = "dropping a Subscription removes its listeners"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Subscription {
        Subscription {
            release: Some(Box::new(release)),
        }
    }

    /// A guard with nothing to release, for hosts that cannot subscribe.
    pub fn empty() -> Subscription {
        Subscription { release: None }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// What the side panel should be opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelTarget {
    Window(i32),
    Tab(i32),
}

/// Capabilities shared by the panel UI and the background worker.
#[async_trait(?Send)]
pub trait TabHost {
    async fn current_window_id(&self) -> Result<i32, HostError>;

    async fn query_tabs(&self, window_id: i32) -> Result<Vec<RawTab>, HostError>;

    async fn get_group(&self, group_id: i32) -> Result<RawGroup, HostError>;

    async fn activate_tab(&self, tab_id: i32) -> Result<(), HostError>;

    async fn remove_tab(&self, tab_id: i32) -> Result<(), HostError>;

    async fn create_tab(&self, url: &str) -> Result<(), HostError>;

    /// Whether session history can be read directly in this context.
    fn sessions_available(&self) -> bool;

    async fn recently_closed(&self, max_results: u32) -> Result<Vec<ClosedEntry>, HostError>;

    async fn restore_session(&self, session_id: &str) -> Result<(), HostError>;

    async fn storage_get(&self, key: &str) -> Result<Option<serde_json::Value>, HostError>;

    async fn storage_set(&self, key: &str, value: serde_json::Value) -> Result<(), HostError>;

    /// Sends a request to the other execution context and waits for its answer.
    async fn send_message(
        &self,
        request: &BackgroundRequest,
    ) -> Result<serde_json::Value, HostError>;

    async fn open_options_page(&self) -> Result<(), HostError>;

    async fn sleep(&self, millis: u32);

    fn subscribe(&self, listener: Listener) -> Subscription;
}

/// Capabilities only the background worker uses.
#[async_trait(?Send)]
pub trait PanelHost: TabHost {
    /// Issues the open request before returning. The host only honours it
    /// inside a user-gesture callback, so callers must invoke this before
    /// awaiting anything; the returned future only reports the outcome.
    fn open_panel(&self, target: PanelTarget) -> LocalBoxFuture<'static, Result<(), HostError>>;

    /// Makes clicking the toolbar action open the side panel.
    async fn enable_panel_on_action_click(&self) -> Result<(), HostError>;
}
