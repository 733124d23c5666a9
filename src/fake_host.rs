//! In-memory host used by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use futures::FutureExt;

use crate::host::{HostError, HostEvent, Listener, PanelHost, PanelTarget, Subscription, TabHost};
use crate::messages::BackgroundRequest;
use crate::tab_data::{ClosedEntry, ClosedTab, RawGroup, RawTab};

/// Host calls that change something, in the order they were issued.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Activate(i32),
    Remove(i32),
    Create(String),
    Restore(String),
    StorageSet(String),
    Message(BackgroundRequest),
    OpenOptions,
    OpenPanel(PanelTarget),
    PanelOpenCompleted,
    PanelBehavior,
    Sleep(u32),
}

#[derive(Default)]
pub struct FakeHost {
    pub window_id: Cell<i32>,
    pub tabs: RefCell<Vec<RawTab>>,
    pub groups: RefCell<HashMap<i32, RawGroup>>,
    pub closed: RefCell<Vec<ClosedEntry>>,
    pub storage: RefCell<HashMap<String, serde_json::Value>>,
    pub responses: RefCell<HashMap<&'static str, serde_json::Value>>,
    pub no_sessions: Cell<bool>,
    pub fail_tab_query: Cell<bool>,
    pub fail_activate: Cell<bool>,
    pub fail_restore: Cell<bool>,
    pub calls: Rc<RefCell<Vec<Call>>>,
    listeners: Rc<RefCell<Vec<(usize, Listener)>>>,
    next_listener: Cell<usize>,
}

impl FakeHost {
    pub fn new() -> FakeHost {
        let host = FakeHost::default();
        host.window_id.set(1);
        host
    }

    pub fn with_tab(self, id: i32, index: i32, group_id: Option<i32>) -> FakeHost {
        self.tabs.borrow_mut().push(RawTab {
            id: Some(id),
            index: Some(index),
            window_id: Some(self.window_id.get()),
            title: Some(format!("Tab {}", id)),
            url: Some(format!("https://example.com/{}", id)),
            fav_icon_url: None,
            active: Some(false),
            group_id: Some(group_id.unwrap_or(crate::tab_data::TAB_GROUP_ID_NONE)),
        });
        self
    }

    pub fn with_group(self, id: i32, title: &str, color: &str) -> FakeHost {
        self.groups.borrow_mut().insert(
            id,
            RawGroup {
                id,
                title: Some(title.to_string()),
                color: color.to_string(),
            },
        );
        self
    }

    pub fn with_closed_tab(self, session_id: &str) -> FakeHost {
        self.push_closed_tab(session_id);
        self
    }

    pub fn push_closed_tab(&self, session_id: &str) {
        self.closed.borrow_mut().push(ClosedEntry {
            tab: Some(ClosedTab {
                session_id: Some(session_id.to_string()),
                ..ClosedTab::default()
            }),
            window: None,
        });
    }

    pub fn respond(&self, action: &'static str, response: serde_json::Value) {
        self.responses.borrow_mut().insert(action, response);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Delivers an event to every listener, like the browser would.
    pub fn emit(&self, event: HostEvent) {
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(event.clone());
        }
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

#[async_trait(?Send)]
impl TabHost for FakeHost {
    async fn current_window_id(&self) -> Result<i32, HostError> {
        Ok(self.window_id.get())
    }

    async fn query_tabs(&self, window_id: i32) -> Result<Vec<RawTab>, HostError> {
        if self.fail_tab_query.get() {
            return Err(HostError::rejected("tabs.query", "query failed"));
        }
        Ok(self
            .tabs
            .borrow()
            .iter()
            .filter(|tab| tab.window_id == Some(window_id))
            .cloned()
            .collect())
    }

    async fn get_group(&self, group_id: i32) -> Result<RawGroup, HostError> {
        self.groups
            .borrow()
            .get(&group_id)
            .cloned()
            .ok_or_else(|| HostError::rejected("tabGroups.get", format!("No group with id: {}", group_id)))
    }

    async fn activate_tab(&self, tab_id: i32) -> Result<(), HostError> {
        self.record(Call::Activate(tab_id));
        if self.fail_activate.get() {
            return Err(HostError::rejected("tabs.update", "activate failed"));
        }
        for tab in self.tabs.borrow_mut().iter_mut() {
            tab.active = Some(tab.id == Some(tab_id));
        }
        Ok(())
    }

    async fn remove_tab(&self, tab_id: i32) -> Result<(), HostError> {
        self.record(Call::Remove(tab_id));
        self.tabs.borrow_mut().retain(|tab| tab.id != Some(tab_id));
        Ok(())
    }

    async fn create_tab(&self, url: &str) -> Result<(), HostError> {
        self.record(Call::Create(url.to_string()));
        Ok(())
    }

    fn sessions_available(&self) -> bool {
        !self.no_sessions.get()
    }

    async fn recently_closed(&self, max_results: u32) -> Result<Vec<ClosedEntry>, HostError> {
        if self.no_sessions.get() {
            return Err(HostError::Unavailable("chrome.sessions"));
        }
        Ok(self
            .closed
            .borrow()
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }

    async fn restore_session(&self, session_id: &str) -> Result<(), HostError> {
        self.record(Call::Restore(session_id.to_string()));
        if self.fail_restore.get() {
            return Err(HostError::rejected("sessions.restore", "restore failed"));
        }
        let mut closed = self.closed.borrow_mut();
        let position = closed.iter().position(|entry| {
            entry
                .tab
                .as_ref()
                .and_then(|tab| tab.session_id.as_deref())
                == Some(session_id)
        });
        if let Some(position) = position {
            closed.remove(position);
        }
        Ok(())
    }

    async fn storage_get(&self, key: &str) -> Result<Option<serde_json::Value>, HostError> {
        Ok(self.storage.borrow().get(key).cloned())
    }

    async fn storage_set(&self, key: &str, value: serde_json::Value) -> Result<(), HostError> {
        self.record(Call::StorageSet(key.to_string()));
        self.storage.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }

    async fn send_message(
        &self,
        request: &BackgroundRequest,
    ) -> Result<serde_json::Value, HostError> {
        self.record(Call::Message(*request));
        let action = match request {
            BackgroundRequest::CheckClosedTabs => "checkClosedTabs",
            BackgroundRequest::ReopenClosedTab => "reopenClosedTab",
        };
        self.responses
            .borrow()
            .get(action)
            .cloned()
            .ok_or_else(|| HostError::rejected("runtime.sendMessage", "no receiving end"))
    }

    async fn open_options_page(&self) -> Result<(), HostError> {
        self.record(Call::OpenOptions);
        Ok(())
    }

    async fn sleep(&self, millis: u32) {
        self.record(Call::Sleep(millis));
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        let key = self.next_listener.get();
        self.next_listener.set(key + 1);
        self.listeners.borrow_mut().push((key, listener));

        let listeners = self.listeners.clone();
        Subscription::new(move || listeners.borrow_mut().retain(|(k, _)| *k != key))
    }
}

#[async_trait(?Send)]
impl PanelHost for FakeHost {
    fn open_panel(&self, target: PanelTarget) -> LocalBoxFuture<'static, Result<(), HostError>> {
        self.record(Call::OpenPanel(target));
        let calls = self.calls.clone();
        async move {
            calls.borrow_mut().push(Call::PanelOpenCompleted);
            Ok(())
        }
        .boxed_local()
    }

    async fn enable_panel_on_action_click(&self) -> Result<(), HostError> {
        self.record(Call::PanelBehavior);
        Ok(())
    }
}
