//! Panel state and the actions the panel can take.
//!
//! [`ViewController`] owns the current [`Snapshot`], the session-lived
//! collapsed state of each group, and whether a closed tab can be reopened.
//! It re-derives the snapshot from the host after every relevant host event
//! and after each action. Overlapping refreshes are allowed: each one is a
//! full rebuild and the last to finish wins.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use futures::{join, FutureExt};
use log::{debug, error, info, warn};

use crate::closed_tabs::{
    has_recently_closed_tab, request_background_reopen, restore_most_recent, SETTLE_DELAY_MS,
};
use crate::host::{HostEvent, Listener, Subscription, TabHost};
use crate::snapshot::{build_snapshot, DEFAULT_COLLAPSED};
use crate::tab_data::Snapshot;

pub const BOOKMARKS_URL: &str = "chrome://bookmarks";

/// Where a click on a tab row landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowClick {
    Row,
    CloseButton,
}

pub struct ViewController<H: TabHost> {
    host: H,
    snapshot: RefCell<Snapshot>,
    collapsed: RefCell<HashMap<i32, bool>>,
    has_closed_tabs: Cell<bool>,
    on_change: RefCell<Option<Rc<dyn Fn()>>>,
}

impl<H: TabHost + 'static> ViewController<H> {
    pub fn new(host: H) -> Self {
        ViewController {
            host,
            snapshot: RefCell::new(Snapshot::default()),
            collapsed: RefCell::new(HashMap::new()),
            has_closed_tabs: Cell::new(false),
            on_change: RefCell::new(None),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    pub fn has_closed_tabs(&self) -> bool {
        self.has_closed_tabs.get()
    }

    pub fn is_collapsed(&self, group_id: i32) -> bool {
        self.collapsed
            .borrow()
            .get(&group_id)
            .copied()
            .unwrap_or(DEFAULT_COLLAPSED)
    }

    /// Called after every state change; the UI uses it to re-render.
    pub fn set_on_change(&self, on_change: impl Fn() + 'static) {
        *self.on_change.borrow_mut() = Some(Rc::new(on_change));
    }

    fn notify(&self) {
        let on_change = self.on_change.borrow().clone();
        if let Some(on_change) = on_change {
            on_change();
        }
    }

    fn set_has_closed_tabs(&self, available: bool) {
        self.has_closed_tabs.set(available);
        self.notify();
    }

    /// Subscribe to host events and kick off the first load.
    ///
    /// `spawn` runs each event's follow-up work; in the browser that is
    /// `wasm_bindgen_futures::spawn_local`. The listeners stay registered
    /// until the returned guard is dropped.
    pub fn attach<S>(self: &Rc<Self>, spawn: S) -> Subscription
    where
        S: Fn(LocalBoxFuture<'static, ()>) + 'static,
    {
        let spawn = Rc::new(spawn);

        let weak = Rc::downgrade(self);
        let event_spawn = spawn.clone();
        let listener: Listener = Rc::new(move |event: HostEvent| {
            if let Some(controller) = weak.upgrade() {
                event_spawn(async move { controller.handle_event(event).await }.boxed_local());
            }
        });
        let subscription = self.host.subscribe(listener);

        let controller = self.clone();
        spawn(
            async move {
                join!(controller.refresh(), controller.refresh_closed_tabs());
            }
            .boxed_local(),
        );

        subscription
    }

    pub async fn handle_event(&self, event: HostEvent) {
        debug!("Panel saw {:?}", event);

        match event {
            HostEvent::TabRemoved { .. } => {
                join!(self.refresh(), async {
                    self.host.sleep(SETTLE_DELAY_MS).await;
                    self.refresh_closed_tabs().await;
                });
            }
            HostEvent::TabCreated { .. } => {
                join!(self.refresh(), self.refresh_closed_tabs());
            }
            _ => self.refresh().await,
        }
    }

    /// Rebuild the snapshot for the current window. On failure the previous
    /// snapshot stays on screen.
    pub async fn refresh(&self) {
        let window_id = match self.host.current_window_id().await {
            Ok(window_id) => window_id,
            Err(e) => {
                error!("Failed to get current window: {}", e);
                return;
            }
        };

        let collapsed = self.collapsed.borrow().clone();
        match build_snapshot(&self.host, window_id, &collapsed).await {
            Ok(mut snapshot) => {
                // a toggle may have landed while the host was answering
                for group in snapshot.groups.iter_mut() {
                    group.collapsed = self.is_collapsed(group.id);
                }
                *self.snapshot.borrow_mut() = snapshot;
                self.notify();
            }
            Err(e) => error!("Failed to load tabs: {}", e),
        }
    }

    pub async fn refresh_closed_tabs(&self) {
        let available = has_recently_closed_tab(&self.host).await;
        self.set_has_closed_tabs(available);
    }

    pub async fn switch_tab(&self, tab_id: i32) {
        if let Err(e) = self.host.activate_tab(tab_id).await {
            error!("Failed to switch to tab {}: {}", tab_id, e);
            return;
        }
        self.refresh().await;
    }

    pub async fn close_tab(&self, tab_id: i32) {
        if let Err(e) = self.host.remove_tab(tab_id).await {
            error!("Failed to close tab {}: {}", tab_id, e);
            return;
        }
        self.refresh().await;
    }

    /// A close-button click is handled as a close only, never as a select.
    pub async fn row_clicked(&self, tab_id: i32, click: RowClick) {
        match click {
            RowClick::Row => self.switch_tab(tab_id).await,
            RowClick::CloseButton => self.close_tab(tab_id).await,
        }
    }

    /// Flip a group open or closed. Local only.
    pub fn toggle_group(&self, group_id: i32) {
        let collapsed = !self.is_collapsed(group_id);
        self.collapsed.borrow_mut().insert(group_id, collapsed);

        if let Some(group) = self
            .snapshot
            .borrow_mut()
            .groups
            .iter_mut()
            .find(|group| group.id == group_id)
        {
            group.collapsed = collapsed;
        }

        self.notify();
    }

    pub async fn reopen_last_closed(&self) {
        if !self.host.sessions_available() {
            warn!("Session history unavailable in the panel, asking background");
            self.reopen_via_background().await;
            return;
        }

        match restore_most_recent(&self.host).await {
            Ok(true) => {
                self.refresh().await;
                self.set_has_closed_tabs(false);
                // more than one tab may have been closed in a row
                self.host.sleep(SETTLE_DELAY_MS).await;
                self.refresh_closed_tabs().await;
            }
            Ok(false) => {
                info!("No closed tab to reopen");
                self.set_has_closed_tabs(false);
            }
            Err(e) => {
                error!("Failed to reopen closed tab: {}", e);
                self.reopen_via_background().await;
            }
        }
    }

    async fn reopen_via_background(&self) {
        if request_background_reopen(&self.host).await {
            self.refresh().await;
            self.set_has_closed_tabs(false);
            self.refresh_closed_tabs().await;
        }
    }

    pub async fn open_bookmarks_manager(&self) {
        if let Err(e) = self.host.create_tab(BOOKMARKS_URL).await {
            error!("Failed to open bookmarks: {}", e);
        }
    }

    pub async fn open_settings_page(&self) {
        if let Err(e) = self.host.open_options_page().await {
            error!("Failed to open settings: {}", e);
        }
    }
}
