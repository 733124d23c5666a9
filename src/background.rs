//! Background worker: panel-open wiring, the keyboard command, diagnostic
//! logging of browser events, and the message actor the panel falls back to.
//!
//! Nothing here is shared with the panel. Both contexts observe host events
//! on their own and talk only through [`BackgroundRequest`] messages.

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use log::{debug, error, info};

use crate::closed_tabs::{most_recent_closed_tab, restore_most_recent};
use crate::host::{HostEvent, PanelHost, PanelTarget, Subscription};
use crate::messages::{BackgroundRequest, ClosedTabsResponse, ReopenResponse};
use crate::tab_data::{RawTab, WINDOW_ID_CURRENT};

/// Command name declared in the manifest's `commands` section.
pub const OPEN_PANEL_COMMAND: &str = "open-side-panel";

pub struct Background<H: PanelHost> {
    host: H,
}

impl<H: PanelHost + 'static> Background<H> {
    pub fn new(host: H) -> Self {
        Background { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Run on install and on browser startup. Best-effort.
    pub async fn configure_panel(&self) {
        match self.host.enable_panel_on_action_click().await {
            Ok(()) => info!("Action click now opens the side panel"),
            Err(e) => error!("Failed to set panel behavior: {}", e),
        }
    }

    /// Register diagnostic listeners for as long as the guard lives.
    pub fn attach(self: &Rc<Self>) -> Subscription {
        self.host.subscribe(Rc::new(|event: HostEvent| {
            if let Some(line) = describe_event(&event) {
                info!("{}", line);
            }
        }))
    }

    /// Handle a keyboard command.
    ///
    /// The host only accepts a panel-open request issued while the user
    /// gesture is still being dispatched, so the request is made here,
    /// synchronously, before anything is awaited. The returned future only
    /// logs the outcome and may be spawned.
    pub fn on_command(
        &self,
        command: &str,
        tab: Option<&RawTab>,
    ) -> Option<LocalBoxFuture<'static, ()>> {
        if command != OPEN_PANEL_COMMAND {
            debug!("Ignoring command {}", command);
            return None;
        }

        let target = panel_target(tab);
        let pending = self.host.open_panel(target);

        Some(
            async move {
                if let Err(e) = pending.await {
                    error!("Failed to open side panel for {:?}: {}", target, e);
                }
            }
            .boxed_local(),
        )
    }

    /// Decide whether a message from the panel gets an answer, and if so
    /// return the future producing it. Unknown messages get none.
    pub fn accept_message(
        self: &Rc<Self>,
        message: serde_json::Value,
    ) -> Option<LocalBoxFuture<'static, serde_json::Value>> {
        let request: BackgroundRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                debug!("Ignoring message: {}", e);
                return None;
            }
        };

        let background = self.clone();
        Some(async move { background.handle_request(request).await }.boxed_local())
    }

    pub async fn handle_request(&self, request: BackgroundRequest) -> serde_json::Value {
        match request {
            BackgroundRequest::CheckClosedTabs => {
                let has_closed_tabs = match most_recent_closed_tab(&self.host).await {
                    Ok(session_id) => session_id.is_some(),
                    Err(e) => {
                        error!("Failed to check closed tabs: {}", e);
                        false
                    }
                };
                serde_json::to_value(ClosedTabsResponse { has_closed_tabs }).unwrap_or_default()
            }
            BackgroundRequest::ReopenClosedTab => {
                let success = match restore_most_recent(&self.host).await {
                    Ok(restored) => restored,
                    Err(e) => {
                        error!("Failed to reopen closed tab: {}", e);
                        false
                    }
                };
                serde_json::to_value(ReopenResponse { success }).unwrap_or_default()
            }
        }
    }
}

/// Open the panel for the active tab's window. Without a window id, fall
/// back to the tab, then to whatever window is current.
pub fn panel_target(tab: Option<&RawTab>) -> PanelTarget {
    match tab {
        Some(RawTab {
            window_id: Some(window_id),
            ..
        }) => PanelTarget::Window(*window_id),
        Some(RawTab { id: Some(id), .. }) => PanelTarget::Tab(*id),
        _ => PanelTarget::Window(WINDOW_ID_CURRENT),
    }
}

/// The log line for a host event, if it is worth one.
pub fn describe_event(event: &HostEvent) -> Option<String> {
    match event {
        HostEvent::TabUpdated {
            status: Some(status),
            url: Some(url),
            ..
        } if status == "complete" => Some(format!("Tab updated: {}", url)),
        HostEvent::WindowFocusChanged {
            window_id: Some(window_id),
        } => Some(format!("Window focused: {}", window_id)),
        HostEvent::TabCreated { tab_id } => Some(match tab_id {
            Some(tab_id) => format!("Tab created: {}", tab_id),
            None => "Tab created".to_string(),
        }),
        HostEvent::TabRemoved { tab_id } => Some(format!("Tab removed: {}", tab_id)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_host::{Call, FakeHost};
    use futures::executor::block_on;
    use serde_json::json;

    fn command_tab(id: Option<i32>, window_id: Option<i32>) -> RawTab {
        RawTab {
            id,
            window_id,
            ..RawTab::default()
        }
    }

    #[test]
    fn test_command_opens_panel_before_yielding() {
        let background = Background::new(FakeHost::new());
        let tab = command_tab(Some(5), Some(3));

        let pending = background.on_command(OPEN_PANEL_COMMAND, Some(&tab)).unwrap();

        // issued before the returned future is polled
        assert_eq!(
            background.host().calls(),
            vec![Call::OpenPanel(PanelTarget::Window(3))]
        );

        block_on(pending);
        assert_eq!(
            background.host().calls(),
            vec![Call::OpenPanel(PanelTarget::Window(3)), Call::PanelOpenCompleted]
        );
    }

    #[test]
    fn test_other_commands_are_ignored() {
        let background = Background::new(FakeHost::new());

        assert!(background.on_command("something-else", None).is_none());
        assert!(background.host().calls().is_empty());
    }

    #[test]
    fn test_panel_target_fallbacks() {
        assert_eq!(panel_target(Some(&command_tab(Some(5), Some(3)))), PanelTarget::Window(3));
        assert_eq!(panel_target(Some(&command_tab(Some(5), None))), PanelTarget::Tab(5));
        assert_eq!(panel_target(Some(&command_tab(None, None))), PanelTarget::Window(WINDOW_ID_CURRENT));
        assert_eq!(panel_target(None), PanelTarget::Window(WINDOW_ID_CURRENT));
    }

    #[test]
    fn test_configure_panel() {
        let background = Background::new(FakeHost::new());

        block_on(background.configure_panel());

        assert_eq!(background.host().calls(), vec![Call::PanelBehavior]);
    }

    fn answer(background: &Rc<Background<FakeHost>>, message: serde_json::Value) -> serde_json::Value {
        block_on(background.accept_message(message).expect("message should be answered"))
    }

    #[test]
    fn test_check_closed_tabs_message() {
        let background = Rc::new(Background::new(FakeHost::new().with_closed_tab("s1")));

        let response = answer(&background, json!({"action": "checkClosedTabs"}));

        assert_eq!(response, json!({"hasClosedTabs": true}));
    }

    #[test]
    fn test_check_closed_tabs_message_without_history() {
        let background = Rc::new(Background::new(FakeHost::new()));

        let response = answer(&background, json!({"action": "checkClosedTabs"}));

        assert_eq!(response, json!({"hasClosedTabs": false}));
    }

    #[test]
    fn test_reopen_message() {
        let background = Rc::new(Background::new(FakeHost::new().with_closed_tab("s1")));

        let response = answer(&background, json!({"action": "reopenClosedTab"}));

        assert_eq!(response, json!({"success": true}));
        assert_eq!(background.host().calls(), vec![Call::Restore("s1".to_string())]);

        let response = answer(&background, json!({"action": "reopenClosedTab"}));
        assert_eq!(response, json!({"success": false}));
    }

    #[test]
    fn test_unknown_message_gets_no_answer() {
        let background = Rc::new(Background::new(FakeHost::new()));

        assert!(background.accept_message(json!({"action": "sortTabs"})).is_none());
        assert!(background.accept_message(json!("hello")).is_none());
    }

    #[test]
    fn test_attach_registers_and_releases() {
        let background = Rc::new(Background::new(FakeHost::new()));

        let subscription = background.attach();
        assert_eq!(background.host().listener_count(), 1);
        background.host().emit(HostEvent::TabRemoved { tab_id: 4 });

        drop(subscription);
        assert_eq!(background.host().listener_count(), 0);
    }

    #[test]
    fn test_describe_event() {
        assert_eq!(
            describe_event(&HostEvent::TabUpdated {
                tab_id: 1,
                status: Some("complete".to_string()),
                url: Some("https://docs.rs/".to_string()),
            }),
            Some("Tab updated: https://docs.rs/".to_string())
        );
        assert_eq!(
            describe_event(&HostEvent::TabUpdated {
                tab_id: 1,
                status: Some("loading".to_string()),
                url: Some("https://docs.rs/".to_string()),
            }),
            None
        );
        assert_eq!(describe_event(&HostEvent::WindowFocusChanged { window_id: None }), None);
        assert_eq!(
            describe_event(&HostEvent::WindowFocusChanged { window_id: Some(2) }),
            Some("Window focused: 2".to_string())
        );
        assert_eq!(
            describe_event(&HostEvent::TabCreated { tab_id: Some(7) }),
            Some("Tab created: 7".to_string())
        );
        assert_eq!(describe_event(&HostEvent::GroupMoved { group_id: 1 }), None);
    }
}
