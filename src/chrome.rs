//! `chrome.*` bindings implementing the host seam.

use std::rc::Rc;

use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use js_sys::{Function, Object, Promise, Reflect};
use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use wasm_bindgen::closure::WasmClosure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};

use crate::host::{HostError, HostEvent, Listener, PanelHost, PanelTarget, Subscription, TabHost};
use crate::messages::BackgroundRequest;
use crate::tab_data::{ClosedEntry, RawGroup, RawTab, WINDOW_ID_NONE};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "windows"], js_name = getCurrent)]
    async fn windows_get_current() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = query)]
    async fn tabs_query(query_info: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = update)]
    async fn tabs_update(tab_id: i32, update_properties: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = remove)]
    async fn tabs_remove(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = create)]
    async fn tabs_create(create_properties: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabGroups"], js_name = get)]
    async fn tab_groups_get(group_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "sessions"], js_name = getRecentlyClosed)]
    async fn sessions_get_recently_closed(filter: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "sessions"], js_name = restore)]
    async fn sessions_restore(session_id: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = get)]
    async fn storage_sync_get(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = set)]
    async fn storage_sync_set(items: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime"], js_name = sendMessage)]
    async fn runtime_send_message(message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime"], js_name = openOptionsPage)]
    async fn runtime_open_options_page() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "sidePanel"], js_name = setPanelBehavior)]
    async fn side_panel_set_panel_behavior(behavior: JsValue) -> Result<JsValue, JsValue>;

    // Deliberately not async: the open request has to leave before we yield.
    #[wasm_bindgen(catch, js_namespace = ["chrome", "sidePanel"], js_name = open)]
    fn side_panel_open(options: JsValue) -> Result<Promise, JsValue>;

    /// A `chrome.events.Event`.
    type ChromeEvent;

    #[wasm_bindgen(method, js_name = addListener)]
    fn add_listener(this: &ChromeEvent, callback: &Function);

    #[wasm_bindgen(method, js_name = removeListener)]
    fn remove_listener(this: &ChromeEvent, callback: &Function);
}

/// The real browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeHost;

impl ChromeHost {
    pub fn new() -> ChromeHost {
        ChromeHost
    }

    /// `chrome.commands.onCommand`, with the tab the command fired in.
    pub fn on_command(&self, mut handler: impl FnMut(String, Option<RawTab>) + 'static) -> Subscription {
        let closure = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |command: JsValue, tab: JsValue| {
            let command = command.as_string().unwrap_or_default();
            let tab = if tab.is_undefined() || tab.is_null() {
                None
            } else {
                from_js::<RawTab>(tab, "command tab").ok()
            };
            handler(command, tab);
        });
        listen("commands", "onCommand", closure)
    }

    /// Fires on extension install/update and on browser startup.
    pub fn on_lifecycle(&self, handler: impl Fn() + 'static) -> Subscription {
        let handler = Rc::new(handler);

        let on_installed = handler.clone();
        let installed = listen(
            "runtime",
            "onInstalled",
            Closure::<dyn FnMut(JsValue)>::new(move |_details: JsValue| on_installed()),
        );
        let startup = listen(
            "runtime",
            "onStartup",
            Closure::<dyn FnMut()>::new(move || handler()),
        );

        Subscription::new(move || {
            drop(installed);
            drop(startup);
        })
    }

    /// `chrome.runtime.onMessage`. `accept` decides synchronously whether a
    /// message gets an answer; the answer itself may arrive later.
    pub fn on_message<F>(&self, accept: F) -> Subscription
    where
        F: Fn(serde_json::Value) -> Option<LocalBoxFuture<'static, serde_json::Value>> + 'static,
    {
        let closure = Closure::<dyn FnMut(JsValue, JsValue, JsValue) -> bool>::new(
            move |message: JsValue, _sender: JsValue, send_response: JsValue| {
                answer_message(&accept, message, send_response)
            },
        );
        listen("runtime", "onMessage", closure)
    }
}

/// Answer one `onMessage` delivery. Returns `true` when `send_response` will
/// be called later, which keeps the sender's channel open until then.
pub fn answer_message<F>(accept: &F, message: JsValue, send_response: JsValue) -> bool
where
    F: Fn(serde_json::Value) -> Option<LocalBoxFuture<'static, serde_json::Value>>,
{
    let message = match from_js::<serde_json::Value>(message, "message") {
        Ok(message) => message,
        Err(e) => {
            debug!("Ignoring message: {}", e);
            return false;
        }
    };
    let Some(pending) = accept(message) else {
        return false;
    };

    let send_response: Function = send_response.unchecked_into();
    spawn_local(async move {
        let response = pending.await;
        match to_js(&response, "message response") {
            Ok(response) => {
                if let Err(e) = send_response.call1(&JsValue::NULL, &response) {
                    error!("Failed to answer message: {}", describe_js_error(&e));
                }
            }
            Err(e) => error!("Failed to answer message: {}", e),
        }
    });

    true
}

#[derive(Deserialize)]
struct WindowInfo {
    id: Option<i32>,
}

#[async_trait(?Send)]
impl TabHost for ChromeHost {
    async fn current_window_id(&self) -> Result<i32, HostError> {
        let window = windows_get_current()
            .await
            .map_err(|e| rejected("windows.getCurrent", e))?;
        from_js::<WindowInfo>(window, "window")?
            .id
            .ok_or_else(|| HostError::decode("window", "current window has no id"))
    }

    async fn query_tabs(&self, window_id: i32) -> Result<Vec<RawTab>, HostError> {
        let query = to_js(&json!({ "windowId": window_id }), "tab query")?;
        let tabs = tabs_query(query).await.map_err(|e| rejected("tabs.query", e))?;
        from_js(tabs, "tabs")
    }

    async fn get_group(&self, group_id: i32) -> Result<RawGroup, HostError> {
        let group = tab_groups_get(group_id)
            .await
            .map_err(|e| rejected("tabGroups.get", e))?;
        from_js(group, "tab group")
    }

    async fn activate_tab(&self, tab_id: i32) -> Result<(), HostError> {
        let properties = to_js(&json!({ "active": true }), "tab update")?;
        tabs_update(tab_id, properties)
            .await
            .map(|_| ())
            .map_err(|e| rejected("tabs.update", e))
    }

    async fn remove_tab(&self, tab_id: i32) -> Result<(), HostError> {
        tabs_remove(tab_id)
            .await
            .map(|_| ())
            .map_err(|e| rejected("tabs.remove", e))
    }

    async fn create_tab(&self, url: &str) -> Result<(), HostError> {
        let properties = to_js(&json!({ "url": url }), "tab properties")?;
        tabs_create(properties)
            .await
            .map(|_| ())
            .map_err(|e| rejected("tabs.create", e))
    }

    fn sessions_available(&self) -> bool {
        chrome_namespace("sessions").is_some()
    }

    async fn recently_closed(&self, max_results: u32) -> Result<Vec<ClosedEntry>, HostError> {
        if !self.sessions_available() {
            return Err(HostError::Unavailable("chrome.sessions"));
        }
        let filter = to_js(&json!({ "maxResults": max_results }), "session filter")?;
        let sessions = sessions_get_recently_closed(filter)
            .await
            .map_err(|e| rejected("sessions.getRecentlyClosed", e))?;
        from_js(sessions, "sessions")
    }

    async fn restore_session(&self, session_id: &str) -> Result<(), HostError> {
        sessions_restore(session_id)
            .await
            .map(|_| ())
            .map_err(|e| rejected("sessions.restore", e))
    }

    async fn storage_get(&self, key: &str) -> Result<Option<serde_json::Value>, HostError> {
        let keys = to_js(&[key], "storage keys")?;
        let items = storage_sync_get(keys)
            .await
            .map_err(|e| rejected("storage.sync.get", e))?;

        let value = Reflect::get(&items, &JsValue::from_str(key))
            .map_err(|e| rejected("storage.sync.get", e))?;
        if value.is_undefined() || value.is_null() {
            return Ok(None);
        }
        from_js(value, "stored value").map(Some)
    }

    async fn storage_set(&self, key: &str, value: serde_json::Value) -> Result<(), HostError> {
        let items = Object::new();
        Reflect::set(&items, &JsValue::from_str(key), &to_js(&value, "stored value")?)
            .map_err(|e| rejected("storage.sync.set", e))?;
        storage_sync_set(items.into())
            .await
            .map(|_| ())
            .map_err(|e| rejected("storage.sync.set", e))
    }

    async fn send_message(
        &self,
        request: &BackgroundRequest,
    ) -> Result<serde_json::Value, HostError> {
        let message = to_js(request, "message")?;
        let response = runtime_send_message(message)
            .await
            .map_err(|e| rejected("runtime.sendMessage", e))?;
        from_js(response, "message response")
    }

    async fn open_options_page(&self) -> Result<(), HostError> {
        runtime_open_options_page()
            .await
            .map(|_| ())
            .map_err(|e| rejected("runtime.openOptionsPage", e))
    }

    async fn sleep(&self, millis: u32) {
        let promise = Promise::new(&mut |resolve, _reject| {
            let global = js_sys::global();
            let set_timeout = Reflect::get(&global, &JsValue::from_str("setTimeout"))
                .ok()
                .and_then(|f| f.dyn_into::<Function>().ok());
            let scheduled = match set_timeout {
                Some(set_timeout) => set_timeout.call2(&global, &resolve, &JsValue::from(millis)),
                None => resolve.call0(&JsValue::NULL),
            };
            if let Err(e) = scheduled {
                warn!("setTimeout failed: {}", describe_js_error(&e));
            }
        });
        let _ = JsFuture::from(promise).await;
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        let subscriptions: Vec<Subscription> = EventSource::ALL
            .into_iter()
            .map(|source| {
                let listener = listener.clone();
                let closure = Closure::<dyn FnMut(JsValue, JsValue, JsValue)>::new(
                    move |first: JsValue, second: JsValue, third: JsValue| {
                        if let Some(event) = source.decode(&first, &second, &third) {
                            listener(event);
                        }
                    },
                );
                let (namespace, name) = source.path();
                listen(namespace, name, closure)
            })
            .collect();

        Subscription::new(move || drop(subscriptions))
    }
}

#[async_trait(?Send)]
impl PanelHost for ChromeHost {
    fn open_panel(&self, target: PanelTarget) -> LocalBoxFuture<'static, Result<(), HostError>> {
        let options = match target {
            PanelTarget::Window(window_id) => json!({ "windowId": window_id }),
            PanelTarget::Tab(tab_id) => json!({ "tabId": tab_id }),
        };
        let issued = to_js(&options, "panel options")
            .and_then(|options| side_panel_open(options).map_err(|e| rejected("sidePanel.open", e)));

        async move {
            let promise = issued?;
            JsFuture::from(promise)
                .await
                .map(|_| ())
                .map_err(|e| rejected("sidePanel.open", e))
        }
        .boxed_local()
    }

    async fn enable_panel_on_action_click(&self) -> Result<(), HostError> {
        let behavior = to_js(&json!({ "openPanelOnActionClick": true }), "panel behavior")?;
        side_panel_set_panel_behavior(behavior)
            .await
            .map(|_| ())
            .map_err(|e| rejected("sidePanel.setPanelBehavior", e))
    }
}

/// The host events the panel refreshes on.
#[derive(Debug, Clone, Copy)]
enum EventSource {
    TabCreated,
    TabUpdated,
    TabRemoved,
    TabActivated,
    WindowFocusChanged,
    GroupUpdated,
    GroupMoved,
}

impl EventSource {
    const ALL: [EventSource; 7] = [
        EventSource::TabCreated,
        EventSource::TabUpdated,
        EventSource::TabRemoved,
        EventSource::TabActivated,
        EventSource::WindowFocusChanged,
        EventSource::GroupUpdated,
        EventSource::GroupMoved,
    ];

    fn path(self) -> (&'static str, &'static str) {
        match self {
            EventSource::TabCreated => ("tabs", "onCreated"),
            EventSource::TabUpdated => ("tabs", "onUpdated"),
            EventSource::TabRemoved => ("tabs", "onRemoved"),
            EventSource::TabActivated => ("tabs", "onActivated"),
            EventSource::WindowFocusChanged => ("windows", "onFocusChanged"),
            EventSource::GroupUpdated => ("tabGroups", "onUpdated"),
            EventSource::GroupMoved => ("tabGroups", "onMoved"),
        }
    }

    fn decode(self, first: &JsValue, second: &JsValue, third: &JsValue) -> Option<HostEvent> {
        let event = match self {
            EventSource::TabCreated => HostEvent::TabCreated {
                tab_id: int_field(first, "id"),
            },
            EventSource::TabUpdated => HostEvent::TabUpdated {
                tab_id: as_int(first)?,
                status: string_field(second, "status"),
                url: string_field(third, "url"),
            },
            EventSource::TabRemoved => HostEvent::TabRemoved {
                tab_id: as_int(first)?,
            },
            EventSource::TabActivated => HostEvent::TabActivated {
                tab_id: int_field(first, "tabId")?,
            },
            EventSource::WindowFocusChanged => HostEvent::WindowFocusChanged {
                window_id: as_int(first).filter(|&id| id != WINDOW_ID_NONE),
            },
            EventSource::GroupUpdated => HostEvent::GroupUpdated {
                group_id: int_field(first, "id")?,
            },
            EventSource::GroupMoved => HostEvent::GroupMoved {
                group_id: int_field(first, "id")?,
            },
        };
        Some(event)
    }
}

fn as_int(value: &JsValue) -> Option<i32> {
    value.as_f64().map(|n| n as i32)
}

fn field(object: &JsValue, name: &str) -> Option<JsValue> {
    if !object.is_object() {
        return None;
    }
    Reflect::get(object, &JsValue::from_str(name)).ok()
}

fn int_field(object: &JsValue, name: &str) -> Option<i32> {
    field(object, name).as_ref().and_then(as_int)
}

fn string_field(object: &JsValue, name: &str) -> Option<String> {
    field(object, name).and_then(|value| value.as_string())
}

fn chrome_namespace(name: &str) -> Option<JsValue> {
    let chrome = Reflect::get(&js_sys::global(), &JsValue::from_str("chrome")).ok()?;
    let namespace = field(&chrome, name)?;
    if namespace.is_undefined() || namespace.is_null() {
        None
    } else {
        Some(namespace)
    }
}

/// Register `closure` on `chrome.<namespace>.<name>`; the guard removes it.
fn listen<T>(namespace: &str, name: &str, closure: Closure<T>) -> Subscription
where
    T: ?Sized + WasmClosure + 'static,
{
    let event = chrome_namespace(namespace).and_then(|ns| field(&ns, name));
    let Some(event) = event.filter(|event| event.is_object()) else {
        warn!("chrome.{}.{} is unavailable here", namespace, name);
        return Subscription::empty();
    };

    let event: ChromeEvent = event.unchecked_into();
    event.add_listener(closure.as_ref().unchecked_ref());

    Subscription::new(move || {
        event.remove_listener(closure.as_ref().unchecked_ref());
        drop(closure);
    })
}

fn to_js<T: Serialize + ?Sized>(value: &T, what: &'static str) -> Result<JsValue, HostError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| HostError::decode(what, e.to_string()))
}

fn from_js<T: DeserializeOwned>(value: JsValue, what: &'static str) -> Result<T, HostError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| HostError::decode(what, e.to_string()))
}

fn rejected(call: &'static str, error: JsValue) -> HostError {
    HostError::rejected(call, describe_js_error(&error))
}

fn describe_js_error(error: &JsValue) -> String {
    error
        .as_string()
        .or_else(|| string_field(error, "message"))
        .unwrap_or_else(|| format!("{:?}", error))
}
