/// StayLane - Chrome side panel for tab groups
/// Built with Rust + WASM + Yew

pub mod background;
pub mod chrome;
pub mod closed_tabs;
pub mod controller;
pub mod domain;
pub mod host;
pub mod messages;
pub mod operations;
pub mod snapshot;
pub mod storage;
pub mod tab_data;
pub mod ui;

#[cfg(test)]
mod fake_host;

use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::background::Background;
use crate::chrome::ChromeHost;
use crate::host::Subscription;

thread_local! {
    // listeners registered by the background worker, alive until it stops
    static BACKGROUND_LISTENERS: RefCell<Vec<Subscription>> = const { RefCell::new(Vec::new()) };
    static BACKGROUND: RefCell<Option<Rc<Background<ChromeHost>>>> = const { RefCell::new(None) };
}

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export the row subtitle formatting for JavaScript access
#[wasm_bindgen]
pub fn hostname_label(url: &str) -> String {
    domain::display_hostname(url)
}

#[wasm_bindgen]
pub fn start_sidepanel() {
    yew::Renderer::<ui::sidepanel::SidePanel>::new().render();
}

#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

#[wasm_bindgen]
pub fn start_options() {
    yew::Renderer::<ui::options::OptionsPage>::new().render();
}

#[wasm_bindgen]
pub fn start_background() {
    info!("StayLane background worker started");

    let host = ChromeHost::new();
    let background = Rc::new(Background::new(host));

    let mut listeners = vec![background.attach()];

    let on_command = background.clone();
    listeners.push(host.on_command(move |command, tab| {
        if let Some(pending) = on_command.on_command(&command, tab.as_ref()) {
            spawn_local(pending);
        }
    }));

    let on_lifecycle = background.clone();
    listeners.push(host.on_lifecycle(move || {
        let background = on_lifecycle.clone();
        spawn_local(async move { background.configure_panel().await });
    }));

    let on_message = background.clone();
    listeners.push(host.on_message(move |message| on_message.accept_message(message)));

    // onInstalled may have fired before this module finished loading
    let configure = background.clone();
    spawn_local(async move { configure.configure_panel().await });

    BACKGROUND_LISTENERS.with(|kept| kept.borrow_mut().extend(listeners));
    BACKGROUND.with(|kept| *kept.borrow_mut() = Some(background));
}

/// Answer a message the worker's loader held on to while this module was
/// loading. Returns whether `send_response` will be called.
#[wasm_bindgen]
pub fn answer_background_message(message: JsValue, send_response: JsValue) -> bool {
    let Some(background) = BACKGROUND.with(|kept| kept.borrow().clone()) else {
        warn!("Message arrived before the background worker started");
        return false;
    };
    chrome::answer_message(
        &|message: serde_json::Value| background.accept_message(message),
        message,
        send_response,
    )
}
