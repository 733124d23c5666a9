/// UI module exports
use std::rc::Rc;

use log::{error, warn};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::chrome::ChromeHost;
use crate::controller::ViewController;
use crate::storage::{SettingsStore, Theme};

pub mod components;
pub mod options;
pub mod popup;
pub mod sidepanel;

/// A controller bound to the browser for the lifetime of the component.
/// Re-renders whenever the controller's state changes.
#[hook]
pub fn use_controller() -> Rc<ViewController<ChromeHost>> {
    let controller = use_memo((), |_| ViewController::new(ChromeHost::new()));
    let update = use_force_update();

    {
        let controller = controller.clone();
        use_effect_with((), move |_| {
            controller.set_on_change(move || update.force_update());
            let subscription = controller.attach(|future| spawn_local(future));
            move || drop(subscription)
        });
    }

    controller
}

pub fn apply_theme(theme: Theme) {
    let root = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.document_element());

    match root {
        Some(root) => {
            if let Err(e) = root.set_attribute("data-theme", theme.as_str()) {
                warn!("Failed to apply theme: {:?}", e);
            }
        }
        None => warn!("No document to apply the theme to"),
    }
}

/// Apply the persisted theme once settings load.
pub fn apply_saved_theme() {
    spawn_local(async move {
        let host = ChromeHost::new();
        match SettingsStore::new(&host).load().await {
            Ok(settings) => apply_theme(settings.theme),
            Err(e) => error!("Failed to load settings: {}", e),
        }
    });
}
