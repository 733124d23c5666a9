/// Side panel UI: the window's tabs, grouped the way the browser groups them

use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::controller::RowClick;
use crate::ui::components::{BookmarkIcon, ReopenIcon, SettingsIcon, SnapshotView};
use crate::ui::{apply_saved_theme, use_controller};

#[function_component(SidePanel)]
pub fn side_panel() -> Html {
    let controller = use_controller();

    use_effect_with((), |_| apply_saved_theme());

    let on_click = {
        let controller = controller.clone();
        Callback::from(move |(tab_id, click): (i32, RowClick)| {
            let controller = controller.clone();
            spawn_local(async move { controller.row_clicked(tab_id, click).await });
        })
    };

    let on_toggle = {
        let controller = controller.clone();
        Callback::from(move |group_id: i32| controller.toggle_group(group_id))
    };

    let on_bookmarks = {
        let controller = controller.clone();
        Callback::from(move |_: MouseEvent| {
            let controller = controller.clone();
            spawn_local(async move { controller.open_bookmarks_manager().await });
        })
    };

    let on_reopen = {
        let controller = controller.clone();
        Callback::from(move |_: MouseEvent| {
            let controller = controller.clone();
            spawn_local(async move { controller.reopen_last_closed().await });
        })
    };

    let on_settings = {
        let controller = controller.clone();
        Callback::from(move |_: MouseEvent| {
            let controller = controller.clone();
            spawn_local(async move { controller.open_settings_page().await });
        })
    };

    let snapshot = controller.snapshot();

    html! {
        <div class="app">
            <div class="tabs-container">
                <SnapshotView {snapshot} {on_toggle} {on_click} />
            </div>
            <footer class="app-footer">
                <button class="bookmarks-btn" onclick={on_bookmarks} title="Bookmarks">
                    <BookmarkIcon />
                </button>
                <div class="footer-right">
                    if controller.has_closed_tabs() {
                        <button class="reopen-btn" onclick={on_reopen} title="Reopen closed tab">
                            <ReopenIcon />
                        </button>
                    }
                    <button class="settings-btn" onclick={on_settings} title="Settings">
                        <SettingsIcon />
                    </button>
                </div>
            </footer>
        </div>
    }
}
