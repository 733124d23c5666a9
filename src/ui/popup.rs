/// Popup UI: a flat list of the window's tabs in strip order

use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::controller::RowClick;
use crate::ui::components::{EmptyState, TabList};
use crate::ui::{apply_saved_theme, use_controller};

#[function_component(App)]
pub fn app() -> Html {
    let controller = use_controller();

    use_effect_with((), |_| apply_saved_theme());

    let on_click = {
        let controller = controller.clone();
        Callback::from(move |(tab_id, click): (i32, RowClick)| {
            let controller = controller.clone();
            spawn_local(async move { controller.row_clicked(tab_id, click).await });
        })
    };

    let on_settings = {
        let controller = controller.clone();
        Callback::from(move |_: MouseEvent| {
            let controller = controller.clone();
            spawn_local(async move { controller.open_settings_page().await });
        })
    };

    let tabs = controller.snapshot().tabs_in_order();

    html! {
        <div class="app">
            <header class="app-header">
                <h1>{"StayLane"}</h1>
                <Button onclick={on_settings} variant={ButtonVariant::Secondary}>
                    {"⚙️"}
                </Button>
            </header>
            <div class="tabs-container">
                if tabs.is_empty() {
                    <EmptyState />
                } else {
                    <TabList {tabs} {on_click} />
                }
            </div>
        </div>
    }
}
