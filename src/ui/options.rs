/// Options page UI

use log::error;
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::chrome::ChromeHost;
use crate::storage::{Settings, SettingsChange, SettingsStore, SettingsWriter, Theme};
use crate::ui::apply_theme;

#[derive(Clone, PartialEq)]
enum PageState {
    Loading,
    Ready,
    Error(String),
}

#[function_component(OptionsPage)]
pub fn options_page() -> Html {
    let settings = use_state(Settings::default);
    let state = use_state(|| PageState::Loading);
    let writer = use_memo((), |_| SettingsWriter::new());

    {
        let settings = settings.clone();
        let state = state.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let host = ChromeHost::new();
                match SettingsStore::new(&host).load().await {
                    Ok(loaded) => {
                        apply_theme(loaded.theme);
                        settings.set(loaded);
                        state.set(PageState::Ready);
                    }
                    Err(e) => {
                        error!("Failed to load settings: {}", e);
                        state.set(PageState::Error(format!("Failed to load settings: {}", e)));
                    }
                }
            });
        });
    }

    let apply = {
        let settings = settings.clone();
        let state = state.clone();
        Callback::from(move |change: SettingsChange| {
            let settings = settings.clone();
            let state = state.clone();
            let writer = writer.clone();
            spawn_local(async move {
                match writer.write(&ChromeHost::new(), change).await {
                    Ok(saved) => {
                        apply_theme(saved.theme);
                        settings.set(saved);
                        state.set(PageState::Ready);
                    }
                    Err(e) => {
                        error!("Failed to save settings: {}", e);
                        state.set(PageState::Error(format!("Failed to save settings: {}", e)));
                    }
                }
            });
        })
    };

    let on_vertical_tabs = apply.reform(|_: Event| SettingsChange::ToggleVerticalTabs);
    let on_window_management = apply.reform(|_: Event| SettingsChange::ToggleWindowManagement);

    let theme_button = |theme: Theme, label: &'static str| {
        let variant = if settings.theme == theme {
            ButtonVariant::Primary
        } else {
            ButtonVariant::Secondary
        };
        let onclick = apply.reform(move |_: MouseEvent| SettingsChange::Theme(theme));
        html! {
            <Button {onclick} {variant}>{label}</Button>
        }
    };

    html! {
        <div class="options">
            <h1>{"StayLane Settings"}</h1>

            {match &*state {
                PageState::Loading => html! { <Spinner /> },
                PageState::Error(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
                PageState::Ready => html! {},
            }}

            <section class="options-section">
                <h2>{"General"}</h2>
                <label class="option-row">
                    <input
                        type="checkbox"
                        checked={settings.vertical_tabs_enabled}
                        onchange={on_vertical_tabs}
                    />
                    {"Vertical tabs"}
                </label>
                <label class="option-row">
                    <input
                        type="checkbox"
                        checked={settings.window_management_enabled}
                        onchange={on_window_management}
                    />
                    {"Window management"}
                </label>
            </section>

            <section class="options-section">
                <h2>{"Appearance"}</h2>
                <div class="theme-buttons">
                    {theme_button(Theme::Light, "Light")}
                    {theme_button(Theme::Dark, "Dark")}
                </div>
            </section>
        </div>
    }
}
