/// Reusable UI components

use yew::prelude::*;

use crate::controller::RowClick;
use crate::domain::{display_hostname, EMPTY_STATE_LABEL};
use crate::tab_data::{Snapshot, Tab, TabGroup};

#[derive(Properties, PartialEq)]
pub struct TabRowProps {
    pub tab: Tab,
    pub on_click: Callback<(i32, RowClick)>,
}

#[function_component(TabRow)]
pub fn tab_row(props: &TabRowProps) -> Html {
    let tab = &props.tab;
    let tab_id = tab.id;

    let on_select = props.on_click.reform(move |_: MouseEvent| (tab_id, RowClick::Row));

    let on_close = {
        let on_click = props.on_click.clone();
        Callback::from(move |e: MouseEvent| {
            // a close click must never reach the row's select handler
            e.stop_propagation();
            on_click.emit((tab_id, RowClick::CloseButton));
        })
    };

    html! {
        <div class={classes!("tab-item", tab.active.then_some("active"))} onclick={on_select}>
            <div class="tab-icon">
                if let Some(icon) = &tab.fav_icon_url {
                    <img src={icon.clone()} alt="" />
                } else {
                    <span>{"📄"}</span>
                }
            </div>
            <div class="tab-content">
                <div class="tab-title">{&tab.title}</div>
                <div class="tab-url">{display_hostname(&tab.url)}</div>
            </div>
            <button class="tab-close" onclick={on_close} title="Close">
                {"×"}
            </button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct TabListProps {
    pub tabs: Vec<Tab>,
    pub on_click: Callback<(i32, RowClick)>,
}

#[function_component(TabList)]
pub fn tab_list(props: &TabListProps) -> Html {
    html! {
        {for props.tabs.iter().map(|tab| html! {
            <TabRow key={tab.id.to_string()} tab={tab.clone()} on_click={props.on_click.clone()} />
        })}
    }
}

#[derive(Properties, PartialEq)]
pub struct GroupSectionProps {
    pub group: TabGroup,
    pub on_toggle: Callback<i32>,
    pub on_click: Callback<(i32, RowClick)>,
}

#[function_component(GroupSection)]
pub fn group_section(props: &GroupSectionProps) -> Html {
    let group = &props.group;
    let group_id = group.id;
    let on_toggle = props.on_toggle.reform(move |_: MouseEvent| group_id);

    html! {
        <div class="tab-group" data-color={group.color.name()}>
            <div
                class="tab-group-header"
                onclick={on_toggle}
                style={format!("border-left-color: {};", group.color.hex())}
            >
                <span class="group-toggle">{if group.collapsed { "▶" } else { "▼" }}</span>
                <span class="group-title">{&group.title}</span>
                <span class="group-count">{format!("({})", group.tabs.len())}</span>
            </div>
            if !group.collapsed {
                <div class="tab-group-content">
                    <TabList tabs={group.tabs.clone()} on_click={props.on_click.clone()} />
                </div>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SnapshotViewProps {
    pub snapshot: Snapshot,
    pub on_toggle: Callback<i32>,
    pub on_click: Callback<(i32, RowClick)>,
}

/// Groups first, then ungrouped tabs; the empty-state marker when there are none.
#[function_component(SnapshotView)]
pub fn snapshot_view(props: &SnapshotViewProps) -> Html {
    let snapshot = &props.snapshot;

    if snapshot.is_empty() {
        return html! { <EmptyState /> };
    }

    html! {
        <>
            {for snapshot.groups.iter().map(|group| html! {
                <GroupSection
                    key={group.id.to_string()}
                    group={group.clone()}
                    on_toggle={props.on_toggle.clone()}
                    on_click={props.on_click.clone()}
                />
            })}
            if !snapshot.ungrouped.is_empty() {
                <div class="ungrouped-tabs">
                    <TabList tabs={snapshot.ungrouped.clone()} on_click={props.on_click.clone()} />
                </div>
            }
        </>
    }
}

#[function_component(EmptyState)]
pub fn empty_state() -> Html {
    html! {
        <div class="empty-state">{EMPTY_STATE_LABEL}</div>
    }
}

#[function_component(BookmarkIcon)]
pub fn bookmark_icon() -> Html {
    html! {
        <svg xmlns="http://www.w3.org/2000/svg" width="20" height="20" viewBox="0 0 24 24"
            fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">
            <path d="M19 21l-7-4-7 4V5a2 2 0 0 1 2-2h10a2 2 0 0 1 2 2z" />
        </svg>
    }
}

#[function_component(ReopenIcon)]
pub fn reopen_icon() -> Html {
    html! {
        <svg xmlns="http://www.w3.org/2000/svg" width="20" height="20" viewBox="0 0 24 24"
            fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">
            <path d="M3 12a9 9 0 0 1 9-9 9.75 9.75 0 0 1 6.74 2.74L21 8" />
            <path d="M21 3v5h-5" />
            <path d="M21 12a9 9 0 0 1-9 9 9.75 9.75 0 0 1-6.74-2.74L3 16" />
            <path d="M3 21v-5h5" />
        </svg>
    }
}

#[function_component(SettingsIcon)]
pub fn settings_icon() -> Html {
    html! {
        <svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"
            fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">
            <path d="M9.671 4.136a2.34 2.34 0 0 1 4.659 0 2.34 2.34 0 0 0 3.319 1.915 2.34 2.34 0 0 1 2.33 4.033 2.34 2.34 0 0 0 0 3.831 2.34 2.34 0 0 1-2.33 4.033 2.34 2.34 0 0 0-3.319 1.915 2.34 2.34 0 0 1-4.659 0 2.34 2.34 0 0 0-3.32-1.915 2.34 2.34 0 0 1-2.33-4.033 2.34 2.34 0 0 0 0-3.831A2.34 2.34 0 0 1 6.35 6.051a2.34 2.34 0 0 0 3.319-1.915" />
            <circle cx="12" cy="12" r="3" />
        </svg>
    }
}
