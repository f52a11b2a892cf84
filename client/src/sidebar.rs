use leptos::prelude::*;
use wasm_bindgen::JsCast;

use techmap_shared::colors::rgba_css;
use techmap_shared::{CategoryFilter, labels};

use crate::app::{Dispatcher, SIDEBAR_WIDTH};
use crate::controller::{LoadStatus, Msg};
use crate::list::ListRow;

#[component]
pub fn Sidebar() -> impl IntoView {
    let dispatcher: Dispatcher = expect_context();

    let count = move || dispatcher.with_state(|s| s.list().len());
    let loading = move || dispatcher.with_state(|s| *s.load_status() == LoadStatus::Pending);

    view! {
        <div style=format!("width: {SIDEBAR_WIDTH}px; height: 100%; display: flex; flex-direction: column; color: #e2e0d8;")>
            <div style="padding: 18px 24px 12px; display: flex; align-items: baseline; justify-content: space-between; border-bottom: 1px solid #282c3e;">
                <h2 style="margin: 0; font-size: 1.05rem; font-weight: 600;">"Tech Map"</h2>
                <span style="font-family: 'JetBrains Mono', monospace; font-size: 0.7rem; color: #5a5860;">
                    {move || if loading() { labels::LOADING.to_string() } else { labels::company_count(count()) }}
                </span>
            </div>
            <SearchBar />
            <FilterButtons />
            <CompanyList />
        </div>
    }
}

#[component]
fn SearchBar() -> impl IntoView {
    let dispatcher: Dispatcher = expect_context();

    let on_input = move |e: leptos::ev::Event| {
        let Some(target) = e.target() else {
            return;
        };
        let Ok(input) = target.dyn_into::<web_sys::HtmlInputElement>() else {
            return;
        };
        dispatcher.send(Msg::SetQuery(input.value()));
    };

    view! {
        <div style="padding: 12px 24px; border-bottom: 1px solid #282c3e;">
            <input
                id="search-input"
                style="width: 100%; box-sizing: border-box; padding: 10px 14px; background: #1a1d2a; border: 1px solid #282c3e; border-radius: 6px; color: #e2e0d8; font-size: 0.9rem; outline: none; transition: border-color 0.2s ease;"
                type="text"
                autocomplete="off"
                placeholder=labels::SEARCH_PLACEHOLDER
                prop:value=move || dispatcher.with_state(|s| s.view().query.clone())
                on:input=on_input
                on:focus=|e| {
                    if let Some(el) = e.target().and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok()) {
                        el.style().set_property("border-color", "rgba(80,160,245,0.5)").ok();
                    }
                }
                on:blur=|e| {
                    if let Some(el) = e.target().and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok()) {
                        el.style().set_property("border-color", "#282c3e").ok();
                    }
                }
            />
        </div>
    }
}

/// Mutually exclusive category buttons. Exactly one carries `active`.
#[component]
fn FilterButtons() -> impl IntoView {
    let dispatcher: Dispatcher = expect_context();
    let current = move || dispatcher.with_state(|s| s.view().filter);

    view! {
        <div class="btn-group" role="group" style="display: flex; gap: 6px; padding: 12px 24px; border-bottom: 1px solid #282c3e;">
            {CategoryFilter::ALL
                .into_iter()
                .map(|filter| {
                    let active = move || current() == filter;
                    view! {
                        <button
                            id=filter.control_id()
                            class="btn btn-sm"
                            class:active=active
                            style=move || {
                                if active() {
                                    "flex: 1; padding: 6px 8px; border-radius: 5px; cursor: pointer; font-size: 0.8rem; background: #2563eb; border: 1px solid #2563eb; color: #fff;"
                                } else {
                                    "flex: 1; padding: 6px 8px; border-radius: 5px; cursor: pointer; font-size: 0.8rem; background: transparent; border: 1px solid #282c3e; color: #9a98a0;"
                                }
                            }
                            on:click=move |_| dispatcher.send(Msg::SetFilter(filter))
                        >
                            {filter.label()}
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
}

#[component]
fn CompanyList() -> impl IntoView {
    let dispatcher: Dispatcher = expect_context();

    // Keyed by list generation too, so every projection rebuilds every row.
    let rows = move || {
        dispatcher.with_state(|s| {
            let generation = s.list().generation();
            s.list()
                .rows()
                .iter()
                .cloned()
                .map(|row| (generation, row))
                .collect::<Vec<_>>()
        })
    };
    let placeholder = move || dispatcher.with_state(|s| s.list().placeholder());

    view! {
        <div id="company-list" style="flex: 1; overflow-y: auto; padding: 8px 12px 12px;">
            {move || {
                placeholder().map(|text| view! {
                    <div class="text-muted" style="padding: 24px 12px; text-align: center; color: #5a5860; font-size: 0.85rem;">
                        {text}
                    </div>
                })
            }}
            <For
                each=rows
                key=|(generation, row)| (*generation, row.entity_id)
                children=move |(_, row)| view! { <CompanyRow row=row /> }
            />
        </div>
    }
}

/// One organization. Text is inserted as text nodes, never as markup.
#[component]
fn CompanyRow(row: ListRow) -> impl IntoView {
    let dispatcher: Dispatcher = expect_context();
    let ListRow {
        entity_id,
        name,
        category,
        city,
        badge_color: (r, g, b),
        focusable,
    } = row;

    let cursor = if focusable { "pointer" } else { "default" };
    let on_click = move |_| {
        if focusable {
            dispatcher.send(Msg::FocusEntity(entity_id));
        }
    };
    let selected = move || dispatcher.with_state(|s| s.view().focused == Some(entity_id));

    view! {
        <div
            class="company-item"
            data-company-id=entity_id.to_string()
            style=move || {
                let background = if selected() { "#1f2433" } else { "transparent" };
                format!("padding: 10px 12px; margin-bottom: 4px; border-radius: 6px; cursor: {cursor}; background: {background}; transition: background 0.15s;")
            }
            on:click=on_click
            on:mouseenter=move |e| {
                if let Some(el) = e.target().and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok()) {
                    el.style().set_property("background", "#1a1d2a").ok();
                }
            }
            on:mouseleave=move |e| {
                let focused = dispatcher.with_state_untracked(|s| s.view().focused == Some(entity_id));
                let background = if focused { "#1f2433" } else { "transparent" };
                if let Some(el) = e.target().and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok()) {
                    el.style().set_property("background", background).ok();
                }
            }
        >
            <h6 style="margin: 0 0 4px; font-size: 0.9rem; font-weight: 600; color: #e2e0d8;">{name}</h6>
            <div style="display: flex; align-items: center; gap: 8px; flex-wrap: wrap;">
                <span
                    class="badge"
                    style=format!("padding: 2px 8px; border-radius: 10px; font-size: 0.7rem; background: {}; color: {};", rgba_css(r, g, b, 0.18), rgba_css(r, g, b, 1.0))
                >
                    {category}
                </span>
                {city.map(|city| view! {
                    <small style="font-size: 0.75rem; color: #9a98a0;">{city}</small>
                })}
            </div>
        </div>
    }
}
