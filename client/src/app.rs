use leptos::prelude::*;
use wasm_bindgen::JsCast;

use std::cell::RefCell;

use techmap_shared::labels;

use crate::controller::{AppState, Command, Msg};
use crate::fetch;
use crate::map::MapView;
use crate::page_config;
use crate::sidebar::Sidebar;
use crate::viewport::Viewport;

pub(crate) const SIDEBAR_WIDTH: f64 = 340.0;

struct KeydownBinding {
    window: web_sys::Window,
    handler: wasm_bindgen::closure::Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

/// Routes UI messages into [`AppState`] and publishes the result.
///
/// `revision` is bumped after every dispatch; anything reading state through
/// [`Dispatcher::with_state`] re-runs on the next revision.
#[derive(Clone, Copy)]
pub(crate) struct Dispatcher {
    state: StoredValue<AppState>,
    revision: RwSignal<u64>,
    viewport: RwSignal<Viewport>,
}

impl Dispatcher {
    pub fn send(&self, msg: Msg) {
        let Some(commands) = self.state.try_update_value(|state| state.dispatch(msg)) else {
            return;
        };
        for command in commands {
            match command {
                Command::CenterOn { position, zoom } => {
                    self.viewport.update(|vp| vp.set_view(position, zoom));
                }
            }
        }
        self.revision.update(|r| *r = r.wrapping_add(1));
    }

    /// Subscribe the current reactive scope to state changes.
    pub fn track(&self) {
        self.revision.track();
    }

    /// Tracked read of application state.
    pub fn with_state<U>(&self, f: impl FnOnce(&AppState) -> U) -> U {
        self.revision.track();
        self.state.with_value(f)
    }

    pub fn with_state_untracked<U>(&self, f: impl FnOnce(&AppState) -> U) -> U {
        self.state.with_value(f)
    }
}

#[component]
pub fn App() -> impl IntoView {
    let config = page_config::read_map_config();
    let viewport: RwSignal<Viewport> = RwSignal::new(Viewport::new(config.center(), config.zoom()));
    let dispatcher = Dispatcher {
        state: StoredValue::new(AppState::new(config.selected_company_id)),
        revision: RwSignal::new(0),
        viewport,
    };

    provide_context(viewport);
    provide_context(dispatcher);

    let api_url = config.api_url.clone();
    Effect::new(move || {
        fetch::load_dataset(api_url.clone(), dispatcher);
    });

    // Escape closes the popup; +/- zoom around the map center.
    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(old) = KEYDOWN_BINDING.with(|slot| slot.borrow_mut().take()) {
            let _ = old.window.remove_event_listener_with_callback(
                "keydown",
                old.handler.as_ref().unchecked_ref(),
            );
        }

        let handler = wasm_bindgen::closure::Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(
            move |e: web_sys::KeyboardEvent| {
                let typing = e
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
                    .is_some();
                match e.key().as_str() {
                    "Escape" => dispatcher.send(Msg::ClosePopup),
                    "+" | "=" if !typing => viewport.update(|vp| {
                        let (cx, cy) = (vp.width / 2.0, vp.height / 2.0);
                        vp.zoom_at(-500.0, cx, cy);
                    }),
                    "-" if !typing => viewport.update(|vp| {
                        let (cx, cy) = (vp.width / 2.0, vp.height / 2.0);
                        vp.zoom_at(500.0, cx, cy);
                    }),
                    _ => {}
                }
            },
        );

        if window
            .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            KEYDOWN_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(KeydownBinding {
                    window: window.clone(),
                    handler,
                });
            });
        }
    });

    let sidebar_hidden = move || dispatcher.with_state(|s| s.sidebar_hidden());

    view! {
        <div style="width: 100%; height: 100%; position: relative; display: flex; font-family: 'Inter', system-ui, sans-serif;">
            <div style="flex: 1; height: 100%; position: relative; overflow: hidden; background: #dfe3e8;">
                <MapView />
                <ErrorBanner />
                <SidebarToggle />
            </div>
            <div
                id="side-panel"
                class="side-panel"
                class:hidden=sidebar_hidden
                style=move || {
                    let width = if sidebar_hidden() { 0.0 } else { SIDEBAR_WIDTH };
                    format!("width: {width}px; height: 100%; overflow: hidden; flex-shrink: 0; transition: width 0.2s ease; background: #13161f; border-left: 1px solid #282c3e;")
                }
            >
                <Sidebar />
            </div>
        </div>
    }
}

/// Shows or hides the list panel. Lives on the map so it stays reachable
/// while the panel is collapsed.
#[component]
fn SidebarToggle() -> impl IntoView {
    let dispatcher: Dispatcher = expect_context();
    let hidden = move || dispatcher.with_state(|s| s.sidebar_hidden());

    view! {
        <button
            id="toggle-sidebar"
            title=move || if hidden() { labels::SHOW_SIDEBAR } else { labels::HIDE_SIDEBAR }
            style="position: absolute; top: 16px; right: 16px; z-index: 11; width: 32px; height: 32px; background: #13161f; border: 1px solid #282c3e; border-radius: 6px; cursor: pointer; display: flex; align-items: center; justify-content: center; transition: border-color 0.15s, color 0.15s; color: #9a98a0; font-size: 1.1rem; line-height: 1;"
            on:click=move |_| dispatcher.send(Msg::ToggleSidebar)
            on:mouseenter=move |e| {
                if let Some(el) = e.target().and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok()) {
                    el.style().set_property("border-color", "rgba(80,160,245,0.5)").ok();
                    el.style().set_property("color", "#e2e0d8").ok();
                }
            }
            on:mouseleave=move |e| {
                if let Some(el) = e.target().and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok()) {
                    el.style().set_property("border-color", "#282c3e").ok();
                    el.style().set_property("color", "#9a98a0").ok();
                }
            }
        >
            {move || if hidden() { "\u{00AB}" } else { "\u{00BB}" }}
        </button>
    }
}

/// Visible notice when the dataset could not be loaded.
#[component]
fn ErrorBanner() -> impl IntoView {
    let dispatcher: Dispatcher = expect_context();

    move || {
        let Some(message) = dispatcher.with_state(|s| s.error_message()) else {
            return ().into_any();
        };
        view! {
            <div
                class="alert alert-danger"
                role="alert"
                style="position: absolute; top: 16px; left: 50%; transform: translateX(-50%); z-index: 12; max-width: 80%; padding: 10px 16px; background: #3a1418; border: 1px solid #a8323e; border-radius: 6px; color: #f3d6d9; font-size: 0.85rem; box-shadow: 0 4px 12px rgba(0,0,0,0.3);"
            >
                {message}
            </div>
        }
        .into_any()
    }
}
