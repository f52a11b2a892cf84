use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, PointerEvent, WheelEvent};

use techmap_shared::colors::rgba_css;
use techmap_shared::{EntityId, labels};

use crate::app::Dispatcher;
use crate::controller::Msg;
use crate::markers::{MarkerLayer, PIN_HEAD_OFFSET, PIN_HEAD_RADIUS};
use crate::render_loop::FrameScheduler;
use crate::tiles::{TileCache, TilePlacement, request_tiles, visible_tiles};
use crate::viewport::Viewport;

/// Pointer travel (CSS px) below which a press-release counts as a click.
const CLICK_SLOP: f64 = 5.0;
/// Ancestor levels searched for a stand-in while a tile loads.
const TILE_FALLBACK_LEVELS: u32 = 4;
const BUTTON_ZOOM_DELTA: f64 = 500.0;
const OSM_COPYRIGHT_URL: &str = "https://www.openstreetmap.org/copyright";

struct ResizeBinding {
    window: web_sys::Window,
    handler: wasm_bindgen::closure::Closure<dyn Fn()>,
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, client_x: f64, client_y: f64) -> (f64, f64) {
    canvas_ref
        .get_untracked()
        .map(|el| {
            let rect = el.get_bounding_client_rect();
            (client_x - rect.left(), client_y - rect.top())
        })
        .unwrap_or((client_x, client_y))
}

#[component]
pub fn MapView() -> impl IntoView {
    let viewport: RwSignal<Viewport> = expect_context();
    let dispatcher: Dispatcher = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    let is_dragging = Rc::new(Cell::new(false));
    let drag_start_x = Rc::new(Cell::new(0.0f64));
    let drag_start_y = Rc::new(Cell::new(0.0f64));
    let last_x = Rc::new(Cell::new(0.0f64));
    let last_y = Rc::new(Cell::new(0.0f64));
    let pinch_dist = Rc::new(Cell::new(0.0f64));

    let tile_cache: Rc<RefCell<TileCache>> = Rc::new(RefCell::new(TileCache::default()));
    // Bumped by tile onload callbacks to trigger a repaint.
    let tiles_loaded: RwSignal<u64> = RwSignal::new(0);
    let on_tile_ready: Rc<dyn Fn()> = Rc::new(move || tiles_loaded.update(|n| *n = n.wrapping_add(1)));

    // Cached 2D context (invalidated on canvas resize)
    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));

    let scheduler = FrameScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let canvas: &HtmlCanvasElement = &canvas;
        let Some(parent) = canvas.parent_element() else {
            return;
        };
        let w = parent.client_width() as f64;
        let h = parent.client_height() as f64;
        if w <= 0.0 || h <= 0.0 {
            return;
        }

        let dpr = web_sys::window()
            .map(|window| window.device_pixel_ratio())
            .unwrap_or(1.0)
            .max(1.0);
        let pw = (w * dpr).round() as u32;
        let ph = (h * dpr).round() as u32;
        if canvas.width() != pw || canvas.height() != ph {
            canvas.set_width(pw);
            canvas.set_height(ph);
            *cached_ctx.borrow_mut() = None;
        }
        if viewport.with_untracked(|vp| vp.width != w || vp.height != h) {
            // Size feeds hit-testing and popup placement; the update schedules
            // one more frame with the new size.
            viewport.update(|vp| {
                vp.resize(w, h);
            });
        }

        let ctx = {
            let mut ctx_cache = cached_ctx.borrow_mut();
            if ctx_cache.is_none() {
                let Some(ctx) = canvas
                    .get_context("2d")
                    .ok()
                    .flatten()
                    .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
                else {
                    return;
                };
                // All drawing stays in CSS pixel coords
                ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();
                *ctx_cache = Some(ctx);
            }
            let Some(ctx) = ctx_cache.clone() else {
                return;
            };
            ctx
        };

        let vp = viewport.get_untracked();
        let placements = visible_tiles(&vp);
        request_tiles(&tile_cache, &placements, on_tile_ready.clone());

        draw_tiles(&ctx, &vp, &tile_cache.borrow(), &placements);
        dispatcher.with_state_untracked(|state| {
            draw_markers(&ctx, &vp, state.markers(), state.view().focused);
        });
    });
    let scheduler = Rc::new(scheduler);

    // Pan/zoom/resize and tile arrival
    let sched_vp = scheduler.clone();
    Effect::new(move || {
        viewport.track();
        tiles_loaded.track();
        sched_vp.mark_dirty();
    });

    // Marker set or focused pin changed
    let sched_state = scheduler.clone();
    Effect::new(move || {
        dispatcher.track();
        sched_state.mark_dirty();
    });

    let sched_resize = scheduler.clone();
    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(old) = RESIZE_BINDING.with(|slot| slot.borrow_mut().take()) {
            let _ = old
                .window
                .remove_event_listener_with_callback("resize", old.handler.as_ref().unchecked_ref());
        }
        let sched = sched_resize.clone();
        let handler = wasm_bindgen::closure::Closure::<dyn Fn()>::new(move || sched.mark_dirty());
        if window
            .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            RESIZE_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(ResizeBinding {
                    window: window.clone(),
                    handler,
                });
            });
        }
    });

    // --- Input handlers ---

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let (x, y) = local_point(canvas_ref, e.client_x() as f64, e.client_y() as f64);
        viewport.update(|vp| vp.zoom_at(e.delta_y(), x, y));
    };

    let on_pointer_down = {
        let is_dragging = is_dragging.clone();
        let drag_start_x = drag_start_x.clone();
        let drag_start_y = drag_start_y.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
            is_dragging.set(true);
            drag_start_x.set(e.client_x() as f64);
            drag_start_y.set(e.client_y() as f64);
            last_x.set(e.client_x() as f64);
            last_y.set(e.client_y() as f64);

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
                el.style().set_property("cursor", "grabbing").ok();
            }
        }
    };

    let on_pointer_move = {
        let is_dragging = is_dragging.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
            if is_dragging.get() {
                let dx = e.client_x() as f64 - last_x.get();
                let dy = e.client_y() as f64 - last_y.get();
                last_x.set(e.client_x() as f64);
                last_y.set(e.client_y() as f64);
                viewport.update(|vp| vp.pan(dx, dy));
                return;
            }
            let (x, y) = local_point(canvas_ref, e.client_x() as f64, e.client_y() as f64);
            let over_pin = viewport.with_untracked(|vp| {
                dispatcher.with_state_untracked(|s| s.markers().hit_test(vp, x, y).is_some())
            });
            if let Some(el) = canvas_ref.get_untracked() {
                let cursor = if over_pin { "pointer" } else { "grab" };
                web_sys::HtmlElement::style(&el).set_property("cursor", cursor).ok();
            }
        }
    };

    let on_pointer_up = {
        let is_dragging = is_dragging.clone();
        move |e: PointerEvent| {
            is_dragging.set(false);
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.style().set_property("cursor", "grab").ok();
            }
        }
    };

    let on_click = {
        let drag_start_x = drag_start_x.clone();
        let drag_start_y = drag_start_y.clone();
        move |e: MouseEvent| {
            let dx = (e.client_x() as f64 - drag_start_x.get()).abs();
            let dy = (e.client_y() as f64 - drag_start_y.get()).abs();
            if dx >= CLICK_SLOP || dy >= CLICK_SLOP {
                return;
            }
            let (x, y) = local_point(canvas_ref, e.client_x() as f64, e.client_y() as f64);
            let hit = viewport.with_untracked(|vp| {
                dispatcher.with_state_untracked(|s| s.markers().hit_test(vp, x, y))
            });
            match hit {
                Some(id) => dispatcher.send(Msg::OpenPopup(id)),
                None => dispatcher.send(Msg::ClosePopup),
            }
        }
    };

    let on_touch_start = {
        let pinch_dist = pinch_dist.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() == 2 {
                e.prevent_default();
                let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                    return;
                };
                let dx = (t1.client_x() - t0.client_x()) as f64;
                let dy = (t1.client_y() - t0.client_y()) as f64;
                pinch_dist.set((dx * dx + dy * dy).sqrt());
            }
        }
    };

    let on_touch_move = {
        let pinch_dist = pinch_dist.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() == 2 {
                e.prevent_default();
                let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                    return;
                };
                let dx = (t1.client_x() - t0.client_x()) as f64;
                let dy = (t1.client_y() - t0.client_y()) as f64;
                let new_dist = (dx * dx + dy * dy).sqrt();
                let old_dist = pinch_dist.get();

                if old_dist > 0.0 {
                    let (mid_x, mid_y) = local_point(
                        canvas_ref,
                        (t0.client_x() + t1.client_x()) as f64 / 2.0,
                        (t0.client_y() + t1.client_y()) as f64 / 2.0,
                    );
                    let delta = -(new_dist - old_dist) * 2.0;
                    viewport.update(|vp| vp.zoom_at(delta, mid_x, mid_y));
                }

                pinch_dist.set(new_dist);
            }
        }
    };

    let zoom_by = move |delta: f64| {
        viewport.update(|vp| {
            let (cx, cy) = (vp.width / 2.0, vp.height / 2.0);
            vp.zoom_at(delta, cx, cy);
        });
    };

    view! {
        <div id="map" style="position: absolute; inset: 0; overflow: hidden;">
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: grab;"
                on:wheel=on_wheel
                on:pointerdown=on_pointer_down
                on:pointermove=on_pointer_move
                on:pointerup=on_pointer_up
                on:click=on_click
                on:touchstart=on_touch_start
                on:touchmove=on_touch_move
            />
            <div style="position: absolute; top: 16px; left: 16px; z-index: 10; display: flex; flex-direction: column; border: 1px solid #b8bec6; border-radius: 4px; overflow: hidden; box-shadow: 0 1px 4px rgba(0,0,0,0.2);">
                <button
                    title=labels::ZOOM_IN
                    style="width: 30px; height: 30px; background: #fff; border: none; border-bottom: 1px solid #d6dade; cursor: pointer; font-size: 1.1rem; line-height: 1; color: #333;"
                    on:click=move |_| zoom_by(-BUTTON_ZOOM_DELTA)
                >
                    "+"
                </button>
                <button
                    title=labels::ZOOM_OUT
                    style="width: 30px; height: 30px; background: #fff; border: none; cursor: pointer; font-size: 1.1rem; line-height: 1; color: #333;"
                    on:click=move |_| zoom_by(BUTTON_ZOOM_DELTA)
                >
                    "\u{2212}"
                </button>
            </div>
            <Popup />
            <div style="position: absolute; right: 0; bottom: 0; z-index: 10; padding: 2px 6px; background: rgba(255,255,255,0.8); font-size: 0.7rem; color: #333;">
                <a href=OSM_COPYRIGHT_URL target="_blank" rel="noopener noreferrer" style="color: #0078a8; text-decoration: none;">
                    {labels::TILE_ATTRIBUTION}
                </a>
            </div>
        </div>
    }
}

/// Info window anchored above the focused pin. The body is pre-escaped
/// markup built by the marker layer.
#[component]
fn Popup() -> impl IntoView {
    let viewport: RwSignal<Viewport> = expect_context();
    let dispatcher: Dispatcher = expect_context();

    move || {
        let marker = dispatcher.with_state(|s| s.popup().cloned())?;
        let (sx, sy) = viewport.with(|vp| vp.to_screen(marker.position));
        let top = sy - PIN_HEAD_OFFSET - PIN_HEAD_RADIUS - 6.0;
        Some(view! {
            <div
                class="map-popup"
                style=format!("position: absolute; left: {sx}px; top: {top}px; transform: translate(-50%, -100%); z-index: 9; min-width: 180px; max-width: 280px; padding: 12px 28px 12px 14px; background: #fff; border-radius: 8px; box-shadow: 0 3px 14px rgba(0,0,0,0.3); color: #222; font-size: 0.85rem;")
            >
                <button
                    class="popup-close"
                    title=labels::CLOSE
                    style="position: absolute; top: 4px; right: 6px; background: none; border: none; cursor: pointer; font-size: 1.1rem; color: #777; line-height: 1;"
                    on:click=move |_| dispatcher.send(Msg::ClosePopup)
                >
                    "\u{00D7}"
                </button>
                <div inner_html=marker.popup_html />
            </div>
        })
    }
}

fn draw_tiles(
    ctx: &CanvasRenderingContext2d,
    vp: &Viewport,
    tiles: &TileCache,
    placements: &[TilePlacement],
) {
    ctx.set_fill_style_str("#dfe3e8");
    ctx.fill_rect(0.0, 0.0, vp.width, vp.height);

    // Half-pixel overlap hides seams at fractional zoom.
    for placement in placements {
        let size = placement.size + 0.5;
        if let Some(img) = tiles.ready(&placement.coords) {
            ctx.draw_image_with_html_image_element_and_dw_and_dh(
                img,
                placement.sx,
                placement.sy,
                size,
                size,
            )
            .ok();
        } else if let Some((img, src_x, src_y, span)) =
            tiles.ready_ancestor(&placement.coords, TILE_FALLBACK_LEVELS)
        {
            ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                img,
                src_x,
                src_y,
                span,
                span,
                placement.sx,
                placement.sy,
                size,
                size,
            )
            .ok();
        }
    }
}

fn draw_markers(
    ctx: &CanvasRenderingContext2d,
    vp: &Viewport,
    markers: &MarkerLayer,
    focused: Option<EntityId>,
) {
    let margin = PIN_HEAD_OFFSET + PIN_HEAD_RADIUS;
    let mut focused_pin = None;
    for marker in markers.markers() {
        let (sx, sy) = vp.to_screen(marker.position);
        if sx < -margin || sy < -margin || sx > vp.width + margin || sy > vp.height + margin {
            continue;
        }
        if Some(marker.entity_id) == focused {
            focused_pin = Some((sx, sy, marker.color));
            continue;
        }
        draw_pin(ctx, sx, sy, marker.color, false);
    }
    // Focused pin on top
    if let Some((sx, sy, color)) = focused_pin {
        draw_pin(ctx, sx, sy, color, true);
    }
}

fn draw_pin(ctx: &CanvasRenderingContext2d, sx: f64, sy: f64, (r, g, b): (u8, u8, u8), focused: bool) {
    let head_y = sy - PIN_HEAD_OFFSET;
    let fill = rgba_css(r, g, b, 1.0);

    ctx.set_fill_style_str("rgba(0,0,0,0.25)");
    ctx.begin_path();
    ctx.ellipse(sx, sy, 5.0, 2.0, 0.0, 0.0, TAU).ok();
    ctx.fill();

    ctx.set_fill_style_str(&fill);
    ctx.begin_path();
    ctx.move_to(sx, sy);
    ctx.line_to(sx - PIN_HEAD_RADIUS * 0.8, head_y + PIN_HEAD_RADIUS * 0.5);
    ctx.line_to(sx + PIN_HEAD_RADIUS * 0.8, head_y + PIN_HEAD_RADIUS * 0.5);
    ctx.close_path();
    ctx.fill();

    ctx.begin_path();
    ctx.arc(sx, head_y, PIN_HEAD_RADIUS, 0.0, TAU).ok();
    ctx.fill();
    ctx.set_stroke_style_str(if focused { "#13161f" } else { "#ffffff" });
    ctx.set_line_width(if focused { 3.0 } else { 2.0 });
    ctx.stroke();

    ctx.set_fill_style_str("#ffffff");
    ctx.begin_path();
    ctx.arc(sx, head_y, PIN_HEAD_RADIUS * 0.35, 0.0, TAU).ok();
    ctx.fill();
}
