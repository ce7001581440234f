use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent};
use yew::prelude::*;

use super::app::DrawStore;
use crate::dom::{AnimationLoop, ListenerSet};
use crate::model::{DrawAction, DrawState, Stroke, Vec3};
use crate::state::{
    ERASER_RADIUS_PX, OrbitCamera, PointerMode, PointerState, TouchState, finger_distance,
    strokes_hit,
};
use crate::util::now_ms;

const BACKGROUND: &str = "#000000";
const GRID_COLOR: &str = "rgba(255,255,255,0.08)";
const ERASER_RING: &str = "rgba(239,68,68,0.8)";
const GRID_HALF_EXTENT: i32 = 10;
const GRID_Y: f64 = -3.0;
const WHEEL_ZOOM_RATE: f64 = 0.001;

/// Shared handles the DOM callbacks act on. Cloning shares the same state.
#[derive(Clone)]
struct Interaction {
    store: Rc<RefCell<Option<DrawStore>>>,
    camera: Rc<RefCell<OrbitCamera>>,
    pointer: Rc<RefCell<PointerState>>,
    touch: Rc<RefCell<TouchState>>,
    /// Canvas size in CSS pixels.
    size: Rc<Cell<(f64, f64)>>,
}

impl Interaction {
    fn store(&self) -> Option<DrawStore> {
        self.store.borrow().clone()
    }

    fn drawing_point(&self, x: f64, y: f64) -> Option<Vec3> {
        let (w, h) = self.size.get();
        self.camera.borrow().unproject_to_drawing_plane(x, y, w, h)
    }

    fn press(&self, x: f64, y: f64) {
        let Some(store) = self.store() else {
            return;
        };
        let mode = PointerMode::for_state(store.camera_enabled, store.is_erasing, store.show_lines);
        self.pointer.borrow_mut().press(mode, x, y);
        match mode {
            PointerMode::Drawing => {
                if let Some(at) = self.drawing_point(x, y) {
                    store.dispatch(DrawAction::BeginStroke {
                        at,
                        created_at_ms: now_ms(),
                    });
                }
            }
            PointerMode::Erasing => self.erase_at(&store, x, y),
            PointerMode::Orbiting | PointerMode::Idle => {}
        }
    }

    fn drag(&self, x: f64, y: f64) {
        let (mode, down, (dx, dy)) = {
            let mut p = self.pointer.borrow_mut();
            let delta = p.move_to(x, y);
            (p.mode, p.down, delta)
        };
        if !down {
            return;
        }
        let Some(store) = self.store() else {
            return;
        };
        match mode {
            PointerMode::Drawing => {
                if let Some(at) = self.drawing_point(x, y) {
                    store.dispatch(DrawAction::ExtendStroke { at });
                }
            }
            PointerMode::Erasing => self.erase_at(&store, x, y),
            PointerMode::Orbiting => self.camera.borrow_mut().orbit(dx, dy),
            PointerMode::Idle => {}
        }
    }

    fn release(&self) {
        let mode = self.pointer.borrow_mut().release();
        let action = match mode {
            PointerMode::Drawing => DrawAction::EndStroke,
            PointerMode::Erasing => DrawAction::EndEraseSwipe,
            PointerMode::Orbiting | PointerMode::Idle => return,
        };
        if let Some(store) = self.store() {
            store.dispatch(action);
        }
    }

    /// Drops an in-progress stroke, e.g. when a second finger lands.
    fn cancel(&self) {
        let mode = self.pointer.borrow_mut().release();
        let action = match mode {
            PointerMode::Drawing => DrawAction::CancelStroke,
            PointerMode::Erasing => DrawAction::EndEraseSwipe,
            PointerMode::Orbiting | PointerMode::Idle => return,
        };
        if let Some(store) = self.store() {
            store.dispatch(action);
        }
    }

    fn erase_at(&self, store: &DrawStore, x: f64, y: f64) {
        let (w, h) = self.size.get();
        let ids = strokes_hit(&store.lines, &self.camera.borrow(), w, h, x, y, ERASER_RADIUS_PX);
        if !ids.is_empty() {
            log::debug!("erasing strokes {ids:?}");
            store.dispatch(DrawAction::EraseStrokes { ids });
        }
    }

    fn camera_enabled(&self) -> bool {
        self.store().map(|s| s.camera_enabled).unwrap_or(false)
    }
}

/// Matches the backing store to the element's CSS size; cheap when nothing changed.
fn fit_canvas(canvas: &HtmlCanvasElement, size: &Cell<(f64, f64)>, dpr: f64) {
    let w = canvas.client_width().max(0) as f64;
    let h = canvas.client_height().max(0) as f64;
    let (bw, bh) = ((w * dpr) as u32, (h * dpr) as u32);
    if canvas.width() != bw || canvas.height() != bh {
        canvas.set_width(bw);
        canvas.set_height(bh);
    }
    size.set((w, h));
}

fn touch_points(e: &TouchEvent, canvas: &HtmlCanvasElement) -> Vec<(f64, f64)> {
    let rect = canvas.get_bounding_client_rect();
    let touches = e.touches();
    (0..touches.length())
        .filter_map(|i| touches.item(i))
        .map(|t| (t.client_x() as f64 - rect.left(), t.client_y() as f64 - rect.top()))
        .collect()
}

fn render_grid(ctx: &CanvasRenderingContext2d, camera: &OrbitCamera, w: f64, h: f64) {
    ctx.set_stroke_style_str(GRID_COLOR);
    ctx.set_line_width(1.0);
    let extent = GRID_HALF_EXTENT as f64;
    for i in -GRID_HALF_EXTENT..=GRID_HALF_EXTENT {
        let k = i as f64;
        for (a, b) in [
            (Vec3::new(k, GRID_Y, -extent), Vec3::new(k, GRID_Y, extent)),
            (Vec3::new(-extent, GRID_Y, k), Vec3::new(extent, GRID_Y, k)),
        ] {
            // unit steps keep the near-plane clipping from dropping whole lines
            let steps = GRID_HALF_EXTENT * 2;
            ctx.begin_path();
            let mut pen_down = false;
            for s in 0..=steps {
                let t = s as f64 / steps as f64;
                match camera.project(a + (b - a) * t, w, h) {
                    Some(p) if pen_down => ctx.line_to(p.x, p.y),
                    Some(p) => {
                        ctx.move_to(p.x, p.y);
                        pen_down = true;
                    }
                    None => pen_down = false,
                }
            }
            ctx.stroke();
        }
    }
}

fn render_stroke(ctx: &CanvasRenderingContext2d, camera: &OrbitCamera, stroke: &Stroke, w: f64, h: f64) {
    let projected: Vec<_> = stroke.points.iter().map(|p| camera.project(*p, w, h)).collect();
    let visible: Vec<_> = projected.iter().flatten().collect();
    if visible.is_empty() {
        return;
    }
    let mean_depth = visible.iter().map(|p| p.depth).sum::<f64>() / visible.len() as f64;
    let width_px = (stroke.width * camera.focal_length(h) / mean_depth).max(1.0);
    ctx.set_stroke_style_str(stroke.color.as_str());
    ctx.set_fill_style_str(stroke.color.as_str());
    ctx.set_line_width(width_px);
    if visible.len() == 1 {
        let p = visible[0];
        ctx.begin_path();
        let _ = ctx.arc(p.x, p.y, width_px * 0.5, 0.0, std::f64::consts::TAU);
        ctx.fill();
        return;
    }
    ctx.begin_path();
    let mut pen_down = false;
    for p in &projected {
        match p {
            Some(p) if pen_down => ctx.line_to(p.x, p.y),
            Some(p) => {
                ctx.move_to(p.x, p.y);
                pen_down = true;
            }
            None => pen_down = false,
        }
    }
    ctx.stroke();
}

/// True when a press would erase.
fn eraser_ring_visible(state: &DrawState) -> bool {
    PointerMode::for_state(state.camera_enabled, state.is_erasing, state.show_lines) == PointerMode::Erasing
}

fn render_scene(
    ctx: &CanvasRenderingContext2d,
    camera: &OrbitCamera,
    state: &DrawState,
    pointer: &PointerState,
    (w, h): (f64, f64),
    dpr: f64,
) {
    let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, w, h);
    render_grid(ctx, camera, w, h);

    if state.show_lines {
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        let eye = camera.eye();
        // painter's order: farthest strokes first
        let mut ordered: Vec<(f64, &Stroke)> = state
            .lines
            .iter()
            .chain(state.active.iter())
            .map(|s| {
                let far = s.points.iter().map(|p| p.distance(eye)).fold(0.0, f64::max);
                (far, s)
            })
            .collect();
        ordered.sort_by(|a, b| b.0.total_cmp(&a.0));
        for (_, stroke) in ordered {
            render_stroke(ctx, camera, stroke, w, h);
        }
    }

    if eraser_ring_visible(state) {
        if let Some((x, y)) = pointer.hover {
            ctx.set_stroke_style_str(ERASER_RING);
            ctx.set_line_width(1.5);
            ctx.begin_path();
            let _ = ctx.arc(x, y, ERASER_RADIUS_PX, 0.0, std::f64::consts::TAU);
            ctx.stroke();
        }
    }
}

struct CanvasBindings {
    _listeners: ListenerSet,
    _frames: AnimationLoop,
}

fn bind_canvas(canvas: HtmlCanvasElement, interaction: Interaction) -> Result<CanvasBindings, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into()
        .map_err(JsValue::from)?;
    fit_canvas(&canvas, &interaction.size, window.device_pixel_ratio().max(1.0));

    let mut listeners = ListenerSet::new();
    let canvas_target: &EventTarget = canvas.as_ref();
    let window_target: &EventTarget = window.as_ref();

    // Mouse
    {
        let it = interaction.clone();
        listeners.listen(canvas_target, "mousedown", false, move |e: Event| {
            if let Some(me) = e.dyn_ref::<MouseEvent>() {
                if me.button() == 0 {
                    it.press(me.offset_x() as f64, me.offset_y() as f64);
                }
            }
        })?;
    }
    {
        let it = interaction.clone();
        listeners.listen(canvas_target, "mousemove", true, move |e: Event| {
            if let Some(me) = e.dyn_ref::<MouseEvent>() {
                it.drag(me.offset_x() as f64, me.offset_y() as f64);
            }
        })?;
    }
    {
        let it = interaction.clone();
        listeners.listen(canvas_target, "mouseleave", true, move |_e: Event| {
            it.pointer.borrow_mut().hover = None;
        })?;
    }
    {
        let it = interaction.clone();
        listeners.listen(window_target, "mouseup", true, move |_e: Event| it.release())?;
    }
    {
        let it = interaction.clone();
        listeners.listen(canvas_target, "wheel", false, move |e: Event| {
            let Some(we) = e.dyn_ref::<WheelEvent>() else {
                return;
            };
            if !it.camera_enabled() {
                return;
            }
            we.prevent_default();
            it.camera.borrow_mut().zoom((we.delta_y() * WHEEL_ZOOM_RATE).exp());
        })?;
    }
    {
        let it = interaction.clone();
        listeners.listen(canvas_target, "dblclick", true, move |_e: Event| {
            if it.camera_enabled() {
                log::debug!("camera reset");
                it.camera.borrow_mut().reset();
            }
        })?;
    }
    listeners.listen(canvas_target, "contextmenu", false, |e: Event| e.prevent_default())?;
    // Touch
    {
        let it = interaction.clone();
        let canvas = canvas.clone();
        listeners.listen(canvas_target, "touchstart", false, move |e: Event| {
            let Some(te) = e.dyn_ref::<TouchEvent>() else {
                return;
            };
            te.prevent_default();
            let pts = touch_points(te, &canvas);
            match pts.as_slice() {
                [(x, y)] => {
                    it.touch.borrow_mut().single_active = true;
                    it.press(*x, *y);
                }
                [a, b, ..] => {
                    it.cancel();
                    if it.camera_enabled() {
                        let distance = it.camera.borrow().distance;
                        it.touch.borrow_mut().begin_pinch(finger_distance(*a, *b), distance);
                    }
                }
                [] => {}
            }
        })?;
    }
    {
        let it = interaction.clone();
        let canvas = canvas.clone();
        listeners.listen(canvas_target, "touchmove", false, move |e: Event| {
            let Some(te) = e.dyn_ref::<TouchEvent>() else {
                return;
            };
            te.prevent_default();
            let pts = touch_points(te, &canvas);
            match pts.as_slice() {
                [(x, y)] => {
                    if it.touch.borrow().single_active {
                        it.drag(*x, *y);
                    }
                }
                [a, b, ..] => {
                    let target = it.touch.borrow().pinch_camera_distance(finger_distance(*a, *b));
                    if let Some(d) = target {
                        it.camera.borrow_mut().set_distance(d);
                    }
                }
                [] => {}
            }
        })?;
    }
    for event in ["touchend", "touchcancel"] {
        let it = interaction.clone();
        listeners.listen(canvas_target, event, false, move |e: Event| {
            let Some(te) = e.dyn_ref::<TouchEvent>() else {
                return;
            };
            te.prevent_default();
            if te.touches().length() == 0 {
                it.touch.borrow_mut().end();
                it.release();
                it.pointer.borrow_mut().hover = None;
            }
        })?;
    }

    let frames = {
        let it = interaction.clone();
        let window_frame = window.clone();
        AnimationLoop::start(&window, move || {
            if !canvas.is_connected() {
                return;
            }
            let Some(store) = it.store() else {
                return;
            };
            // layout may settle after mount (the shell sets --vh later), so refit every frame
            let dpr = window_frame.device_pixel_ratio().max(1.0);
            fit_canvas(&canvas, &it.size, dpr);
            render_scene(
                &ctx,
                &it.camera.borrow(),
                &store,
                &it.pointer.borrow(),
                it.size.get(),
                dpr,
            );
        })?
    };

    Ok(CanvasBindings {
        _listeners: listeners,
        _frames: frames,
    })
}

/// Renders the store's strokes in 3D and turns pointer input into store actions.
#[function_component(DrawingCanvas)]
pub fn drawing_canvas() -> Html {
    let canvas_ref = use_node_ref();
    let store = use_context::<DrawStore>();
    let store_ref = use_mut_ref(|| None::<DrawStore>);
    let camera = use_mut_ref(OrbitCamera::default);
    let pointer = use_mut_ref(PointerState::default);
    let touch = use_mut_ref(TouchState::default);
    let size = use_memo((), |_| Cell::new((0.0, 0.0)));

    // callbacks read the latest handle through this ref
    *store_ref.borrow_mut() = store.clone();

    {
        let canvas_ref = canvas_ref.clone();
        let interaction = Interaction {
            store: store_ref.clone(),
            camera: camera.clone(),
            pointer: pointer.clone(),
            touch: touch.clone(),
            size: size.clone(),
        };
        use_effect_with((), move |_| {
            let bindings = match canvas_ref.cast::<HtmlCanvasElement>() {
                Some(canvas) => match bind_canvas(canvas, interaction) {
                    Ok(b) => {
                        log::info!("drawing canvas mounted");
                        Some(b)
                    }
                    Err(e) => {
                        log::error!("drawing canvas setup failed: {e:?}");
                        None
                    }
                },
                None => {
                    log::error!("canvas ref not attached to a canvas element");
                    None
                }
            };
            move || drop(bindings)
        });
    }

    if store.is_none() {
        log::error!("DrawingCanvas rendered outside the draw store provider");
    }
    let cursor = match &store {
        Some(s) if s.camera_enabled => "cursor-grab",
        Some(s) if s.is_erasing => "cursor-none",
        _ => "cursor-crosshair",
    };

    html! {
        <canvas ref={canvas_ref} class={classes!("block", "w-full", "h-full", "touch-none", cursor)}></canvas>
    }
}
