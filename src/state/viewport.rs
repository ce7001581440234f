//! Shell-level viewport handling.
//!
//! Mobile browsers resize `100vh` as their chrome slides in and out, so the root
//! container sizes itself from a `--vh` custom property kept in sync with
//! `window.innerHeight`. The same mount also suppresses the browser's own touch
//! scrolling and pinch gestures so they don't fight the canvas.

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{Event, EventTarget, HtmlElement, Window};

use crate::dom::ListenerSet;

pub const VIEWPORT_UNIT_FACTOR: f64 = 0.01;
pub const VH_PROPERTY: &str = "--vh";
/// Inline style of the root container.
pub const ROOT_HEIGHT_STYLE: &str = "height: calc(var(--vh) * 100);";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerTarget {
    Document,
    Window,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerKind {
    /// Calls `preventDefault` on the event.
    SuppressDefault,
    /// Recomputes `--vh`.
    SyncViewportHeight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShellListener {
    pub target: ListenerTarget,
    pub event: &'static str,
    pub kind: ListenerKind,
    pub passive: bool,
}

const fn suppress(event: &'static str) -> ShellListener {
    ShellListener {
        target: ListenerTarget::Document,
        event,
        kind: ListenerKind::SuppressDefault,
        passive: false,
    }
}

const fn sync(event: &'static str) -> ShellListener {
    ShellListener {
        target: ListenerTarget::Window,
        event,
        kind: ListenerKind::SyncViewportHeight,
        passive: true,
    }
}

pub const SHELL_LISTENERS: [ShellListener; 6] = [
    suppress("touchmove"),
    suppress("gesturestart"),
    suppress("gesturechange"),
    suppress("gestureend"),
    sync("resize"),
    sync("orientationchange"),
];

pub fn viewport_unit_px(inner_height: f64) -> f64 {
    inner_height * VIEWPORT_UNIT_FACTOR
}

pub fn vh_property_value(inner_height: f64) -> String {
    format!("{}px", viewport_unit_px(inner_height))
}

pub fn apply_viewport_height(window: &Window) -> Result<(), JsValue> {
    let inner_height = window.inner_height()?.as_f64().unwrap_or(0.0);
    let root: HtmlElement = window
        .document()
        .and_then(|d| d.document_element())
        .ok_or_else(|| JsValue::from_str("document has no root element"))?
        .dyn_into()?;
    root.style()
        .set_property(VH_PROPERTY, &vh_property_value(inner_height))
}

pub fn sync_viewport_height(window: &Window) {
    if let Err(e) = apply_viewport_height(window) {
        log::warn!("failed to update {VH_PROPERTY}: {e:?}");
    }
}

/// Sets `--vh` once and registers every entry of [`SHELL_LISTENERS`].
/// Dropping the returned set removes them again.
pub fn register_shell_listeners(window: &Window) -> Result<ListenerSet, JsValue> {
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("window has no document"))?;
    sync_viewport_height(window);
    let mut listeners = ListenerSet::new();
    for entry in SHELL_LISTENERS.iter() {
        let target: &EventTarget = match entry.target {
            ListenerTarget::Document => document.as_ref(),
            ListenerTarget::Window => window.as_ref(),
        };
        match entry.kind {
            ListenerKind::SuppressDefault => {
                listeners.listen(target, entry.event, entry.passive, |e: Event| e.prevent_default())?
            }
            ListenerKind::SyncViewportHeight => {
                let window = window.clone();
                listeners.listen(target, entry.event, entry.passive, move |_e: Event| {
                    sync_viewport_height(&window)
                })?
            }
        }
    }
    log::debug!("registered {} shell listeners", listeners.len());
    Ok(listeners)
}
