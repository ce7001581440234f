use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;
use yew::prelude::*;
use yew::suspense::Suspense;

use super::color_picker::ColorPicker;
use super::drawing_canvas::DrawingCanvas;
use super::toolbar::{Toolbar, ToolbarButton};
use crate::dom::ListenerSet;
use crate::model::{Color, DrawAction, DrawState};
use crate::state::viewport::{ROOT_HEIGHT_STYLE, register_shell_listeners};
use crate::storage;

/// Handle to the shared drawing store, provided to the tree by [`App`].
pub type DrawStore = UseReducerHandle<DrawState>;

/// Maps a key press to a store action. `modifier` is Ctrl or Cmd.
pub fn shortcut_action(key: &str, modifier: bool, shift: bool) -> Option<DrawAction> {
    let key = key.to_ascii_lowercase();
    match (key.as_str(), modifier, shift) {
        ("z", true, false) => Some(DrawAction::Undo),
        ("z", true, true) | ("y", true, false) => Some(DrawAction::Redo),
        ("e", false, _) => Some(DrawAction::ToggleEraser),
        ("c", false, _) => Some(DrawAction::ToggleCamera),
        ("h", false, _) => Some(DrawAction::ToggleLineVisibility),
        _ => None,
    }
}

fn dispatcher(store: &DrawStore, action: DrawAction) -> Callback<()> {
    let store = store.clone();
    Callback::from(move |()| store.dispatch(action.clone()))
}

#[function_component(App)]
pub fn app() -> Html {
    let store = use_reducer(|| match storage::load_snapshot() {
        Some(snapshot) => DrawState::from_snapshot(snapshot),
        None => DrawState::default(),
    });

    // Touch/gesture suppression and --vh sync for the lifetime of the shell
    use_effect_with((), move |_| {
        let listeners = web_sys::window().and_then(|win| match register_shell_listeners(&win) {
            Ok(l) => Some(l),
            Err(e) => {
                log::error!("shell listener setup failed: {e:?}");
                None
            }
        });
        move || drop(listeners)
    });

    // Persist drawing & settings
    {
        let lines = store.lines.clone();
        use_effect_with(store.version, move |_| {
            storage::save_lines(&lines);
            || ()
        });
    }
    use_effect_with(store.current_color.clone(), |color| {
        storage::save_color(color);
        || ()
    });
    use_effect_with(store.show_lines, |show_lines| {
        storage::save_show_lines(*show_lines);
        || ()
    });

    // Keyboard shortcuts
    {
        let store = store.clone();
        use_effect_with((), move |_| {
            let mut listeners = ListenerSet::new();
            if let Some(win) = web_sys::window() {
                let target: &web_sys::EventTarget = win.as_ref();
                let res = listeners.listen(target, "keydown", false, move |e: web_sys::Event| {
                    let Some(ke) = e.dyn_ref::<KeyboardEvent>() else {
                        return;
                    };
                    if ke.repeat() || ke.alt_key() {
                        return;
                    }
                    let modifier = ke.ctrl_key() || ke.meta_key();
                    if let Some(action) = shortcut_action(&ke.key(), modifier, ke.shift_key()) {
                        if modifier {
                            ke.prevent_default();
                        }
                        log::debug!("shortcut {:?} -> {action:?}", ke.key());
                        store.dispatch(action);
                    }
                });
                if let Err(e) = res {
                    log::warn!("keyboard shortcuts unavailable: {e:?}");
                }
            }
            move || drop(listeners)
        });
    }

    let fallback = html! { <div class="h-screen w-screen flex items-center justify-center">{"Loading..."}</div> };

    html! {
        <ContextProvider<DrawStore> context={store}>
            <div class="relative w-screen bg-black text-white overflow-hidden" style={ROOT_HEIGHT_STYLE}>
                <Suspense {fallback}>
                    <DrawingCanvas />
                </Suspense>
                <ToolOverlay />
            </div>
        </ContextProvider<DrawStore>>
    }
}

/// Toolbar, plus the color picker while it is open.
#[function_component(ToolOverlay)]
fn tool_overlay() -> Html {
    let Some(store) = use_context::<DrawStore>() else {
        return html! {};
    };
    let on_press = {
        let store = store.clone();
        Callback::from(move |button: ToolbarButton| store.dispatch(button.action()))
    };
    let set_color: Callback<Color> = {
        let store = store.clone();
        Callback::from(move |c: Color| store.dispatch(DrawAction::SetCurrentColor(c)))
    };

    html! {<>
        <Toolbar
            current_color={store.current_color.clone()}
            show_lines={store.show_lines}
            is_erasing={store.is_erasing}
            camera_enabled={store.camera_enabled}
            on_press={on_press}
        />
        if store.show_color_picker {
            <ColorPicker
                current_color={store.current_color.clone()}
                on_change={set_color}
                on_close={dispatcher(&store, DrawAction::ToggleColorPicker)}
            />
        }
    </>}
}
