use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, KeyboardEvent};
use yew::prelude::*;

use crate::dom::ListenerSet;
use crate::model::Color;

pub const PRESET_COLORS: [&str; 12] = [
    "#ffffff", "#9ca3af", "#ef4444", "#f97316", "#facc15", "#84cc16", "#22c55e", "#14b8a6",
    "#3b82f6", "#6366f1", "#a855f7", "#ec4899",
];

#[derive(Properties, PartialEq, Clone)]
pub struct ColorPickerProps {
    pub current_color: Color,
    pub on_change: Callback<Color>,
    pub on_close: Callback<()>,
}

fn swatch_class(selected: bool) -> &'static str {
    if selected {
        "w-8 h-8 rounded-full ring-2 ring-white ring-offset-2 ring-offset-black transition-transform scale-110"
    } else {
        "w-8 h-8 rounded-full transition-transform hover:scale-110"
    }
}

#[function_component(ColorPicker)]
pub fn color_picker(props: &ColorPickerProps) -> Html {
    // Escape closes the picker
    {
        let on_close = props.on_close.clone();
        use_effect_with(on_close, move |on_close| {
            let on_close = on_close.clone();
            let mut listeners = ListenerSet::new();
            if let Some(win) = web_sys::window() {
                let target: &web_sys::EventTarget = win.as_ref();
                let res = listeners.listen(target, "keydown", true, move |e: web_sys::Event| {
                    if let Some(ke) = e.dyn_ref::<KeyboardEvent>() {
                        if ke.key() == "Escape" {
                            on_close.emit(());
                        }
                    }
                });
                if let Err(e) = res {
                    log::warn!("color picker: keydown listener failed: {e:?}");
                }
            }
            move || drop(listeners)
        });
    }

    let backdrop_cb = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let close_cb = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let stop = Callback::from(|e: MouseEvent| e.stop_propagation());
    let custom_cb = {
        let cb = props.on_change.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            match Color::parse(&input.value()) {
                Ok(c) => cb.emit(c),
                Err(err) => log::warn!("ignoring color input {:?}: {err}", input.value()),
            }
        })
    };

    let swatches = PRESET_COLORS.iter().filter_map(|hex| Color::parse(hex).ok()).map(|color| {
        let selected = color == props.current_color;
        let style = format!("background-color: {color};");
        let label = format!("Use color {color}");
        let onclick = {
            let cb = props.on_change.clone();
            let color = color.clone();
            Callback::from(move |_| cb.emit(color.clone()))
        };
        html! { <button key={color.as_str().to_string()} class={swatch_class(selected)} style={style} aria-label={label} {onclick} /> }
    });

    html! {<div class="absolute inset-0 z-40 flex items-end justify-center pb-24 bg-black/30" onclick={backdrop_cb}>
        <div class="bg-gray-900/90 backdrop-blur-md rounded-2xl p-4 flex flex-col gap-3 shadow-xl" onclick={stop}>
            <div class="flex items-center justify-between">
                <span class="text-sm opacity-80">{"Color"}</span>
                <button onclick={close_cb} class="text-xs px-2 py-1 rounded-full hover:bg-gray-800" aria-label="Close color picker">{"Done"}</button>
            </div>
            <div class="grid grid-cols-6 gap-2">
                { for swatches }
            </div>
            <label class="flex items-center gap-2 text-sm">
                <input type="color" value={props.current_color.as_str().to_string()} oninput={custom_cb} class="w-8 h-8 bg-transparent border-0 p-0 cursor-pointer" />
                <span class="opacity-80 font-mono">{ props.current_color.to_string() }</span>
            </label>
        </div>
    </div>}
}
