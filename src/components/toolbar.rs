use yew::prelude::*;

use super::icons::{Icon, IconKind};
use crate::model::{Color, DrawAction};

pub const BUTTON_BASE: &str =
    "w-10 h-10 rounded-full flex items-center justify-center transition-all hover:bg-gray-800";
pub const CLEAR_BUTTON: &str =
    "w-10 h-10 rounded-full flex items-center justify-center transition-all hover:bg-red-900";
const BAR: &str = "absolute bottom-4 left-1/2 transform -translate-x-1/2 flex items-center gap-2 p-2 bg-black/50 backdrop-blur-md rounded-full";
const DIVIDER: &str = "h-6 w-px bg-gray-700";

/// Highlight color of a toggle button while its mode is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tint {
    Red,
    Blue,
}

impl Tint {
    pub fn active_classes(self) -> &'static str {
        match self {
            Tint::Red => "bg-red-900/50 ring-2 ring-red-500 ring-opacity-50",
            Tint::Blue => "bg-blue-900/50 ring-2 ring-blue-500 ring-opacity-50",
        }
    }

    pub fn pulse_classes(self) -> &'static str {
        match self {
            Tint::Red => "absolute inset-0 rounded-full animate-pulse bg-red-500/20",
            Tint::Blue => "absolute inset-0 rounded-full animate-pulse bg-blue-500/20",
        }
    }
}

pub fn toggle_button_class(active: bool, tint: Tint) -> String {
    if active {
        format!("{BUTTON_BASE} relative {}", tint.active_classes())
    } else {
        format!("{BUTTON_BASE} relative")
    }
}

/// The bar's buttons, left to right.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolbarButton {
    ColorPicker,
    Eraser,
    Camera,
    LineVisibility,
    Clear,
}

impl ToolbarButton {
    pub const ALL: [ToolbarButton; 5] = [
        ToolbarButton::ColorPicker,
        ToolbarButton::Eraser,
        ToolbarButton::Camera,
        ToolbarButton::LineVisibility,
        ToolbarButton::Clear,
    ];

    pub fn action(self) -> DrawAction {
        match self {
            ToolbarButton::ColorPicker => DrawAction::ToggleColorPicker,
            ToolbarButton::Eraser => DrawAction::ToggleEraser,
            ToolbarButton::Camera => DrawAction::ToggleCamera,
            ToolbarButton::LineVisibility => DrawAction::ToggleLineVisibility,
            ToolbarButton::Clear => DrawAction::ClearLines,
        }
    }

    pub fn label(self, show_lines: bool) -> &'static str {
        match self {
            ToolbarButton::ColorPicker => "Color picker",
            ToolbarButton::Eraser => "Eraser",
            ToolbarButton::Camera => "Toggle camera controls",
            ToolbarButton::LineVisibility if show_lines => "Hide lines",
            ToolbarButton::LineVisibility => "Show lines",
            ToolbarButton::Clear => "Clear canvas",
        }
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct ToolbarProps {
    pub current_color: Color,
    pub show_lines: bool,
    pub is_erasing: bool,
    pub camera_enabled: bool,
    pub on_press: Callback<ToolbarButton>,
}

fn pulse(active: bool, tint: Tint) -> Html {
    if active {
        html! { <div class={tint.pulse_classes()} /> }
    } else {
        html! {}
    }
}

#[function_component(Toolbar)]
pub fn toolbar(props: &ToolbarProps) -> Html {
    let press = |button: ToolbarButton| {
        let cb = props.on_press.clone();
        Callback::from(move |_: MouseEvent| cb.emit(button))
    };
    let label = |button: ToolbarButton| button.label(props.show_lines);
    let swatch_style = format!("background-color: {};", props.current_color);
    let eye = if props.show_lines { IconKind::Eye } else { IconKind::EyeOff };

    html! {<div class={BAR}>
        <button onclick={press(ToolbarButton::ColorPicker)} class={BUTTON_BASE} aria-label={label(ToolbarButton::ColorPicker)}>
            <div class="relative">
                <Icon kind={IconKind::Palette} size={24} />
                <div class="absolute -top-1 -right-1 w-3 h-3 rounded-full" style={swatch_style} />
            </div>
        </button>
        <div class={DIVIDER} />
        <button onclick={press(ToolbarButton::Eraser)} class={toggle_button_class(props.is_erasing, Tint::Red)} aria-label={label(ToolbarButton::Eraser)}>
            <Icon kind={IconKind::Eraser} />
            { pulse(props.is_erasing, Tint::Red) }
        </button>
        <div class={DIVIDER} />
        <button onclick={press(ToolbarButton::Camera)} class={toggle_button_class(props.camera_enabled, Tint::Blue)} aria-label={label(ToolbarButton::Camera)}>
            <Icon kind={IconKind::Rotate3d} />
            { pulse(props.camera_enabled, Tint::Blue) }
        </button>
        <div class={DIVIDER} />
        <button onclick={press(ToolbarButton::LineVisibility)} class={BUTTON_BASE} aria-label={label(ToolbarButton::LineVisibility)}>
            <Icon kind={eye} />
        </button>
        <div class={DIVIDER} />
        <button onclick={press(ToolbarButton::Clear)} class={CLEAR_BUTTON} aria-label={label(ToolbarButton::Clear)}>
            <Icon kind={IconKind::Trash} />
        </button>
    </div>}
}
