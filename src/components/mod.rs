pub mod app;
pub mod color_picker;
pub mod drawing_canvas;
pub mod icons;
pub mod toolbar;
