// Small browser helpers shared across components

/// Routes `log` output to the browser console and panics to `console.error`.
pub fn init_logging() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log_level()));
}

fn log_level() -> log::Level {
    if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    }
}

pub fn now_ms() -> f64 {
    js_sys::Date::now()
}
