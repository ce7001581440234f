mod components;
mod dom;
mod model;
mod state;
mod storage;
mod util;

use components::app::App;

fn main() {
    util::init_logging();
    log::info!("sketch3d {}", env!("CARGO_PKG_VERSION"));
    yew::Renderer::<App>::new().render();
}
