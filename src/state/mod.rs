pub mod camera;
pub mod eraser;
pub mod pointer;
pub mod touch;
pub mod viewport;

pub use camera::OrbitCamera;
pub use eraser::{ERASER_RADIUS_PX, strokes_hit};
pub use pointer::{PointerMode, PointerState};
pub use touch::{TouchState, finger_distance};
