// Pointer (mouse or single touch) interaction state for the drawing canvas
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerMode {
    #[default]
    Idle,
    Drawing,
    Erasing,
    Orbiting,
}

impl PointerMode {
    /// Camera controls win over tools; hidden lines can be neither drawn nor erased.
    pub fn for_state(camera_enabled: bool, is_erasing: bool, show_lines: bool) -> Self {
        if camera_enabled {
            PointerMode::Orbiting
        } else if !show_lines {
            PointerMode::Idle
        } else if is_erasing {
            PointerMode::Erasing
        } else {
            PointerMode::Drawing
        }
    }
}

#[derive(Default, Debug, Clone)]
pub struct PointerState {
    pub mode: PointerMode,
    pub down: bool,
    pub last_x: f64,
    pub last_y: f64,
    /// Last known position over the canvas, pressed or not.
    pub hover: Option<(f64, f64)>,
}

impl PointerState {
    pub fn press(&mut self, mode: PointerMode, x: f64, y: f64) {
        self.mode = mode;
        self.down = true;
        self.last_x = x;
        self.last_y = y;
        self.hover = Some((x, y));
    }

    /// Records a move and returns the delta since the previous position.
    pub fn move_to(&mut self, x: f64, y: f64) -> (f64, f64) {
        let delta = (x - self.last_x, y - self.last_y);
        self.last_x = x;
        self.last_y = y;
        self.hover = Some((x, y));
        delta
    }

    /// Releases the pointer, returning the mode it was driving.
    pub fn release(&mut self) -> PointerMode {
        let mode = if self.down { self.mode } else { PointerMode::Idle };
        self.down = false;
        self.mode = PointerMode::Idle;
        mode
    }
}
