// Touch/pinch gesture state for the drawing canvas
#[derive(Default, Debug, Clone)]
pub struct TouchState {
    pub single_active: bool,
    pub pinch: bool,
    pub start_pinch_dist: f64,
    pub start_camera_distance: f64,
}

impl TouchState {
    pub fn begin_pinch(&mut self, finger_dist: f64, camera_distance: f64) {
        self.single_active = false;
        self.pinch = finger_dist > 0.0;
        self.start_pinch_dist = finger_dist;
        self.start_camera_distance = camera_distance;
    }

    /// Camera distance for the current finger spread; spreading moves the camera closer.
    pub fn pinch_camera_distance(&self, finger_dist: f64) -> Option<f64> {
        if !self.pinch || finger_dist <= 0.0 {
            return None;
        }
        Some(self.start_camera_distance * self.start_pinch_dist / finger_dist)
    }

    pub fn end(&mut self) {
        *self = Self::default();
    }
}

pub fn finger_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spreading_fingers_halves_distance() {
        let mut ts = TouchState::default();
        ts.begin_pinch(100.0, 10.0);
        assert_eq!(ts.pinch_camera_distance(200.0), Some(5.0));
        assert_eq!(ts.pinch_camera_distance(50.0), Some(20.0));
    }

    #[test]
    fn no_pinch_without_start() {
        let mut ts = TouchState::default();
        assert_eq!(ts.pinch_camera_distance(100.0), None);
        ts.begin_pinch(0.0, 10.0);
        assert_eq!(ts.pinch_camera_distance(100.0), None);
        ts.begin_pinch(100.0, 10.0);
        ts.end();
        assert!(!ts.pinch);
    }

    #[test]
    fn finger_distance_is_euclidean() {
        assert_eq!(finger_distance((0.0, 0.0), (3.0, 4.0)), 5.0);
    }
}
