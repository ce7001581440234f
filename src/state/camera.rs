// Orbit camera used by the drawing canvas. Screen coordinates are CSS pixels
// with the origin at the top-left of the canvas.
use crate::model::Vec3;

/// Radians of rotation per dragged pixel.
pub const ORBIT_SPEED: f64 = 0.005;
pub const MAX_PITCH: f64 = 1.55;
pub const MIN_DISTANCE: f64 = 2.0;
pub const MAX_DISTANCE: f64 = 60.0;
pub const NEAR_PLANE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    /// Distance along the view direction.
    pub depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f64,
    pub pitch: f64,
    pub distance: f64,
    pub fov_y: f64,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.35,
            distance: 10.0,
            fov_y: 60f64.to_radians(),
        }
    }
}

impl OrbitCamera {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(cp * sy, sp, cp * cy) * self.distance
    }

    /// (forward, right, up), all unit length.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (self.target - self.eye()).normalized();
        let right = forward.cross(Vec3::UP).normalized();
        let up = right.cross(forward);
        (forward, right, up)
    }

    pub fn focal_length(&self, height: f64) -> f64 {
        (height * 0.5) / (self.fov_y * 0.5).tan()
    }

    pub fn orbit(&mut self, dx: f64, dy: f64) {
        self.yaw -= dx * ORBIT_SPEED;
        self.pitch = (self.pitch + dy * ORBIT_SPEED).clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn zoom(&mut self, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn set_distance(&mut self, distance: f64) {
        if distance.is_finite() {
            self.distance = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }

    /// Projects a world point; `None` when it sits behind the near plane.
    pub fn project(&self, p: Vec3, width: f64, height: f64) -> Option<Projected> {
        let (forward, right, up) = self.basis();
        let d = p - self.eye();
        let depth = d.dot(forward);
        if depth < NEAR_PLANE {
            return None;
        }
        let f = self.focal_length(height);
        Some(Projected {
            x: width * 0.5 + d.dot(right) * f / depth,
            y: height * 0.5 - d.dot(up) * f / depth,
            depth,
        })
    }

    /// Direction of the ray leaving the eye through a screen pixel.
    pub fn screen_ray(&self, x: f64, y: f64, width: f64, height: f64) -> Vec3 {
        let (forward, right, up) = self.basis();
        let f = self.focal_length(height);
        let rx = (x - width * 0.5) / f;
        let ry = (height * 0.5 - y) / f;
        (forward + right * rx + up * ry).normalized()
    }

    /// Intersects the pixel's ray with the plane through `target` facing the camera.
    pub fn unproject_to_drawing_plane(&self, x: f64, y: f64, width: f64, height: f64) -> Option<Vec3> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        let (forward, _, _) = self.basis();
        let dir = self.screen_ray(x, y, width, height);
        let denom = dir.dot(forward);
        if denom <= 1e-9 {
            return None;
        }
        let eye = self.eye();
        let t = (self.target - eye).dot(forward) / denom;
        Some(eye + dir * t)
    }
}
