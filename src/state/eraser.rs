use crate::model::Stroke;
use crate::state::camera::OrbitCamera;

/// Eraser reach around the pointer, in CSS pixels.
pub const ERASER_RADIUS_PX: f64 = 16.0;

/// Distance from `p` to the segment `a`-`b`, all in screen space.
pub fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq <= f64::EPSILON {
        0.0
    } else {
        (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + abx * t, a.1 + aby * t);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

fn stroke_hit(stroke: &Stroke, camera: &OrbitCamera, width: f64, height: f64, p: (f64, f64), radius: f64) -> bool {
    let projected: Vec<Option<(f64, f64)>> = stroke
        .points
        .iter()
        .map(|pt| camera.project(*pt, width, height).map(|s| (s.x, s.y)))
        .collect();
    let near_point = projected
        .iter()
        .flatten()
        .any(|&q| distance_to_segment(p, q, q) <= radius);
    if near_point {
        return true;
    }
    projected.windows(2).any(|w| match (w[0], w[1]) {
        (Some(a), Some(b)) => distance_to_segment(p, a, b) <= radius,
        _ => false,
    })
}

/// Ids of the strokes passing within `radius` pixels of the pointer.
pub fn strokes_hit(
    lines: &[Stroke],
    camera: &OrbitCamera,
    width: f64,
    height: f64,
    x: f64,
    y: f64,
    radius: f64,
) -> Vec<u64> {
    lines
        .iter()
        .filter(|s| stroke_hit(s, camera, width, height, (x, y), radius))
        .map(|s| s.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Color, Vec3};

    const W: f64 = 800.0;
    const H: f64 = 600.0;

    fn stroke(id: u64, points: Vec<Vec3>) -> Stroke {
        Stroke { id, color: Color::default(), width: 0.05, points, created_at_ms: 0.0 }
    }

    fn flat_camera() -> OrbitCamera {
        OrbitCamera { pitch: 0.0, ..Default::default() }
    }

    #[test]
    fn segment_distance() {
        assert_eq!(distance_to_segment((0.0, 5.0), (-10.0, 0.0), (10.0, 0.0)), 5.0);
        // beyond the end clamps to the endpoint
        assert_eq!(distance_to_segment((13.0, 4.0), (0.0, 0.0), (10.0, 0.0)), 5.0);
        // degenerate segment
        assert_eq!(distance_to_segment((3.0, 4.0), (0.0, 0.0), (0.0, 0.0)), 5.0);
    }

    #[test]
    fn hits_line_crossing_pointer() {
        let cam = flat_camera();
        let lines = vec![
            stroke(1, vec![Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)]),
            stroke(2, vec![Vec3::new(-2.0, 3.0, 0.0), Vec3::new(2.0, 3.0, 0.0)]),
        ];
        let ids = strokes_hit(&lines, &cam, W, H, W / 2.0, H / 2.0, ERASER_RADIUS_PX);
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn hits_single_point_stroke() {
        let cam = flat_camera();
        let lines = vec![stroke(5, vec![Vec3::ZERO])];
        assert_eq!(strokes_hit(&lines, &cam, W, H, W / 2.0 + 3.0, H / 2.0, ERASER_RADIUS_PX), vec![5]);
        assert!(strokes_hit(&lines, &cam, W, H, 0.0, 0.0, ERASER_RADIUS_PX).is_empty());
    }

    #[test]
    fn ignores_strokes_behind_camera() {
        let cam = flat_camera();
        let lines = vec![stroke(9, vec![Vec3::new(0.0, 0.0, 30.0), Vec3::new(0.0, 0.1, 30.0)])];
        assert!(strokes_hit(&lines, &cam, W, H, W / 2.0, H / 2.0, 1e6).is_empty());
    }
}
