//! Core data model for the drawing store.
//! Strokes live in world space; the toolbar flags and undo history sit alongside them
//! so every component reads one reducer handle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::rc::Rc;
use yew::Reducible;

use crate::storage::Snapshot;

pub const DEFAULT_COLOR: &str = "#ffffff";
/// Stroke width in world units.
pub const DEFAULT_STROKE_WIDTH: f64 = 0.06;
/// Points closer than this to the previous point of the active stroke are dropped.
pub const MIN_POINT_SPACING: f64 = 0.02;
pub const MAX_HISTORY: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColorError {
    MissingHash,
    InvalidDigit(char),
    BadLength(usize),
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::MissingHash => write!(f, "color must start with '#'"),
            ColorError::InvalidDigit(c) => write!(f, "invalid hex digit {c:?}"),
            ColorError::BadLength(n) => write!(f, "expected 3 or 6 hex digits, got {n}"),
        }
    }
}

impl std::error::Error for ColorError {}

/// A CSS hex color, always stored as lowercase `#rrggbb`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    pub fn parse(raw: &str) -> Result<Self, ColorError> {
        let hex = raw.trim().strip_prefix('#').ok_or(ColorError::MissingHash)?;
        if let Some(bad) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidDigit(bad));
        }
        let hex = hex.to_ascii_lowercase();
        match hex.len() {
            6 => Ok(Color(format!("#{hex}"))),
            3 => {
                let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
                Ok(Color(format!("#{expanded}")))
            }
            n => Err(ColorError::BadLength(n)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Color(DEFAULT_COLOR.to_string())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, o: Vec3) -> f64 {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    pub fn cross(self, o: Vec3) -> Vec3 {
        Vec3::new(
            self.y * o.z - self.z * o.y,
            self.z * o.x - self.x * o.z,
            self.x * o.y - self.y * o.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction; near-zero vectors are returned unchanged.
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len < 1e-12 { self } else { self * (1.0 / len) }
    }

    pub fn distance(self, o: Vec3) -> f64 {
        (self - o).length()
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f64) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: u64,
    pub color: Color,
    /// Width in world units; the renderer scales it by depth.
    pub width: f64,
    pub points: Vec<Vec3>,
    #[serde(default)]
    pub created_at_ms: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawState {
    pub current_color: Color,
    pub show_color_picker: bool,
    pub show_lines: bool,
    pub is_erasing: bool,
    pub camera_enabled: bool,
    /// Committed strokes, oldest first.
    pub lines: Rc<Vec<Stroke>>,
    /// Stroke currently being drawn, not yet part of `lines`.
    pub active: Option<Stroke>,
    pub undo_stack: Vec<Rc<Vec<Stroke>>>,
    pub redo_stack: Vec<Rc<Vec<Stroke>>>,
    pub next_id: u64,
    /// Bumped whenever `lines` changes; persistence keys off it.
    pub version: u64,
    /// An eraser drag already recorded its undo snapshot.
    pub erase_swipe: bool,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            current_color: Color::default(),
            show_color_picker: false,
            show_lines: true,
            is_erasing: false,
            camera_enabled: false,
            lines: Rc::new(Vec::new()),
            active: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            next_id: 1,
            version: 0,
            erase_swipe: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawAction {
    SetCurrentColor(Color),
    ClearLines,
    ToggleColorPicker,
    ToggleLineVisibility,
    ToggleEraser,
    ToggleCamera,
    BeginStroke { at: Vec3, created_at_ms: f64 },
    ExtendStroke { at: Vec3 },
    EndStroke,
    CancelStroke,
    /// Erases within the current eraser drag; the first hit records one undo step.
    EraseStrokes { ids: Vec<u64> },
    /// The eraser drag ended; the next erase starts a new undo step.
    EndEraseSwipe,
    Undo,
    Redo,
}

impl DrawState {
    /// Rebuilds a store from persisted data. Ids are reassigned so they stay unique.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut lines = snapshot.lines;
        lines.retain(|s| !s.points.is_empty());
        for (i, s) in lines.iter_mut().enumerate() {
            s.id = i as u64 + 1;
        }
        let next_id = lines.len() as u64 + 1;
        Self {
            current_color: snapshot.color.unwrap_or_default(),
            show_lines: snapshot.show_lines.unwrap_or(true),
            lines: Rc::new(lines),
            next_id,
            ..Default::default()
        }
    }

    fn record_history(&mut self) {
        self.undo_stack.push(self.lines.clone());
        if self.undo_stack.len() > MAX_HISTORY {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
        self.erase_swipe = false;
    }

    /// True when `action` would leave the state untouched.
    fn is_noop(&self, action: &DrawAction) -> bool {
        use DrawAction::*;
        match action {
            SetCurrentColor(color) => *color == self.current_color,
            ClearLines => self.lines.is_empty() && self.active.is_none(),
            ExtendStroke { at } => match &self.active {
                None => true,
                Some(active) => active
                    .points
                    .last()
                    .is_some_and(|last| last.distance(*at) < MIN_POINT_SPACING),
            },
            EndStroke | CancelStroke => self.active.is_none(),
            EraseStrokes { ids } => !self.lines.iter().any(|s| ids.contains(&s.id)),
            EndEraseSwipe => !self.erase_swipe,
            Undo => self.undo_stack.is_empty(),
            Redo => self.redo_stack.is_empty(),
            ToggleColorPicker | ToggleLineVisibility | ToggleEraser | ToggleCamera | BeginStroke { .. } => {
                false
            }
        }
    }

    /// Moves the active stroke into `lines`. Returns false when nothing was drawing.
    fn commit_active(&mut self) -> bool {
        let Some(stroke) = self.active.take() else {
            return false;
        };
        self.record_history();
        Rc::make_mut(&mut self.lines).push(stroke);
        self.version += 1;
        true
    }
}

impl Reducible for DrawState {
    type Action = DrawAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        use DrawAction::*;
        if self.is_noop(&action) {
            return self;
        }
        let mut new = (*self).clone();
        match action {
            SetCurrentColor(color) => new.current_color = color,
            ToggleColorPicker => new.show_color_picker = !new.show_color_picker,
            ToggleLineVisibility => new.show_lines = !new.show_lines,
            ToggleEraser => new.is_erasing = !new.is_erasing,
            ToggleCamera => new.camera_enabled = !new.camera_enabled,
            ClearLines => {
                new.active = None;
                if !new.lines.is_empty() {
                    new.record_history();
                    new.lines = Rc::new(Vec::new());
                    new.version += 1;
                }
            }
            BeginStroke { at, created_at_ms } => {
                new.commit_active();
                let id = new.next_id;
                new.next_id += 1;
                new.active = Some(Stroke {
                    id,
                    color: new.current_color.clone(),
                    width: DEFAULT_STROKE_WIDTH,
                    points: vec![at],
                    created_at_ms,
                });
            }
            ExtendStroke { at } => {
                if let Some(active) = new.active.as_mut() {
                    active.points.push(at);
                }
            }
            EndStroke => {
                new.commit_active();
            }
            CancelStroke => new.active = None,
            EraseStrokes { ids } => {
                if !new.erase_swipe {
                    new.record_history();
                    new.erase_swipe = true;
                }
                Rc::make_mut(&mut new.lines).retain(|s| !ids.contains(&s.id));
                new.version += 1;
            }
            EndEraseSwipe => new.erase_swipe = false,
            Undo => {
                if let Some(prev) = new.undo_stack.pop() {
                    new.active = None;
                    new.erase_swipe = false;
                    let current = std::mem::replace(&mut new.lines, prev);
                    new.redo_stack.push(current);
                    new.version += 1;
                }
            }
            Redo => {
                if let Some(next) = new.redo_stack.pop() {
                    new.active = None;
                    new.erase_swipe = false;
                    let current = std::mem::replace(&mut new.lines, next);
                    new.undo_stack.push(current);
                    new.version += 1;
                }
            }
        }
        Rc::new(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(state: Rc<DrawState>, actions: impl IntoIterator<Item = DrawAction>) -> Rc<DrawState> {
        actions.into_iter().fold(state, |s, a| s.reduce(a))
    }

    fn draw_line(state: Rc<DrawState>, from: Vec3, to: Vec3) -> Rc<DrawState> {
        apply(
            state,
            [
                DrawAction::BeginStroke { at: from, created_at_ms: 0.0 },
                DrawAction::ExtendStroke { at: to },
                DrawAction::EndStroke,
            ],
        )
    }

    #[test]
    fn color_parse_normalizes() {
        assert_eq!(Color::parse("#FFAA00").unwrap().as_str(), "#ffaa00");
        assert_eq!(Color::parse(" #f0a ").unwrap().as_str(), "#ff00aa");
        assert_eq!(Color::parse("ff0000"), Err(ColorError::MissingHash));
        assert_eq!(Color::parse("#12345g"), Err(ColorError::InvalidDigit('g')));
        assert_eq!(Color::parse("#1234"), Err(ColorError::BadLength(4)));
    }

    #[test]
    fn color_rejects_bad_json() {
        assert!(serde_json::from_str::<Color>("\"#00ff00\"").is_ok());
        assert!(serde_json::from_str::<Color>("\"green\"").is_err());
    }

    #[test]
    fn defaults_match_toolbar_expectations() {
        let s = DrawState::default();
        assert_eq!(s.current_color.as_str(), DEFAULT_COLOR);
        assert!(!s.show_color_picker);
        assert!(s.show_lines);
        assert!(!s.is_erasing);
        assert!(!s.camera_enabled);
        assert!(s.lines.is_empty());
    }

    #[test]
    fn toggles_flip_exactly_one_flag() {
        let s0 = Rc::new(DrawState::default());
        let s = s0.clone().reduce(DrawAction::ToggleEraser);
        assert!(s.is_erasing);
        assert_eq!(s.camera_enabled, s0.camera_enabled);
        assert_eq!(s.show_lines, s0.show_lines);
        let s = s.reduce(DrawAction::ToggleEraser);
        assert!(!s.is_erasing);

        let s = s.reduce(DrawAction::ToggleCamera);
        assert!(s.camera_enabled);
        let s = s.reduce(DrawAction::ToggleLineVisibility);
        assert!(!s.show_lines);
        let s = s.reduce(DrawAction::ToggleColorPicker);
        assert!(s.show_color_picker);
        let s = s.reduce(DrawAction::ToggleColorPicker);
        assert!(!s.show_color_picker);
    }

    #[test]
    fn set_color_applies_to_new_strokes() {
        let red = Color::parse("#ff0000").unwrap();
        let s = Rc::new(DrawState::default()).reduce(DrawAction::SetCurrentColor(red.clone()));
        let s = draw_line(s, Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(s.lines[0].color, red);
    }

    #[test]
    fn same_color_is_a_noop() {
        let s = Rc::new(DrawState::default());
        let s2 = s.clone().reduce(DrawAction::SetCurrentColor(Color::default()));
        assert!(Rc::ptr_eq(&s, &s2));
    }

    #[test]
    fn stroke_lifecycle_commits_on_end() {
        let s = Rc::new(DrawState::default()).reduce(DrawAction::BeginStroke {
            at: Vec3::ZERO,
            created_at_ms: 42.0,
        });
        assert!(s.active.is_some());
        assert!(s.lines.is_empty());
        let s = s.reduce(DrawAction::ExtendStroke { at: Vec3::new(0.5, 0.0, 0.0) });
        assert_eq!(s.active.as_ref().unwrap().points.len(), 2);
        let s = s.reduce(DrawAction::EndStroke);
        assert!(s.active.is_none());
        assert_eq!(s.lines.len(), 1);
        assert_eq!(s.lines[0].created_at_ms, 42.0);
        assert_eq!(s.version, 1);
        assert!(!s.undo_stack.is_empty());
    }

    #[test]
    fn extend_drops_points_that_are_too_close() {
        let s = Rc::new(DrawState::default()).reduce(DrawAction::BeginStroke {
            at: Vec3::ZERO,
            created_at_ms: 0.0,
        });
        let s2 = s.clone().reduce(DrawAction::ExtendStroke {
            at: Vec3::new(MIN_POINT_SPACING / 2.0, 0.0, 0.0),
        });
        assert!(Rc::ptr_eq(&s, &s2));
    }

    #[test]
    fn extend_without_active_stroke_is_ignored() {
        let s = Rc::new(DrawState::default());
        let s2 = s.clone().reduce(DrawAction::ExtendStroke { at: Vec3::UP });
        assert!(Rc::ptr_eq(&s, &s2));
    }

    #[test]
    fn single_point_stroke_is_kept() {
        let s = apply(
            Rc::new(DrawState::default()),
            [
                DrawAction::BeginStroke { at: Vec3::UP, created_at_ms: 0.0 },
                DrawAction::EndStroke,
            ],
        );
        assert_eq!(s.lines.len(), 1);
        assert_eq!(s.lines[0].points, vec![Vec3::UP]);
    }

    #[test]
    fn cancel_discards_active_stroke_without_history() {
        let s = apply(
            Rc::new(DrawState::default()),
            [
                DrawAction::BeginStroke { at: Vec3::ZERO, created_at_ms: 0.0 },
                DrawAction::CancelStroke,
            ],
        );
        assert!(s.active.is_none());
        assert!(s.lines.is_empty());
        assert!(s.undo_stack.is_empty());
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut s = Rc::new(DrawState::default());
        for i in 0..5 {
            s = draw_line(s, Vec3::new(i as f64, 0.0, 0.0), Vec3::new(i as f64, 1.0, 0.0));
        }
        let ids: Vec<u64> = s.lines.iter().map(|l| l.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn begin_while_drawing_commits_previous() {
        let s = apply(
            Rc::new(DrawState::default()),
            [
                DrawAction::BeginStroke { at: Vec3::ZERO, created_at_ms: 0.0 },
                DrawAction::BeginStroke { at: Vec3::UP, created_at_ms: 1.0 },
            ],
        );
        assert_eq!(s.lines.len(), 1);
        assert_eq!(s.active.as_ref().unwrap().points[0], Vec3::UP);
    }

    #[test]
    fn clear_lines_is_undoable() {
        let s = draw_line(Rc::new(DrawState::default()), Vec3::ZERO, Vec3::UP);
        let s = s.reduce(DrawAction::ClearLines);
        assert!(s.lines.is_empty());
        let s = s.reduce(DrawAction::Undo);
        assert_eq!(s.lines.len(), 1);
        let s = s.reduce(DrawAction::Redo);
        assert!(s.lines.is_empty());
    }

    #[test]
    fn clear_on_empty_canvas_is_noop() {
        let s = Rc::new(DrawState::default());
        let s2 = s.clone().reduce(DrawAction::ClearLines);
        assert!(Rc::ptr_eq(&s, &s2));
    }

    #[test]
    fn clear_does_not_touch_flags() {
        let s = apply(
            Rc::new(DrawState::default()),
            [DrawAction::ToggleEraser, DrawAction::ToggleLineVisibility],
        );
        let s = draw_line(s, Vec3::ZERO, Vec3::UP).reduce(DrawAction::ClearLines);
        assert!(s.is_erasing);
        assert!(!s.show_lines);
    }

    #[test]
    fn erase_removes_only_known_ids() {
        let s = draw_line(Rc::new(DrawState::default()), Vec3::ZERO, Vec3::UP);
        let s = draw_line(s, Vec3::UP, Vec3::new(1.0, 1.0, 0.0));
        let (gone, keep) = (s.lines[0].id, s.lines[1].id);
        let s = s.reduce(DrawAction::EraseStrokes { ids: vec![gone, 999] });
        assert_eq!(s.lines.len(), 1);
        assert_eq!(s.lines[0].id, keep);

        let s2 = s.clone().reduce(DrawAction::EraseStrokes { ids: vec![999] });
        assert!(Rc::ptr_eq(&s, &s2));
    }

    #[test]
    fn eraser_swipe_is_one_undo_step() {
        let mut s = Rc::new(DrawState::default());
        for i in 0..3 {
            s = draw_line(s, Vec3::new(i as f64, 0.0, 0.0), Vec3::new(i as f64, 1.0, 0.0));
        }
        let history = s.undo_stack.len();
        let ids: Vec<u64> = s.lines.iter().map(|l| l.id).collect();
        let s = apply(
            s,
            ids.iter()
                .map(|&id| DrawAction::EraseStrokes { ids: vec![id] })
                .chain([DrawAction::EndEraseSwipe]),
        );
        assert!(s.lines.is_empty());
        assert!(!s.erase_swipe);
        assert_eq!(s.undo_stack.len(), history + 1);

        let s = s.reduce(DrawAction::Undo);
        assert_eq!(s.lines.len(), 3);
    }

    #[test]
    fn separate_swipes_undo_separately() {
        let s = draw_line(Rc::new(DrawState::default()), Vec3::ZERO, Vec3::UP);
        let s = draw_line(s, Vec3::UP, Vec3::new(1.0, 1.0, 0.0));
        let (first, second) = (s.lines[0].id, s.lines[1].id);
        let s = apply(
            s,
            [
                DrawAction::EraseStrokes { ids: vec![first] },
                DrawAction::EndEraseSwipe,
                DrawAction::EraseStrokes { ids: vec![second] },
                DrawAction::EndEraseSwipe,
            ],
        );
        let s = s.reduce(DrawAction::Undo);
        assert_eq!(s.lines.iter().map(|l| l.id).collect::<Vec<_>>(), vec![second]);
    }

    #[test]
    fn undo_mid_swipe_starts_a_new_step() {
        let s = draw_line(Rc::new(DrawState::default()), Vec3::ZERO, Vec3::UP);
        let s = draw_line(s, Vec3::UP, Vec3::new(1.0, 1.0, 0.0));
        let (first, second) = (s.lines[0].id, s.lines[1].id);
        let s = apply(s, [DrawAction::EraseStrokes { ids: vec![first] }, DrawAction::Undo]);
        assert!(!s.erase_swipe);
        let s = s.reduce(DrawAction::EraseStrokes { ids: vec![second] });
        let s = s.reduce(DrawAction::Undo);
        assert_eq!(s.lines.len(), 2);
    }

    #[test]
    fn end_swipe_without_erase_is_noop() {
        let s = Rc::new(DrawState::default());
        let s2 = s.clone().reduce(DrawAction::EndEraseSwipe);
        assert!(Rc::ptr_eq(&s, &s2));
    }

    #[test]
    fn decimated_points_return_the_same_state() {
        let s = Rc::new(DrawState::default()).reduce(DrawAction::BeginStroke {
            at: Vec3::ZERO,
            created_at_ms: 0.0,
        });
        let near = Vec3::new(MIN_POINT_SPACING / 2.0, 0.0, 0.0);
        let s2 = s.clone().reduce(DrawAction::ExtendStroke { at: near });
        assert!(Rc::ptr_eq(&s, &s2));
        for action in [DrawAction::Redo, DrawAction::Undo] {
            let s3 = s.clone().reduce(action);
            assert!(Rc::ptr_eq(&s, &s3));
        }
    }

    #[test]
    fn new_mutation_clears_redo() {
        let s = draw_line(Rc::new(DrawState::default()), Vec3::ZERO, Vec3::UP);
        let s = s.reduce(DrawAction::Undo);
        assert!(!s.redo_stack.is_empty());
        let s = draw_line(s, Vec3::UP, Vec3::ZERO);
        assert!(s.redo_stack.is_empty());
    }

    #[test]
    fn history_is_bounded() {
        let mut s = Rc::new(DrawState::default());
        for i in 0..(MAX_HISTORY + 10) {
            s = draw_line(s, Vec3::new(i as f64, 0.0, 0.0), Vec3::new(i as f64, 1.0, 0.0));
        }
        assert_eq!(s.undo_stack.len(), MAX_HISTORY);
        for _ in 0..MAX_HISTORY {
            s = s.reduce(DrawAction::Undo);
        }
        assert_eq!(s.lines.len(), 10);
        let s2 = s.clone().reduce(DrawAction::Undo);
        assert!(Rc::ptr_eq(&s, &s2));
    }

    #[test]
    fn snapshot_restore_reassigns_ids() {
        let stroke = |id| Stroke {
            id,
            color: Color::default(),
            width: DEFAULT_STROKE_WIDTH,
            points: vec![Vec3::ZERO],
            created_at_ms: 0.0,
        };
        let mut empty = stroke(3);
        empty.points.clear();
        let s = DrawState::from_snapshot(Snapshot {
            lines: vec![stroke(7), stroke(7), empty],
            color: Color::parse("#00ff00").ok(),
            show_lines: Some(false),
        });
        assert_eq!(s.lines.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(s.next_id, 3);
        assert_eq!(s.current_color.as_str(), "#00ff00");
        assert!(!s.show_lines);
        assert!(s.undo_stack.is_empty());
    }
}
