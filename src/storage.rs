// localStorage persistence for the drawing and the user's tool settings.
use web_sys::Storage;

use crate::model::{Color, Stroke};

const LINES_KEY: &str = "d3_lines";
const COLOR_KEY: &str = "d3_color";
const SHOW_LINES_KEY: &str = "d3_show_lines";

/// Everything restored on startup. Missing keys stay `None` so defaults apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub lines: Vec<Stroke>,
    pub color: Option<Color>,
    pub show_lines: Option<bool>,
}

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

pub fn parse_flag(v: &str) -> bool {
    v == "1" || v == "true"
}

/// Decodes a saved stroke list; corrupt data is dropped rather than failing startup.
pub fn decode_lines(raw: &str) -> Option<Vec<Stroke>> {
    match serde_json::from_str::<Vec<Stroke>>(raw) {
        Ok(lines) => Some(lines),
        Err(e) => {
            log::warn!("discarding saved drawing: {e}");
            None
        }
    }
}

pub fn load_snapshot() -> Option<Snapshot> {
    let store = local_storage()?;
    let get = |key: &str| store.get_item(key).ok().flatten();
    let lines = get(LINES_KEY)
        .and_then(|raw| decode_lines(&raw))
        .unwrap_or_default();
    let color = get(COLOR_KEY).and_then(|raw| match Color::parse(&raw) {
        Ok(c) => Some(c),
        Err(e) => {
            log::warn!("ignoring saved color {raw:?}: {e}");
            None
        }
    });
    let show_lines = get(SHOW_LINES_KEY).map(|v| parse_flag(&v));
    if lines.is_empty() && color.is_none() && show_lines.is_none() {
        return None;
    }
    log::info!("restored {} strokes from local storage", lines.len());
    Some(Snapshot {
        lines,
        color,
        show_lines,
    })
}

pub fn flag_value(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}

fn write(key: &str, value: &str) {
    let Some(store) = local_storage() else {
        return;
    };
    if let Err(e) = store.set_item(key, value) {
        log::warn!("could not persist {key} ({} bytes): {e:?}", value.len());
    }
}

pub fn save_lines(lines: &[Stroke]) {
    match serde_json::to_string(lines) {
        Ok(s) => write(LINES_KEY, &s),
        Err(e) => log::warn!("could not encode drawing: {e}"),
    }
}

pub fn save_color(color: &Color) {
    write(COLOR_KEY, color.as_str());
}

pub fn save_show_lines(show_lines: bool) {
    write(SHOW_LINES_KEY, flag_value(show_lines));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_both_spellings() {
        assert!(parse_flag("1"));
        assert!(parse_flag("true"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("yes"));
    }

    #[test]
    fn flag_values_read_back() {
        assert_eq!(flag_value(true), "1");
        assert!(parse_flag(flag_value(true)));
        assert!(!parse_flag(flag_value(false)));
    }

    #[test]
    fn decodes_saved_strokes() {
        let raw = r##"[{"id":4,"color":"#FF0000","width":0.06,"points":[{"x":0.0,"y":1.0,"z":2.0}]}]"##;
        let lines = decode_lines(raw).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].color.as_str(), "#ff0000");
        assert_eq!(lines[0].created_at_ms, 0.0);
    }

    #[test]
    fn corrupt_data_is_discarded() {
        assert!(decode_lines("not json").is_none());
        assert!(decode_lines(r#"[{"id":1,"color":"red","width":1,"points":[]}]"#).is_none());
    }
}
