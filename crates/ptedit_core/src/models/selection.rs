//! External selection model: anchor/focus points addressed by path + offset.

use super::path::Path;
use serde::{Deserialize, Serialize};

/// A position in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub path: Path,
    /// Char offset inside the addressed leaf.
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }
}

/// Anchor/focus pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    /// Both points at `path`/`offset`.
    pub fn collapsed(path: Path, offset: usize) -> Self {
        let point = Point::new(path, offset);
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collapsed_iff_points_equal() {
        let collapsed = Selection::collapsed(Path::child("b", "s"), 3);
        assert!(collapsed.is_collapsed());

        let ranged = Selection::new(
            Point::new(Path::child("b", "s"), 0),
            Point::new(Path::child("b", "s"), 3),
        );
        assert!(!ranged.is_collapsed());
    }

    #[test]
    fn selection_serializes_with_anchor_and_focus() {
        let selection = Selection::collapsed(Path::block("b"), 0);
        assert_eq!(
            serde_json::to_value(&selection).expect("json"),
            json!({
                "anchor": {"path": [{"_key": "b"}], "offset": 0},
                "focus": {"path": [{"_key": "b"}], "offset": 0}
            })
        );
    }
}
