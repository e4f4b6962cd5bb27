//! Engine-native selection: index paths plus char offsets.

/// A position in the engine tree.
///
/// `path` is `[block]` for a block object and `[block, child]` for a leaf
/// or inline object inside a text block.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnginePoint {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl EnginePoint {
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Self { path, offset }
    }

    pub fn block(&self) -> usize {
        self.path.first().copied().unwrap_or(0)
    }

    pub fn child(&self) -> Option<usize> {
        self.path.get(1).copied()
    }
}

/// Anchor/focus pair in engine coordinates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct EngineRange {
    pub anchor: EnginePoint,
    pub focus: EnginePoint,
}

impl EngineRange {
    pub fn new(anchor: EnginePoint, focus: EnginePoint) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: EnginePoint) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// `(start, end)` in document order.
    pub fn ordered(&self) -> (&EnginePoint, &EnginePoint) {
        if self.anchor <= self.focus {
            (&self.anchor, &self.focus)
        } else {
            (&self.focus, &self.anchor)
        }
    }

    /// Whether the anchor comes after the focus.
    pub fn is_backward(&self) -> bool {
        self.anchor > self.focus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_normalizes_direction() {
        let range = EngineRange::new(
            EnginePoint::new(vec![1, 0], 3),
            EnginePoint::new(vec![0, 2], 8),
        );
        let (start, end) = range.ordered();
        assert_eq!(start.path, vec![0, 2]);
        assert_eq!(end.path, vec![1, 0]);
        assert!(range.is_backward());
    }

    #[test]
    fn same_leaf_orders_by_offset() {
        let range = EngineRange::new(
            EnginePoint::new(vec![0, 0], 8),
            EnginePoint::new(vec![0, 0], 3),
        );
        assert_eq!(range.ordered().0.offset, 3);
        assert!(!range.is_collapsed());
    }
}
