//! IME composition tracking for the editable surface.

use std::time::{Duration, Instant};

/// Composition state.
///
/// `composing` is set by any before-input or composition event and cleared
/// once a full quiet period passes without another one. While it is set the
/// surface does not push external documents into the engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompositionState {
    pub composing: bool,
    /// Uncommitted preedit text; never part of the document.
    pub preedit_text: String,
    quiet_until: Option<Instant>,
}

impl CompositionState {
    /// Record input activity, pushing the quiet deadline out to `now + quiet`.
    pub fn touch(&mut self, now: Instant, quiet: Duration) {
        self.composing = true;
        self.quiet_until = Some(now + quiet);
    }

    pub fn update_preedit(&mut self, text: &str, now: Instant, quiet: Duration) {
        self.touch(now, quiet);
        self.preedit_text.clear();
        self.preedit_text.push_str(text);
    }

    /// Drop the preedit; the committed text is handed back by the caller's event.
    pub fn commit(&mut self, now: Instant, quiet: Duration) {
        self.touch(now, quiet);
        self.preedit_text.clear();
    }

    pub fn has_preedit(&self) -> bool {
        !self.preedit_text.is_empty()
    }

    /// Clear `composing` once the quiet period has elapsed.
    ///
    /// # Returns
    /// `true` when this call ended the composition.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.quiet_until {
            Some(deadline) if now >= deadline => {
                self.composing = false;
                self.quiet_until = None;
                self.preedit_text.clear();
                true
            }
            _ => false,
        }
    }

    pub fn quiet_until(&self) -> Option<Instant> {
        self.quiet_until
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(1_000);

    #[test]
    fn composing_clears_after_quiet_period() {
        let start = Instant::now();
        let mut state = CompositionState::default();
        state.touch(start, QUIET);
        assert!(state.composing);
        assert!(!state.tick(start + Duration::from_millis(999)));
        assert!(state.composing);
        assert!(state.tick(start + QUIET));
        assert!(!state.composing);
        assert!(state.quiet_until().is_none());
    }

    #[test]
    fn further_input_extends_the_deadline() {
        let start = Instant::now();
        let mut state = CompositionState::default();
        state.update_preedit("に", start, QUIET);
        state.update_preedit("日", start + Duration::from_millis(800), QUIET);
        assert!(!state.tick(start + Duration::from_millis(1_200)));
        assert_eq!(state.preedit_text, "日");
        state.commit(start + Duration::from_millis(1_300), QUIET);
        assert!(!state.has_preedit());
        assert!(state.tick(start + Duration::from_millis(2_300)));
    }
}
