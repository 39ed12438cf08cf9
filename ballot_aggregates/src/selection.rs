/// The keyword currently selected by the user.
///
/// At most one keyword is selected at any time. Selecting the same keyword twice
/// clears the selection. The views are not stored here: pass `current()` to
/// `compute` after every change.
///
/// ```
/// use ballot_aggregates::selection::Selection;
///
/// let mut selection = Selection::new();
/// assert_eq!(selection.toggle("Tax"), Some("Tax"));
/// assert_eq!(selection.toggle("Tax"), None);
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Selection {
    current: Option<String>,
}

impl Selection {
    pub fn new() -> Selection {
        Selection { current: None }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Selects a keyword, or clears the selection if this keyword is already selected.
    /// A blank keyword clears the selection.
    ///
    /// Returns the new selection.
    pub fn toggle(&mut self, keyword: &str) -> Option<&str> {
        let keyword = keyword.trim();
        if keyword.is_empty() || self.current.as_deref() == Some(keyword) {
            self.current = None;
        } else {
            self.current = Some(keyword.to_string());
        }
        self.current()
    }

    /// Clears the selection. Returns true if a keyword was selected.
    pub fn clear(&mut self) -> bool {
        self.current.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_switches_between_keywords() {
        let mut selection = Selection::new();
        assert_eq!(selection.current(), None);
        assert_eq!(selection.toggle("Tax"), Some("Tax"));
        assert_eq!(selection.toggle(" Parks "), Some("Parks"));
        assert_eq!(selection.toggle("Parks"), None);
        assert_eq!(selection.current(), None);
    }

    #[test]
    fn blank_toggle_clears() {
        let mut selection = Selection::new();
        selection.toggle("Tax");
        assert_eq!(selection.toggle("  "), None);
    }

    #[test]
    fn clear_reports_changes() {
        let mut selection = Selection::new();
        assert!(!selection.clear());
        selection.toggle("Tax");
        assert!(selection.clear());
        assert_eq!(selection.current(), None);
    }
}
