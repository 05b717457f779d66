//! Shown-comment cache.
//!
//! Tracks which comment text the UI should show and whether it changed
//! since the UI last drew it.

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommentView {
    text: Option<String>,
    dirty: bool,
}

impl CommentView {
    /// Sync with the comment of the new cursor node.
    ///
    /// A present comment always replaces the text and marks it dirty. An
    /// absent one marks dirty only when it clears previously shown text.
    /// A pending redraw is never dropped here.
    pub fn update(&mut self, comment: Option<&str>) {
        match comment {
            Some(c) => {
                self.text = Some(c.to_string());
                self.dirty = true;
            }
            None => {
                if self.text.take().is_some() {
                    self.dirty = true;
                }
            }
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_shown(&self) -> bool {
        self.text.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The UI has drawn the current text.
    pub fn mark_drawn(&mut self) {
        self.dirty = false;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
