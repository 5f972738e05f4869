//! Markup buffer for changelog annotation
//!
//! [`MarkupText`] holds one changelog entry's text and the markup
//! wrapped around spans of it. Wraps are recorded against offsets in
//! the ORIGINAL text, so each match is resolved independently and
//! earlier rewrites never corrupt the offsets of later ones. Rendering
//! interleaves the recorded markup with the untouched original; text
//! is never deleted or reordered.

use std::ops::Range;

/// One changelog entry's text plus the markup recorded against it
#[derive(Debug)]
pub struct MarkupText<'t> {
    text: &'t str,
    tags: Vec<Tag>,
}

#[derive(Debug)]
struct Tag {
    range: Range<usize>,
    open: String,
    close: String,
}

impl<'t> MarkupText<'t> {
    /// Wrap the given text, with no markup yet
    pub fn new(text: &'t str) -> Self {
        Self {
            text,
            tags: Vec::new(),
        }
    }

    /// The original, unannotated text
    pub fn as_str(&self) -> &str {
        self.text
    }

    /// Record opening/closing markup around a span of the original text.
    ///
    /// Spans outside the text or with inverted bounds are ignored; the
    /// annotation pass must never panic over a bad span.
    pub fn wrap(&mut self, range: Range<usize>, open: String, close: String) {
        if range.start > range.end || range.end > self.text.len() {
            tracing::debug!(?range, "ignoring out-of-bounds markup span");
            return;
        }
        if !self.text.is_char_boundary(range.start) || !self.text.is_char_boundary(range.end) {
            tracing::debug!(?range, "ignoring markup span off a char boundary");
            return;
        }
        self.tags.push(Tag { range, open, close });
    }

    /// Render the text with all recorded markup applied.
    ///
    /// Spans are assumed non-overlapping (regex matches are); if two
    /// wraps do overlap, the earlier-starting one wins.
    pub fn render(&self) -> String {
        let mut tags: Vec<&Tag> = self.tags.iter().collect();
        tags.sort_by_key(|t| t.range.start);

        let mut out = String::with_capacity(self.text.len());
        let mut cursor = 0;
        for tag in tags {
            if tag.range.start < cursor {
                continue;
            }
            out.push_str(&self.text[cursor..tag.range.start]);
            out.push_str(&tag.open);
            out.push_str(&self.text[tag.range.clone()]);
            out.push_str(&tag.close);
            cursor = tag.range.end;
        }
        out.push_str(&self.text[cursor..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_markup_is_identity() {
        let markup = MarkupText::new("nothing to see");
        assert_eq!(markup.render(), "nothing to see");
    }

    #[test]
    fn test_single_wrap() {
        let mut markup = MarkupText::new("Fixes 123 today");
        markup.wrap(6..9, "<a>".to_string(), "</a>".to_string());
        assert_eq!(markup.render(), "Fixes <a>123</a> today");
    }

    #[test]
    fn test_multiple_wraps_preserve_outside_text() {
        let mut markup = MarkupText::new("see 12 and 34.");
        markup.wrap(4..6, "<a>".to_string(), "</a>".to_string());
        markup.wrap(11..13, "<b>".to_string(), "</b>".to_string());
        assert_eq!(markup.render(), "see <a>12</a> and <b>34</b>.");
    }

    #[test]
    fn test_wraps_recorded_out_of_order() {
        let mut markup = MarkupText::new("a 1 b 2 c");
        markup.wrap(6..7, "[".to_string(), "]".to_string());
        markup.wrap(2..3, "[".to_string(), "]".to_string());
        assert_eq!(markup.render(), "a [1] b [2] c");
    }

    #[test]
    fn test_out_of_bounds_span_is_ignored() {
        let mut markup = MarkupText::new("short");
        markup.wrap(2..99, "[".to_string(), "]".to_string());
        assert_eq!(markup.render(), "short");
    }

    #[test]
    fn test_non_char_boundary_span_is_ignored() {
        let mut markup = MarkupText::new("héllo");
        // index 2 falls inside the two-byte 'é'
        markup.wrap(1..2, "[".to_string(), "]".to_string());
        assert_eq!(markup.render(), "héllo");
    }

    #[test]
    fn test_empty_text() {
        let markup = MarkupText::new("");
        assert_eq!(markup.render(), "");
    }
}
