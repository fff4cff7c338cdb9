//! The draft editor — a multi-line text area with ghost-text suggestions.
//!
//! Features:
//! - Free-form typing with cursor movement and word deletion
//! - Pending suggestion rendered as dim italic ghost text after the draft
//! - Tab merges the ghost text into the draft
//! - Footer line for errors, the delayed loading indicator, and key hints

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use cowriter_core::session::EditorSession;

use crate::action::Action;
use crate::components::Component;
use crate::theme::Theme;

pub struct EditorComponent {
    /// Draft text and attached suggestion. The App reads this to schedule
    /// fetches and writes resolved suggestions into it.
    pub session: EditorSession,
    /// Cursor position (byte offset) within the draft.
    cursor: usize,
    /// Scroll offset (first visible visual line).
    scroll: usize,
    /// Last fetch error, shown in the footer. The App keeps this in sync
    /// with the suggestion controller.
    pub error: Option<String>,
    /// Whether the delayed loading indicator should show.
    pub loading: bool,
    /// Whether keystrokes currently go to the draft.
    pub focused: bool,
}

/// A wrapped display row. `start` is the byte offset of this segment
/// within the full preview string, so the ghost boundary can be located
/// per row.
struct VisualLine {
    start: usize,
    text: String,
    cursor_col: Option<usize>,
}

impl EditorComponent {
    pub fn new() -> Self {
        Self {
            session: EditorSession::new(),
            cursor: 0,
            scroll: 0,
            error: None,
            loading: false,
            focused: true,
        }
    }

    /// Clamp cursor to the draft. The draft can shrink underneath the
    /// cursor when a suggestion edit replaces the text.
    fn clamp_cursor(&mut self) {
        let len = self.session.text().len();
        if self.cursor > len {
            self.cursor = len;
        }
    }

    /// Insert a character at the cursor position.
    fn insert_char(&mut self, c: char) {
        self.clamp_cursor();
        let mut text = self.session.text().to_string();
        text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        self.session.edit(text);
        self.ensure_cursor_visible();
    }

    /// Delete the character before the cursor.
    fn delete_char(&mut self) -> bool {
        self.clamp_cursor();
        if self.cursor == 0 {
            return false;
        }
        let mut text = self.session.text().to_string();
        let prev = text[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0);
        text.remove(prev);
        self.cursor = prev;
        self.session.edit(text);
        self.ensure_cursor_visible();
        true
    }

    /// Delete the word before the cursor (Ctrl+W).
    fn delete_word(&mut self) -> bool {
        self.clamp_cursor();
        if self.cursor == 0 {
            return false;
        }
        let mut text = self.session.text().to_string();
        let mut end = self.cursor;
        while end > 0 && text.as_bytes().get(end - 1) == Some(&b' ') {
            end -= 1;
        }
        let mut start = end;
        while start > 0 && text.as_bytes().get(start - 1) != Some(&b' ') {
            start -= 1;
        }
        text.drain(start..self.cursor);
        self.cursor = start;
        self.session.edit(text);
        self.ensure_cursor_visible();
        true
    }

    /// Insert a string at the cursor position (for paste).
    fn insert_str(&mut self, s: &str) {
        self.clamp_cursor();
        let mut text = self.session.text().to_string();
        text.insert_str(self.cursor, s);
        self.cursor += s.len();
        self.session.edit(text);
        self.ensure_cursor_visible();
    }

    /// Get the line number and column of the cursor within the text.
    fn cursor_line_col(&self, text: &str, cursor: usize) -> (usize, usize) {
        let before = &text[..cursor.min(text.len())];
        let line = before.matches('\n').count();
        let col = before.rfind('\n').map(|p| cursor - p - 1).unwrap_or(cursor);
        (line, col)
    }

    fn cursor_left(&mut self) {
        self.clamp_cursor();
        if self.cursor > 0 {
            self.cursor = self.session.text()[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
        self.ensure_cursor_visible();
    }

    fn cursor_right(&mut self) {
        self.clamp_cursor();
        let text = self.session.text();
        if let Some(c) = text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
        self.ensure_cursor_visible();
    }

    /// Move cursor up one logical line.
    fn cursor_up(&mut self) {
        let text = self.session.text();
        let (line, col) = self.cursor_line_col(text, self.cursor);
        if line == 0 {
            return;
        }
        let lines: Vec<&str> = text.split('\n').collect();
        let prev_line = lines[line - 1];
        let prev_line_start: usize = lines[..line - 1].iter().map(|l| l.len() + 1).sum();
        self.cursor = prev_line_start + snap_to_char_boundary(prev_line, col);
        self.ensure_cursor_visible();
    }

    /// Move cursor down one logical line.
    fn cursor_down(&mut self) {
        let text = self.session.text();
        let lines: Vec<&str> = text.split('\n').collect();
        let (line, col) = self.cursor_line_col(text, self.cursor);
        if line + 1 >= lines.len() {
            return;
        }
        let next_line = lines[line + 1];
        let next_line_start: usize = lines[..line + 1].iter().map(|l| l.len() + 1).sum();
        self.cursor = next_line_start + snap_to_char_boundary(next_line, col);
        self.ensure_cursor_visible();
    }

    /// Ensure the cursor's line is visible within the scroll viewport.
    /// Uses a conservative viewport estimate (actual height adjusted at render).
    fn ensure_cursor_visible(&mut self) {
        let (cursor_line, _) = self.cursor_line_col(self.session.text(), self.cursor);
        if cursor_line < self.scroll {
            self.scroll = cursor_line;
        }
        let estimated_viewport = 6usize;
        if cursor_line >= self.scroll + estimated_viewport {
            self.scroll = cursor_line.saturating_sub(estimated_viewport - 1);
        }
    }
}

impl Component for EditorComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            // ── Text input ──────────────────────────────────────
            Action::CharInput(c) => {
                self.insert_char(*c);
                Some(Action::PromptChanged)
            }
            Action::BackspaceInput => {
                if self.delete_char() {
                    Some(Action::PromptChanged)
                } else {
                    None
                }
            }
            Action::DeleteWord => {
                if self.delete_word() {
                    Some(Action::PromptChanged)
                } else {
                    None
                }
            }
            Action::NewlineInput => {
                self.insert_char('\n');
                Some(Action::PromptChanged)
            }
            Action::PasteBulk(text) => {
                if text.is_empty() {
                    None
                } else {
                    self.insert_str(text);
                    Some(Action::PromptChanged)
                }
            }

            // ── Cursor movement ─────────────────────────────────
            Action::CursorLeft => {
                self.cursor_left();
                None
            }
            Action::CursorRight => {
                self.cursor_right();
                None
            }
            Action::CursorUp => {
                self.cursor_up();
                None
            }
            Action::CursorDown => {
                self.cursor_down();
                None
            }

            // ── Accept ──────────────────────────────────────────
            // The merged draft does not refetch on its own; the next
            // keystroke starts a new debounce window.
            Action::AcceptSuggestion => {
                if self.session.accept() {
                    self.cursor = self.session.text().len();
                    self.ensure_cursor_visible();
                }
                None
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Min(4),    // Draft text area
            Constraint::Length(2), // Footer: error / loading / hints
        ])
        .split(area);

        self.render_draft(frame, chunks[0]);
        self.render_footer(frame, chunks[1]);
    }
}

impl EditorComponent {
    /// Render the draft with cursor, word-wrap, scroll, and the ghost tail.
    fn render_draft(&self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            Style::default().fg(Theme::accent())
        } else {
            Theme::border()
        };

        let text = self.session.text();
        let preview = self.session.preview();
        // The preview starts with the live text verbatim; everything past
        // this offset is ghost.
        let ghost_start = text.len();

        let title = if text.is_empty() {
            " Draft ".to_string()
        } else {
            let words = text.split_whitespace().count();
            format!(
                " Draft ({} word{}, {} chars) ",
                words,
                if words == 1 { "" } else { "s" },
                text.chars().count()
            )
        };

        let block = Block::default()
            .title(title.clone())
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner_area = block.inner(area);
        let viewport_height = inner_area.height as usize;

        if preview.is_empty() {
            let placeholder = Paragraph::new(Span::styled("Enter your text here...", Theme::dim()))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        }

        let viewport_width = inner_area.width as usize;
        let wrap_width = if viewport_width > 0 { viewport_width } else { 80 };

        // Word-wrap the preview into visual lines, tracking byte offsets so
        // the ghost boundary and cursor can be placed per row.
        let logical_lines: Vec<&str> = preview.split('\n').collect();
        let (cursor_logical, cursor_col_in_logical) = self.cursor_line_col(&preview, self.cursor);

        let mut visual_lines: Vec<VisualLine> = Vec::new();
        let mut cursor_visual_line: usize = 0;
        let mut line_start = 0usize;

        for (li, logical_text) in logical_lines.iter().enumerate() {
            let is_cursor_logical = self.focused && li == cursor_logical;
            let wrapped = wrap_line(logical_text, wrap_width);

            let mut col_offset = 0usize;
            for segment in &wrapped {
                let seg_len = segment.len();
                let cursor_col = if is_cursor_logical {
                    let c = cursor_col_in_logical;
                    if c >= col_offset && c <= col_offset + seg_len {
                        // Cursor at the exact segment boundary belongs to the
                        // next visual line, unless this is the last segment.
                        if c == col_offset + seg_len && col_offset + seg_len < logical_text.len() {
                            None
                        } else {
                            cursor_visual_line = visual_lines.len();
                            Some(c - col_offset)
                        }
                    } else {
                        None
                    }
                } else {
                    None
                };
                visual_lines.push(VisualLine {
                    start: line_start + col_offset,
                    text: segment.clone(),
                    cursor_col,
                });
                col_offset += seg_len;
            }
            line_start += logical_text.len() + 1;
        }

        let total_visual = visual_lines.len();

        // Adjust scroll based on visual lines.
        let scroll = {
            let mut s = self.scroll;
            if cursor_visual_line < s {
                s = cursor_visual_line;
            }
            if viewport_height > 0 && cursor_visual_line >= s + viewport_height {
                s = cursor_visual_line - viewport_height + 1;
            }
            s
        };

        let mut rendered_lines: Vec<Line> = Vec::new();
        for vl in visual_lines.iter().skip(scroll) {
            if rendered_lines.len() >= viewport_height {
                break;
            }
            rendered_lines.push(self.draft_line(vl, ghost_start));
        }

        // Show scroll indicator in border if content overflows.
        let has_more_above = scroll > 0;
        let has_more_below = scroll + viewport_height < total_visual;
        let scroll_hint = if has_more_above && has_more_below {
            format!(" [{}/{} vis.lines] ", scroll + viewport_height, total_visual)
        } else if has_more_below {
            format!(" [{} more below] ", total_visual - scroll - viewport_height)
        } else if has_more_above {
            format!(" [{} above] ", scroll)
        } else {
            String::new()
        };

        let block = if !scroll_hint.is_empty() {
            Block::default()
                .title(title)
                .title_bottom(Line::from(Span::styled(&scroll_hint, Theme::dim())))
                .borders(Borders::ALL)
                .border_style(border_style)
        } else {
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style)
        };

        let display = Paragraph::new(rendered_lines).block(block);
        frame.render_widget(display, area);
    }

    /// Style one visual line: live text, optional cursor cell, ghost tail.
    fn draft_line<'a>(&self, vl: &'a VisualLine, ghost_start: usize) -> Line<'a> {
        let line_end = vl.start + vl.text.len();
        let ghost_local = ghost_start.clamp(vl.start, line_end) - vl.start;

        match vl.cursor_col {
            Some(col) => {
                let col = col.min(vl.text.len());
                let (before, after) = vl.text.split_at(col);
                let cursor_char = if after.is_empty() {
                    " ".to_string()
                } else {
                    after.chars().next().unwrap().to_string()
                };
                let consumed = if after.is_empty() { 0 } else { cursor_char.len() };
                let rest = &after[consumed..];
                // The cursor never sits past the ghost boundary, but the
                // remainder of the row may straddle it.
                let rest_start = col + consumed;
                let ghost_in_rest = ghost_local.saturating_sub(rest_start).min(rest.len());
                Line::from(vec![
                    Span::styled(before, Theme::normal()),
                    Span::styled(cursor_char, Theme::cursor()),
                    Span::styled(&rest[..ghost_in_rest], Theme::normal()),
                    Span::styled(&rest[ghost_in_rest..], Theme::ghost()),
                ])
            }
            None => {
                let (live, ghost) = vl.text.split_at(ghost_local);
                Line::from(vec![
                    Span::styled(live, Theme::normal()),
                    Span::styled(ghost, Theme::ghost()),
                ])
            }
        }
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let line = if let Some(ref error) = self.error {
            Line::from(Span::styled(
                format!("Error: {}", error),
                Style::default().fg(Theme::error()),
            ))
        } else if self.loading {
            Line::from(Span::styled(
                "Fetching suggestion...",
                Style::default().fg(Theme::warning()),
            ))
        } else if self.session.has_suggestion() {
            Line::from(vec![
                Span::styled("  tab", Theme::key_hint()),
                Span::styled(" accept  ", Theme::dim()),
                Span::styled("keep typing", Theme::key_hint()),
                Span::styled(" to consume or dismiss", Theme::dim()),
            ])
        } else {
            Line::from(vec![
                Span::styled("  esc", Theme::key_hint()),
                Span::styled(" commands  ", Theme::dim()),
                Span::styled("ctrl+w", Theme::key_hint()),
                Span::styled(" delete word", Theme::dim()),
            ])
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Word-wrap a single logical line to fit within `max_width` columns.
/// Returns a list of visual line segments. Tries to break at word boundaries;
/// falls back to hard breaks if a word is longer than the width. Widths are
/// counted in chars and every break lands on a char boundary.
fn wrap_line(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }
    if text.is_empty() {
        return vec![String::new()];
    }
    if text.chars().count() <= max_width {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        // Byte offset of the first char that no longer fits.
        let fit_end = match remaining.char_indices().nth(max_width) {
            Some((i, _)) => i,
            None => {
                // The rest fits on one row.
                lines.push(remaining.to_string());
                break;
            }
        };

        // Find the last space within the fitting chunk to break at.
        let chunk = &remaining[..fit_end];
        let break_pos = if let Some(pos) = chunk.rfind(' ') {
            // Don't break too early — at least a third of the width should be used.
            if pos > fit_end / 3 {
                pos + 1 // Include the space on the current line.
            } else {
                fit_end // Hard break.
            }
        } else {
            fit_end // No space found — hard break.
        };

        let (line, rest) = remaining.split_at(break_pos);
        lines.push(line.to_string());
        remaining = rest;
    }

    lines
}

/// Walk a byte column back to the nearest char boundary at or before it.
/// Vertical cursor moves carry the byte column across lines, and it can
/// land inside a multibyte char on the target line.
fn snap_to_char_boundary(line: &str, col: usize) -> usize {
    let mut col = col.min(line.len());
    while !line.is_char_boundary(col) {
        col -= 1;
    }
    col
}

#[cfg(test)]
mod tests {
    use super::*;
    use cowriter_core::session::SessionState;

    fn type_str(editor: &mut EditorComponent, s: &str) {
        for c in s.chars() {
            editor.handle_action(&Action::CharInput(c));
        }
    }

    #[test]
    fn typing_advances_cursor_and_reports_changes() {
        let mut editor = EditorComponent::new();
        let chained = editor.handle_action(&Action::CharInput('h'));
        assert!(matches!(chained, Some(Action::PromptChanged)));
        type_str(&mut editor, "ello");
        assert_eq!(editor.session.text(), "hello");
        assert_eq!(editor.cursor, 5);
    }

    #[test]
    fn backspace_at_start_reports_nothing() {
        let mut editor = EditorComponent::new();
        assert!(editor.handle_action(&Action::BackspaceInput).is_none());
        type_str(&mut editor, "ab");
        assert!(matches!(
            editor.handle_action(&Action::BackspaceInput),
            Some(Action::PromptChanged)
        ));
        assert_eq!(editor.session.text(), "a");
    }

    #[test]
    fn delete_word_removes_word_and_preceding_spaces() {
        let mut editor = EditorComponent::new();
        type_str(&mut editor, "one two   three");
        editor.handle_action(&Action::DeleteWord);
        assert_eq!(editor.session.text(), "one two   ");
        editor.handle_action(&Action::DeleteWord);
        assert_eq!(editor.session.text(), "one ");
    }

    #[test]
    fn typing_through_ghost_text_consumes_it() {
        let mut editor = EditorComponent::new();
        type_str(&mut editor, "The weather ");
        editor.session.resolve("is nice".to_string());
        type_str(&mut editor, "is");
        assert_eq!(editor.session.suggestion(), Some(" nice"));
        // a contradicting keystroke drops the ghost
        editor.handle_action(&Action::CharInput('x'));
        assert!(!editor.session.has_suggestion());
    }

    #[test]
    fn accept_moves_cursor_to_end_of_merged_draft() {
        let mut editor = EditorComponent::new();
        type_str(&mut editor, "The weather is nice ");
        editor.session.resolve("and warm".to_string());
        editor.handle_action(&Action::AcceptSuggestion);
        assert_eq!(editor.session.text(), "The weather is nice and warm.");
        assert_eq!(editor.cursor, editor.session.text().len());
        assert_eq!(editor.session.state(), SessionState::Idle);
    }

    #[test]
    fn accept_without_suggestion_is_a_noop() {
        let mut editor = EditorComponent::new();
        type_str(&mut editor, "abc");
        editor.handle_action(&Action::AcceptSuggestion);
        assert_eq!(editor.session.text(), "abc");
        assert_eq!(editor.cursor, 3);
    }

    #[test]
    fn cursor_moves_across_logical_lines() {
        let mut editor = EditorComponent::new();
        type_str(&mut editor, "short");
        editor.handle_action(&Action::NewlineInput);
        type_str(&mut editor, "a longer line");
        editor.handle_action(&Action::CursorUp);
        // column clamps to the shorter line
        assert_eq!(editor.cursor, 5);
        editor.handle_action(&Action::CursorDown);
        assert_eq!(editor.cursor, 11);
    }

    #[test]
    fn vertical_moves_snap_to_char_boundaries() {
        let mut editor = EditorComponent::new();
        type_str(&mut editor, "héllo");
        editor.handle_action(&Action::NewlineInput);
        type_str(&mut editor, "ab");
        // byte column 2 sits inside the two-byte 'é' on the line above
        editor.handle_action(&Action::CursorUp);
        editor.handle_action(&Action::CharInput('x'));
        assert_eq!(editor.session.text(), "hxéllo\nab");
    }

    #[test]
    fn paste_inserts_at_cursor() {
        let mut editor = EditorComponent::new();
        type_str(&mut editor, "ad");
        editor.handle_action(&Action::CursorLeft);
        editor.handle_action(&Action::PasteBulk("bc".to_string()));
        assert_eq!(editor.session.text(), "abcd");
        assert_eq!(editor.cursor, 3);
    }

    #[test]
    fn wrap_line_breaks_at_word_boundaries() {
        let segments = wrap_line("the quick brown fox jumps", 12);
        assert_eq!(segments, vec!["the quick ", "brown fox ", "jumps"]);
        // segments reassemble exactly
        assert_eq!(segments.concat(), "the quick brown fox jumps");
    }

    #[test]
    fn wrap_line_hard_breaks_long_words() {
        let segments = wrap_line("abcdefghijkl", 4);
        assert_eq!(segments, vec!["abcd", "efgh", "ijkl"]);
    }

    #[test]
    fn wrap_line_measures_multibyte_text_in_chars() {
        // 35 chars (105 bytes) fit a 40-column row without wrapping.
        let short = "こんにちは世界".repeat(5);
        assert_eq!(wrap_line(&short, 40), vec![short.clone()]);

        // Longer runs hard-break between glyphs, never inside one.
        let long = "こんにちは世界".repeat(20);
        let segments = wrap_line(&long, 40);
        assert_eq!(segments.len(), 4);
        assert!(segments.iter().all(|s| s.chars().count() <= 40));
        assert_eq!(segments.concat(), long);
    }
}
