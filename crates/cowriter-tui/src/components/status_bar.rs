//! Status bar at the bottom of the TUI.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use cowriter_core::session::SessionState;

use crate::action::{Action, InputMode};
use crate::components::Component;
use crate::theme::Theme;

pub struct StatusBarComponent {
    /// Current status message.
    pub message: String,
    /// Which keymap is active; the App keeps this in sync.
    pub mode: InputMode,
    /// Suggestion lifecycle state, mirrored from the draft session.
    pub session_state: SessionState,
}

impl StatusBarComponent {
    pub fn new() -> Self {
        Self {
            message: "Welcome to cowriter. Start typing, then pause for a suggestion.".to_string(),
            mode: InputMode::Editing,
            session_state: SessionState::Idle,
        }
    }

    /// Short mode name for the pill badge.
    fn mode_badge(&self) -> &'static str {
        match self.mode {
            InputMode::Editing => "Write",
            InputMode::Normal => "View",
        }
    }

    fn state_word(&self) -> &'static str {
        match self.session_state {
            SessionState::Idle => "",
            SessionState::SuggestionPending => "fetching",
            SessionState::SuggestionAvailable => "suggestion",
            SessionState::Accepting => "accepting",
        }
    }

    fn hints(&self) -> &'static str {
        match self.mode {
            InputMode::Editing => "tab·esc·^c",
            InputMode::Normal => "i·?·q",
        }
    }
}

impl Component for StatusBarComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::SetStatus(msg) => {
                self.message = msg.clone();
                None
            }
            Action::ClearStatus => {
                self.message.clear();
                None
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let width = area.width as usize;

        // Right side: compact key hints
        let hints = self.hints();
        let hints_len = hints.chars().count() + 1; // +1 for trailing space

        // Mode badge
        let badge = self.mode_badge();
        let badge_len = badge.len() + 2; // spaces around badge

        let state = self.state_word();
        let state_len = if state.is_empty() { 0 } else { state.len() + 2 };

        // Truncate message to remaining space
        let msg_budget = width
            .saturating_sub(badge_len)
            .saturating_sub(state_len)
            .saturating_sub(hints_len)
            .saturating_sub(4); // separators and spacing

        let msg = clip_message(&self.message, msg_budget);

        // Pad to push hints to the right edge
        let used = badge_len + state_len + 2 + msg.chars().count();
        let pad = width.saturating_sub(used + hints_len);

        let state_style = match self.session_state {
            SessionState::SuggestionPending => Theme::warning(),
            SessionState::SuggestionAvailable => Theme::success(),
            _ => Theme::fg_dim(),
        };

        let mut spans = vec![Span::styled(format!(" {} ", badge), Theme::muted())];
        if !state.is_empty() {
            spans.push(Span::styled(
                format!(" {} ", state),
                Style::default().fg(state_style),
            ));
        }
        spans.push(Span::styled("  ", Theme::dim()));
        spans.push(Span::styled(msg, Theme::dim()));
        spans.push(Span::raw(" ".repeat(pad)));
        spans.push(Span::styled(hints, Theme::key_hint()));
        spans.push(Span::raw(" "));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

/// Clip a message to `budget` display columns, marking the cut with an
/// ellipsis. Cuts land on char boundaries rather than byte offsets, so
/// non-ASCII error text survives narrow terminals.
fn clip_message(message: &str, budget: usize) -> String {
    if message.chars().count() <= budget {
        return message.to_string();
    }
    if budget <= 3 {
        return String::new();
    }
    let kept: String = message.chars().take(budget - 3).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_messages_pass_through_untouched() {
        assert_eq!(clip_message("Suggestions ready", 40), "Suggestions ready");
    }

    #[test]
    fn long_messages_are_clipped_with_an_ellipsis() {
        assert_eq!(clip_message("a very long status line", 10), "a very ...");
    }

    #[test]
    fn clipping_lands_on_char_boundaries() {
        let msg = "Suggestions unavailable: öööööööööö";
        let clipped = clip_message(msg, 29);
        assert_eq!(clipped, "Suggestions unavailable: ö...");
        assert_eq!(clipped.chars().count(), 29);
    }

    #[test]
    fn tiny_budgets_drop_the_message_entirely() {
        assert_eq!(clip_message("hello there", 3), "");
    }
}
