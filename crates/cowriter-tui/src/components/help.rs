//! Help overlay — keybinding reference.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::action::Action;
use crate::components::Component;
use crate::theme::Theme;

pub struct HelpComponent {
    pub visible: bool,
}

impl HelpComponent {
    pub fn new() -> Self {
        Self { visible: false }
    }

    fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
        let vertical = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .flex(Flex::Center)
        .split(area);

        let horizontal = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .flex(Flex::Center)
        .split(vertical[1]);

        horizontal[1]
    }
}

impl Component for HelpComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::ToggleHelp => {
                self.visible = !self.visible;
                None
            }
            // Ticks and background suggestion traffic are not keystrokes
            // and must not dismiss the overlay.
            Action::Tick
            | Action::SetStatus(_)
            | Action::ClearStatus
            | Action::PromptChanged
            | Action::PromptSettled { .. }
            | Action::SuggestionResolved { .. }
            | Action::SuggestionFailed { .. } => None,
            _ if self.visible => {
                // Any key closes help.
                self.visible = false;
                None
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let dialog = Self::centered_rect(area, 58, 18);
        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .title(" Help — Keybindings ")
            .title_style(Theme::title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Theme::accent()));

        let help_text = vec![
            Line::from(""),
            key_line("Tab", "Accept the current suggestion"),
            key_line("Esc", "Switch between writing and command keys"),
            key_line("i / Enter", "Back to writing (command keys)"),
            key_line("Ctrl+W", "Delete the previous word"),
            key_line("Arrows", "Move the cursor"),
            key_line("?", "Toggle this help (command keys)"),
            key_line("q / Ctrl+C", "Quit (command keys)"),
            Line::from(""),
            Line::from(Span::styled("── Suggestions ──", Theme::header())),
            Line::from(""),
            key_line("Pause typing", "A continuation is fetched and shown as"),
            key_line("", "dim ghost text after your draft."),
            key_line("Type through it", "Matching keystrokes consume the ghost"),
            key_line("", "text; anything else dismisses it."),
        ];

        let paragraph = Paragraph::new(help_text).block(block);
        frame.render_widget(paragraph, dialog);
    }
}

fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {:<18}", key), Theme::key_hint()),
        Span::styled(desc, Theme::normal()),
    ])
}
