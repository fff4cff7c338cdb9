use crate::merge::{generate_text, merge_prompt_with_suggestion};
use crate::overlap::exclude_prompt_from_suggestion;

/// Lifecycle of the suggestion attached to an editor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No fetch outstanding; a suggestion may or may not be attached.
    #[default]
    Idle,
    /// A debounce-settled prompt is out being completed. A previously
    /// attached suggestion keeps rendering until the new one lands.
    SuggestionPending,
    /// A suggestion is attached and rendered as ghost text.
    SuggestionAvailable,
    /// Held only while a suggestion is being merged into the text.
    Accepting,
}

/// The editor's prompt/suggestion state, advanced only through the
/// transition methods below. One instance lives for the lifetime of the
/// editor surface; there is no terminal state.
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    text: String,
    suggestion: String,
    state: SessionState,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The live editor text. Doubles as the prompt: accepting a suggestion
    /// folds it in here, so the merged result is the next prompt baseline.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The currently attached suggestion, if any.
    pub fn suggestion(&self) -> Option<&str> {
        if self.suggestion.is_empty() {
            None
        } else {
            Some(self.suggestion.as_str())
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn has_suggestion(&self) -> bool {
        !self.suggestion.is_empty()
    }

    /// Replaces the live text after an edit and reconciles the attached
    /// suggestion with it.
    ///
    /// A suggestion survives the edit only when the new trailing character
    /// is the one it expects next; it is then re-trimmed against the new
    /// text, so typing "through" a suggestion consumes it character by
    /// character. Any other keystroke clears it. Clearing the whole buffer
    /// keeps the suggestion attached (nothing contradicts it), though the
    /// ghost preview renders empty until text returns.
    ///
    /// An edit also supersedes any outstanding fetch; the state returns to
    /// idle until the next settled prompt goes out.
    pub fn edit(&mut self, new_text: String) {
        let last_char = new_text.chars().next_back();
        self.text = new_text;

        if self.suggestion.is_empty() {
            // No ghost to reconcile. Any fetch still out now resolves under
            // a stale ticket, so there is nothing to stay pending for.
            self.state = SessionState::Idle;
            return;
        }

        let compatible = match last_char {
            None => true,
            Some(c) => self.suggestion.starts_with(c),
        };

        if !compatible {
            self.suggestion.clear();
            self.state = SessionState::Idle;
            return;
        }

        let trimmed = exclude_prompt_from_suggestion(&self.text, &self.suggestion).to_string();
        if trimmed.is_empty() {
            self.suggestion.clear();
            self.state = SessionState::Idle;
        } else {
            self.suggestion = trimmed;
            self.state = SessionState::SuggestionAvailable;
        }
    }

    /// A debounce-settled non-empty prompt went out for completion.
    pub fn begin_pending(&mut self) {
        self.state = SessionState::SuggestionPending;
    }

    /// Attaches the suggestion resolved for the current prompt basis.
    /// Callers must have already discarded stale resolutions; an empty
    /// suggestion (provider had nothing to add) clears the ghost.
    pub fn resolve(&mut self, suggestion: String) {
        self.suggestion = suggestion;
        self.state = if self.suggestion.is_empty() {
            SessionState::Idle
        } else {
            SessionState::SuggestionAvailable
        };
    }

    /// The outstanding fetch failed; the previously attached suggestion is
    /// retained.
    pub fn fail(&mut self) {
        self.state = if self.suggestion.is_empty() {
            SessionState::Idle
        } else {
            SessionState::SuggestionAvailable
        };
    }

    /// Merges the attached suggestion into the text and resets the prompt
    /// baseline to the merged result. Returns false (and changes nothing)
    /// when no suggestion is attached.
    pub fn accept(&mut self) -> bool {
        if self.suggestion.is_empty() {
            return false;
        }

        self.state = SessionState::Accepting;
        let merged = generate_text(&self.text, &self.suggestion);
        self.text = merged;
        self.suggestion.clear();
        self.state = SessionState::Idle;
        true
    }

    /// The ghost-layer preview: live text plus the attached suggestion.
    pub fn preview(&self) -> String {
        merge_prompt_with_suggestion(&self.text, &self.suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(text: &str, suggestion: &str) -> EditorSession {
        let mut session = EditorSession::new();
        session.edit(text.to_string());
        session.begin_pending();
        session.resolve(suggestion.to_string());
        session
    }

    #[test]
    fn starts_idle_and_empty() {
        let session = EditorSession::new();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.text(), "");
        assert_eq!(session.suggestion(), None);
    }

    #[test]
    fn resolve_attaches_suggestion() {
        let session = session_with("Hello wor", "ld is great");
        assert_eq!(session.state(), SessionState::SuggestionAvailable);
        assert_eq!(session.suggestion(), Some("ld is great"));
    }

    #[test]
    fn resolve_with_empty_suggestion_returns_to_idle() {
        let session = session_with("Hello", "");
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.suggestion(), None);
    }

    #[test]
    fn typing_through_a_suggestion_consumes_it() {
        let mut session = session_with("Hello wor", "ld is great");

        session.edit("Hello worl".to_string());
        assert_eq!(session.suggestion(), Some("d is great"));

        session.edit("Hello world".to_string());
        assert_eq!(session.suggestion(), Some(" is great"));
        assert_eq!(session.state(), SessionState::SuggestionAvailable);
    }

    #[test]
    fn incompatible_keystroke_clears_the_suggestion() {
        let mut session = session_with("Hello wor", "ld is great");

        session.edit("Hello worx".to_string());
        assert_eq!(session.suggestion(), None);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn backspace_clears_the_suggestion() {
        let mut session = session_with("Hello wor", "ld is great");

        session.edit("Hello wo".to_string());
        assert_eq!(session.suggestion(), None);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn fully_consumed_suggestion_returns_to_idle() {
        let mut session = session_with("He", "l");

        session.edit("Hel".to_string());
        assert_eq!(session.suggestion(), None);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn clearing_the_buffer_keeps_the_suggestion_but_hides_the_ghost() {
        let mut session = session_with("Hello wor", "ld is great");

        session.edit(String::new());
        assert_eq!(session.suggestion(), Some("ld is great"));
        assert_eq!(session.preview(), "");
    }

    #[test]
    fn emptying_the_draft_during_a_fetch_returns_to_idle() {
        let mut session = EditorSession::new();
        session.edit("hello".to_string());
        session.begin_pending();

        session.edit(String::new());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.suggestion(), None);
    }

    #[test]
    fn a_keystroke_during_a_fetch_supersedes_it() {
        let mut session = EditorSession::new();
        session.edit("hello".to_string());
        session.begin_pending();

        session.edit("hello w".to_string());
        assert_eq!(session.state(), SessionState::Idle);

        // the next settled prompt re-enters pending
        session.begin_pending();
        assert_eq!(session.state(), SessionState::SuggestionPending);
    }

    #[test]
    fn accept_merges_and_resets_the_prompt_baseline() {
        let mut session = session_with("The weather is nice", "we should go outside");

        assert!(session.accept());
        assert_eq!(session.text(), "The weather is nice we should go outside.");
        assert_eq!(session.suggestion(), None);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.preview(), session.text());
    }

    #[test]
    fn accept_without_suggestion_is_a_no_op() {
        let mut session = EditorSession::new();
        session.edit("untouched".to_string());

        assert!(!session.accept());
        assert_eq!(session.text(), "untouched");
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn failure_retains_the_previous_suggestion() {
        let mut session = session_with("Hello wor", "ld is great");

        session.begin_pending();
        assert_eq!(session.state(), SessionState::SuggestionPending);

        session.fail();
        assert_eq!(session.suggestion(), Some("ld is great"));
        assert_eq!(session.state(), SessionState::SuggestionAvailable);
    }

    #[test]
    fn pending_keeps_rendering_the_old_ghost() {
        let mut session = session_with("Hello wor", "ld is great");

        session.begin_pending();
        assert_eq!(session.state(), SessionState::SuggestionPending);
        assert_eq!(session.suggestion(), Some("ld is great"));
        assert_eq!(session.preview(), "Hello world is great.");
    }

    #[test]
    fn preview_appends_terminal_period() {
        let session = session_with("Hello wor", "ld is great");
        assert_eq!(session.preview(), "Hello world is great.");
    }
}
