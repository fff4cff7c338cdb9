//! Action enum — the central message bus for the TUI.
//! All user interactions and async results flow through here.

/// Every possible action that can occur in the application.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Global ──────────────────────────────────────────────
    /// Quit the application.
    Quit,
    /// Toggle help overlay.
    ToggleHelp,
    /// Display a status message in the status bar.
    SetStatus(String),
    /// Clear the status message.
    ClearStatus,
    /// A tick event for animations and polling.
    Tick,

    // ── Mode ────────────────────────────────────────────────
    /// Return to writing; keys go to the draft again.
    StartWriting,
    /// Leave the draft; keys become global shortcuts.
    StopWriting,

    // ── Text Input ──────────────────────────────────────────
    /// A character was typed (only sent when in writing mode).
    CharInput(char),
    /// Backspace pressed (only sent when in writing mode).
    BackspaceInput,
    /// Delete word (Ctrl+Backspace or Ctrl+W).
    DeleteWord,
    /// Insert a newline in the draft.
    NewlineInput,
    /// Bulk paste from bracketed paste mode (terminal sends entire text at once).
    PasteBulk(String),

    // ── Cursor ──────────────────────────────────────────────
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,

    // ── Suggestions ─────────────────────────────────────────
    /// Merge the pending ghost text into the draft (Tab).
    AcceptSuggestion,
    /// The draft text changed; restart the debounce window.
    PromptChanged,
    /// A debounce window elapsed for the given ticket.
    PromptSettled { ticket: u64 },
    /// A suggestion fetch finished for the given ticket.
    SuggestionResolved { ticket: u64, suggestion: String },
    /// A suggestion fetch failed for the given ticket.
    SuggestionFailed { ticket: u64, error: String },
}

/// Whether the app is in a text-input mode where raw keys should
/// be forwarded to the draft instead of interpreted as global
/// shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal mode — keys are global shortcuts.
    Normal,
    /// Writing mode — keys go to the draft.
    Editing,
}
