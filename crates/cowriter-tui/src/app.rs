//! Main application state and render loop.

use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Terminal;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use cowriter_backend::{BackendManager, SuggestionClient};
use cowriter_core::text::{capitalize, is_sentence};
use cowriter_core::CowriterConfig;

use crate::action::{Action, InputMode};
use crate::components::editor::EditorComponent;
use crate::components::help::HelpComponent;
use crate::components::status_bar::StatusBarComponent;
use crate::components::Component;
use crate::event::{self, EventHandler, InputModeFlag};
use crate::suggest::SuggestionController;
use crate::theme::Theme;

/// Main application state.
pub struct App {
    config: CowriterConfig,
    /// Whether the app should exit.
    should_quit: bool,
    /// Which keymap the user is in (writing vs. command keys).
    input_mode: InputMode,
    /// Shared flag to tell the EventHandler which key-mapping to use.
    input_mode_flag: InputModeFlag,

    // ── Suggestion backend ───────────────────────────────────
    /// Remote backend base URL from the CLI; None means self-host.
    remote_endpoint: Option<String>,
    /// Embedded server (owns the background task when self-hosting).
    backend_manager: Option<BackendManager>,
    /// HTTP client for the backend (shared across fetch tasks). Stays
    /// None when startup failed.
    suggestion_client: Option<Arc<SuggestionClient>>,
    /// Receiver for the background backend startup result.
    backend_startup_rx: Option<
        tokio::sync::oneshot::Receiver<
            Result<(Option<BackendManager>, Arc<SuggestionClient>), String>,
        >,
    >,
    /// Debounce and staleness bookkeeping for fetches.
    suggestions: SuggestionController,

    // Components
    editor: EditorComponent,
    status_bar: StatusBarComponent,
    help: HelpComponent,
}

impl App {
    pub fn new(config: CowriterConfig, endpoint: Option<String>) -> Self {
        let suggestions = SuggestionController::new(
            Duration::from_millis(config.editor.debounce_ms),
            Duration::from_millis(config.editor.loading_indicator_delay_ms),
        );

        Self {
            config,
            should_quit: false,
            input_mode: InputMode::Editing,
            input_mode_flag: event::new_input_mode_flag(),
            remote_endpoint: endpoint,
            backend_manager: None,
            suggestion_client: None,
            backend_startup_rx: None,
            suggestions,
            editor: EditorComponent::new(),
            status_bar: StatusBarComponent::new(),
            help: HelpComponent::new(),
        }
    }

    /// Run the TUI application.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        // Set up terminal.
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        )?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Create the action channel.
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();

        // Start the event handler with the shared input mode flag.
        let event_tx = tx.clone();
        let mode_flag = self.input_mode_flag.clone();
        let event_handler = EventHandler::new(event_tx, Duration::from_millis(100), mode_flag);
        tokio::spawn(async move {
            event_handler.run().await;
        });

        // Start the backend in the background so the editor renders immediately.
        self.start_backend_async(tx.clone());

        // The editor starts focused, in writing mode.
        self.sync_input_mode();

        // Main loop.
        loop {
            // Keep the footer indicators current before each frame; the
            // loading indicator is time-based and refreshed by ticks.
            self.sync_indicators();

            // Render.
            terminal.draw(|frame| {
                self.render(frame);
            })?;

            // Check if the background backend startup has completed.
            self.poll_backend_startup();

            // Process actions.
            if let Some(action) = rx.recv().await {
                self.handle_action(&action, &tx);

                if self.should_quit {
                    break;
                }
            }
        }

        // Stop the embedded backend.
        self.shutdown_backend();

        // Restore terminal.
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        )?;
        terminal.show_cursor()?;

        Ok(())
    }

    /// Spawn backend startup in the background. Self-hosts an embedded
    /// server unless a remote endpoint was given, in which case it only
    /// checks reachability. The editor is fully usable while this runs; a
    /// failure surfaces in the status bar and fetches fail fast.
    fn start_backend_async(&mut self, tx: mpsc::UnboundedSender<Action>) {
        let (result_tx, result_rx) = tokio::sync::oneshot::channel();

        let remote = self.remote_endpoint.clone();
        let config = self.config.clone();

        tokio::spawn(async move {
            let startup = match remote {
                Some(endpoint) => {
                    info!(endpoint = %endpoint, "Connecting to remote suggestion backend");
                    let client = Arc::new(SuggestionClient::new(endpoint.clone()));
                    match client.health().await {
                        Ok(health) => {
                            info!(
                                endpoint = %endpoint,
                                provider = %health.provider,
                                "Remote suggestion backend is reachable"
                            );
                            Ok((None, client))
                        }
                        Err(e) => Err(format!("no backend at {endpoint}: {e}")),
                    }
                }
                None => {
                    let mut manager = BackendManager::new(config);
                    match manager.start().await {
                        Ok(()) => {
                            let client = Arc::new(SuggestionClient::new(manager.base_url()));
                            Ok((Some(manager), client))
                        }
                        Err(e) => Err(format!("{e}")),
                    }
                }
            };

            match startup {
                Ok(ready) => {
                    let _ = result_tx.send(Ok(ready));
                    let _ = tx.send(Action::SetStatus("Suggestions ready".to_string()));
                }
                Err(e) => {
                    error!("Suggestion backend unavailable: {}", e);
                    let _ = tx.send(Action::SetStatus(format!("Suggestions unavailable: {e}")));
                    let _ = result_tx.send(Err(e));
                }
            }
        });

        // Store the receiver so we can poll it from the main loop.
        self.backend_startup_rx = Some(result_rx);
    }

    /// Non-blocking check whether the background startup has completed.
    fn poll_backend_startup(&mut self) {
        if let Some(ref mut rx) = self.backend_startup_rx {
            match rx.try_recv() {
                Ok(Ok((manager, client))) => {
                    self.backend_manager = manager;
                    self.suggestion_client = Some(client);
                    self.backend_startup_rx = None;
                    info!("Backend startup received in main loop");
                }
                Ok(Err(e)) => {
                    warn!("Backend startup failed: {}", e);
                    self.backend_startup_rx = None;
                }
                Err(tokio::sync::oneshot::error::TryRecvError::Empty) => {
                    // Still starting — do nothing.
                }
                Err(tokio::sync::oneshot::error::TryRecvError::Closed) => {
                    // Sender was dropped (task panicked?).
                    warn!("Backend startup task dropped unexpectedly");
                    self.backend_startup_rx = None;
                }
            }
        }
    }

    /// Stop the embedded server, if this instance started one.
    fn shutdown_backend(&mut self) {
        if let Some(ref mut manager) = self.backend_manager {
            manager.shutdown();
        }
    }

    /// Determine and set the correct key-mapping for the event handler.
    /// Called after every action.
    fn sync_input_mode(&self) {
        let mode = self.current_input_mode();
        event::set_input_mode(&self.input_mode_flag, mode);
    }

    /// What input mode should be active right now?
    fn current_input_mode(&self) -> InputMode {
        // While help is open, stay in normal mode so any key dismisses it
        // instead of landing in the draft.
        if self.help.visible {
            return InputMode::Normal;
        }
        self.input_mode
    }

    /// Mirror controller and session state into the components that
    /// render it.
    fn sync_indicators(&mut self) {
        self.editor.loading = self.suggestions.loading_visible();
        self.editor.error = self.suggestions.last_error().map(|e| e.to_string());
        self.editor.focused = self.current_input_mode() == InputMode::Editing;
        self.status_bar.mode = self.input_mode;
        self.status_bar.session_state = self.editor.session.state();
    }

    /// Dispatch an action to all relevant components.
    fn handle_action(&mut self, action: &Action, tx: &mpsc::UnboundedSender<Action>) {
        // Global actions first.
        match action {
            Action::Quit => {
                self.should_quit = true;
                return;
            }
            Action::StartWriting => {
                self.input_mode = InputMode::Editing;
            }
            Action::StopWriting => {
                self.input_mode = InputMode::Normal;
            }

            // ── Suggestion flow ──────────────────────────────────
            Action::PromptChanged => {
                let ticket = self.suggestions.schedule(self.editor.session.text(), tx);
                debug!(ticket, "draft changed; debounce rescheduled");
            }
            Action::PromptSettled { ticket } => {
                self.spawn_fetch(*ticket, tx);
            }
            Action::SuggestionResolved { ticket, suggestion } => {
                if self.suggestions.finish(*ticket) {
                    debug!(ticket, len = suggestion.len(), "suggestion attached");
                    self.editor.session.resolve(suggestion.clone());
                } else {
                    debug!(ticket, "dropping stale suggestion");
                }
            }
            Action::SuggestionFailed { ticket, error } => {
                if self.suggestions.fail(*ticket, error.clone()) {
                    warn!(ticket, "suggestion fetch failed: {}", error);
                    self.editor.session.fail();
                }
            }
            _ => {}
        }

        // Forward to components.
        let chained = self.editor.handle_action(action);
        self.help.handle_action(action);
        self.status_bar.handle_action(action);

        // Sync input mode after every action (the mode or an overlay may
        // have changed).
        self.sync_input_mode();

        // Handle chained actions from components.
        if let Some(chained) = chained {
            self.handle_action(&chained, tx);
        }
    }

    /// A debounce window closed for `ticket`. If it is still the newest
    /// edit, send the draft out for completion.
    fn spawn_fetch(&mut self, ticket: u64, tx: &mpsc::UnboundedSender<Action>) {
        let prompt = self.editor.session.text().to_string();
        if prompt.is_empty() {
            return;
        }
        if !self.suggestions.begin_fetch(ticket) {
            debug!(ticket, "debounce fired for a superseded draft");
            return;
        }

        let Some(client) = self.suggestion_client.clone() else {
            let _ = tx.send(Action::SuggestionFailed {
                ticket,
                error: "Suggestion backend is unavailable".to_string(),
            });
            return;
        };

        self.editor.session.begin_pending();

        let tx = tx.clone();
        tokio::spawn(async move {
            match client.suggest(&prompt, None).await {
                Ok(Some(suggestion)) => {
                    // A draft that already ended a sentence gets its
                    // continuation capitalized, like the start of a new one.
                    let suggestion = if is_sentence(&prompt) {
                        capitalize(&suggestion)
                    } else {
                        suggestion
                    };
                    let _ = tx.send(Action::SuggestionResolved { ticket, suggestion });
                }
                Ok(None) => {
                    // The provider had nothing to add.
                    let _ = tx.send(Action::SuggestionResolved {
                        ticket,
                        suggestion: String::new(),
                    });
                }
                Err(e) => {
                    let _ = tx.send(Action::SuggestionFailed {
                        ticket,
                        error: format!("{}", e),
                    });
                }
            }
        });
    }

    /// Render the full UI.
    fn render(&self, frame: &mut ratatui::Frame) {
        let area = frame.area();

        let chunks = Layout::vertical([
            Constraint::Length(2), // Title bar
            Constraint::Min(6),    // Editor + footer
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        self.render_title(frame, chunks[0]);
        self.editor.render(frame, chunks[1]);
        self.status_bar.render(frame, chunks[2]);

        // Overlay (rendered on top)
        self.help.render(frame, area);
    }

    /// Render the title bar.
    fn render_title(&self, frame: &mut ratatui::Frame, area: Rect) {
        let backend = match self.remote_endpoint {
            Some(ref endpoint) => endpoint.as_str(),
            None => "local",
        };
        let title = Line::from(vec![
            Span::styled(" cowriter ", Theme::title()),
            Span::styled("· pause to fetch, tab to accept  ", Theme::dim()),
            Span::styled(format!("[{backend}]"), Theme::muted()),
        ]);
        frame.render_widget(Paragraph::new(title), area);
    }
}
