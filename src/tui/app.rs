//! Main TUI application state and logic

use anyhow::Result;
use chrono::Local;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tracing::info;

use crate::api::CollectionApi;
use crate::config::Config;
use crate::form::FormState;
use crate::pipeline::{self, SubmitOutcome};
use crate::tui::form_screen::{FormScreen, ScreenAction};
use crate::tui::ui::{centered_rect, Styles};

/// Main TUI application state
pub struct App {
    pub form: FormState,
    pub screen: FormScreen,
    api: Box<dyn CollectionApi>,

    pub should_quit: bool,
    pub show_help_popup: bool,
    /// Submit requested; performed after the next redraw so "Submitting..." is visible
    pub pending_submit: bool,
    pub status_message: Option<String>,
    pub error_message: Option<String>,
}

impl App {
    /// Create a new TUI application
    pub fn new(config: &Config, api: Box<dyn CollectionApi>) -> Self {
        let today = Local::now().date_naive();
        Self::with_form(FormState::new(today, config.validation_options()), api)
    }

    pub fn with_form(form: FormState, api: Box<dyn CollectionApi>) -> Self {
        Self {
            screen: FormScreen::new(&form),
            form,
            api,
            should_quit: false,
            show_help_popup: false,
            pending_submit: false,
            status_message: None,
            error_message: None,
        }
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.set_status("Fill in the form. Ctrl+S submits, F1 shows help".to_string());

        loop {
            terminal.draw(|f| self.draw(f))?;

            if self.pending_submit {
                self.pending_submit = false;
                self.submit().await;
                continue;
            }

            if let Event::Key(key) = crossterm::event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key_event(key);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Handle keyboard input events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::F(1) => {
                self.show_help_popup = !self.show_help_popup;
                return;
            }
            KeyCode::Esc => {
                if self.show_help_popup {
                    self.show_help_popup = false;
                } else {
                    self.should_quit = true;
                }
                return;
            }
            _ => {}
        }

        if self.show_help_popup {
            return;
        }

        match self.screen.handle_key_event(key, &mut self.form) {
            ScreenAction::Submit => {
                if self.form.is_submitting() {
                    self.set_error(pipeline::IN_FLIGHT_NOTICE.to_string());
                } else {
                    self.set_status("Submitting...".to_string());
                    self.pending_submit = true;
                }
            }
            ScreenAction::Quit => self.should_quit = true,
            ScreenAction::SetStatus(message) => self.set_status(message),
            ScreenAction::SetError(message) => self.set_error(message),
            ScreenAction::None => {}
        }
    }

    /// Validate and send the form, reporting the outcome in the status bar
    pub async fn submit(&mut self) {
        let outcome = pipeline::submit_form(&mut self.form, self.api.as_ref()).await;
        match &outcome {
            SubmitOutcome::Submitted => {
                info!("Form submitted; starting a fresh form");
                self.screen.reset(&self.form);
            }
            SubmitOutcome::Invalid(errors) => {
                self.set_error(format!("Please fix {} highlighted field(s)", errors.len()));
                // Refresh the focused field so its inline error shows
                let focus = self.screen.focus;
                self.screen.set_focus(focus, &self.form);
                return;
            }
            SubmitOutcome::Failed(_) | SubmitOutcome::InFlight => {}
        }

        if let Some(notice) = outcome.notice() {
            if outcome.is_success() {
                self.set_status(notice.to_string());
            } else {
                self.set_error(notice.to_string());
            }
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        let title = Paragraph::new("Document Submission").style(Styles::title());
        f.render_widget(title, chunks[0]);

        self.screen.draw(f, chunks[1], &self.form);
        self.draw_status_bar(f, chunks[2]);

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    /// Draw status bar with the latest message or the key summary
    fn draw_status_bar(&self, f: &mut Frame, area: Rect) {
        let (text, style) = if let Some(ref err) = self.error_message {
            (format!("Error: {}", err), Styles::error())
        } else if let Some(ref msg) = self.status_message {
            (format!("Status: {}", msg), Styles::success())
        } else {
            (
                "Tab: Next | Shift+Tab: Previous | Ctrl+S: Submit | F1: Help | Esc: Quit".to_string(),
                Styles::inactive(),
            )
        };

        let status_bar = Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(status_bar, area);
    }

    fn draw_help_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(70, 60, area);
        f.render_widget(Clear, popup_area);

        let help = Paragraph::new(help_text()).block(
            Block::default()
                .title("Help - Shortcuts")
                .borders(Borders::ALL)
                .border_style(Styles::active_border()),
        );
        f.render_widget(help, popup_area);
    }

    /// Set status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.error_message = None;
    }

    /// Set error message
    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
        self.status_message = None;
    }
}

fn help_text() -> &'static str {
    "Navigation:\n\
    Tab / Down - Next field\n\
    Shift+Tab / Up - Previous field\n\
    Left/Right/Home/End - Move cursor\n\n\
    Editing:\n\
    Type in text fields; date of birth is YYYY-MM-DD\n\
    Space / Enter - Toggle checkbox, change file type, press buttons\n\
    File Upload - type a path, Enter attaches it\n\
    [+] on the first document adds a row, [-] removes that row\n\n\
    Ctrl+S - Submit\n\
    F1 - Toggle this help\n\
    Esc / Ctrl+C - Quit"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::form::{TextField, INVALID_DATE_FORMAT};
    use crate::models::{FileRef, Submission};
    use crate::pipeline::{FAILURE_NOTICE, SUCCESS_NOTICE};
    use crate::tui::form_screen::FocusItem;
    use crate::validation::ValidationOptions;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use crossterm::event::KeyModifiers;
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    struct StubApi {
        fail: bool,
        calls: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl CollectionApi for StubApi {
        async fn upload_files(&self, _submission: &Submission) -> Result<Value, ApiError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                return Err(ApiError::UploadFailed { status: 503 });
            }
            Ok(Value::Null)
        }

        async fn submit_form_data(&self, _submission: &Submission) -> Result<Value, ApiError> {
            *self.calls.lock().unwrap() += 1;
            Ok(Value::Null)
        }
    }

    fn app(fail: bool) -> (App, Arc<Mutex<usize>>) {
        let calls = Arc::new(Mutex::new(0));
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let mut form = FormState::new(today, ValidationOptions::default());
        form.set_text(TextField::FirstName, "Jane");
        form.set_text(TextField::LastName, "Doe");
        form.set_text(TextField::Email, "jane@example.com");
        form.set_text(TextField::ResidentialStreet1, "123 Main St");
        form.set_date_of_birth(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        form.set_same_as_residential(true);
        let ids: Vec<_> = form.documents().iter().map(|e| e.id).collect();
        for id in ids {
            form.set_document_name(id, "id card");
            form.attach_file(
                id,
                FileRef {
                    path: "card.png".into(),
                    name: "card.png".to_string(),
                    size: 3,
                    content_type: "image/png".to_string(),
                },
            );
        }
        let api = StubApi {
            fail,
            calls: calls.clone(),
        };
        (App::with_form(form, Box::new(api)), calls)
    }

    fn ctrl_s() -> KeyEvent {
        KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)
    }

    #[tokio::test]
    async fn test_submit_success_resets_form() {
        let (mut app, calls) = app(false);
        app.handle_key_event(ctrl_s());
        assert!(app.pending_submit);

        app.submit().await;
        assert_eq!(*calls.lock().unwrap(), 2);
        assert_eq!(app.status_message.as_deref(), Some(SUCCESS_NOTICE));
        assert_eq!(app.form.text(TextField::FirstName), "");
        assert!(!app.screen.show_errors);
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_values() {
        let (mut app, calls) = app(true);
        app.submit().await;
        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(app.error_message.as_deref(), Some(FAILURE_NOTICE));
        assert_eq!(app.form.text(TextField::FirstName), "Jane");
    }

    #[tokio::test]
    async fn test_invalid_form_makes_no_calls() {
        let (mut app, calls) = app(false);
        app.form.set_text(TextField::Email, "not-an-email");
        app.handle_key_event(ctrl_s());
        app.submit().await;
        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(app.error_message.as_deref().unwrap().starts_with("Please fix 1"));
    }

    #[tokio::test]
    async fn test_unparsed_date_blocks_submit() {
        let (mut app, calls) = app(false);
        app.screen.set_focus(FocusItem::DateOfBirth, &app.form);
        // "2000-01-01" becomes "2000-01-0"
        app.handle_key_event(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(app.form.error_for("dateOfBirth"), Some(INVALID_DATE_FORMAT));

        app.handle_key_event(ctrl_s());
        app.submit().await;
        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(app.error_message.as_deref().unwrap().starts_with("Please fix 1"));
        assert_eq!(app.form.text(TextField::FirstName), "Jane");
    }

    #[test]
    fn test_escape_closes_help_before_quitting() {
        let (mut app, _) = app(false);
        app.handle_key_event(KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE));
        assert!(app.show_help_popup);
        app.handle_key_event(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(!app.show_help_popup);
        assert!(!app.should_quit);
        app.handle_key_event(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(app.should_quit);
    }
}
