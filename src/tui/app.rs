//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Driving the wizard controller and draining its worker results

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::adapters::HttpRiskClient;
use crate::application::{WizardController, WizardError};
use crate::config::Config;
use crate::domain::{Field, FieldKind, Step};
use crate::ports::RiskPredictor;

use super::ui::{
    landing::render_landing,
    render_disclaimer,
    summary::{render_summary, SummaryView},
    wizard::{render_assessment, AssessmentView},
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Assessment,
    Summary,
}

/// Main application state
pub struct App<P = HttpRiskClient>
where
    P: RiskPredictor + 'static,
{
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    config: Config,

    predictor: Arc<P>,

    /// Open assessment session; `None` on the landing screen
    wizard: Option<WizardController<P>>,

    /// Index of the focused field within the current step
    focus: usize,

    /// Step the focus index refers to
    focus_step: Step,

    /// Message from the last rejected action
    notice: Option<String>,
}

impl App<HttpRiskClient> {
    /// Create a new application talking to the configured prediction service.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be initialized.
    pub fn new(config: Config) -> Result<Self> {
        let client = HttpRiskClient::new(&config)?;
        tracing::info!(url = client.url(), "Risk service client ready");
        Ok(Self::with_dependencies(Arc::new(client), config))
    }
}

impl<P> App<P>
where
    P: RiskPredictor + 'static,
{
    /// Create application with an injected predictor (Composition Root pattern).
    ///
    /// No session is opened until the clinician starts an assessment.
    pub fn with_dependencies(predictor: Arc<P>, config: Config) -> Self {
        Self {
            screen: Screen::Landing,
            should_quit: false,
            config,
            predictor,
            wizard: None,
            focus: 0,
            focus_step: Step::FIRST,
            notice: None,
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// The open assessment session, if any.
    #[must_use]
    pub fn wizard(&self) -> Option<&WizardController<P>> {
        self.wizard.as_ref()
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        let result = self.main_loop(&mut terminal);

        self.close_assessment();

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.tick();

            terminal.draw(|f| self.draw(f))?;

            // Handle input (short poll to stay responsive)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Apply finished requests and follow any step change they caused.
    fn tick(&mut self) {
        let Some(wizard) = self.wizard.as_mut() else {
            return;
        };
        wizard.poll();

        if wizard.step() != self.focus_step {
            self.focus_step = wizard.step();
            self.focus = 0;
        }
        if self.screen == Screen::Assessment && wizard.is_complete() {
            self.screen = Screen::Summary;
        }
    }

    fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        let content_area = chunks[0];
        let disclaimer_area = chunks[1];

        match (self.screen, self.wizard.as_ref()) {
            (Screen::Assessment, Some(wizard)) => {
                let view =
                    AssessmentView::new(wizard, self.focused_field(), self.notice.as_deref());
                render_assessment(f, content_area, &view);
            }
            (Screen::Summary, Some(wizard)) => {
                let view = AssessmentView::new(wizard, None, None);
                render_assessment(f, content_area, &view);
                render_summary(
                    f,
                    content_area,
                    &SummaryView {
                        risk_score: wizard.risk_score(),
                        completed_at: wizard.session().completed_at,
                        api_error: wizard.api_error(),
                    },
                );
            }
            _ => render_landing(f, content_area, &self.config),
        }

        render_disclaimer(f, disclaimer_area);
    }

    fn focused_field(&self) -> Option<Field> {
        self.wizard.as_ref()?.step().fields().nth(self.focus)
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Landing => self.handle_landing_key(key),
            Screen::Assessment => {
                let outcome = self.handle_assessment_key(key);
                self.notice = outcome.err().map(|e| e.to_string());
            }
            Screen::Summary => self.handle_summary_key(key),
        }
    }

    fn handle_landing_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter => self.open_assessment(),
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_assessment_key(&mut self, key: KeyCode) -> std::result::Result<(), WizardError> {
        if key == KeyCode::Esc {
            self.close_assessment();
            return Ok(());
        }

        let field = self.focused_field();
        let Some(wizard) = self.wizard.as_mut() else {
            return Ok(());
        };
        let count = wizard.step().fields().count();
        let text_field = field.filter(|f| f.kind() != FieldKind::Choice);

        match key {
            KeyCode::Up | KeyCode::BackTab => {
                self.focus = (self.focus + count - 1) % count;
            }
            KeyCode::Down | KeyCode::Tab => {
                self.focus = (self.focus + 1) % count;
            }
            KeyCode::Left | KeyCode::Right => {
                if let Some(field) = field {
                    wizard.step_value(field, key == KeyCode::Right)?;
                }
            }
            KeyCode::Enter | KeyCode::PageDown => {
                wizard.advance()?;
            }
            KeyCode::PageUp => {
                wizard.previous()?;
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                wizard.load_sample()?;
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' || c == '.' => {
                if let Some(field) = text_field {
                    let mut raw = wizard.input().value(field);
                    raw.push(c);
                    wizard.edit(field, &raw)?;
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = text_field {
                    let mut raw = wizard.input().value(field);
                    if raw.pop().is_some() {
                        wizard.edit(field, &raw)?;
                    }
                }
            }
            KeyCode::Delete => {
                if let Some(field) = text_field {
                    wizard.edit(field, "")?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_summary_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter => self.open_assessment(),
            KeyCode::Esc => self.close_assessment(),
            _ => {}
        }
    }

    /// Open a fresh session, which starts its own connectivity check.
    fn open_assessment(&mut self) {
        self.close_assessment();
        self.wizard = Some(WizardController::open(
            Arc::clone(&self.predictor),
            self.config.skip_connection_check,
        ));
        self.screen = Screen::Assessment;
    }

    /// Close the open session, if any, and return to the landing screen.
    fn close_assessment(&mut self) {
        if let Some(mut wizard) = self.wizard.take() {
            wizard.close();
        }
        self.focus = 0;
        self.focus_step = Step::FIRST;
        self.notice = None;
        self.screen = Screen::Landing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{ApiStatus, API_UNREACHABLE};
    use crate::domain::{AssessmentInput, Prediction};
    use crate::ports::RequestError;
    use ratatui::backend::TestBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WAIT: Duration = Duration::from_secs(5);

    /// Scores every request the same and counts connectivity checks.
    #[derive(Default)]
    struct FixedScore {
        score: f64,
        offline: bool,
        checks: AtomicUsize,
    }

    impl FixedScore {
        fn new(score: f64) -> Self {
            Self {
                score,
                ..Self::default()
            }
        }
    }

    impl RiskPredictor for FixedScore {
        fn predict_risk(
            &self,
            step: Step,
            _input: &AssessmentInput,
        ) -> std::result::Result<Prediction, RequestError> {
            Ok(Prediction::new(step.number(), self.score))
        }

        fn test_connection(&self) -> bool {
            self.checks.fetch_add(1, Ordering::SeqCst);
            !self.offline
        }
    }

    fn settle(app: &mut App<FixedScore>) {
        if let Some(wizard) = app.wizard.as_mut() {
            assert!(wizard.settle(WAIT));
        }
        app.tick();
    }

    fn start(predictor: FixedScore) -> App<FixedScore> {
        let mut app = App::with_dependencies(Arc::new(predictor), Config::default());
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        settle(&mut app);
        app
    }

    fn app(score: f64) -> App<FixedScore> {
        start(FixedScore::new(score))
    }

    fn press(app: &mut App<FixedScore>, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
        settle(app);
    }

    fn wizard(app: &App<FixedScore>) -> &WizardController<FixedScore> {
        app.wizard().expect("assessment open")
    }

    fn rendered(app: &App<FixedScore>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 48)).expect("test terminal");
        terminal.draw(|f| app.draw(f)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_session_opens_with_assessment() {
        let predictor = Arc::new(FixedScore::new(10.0));
        let mut app = App::with_dependencies(Arc::clone(&predictor), Config::default());
        assert_eq!(app.screen(), Screen::Landing);
        assert!(app.wizard().is_none());
        assert_eq!(predictor.checks.load(Ordering::SeqCst), 0);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen(), Screen::Assessment);
        assert_eq!(predictor.checks.load(Ordering::SeqCst), 1);
        let first = wizard(&app).session().clone();

        press(&mut app, KeyCode::Esc);
        assert!(app.wizard().is_none());
        press(&mut app, KeyCode::Enter);
        assert_eq!(predictor.checks.load(Ordering::SeqCst), 2);
        let second = wizard(&app).session();
        assert_ne!(second.id, first.id);
        assert!(second.opened_at >= first.opened_at);
    }

    #[test]
    fn test_offline_banner_is_rendered() {
        let app = start(FixedScore {
            offline: true,
            ..FixedScore::default()
        });
        assert_eq!(wizard(&app).api_status(), ApiStatus::Unreachable);

        let screen = rendered(&app);
        assert!(screen.contains("API Offline"));
        assert!(screen.contains(API_UNREACHABLE));
        assert!(screen.contains("Offline: score not updated"));
    }

    #[test]
    fn test_typing_edits_focused_field() {
        let mut app = app(12.0);
        assert_eq!(app.screen(), Screen::Assessment);

        press(&mut app, KeyCode::Char('6'));
        press(&mut app, KeyCode::Char('5'));
        assert_eq!(wizard(&app).input().age, "65");

        press(&mut app, KeyCode::Backspace);
        assert_eq!(wizard(&app).input().age, "6");

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Right);
        assert_eq!(wizard(&app).input().value(Field::Gender), "F");
        press(&mut app, KeyCode::Char('7'));
        assert_eq!(wizard(&app).input().value(Field::Gender), "F");
    }

    #[test]
    fn test_walks_wizard_to_summary() {
        let mut app = app(55.0);
        press(&mut app, KeyCode::Char('s'));
        for _ in 1..Step::COUNT {
            press(&mut app, KeyCode::Enter);
        }
        assert_eq!(wizard(&app).step(), Step::LAST);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen(), Screen::Summary);

        let screen = rendered(&app);
        assert!(screen.contains("30-Day Readmission Risk Assessment"));
        assert!(screen.contains("55.0%"));
        assert!(screen.contains("High Risk"));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen(), Screen::Assessment);
        assert_eq!(wizard(&app).step(), Step::FIRST);
        assert!(!wizard(&app).is_complete());
    }

    #[test]
    fn test_rejected_action_shows_notice() {
        let mut app = app(5.0);
        press(&mut app, KeyCode::PageUp);
        assert_eq!(app.notice.as_deref(), Some("Already at the first step"));

        press(&mut app, KeyCode::Char('1'));
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_assessment_screen_shows_validation_and_score() {
        let mut app = app(18.4);
        for c in ['2', '0', '0'] {
            press(&mut app, KeyCode::Char(c));
        }
        let screen = rendered(&app);
        assert!(screen.contains("Step 1 of 5"));
        assert!(screen.contains("Patient Demographics"));
        assert!(screen.contains("Age cannot exceed 150"));
        assert!(screen.contains("18.4%"));
        assert!(screen.contains("Low Risk"));
    }

    #[test]
    fn test_escape_returns_to_landing() {
        let mut app = app(30.0);
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen(), Screen::Landing);
        assert!(app.wizard().is_none());

        let screen = rendered(&app);
        assert!(screen.contains("Predict Heart Failure Readmissions with Precision"));
    }
}
