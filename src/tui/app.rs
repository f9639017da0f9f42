//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Synchronous estimation on submit

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::ForestModel;
use crate::application::EstimationService;
use crate::config::EstimatorConfig;
use crate::ports::ChargeModel;
use crate::MedchargeError;

use super::ui::{
    estimate::{render_estimate, EstimateState},
    form::{render_form, FormState},
    render_disclaimer,
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Estimate,
}

/// Main application state
pub struct App<M: ChargeModel = ForestModel> {
    screen: Screen,

    should_quit: bool,

    service: EstimationService<M>,

    /// Cached for the form header
    model_description: String,

    form_state: FormState,

    estimate_state: EstimateState,
}

impl App<ForestModel> {
    /// Create a new application from environment configuration.
    ///
    /// # Errors
    /// Returns error if configuration is invalid or the model cannot be loaded.
    pub fn new() -> Result<Self> {
        let config = EstimatorConfig::from_env()?;

        if !config.model_path.exists() {
            return Err(anyhow!(
                "Model path not found at {:?}. Set MEDCHARGE_MODEL_PATH to a directory containing model.json.",
                config.model_path
            ));
        }

        let model = ForestModel::load(&config.model_path, config.require_manifest)
            .map_err(|e| anyhow!("Failed to load model from {:?}: {}", config.model_path, e))?;

        Ok(Self::with_service(EstimationService::new(
            Arc::new(model),
            config,
        )))
    }
}

impl<M: ChargeModel> App<M> {
    /// Create application with an injected service.
    pub fn with_service(service: EstimationService<M>) -> Self {
        Self {
            screen: Screen::Form,
            should_quit: false,
            model_description: service.model_description(),
            service,
            form_state: FormState::default(),
            estimate_state: EstimateState::default(),
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                match self.screen {
                    Screen::Form => {
                        render_form(f, chunks[0], &self.form_state, &self.model_description)
                    }
                    Screen::Estimate => render_estimate(f, chunks[0], &self.estimate_state),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    // Windows reports both press and release.
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Estimate => self.handle_estimate_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form_state.next_field();
            }
            KeyCode::Left => {
                self.form_state.cycle_choice(false);
            }
            KeyCode::Right | KeyCode::Char(' ') => {
                self.form_state.cycle_choice(true);
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.form_state.load_sample_data();
            }
            KeyCode::Char(c) => {
                self.form_state.input_char(c);
            }
            KeyCode::Backspace => {
                self.form_state.delete_char();
            }
            KeyCode::Delete => {
                self.form_state.clear_field();
            }
            KeyCode::Enter => {
                self.submit_form();
            }
            _ => {}
        }
    }

    fn handle_estimate_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.screen = Screen::Form;
            }
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let request = match self.form_state.to_request() {
            Ok(request) => request,
            Err(e) => {
                self.form_state.error_message = Some(e);
                return;
            }
        };

        match self.service.estimate(request) {
            Ok(estimate) => {
                self.estimate_state = EstimateState::Complete {
                    estimate: Box::new(estimate),
                };
                // Plaintext inputs do not outlive a successful estimate.
                self.form_state.clear_sensitive();
            }
            Err(MedchargeError::Validation(message)) => {
                self.form_state.error_message = Some(message);
                return;
            }
            Err(e) => {
                tracing::error!("Estimation failed: {}", e);
                self.estimate_state = EstimateState::Error {
                    message: e.to_string(),
                };
            }
        }
        self.screen = Screen::Estimate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChargeBracket, PatientProfile};
    use crate::ports::ModelError;

    struct FlatModel(f64);

    impl ChargeModel for FlatModel {
        fn predict(&self, _profile: &PatientProfile) -> Result<f64, ModelError> {
            if self.0 < 0.0 {
                return Err(ModelError::Prediction("negative".into()));
            }
            Ok(self.0)
        }

        fn describe(&self) -> String {
            "flat".into()
        }
    }

    fn app(amount: f64) -> App<FlatModel> {
        App::with_service(EstimationService::new(
            Arc::new(FlatModel(amount)),
            EstimatorConfig::default(),
        ))
    }

    fn press(app: &mut App<FlatModel>, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    #[test]
    fn test_submit_defaults_shows_estimate() {
        let mut app = app(61_600.0);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Estimate);
        match &app.estimate_state {
            EstimateState::Complete { estimate } => {
                assert_eq!(estimate.bracket, ChargeBracket::High);
                assert_eq!(estimate.formatted_amount(), "₦61,600.00");
            }
            other => panic!("expected estimate, got {other:?}"),
        }

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen, Screen::Form);
    }

    #[test]
    fn test_out_of_range_input_stays_on_form() {
        let mut app = app(1_000.0);
        // Age is the first field; make it 101.
        press(&mut app, KeyCode::Delete);
        for c in "101".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Form);
        let message = app.form_state.error_message.clone().expect("error shown");
        assert!(message.contains("Age 101"));
        assert_eq!(app.form_state.age, "101");
    }

    #[test]
    fn test_count_beyond_u8_reports_range() {
        let mut app = app(1_000.0);
        press(&mut app, KeyCode::Delete);
        for c in "300".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Form);
        assert_eq!(
            app.form_state.error_message.as_deref(),
            Some("Age 300 out of range [0, 100]")
        );
    }

    #[test]
    fn test_model_error_shows_error_screen() {
        let mut app = app(-1.0);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Estimate);
        assert!(matches!(app.estimate_state, EstimateState::Error { .. }));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Form);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app(1.0);
        app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);

        let mut app = self::app(1.0);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }
}
