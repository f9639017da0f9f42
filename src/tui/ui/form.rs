//! Patient data entry form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{
    compute_bmi, BmiCategory, BmiInput, EstimateRequest, Region, Sex, Smoker, DEFAULT_AGE,
    DEFAULT_BMI, DEFAULT_CHILDREN,
};
use crate::tui::styles::Theme;

/// Whether the patient types their BMI or has it calculated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiMode {
    Known,
    Calculate,
}

impl BmiMode {
    fn label(&self) -> &'static str {
        match self {
            Self::Known => "Yes, I know my BMI",
            Self::Calculate => "No, calculate my BMI",
        }
    }

    fn toggled(&self) -> Self {
        match self {
            Self::Known => Self::Calculate,
            Self::Calculate => Self::Known,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    Age,
    Sex,
    BmiMode,
    Bmi,
    Weight,
    Height,
    Children,
    Smoker,
    Region,
}

impl FieldId {
    fn label(&self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Sex => "Sex",
            Self::BmiMode => "Do you know your BMI?",
            Self::Bmi => "BMI",
            Self::Weight => "Weight (kg)",
            Self::Height => "Height (m)",
            Self::Children => "Number of Children",
            Self::Smoker => "Smoker",
            Self::Region => "Region",
        }
    }

    fn hint(&self) -> &'static str {
        match self {
            Self::Age => "years (0-100)",
            Self::Bmi => "10.0-60.0",
            Self::Weight => "e.g. 65.0",
            Self::Height => "e.g. 1.75",
            Self::Children => "0-10",
            Self::Sex | Self::BmiMode | Self::Smoker | Self::Region => "",
        }
    }

    fn is_choice(&self) -> bool {
        matches!(self, Self::Sex | Self::BmiMode | Self::Smoker | Self::Region)
    }

    /// Whole-number fields reject the decimal point.
    fn is_integer(&self) -> bool {
        matches!(self, Self::Age | Self::Children)
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % all.len()
    } else {
        (idx + all.len() - 1) % all.len()
    };
    all[next]
}

/// Form state. Text fields hold raw keystrokes until submission.
pub struct FormState {
    pub age: String,
    pub sex: Sex,
    pub bmi_mode: BmiMode,
    pub bmi: String,
    pub weight: String,
    pub height: String,
    pub children: String,
    pub smoker: Smoker,
    pub region: Region,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            age: DEFAULT_AGE.to_string(),
            sex: Sex::Male,
            bmi_mode: BmiMode::Known,
            bmi: format!("{DEFAULT_BMI:.1}"),
            weight: String::new(),
            height: String::new(),
            children: DEFAULT_CHILDREN.to_string(),
            smoker: Smoker::Yes,
            region: Region::Northeast,
            selected_field: 0,
            error_message: None,
        }
    }
}

impl FormState {
    /// Fields shown for the current BMI mode, in display order.
    #[must_use]
    pub fn visible_fields(&self) -> Vec<FieldId> {
        let mut fields = vec![FieldId::Age, FieldId::Sex, FieldId::BmiMode];
        match self.bmi_mode {
            BmiMode::Known => fields.push(FieldId::Bmi),
            BmiMode::Calculate => fields.extend([FieldId::Weight, FieldId::Height]),
        }
        fields.extend([FieldId::Children, FieldId::Smoker, FieldId::Region]);
        fields
    }

    #[must_use]
    pub fn current_field(&self) -> FieldId {
        let fields = self.visible_fields();
        fields[self.selected_field.min(fields.len() - 1)]
    }

    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.visible_fields().len();
    }

    pub fn prev_field(&mut self) {
        let len = self.visible_fields().len();
        self.selected_field = (self.selected_field + len - 1) % len;
    }

    fn text_mut(&mut self, field: FieldId) -> Option<&mut String> {
        match field {
            FieldId::Age => Some(&mut self.age),
            FieldId::Bmi => Some(&mut self.bmi),
            FieldId::Weight => Some(&mut self.weight),
            FieldId::Height => Some(&mut self.height),
            FieldId::Children => Some(&mut self.children),
            FieldId::Sex | FieldId::BmiMode | FieldId::Smoker | FieldId::Region => None,
        }
    }

    fn text(&self, field: FieldId) -> Option<&str> {
        match field {
            FieldId::Age => Some(&self.age),
            FieldId::Bmi => Some(&self.bmi),
            FieldId::Weight => Some(&self.weight),
            FieldId::Height => Some(&self.height),
            FieldId::Children => Some(&self.children),
            FieldId::Sex | FieldId::BmiMode | FieldId::Smoker | FieldId::Region => None,
        }
    }

    /// Add a character to the current text field.
    pub fn input_char(&mut self, c: char) {
        let field = self.current_field();
        if !(c.is_ascii_digit() || (c == '.' && !field.is_integer())) {
            return;
        }
        let Some(value) = self.text_mut(field) else {
            return;
        };
        if c == '.' && value.contains('.') {
            return;
        }
        value.push(c);
        self.error_message = None;
    }

    pub fn delete_char(&mut self) {
        let field = self.current_field();
        if let Some(value) = self.text_mut(field) {
            value.pop();
        }
    }

    pub fn clear_field(&mut self) {
        let field = self.current_field();
        if let Some(value) = self.text_mut(field) {
            value.clear();
        }
    }

    /// Step the current choice field forwards or backwards.
    pub fn cycle_choice(&mut self, forward: bool) {
        match self.current_field() {
            FieldId::Sex => self.sex = cycle(&Sex::ALL, self.sex, forward),
            FieldId::Smoker => self.smoker = cycle(&Smoker::ALL, self.smoker, forward),
            FieldId::Region => self.region = cycle(&Region::ALL, self.region, forward),
            // The mode switch changes the field list; keep the cursor on the switch.
            FieldId::BmiMode => self.bmi_mode = self.bmi_mode.toggled(),
            _ => return,
        }
        self.error_message = None;
    }

    /// Wipe text buffers and restore defaults.
    pub fn clear_sensitive(&mut self) {
        for value in [
            &mut self.age,
            &mut self.bmi,
            &mut self.weight,
            &mut self.height,
            &mut self.children,
        ] {
            value.zeroize();
        }
        *self = Self::default();
    }

    /// Fill the form with a typical patient.
    pub fn load_sample_data(&mut self) {
        self.age = "45".into();
        self.sex = Sex::Female;
        self.bmi_mode = BmiMode::Calculate;
        self.weight = "78.5".into();
        self.height = "1.64".into();
        self.children = "2".into();
        self.smoker = Smoker::No;
        self.region = Region::Southeast;
        self.selected_field = 0;
        self.error_message = None;
    }

    /// BMI and classification as they would be submitted right now.
    #[must_use]
    pub fn bmi_preview(&self) -> Option<(f64, BmiCategory)> {
        let bmi = match self.bmi_mode {
            BmiMode::Known => self.bmi.parse::<f64>().ok()?,
            BmiMode::Calculate => {
                let weight = self.weight.parse::<f64>().ok()?;
                let height = self.height.parse::<f64>().ok()?;
                compute_bmi(weight, height)?
            }
        };
        Some((bmi, BmiCategory::classify(bmi)))
    }

    /// Parse the text fields into a request. Ranges are checked by
    /// [`EstimateRequest::validate`].
    ///
    /// # Errors
    /// Returns a message naming the first unparsable field.
    pub fn to_request(&self) -> Result<EstimateRequest, String> {
        fn parse<T: std::str::FromStr>(field: FieldId, raw: &str) -> Result<T, String> {
            raw.trim()
                .parse()
                .map_err(|_| format!("{}: Invalid number", field.label()))
        }

        let bmi = match self.bmi_mode {
            BmiMode::Known => BmiInput::Known(parse(FieldId::Bmi, &self.bmi)?),
            BmiMode::Calculate => BmiInput::Measured {
                weight_kg: parse(FieldId::Weight, &self.weight)?,
                // No height yet means the default BMI is used.
                height_m: if self.height.trim().is_empty() {
                    None
                } else {
                    Some(parse(FieldId::Height, &self.height)?)
                },
            },
        };

        Ok(EstimateRequest {
            age: parse(FieldId::Age, &self.age)?,
            sex: self.sex,
            bmi,
            children: parse(FieldId::Children, &self.children)?,
            smoker: self.smoker,
            region: self.region,
        })
    }

    fn display_value(&self, field: FieldId) -> String {
        match field {
            FieldId::Sex => format!("◀ {} ▶", self.sex),
            FieldId::BmiMode => format!("◀ {} ▶", self.bmi_mode.label()),
            FieldId::Smoker => format!("◀ {} ▶", self.smoker),
            FieldId::Region => format!("◀ {} ▶", self.region),
            _ => self.text(field).unwrap_or_default().to_string(),
        }
    }
}

/// Render the patient data entry form
pub fn render_form(f: &mut Frame, area: Rect, state: &FormState, model: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0], model);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .margin(1)
        .split(chunks[1]);
    render_form_fields(f, columns[0], state);
    render_bmi_panel(f, columns[1], state);

    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect, model: &str) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", Theme::text()),
        Span::styled("Medical Insurance Charge Predictor", Theme::title()),
        Span::styled(format!(" │ {model}"), Theme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Theme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &FormState) {
    let fields = state.visible_fields();
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = i == state.selected_field;
        let (border_style, title_style) = if is_selected {
            (Theme::border_focused(), Theme::focused())
        } else {
            (Theme::border(), Theme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label()), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value = state.display_value(*field);
        let value_display = if value.is_empty() {
            Span::styled(field.hint(), Theme::text_muted())
        } else {
            Span::styled(value, Theme::text())
        };

        let cursor = if is_selected && !field.is_choice() {
            Span::styled("▌", Theme::cursor())
        } else {
            Span::raw("")
        };

        let content = Paragraph::new(Line::from(vec![Span::raw(" "), value_display, cursor]))
            .block(block);

        f.render_widget(content, chunks[i]);
    }
}

fn render_bmi_panel(f: &mut Frame, area: Rect, state: &FormState) {
    let block = Block::default()
        .title(Span::styled(" BMI Information ", Theme::subtitle()))
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let mut lines = vec![Line::from("")];
    match state.bmi_preview() {
        Some((bmi, category)) => {
            let source = match state.bmi_mode {
                BmiMode::Known => "Your BMI",
                BmiMode::Calculate => "Your calculated BMI",
            };
            lines.push(Line::from(vec![
                Span::styled(format!(" {source}: "), Theme::text_secondary()),
                Span::styled(format!("{bmi:.2}"), Theme::title()),
            ]));
            lines.push(Line::from(vec![
                Span::styled(" Classification: ", Theme::text_secondary()),
                Span::styled(category.label(), Theme::severity(category.severity())),
            ]));
        }
        None if state.bmi_mode == BmiMode::Calculate => {
            lines.push(Line::from(Span::styled(
                " Enter weight in kilograms and height in meters.",
                Theme::text_muted(),
            )));
            lines.push(Line::from(Span::styled(
                format!(" Without a height the default BMI {DEFAULT_BMI:.1} is used."),
                Theme::text_muted(),
            )));
        }
        None => {
            lines.push(Line::from(Span::styled(
                " Enter a BMI between 10.0 and 60.0.",
                Theme::text_muted(),
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Based on WHO BMI classification",
        Theme::text_muted(),
    )));

    let panel = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(panel, area);
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &FormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", Theme::danger()),
            Span::styled(err.clone(), Theme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", Theme::key_hint()),
            Span::styled("Navigate ", Theme::key_desc()),
            Span::styled("[←→] ", Theme::key_hint()),
            Span::styled("Change ", Theme::key_desc()),
            Span::styled("[Enter] ", Theme::key_hint()),
            Span::styled("Predict Charges ", Theme::key_desc()),
            Span::styled("[S] ", Theme::key_hint()),
            Span::styled("Sample Data ", Theme::key_desc()),
            Span::styled("[Esc] ", Theme::key_hint()),
            Span::styled("Quit", Theme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Theme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(state: &mut FormState, field: FieldId) {
        state.selected_field = state
            .visible_fields()
            .iter()
            .position(|f| *f == field)
            .expect("field visible");
    }

    #[test]
    fn test_default_form_submits_defaults() {
        let request = FormState::default().to_request().expect("defaults parse");
        assert_eq!(request.age, 30);
        assert_eq!(request.children, 0);
        assert_eq!(request.bmi, BmiInput::Known(25.0));
        assert_eq!(request.smoker, Smoker::Yes);
        assert_eq!(request.region, Region::Northeast);
    }

    #[test]
    fn test_mode_switch_changes_fields() {
        let mut state = FormState::default();
        assert!(state.visible_fields().contains(&FieldId::Bmi));

        select(&mut state, FieldId::BmiMode);
        state.cycle_choice(true);
        assert_eq!(state.bmi_mode, BmiMode::Calculate);
        assert_eq!(state.current_field(), FieldId::BmiMode);
        let fields = state.visible_fields();
        assert!(fields.contains(&FieldId::Weight));
        assert!(fields.contains(&FieldId::Height));
        assert!(!fields.contains(&FieldId::Bmi));
    }

    #[test]
    fn test_calculated_bmi_preview_and_request() {
        let mut state = FormState::default();
        state.bmi_mode = BmiMode::Calculate;
        select(&mut state, FieldId::Weight);
        for c in "65.0".chars() {
            state.input_char(c);
        }
        select(&mut state, FieldId::Height);
        for c in "1.75".chars() {
            state.input_char(c);
        }

        let (bmi, category) = state.bmi_preview().expect("preview");
        assert!((bmi - 21.22).abs() < 1e-9);
        assert_eq!(category, BmiCategory::Normal);

        let request = state.to_request().expect("parse");
        assert_eq!(
            request.bmi,
            BmiInput::Measured {
                weight_kg: 65.0,
                height_m: Some(1.75)
            }
        );
    }

    #[test]
    fn test_empty_height_means_no_height() {
        let mut state = FormState::default();
        state.bmi_mode = BmiMode::Calculate;
        state.weight = "70".into();
        let request = state.to_request().expect("parse");
        assert_eq!(
            request.bmi,
            BmiInput::Measured {
                weight_kg: 70.0,
                height_m: None
            }
        );
        assert!(state.bmi_preview().is_none());
    }

    #[test]
    fn test_input_filtering() {
        let mut state = FormState::default();
        select(&mut state, FieldId::Age);
        state.clear_field();
        for c in "4a.2".chars() {
            state.input_char(c);
        }
        assert_eq!(state.age, "42");

        select(&mut state, FieldId::Bmi);
        state.clear_field();
        for c in "31..5".chars() {
            state.input_char(c);
        }
        assert_eq!(state.bmi, "31.5");
    }

    #[test]
    fn test_large_counts_parse_for_range_check() {
        let mut state = FormState::default();
        state.age = "300".into();
        state.children = "12".into();
        let request = state.to_request().expect("parse");
        assert_eq!(request.age, 300);
        assert_eq!(request.children, 12);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_invalid_number_names_field() {
        let mut state = FormState::default();
        state.age.clear();
        let err = state.to_request().unwrap_err();
        assert!(err.starts_with("Age"));
    }

    #[test]
    fn test_choice_cycling_wraps() {
        let mut state = FormState::default();
        select(&mut state, FieldId::Region);
        state.cycle_choice(false);
        assert_eq!(state.region, Region::Southwest);
        state.cycle_choice(true);
        assert_eq!(state.region, Region::Northeast);
    }

    #[test]
    fn test_clear_sensitive_restores_defaults() {
        let mut state = FormState::default();
        state.load_sample_data();
        state.clear_sensitive();
        assert!(state.weight.is_empty());
        assert_eq!(state.age, "30");
        assert_eq!(state.bmi_mode, BmiMode::Known);
    }
}
