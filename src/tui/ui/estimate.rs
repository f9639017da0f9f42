//! Estimate result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::{BmiSource, ChargeEstimate, PREMIUM_REFERENCE};
use crate::tui::styles::Theme;

/// Result screen state
#[derive(Debug, Clone, Default)]
pub enum EstimateState {
    /// Nothing estimated yet
    #[default]
    Idle,
    /// Estimate ready
    Complete { estimate: Box<ChargeEstimate> },
    /// Model or validation failure
    Error { message: String },
}

/// Render the estimate screen
pub fn render_estimate(f: &mut Frame, area: Rect, state: &EstimateState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0]);
    match state {
        EstimateState::Idle => render_idle(f, chunks[1]),
        EstimateState::Complete { estimate } => render_result(f, chunks[1], estimate),
        EstimateState::Error { message } => render_error(f, chunks[1], message),
    }
    render_footer(f, chunks[2], state);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", Theme::text()),
        Span::styled("Estimated Insurance Charges", Theme::title()),
        Span::styled(" │ Random Forest prediction", Theme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Theme::border()),
    );

    f.render_widget(header, area);
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No estimate yet",
            Theme::text_secondary(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Enter patient details to begin",
            Theme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );

    f.render_widget(content, area);
}

fn render_result(f: &mut Frame, area: Rect, estimate: &ChargeEstimate) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Headline + conversions
            Constraint::Length(4), // BMI
            Constraint::Min(7),    // Bracket + advisories
        ])
        .split(area);

    render_headline(f, rows[0], estimate);
    render_bmi(f, rows[1], estimate);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    render_advisories(f, columns[0], estimate);
    render_bracket(f, columns[1], estimate);
}

fn render_headline(f: &mut Frame, area: Rect, estimate: &ChargeEstimate) {
    let conversions: Vec<Span> = estimate
        .conversions
        .iter()
        .flat_map(|c| {
            [
                Span::styled(format!("{}: ", c.currency.code()), Theme::text_secondary()),
                Span::styled(format!("{}   ", c.formatted()), Theme::text()),
            ]
        })
        .collect();

    let content = Paragraph::new(vec![
        Line::from(Span::styled(estimate.formatted_amount(), Theme::money())),
        Line::from(""),
        Line::from(conversions),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .title(Span::styled(" Estimate ", Theme::subtitle()))
            .borders(Borders::ALL)
            .border_style(Theme::border_focused()),
    );

    f.render_widget(content, area);
}

fn render_bmi(f: &mut Frame, area: Rect, estimate: &ChargeEstimate) {
    let source = match estimate.bmi_source {
        BmiSource::Entered => "entered",
        BmiSource::Calculated => "calculated",
        BmiSource::Defaulted => "default, no height given",
    };

    let content = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("BMI: ", Theme::text_secondary()),
            Span::styled(format!("{:.2}", estimate.profile.bmi), Theme::title()),
            Span::styled(format!(" ({source})"), Theme::text_muted()),
        ]),
        Line::from(vec![
            Span::styled("Classification: ", Theme::text_secondary()),
            Span::styled(
                estimate.bmi_category.label(),
                Theme::severity(estimate.bmi_category.severity()),
            ),
        ]),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );

    f.render_widget(content, area);
}

fn render_advisories(f: &mut Frame, area: Rect, estimate: &ChargeEstimate) {
    let lines: Vec<Line> = estimate
        .advisories
        .iter()
        .flat_map(|a| {
            [
                Line::from(vec![
                    Span::styled(
                        format!("{} ", Theme::severity_icon(a.severity)),
                        Theme::severity(a.severity),
                    ),
                    Span::styled(a.message, Theme::text()),
                ]),
                Line::from(""),
            ]
        })
        .collect();

    let content = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(Span::styled(" Personalized Health Insights ", Theme::subtitle()))
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );

    f.render_widget(content, area);
}

fn render_bracket(f: &mut Frame, area: Rect, estimate: &ChargeEstimate) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Bracket: ", Theme::text_secondary()),
            Span::styled(
                format!("{} ({})", estimate.bracket, estimate.bracket.label()),
                Theme::bracket(estimate.bracket),
            ),
        ]),
        Line::from(Span::styled(estimate.bracket.insight(), Theme::info())),
        Line::from(""),
    ];
    for (range, coverage) in PREMIUM_REFERENCE {
        lines.push(Line::from(vec![
            Span::styled(range, Theme::text()),
            Span::styled(format!(" → {coverage}"), Theme::text_muted()),
        ]));
    }

    let content = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(Span::styled(" Premium Ranges ", Theme::subtitle()))
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );

    f.render_widget(content, area);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Error", Theme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, Theme::text())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::danger()),
    );

    f.render_widget(content, area);
}

fn render_footer(f: &mut Frame, area: Rect, state: &EstimateState) {
    let content = match state {
        EstimateState::Error { .. } => Line::from(vec![
            Span::styled("[Enter] ", Theme::key_hint()),
            Span::styled("Back to Form ", Theme::key_desc()),
            Span::styled("[Q] ", Theme::key_hint()),
            Span::styled("Quit", Theme::key_desc()),
        ]),
        _ => Line::from(vec![
            Span::styled("[Enter/N] ", Theme::key_hint()),
            Span::styled("New Estimate ", Theme::key_desc()),
            Span::styled("[Q] ", Theme::key_hint()),
            Span::styled("Quit", Theme::key_desc()),
        ]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Theme::border()),
    );

    f.render_widget(footer, area);
}
