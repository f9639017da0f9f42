//! UI module: View components for the TUI.

pub mod estimate;
pub mod form;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::Theme;

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![Span::styled(
            "DISCLAIMER: Estimates come from a statistical model and are not a quote from any insurer.",
            Theme::text_muted(),
        )]),
        Line::from(vec![Span::styled(
            "Health insights are general guidance and do not replace medical advice.",
            Theme::text_muted(),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Theme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
