//! Colour palette and preset styles.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::{ChargeBracket, Severity};

/// Estimator colour palette.
pub struct Theme;

impl Theme {
    /// Deep teal, primary accent
    pub const PRIMARY: Color = Color::Rgb(13, 148, 136); // #0D9488
    pub const PRIMARY_LIGHT: Color = Color::Rgb(45, 212, 191); // #2DD4BF

    pub const BORDER: Color = Color::Rgb(148, 163, 184); // #94A3B8

    pub const SUCCESS: Color = Color::Rgb(16, 185, 129); // #10B981
    pub const WARNING: Color = Color::Rgb(251, 191, 36); // #FBBF24
    pub const DANGER: Color = Color::Rgb(244, 63, 94); // #F43F5E
    pub const INFO: Color = Color::Rgb(59, 130, 246); // #3B82F6

    /// Gold for the headline amount
    pub const MONEY: Color = Color::Rgb(234, 179, 8); // #EAB308

    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    #[must_use]
    pub fn info() -> Style {
        Style::default().fg(Self::INFO)
    }

    /// Headline estimate
    #[must_use]
    pub fn money() -> Style {
        Style::default()
            .fg(Self::MONEY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn cursor() -> Style {
        Style::default().fg(Self::PRIMARY_LIGHT)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Colour for a BMI category or advisory.
    #[must_use]
    pub fn severity(severity: Severity) -> Style {
        match severity {
            Severity::Ok => Style::default().fg(Self::SUCCESS),
            Severity::Warning => Style::default().fg(Self::WARNING),
            Severity::Alert => Style::default().fg(Self::DANGER),
        }
    }

    #[must_use]
    pub fn bracket(bracket: ChargeBracket) -> Style {
        let color = match bracket {
            ChargeBracket::Low => Self::SUCCESS,
            ChargeBracket::Mid => Self::WARNING,
            ChargeBracket::High => Self::DANGER,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Leading marker for a severity, readable without colour.
    #[must_use]
    pub fn severity_icon(severity: Severity) -> &'static str {
        match severity {
            Severity::Ok => "OK",
            Severity::Warning => "!",
            Severity::Alert => "!!",
        }
    }
}
