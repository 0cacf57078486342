//! Completion view: final score and recommendation.

use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use super::key_hints;
use crate::domain::{format_score, RiskLevel};
use crate::tui::styles::MedicalTheme;

/// Final result of a completed assessment.
#[derive(Debug, Clone)]
pub struct SummaryView<'a> {
    pub risk_score: f64,
    pub completed_at: Option<DateTime<Utc>>,
    /// Set when the final request failed and the score is from an earlier step
    pub api_error: Option<&'a str>,
}

/// Render the completion popup centred in `area`.
pub fn render_summary(f: &mut Frame, area: Rect, view: &SummaryView) {
    let popup = centered(area, 72, 18);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(Span::styled(
            " 30-Day Readmission Risk Assessment ",
            MedicalTheme::subtitle(),
        ))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Score
            Constraint::Length(2), // Badge
            Constraint::Length(3), // Gauge
            Constraint::Length(4), // Recommendation
            Constraint::Min(1),    // Meta
            Constraint::Length(1), // Keys
        ])
        .margin(1)
        .split(inner);

    let level = RiskLevel::from_score(view.risk_score);

    let score = Paragraph::new(Line::from(Span::styled(
        format_score(view.risk_score),
        MedicalTheme::risk_level(level).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(score, rows[0]);

    let badge = Paragraph::new(Line::from(Span::styled(
        format!(" {} ", level.label()),
        MedicalTheme::risk_badge(level),
    )))
    .alignment(Alignment::Center);
    f.render_widget(badge, rows[1]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(MedicalTheme::risk_level(level))
        .percent(view.risk_score.clamp(0.0, 100.0) as u16)
        .label(format_score(view.risk_score));
    f.render_widget(gauge, rows[2]);

    let recommendation = Paragraph::new(vec![
        Line::from(Span::styled("Clinical Recommendation", MedicalTheme::text_secondary())),
        Line::from(Span::styled(level.recommendation(), MedicalTheme::text())),
    ])
    .wrap(Wrap { trim: true });
    f.render_widget(recommendation, rows[3]);

    let mut meta = Vec::new();
    if let Some(at) = view.completed_at {
        meta.push(Line::from(vec![
            Span::styled("Completed: ", MedicalTheme::text_secondary()),
            Span::styled(
                at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
                MedicalTheme::text_muted(),
            ),
        ]));
    }
    if let Some(message) = view.api_error {
        meta.push(Line::from(vec![
            Span::styled("! ", MedicalTheme::warning()),
            Span::styled(message.to_string(), MedicalTheme::warning()),
        ]));
    }
    f.render_widget(Paragraph::new(meta).wrap(Wrap { trim: true }), rows[4]);

    f.render_widget(
        Paragraph::new(key_hints(&[("Enter", "New Assessment"), ("Esc", "Close")]))
            .alignment(Alignment::Center),
        rows[5],
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}
