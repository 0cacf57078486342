//! Landing view: product overview and entry point.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::key_hints;
use crate::config::Config;
use crate::tui::styles::{MedicalTheme, LOGO, LOGO_SMALL};

/// Render the landing screen.
pub fn render_landing(f: &mut Frame, area: Rect, config: &Config) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Hero
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0]);
    render_hero(f, chunks[1], config);

    let footer = Paragraph::new(key_hints(&[
        ("Enter", "Start Assessment"),
        ("Q", "Quit"),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(footer, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled(LOGO_SMALL, MedicalTheme::title()),
        Span::styled(" │ ", MedicalTheme::text_muted()),
        Span::styled("Heart Failure Readmission Risk", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_hero(f: &mut Frame, area: Rect, config: &Config) {
    let mut lines: Vec<Line> = LOGO
        .lines()
        .filter(|l| !l.is_empty())
        .map(|l| Line::from(Span::styled(l.to_string(), MedicalTheme::subtitle())))
        .collect();

    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "Predict Heart Failure Readmissions with Precision",
            MedicalTheme::title(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Recure uses advanced machine learning to help clinicians identify patients at risk for readmission.",
            MedicalTheme::text_secondary(),
        )),
        Line::from(Span::styled(
            "Five short steps: demographics, admission history, clinical procedures, severity, discharge.",
            MedicalTheme::text_muted(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Risk service: ", MedicalTheme::text_secondary()),
            Span::styled(config.api_base_url.clone(), MedicalTheme::info()),
        ]),
    ]);

    let hero = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        );

    f.render_widget(hero, area);
}
