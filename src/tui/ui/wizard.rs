//! Assessment view: step form, risk sidebar and indicator panels.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use super::key_hints;
use crate::application::{ApiStatus, WizardController};
use crate::domain::indicators::{
    chronicity_index, criticality_ratio, criticality_score, lab_profile, CriticalityLevel,
};
use crate::domain::validation::AGE_MAX;
use crate::domain::{
    format_score, AssessmentInput, ChoiceOption, Field, FieldErrors, FieldKind, RiskLevel, Step,
};
use crate::ports::RiskPredictor;
use crate::tui::styles::MedicalTheme;

/// Everything the assessment screen draws, borrowed from the controller.
pub struct AssessmentView<'a> {
    pub step: Step,
    pub input: &'a AssessmentInput,
    pub errors: &'a FieldErrors,
    pub focused: Option<Field>,
    pub risk_score: f64,
    pub api_status: ApiStatus,
    pub api_error: Option<&'a str>,
    pub loading: bool,
    pub transition_pending: bool,
    /// Transient message from the last rejected key press
    pub notice: Option<&'a str>,
}

impl<'a> AssessmentView<'a> {
    pub fn new<P>(
        controller: &'a WizardController<P>,
        focused: Option<Field>,
        notice: Option<&'a str>,
    ) -> Self
    where
        P: RiskPredictor + 'static,
    {
        Self {
            step: controller.step(),
            input: controller.input(),
            errors: controller.errors(),
            focused,
            risk_score: controller.risk_score(),
            api_status: controller.api_status(),
            api_error: controller.api_error(),
            loading: controller.is_loading(),
            transition_pending: controller.pending_transition().is_some(),
            notice,
        }
    }
}

/// Render the assessment screen.
pub fn render_assessment(f: &mut Frame, area: Rect, view: &AssessmentView) {
    let banner_height = if view.api_error.is_some() { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Header
            Constraint::Length(1),             // Progress
            Constraint::Length(banner_height), // API banner
            Constraint::Min(0),                // Body
            Constraint::Length(3),             // Footer
        ])
        .split(area);

    render_step_header(f, chunks[0], view.step);
    render_progress(f, chunks[1], view.step);
    if let Some(message) = view.api_error {
        render_banner(f, chunks[2], message, view.api_status);
    }

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[3]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(9)])
        .split(body[0]);

    render_fields(f, left[0], view);
    render_indicators(f, left[1], view);
    render_risk_sidebar(f, body[1], view);
    render_footer(f, chunks[4], view);
}

fn render_step_header(f: &mut Frame, area: Rect, step: Step) {
    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(" ", MedicalTheme::text()),
            Span::styled(
                format!("Step {} of {}", step.number(), Step::COUNT),
                MedicalTheme::subtitle(),
            ),
            Span::styled(" │ ", MedicalTheme::text_muted()),
            Span::styled(step.title(), MedicalTheme::title()),
        ]),
        Line::from(Span::styled(
            format!(" {}", step.description()),
            MedicalTheme::text_secondary(),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_progress(f: &mut Frame, area: Rect, step: Step) {
    let mut spans = vec![Span::raw(" ")];
    for n in 1..=Step::COUNT {
        let (dot, style) = match n.cmp(&step.number()) {
            std::cmp::Ordering::Less => ("●", MedicalTheme::success()),
            std::cmp::Ordering::Equal => ("●", MedicalTheme::focused()),
            std::cmp::Ordering::Greater => ("○", MedicalTheme::text_muted()),
        };
        spans.push(Span::styled(dot, style));
        if n < Step::COUNT {
            spans.push(Span::styled("──", MedicalTheme::text_muted()));
        }
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_banner(f: &mut Frame, area: Rect, message: &str, status: ApiStatus) {
    let title = match status {
        ApiStatus::Unreachable => " API Offline ",
        ApiStatus::Checking | ApiStatus::Connected => " Risk Service Error ",
    };
    let banner = Paragraph::new(Line::from(vec![
        Span::styled("! ", MedicalTheme::danger()),
        Span::styled(message.to_string(), MedicalTheme::text()),
    ]))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(title, MedicalTheme::danger()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );
    f.render_widget(banner, area);
}

fn render_fields(f: &mut Frame, area: Rect, view: &AssessmentView) {
    let fields: Vec<Field> = view.step.fields().collect();
    let heights: Vec<u16> = fields
        .iter()
        .map(|field| if view.errors.contains_key(field) { 4 } else { 3 })
        .collect();

    let constraints: Vec<Constraint> = heights
        .iter()
        .map(|&h| Constraint::Length(h))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(area);

    for (i, &field) in fields.iter().enumerate() {
        render_field(f, chunks[i], view, field);
    }
}

fn render_field(f: &mut Frame, area: Rect, view: &AssessmentView, field: Field) {
    let is_focused = view.focused == Some(field);
    let border_style = if is_focused {
        MedicalTheme::border_focused()
    } else {
        MedicalTheme::border()
    };
    let title_style = if is_focused {
        MedicalTheme::focused()
    } else {
        MedicalTheme::text_secondary()
    };

    let block = Block::default()
        .title(Span::styled(format!(" {} ", field.label()), title_style))
        .borders(Borders::ALL)
        .border_style(border_style);

    let value_line = match field.kind() {
        FieldKind::Choice => Line::from(vec![
            Span::styled(" ◀ ", MedicalTheme::text_muted()),
            Span::styled(view.input.display_value(field), MedicalTheme::text()),
            Span::styled(" ▶", MedicalTheme::text_muted()),
        ]),
        FieldKind::Numeric | FieldKind::Scale => {
            let raw = view.input.value(field);
            let value = if raw.is_empty() {
                Span::styled(field.hint(), MedicalTheme::text_muted())
            } else {
                Span::styled(raw, MedicalTheme::text())
            };
            let mut spans = vec![Span::raw(" "), value];
            if is_focused {
                spans.push(Span::styled("▌", MedicalTheme::cursor()));
            }
            if field.kind() == FieldKind::Scale {
                spans.push(Span::styled("  (0-4, ←/→ to adjust)", MedicalTheme::text_muted()));
            }
            Line::from(spans)
        }
    };

    let mut lines = vec![value_line];
    if let Some(message) = view.errors.get(&field) {
        lines.push(Line::from(Span::styled(
            format!(" {message}"),
            MedicalTheme::field_error(),
        )));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_indicators(f: &mut Frame, area: Rect, view: &AssessmentView) {
    match view.step.number() {
        1 => render_demographics(f, area, view.input),
        2 => render_chronicity(f, area, view.input),
        3 => render_lab_profile(f, area, view.input),
        4 => render_criticality(f, area, view.input),
        _ => render_discharge_guidance(f, area, view.risk_score),
    }
}

fn indicator_block(title: &'static str) -> Block<'static> {
    Block::default()
        .title(Span::styled(title, MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border())
}

fn render_demographics(f: &mut Frame, area: Rect, input: &AssessmentInput) {
    let block = indicator_block(" Patient Profile ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(3), Constraint::Min(0)])
        .split(inner);

    let age = input.int(Field::Age).clamp(0, AGE_MAX);
    let gender = Paragraph::new(Line::from(vec![
        Span::styled(" Gender: ", MedicalTheme::text_secondary()),
        Span::styled(input.gender.label(), MedicalTheme::text()),
    ]));
    f.render_widget(gender, rows[0]);

    let gauge = Gauge::default()
        .block(Block::default().title(Span::styled(" Age ", MedicalTheme::text_secondary())))
        .gauge_style(MedicalTheme::info())
        .ratio(age as f64 / AGE_MAX as f64)
        .label(if input.age.is_empty() {
            "not entered".to_string()
        } else {
            format!("{age} years")
        });
    f.render_widget(gauge, rows[1]);
}

fn render_chronicity(f: &mut Frame, area: Rect, input: &AssessmentInput) {
    let index = chronicity_index(input);
    let lines = vec![
        Line::from(vec![
            Span::styled(" Chronicity index: ", MedicalTheme::text_secondary()),
            Span::styled(index.to_string(), MedicalTheme::title()),
        ]),
        Line::from(Span::styled(
            " previous admissions × length of stay",
            MedicalTheme::text_muted(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Previous admissions: ", MedicalTheme::text_secondary()),
            Span::styled(
                input.int(Field::NumberOfPreviousAdmissions).to_string(),
                MedicalTheme::text(),
            ),
            Span::styled("   Length of stay: ", MedicalTheme::text_secondary()),
            Span::styled(
                format!("{} days", input.int(Field::LengthOfStay)),
                MedicalTheme::text(),
            ),
        ]),
    ];
    f.render_widget(
        Paragraph::new(lines).block(indicator_block(" Admission History ")),
        area,
    );
}

fn render_lab_profile(f: &mut Frame, area: Rect, input: &AssessmentInput) {
    let block = indicator_block(" Lab Utilisation ");

    let Some(points) = lab_profile(input) else {
        let empty = Paragraph::new(Line::from(Span::styled(
            " Enter procedures or lab tests to see the profile.",
            MedicalTheme::text_muted(),
        )))
        .block(block);
        f.render_widget(empty, area);
        return;
    };

    let bars: Vec<Bar> = points
        .iter()
        .map(|p| {
            Bar::default()
                .value(p.value)
                .label(Line::from(p.label))
                .style(MedicalTheme::info())
                .value_style(MedicalTheme::header())
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(12)
        .bar_gap(3);
    f.render_widget(chart, area);
}

fn render_criticality(f: &mut Frame, area: Rect, input: &AssessmentInput) {
    let block = indicator_block(" Clinical Criticality ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let score = criticality_score(input);
    let level = CriticalityLevel::from_score(score);

    let summary = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(" Criticality score: ", MedicalTheme::text_secondary()),
            Span::styled(format!("{score:.1}"), MedicalTheme::title()),
            Span::styled(format!("  ({level})"), MedicalTheme::criticality(level)),
        ]),
        Line::from(Span::styled(
            " DRG mortality × DRG severity, max 16",
            MedicalTheme::text_muted(),
        )),
    ]);
    f.render_widget(summary, rows[0]);

    let ratio = criticality_ratio(score);
    let gauge = Gauge::default()
        .gauge_style(MedicalTheme::criticality(level))
        .ratio(ratio)
        .label(format!("{:.0}%", ratio * 100.0));
    f.render_widget(gauge, rows[1]);
}

fn render_discharge_guidance(f: &mut Frame, area: Rect, risk_score: f64) {
    let level = RiskLevel::from_score(risk_score);
    let lines = vec![
        Line::from(vec![
            Span::styled(" Current estimate: ", MedicalTheme::text_secondary()),
            Span::styled(level.label(), MedicalTheme::risk_level(level)),
        ]),
        Line::from(""),
        Line::from(Span::styled(format!(" {}", level.recommendation()), MedicalTheme::text())),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(indicator_block(" Discharge Planning ")),
        area,
    );
}

fn render_risk_sidebar(f: &mut Frame, area: Rect, view: &AssessmentView) {
    let block = Block::default()
        .title(Span::styled(" Readmission Risk ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Score
            Constraint::Length(2), // Badge
            Constraint::Length(3), // Gauge
            Constraint::Length(2), // Status
            Constraint::Min(0),
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
        .label("30-day probability");
    f.render_widget(gauge, rows[2]);

    let status = match (view.api_status, view.loading) {
        (ApiStatus::Checking, _) => {
            Span::styled("Connecting to risk service...", MedicalTheme::text_muted())
        }
        (ApiStatus::Unreachable, _) => {
            Span::styled("Offline: score not updated", MedicalTheme::danger())
        }
        (ApiStatus::Connected, true) => {
            Span::styled("Updating risk score...", MedicalTheme::info())
        }
        (ApiStatus::Connected, false) => Span::styled("Live", MedicalTheme::success()),
    };
    f.render_widget(
        Paragraph::new(Line::from(status)).alignment(Alignment::Center),
        rows[3],
    );
}

fn render_footer(f: &mut Frame, area: Rect, view: &AssessmentView) {
    let content = if let Some(notice) = view.notice {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::warning()),
            Span::styled(notice.to_string(), MedicalTheme::warning()),
        ])
    } else if view.transition_pending {
        Line::from(Span::styled(
            "Waiting for risk score...",
            MedicalTheme::text_muted(),
        ))
    } else {
        let advance = if view.step.is_last() { "Complete" } else { "Next" };
        let mut hints = vec![("↑↓", "Field"), ("←→", "Change"), ("Enter", advance)];
        if !view.step.is_first() {
            hints.push(("PgUp", "Back"));
        }
        hints.extend([("S", "Sample Data"), ("Esc", "Close")]);
        key_hints(&hints)
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
