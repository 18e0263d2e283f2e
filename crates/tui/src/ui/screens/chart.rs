use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::{AppState, ChartState, RangeField},
    ui::{
        components::{card::Card, card::render_notice, charts, money},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(8),
        ])
        .split(area);

    render_header(frame, layout[0], &state.chart, &theme);

    let chart = &state.chart;
    if let Some(error) = &chart.error {
        render_notice(
            frame,
            layout[1],
            "Andamento",
            vec![
                Line::from(Span::styled(
                    error.as_str(),
                    Style::default().fg(theme.error),
                )),
                Line::from(vec![
                    Span::raw("Premi "),
                    Span::styled("Invio", Style::default().fg(theme.accent)),
                    Span::raw(" per riprovare."),
                ]),
            ],
        );
        return;
    }
    if !chart.loaded || chart.data.is_empty() {
        render_notice(
            frame,
            layout[1],
            "Andamento",
            vec![Line::from(vec![
                Span::raw("Scegli i mesi con "),
                Span::styled("/", Style::default().fg(theme.accent)),
                Span::raw(" e premi "),
                Span::styled("Invio", Style::default().fg(theme.accent)),
                Span::raw(" per caricare."),
            ])],
        );
        return;
    }

    let labels: Vec<String> = chart
        .data
        .iter()
        .map(|month| format!("{:02}", month.month))
        .collect();
    let income: Vec<(&str, u64)> = chart
        .data
        .iter()
        .zip(&labels)
        .map(|(month, label)| (label.as_str(), month.income.max(0) as u64))
        .collect();
    let expense: Vec<(&str, u64)> = chart
        .data
        .iter()
        .zip(&labels)
        .map(|(month, label)| (label.as_str(), month.expense.max(0) as u64))
        .collect();

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[1]);
    charts::render_bar_chart(frame, halves[0], "Entrate", &income, theme.positive, &theme);
    charts::render_bar_chart(frame, halves[1], "Uscite", &expense, theme.negative, &theme);

    render_legend(frame, layout[2], chart, &theme);
}

fn render_header(frame: &mut Frame<'_>, area: Rect, chart: &ChartState, theme: &Theme) {
    let focus = |field: RangeField| {
        if chart.editing && chart.focus == field {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim)
        }
    };
    let mut line = vec![
        Span::styled("Da mese", focus(RangeField::Start)),
        Span::raw(format!(": {}   ", chart.start_input)),
        Span::styled("A mese", focus(RangeField::End)),
        Span::raw(format!(": {}", chart.end_input)),
        Span::styled("  (anno corrente)", Style::default().fg(theme.dim)),
    ];
    if chart.loading {
        line.push(Span::styled(
            "  caricamento...",
            Style::default().fg(theme.dim),
        ));
    }

    let card = Card::new("Andamento", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);
    frame.render_widget(Paragraph::new(Line::from(line)), inner);
}

fn render_legend(frame: &mut Frame<'_>, area: Rect, chart: &ChartState, theme: &Theme) {
    let lines = chart
        .data
        .iter()
        .map(|month| {
            let difference = month.income - month.expense;
            let diff_color = if difference >= 0 {
                theme.positive
            } else {
                theme.negative
            };
            Line::from(vec![
                Span::styled(
                    format!("Mese {:02}:  ", month.month),
                    Style::default().fg(theme.dim),
                ),
                Span::raw(format!(
                    "entrate {}  uscite {}  ",
                    money::format_signed(month.income),
                    money::format_signed(month.expense)
                )),
                Span::styled(
                    format!("diff {}", money::format_signed(difference)),
                    Style::default().fg(diff_color).add_modifier(Modifier::BOLD),
                ),
            ])
        })
        .collect::<Vec<_>>();

    let card = Card::new("Riepilogo", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);
    frame.render_widget(Paragraph::new(lines), inner);
}
