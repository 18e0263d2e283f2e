use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::{
    app::{AppState, RangeField, StatsState},
    summary::Totals,
    ui::{
        components::{card::Card, card::render_notice, charts, transactions},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    render_header(frame, layout[0], &state.stats, &theme);

    let stats = &state.stats;
    if let Some(error) = &stats.error {
        render_notice(
            frame,
            layout[2],
            "Statistiche",
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
    let Some(summary) = &stats.summary else {
        render_notice(
            frame,
            layout[2],
            "Statistiche",
            vec![Line::from(vec![
                Span::raw("Scegli l'intervallo con "),
                Span::styled("/", Style::default().fg(theme.accent)),
                Span::raw(" e premi "),
                Span::styled("Invio", Style::default().fg(theme.accent)),
                Span::raw(" per caricare."),
            ])],
        );
        return;
    };

    let totals = Totals {
        income: summary.income,
        expense: summary.expense,
    };
    transactions::render_summary_row(frame, layout[1], &totals, &theme);
    render_breakdown(frame, layout[2], stats, &theme);
}

fn render_header(frame: &mut Frame<'_>, area: Rect, stats: &StatsState, theme: &Theme) {
    let focus = |field: RangeField| {
        if stats.editing && stats.focus == field {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim)
        }
    };
    let mut line = vec![
        Span::styled("Dal", focus(RangeField::Start)),
        Span::raw(format!(": {}   ", stats.start_input)),
        Span::styled("Al", focus(RangeField::End)),
        Span::raw(format!(": {}", stats.end_input)),
    ];
    if stats.loading {
        line.push(Span::styled(
            "  caricamento...",
            Style::default().fg(theme.dim),
        ));
    }

    let card = Card::new("Statistiche", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);
    frame.render_widget(Paragraph::new(Line::from(line)), inner);
}

/// Expense breakdown by category: one bar per category, proportional to
/// the biggest slice, with amount and share of the total.
fn render_breakdown(frame: &mut Frame<'_>, area: Rect, stats: &StatsState, theme: &Theme) {
    let Some(chart) = &stats.chart else {
        return;
    };
    if chart.chart_data.is_empty() {
        render_notice(
            frame,
            area,
            "Spese per categoria",
            vec![Line::from("Nessuna spesa nell'intervallo.")],
        );
        return;
    }

    let max = chart
        .chart_data
        .iter()
        .map(|slice| slice.amount)
        .max()
        .unwrap_or(0);
    let total: u64 = chart.chart_data.iter().map(|slice| slice.amount).sum();

    let items = chart
        .chart_data
        .iter()
        .map(|slice| {
            let share = if total > 0 {
                slice.amount as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<18}", slice.category)),
                Span::styled(
                    charts::ascii_bar(slice.amount, max, 24),
                    Style::default().fg(theme.accent),
                ),
                Span::raw(format!(
                    "  {} ({share:.1}%)",
                    crate::ui::components::money::format_amount(slice.amount)
                )),
            ]))
        })
        .collect::<Vec<_>>();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Spese per categoria "),
    );
    frame.render_widget(list, area);
}
