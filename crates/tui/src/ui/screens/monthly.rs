use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::AppState,
    ui::{
        components::{card::Card, card::render_notice, transactions},
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
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, layout[0], state, &theme);
    transactions::render_summary_row(frame, layout[1], &state.monthly.totals, &theme);

    let monthly = &state.monthly;
    if let Some(error) = &monthly.error {
        render_notice(
            frame,
            layout[2],
            "Movimenti del mese",
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
    if !monthly.loaded {
        render_notice(
            frame,
            layout[2],
            "Movimenti del mese",
            vec![Line::from(vec![
                Span::raw("Premi "),
                Span::styled("Invio", Style::default().fg(theme.accent)),
                Span::raw(" per caricare i movimenti del mese."),
            ])],
        );
        return;
    }
    if monthly.items.is_empty() {
        render_notice(
            frame,
            layout[2],
            "Movimenti del mese",
            vec![Line::from("Nessun movimento in questo mese.")],
        );
        return;
    }

    let rows = monthly.pager.slice(&monthly.items);
    let offset = (monthly.pager.page - 1) * monthly.pager.page_size;
    transactions::render_list(frame, layout[2], rows, monthly.selected, offset, &theme);
    transactions::render_page_footer(
        frame,
        layout[3],
        monthly.pager.page,
        monthly.pager.total_pages(monthly.items.len()),
        monthly.items.len(),
        &theme,
    );
}

fn render_header(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let monthly = &state.monthly;
    let mut line = vec![
        Span::styled("Mese", Style::default().fg(theme.dim)),
        Span::raw(format!(": {}", monthly.month_input)),
    ];
    if monthly.editing {
        line.push(Span::styled(
            "  modifica (Invio applica, Esc esce)",
            Style::default().fg(theme.accent),
        ));
    }
    if monthly.loading {
        line.push(Span::styled(
            "  caricamento...",
            Style::default().fg(theme.dim),
        ));
    } else if monthly.loaded && monthly.error.is_none() {
        line.push(Span::styled(
            format!("  {} movimenti nel mese", monthly.items.len()),
            Style::default().fg(theme.dim),
        ));
    }

    let card = Card::new("Mese", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);
    frame.render_widget(Paragraph::new(Line::from(line)), inner);
}
