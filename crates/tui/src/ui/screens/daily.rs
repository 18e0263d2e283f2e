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
    transactions::render_summary_row(frame, layout[1], &state.daily.totals, &theme);

    let daily = &state.daily;
    if let Some(error) = &daily.error {
        render_notice(
            frame,
            layout[2],
            "Movimenti",
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
    if !daily.loaded {
        render_notice(
            frame,
            layout[2],
            "Movimenti",
            vec![Line::from(vec![
                Span::raw("Premi "),
                Span::styled("Invio", Style::default().fg(theme.accent)),
                Span::raw(" per caricare i movimenti del giorno."),
            ])],
        );
        return;
    }
    if daily.items.is_empty() {
        render_notice(
            frame,
            layout[2],
            "Movimenti",
            vec![Line::from("Nessun movimento in questo giorno.")],
        );
        return;
    }

    let rows = daily.pager.slice(&daily.items);
    let offset = (daily.pager.page - 1) * daily.pager.page_size;
    transactions::render_list(frame, layout[2], rows, daily.selected, offset, &theme);
    transactions::render_page_footer(
        frame,
        layout[3],
        daily.pager.page,
        daily.pager.total_pages(daily.items.len()),
        daily.items.len(),
        &theme,
    );
}

fn render_header(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let daily = &state.daily;
    let mut line = vec![
        Span::styled("Data", Style::default().fg(theme.dim)),
        Span::raw(format!(": {}", daily.date_input)),
    ];
    if daily.editing {
        line.push(Span::styled("▏", Style::default().fg(theme.accent)));
        line.push(Span::styled(
            "  modifica (Invio applica, Esc esce)",
            Style::default().fg(theme.accent),
        ));
    }
    if daily.loading {
        line.push(Span::styled(
            "  caricamento...",
            Style::default().fg(theme.dim),
        ));
    } else if daily.loaded && daily.error.is_none() {
        line.push(Span::styled(
            format!("  {} movimenti", daily.items.len()),
            Style::default().fg(theme.dim),
        ));
    }

    let card = Card::new("Giorno", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);
    frame.render_widget(Paragraph::new(Line::from(line)), inner);
}
