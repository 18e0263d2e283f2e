use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::{AppState, SearchField, SearchState},
    pagination::PAGE_SIZE,
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
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_filters(frame, layout[0], &state.search, &theme);

    let search = &state.search;
    if let Some(error) = &search.error {
        render_notice(
            frame,
            layout[1],
            "Risultati",
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
    let Some(response) = &search.response else {
        render_notice(
            frame,
            layout[1],
            "Risultati",
            vec![Line::from(vec![
                Span::raw("Imposta i filtri con "),
                Span::styled("/", Style::default().fg(theme.accent)),
                Span::raw(" e premi "),
                Span::styled("Invio", Style::default().fg(theme.accent)),
                Span::raw(" per cercare."),
            ])],
        );
        return;
    };
    if response.transactions.is_empty() {
        render_notice(
            frame,
            layout[1],
            "Risultati",
            vec![Line::from("Nessun movimento corrispondente.")],
        );
        return;
    }

    let result_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(layout[1]);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!("Trovati {} movimenti", response.total_transactions),
            Style::default().fg(theme.dim),
        ))),
        result_area[0],
    );

    // Server-paged: the list is exactly the page the Gateway returned, and
    // the row numbers continue across pages.
    let offset = (search.page.saturating_sub(1) as usize) * PAGE_SIZE;
    transactions::render_list(
        frame,
        result_area[1],
        &response.transactions,
        search.selected,
        offset,
        &theme,
    );
    transactions::render_page_footer(
        frame,
        layout[2],
        search.page as usize,
        response.total_pages.max(1) as usize,
        response.transactions.len(),
        &theme,
    );
}

fn render_filters(frame: &mut Frame<'_>, area: Rect, search: &SearchState, theme: &Theme) {
    let field = |field: SearchField, value: &str| {
        let focused = search.editing && search.focus == field;
        let marker = if focused { ">" } else { " " };
        let label_style = if focused {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim)
        };
        vec![
            Span::styled(marker.to_string(), Style::default().fg(theme.accent)),
            Span::styled(format!("{}: ", field.label()), label_style),
            Span::raw(format!("{value:<16}")),
        ]
    };

    let mut first = field(SearchField::Month, &search.month_input);
    first.extend(field(SearchField::Content, &search.content_input));
    let mut second = field(SearchField::Amount, &search.amount_input);
    second.extend(field(SearchField::Category, &search.category_input));
    if search.loading {
        second.push(Span::styled("  ricerca...", Style::default().fg(theme.dim)));
    }

    let card = Card::new("Cerca", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);
    frame.render_widget(
        Paragraph::new(vec![Line::from(first), Line::from(second)]),
        inner,
    );
}
