use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::{
    app::{AppState, KeywordField, KeywordsState},
    ui::{
        components::{card::Card, card::render_notice},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(5)])
        .split(area);

    render_entries(frame, layout[0], &state.keywords, &theme);
    render_form(frame, layout[1], &state.keywords, &theme);
}

fn render_entries(frame: &mut Frame<'_>, area: Rect, keywords: &KeywordsState, theme: &Theme) {
    if let Some(error) = &keywords.error {
        render_notice(
            frame,
            area,
            "Parole chiave",
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
    if !keywords.loaded {
        render_notice(
            frame,
            area,
            "Parole chiave",
            vec![Line::from(vec![
                Span::raw("Premi "),
                Span::styled("Invio", Style::default().fg(theme.accent)),
                Span::raw(" per caricare le parole chiave."),
            ])],
        );
        return;
    }
    if keywords.items.is_empty() {
        render_notice(
            frame,
            area,
            "Parole chiave",
            vec![Line::from("Nessuna parola chiave configurata.")],
        );
        return;
    }

    let items = keywords
        .items
        .iter()
        .map(|entry| {
            let count = entry.terms().len();
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} ({count})  ", entry.category),
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(entry.keywords.clone()),
            ]))
        })
        .collect::<Vec<_>>();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Parole chiave "),
    );
    frame.render_widget(list, area);
}

fn render_form(frame: &mut Frame<'_>, area: Rect, keywords: &KeywordsState, theme: &Theme) {
    let field_style = |field: KeywordField| {
        if keywords.editing && keywords.focus == field {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim)
        }
    };

    let category = if keywords.categories.is_empty() {
        "premi / per scegliere".to_string()
    } else {
        format!(
            "{} (↑/↓)",
            keywords
                .categories
                .get(keywords.category_index)
                .map(String::as_str)
                .unwrap_or("-")
        )
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Categoria: ", field_style(KeywordField::Category)),
            Span::raw(category),
        ]),
        Line::from(vec![
            Span::styled("Parole: ", field_style(KeywordField::Term)),
            Span::raw(keywords.term_input.clone()),
        ]),
    ];

    if keywords.submitting {
        lines.push(Line::from(Span::styled(
            "Invio in corso...",
            Style::default().fg(theme.dim),
        )));
    } else if let Some(error) = &keywords.form_error {
        lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(theme.error),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled("Invio", Style::default().fg(theme.accent)),
            Span::raw(" aggiunge  "),
            Span::styled("x", Style::default().fg(theme.accent)),
            Span::raw(" elimina (fuori dal modulo)  "),
            Span::styled("Esc", Style::default().fg(theme.accent)),
            Span::raw(" chiude"),
        ]));
    }

    let card = Card::new("Aggiungi / elimina", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);
    frame.render_widget(Paragraph::new(lines), inner);
}
