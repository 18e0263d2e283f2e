//! Overlays: the add/edit transaction form and the delete confirmation.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
};

use crate::{
    app::{Overlay, PendingDelete},
    app::forms::{FormField, TransactionForm},
    ui::{
        components::{card::Card, transactions::kind_label},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, overlay: &Overlay) {
    match overlay {
        Overlay::None => {}
        Overlay::Form(form) => render_form(frame, area, form),
        Overlay::ConfirmDelete(pending) => render_confirm(frame, area, pending),
    }
}

fn render_form(frame: &mut Frame<'_>, area: Rect, form: &TransactionForm) {
    let theme = Theme::default();
    let rect = centered_rect(area, 52, 13);
    frame.render_widget(Clear, rect);

    let title = if form.is_edit() {
        "Modifica movimento"
    } else {
        "Nuovo movimento"
    };
    let card = Card::new(title, &theme);
    let inner = card.inner(rect);
    card.render_frame(frame, rect);

    let field_line = |field: FormField, value: String| {
        let marker = if form.focus == field { "> " } else { "  " };
        let label_style = if form.focus == field {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim)
        };
        Line::from(vec![
            Span::styled(marker, Style::default().fg(theme.accent)),
            Span::styled(format!("{:<10}", field.label()), label_style),
            Span::raw(value),
        ])
    };

    let category = form.selected_category().unwrap_or("-").to_string();
    let mut lines = vec![
        field_line(FormField::Date, form.date_input.clone()),
        field_line(FormField::Amount, form.amount_input.clone()),
        field_line(FormField::Kind, kind_label(form.kind).to_string()),
        field_line(FormField::Category, format!("{category} (↑/↓)")),
        field_line(FormField::Content, form.content.clone()),
        field_line(FormField::Note, form.note.clone()),
        Line::from(""),
    ];

    if form.submitting {
        lines.push(Line::from(Span::styled(
            "Invio in corso...",
            Style::default().fg(theme.dim),
        )));
    } else if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(theme.error),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled("Tab", Style::default().fg(theme.accent)),
            Span::raw(" campo  "),
            Span::styled("Invio", Style::default().fg(theme.accent)),
            Span::raw(" salva  "),
            Span::styled("Esc", Style::default().fg(theme.accent)),
            Span::raw(" annulla"),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_confirm(frame: &mut Frame<'_>, area: Rect, pending: &PendingDelete) {
    let theme = Theme::default();
    let rect = centered_rect(area, 48, 6);
    frame.render_widget(Clear, rect);

    let card = Card::new("Conferma eliminazione", &theme);
    let inner = card.inner(rect);
    card.render_frame(frame, rect);

    let lines = vec![
        Line::from(format!(
            "Eliminare il movimento {} del {}?",
            pending.id,
            pending.date.format("%d/%m/%Y")
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Invio/s", Style::default().fg(theme.accent)),
            Span::raw(" conferma  "),
            Span::styled("Esc/n", Style::default().fg(theme.accent)),
            Span::raw(" annulla"),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height.min(area.height)),
            Constraint::Min(0),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width.min(area.width)),
            Constraint::Min(0),
        ])
        .split(vertical[1]);
    horizontal[1]
}
