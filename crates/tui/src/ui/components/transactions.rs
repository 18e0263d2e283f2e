use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use api_types::transaction::{Transaction, TransactionKind};

use crate::{
    summary::Totals,
    ui::{
        components::{card::StatCard, money},
        theme::Theme,
    },
};

pub fn kind_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "Entrata",
        TransactionKind::Expense => "Uscita",
    }
}

/// The Entrate / Uscite / Saldo row shown above a transaction list.
pub fn render_summary_row(frame: &mut Frame<'_>, area: Rect, totals: &Totals, theme: &Theme) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    StatCard::new(
        "Entrate",
        Span::styled(
            money::format_signed(totals.income),
            Style::default().fg(theme.positive),
        ),
        theme,
    )
    .render(frame, layout[0]);
    StatCard::new(
        "Uscite",
        Span::styled(
            money::format_signed(totals.expense),
            Style::default().fg(theme.negative),
        ),
        theme,
    )
    .render(frame, layout[1]);
    StatCard::new("Saldo", money::styled_balance(totals.balance(), theme), theme)
        .render(frame, layout[2]);
}

/// One page of transactions. `offset` is the index of the first visible row
/// in the full result set, used for the running row number.
pub fn render_list(
    frame: &mut Frame<'_>,
    area: Rect,
    rows: &[Transaction],
    selected: usize,
    offset: usize,
    theme: &Theme,
) {
    let items = rows
        .iter()
        .enumerate()
        .map(|(i, tx)| {
            let number = offset + i + 1;
            let amount_color = match tx.kind {
                TransactionKind::Income => theme.positive,
                TransactionKind::Expense => theme.negative,
            };
            let note = tx
                .note
                .as_deref()
                .filter(|note| !note.is_empty())
                .map(|note| format!(" ({note})"))
                .unwrap_or_default();

            let line = Line::from(vec![
                Span::styled(format!("{number:>3}. "), Style::default().fg(theme.dim)),
                Span::raw(tx.date.format("%d/%m/%Y").to_string()),
                Span::raw("  "),
                Span::styled(
                    format!("{:>12}", money::format_amount(tx.amount)),
                    Style::default().fg(amount_color),
                ),
                Span::raw("  "),
                Span::raw(format!("{:<8}", kind_label(tx.kind))),
                Span::styled(format!("#{} ", tx.category), Style::default().fg(theme.accent)),
                Span::raw(format!("{}{note}", tx.content)),
                Span::styled(format!("  [{}]", tx.id), Style::default().fg(theme.dim)),
            ]);
            ListItem::new(line)
        })
        .collect::<Vec<_>>();

    let mut list_state = ListState::default();
    if !items.is_empty() {
        list_state.select(Some(selected.min(items.len() - 1)));
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");

    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Pagination line. Hidden entirely when there is nothing to page over:
/// with zero rows the controls are disabled, not merely clamped.
pub fn render_page_footer(
    frame: &mut Frame<'_>,
    area: Rect,
    page: usize,
    total_pages: usize,
    item_count: usize,
    theme: &Theme,
) {
    if item_count == 0 {
        return;
    }
    let line = Line::from(vec![
        Span::raw(format!("Pagina {page} / {total_pages}   ")),
        Span::styled("←", Style::default().fg(theme.accent)),
        Span::raw("/"),
        Span::styled("→", Style::default().fg(theme.accent)),
        Span::raw(" cambia pagina"),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
