pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, Section};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let theme = Theme::default();
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Length(2), // Tab bar
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    components::tabs::render_tabs(frame, layout[1], state.section, &theme);

    match state.section {
        Section::Daily => screens::daily::render(frame, layout[2], state),
        Section::Stats => screens::stats::render(frame, layout[2], state),
        Section::Chart => screens::chart::render(frame, layout[2], state),
        Section::Monthly => screens::monthly::render(frame, layout[2], state),
        Section::Search => screens::search::render(frame, layout[2], state),
        Section::Keywords => screens::keywords::render(frame, layout[2], state),
    }

    render_bottom_bar(frame, layout[3], state, &theme);
    components::modal::render(frame, area, &state.overlay);
    components::toast::render(frame, area, state.toast.as_ref());
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(
            "Salvadanaio",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Foglio", Style::default().fg(theme.dim)),
        Span::raw(format!(": {}", state.sheet_id)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut parts = components::tabs::tab_shortcuts(theme);

    let context = context_hints(state, theme);
    if !context.is_empty() {
        parts.push(Span::styled("  │  ", Style::default().fg(theme.border)));
        parts.extend(context);
    }

    parts.push(Span::styled("  │  ", Style::default().fg(theme.border)));
    parts.push(Span::styled("q", Style::default().fg(theme.accent)));
    parts.push(Span::raw(" esci"));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

fn context_hints(state: &AppState, theme: &Theme) -> Vec<Span<'static>> {
    let accent = Style::default().fg(theme.accent);
    match state.section {
        Section::Daily | Section::Monthly => vec![
            Span::styled("/", accent),
            Span::raw(if state.section == Section::Daily {
                " data  "
            } else {
                " mese  "
            }),
            Span::styled("Invio", accent),
            Span::raw(" carica  "),
            Span::styled("n", accent),
            Span::raw(" nuovo  "),
            Span::styled("e", accent),
            Span::raw(" modifica  "),
            Span::styled("x", accent),
            Span::raw(" elimina  "),
            Span::styled("r", accent),
            Span::raw(" aggiorna"),
        ],
        Section::Stats | Section::Chart => vec![
            Span::styled("/", accent),
            Span::raw(" intervallo  "),
            Span::styled("Invio", accent),
            Span::raw(" carica"),
        ],
        Section::Search => vec![
            Span::styled("/", accent),
            Span::raw(" filtri  "),
            Span::styled("Invio", accent),
            Span::raw(" cerca  "),
            Span::styled("←/→", accent),
            Span::raw(" pagina  "),
            Span::styled("e", accent),
            Span::raw(" modifica  "),
            Span::styled("x", accent),
            Span::raw(" elimina"),
        ],
        Section::Keywords => vec![
            Span::styled("/", accent),
            Span::raw(" modulo  "),
            Span::styled("Invio", accent),
            Span::raw(" carica  "),
            Span::styled("x", accent),
            Span::raw(" elimina  "),
            Span::styled("r", accent),
            Span::raw(" aggiorna"),
        ],
    }
}
