use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    widgets::BarChart,
};

use crate::ui::{components::card::Card, theme::Theme};

/// Labeled bar chart wrapper with consistent styling.
pub fn render_bar_chart(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    data: &[(&str, u64)],
    color: ratatui::style::Color,
    theme: &Theme,
) {
    let chart = BarChart::default()
        .data(data)
        .bar_width(5)
        .bar_gap(1)
        .bar_style(Style::default().fg(color))
        .value_style(Style::default().fg(theme.text).add_modifier(Modifier::BOLD))
        .label_style(Style::default().fg(theme.dim));

    let card = Card::new(title, theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);
    frame.render_widget(chart, inner);
}

/// Simple ASCII bar for inline category breakdowns, like
/// `████████░░░░░░░░░░░░` for the given ratio.
pub fn ascii_bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return "░".repeat(width);
    }
    let filled = ((value as f64 / max as f64) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_bar_scales_to_width() {
        assert_eq!(ascii_bar(0, 100, 4), "░░░░");
        assert_eq!(ascii_bar(100, 100, 4), "████");
        assert_eq!(ascii_bar(50, 100, 4), "██░░");
        assert_eq!(ascii_bar(5, 0, 4), "░░░░");
    }
}
