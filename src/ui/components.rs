/// Small rendering helpers shared by the dashboard panels
use ratatui::{
    style::{Color, Style},
    text::Span,
};

/// Create a percentage change span with + or - prefix, colored by sign
pub fn styled_percentage_change(value: f64) -> Span<'static> {
    let formatted = if value >= 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    };

    if value >= 0.0 {
        Span::styled(formatted, Style::default().fg(Color::Green))
    } else {
        Span::styled(formatted, Style::default().fg(Color::Red))
    }
}

/// Format a price with two decimals
pub fn format_price(value: f64) -> String {
    format!("{:.2}", value)
}

/// Multi-select entry label
pub fn checkbox_label(selected: bool, label: &str) -> String {
    if selected {
        format!("[x] {}", label)
    } else {
        format!("[ ] {}", label)
    }
}

/// Single-select entry label
pub fn radio_label(selected: bool, label: &str) -> String {
    if selected {
        format!("(*) {}", label)
    } else {
        format!("( ) {}", label)
    }
}
