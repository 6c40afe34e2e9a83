//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Priority;

/// Accent for headers, the active tab and focused fields
pub const INDIGO: Color = Color::Rgb(79, 70, 229);
/// Completed missions and a full gauge
pub const EMERALD: Color = Color::Rgb(16, 185, 129);
/// Postponed missions
pub const ORANGE: Color = Color::Rgb(234, 88, 12);
/// Destructive confirmations
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Focused form field border
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Secondary text
pub const SLATE: Color = Color::Rgb(100, 116, 139);

pub fn priority_color(p: Priority) -> Color {
    match p {
        Priority::Urgent => Color::Rgb(220, 38, 38),
        Priority::Haute => ORANGE,
        Priority::Moyenne => Color::Rgb(37, 99, 235),
        Priority::Basse => SLATE,
    }
}
