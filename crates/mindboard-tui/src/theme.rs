//! Terminal colours for scene elements
//!
//! Scenes are drawn for a light page (white background, dark text). On a
//! dark terminal the neutral colours are swapped for grays and the
//! interaction classes map to the usual focus colours:
//! - Yellow: clicked respondent
//! - White: hover
//! - Cyan: selected category
//! - DarkGray: outside the working set

use mindboard_core::scene::{Color as SceneColor, Element};
use mindboard_core::widgets::palette;
use ratatui::style::{Color, Modifier, Style};

pub fn to_color(color: SceneColor) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// Colour an element is drawn with, classes first
pub fn element_color(element: &Element) -> Color {
    let classes = &element.classes;
    if classes.clicked {
        return to_color(palette::HIGHLIGHT);
    }
    if classes.highlighted {
        return Color::White;
    }
    if classes.inactive {
        return Color::DarkGray;
    }
    if classes.selected {
        return Color::Cyan;
    }
    match element.fill.or(element.stroke) {
        Some(color) if is_neutral(color) => Color::Gray,
        Some(color) => to_color(color),
        None => Color::Gray,
    }
}

/// Text style: emphasised when the element is part of the active filter or selection
pub fn text_style(element: &Element) -> Style {
    let style = Style::default().fg(element_color(element));
    let classes = &element.classes;
    if classes.active || classes.selected || classes.clicked {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

fn is_neutral(color: SceneColor) -> bool {
    color == palette::TEXT || color == palette::STROKE || color == palette::BACKGROUND
}
