//! Theme-aware style definitions for the UI components.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::{notification::NotificationLevel, theme::Theme};

/// Colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub user: Color,
    pub ai: Color,
    pub border: Color,
    pub success: Color,
    pub error: Color,
}

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            background: Color::Reset,
            text: Color::White,
            muted: Color::DarkGray,
            accent: Color::LightBlue,
            user: Color::LightCyan,
            ai: Color::LightMagenta,
            border: Color::Gray,
            success: Color::Green,
            error: Color::LightRed,
        },
        Theme::Light => Palette {
            background: Color::White,
            text: Color::Black,
            muted: Color::Gray,
            accent: Color::Blue,
            user: Color::Blue,
            ai: Color::Magenta,
            border: Color::DarkGray,
            success: Color::Green,
            error: Color::Red,
        },
    }
}

impl Palette {
    pub fn base_style(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn panel_border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.border)
        }
    }

    // =========================================================================
    // Sidebar
    // =========================================================================

    pub fn chat_title_style(&self, is_active: bool) -> Style {
        let style = Style::default().fg(self.text);
        if is_active {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    pub fn highlight_style(&self) -> Style {
        Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn warning_style(&self) -> Style {
        Style::default()
            .fg(self.error)
            .add_modifier(Modifier::BOLD)
    }

    // =========================================================================
    // Messages
    // =========================================================================

    pub fn sender_style(&self, is_user: bool) -> Style {
        let color = if is_user { self.user } else { self.ai };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn message_text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    /// Image labels like `[Image 3 KB]`.
    pub fn media_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn selection_marker_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn typing_style(&self) -> Style {
        Style::default()
            .fg(self.ai)
            .add_modifier(Modifier::ITALIC)
    }

    // =========================================================================
    // Input
    // =========================================================================

    pub fn input_prompt_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn input_placeholder_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn notification_style(&self, level: NotificationLevel) -> Style {
        let color = match level {
            NotificationLevel::Info => self.accent,
            NotificationLevel::Success => self.success,
            NotificationLevel::Error => self.error,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn themes_use_different_text_colors() {
        assert_ne!(palette(Theme::Dark).text, palette(Theme::Light).text);
    }

    #[test]
    fn focused_border_uses_accent() {
        let palette = palette(Theme::Dark);

        assert_eq!(palette.panel_border_style(true).fg, Some(palette.accent));
        assert_eq!(palette.panel_border_style(false).fg, Some(palette.border));
    }

    #[test]
    fn sender_styles_are_bold_and_distinct() {
        let palette = palette(Theme::Light);
        let user = palette.sender_style(true);
        let ai = palette.sender_style(false);

        assert!(user.add_modifier.contains(Modifier::BOLD));
        assert_ne!(user.fg, ai.fg);
    }

    #[test]
    fn error_notifications_use_error_color() {
        let palette = palette(Theme::Dark);

        assert_eq!(
            palette.notification_style(NotificationLevel::Error).fg,
            Some(palette.error)
        );
    }
}
