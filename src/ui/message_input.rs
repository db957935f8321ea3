//! Message composer rendering: text field, attachment preview, image path prompt.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::domain::{message_input_state::MessageInputState, shell_state::ActivePane};

use super::styles::Palette;

/// Placeholder text shown when the input is empty.
const PLACEHOLDER_TEXT: &str = "Ask Gemini... (i to type, Ctrl+A to attach an image)";

const PROMPT_SYMBOL: &str = "> ";

const ATTACH_TITLE: &str = "Image path (Enter to attach, Esc to cancel)";

/// Rows the composer needs, borders included.
pub fn input_height(input_state: &MessageInputState) -> u16 {
    if input_state.attachment().is_some() {
        4
    } else {
        3
    }
}

/// Renders the message input field, or the image path prompt while it is open.
pub fn render_message_input(
    frame: &mut Frame<'_>,
    area: Rect,
    input_state: &MessageInputState,
    attach_path: &str,
    active_pane: ActivePane,
    palette: &Palette,
) {
    if active_pane == ActivePane::AttachPath {
        render_prompt(frame, area, ATTACH_TITLE, attach_path, palette);
        return;
    }

    let is_focused = active_pane == ActivePane::MessageInput;
    let mut lines = Vec::new();
    if let Some(attachment) = input_state.attachment() {
        lines.push(Line::from(vec![
            Span::styled(format!("[Image: {}]", attachment.file_name), palette.media_style()),
            Span::styled(" Ctrl+R to remove", palette.muted_style()),
        ]));
    }
    lines.push(build_input_line(input_state, palette));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(palette.panel_border_style(is_focused)),
    );
    frame.render_widget(paragraph, area);

    if is_focused {
        let before_cursor: String = input_state
            .text()
            .chars()
            .take(input_state.cursor_position())
            .collect();
        let text_row = if input_state.attachment().is_some() { 2 } else { 1 };
        set_cursor(frame, area, text_row, UnicodeWidthStr::width(before_cursor.as_str()));
    }
}

fn render_prompt(frame: &mut Frame<'_>, area: Rect, title: &str, value: &str, palette: &Palette) {
    let line = Line::from(vec![
        Span::styled(PROMPT_SYMBOL, palette.input_prompt_style()),
        Span::styled(value.to_owned(), palette.message_text_style()),
    ]);
    let paragraph = Paragraph::new(line).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(palette.panel_border_style(true)),
    );
    frame.render_widget(paragraph, area);
    set_cursor(frame, area, 1, UnicodeWidthStr::width(value));
}

fn set_cursor(frame: &mut Frame<'_>, area: Rect, row: u16, column: usize) {
    let cursor_x = area
        .x
        .saturating_add(1)
        .saturating_add(PROMPT_SYMBOL.len() as u16)
        .saturating_add(column.min(u16::MAX as usize) as u16);
    let cursor_y = area.y.saturating_add(row);
    frame.set_cursor_position((cursor_x, cursor_y));
}

fn build_input_line(input_state: &MessageInputState, palette: &Palette) -> Line<'static> {
    let prompt = Span::styled(PROMPT_SYMBOL.to_owned(), palette.input_prompt_style());

    if input_state.is_empty() {
        Line::from(vec![
            prompt,
            Span::styled(PLACEHOLDER_TEXT.to_owned(), palette.input_placeholder_style()),
        ])
    } else {
        Line::from(vec![
            prompt,
            Span::styled(input_state.text().to_owned(), palette.message_text_style()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{message_input_state::Attachment, theme::Theme},
        ui::styles::palette,
    };

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn shows_placeholder_when_empty() {
        let state = MessageInputState::default();

        let text = text_of(&build_input_line(&state, &palette(Theme::Dark)));

        assert!(text.contains(PLACEHOLDER_TEXT));
        assert!(text.starts_with(PROMPT_SYMBOL));
    }

    #[test]
    fn shows_text_when_has_content() {
        let mut state = MessageInputState::default();
        state.insert_char('H');
        state.insert_char('i');

        let text = text_of(&build_input_line(&state, &palette(Theme::Dark)));

        assert!(text.contains("Hi"));
        assert!(!text.contains(PLACEHOLDER_TEXT));
    }

    #[test]
    fn attachment_adds_a_preview_row() {
        let mut state = MessageInputState::default();
        assert_eq!(input_height(&state), 3);

        state.attach(Attachment {
            file_name: "cat.png".to_owned(),
            data_uri: "data:image/png;base64,AAAA".to_owned(),
        });

        assert_eq!(input_height(&state), 4);
    }
}
