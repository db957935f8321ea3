//! Message list rendering logic.
//!
//! Turns the visible page of a chat into wrapped, styled rows:
//! - a header row per message (sender + time), then the wrapped text
//! - date separators between messages from different days
//! - image labels highlighted inside the text
//!
//! Row counts are exact so the open-chat state can anchor its scroll offset.

use chrono::{Local, TimeZone};
use ratatui::{
    layout::Alignment,
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::domain::message::Message;

use super::styles::Palette;

const USER_LABEL: &str = "You";
const AI_LABEL: &str = "Gemini";
const GUTTER_WIDTH: usize = 2;
const SELECTED_GUTTER: &str = "▌ ";
const PLAIN_GUTTER: &str = "  ";

/// Represents a visual element in the messages list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageListElement {
    /// Date separator line (e.g., "14 Feb 2026").
    DateSeparator(String),
    Message {
        /// Absolute index into the chat's messages.
        index: usize,
        time: String,
        is_user: bool,
        content: String,
    },
}

/// Rows ready for a `Paragraph`, plus where the selected message sits.
#[derive(Debug, Clone, Default)]
pub struct RenderedMessages {
    pub lines: Vec<Line<'static>>,
    /// First and last row of the selected message.
    pub selected_rows: Option<(usize, usize)>,
}

/// Builds elements for `messages`, which start at absolute index `first_index`.
pub fn build_message_list_elements(
    messages: &[Message],
    first_index: usize,
) -> Vec<MessageListElement> {
    let mut elements = Vec::new();
    let mut prev_date: Option<chrono::NaiveDate> = None;

    for (offset, message) in messages.iter().enumerate() {
        let msg_date = timestamp_to_date(message.timestamp_ms);
        if prev_date != Some(msg_date) {
            elements.push(MessageListElement::DateSeparator(format_date(msg_date)));
        }

        elements.push(MessageListElement::Message {
            index: first_index + offset,
            time: format_time(message.timestamp_ms),
            is_user: message.is_user(),
            content: message.display_content(),
        });
        prev_date = Some(msg_date);
    }

    elements
}

/// Lays out elements for a pane `width` columns wide.
pub fn render_elements(
    elements: &[MessageListElement],
    width: usize,
    selected: Option<usize>,
    palette: &Palette,
) -> RenderedMessages {
    let mut rendered = RenderedMessages::default();
    let text_width = width.saturating_sub(GUTTER_WIDTH).max(1);

    for element in elements {
        match element {
            MessageListElement::DateSeparator(date) => {
                rendered.lines.push(date_separator_line(date, palette));
            }
            MessageListElement::Message {
                index,
                time,
                is_user,
                content,
            } => {
                let is_selected = selected == Some(*index);
                let top = rendered.lines.len();
                let gutter = if is_selected {
                    Span::styled(SELECTED_GUTTER, palette.selection_marker_style())
                } else {
                    Span::raw(PLAIN_GUTTER)
                };

                rendered.lines.push(Line::from(vec![
                    gutter.clone(),
                    Span::styled(sender_label(*is_user), palette.sender_style(*is_user)),
                    Span::raw(" "),
                    Span::styled(time.clone(), palette.muted_style()),
                ]));

                for row in wrap_text(content, text_width) {
                    let mut spans = vec![gutter.clone()];
                    spans.extend(build_content_line_spans(&row, palette));
                    rendered.lines.push(Line::from(spans));
                }

                if is_selected {
                    rendered.selected_rows = Some((top, rendered.lines.len() - 1));
                }
                rendered.lines.push(Line::default());
            }
        }
    }

    rendered
}

/// Greedy word wrap by display width; words wider than a row are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = UnicodeWidthStr::width(word);

            let needs_break = current_width > 0
                && (word_width > width || current_width + 1 + word_width > width);
            if needs_break {
                rows.push(std::mem::take(&mut current));
                current_width = 0;
            }

            if word_width > width {
                for ch in word.chars() {
                    let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
                    if current_width > 0 && current_width + ch_width > width {
                        rows.push(std::mem::take(&mut current));
                        current_width = 0;
                    }
                    current.push(ch);
                    current_width += ch_width;
                }
                continue;
            }

            if current_width > 0 {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
        }

        rows.push(current);
    }

    rows
}

fn sender_label(is_user: bool) -> &'static str {
    if is_user {
        USER_LABEL
    } else {
        AI_LABEL
    }
}

fn date_separator_line(date: &str, palette: &Palette) -> Line<'static> {
    Line::from(vec![Span::styled(
        format!("─── {date} ───"),
        palette.muted_style(),
    )])
    .alignment(Alignment::Center)
}

/// Highlights a leading `[Image ...]` label.
fn build_content_line_spans(text: &str, palette: &Palette) -> Vec<Span<'static>> {
    if text.starts_with("[Image") {
        if let Some(end_bracket) = text.find(']') {
            let label = &text[..=end_bracket];
            let rest = &text[end_bracket + 1..];
            return vec![
                Span::styled(label.to_owned(), palette.media_style()),
                Span::styled(rest.to_owned(), palette.message_text_style()),
            ];
        }
    }

    vec![Span::styled(text.to_owned(), palette.message_text_style())]
}

fn timestamp_to_date(timestamp_ms: i64) -> chrono::NaiveDate {
    match Local.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(dt) => dt.date_naive(),
        chrono::LocalResult::Ambiguous(dt, _) => dt.date_naive(),
        chrono::LocalResult::None => Local::now().date_naive(),
    }
}

fn format_date(date: chrono::NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

fn format_time(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(dt) => dt.format("%H:%M").to_string(),
        chrono::LocalResult::Ambiguous(dt, _) => dt.format("%H:%M").to_string(),
        chrono::LocalResult::None => "??:??".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::theme::Theme, ui::styles::palette};

    // UTC instants; the local timezone may shift the hour but not the day split
    // between these two, which are 27 hours apart.
    const FEB_14_2026_10AM: i64 = 1771059600000;
    const FEB_15_2026_1PM: i64 = 1771156800000;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn builds_date_separator_for_first_message() {
        let messages = vec![Message::user("Hello", None, FEB_14_2026_10AM)];

        let elements = build_message_list_elements(&messages, 0);

        assert_eq!(elements.len(), 2);
        assert!(matches!(&elements[0], MessageListElement::DateSeparator(_)));
    }

    #[test]
    fn inserts_date_separator_on_date_change() {
        let messages = vec![
            Message::user("Day 1", None, FEB_14_2026_10AM),
            Message::ai("Day 2", FEB_15_2026_1PM),
        ];

        let elements = build_message_list_elements(&messages, 0);

        assert_eq!(elements.len(), 4);
        assert!(matches!(&elements[2], MessageListElement::DateSeparator(_)));
    }

    #[test]
    fn message_elements_carry_absolute_indexes() {
        let messages = vec![
            Message::user("a", None, FEB_14_2026_10AM),
            Message::ai("b", FEB_14_2026_10AM + 1_000),
        ];

        let elements = build_message_list_elements(&messages, 25);

        assert!(matches!(
            &elements[2],
            MessageListElement::Message { index: 26, is_user: false, .. }
        ));
    }

    #[test]
    fn labels_senders_as_you_and_gemini() {
        let messages = vec![
            Message::user("q", None, FEB_14_2026_10AM),
            Message::ai("a", FEB_14_2026_10AM + 1_000),
        ];
        let elements = build_message_list_elements(&messages, 0);

        let rendered = render_elements(&elements, 40, None, &palette(Theme::Dark));

        let texts: Vec<String> = rendered.lines.iter().map(line_text).collect();
        assert!(texts.iter().any(|text| text.trim_start().starts_with("You ")));
        assert!(texts.iter().any(|text| text.trim_start().starts_with("Gemini ")));
    }

    #[test]
    fn selected_rows_cover_header_and_wrapped_text() {
        let messages = vec![
            Message::user("short", None, FEB_14_2026_10AM),
            Message::ai("one two three four", FEB_14_2026_10AM + 1_000),
        ];
        let elements = build_message_list_elements(&messages, 0);

        let rendered = render_elements(&elements, 12, Some(1), &palette(Theme::Dark));

        // separator, header, text, blank, then the selected message
        assert_eq!(rendered.selected_rows, Some((4, 6)));
        assert!(line_text(&rendered.lines[4]).starts_with(SELECTED_GUTTER));
        assert_eq!(rendered.lines.len(), 8);
    }

    #[test]
    fn image_label_is_styled_as_media() {
        let palette = palette(Theme::Dark);

        let spans = build_content_line_spans("[Image 3 B] look", &palette);

        assert_eq!(spans[0].content, "[Image 3 B]");
        assert_eq!(spans[0].style, palette.media_style());
        assert_eq!(spans[1].content, " look");
    }

    #[test]
    fn wrap_text_breaks_on_words() {
        assert_eq!(wrap_text("one two three", 7), ["one two", "three"]);
    }

    #[test]
    fn wrap_text_splits_long_words_and_keeps_blank_lines() {
        assert_eq!(wrap_text("abcdefgh", 3), ["abc", "def", "gh"]);
        assert_eq!(wrap_text("a\n\nb", 10), ["a", "", "b"]);
    }

    #[test]
    fn wrap_text_counts_wide_characters() {
        assert_eq!(wrap_text("日本語", 4), ["日本", "語"]);
    }

    #[test]
    fn format_date_produces_day_month_year() {
        let date = chrono::NaiveDate::from_ymd_opt(2026, 2, 14).expect("valid date");

        assert_eq!(format_date(date), "14 Feb 2026");
    }

    #[test]
    fn format_time_produces_hh_mm() {
        let time = format_time(FEB_14_2026_10AM);

        assert_eq!(time.len(), 5);
        assert!(time.contains(':'));
    }
}
