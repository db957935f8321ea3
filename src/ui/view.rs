use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::domain::{
    chat::Chat,
    shell_state::{ActivePane, ShellState},
};

use super::message_input::{input_height, render_message_input};
use super::message_rendering::{build_message_list_elements, render_elements, RenderedMessages};
use super::styles::{self, Palette};

const SIDEBAR_WIDTH: u16 = 32;
const APP_TITLE: &str = "Gemini";
const WELCOME_TEXT: &str = "Hello! How can I help you today?";
const WELCOME_HINT: &str = "Type a message below, or press Ctrl+A to attach an image.";
const SEARCH_PLACEHOLDER: &str = "Search chats...";
const NO_CHATS_TEXT: &str = "No chats found.";
const LOADING_OLDER_TEXT: &str = "Loading older messages...";
const TYPING_TEXT: &str = "Gemini is typing...";
const ACTIVE_MARKER: &str = "● ";
const INACTIVE_MARKER: &str = "  ";

pub fn render(frame: &mut Frame<'_>, state: &mut ShellState) {
    let palette = styles::palette(state.store().theme);
    frame.render_widget(Block::default().style(palette.base_style()), frame.area());

    let [content_area, status_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .areas(frame.area());

    let chat_area = if sidebar_visible(state) {
        let [sidebar_area, chat_area] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(1)])
            .areas(content_area);
        render_sidebar(frame, sidebar_area, state, &palette);
        chat_area
    } else {
        content_area
    };

    let [messages_area, input_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(input_height(state.message_input())),
        ])
        .areas(chat_area);

    render_messages_panel(frame, messages_area, state, &palette);
    render_message_input(
        frame,
        input_area,
        state.message_input(),
        state.attach_path(),
        state.active_pane(),
        &palette,
    );
    render_notifications(frame, content_area, state, &palette);

    let status = Paragraph::new(status_line(state)).style(palette.muted_style());
    frame.render_widget(status, status_area);
}

/// The sidebar shows when toggled open or while it has focus.
fn sidebar_visible(state: &ShellState) -> bool {
    state.store().sidebar_open
        || matches!(
            state.active_pane(),
            ActivePane::ChatList | ActivePane::ChatSearch
        )
}

fn render_sidebar(frame: &mut Frame<'_>, area: Rect, state: &ShellState, palette: &Palette) {
    let [search_area, list_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .areas(area);

    render_search_box(frame, search_area, state, palette);

    let chat_list = state.chat_list();
    let store = state.store();
    let visible: Vec<&Chat> = store.filtered_chats(chat_list.applied_filter()).collect();
    let is_focused = state.active_pane() == ActivePane::ChatList;

    let mut block = Block::default()
        .title(format!("Chats ({})", visible.len()))
        .borders(Borders::ALL)
        .border_style(palette.panel_border_style(is_focused));

    if let Some(chat) = chat_list
        .pending_delete()
        .and_then(|chat_id| store.chat(chat_id))
    {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" Delete \"{}\"? y/n ", chat.display_title()),
            palette.warning_style(),
        )));
    }

    if visible.is_empty() {
        let message = Paragraph::new(NO_CHATS_TEXT)
            .style(palette.muted_style())
            .block(block);
        frame.render_widget(message, list_area);
        return;
    }

    let inner_width = list_area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem<'static>> = visible
        .iter()
        .map(|chat| {
            let is_active = store.active_chat_id.as_ref() == Some(&chat.id);
            ListItem::new(chat_list_item_line(chat, is_active, inner_width, palette))
        })
        .collect();

    let ids: Vec<_> = visible.iter().map(|chat| chat.id.clone()).collect();
    let mut list_state = ListState::default();
    list_state.select(chat_list.selected_index(&ids));

    let list = List::new(items)
        .block(block)
        .highlight_style(palette.highlight_style());
    frame.render_stateful_widget(list, list_area, &mut list_state);
}

fn render_search_box(frame: &mut Frame<'_>, area: Rect, state: &ShellState, palette: &Palette) {
    let is_focused = state.active_pane() == ActivePane::ChatSearch;
    let query = state.chat_list().search_input();

    let line = if query.is_empty() && !is_focused {
        Line::from(Span::styled(SEARCH_PLACEHOLDER, palette.input_placeholder_style()))
    } else {
        Line::from(Span::styled(query.to_owned(), palette.message_text_style()))
    };

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .title("/ Search")
            .borders(Borders::ALL)
            .border_style(palette.panel_border_style(is_focused)),
    );
    frame.render_widget(paragraph, area);

    if is_focused {
        let cursor_x = area
            .x
            .saturating_add(1)
            .saturating_add(UnicodeWidthStr::width(query).min(u16::MAX as usize) as u16);
        frame.set_cursor_position((cursor_x, area.y.saturating_add(1)));
    }
}

fn chat_list_item_line(chat: &Chat, is_active: bool, width: usize, palette: &Palette) -> Line<'static> {
    let marker = if is_active {
        ACTIVE_MARKER
    } else {
        INACTIVE_MARKER
    };
    let title_width = width.saturating_sub(UnicodeWidthStr::width(marker));

    Line::from(vec![
        Span::styled(marker, palette.selection_marker_style()),
        Span::styled(
            truncate_to_width(&chat.display_title(), title_width),
            palette.chat_title_style(is_active),
        ),
    ])
}

/// Cuts `text` to `width` columns, ending in `...` when shortened.
fn truncate_to_width(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        return text.to_owned();
    }

    let budget = width.saturating_sub(3);
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width > budget {
            break;
        }
        used += ch_width;
        out.push(ch);
    }
    out.push_str("...");
    out
}

fn render_messages_panel(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &mut ShellState,
    palette: &Palette,
) {
    let is_focused = state.active_pane() == ActivePane::Messages;
    let block = Block::default()
        .title(messages_title(state))
        .borders(Borders::ALL)
        .border_style(palette.panel_border_style(is_focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let is_fetching = state.open_chat().is_fetching_older();
    let is_composing = state
        .store()
        .active_chat_id
        .as_ref()
        .is_some_and(|chat_id| state.store().is_composing_in(chat_id));

    let [loading_area, body_area, typing_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(u16::from(is_fetching)),
            Constraint::Min(1),
            Constraint::Length(u16::from(is_composing)),
        ])
        .areas(inner);

    if is_fetching {
        let loading = Paragraph::new(LOADING_OLDER_TEXT)
            .style(palette.muted_style())
            .alignment(Alignment::Center);
        frame.render_widget(loading, loading_area);
    }
    if is_composing {
        let typing = Paragraph::new(Line::from(Span::styled(
            format!("  {TYPING_TEXT}"),
            palette.typing_style(),
        )));
        frame.render_widget(typing, typing_area);
    }

    let Some(rendered) = visible_messages(state, body_area.width as usize, palette) else {
        render_welcome(frame, body_area, palette);
        return;
    };

    let open_chat = state.open_chat_mut();
    open_chat.sync_layout(
        rendered.lines.len(),
        body_area.height as usize,
        rendered.selected_rows,
    );
    let offset = open_chat.scroll_offset().min(u16::MAX as usize) as u16;

    frame.render_widget(Paragraph::new(rendered.lines).scroll((offset, 0)), body_area);
}

/// Rows for the current page of the open chat, or `None` when there is nothing to show.
fn visible_messages(state: &ShellState, width: usize, palette: &Palette) -> Option<RenderedMessages> {
    let chat = state.store().active_chat()?;
    if chat.messages.is_empty() {
        return None;
    }

    let open_chat = state.open_chat();
    let window = open_chat.window(chat.messages.len());
    let elements =
        build_message_list_elements(&chat.messages[window.start..window.end], window.start);
    let selected = open_chat
        .selected_index()
        .filter(|_| state.active_pane() == ActivePane::Messages);

    Some(render_elements(&elements, width, selected, palette))
}

fn render_welcome(frame: &mut Frame<'_>, area: Rect, palette: &Palette) {
    let top_padding = area.height.saturating_sub(2) / 2;
    let mut lines = vec![Line::default(); top_padding as usize];
    lines.push(Line::from(Span::styled(WELCOME_TEXT, palette.sender_style(false))));
    lines.push(Line::from(Span::styled(WELCOME_HINT, palette.muted_style())));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn messages_title(state: &ShellState) -> String {
    match state.store().active_chat() {
        Some(chat) => format!("{APP_TITLE} | {}", chat.display_title()),
        None => APP_TITLE.to_owned(),
    }
}

fn render_notifications(frame: &mut Frame<'_>, area: Rect, state: &ShellState, palette: &Palette) {
    let notifications = state.notifications();
    if notifications.is_empty() {
        return;
    }

    let lines: Vec<Line<'static>> = notifications
        .iter()
        .map(|item| {
            Line::from(Span::styled(
                item.text.clone(),
                palette.notification_style(item.level),
            ))
        })
        .collect();

    let content_width = lines.iter().map(Line::width).max().unwrap_or(0) as u16;
    let width = content_width.saturating_add(4).min(area.width);
    let height = (lines.len() as u16).saturating_add(2).min(area.height);
    let rect = Rect {
        x: area.right().saturating_sub(width.saturating_add(1)).max(area.x),
        y: area.y.saturating_add(1).min(area.bottom().saturating_sub(height)),
        width,
        height,
    };

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.panel_border_style(false)),
        ),
        rect,
    );
}

fn status_line(state: &ShellState) -> String {
    let store = state.store();
    let user = store.auth.user_name().unwrap_or("guest");
    let nav_hint = match state.active_pane() {
        ActivePane::ChatList => {
            "j/k: navigate | Enter: open | n: new | d: delete | /: search | t: theme | L: logout | q: quit"
        }
        ActivePane::ChatSearch => "type to filter | Enter: done | Esc: clear",
        ActivePane::Messages => {
            "j/k: select | PgUp/PgDn: scroll | y: copy | i: compose | b: sidebar | Esc: chats"
        }
        ActivePane::MessageInput => {
            "Enter: send | Ctrl+A: attach image | Ctrl+R: remove image | Esc: messages | Ctrl+C: quit"
        }
        ActivePane::AttachPath => "Enter: attach | Esc: cancel",
    };
    format!("{user} | theme: {} | {nav_hint}", store.theme)
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::domain::{
        auth::{AuthState, UserProfile},
        chat::ChatId,
        message::Message,
        open_chat_state::OpenChatState,
        store::{AppStore, PersistedStore},
        theme::Theme,
    };

    fn chat(id: &str, texts: &[&str]) -> Chat {
        let mut chat = Chat::new(ChatId::new(id), format!("Chat {id}"), 0);
        for (n, text) in texts.iter().enumerate() {
            let timestamp = 1_771_059_600_000 + n as i64 * 1_000;
            let message = if n % 2 == 0 {
                Message::user(*text, None, timestamp)
            } else {
                Message::ai(*text, timestamp)
            };
            chat.messages.push(message);
        }
        chat
    }

    fn shell_with(chats: Vec<Chat>) -> ShellState {
        let active = chats.first().map(|chat| chat.id.clone());
        let store = AppStore::hydrate(
            Some(PersistedStore {
                auth: AuthState::logged_in(UserProfile {
                    phone: "+15551234567".to_owned(),
                    name: "User".to_owned(),
                }),
                chats,
                active_chat_id: active.clone(),
            }),
            Theme::Dark,
            0,
        );
        let total = store.state().active_chat().map_or(0, |chat| chat.messages.len());

        let mut open_chat = OpenChatState::default();
        open_chat.activate(active);
        open_chat.observe_message_count(total);
        ShellState::new(store.snapshot(), open_chat)
    }

    fn draw(state: &mut ShellState) -> String {
        let mut terminal =
            Terminal::new(TestBackend::new(100, 30)).expect("test terminal should be created");
        terminal
            .draw(|frame| render(frame, state))
            .expect("frame should render");

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                if let Some(cell) = buffer.cell((x, y)) {
                    text.push_str(cell.symbol());
                }
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn empty_chat_shows_welcome() {
        let mut state = shell_with(vec![chat("a", &[])]);
        state.set_active_pane(ActivePane::MessageInput);

        let screen = draw(&mut state);

        assert!(screen.contains(WELCOME_TEXT));
    }

    #[test]
    fn renders_messages_with_sender_labels() {
        let mut state = shell_with(vec![chat("a", &["What is Rust?", "A language."])]);
        state.set_active_pane(ActivePane::Messages);

        let screen = draw(&mut state);

        assert!(screen.contains("What is Rust?"));
        assert!(screen.contains("Gemini"));
        assert!(screen.contains("You"));
    }

    #[test]
    fn sidebar_lists_chats_when_focused() {
        let mut state = shell_with(vec![chat("a", &["first question"]), chat("b", &[])]);
        state.set_active_pane(ActivePane::ChatList);

        let screen = draw(&mut state);

        assert!(screen.contains("Chats (2)"));
        assert!(screen.contains("first question"));
        assert!(screen.contains("Chat b"));
    }

    #[test]
    fn sidebar_is_hidden_while_composing() {
        let mut state = shell_with(vec![chat("a", &[]), chat("b", &[])]);
        state.set_active_pane(ActivePane::MessageInput);

        let screen = draw(&mut state);

        assert!(!screen.contains("Chats (2)"));
    }

    #[test]
    fn render_keeps_the_latest_message_in_view() {
        let texts: Vec<String> = (0..40).map(|n| format!("message number {n}")).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let mut state = shell_with(vec![chat("a", &refs)]);
        state.set_active_pane(ActivePane::Messages);

        let screen = draw(&mut state);

        assert!(screen.contains("message number 39"));
        assert!(!screen.contains("message number 20 "));
        assert!(state.open_chat().scroll_offset() > 0);
    }

    #[test]
    fn toasts_are_drawn_on_top() {
        let mut state = shell_with(vec![chat("a", &[])]);
        state
            .notifications_mut()
            .success("Copied to clipboard!", std::time::Instant::now());

        let screen = draw(&mut state);

        assert!(screen.contains("Copied to clipboard!"));
    }

    #[test]
    fn delete_confirmation_names_the_chat() {
        let mut state = shell_with(vec![chat("a", &[]), chat("b", &[])]);
        state.set_active_pane(ActivePane::ChatList);
        state.chat_list_mut().request_delete(ChatId::new("b"));

        let screen = draw(&mut state);

        assert!(screen.contains("Delete \"Chat b\"? y/n"));
    }

    #[test]
    fn status_line_shows_user_and_theme() {
        let state = shell_with(vec![chat("a", &[])]);

        let line = status_line(&state);

        assert!(line.starts_with("User | theme: dark"));
    }

    #[test]
    fn truncate_to_width_adds_ellipsis() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("a long chat title", 10), "a long ...");
    }

    #[test]
    fn sidebar_follows_the_toggle() {
        let mut state = shell_with(vec![chat("a", &[])]);
        state.set_active_pane(ActivePane::Messages);
        assert!(!sidebar_visible(&state));

        let mut store = AppStore::hydrate(None, Theme::Dark, 0);
        store.toggle_sidebar();
        state.set_store(store.snapshot());

        assert!(sidebar_visible(&state));
    }
}
