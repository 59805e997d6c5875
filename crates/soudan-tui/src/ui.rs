use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};
use soudan_core::{ChatMessage, ChatRole};
use crate::app::{App, PLACEHOLDER, SEND_HINT};

const ACCENT: Color = Color::Rgb(217, 119, 6);
const BORDER: Color = Color::Rgb(252, 211, 77);

/// Label above each turn.
fn role_label(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "あなた",
        ChatRole::Assistant => "村山",
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, chat_area, input_area, hint_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(4),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_hint(frame, hint_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(format!(" {} ", app.title), Style::default().fg(ACCENT).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(title), area);
}

/// Lines for one turn: user turns hug the right edge, assistant turns the left.
fn message_lines(msg: &ChatMessage) -> Vec<Line<'static>> {
    let (alignment, label_style, text_style) = match msg.role {
        ChatRole::User => (
            Alignment::Right,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            Style::default().fg(ACCENT),
        ),
        ChatRole::Assistant => (
            Alignment::Left,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            Style::default(),
        ),
    };

    let mut lines = vec![Line::from(Span::styled(role_label(msg.role), label_style)).alignment(alignment)];
    for line in msg.content.split('\n') {
        lines.push(Line::from(Span::styled(line.to_string(), text_style)).alignment(alignment));
    }
    lines.push(Line::default());
    lines
}

/// Three dots with one raised per tick.
fn loading_lines(frame_idx: u8) -> Vec<Line<'static>> {
    let dots: String = (0..3)
        .map(|i| if i == frame_idx { '●' } else { '・' })
        .collect();
    vec![
        Line::from(Span::styled(
            role_label(ChatRole::Assistant),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(dots, Style::default().fg(ACCENT))),
    ]
}

pub fn chat_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = app
        .session()
        .history()
        .iter()
        .flat_map(message_lines)
        .collect();

    if app.is_pending() {
        lines.extend(loading_lines(app.animation_frame));
    }
    lines
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);
    app.sync_follow();

    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(BORDER))
        .padding(Padding::horizontal(1));
    let inner = block.inner(area);

    // Row count comes from the same word wrapping the paragraph renders with
    let chat = Paragraph::new(Text::from(chat_lines(app))).wrap(Wrap { trim: false });
    app.set_chat_extent(clamp_u16(chat.line_count(inner.width)), inner.height);

    frame.render_widget(block, area);
    frame.render_widget(chat.scroll((app.chat_scroll, 0)), inner);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let [box_area, send_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(8),
    ])
    .areas(area);

    let pending = app.is_pending();
    let draft = app.session().draft();

    let border_color = if pending { Color::DarkGray } else { BORDER };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = input_block.inner(box_area);

    let (row, _) = draft.cursor_line_col();
    let col = Line::from(draft.text_before_cursor_on_line()).width();
    let row_offset = row.saturating_sub(usize::from(inner.height.saturating_sub(1)));
    let col_offset = col.saturating_sub(usize::from(inner.width.saturating_sub(1)));

    let input = if draft.text().is_empty() {
        Paragraph::new(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        let text_style = if pending {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        Paragraph::new(Text::from(
            draft
                .text()
                .split('\n')
                .map(|line| Line::from(line.to_string()))
                .collect::<Vec<_>>(),
        ))
        .style(text_style)
        .scroll((clamp_u16(row_offset), clamp_u16(col_offset)))
    };
    frame.render_widget(input.block(input_block), box_area);

    // Send affordance, dimmed while disabled
    let send_style = if app.session().can_submit() {
        Style::default().fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray).bg(Color::DarkGray)
    };
    let send = Paragraph::new(Line::from(" 送信 ▶ "))
        .style(send_style)
        .alignment(Alignment::Center)
        .block(Block::default().padding(Padding::top(1)));
    frame.render_widget(send, send_area);

    if !pending {
        frame.set_cursor_position((
            inner.x + clamp_u16(col - col_offset),
            inner.y + clamp_u16(row - row_offset),
        ));
    }
}

fn render_hint(frame: &mut Frame, area: Rect) {
    let hint = Paragraph::new(Line::from(Span::styled(SEND_HINT, Style::default().fg(ACCENT))))
        .alignment(Alignment::Center);
    frame.render_widget(hint, area);
}

fn clamp_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}
