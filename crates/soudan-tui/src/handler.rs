use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use crate::app::App;
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }

    if app.controller.poll_exchange().await.is_some() {
        app.sync_follow();
    }
    Ok(())
}

/// What a key press means to the chat screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Submit,
    Newline,
    Edit,
    Scroll,
}

pub fn classify_key(key: &KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Esc => KeyAction::Quit,
        // Ctrl+J is what many terminals send for Shift+Enter
        KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Newline,
        KeyCode::Enter if key.modifiers.is_empty() => KeyAction::Submit,
        KeyCode::Enter => KeyAction::Newline,
        KeyCode::PageUp | KeyCode::PageDown => KeyAction::Scroll,
        _ => KeyAction::Edit,
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match classify_key(&key) {
        KeyAction::Quit => app.should_quit = true,
        KeyAction::Submit => {
            if app.controller.submit_draft() {
                app.sync_follow();
            }
        }
        KeyAction::Scroll => {
            if key.code == KeyCode::PageUp {
                app.scroll_up();
            } else {
                app.scroll_down();
            }
        }
        // The input box is disabled while a reply is on its way
        _ if app.is_pending() => {}
        KeyAction::Newline => app.controller.session_mut().draft_mut().insert_newline(),
        KeyAction::Edit => edit_draft(app, key),
    }
}

fn edit_draft(app: &mut App, key: KeyEvent) {
    let draft = app.controller.session_mut().draft_mut();
    match key.code {
        KeyCode::Backspace => draft.backspace(),
        KeyCode::Delete => draft.delete(),
        KeyCode::Left => draft.move_left(),
        KeyCode::Right => draft.move_right(),
        KeyCode::Home => draft.move_home(),
        KeyCode::End => draft.move_end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => draft.insert(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let Some(area) = app.chat_area else { return };
    let inside = mouse.column >= area.x
        && mouse.column < area.x + area.width
        && mouse.row >= area.y
        && mouse.row < area.y + area.height;
    if !inside {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(),
        MouseEventKind::ScrollDown => app.scroll_down(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use soudan_core::{ChatController, ChatMessage, ChatTransport, ExchangeError, Session};
    use std::sync::Arc;

    /// Never answers, so the exchange stays pending.
    struct NeverTransport;

    #[async_trait]
    impl ChatTransport for NeverTransport {
        async fn exchange(&self, _messages: Vec<ChatMessage>) -> Result<String, ExchangeError> {
            std::future::pending().await
        }
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn app() -> App {
        App::new(
            "村山相談室",
            ChatController::new(Session::new(), Arc::new(NeverTransport)),
        )
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key(app, key(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    #[test]
    fn test_classify_enter_variants() {
        assert_eq!(classify_key(&key(KeyCode::Enter, KeyModifiers::NONE)), KeyAction::Submit);
        assert_eq!(classify_key(&key(KeyCode::Enter, KeyModifiers::SHIFT)), KeyAction::Newline);
        assert_eq!(classify_key(&key(KeyCode::Enter, KeyModifiers::ALT)), KeyAction::Newline);
        assert_eq!(
            classify_key(&key(KeyCode::Char('j'), KeyModifiers::CONTROL)),
            KeyAction::Newline
        );
        assert_eq!(
            classify_key(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Quit
        );
        assert_eq!(classify_key(&key(KeyCode::Char('j'), KeyModifiers::NONE)), KeyAction::Edit);
    }

    #[tokio::test]
    async fn test_enter_submits_draft() {
        let mut app = app();
        type_text(&mut app, "元気です");

        handle_key(&mut app, key(KeyCode::Enter, KeyModifiers::NONE));

        assert!(app.is_pending());
        assert_eq!(app.session().history().len(), 2);
        assert_eq!(app.session().history()[1].content, "元気です");
        assert_eq!(app.session().draft().text(), "");
    }

    #[tokio::test]
    async fn test_shift_enter_inserts_newline() {
        let mut app = app();
        type_text(&mut app, "一行目");
        handle_key(&mut app, key(KeyCode::Enter, KeyModifiers::SHIFT));
        type_text(&mut app, "二行目");

        assert_eq!(app.session().draft().text(), "一行目\n二行目");
        assert_eq!(app.session().history().len(), 1);
        assert!(!app.is_pending());
    }

    #[tokio::test]
    async fn test_enter_on_blank_draft_does_nothing() {
        let mut app = app();
        type_text(&mut app, "   ");

        handle_key(&mut app, key(KeyCode::Enter, KeyModifiers::NONE));

        assert!(!app.is_pending());
        assert_eq!(app.session().history().len(), 1);
        assert_eq!(app.session().draft().text(), "   ");
    }

    #[tokio::test]
    async fn test_typing_ignored_while_pending() {
        let mut app = app();
        type_text(&mut app, "送信");
        handle_key(&mut app, key(KeyCode::Enter, KeyModifiers::NONE));

        type_text(&mut app, "追加");
        handle_key(&mut app, key(KeyCode::Enter, KeyModifiers::NONE));

        assert_eq!(app.session().draft().text(), "");
        assert_eq!(app.session().history().len(), 2);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits() {
        let mut app = app();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)))
            .await
            .unwrap();
        assert!(app.should_quit);
    }
}
