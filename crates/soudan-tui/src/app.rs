use ratatui::layout::Rect;
use soudan_core::{ChatController, Session};

/// Input placeholder shown while the draft is empty.
pub const PLACEHOLDER: &str = "何か気になってることとか、話したいことあります？";

/// Key hint under the input box.
pub const SEND_HINT: &str = "Enterで送信 / Shift+Enterで改行";

/// Lines moved per PageUp/PageDown or wheel notch.
const SCROLL_STEP: u16 = 3;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub title: String,
    pub controller: ChatController,

    // Chat pane state
    pub chat_scroll: u16,
    pub chat_max_scroll: u16,
    /// Pinned to the newest turn; cleared by manual scroll-back.
    pub follow_latest: bool,
    seen_turns: usize,

    // Layout (stored on render for mouse hit-testing)
    pub chat_area: Option<Rect>,

    // Loading indicator
    pub animation_frame: u8, // 0-2, which dot is raised
}

impl App {
    pub fn new(title: impl Into<String>, controller: ChatController) -> Self {
        let seen_turns = controller.session().history().len();
        Self {
            should_quit: false,
            title: title.into(),
            controller,
            chat_scroll: 0,
            chat_max_scroll: 0,
            follow_latest: true,
            seen_turns,
            chat_area: None,
            animation_frame: 0,
        }
    }

    pub fn session(&self) -> &Session {
        self.controller.session()
    }

    pub fn is_pending(&self) -> bool {
        self.controller.is_pending()
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        } else {
            self.animation_frame = 0;
        }
    }

    /// Snap back to the newest turn whenever history has grown.
    pub fn sync_follow(&mut self) {
        let turns = self.session().history().len();
        if turns != self.seen_turns {
            self.seen_turns = turns;
            self.follow_latest = true;
        }
    }

    /// Record the scroll range of the last layout and clamp to it.
    pub fn set_chat_extent(&mut self, total_lines: u16, visible_height: u16) {
        self.chat_max_scroll = total_lines.saturating_sub(visible_height);
        if self.follow_latest || self.chat_scroll >= self.chat_max_scroll {
            self.chat_scroll = self.chat_max_scroll;
            self.follow_latest = true;
        }
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(SCROLL_STEP);
        self.follow_latest = self.chat_scroll >= self.chat_max_scroll;
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = (self.chat_scroll + SCROLL_STEP).min(self.chat_max_scroll);
        self.follow_latest = self.chat_scroll >= self.chat_max_scroll;
    }
}
