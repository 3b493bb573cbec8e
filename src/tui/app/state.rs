use crate::agents::{Action, AgentTable, ComputerProfile};
use crate::bid::{minimal_raise, parse_bid, validate_raise};
use crate::game::{ConfigError, Game, GameConfig, Phase, PlayerId, PlayerKind};
use crate::round::Decision;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Scene {
    Menu,
    Table,
}

/// High-level input actions for the TUI controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InputAction {
    MenuNext,
    MenuPrev,
    MenuInc,
    MenuDec,
    MenuApply,
    MenuCancel,
    ToggleMenu,
    ToggleHelp,
    ToggleHistory,
    HistoryUp,
    HistoryDown,
    NextRound,
    Challenge,
    Pass,
    BidOpen,
    BidChar(char),
    BidBackspace,
    BidInc,
    BidDec,
    BidSubmit,
    BidCancel,
}

#[derive(Debug)]
#[non_exhaustive]
pub struct AppState {
    pub scene: Scene,
    pub started: Instant,
    pub game: Game,
    pub agents: AgentTable,
    // Menu config being edited
    pub menu_index: usize,
    pub cfg: GameConfig,
    pub cfg_bot_delay_ms: u64,
    pub bot_delay_ms: u64,
    // Config the running game was built from
    pub(crate) config: GameConfig,
    help_open: bool,
    history_open: bool,
    history_offset: usize,
    bid_entry: Option<String>,
    bid_entry_error: Option<String>,
    action_error: Option<String>,
    action_error_at: Option<Instant>,
    menu_error: Option<String>,
}

impl AppState {
    pub const HISTORY_PAGE_SIZE: usize = 20;
    pub const DEFAULT_BOT_DELAY_MS: u64 = 600;
    const ACTION_ERROR_TTL: Duration = Duration::from_secs(3);
    const BID_ENTRY_MAX: usize = 8;

    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let game = Game::new(config.clone())?;
        let delay = Self::DEFAULT_BOT_DELAY_MS;
        let agents = Self::table_for(&game, delay);
        Ok(Self {
            scene: Scene::Menu,
            started: Instant::now(),
            game,
            agents,
            menu_index: 0,
            cfg: config.clone(),
            cfg_bot_delay_ms: delay,
            bot_delay_ms: delay,
            config,
            help_open: false,
            history_open: false,
            history_offset: 0,
            bid_entry: None,
            bid_entry_error: None,
            action_error: None,
            action_error_at: None,
            menu_error: None,
        })
    }

    pub(crate) fn table_for(game: &Game, delay_ms: u64) -> AgentTable {
        let mut agents = AgentTable::standard(game, ComputerProfile::default());
        agents.set_min_action_delay_ms(delay_ms);
        agents
    }

    /// The human always plays as the first player.
    pub fn human_id(&self) -> PlayerId {
        PlayerId::new(0)
    }

    /// What the human must decide now, if it is their turn.
    pub fn human_decision(&self) -> Option<Decision> {
        if self.scene != Scene::Table {
            return None;
        }
        self.game.pending().filter(|p| p.player == self.human_id()).map(|p| p.decision)
    }

    fn queue_action(&mut self, action: Action) -> bool {
        if self.human_decision().is_none() {
            return false;
        }
        self.clear_action_error();
        self.agents.receive(self.human_id(), action)
    }

    pub fn bid_entry_active(&self) -> bool {
        self.bid_entry.is_some()
    }

    pub fn bid_entry_text(&self) -> Option<&str> {
        self.bid_entry.as_deref()
    }

    pub fn bid_entry_error(&self) -> Option<&str> {
        self.bid_entry_error.as_deref()
    }

    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    pub fn menu_error(&self) -> Option<&str> {
        self.menu_error.as_deref()
    }

    fn clear_action_error(&mut self) {
        self.action_error = None;
        self.action_error_at = None;
    }

    fn set_action_error(&mut self, err: impl ToString) {
        self.action_error = Some(err.to_string());
        self.action_error_at = Some(Instant::now());
    }

    pub fn help_open(&self) -> bool {
        self.help_open
    }

    pub fn history_open(&self) -> bool {
        self.history_open
    }

    pub fn history_offset(&self) -> usize {
        self.history_offset
    }

    pub(crate) fn close_help(&mut self) {
        self.help_open = false;
    }

    pub(crate) fn close_history(&mut self) {
        self.history_open = false;
    }

    pub(crate) fn set_menu_error(&mut self, err: Option<String>) {
        self.menu_error = err;
    }

    /// Smallest legal bid for the human right now, as `(count, face)`.
    pub fn suggested_bid(&self) -> Option<(u32, u8)> {
        minimal_raise(&self.game.current_bid(), self.game.total_dice())
    }

    fn open_bid_entry(&mut self) -> bool {
        if self.human_decision().is_none() {
            return false;
        }
        let buf = self.suggested_bid().map(|(c, f)| format!("{c} {f}")).unwrap_or_default();
        self.bid_entry = Some(buf);
        self.bid_entry_error = None;
        true
    }

    fn bid_entry_push(&mut self, c: char) {
        if let Some(buf) = self.bid_entry.as_mut() {
            if buf.len() >= Self::BID_ENTRY_MAX || !(c.is_ascii_digit() || c == ' ') {
                return;
            }
            buf.push(c);
        }
        self.bid_entry_error = None;
    }

    fn bid_entry_backspace(&mut self) {
        if let Some(buf) = self.bid_entry.as_mut() {
            buf.pop();
        }
        self.bid_entry_error = None;
    }

    /// Step the count in the entry, keeping the face.
    fn bid_entry_adjust_count(&mut self, delta: i64) {
        let total = i64::from(self.game.total_dice());
        if let Some(buf) = self.bid_entry.as_mut() {
            let (count, face) = parse_bid(buf).unwrap_or((0, 1));
            let next = (i64::from(count) + delta).clamp(1, total.max(1));
            *buf = format!("{next} {face}");
        }
        self.bid_entry_error = None;
    }

    fn bid_entry_submit(&mut self) -> bool {
        let Some(buf) = self.bid_entry.as_ref() else {
            return false;
        };
        let (count, face) = match parse_bid(buf) {
            Ok(v) => v,
            Err(_) => {
                self.bid_entry_error = Some("Enter: count face".to_string());
                return false;
            }
        };
        let current = self.game.current_bid();
        if let Err(e) = validate_raise(self.human_id(), count, face, &current, self.game.total_dice())
        {
            self.bid_entry_error = Some(e.to_string());
            return false;
        }
        if self.queue_action(Action::Bid { count, face }) {
            self.bid_entry = None;
            self.bid_entry_error = None;
            return true;
        }
        self.bid_entry_error = Some("Not your turn".to_string());
        false
    }

    fn bid_entry_cancel(&mut self) {
        self.bid_entry = None;
        self.bid_entry_error = None;
    }

    pub fn handle_input(&mut self, action: InputAction) -> bool {
        match action {
            InputAction::ToggleMenu => {
                self.toggle_menu();
                false
            }
            InputAction::ToggleHelp => {
                if self.scene == Scene::Table {
                    self.history_open = false;
                    self.help_open = !self.help_open;
                }
                false
            }
            InputAction::ToggleHistory => {
                if self.scene == Scene::Table {
                    self.help_open = false;
                    if !self.history_open {
                        self.history_offset = 0;
                    }
                    self.history_open = !self.history_open;
                }
                false
            }
            InputAction::HistoryUp => {
                if self.scene == Scene::Table && self.history_open {
                    let max_offset =
                        self.game.history_len().saturating_sub(Self::HISTORY_PAGE_SIZE);
                    self.history_offset = (self.history_offset + 1).min(max_offset);
                }
                false
            }
            InputAction::HistoryDown => {
                if self.scene == Scene::Table && self.history_open && self.history_offset > 0 {
                    self.history_offset -= 1;
                }
                false
            }
            InputAction::MenuNext => {
                if self.scene == Scene::Menu {
                    self.menu_next();
                }
                false
            }
            InputAction::MenuPrev => {
                if self.scene == Scene::Menu {
                    self.menu_prev();
                }
                false
            }
            InputAction::MenuInc => {
                if self.scene == Scene::Menu {
                    self.menu_inc();
                }
                false
            }
            InputAction::MenuDec => {
                if self.scene == Scene::Menu {
                    self.menu_dec();
                }
                false
            }
            InputAction::MenuApply => {
                if self.scene == Scene::Menu {
                    self.apply_menu();
                }
                false
            }
            InputAction::MenuCancel => {
                if self.scene == Scene::Menu {
                    self.cancel_menu();
                }
                false
            }
            InputAction::NextRound => {
                if self.scene == Scene::Table {
                    self.next_round();
                }
                false
            }
            InputAction::Challenge => {
                self.human_decision() == Some(Decision::Challenge)
                    && self.queue_action(Action::Challenge)
            }
            InputAction::Pass => {
                self.human_decision() == Some(Decision::Challenge) && self.queue_action(Action::Pass)
            }
            InputAction::BidOpen => self.open_bid_entry(),
            InputAction::BidChar(c) => {
                self.bid_entry_push(c);
                false
            }
            InputAction::BidBackspace => {
                self.bid_entry_backspace();
                false
            }
            InputAction::BidInc => {
                self.bid_entry_adjust_count(1);
                false
            }
            InputAction::BidDec => {
                self.bid_entry_adjust_count(-1);
                false
            }
            InputAction::BidSubmit => self.bid_entry_submit(),
            InputAction::BidCancel => {
                self.bid_entry_cancel();
                false
            }
        }
    }

    /// Roll the dice for the next round once the previous one has been resolved.
    pub fn next_round(&mut self) {
        if self.game.phase() != Phase::RoundStart {
            return;
        }
        match self.game.start_round() {
            Ok(()) => {
                self.history_offset = 0;
                self.clear_action_error();
            }
            Err(err) => self.set_action_error(err),
        }
    }

    /// Label for a player's agent, shown on their card.
    pub fn agent_label(&self, player: PlayerId) -> Option<&'static str> {
        match self.agents.agent_kind(player)? {
            PlayerKind::Human => Some("YOU"),
            _ => Some("CPU"),
        }
    }

    pub fn agents_on_turn(&mut self) {
        if self.scene != Scene::Table {
            return;
        }
        if let Some(at) = self.action_error_at {
            if at.elapsed() >= Self::ACTION_ERROR_TTL {
                self.clear_action_error();
            }
        }
        match self.agents.on_turn(&mut self.game) {
            Ok(true) => self.clear_action_error(),
            Ok(false) => {}
            Err(err) => {
                debug!(%err, "agent action rejected");
                self.set_action_error(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_app() -> AppState {
        let mut app = AppState::new(GameConfig { seed: Some(5), ..GameConfig::default() }).unwrap();
        app.apply_menu();
        app
    }

    #[test]
    fn action_ignored_before_round_starts() {
        let mut app = table_app();
        assert_eq!(app.game.phase(), Phase::RoundStart);
        assert!(!app.queue_action(Action::Bid { count: 1, face: 1 }));
        assert!(!app.handle_input(InputAction::BidOpen));
    }

    #[test]
    fn bid_entry_prefills_the_smallest_bid() {
        let mut app = table_app();
        app.next_round();
        assert_eq!(app.human_decision(), Some(Decision::OpeningBid));
        assert!(app.handle_input(InputAction::BidOpen));
        assert_eq!(app.bid_entry_text(), Some("1 1"));
        app.handle_input(InputAction::BidInc);
        assert_eq!(app.bid_entry_text(), Some("2 1"));
    }

    #[test]
    fn invalid_bid_text_keeps_entry_open() {
        let mut app = table_app();
        app.next_round();
        app.handle_input(InputAction::BidOpen);
        app.handle_input(InputAction::BidBackspace);
        app.handle_input(InputAction::BidChar('9'));
        assert!(!app.handle_input(InputAction::BidSubmit));
        assert!(app.bid_entry_active());
        assert!(app.bid_entry_error().is_some());
    }

    #[test]
    fn submitted_bid_is_played_on_tick() {
        let mut app = table_app();
        app.next_round();
        app.handle_input(InputAction::BidOpen);
        assert!(app.handle_input(InputAction::BidSubmit));
        assert!(!app.bid_entry_active());
        app.agents_on_turn();
        let bid = app.game.current_bid();
        assert_eq!((bid.count(), bid.face()), (1, 1));
    }

    #[test]
    fn challenge_needs_a_standing_bid() {
        let mut app = table_app();
        app.next_round();
        assert!(!app.handle_input(InputAction::Challenge));
        assert!(!app.handle_input(InputAction::Pass));
    }
}
