use crate::game::{Game, ResolutionRule, MAX_OPPONENTS, MIN_OPPONENTS};
use tracing::info;

use super::AppState;

const MAX_DICE_PER_PLAYER: u32 = 10;

#[derive(Debug, Clone, Copy)]
enum MenuItem {
    Opponents,
    DicePerPlayer,
    Rule,
    BotDelayMs,
}

const MENU_ITEMS: [MenuItem; 4] =
    [MenuItem::Opponents, MenuItem::DicePerPlayer, MenuItem::Rule, MenuItem::BotDelayMs];

impl MenuItem {
    fn display(self, app: &AppState) -> String {
        match self {
            MenuItem::Opponents => format!("Opponents: {}", app.cfg.opponents),
            MenuItem::DicePerPlayer => format!("Dice per player: {}", app.cfg.dice_per_player),
            MenuItem::Rule => format!("Challenged bid holds: {}", app.cfg.rule.label()),
            MenuItem::BotDelayMs => format!("CPU Delay (ms): {}", app.cfg_bot_delay_ms),
        }
    }

    fn inc(self, app: &mut AppState) {
        match self {
            MenuItem::Opponents => {
                if app.cfg.opponents < MAX_OPPONENTS {
                    app.cfg.opponents += 1;
                }
            }
            MenuItem::DicePerPlayer => {
                if app.cfg.dice_per_player < MAX_DICE_PER_PLAYER {
                    app.cfg.dice_per_player += 1;
                }
            }
            MenuItem::Rule => app.cfg.rule = next_rule(app.cfg.rule),
            MenuItem::BotDelayMs => {
                app.cfg_bot_delay_ms = app.cfg_bot_delay_ms.saturating_add(100);
            }
        }
    }

    fn dec(self, app: &mut AppState) {
        match self {
            MenuItem::Opponents => {
                if app.cfg.opponents > MIN_OPPONENTS {
                    app.cfg.opponents -= 1;
                }
            }
            MenuItem::DicePerPlayer => {
                if app.cfg.dice_per_player > 1 {
                    app.cfg.dice_per_player -= 1;
                }
            }
            MenuItem::Rule => app.cfg.rule = next_rule(app.cfg.rule),
            MenuItem::BotDelayMs => {
                app.cfg_bot_delay_ms = app.cfg_bot_delay_ms.saturating_sub(100);
            }
        }
    }
}

fn next_rule(rule: ResolutionRule) -> ResolutionRule {
    match rule {
        ResolutionRule::Exact => ResolutionRule::AtLeast,
        _ => ResolutionRule::Exact,
    }
}

impl AppState {
    pub fn menu_items_display(&self) -> Vec<String> {
        MENU_ITEMS.iter().map(|item| item.display(self)).collect()
    }

    pub fn toggle_menu(&mut self) {
        self.close_help();
        self.close_history();
        self.scene = match self.scene {
            super::Scene::Menu => super::Scene::Table,
            _ => {
                self.open_menu();
                super::Scene::Menu
            }
        };
    }

    // --- Menu operations ---
    pub fn open_menu(&mut self) {
        self.close_help();
        self.close_history();
        self.menu_index = 0;
        self.cfg = self.config.clone();
        self.cfg_bot_delay_ms = self.bot_delay_ms;
        self.set_menu_error(None);
        self.scene = super::Scene::Menu;
    }

    /// Start a new game from the edited settings.
    pub fn apply_menu(&mut self) {
        let game = match Game::new(self.cfg.clone()) {
            Ok(game) => game,
            Err(err) => {
                self.set_menu_error(Some(err.to_string()));
                return;
            }
        };
        info!(
            opponents = self.cfg.opponents,
            dice = self.cfg.dice_per_player,
            rule = self.cfg.rule.label(),
            seed = game.seed(),
            "new game"
        );
        self.bot_delay_ms = self.cfg_bot_delay_ms;
        self.agents = Self::table_for(&game, self.bot_delay_ms);
        self.game = game;
        self.config = self.cfg.clone();
        self.set_menu_error(None);
        self.scene = super::Scene::Table;
    }

    pub fn cancel_menu(&mut self) {
        self.set_menu_error(None);
        self.scene = super::Scene::Table;
    }

    pub fn menu_next(&mut self) {
        self.menu_index = (self.menu_index + 1) % MENU_ITEMS.len();
    }
    pub fn menu_prev(&mut self) {
        self.menu_index = (self.menu_index + MENU_ITEMS.len() - 1) % MENU_ITEMS.len();
    }
    pub fn menu_inc(&mut self) {
        let item = MENU_ITEMS[self.menu_index % MENU_ITEMS.len()];
        item.inc(self);
    }
    pub fn menu_dec(&mut self) {
        let item = MENU_ITEMS[self.menu_index % MENU_ITEMS.len()];
        item.dec(self);
    }
}
