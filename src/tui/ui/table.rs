use crate::dice::DiceSet;
use crate::game::{EventKind, Game, GameEvent, Outcome, Phase, Player, PlayerId};
use crate::round::Decision;
use crate::tui::app::AppState;
use ratatui::prelude::*;
use ratatui::widgets::*;

use super::layout::{centered_rect, inner};

pub(super) fn draw_table(f: &mut Frame, app: &AppState) {
    let size = f.area();
    let header_height: u16 = 2 + 2;
    let reveal_height: u16 = 3 + 2;
    let status_height: u16 = 3 + 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_height), // header
            Constraint::Min(3),                // players
            Constraint::Length(reveal_height), // last challenge
            Constraint::Length(status_height), // status bar
        ])
        .split(size);

    let game = &app.game;
    let header_lines = vec![
        Line::from(format!(
            "Round {}   Dice in play: {}   Rule: {}",
            game.round(),
            game.total_dice(),
            game.rule().label()
        )),
        Line::from(vec![
            Span::raw("Standing bid: "),
            Span::styled(
                game.current_bid().to_string(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    let header = Paragraph::new(header_lines)
        .block(Block::default().title("liars-dice").borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    // Active players left to right in bidding order, then the eliminated.
    let players: Vec<&Player> = game.players().iter().chain(game.eliminated()).collect();
    let players_area = chunks[1];
    let cols = players.len().max(1) as u16;
    let col_width = players_area.width / cols;
    let col_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints((0..cols).map(|_| Constraint::Length(col_width)).collect::<Vec<_>>())
        .split(players_area);
    for (i, p) in players.iter().enumerate() {
        render_player_card(f, col_chunks[i], app, p);
    }

    draw_reveal(f, chunks[2], app);

    let status_area = chunks[3];
    f.render_widget(Block::default().borders(Borders::ALL).title("Status"), status_area);
    let status_inner = inner(status_area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(status_inner);

    let mut left_info = match game.phase() {
        Phase::Over(outcome) => vec![
            Line::from(Span::styled(
                outcome_label(outcome),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from("Press M for a new game."),
        ],
        Phase::RoundStart if game.round() == 1 => {
            vec![Line::from("Game not started, press Space to roll.")]
        }
        Phase::RoundStart => vec![Line::from("Round over, press Space to roll again.")],
        Phase::Bidding => {
            let acting = game
                .pending()
                .map(|p| player_name(game, p.player))
                .unwrap_or_else(|| "-".to_string());
            vec![Line::from(format!("Acting: {acting}"))]
        }
    };

    if let Some(err) = app.action_error() {
        left_info.push(Line::from(Span::styled(
            format!("Error: {err}"),
            Style::default().fg(Color::Red),
        )));
    }

    let decision = app.human_decision();
    let action_style = |enabled: bool| {
        if enabled {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        }
    };
    if decision.is_some() {
        let deciding = decision == Some(Decision::Challenge);
        let can_raise = app.suggested_bid().is_some();
        left_info.push(Line::from(vec![
            Span::raw("Actions: "),
            Span::styled("C challenge", action_style(deciding)),
            Span::raw(" • "),
            Span::styled("P pass", action_style(deciding && can_raise)),
            Span::raw(" • "),
            Span::styled("B bid", action_style(can_raise)),
        ]));
    }

    let right_keys = vec![Line::from(""), Line::from("? help • H history • M menu")];
    let left_para = Paragraph::new(left_info).wrap(Wrap { trim: true });
    let right_para =
        Paragraph::new(right_keys).wrap(Wrap { trim: true }).alignment(Alignment::Right);
    f.render_widget(left_para, cols[0]);
    f.render_widget(right_para, cols[1]);

    if app.help_open() {
        draw_help(f);
    } else if app.history_open() {
        draw_history(f, app);
    } else if app.bid_entry_active() {
        draw_bid_entry(f, app);
    }
}

fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::HumanEliminated => "You lost all your dice. Game over.",
        Outcome::AllOpponentsEliminated => "Every opponent is out. You win!",
    }
}

fn player_name(game: &Game, id: PlayerId) -> String {
    game.player(id).map(|p| p.name().to_string()).unwrap_or_else(|| id.to_string())
}

fn render_player_card(f: &mut Frame, area: Rect, app: &AppState, p: &Player) {
    let game = &app.game;
    let acting = game.pending().map(|pd| pd.player) == Some(p.id());
    let mut title = p.name().to_string();
    if let Some(label) = app.agent_label(p.id()) {
        title.push_str(&format!(" [{label}]"));
    }
    if acting {
        title.push_str(" [Act]");
    }
    let mut block = Block::default().title(title).borders(Borders::ALL);
    let loser = game.last_resolution().map(|r| r.loser) == Some(p.id());
    if p.is_eliminated() {
        block = block.border_style(Style::default().fg(Color::DarkGray));
    } else if acting && p.id() == app.human_id() {
        block = block.border_style(Style::default().fg(Color::Magenta));
    } else if acting {
        block = block.border_style(Style::default().fg(Color::Yellow));
    } else if loser && game.phase() != Phase::Bidding {
        block = block.border_style(Style::default().fg(Color::LightRed));
    }

    let dim = Style::default().add_modifier(Modifier::DIM);
    let mut lines: Vec<Line> = Vec::with_capacity(4);
    if p.is_eliminated() {
        lines.push(Line::from(Span::styled("Out", dim)));
    } else {
        lines.push(Line::from(format!("Dice: {}", p.dice_count())));
    }
    let last_bid = (game.phase() == Phase::Bidding).then(|| last_bid_by(game, p.id())).flatten();
    match last_bid {
        Some(bid) => lines.push(Line::from(format!("Last: {bid}"))),
        None => lines.push(Line::from(vec![Span::raw("Last: "), Span::styled("--", dim)])),
    }
    let shown = if p.id() == app.human_id() && game.phase() == Phase::Bidding {
        Some(p.dice().clone())
    } else {
        revealed_dice(game, p.id())
    };
    lines.push(Line::from(""));
    lines.push(dice_line(shown.as_ref(), p.dice_count(), game.current_bid().face()));

    f.render_widget(block, area);
    let para = Paragraph::new(lines).wrap(Wrap { trim: true });
    f.render_widget(para, inner(area));
}

fn revealed_dice(game: &Game, id: PlayerId) -> Option<DiceSet> {
    if game.phase() == Phase::Bidding {
        return None;
    }
    let res = game.last_resolution()?;
    res.revealed.iter().find(|(pid, _)| *pid == id).map(|(_, d)| d.clone())
}

fn last_bid_by(game: &Game, id: PlayerId) -> Option<crate::bid::Bid> {
    let round = game.round();
    game.history_recent(game.history_len()).into_iter().rev().find_map(|e| match e.kind {
        EventKind::BidPlaced { bid } if e.round == round && bid.proposer() == Some(id) => {
            Some(bid)
        }
        _ => None,
    })
}

/// Faces when known, `?` per hidden die. Dice showing `highlight` are emphasised.
fn dice_line(dice: Option<&DiceSet>, hidden: u32, highlight: u8) -> Line<'static> {
    match dice {
        Some(d) => Line::from(
            d.values()
                .iter()
                .flat_map(|&v| {
                    let style = if v == highlight {
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::Cyan)
                    };
                    [Span::styled(format!("[{v}]"), style), Span::raw(" ")]
                })
                .collect::<Vec<_>>(),
        ),
        None => Line::from(Span::styled(
            "[?] ".repeat(hidden as usize),
            Style::default().add_modifier(Modifier::DIM),
        )),
    }
}

fn draw_reveal(f: &mut Frame, area: Rect, app: &AppState) {
    let game = &app.game;
    let block = Block::default().title("Last challenge").borders(Borders::ALL);
    let lines = match game.last_resolution() {
        None => vec![Line::from(Span::styled(
            "No challenge yet.",
            Style::default().add_modifier(Modifier::DIM),
        ))],
        Some(res) => {
            let proposer = res.bid.proposer().map(|id| player_name(game, id)).unwrap_or_default();
            let challenger =
                res.bid.challenger().map(|id| player_name(game, id)).unwrap_or_default();
            let verdict = if res.valid { "holds" } else { "is a lie" };
            let mut lines = vec![
                Line::from(format!(
                    "Round {}: {challenger} challenged {proposer}'s {}.",
                    res.round, res.bid
                )),
                Line::from(format!("Table shows {} × {}, the bid {verdict}.", res.actual, res.bid.face())),
                Line::from(format!(
                    "{} loses a die ({} left).",
                    player_name(game, res.loser),
                    res.loser_dice_left
                )),
            ];
            for id in &res.eliminated {
                lines.push(Line::from(Span::styled(
                    format!("{} is out.", player_name(game, *id)),
                    Style::default().fg(Color::LightRed),
                )));
            }
            lines
        }
    };
    let para = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

fn event_text(game: &Game, event: &GameEvent) -> String {
    match event.kind {
        EventKind::RoundStarted { total_dice } => format!("Round started, {total_dice} dice"),
        EventKind::BidPlaced { bid } => {
            let who = bid.proposer().map(|id| player_name(game, id)).unwrap_or_default();
            format!("{who} bids {bid}")
        }
        EventKind::ChallengeDeclined { player } => format!("{} passes", player_name(game, player)),
        EventKind::Challenged { bid } => {
            let who = bid.challenger().map(|id| player_name(game, id)).unwrap_or_default();
            format!("{who} challenges {bid}")
        }
        EventKind::BidResolved { bid, actual, valid } => {
            let verdict = if valid { "holds" } else { "fails" };
            format!("{bid} {verdict} ({actual} on the table)")
        }
        EventKind::DieLost { player, remaining } => {
            format!("{} loses a die, {remaining} left", player_name(game, player))
        }
        EventKind::PlayerEliminated { player } => format!("{} is out", player_name(game, player)),
        EventKind::GameEnded { outcome } => outcome_label(outcome).to_string(),
    }
}

fn draw_history(f: &mut Frame, app: &AppState) {
    let area = centered_rect(70, 80, f.area());
    let block = Block::default().title("History").borders(Borders::ALL);
    let mut lines: Vec<Line> = Vec::new();
    let entries = app.game.history_recent_offset(AppState::HISTORY_PAGE_SIZE, app.history_offset());
    if entries.is_empty() {
        lines.push(Line::from("No history yet."));
    } else {
        for entry in entries {
            lines.push(Line::from(format!("R{} {}", entry.round, event_text(&app.game, &entry))));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Up/Down scroll • Close: H or Esc",
        Style::default().add_modifier(Modifier::DIM),
    )));
    let para = Paragraph::new(lines).wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    f.render_widget(para, inner(area));
}

fn draw_help(f: &mut Frame) {
    let area = centered_rect(70, 80, f.area());
    let block = Block::default().title("Help").borders(Borders::ALL);
    let lines = vec![
        Line::from(Span::styled("Rules:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("- A bid claims how many dice on the table show a face"),
        Line::from("- Raise with more dice, a higher face, or both"),
        Line::from("- A challenged bid is checked against every die"),
        Line::from("- Whoever was wrong loses a die and opens the next round"),
        Line::from(""),
        Line::from(Span::styled("Table:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("- Space: roll the next round"),
        Line::from("- C: challenge the standing bid"),
        Line::from("- P: pass (then bid)"),
        Line::from("- B: bid entry"),
        Line::from("- H: history"),
        Line::from(""),
        Line::from(Span::styled("Bid Entry:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("- 0-9 and Space: type count then face"),
        Line::from("- Backspace: delete"),
        Line::from("- + / -: adjust count"),
        Line::from("- Enter: submit"),
        Line::from("- Esc: cancel"),
        Line::from(""),
        Line::from(Span::styled("Menu:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("- M: open / close menu"),
        Line::from("- Up / Down: move selection"),
        Line::from("- + / -: adjust value"),
        Line::from("- Enter: start a new game"),
        Line::from("- Esc: cancel"),
        Line::from("- Q: quit (menu)"),
        Line::from(""),
        Line::from("Close help: ? or Esc"),
    ];
    let para = Paragraph::new(lines).wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    f.render_widget(para, inner(area));
}

fn draw_bid_entry(f: &mut Frame, app: &AppState) {
    let area = centered_rect(50, 30, f.area());
    let title = if app.game.current_bid().is_null() { "Opening Bid" } else { "Raise" };
    let min = app
        .suggested_bid()
        .map(|(c, v)| format!("{c} × {v}"))
        .unwrap_or_else(|| "none, challenge instead".to_string());
    let current = app.bid_entry_text().unwrap_or("");
    let lines = vec![
        Line::from(format!("Bid (count face): {current}")),
        Line::from(format!("Standing: {}   Lowest raise: {min}", app.game.current_bid())),
        Line::from("Digits and Space to edit, Backspace to delete"),
        Line::from("+/- count, Enter submit, Esc cancel"),
    ];
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner_area = inner(area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner_area);
    let para = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    f.render_widget(para, chunks[0]);
    let error = app.bid_entry_error().unwrap_or("");
    let error_line = Line::from(Span::styled(error, Style::default().fg(Color::Red)));
    let error_para = Paragraph::new(error_line).alignment(Alignment::Center);
    f.render_widget(error_para, chunks[1]);
}
