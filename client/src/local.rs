//! Singleplayer driver: the full simulation on the local machine

use crate::input::{select_tower, take_selection, InputIntent, InputManager};
use crate::presenter::Presenter;
use log::{info, warn};
use shared::sim::{self, Cue, TickEvents};
use shared::state::GameState;
use shared::{Side, MAX_DELTA_TIME};
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Owner used for every local placement, so the left team pays.
const LOCAL_PLAYER: i32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalPhase {
    Menu,
    Playing,
    GameOver,
}

pub struct LocalGame {
    phase: LocalPhase,
    state: GameState,
    rotations: Vec<f32>,
    message: Option<String>,
}

impl LocalGame {
    pub fn new() -> Self {
        Self {
            phase: LocalPhase::Menu,
            state: GameState::new(),
            rotations: Vec::new(),
            message: None,
        }
    }

    pub fn phase(&self) -> LocalPhase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn rotations(&self) -> &[f32] {
        &self.rotations
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Leaves the menu with a fresh board.
    pub fn start(&mut self) {
        if self.phase == LocalPhase::Menu {
            info!("Starting singleplayer game");
            self.state = GameState::new();
            self.rotations.clear();
            self.message = None;
            self.phase = LocalPhase::Playing;
        }
    }

    /// Applies one intent. Returns false when the player wants to quit.
    pub fn handle_intent(&mut self, intent: InputIntent) -> bool {
        match intent {
            InputIntent::Quit => return false,
            InputIntent::Cancel => self.state.selection = None,
            InputIntent::SelectTower(slot) => {
                if self.phase == LocalPhase::Playing {
                    select_tower(&mut self.state, slot, Side::Left);
                }
            }
            InputIntent::PlaceAt { x, y } => {
                if self.phase == LocalPhase::Playing {
                    if let Some(slot) = take_selection(&mut self.state, x) {
                        self.state.place_tower(slot, x, y, LOCAL_PLAYER);
                    }
                }
            }
        }
        true
    }

    /// Advances the board by `dt` seconds, capped at 100ms.
    pub fn advance(&mut self, dt: f32) -> TickEvents {
        if self.phase != LocalPhase::Playing {
            return TickEvents::default();
        }

        let mut dt = dt;
        if dt > MAX_DELTA_TIME {
            warn!(
                "Large delta time detected ({:.3}s), capping to {:.3}s",
                dt, MAX_DELTA_TIME
            );
            dt = MAX_DELTA_TIME;
        }

        let events = sim::step(&mut self.state, dt);
        self.rotations = sim::tower_rotations(&self.state);

        if self.state.game_over {
            let message = game_over_message(&self.state);
            info!("{}", message);
            self.message = Some(message);
            self.phase = LocalPhase::GameOver;
        }

        events
    }
}

impl Default for LocalGame {
    fn default() -> Self {
        Self::new()
    }
}

/// End-of-game banner for a local match.
pub fn game_over_message(state: &GameState) -> String {
    let left = state.lane_hp(Side::Left);
    let right = state.lane_hp(Side::Right);
    if left <= 0 && right <= 0 {
        "GAME OVER - DRAW!".to_string()
    } else if left <= 0 {
        "GAME OVER - Player 1 Loses!".to_string()
    } else {
        "GAME OVER - Player 2 Loses!".to_string()
    }
}

/// Runs a singleplayer match until it ends or the player quits.
pub async fn run_singleplayer<P: Presenter>(
    presenter: &mut P,
    input: &mut InputManager,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut game = LocalGame::new();
    presenter.status("Singleplayer");
    game.start();

    let mut frame_interval = interval(FRAME_INTERVAL);
    frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_frame = Instant::now();
    let mut music_started = false;

    loop {
        frame_interval.tick().await;

        if let Some(intent) = input.next_intent() {
            if !game.handle_intent(intent) {
                info!("Quitting singleplayer game");
                break;
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        if !music_started {
            presenter.cue(Cue::MusicStart);
            music_started = true;
        }

        let events = game.advance(dt);
        for cue in events.cues {
            presenter.cue(cue);
        }
        presenter.frame(game.state(), game.rotations(), game.state().selection);

        if game.phase() == LocalPhase::GameOver {
            presenter.cue(Cue::MusicStop);
            if let Some(message) = game.message() {
                presenter.game_over(message);
            }
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> LocalGame {
        let mut game = LocalGame::new();
        game.start();
        game
    }

    #[test]
    fn test_menu_does_not_advance() {
        let mut game = LocalGame::new();
        game.advance(0.05);
        assert_eq!(game.phase(), LocalPhase::Menu);
        assert_eq!(game.state().economy(Side::Left).balance(), 200);
    }

    #[test]
    fn test_select_and_place_charges_left_team() {
        let mut game = playing();
        assert!(game.handle_intent(InputIntent::SelectTower(2)));
        assert_eq!(game.state().selection, Some(2));

        game.handle_intent(InputIntent::PlaceAt { x: 1200, y: 300 });
        assert_eq!(game.state().towers.len(), 1);
        assert_eq!(game.state().towers.as_slice()[0].owner, 0);
        assert_eq!(game.state().economy(Side::Left).balance(), 0);
        assert_eq!(game.state().selection, None);
    }

    #[test]
    fn test_place_in_gap_clears_selection() {
        let mut game = playing();
        game.handle_intent(InputIntent::SelectTower(2));
        game.handle_intent(InputIntent::PlaceAt { x: 750, y: 300 });
        assert!(game.state().towers.is_empty());
        assert_eq!(game.state().selection, None);
    }

    #[test]
    fn test_unaffordable_selection_is_cancelled() {
        let mut game = playing();
        game.handle_intent(InputIntent::SelectTower(0));
        assert_eq!(game.state().selection, None);
    }

    #[test]
    fn test_cancel_and_quit() {
        let mut game = playing();
        game.handle_intent(InputIntent::SelectTower(2));
        assert!(game.handle_intent(InputIntent::Cancel));
        assert_eq!(game.state().selection, None);
        assert!(!game.handle_intent(InputIntent::Quit));
    }

    #[test]
    fn test_large_dt_is_capped() {
        let mut game = playing();
        game.advance(5.0);
        // Still inside the 4s opening delay after one capped step.
        assert_eq!(game.state().current_wave, 0);
        assert!(game.state().enemies.is_empty());
    }

    #[test]
    fn test_game_over_messages() {
        let mut state = GameState::new();
        state.lane_hp = [0, 0];
        assert_eq!(game_over_message(&state), "GAME OVER - DRAW!");

        state.lane_hp = [0, 40];
        assert_eq!(game_over_message(&state), "GAME OVER - Player 1 Loses!");

        state.lane_hp = [40, 0];
        assert_eq!(game_over_message(&state), "GAME OVER - Player 2 Loses!");
    }

    #[test]
    fn test_lane_loss_ends_game() {
        let mut game = playing();
        game.state_mut().lane_hp[1] = 0;
        game.advance(0.016);
        assert_eq!(game.phase(), LocalPhase::GameOver);
        assert_eq!(game.message(), Some("GAME OVER - Player 2 Loses!"));
    }
}
