//! Output seam between the client loops and whatever shows the game

use log::{debug, info};
use shared::sim::Cue;
use shared::state::GameState;
use shared::Side;

/// Receives everything a player would see or hear.
///
/// Implementations only read the state they are handed. Sprites and sounds
/// are looked up from tower prototype indices, projectile kinds and cues.
pub trait Presenter {
    fn status(&mut self, text: &str);
    fn frame(&mut self, state: &GameState, rotations: &[f32], selection: Option<usize>);
    fn cue(&mut self, cue: Cue);
    fn game_over(&mut self, message: &str);
}

/// Presenter for headless runs: writes through `log`
pub struct LogPresenter {
    last_status: String,
    frames: u64,
    summary_every: u64,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self::with_summary_interval(60)
    }

    /// Logs a board summary once every `frames` frames.
    pub fn with_summary_interval(frames: u64) -> Self {
        Self {
            last_status: String::new(),
            frames: 0,
            summary_every: frames.max(1),
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for LogPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for LogPresenter {
    fn status(&mut self, text: &str) {
        if self.last_status != text {
            info!("{}", text);
            self.last_status = text.to_string();
        }
    }

    fn frame(&mut self, state: &GameState, rotations: &[f32], selection: Option<usize>) {
        self.frames += 1;
        if self.frames % self.summary_every != 0 {
            return;
        }

        info!(
            "Wave {} | lanes {}/{} hp | money {}/{} | {} enemies, {} towers, {} projectiles",
            state.current_wave,
            state.lane_hp(Side::Left),
            state.lane_hp(Side::Right),
            state.economy(Side::Left).balance(),
            state.economy(Side::Right).balance(),
            state.enemies.len(),
            state.towers.len(),
            state.projectiles.len()
        );
        if let Some(slot) = selection {
            debug!("Placing tower {}", slot);
        }
        debug!("Tower facings: {:?}", rotations);
    }

    fn cue(&mut self, cue: Cue) {
        debug!("Cue: {:?}", cue);
    }

    fn game_over(&mut self, message: &str) {
        info!("{}", message);
    }
}
