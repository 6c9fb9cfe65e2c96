use log::debug;
use shared::sim::tower_rotations;
use shared::snapshot::{apply_snapshot, ApplyOutcome, GameSnapshot};
use shared::state::GameState;
use shared::Side;

/// Client-side mirror of the server's match
///
/// The mirror is never simulated. Every applied snapshot replaces its
/// entities wholesale, after which tower facings are recomputed so the
/// presenter can draw towers turned toward their targets.
#[derive(Debug, Clone)]
pub struct ClientGameState {
    state: GameState,
    rotations: Vec<f32>,
    snapshots_applied: u64,
}

impl ClientGameState {
    pub fn new() -> Self {
        Self {
            state: GameState::new(),
            rotations: Vec::new(),
            snapshots_applied: 0,
        }
    }

    /// Overwrites the mirror with an authoritative snapshot.
    pub fn apply_server_state(&mut self, snapshot: &GameSnapshot, player_index: i32) -> ApplyOutcome {
        let outcome = apply_snapshot(&mut self.state, snapshot, player_index);
        self.rotations = tower_rotations(&self.state);
        self.snapshots_applied += 1;

        if self.snapshots_applied % 60 == 0 {
            debug!(
                "Snapshot {}: wave {}, {} enemies, {} towers, {} projectiles",
                self.snapshots_applied,
                self.state.current_wave,
                self.state.enemies.len(),
                self.state.towers.len(),
                self.state.projectiles.len()
            );
        }

        outcome
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

    pub fn snapshots_applied(&self) -> u64 {
        self.snapshots_applied
    }

    /// Money the mirror knows for `team`. Only the local team's balance is
    /// ever sent, so the other team's value is stale.
    pub fn balance(&self, team: Side) -> i32 {
        self.state.economy(team).balance()
    }
}

impl Default for ClientGameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use shared::sim;

    fn server_state_with_tower() -> GameState {
        let mut state = GameState::new();
        state.economy_mut(Side::Left).set_balance(1_000);
        assert!(state.place_tower(2, 300, 100, 0));
        state.in_wave_delay = false;
        state.current_wave = 1;
        sim::spawn_enemy_pair(&mut state);
        state
    }

    #[test]
    fn test_new_mirror_is_empty() {
        let mirror = ClientGameState::new();
        assert!(mirror.state().enemies.is_empty());
        assert!(mirror.rotations().is_empty());
        assert_eq!(mirror.snapshots_applied(), 0);
    }

    #[test]
    fn test_apply_copies_counts_and_money() {
        let server = server_state_with_tower();
        let snapshot = GameSnapshot::capture(&server, 0);

        let mut mirror = ClientGameState::new();
        mirror.apply_server_state(&snapshot, 0);

        assert_eq!(mirror.state().towers.len(), 1);
        assert_eq!(mirror.state().enemies.len(), 2);
        assert_eq!(mirror.balance(Side::Left), 800);
        assert_eq!(mirror.snapshots_applied(), 1);
    }

    #[test]
    fn test_rotations_follow_towers() {
        let server = server_state_with_tower();
        let snapshot = GameSnapshot::capture(&server, 0);

        let mut mirror = ClientGameState::new();
        mirror.apply_server_state(&snapshot, 0);

        assert_eq!(mirror.rotations().len(), 1);
        let expected = sim::tower_rotations(mirror.state());
        assert_approx_eq!(mirror.rotations()[0], expected[0], 1e-3);
    }

    #[test]
    fn test_right_team_money_lands_on_right() {
        let mut server = GameState::new();
        server.economy_mut(Side::Right).set_balance(777);
        let snapshot = GameSnapshot::capture(&server, 1);

        let mut mirror = ClientGameState::new();
        mirror.apply_server_state(&snapshot, 1);

        assert_eq!(mirror.balance(Side::Right), 777);
        assert_eq!(mirror.balance(Side::Left), 200);
    }
}
