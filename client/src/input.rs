//! Player intents and the placement rules applied before anything is sent

use log::debug;
use shared::entities::tower_prototype;
use shared::protocol::ClientPacket;
use shared::state::GameState;
use shared::{Side, WINDOW_WIDTH};
use std::collections::VecDeque;

/// Something the player asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputIntent {
    SelectTower(usize),
    PlaceAt { x: i32, y: i32 },
    Cancel,
    Quit,
}

/// True for x inside the 48%..52% strip between the lanes, where clicks
/// never place anything.
pub fn in_placement_gap(x: i32) -> bool {
    let width = WINDOW_WIDTH as f64;
    let x = x as f64;
    x >= width * 0.48 && x <= width * 0.52
}

/// The left team builds strictly left of the centerline, the right team
/// from the centerline on.
pub fn on_team_side(team: Side, x: i32) -> bool {
    let mid = WINDOW_WIDTH / 2;
    match team {
        Side::Left => x < mid,
        Side::Right => x >= mid,
    }
}

/// Selects a tower prototype for `team`. The selection is cancelled when the
/// slot is unknown or the team cannot afford it.
pub fn select_tower(state: &mut GameState, slot: usize, team: Side) -> bool {
    let affordable = tower_prototype(slot)
        .map(|prototype| state.economy(team).can_afford(prototype.cost))
        .unwrap_or(false);

    if affordable {
        state.selection = Some(slot);
    } else {
        debug!("Cannot select tower {} for team {:?}", slot, team);
        state.selection = None;
    }
    affordable
}

/// Consumes the selection for a click at `x`. Returns the slot to build
/// unless nothing was selected or the click landed in the gap.
pub fn take_selection(state: &mut GameState, x: i32) -> Option<usize> {
    let slot = state.selection.take()?;
    if in_placement_gap(x) {
        debug!("Click at x={} is between the lanes", x);
        return None;
    }
    Some(slot)
}

/// Builds the `PLACE_TOWER` request for a click in a networked match.
///
/// The selection is always cleared. Nothing is sent without an assigned
/// player index or when the click is on the other team's half.
pub fn placement_request(
    state: &mut GameState,
    player_index: Option<i32>,
    x: i32,
    y: i32,
) -> Option<ClientPacket> {
    let slot = take_selection(state, x)?;
    let Some(player_index) = player_index else {
        debug!("No player index yet, dropping placement");
        return None;
    };

    if !on_team_side(Side::of_player(player_index), x) {
        debug!("Player {} cannot build at x={}", player_index, x);
        return None;
    }

    Some(ClientPacket::place_tower(player_index, slot as i32, x, y))
}

/// A tower placement given on the command line as `SLOT:X:Y`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedPlacement {
    pub slot: usize,
    pub x: i32,
    pub y: i32,
}

impl ScriptedPlacement {
    pub fn intents(&self) -> [InputIntent; 2] {
        [
            InputIntent::SelectTower(self.slot),
            InputIntent::PlaceAt {
                x: self.x,
                y: self.y,
            },
        ]
    }
}

/// Parses `SLOT:X:Y`. Used as a clap value parser.
pub fn parse_placement(text: &str) -> Result<ScriptedPlacement, String> {
    let parts: Vec<&str> = text.split(':').collect();
    let [slot, x, y] = parts.as_slice() else {
        return Err(format!("expected SLOT:X:Y, got '{}'", text));
    };

    let slot = slot
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid slot '{}': {}", slot, e))?;
    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid x '{}': {}", x, e))?;
    let y = y
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid y '{}': {}", y, e))?;

    Ok(ScriptedPlacement { slot, x, y })
}

/// Queue of intents waiting to be applied, one per frame
#[derive(Debug, Default)]
pub struct InputManager {
    pending: VecDeque<InputIntent>,
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(placements: &[ScriptedPlacement]) -> Self {
        let mut manager = Self::new();
        for placement in placements {
            manager.pending.extend(placement.intents());
        }
        manager
    }

    pub fn push(&mut self, intent: InputIntent) {
        self.pending.push_back(intent);
    }

    pub fn next_intent(&mut self) -> Option<InputIntent> {
        self.pending.pop_front()
    }

    pub fn peek(&self) -> Option<&InputIntent> {
        self.pending.front()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::protocol::ClientCommand;

    #[test]
    fn test_gap_bounds() {
        assert!(!in_placement_gap(718));
        assert!(in_placement_gap(722));
        assert!(in_placement_gap(750));
        assert!(in_placement_gap(778));
        assert!(!in_placement_gap(782));
    }

    #[test]
    fn test_team_sides() {
        assert!(on_team_side(Side::Left, 749));
        assert!(!on_team_side(Side::Left, 750));
        assert!(on_team_side(Side::Right, 750));
        assert!(!on_team_side(Side::Right, 749));
    }

    #[test]
    fn test_select_requires_money() {
        let mut state = GameState::new();
        assert!(select_tower(&mut state, 2, Side::Left));
        assert_eq!(state.selection, Some(2));

        // 400 with a 200 balance
        assert!(!select_tower(&mut state, 1, Side::Left));
        assert_eq!(state.selection, None);

        assert!(!select_tower(&mut state, 9, Side::Left));
    }

    #[test]
    fn test_placement_request_for_left_player() {
        let mut state = GameState::new();
        select_tower(&mut state, 2, Side::Left);

        let packet = placement_request(&mut state, Some(2), 300, 400).unwrap();
        assert_eq!(packet.command, ClientCommand::PlaceTower);
        assert_eq!(packet.player_index, 2);
        assert_eq!(packet.tower_type_index, 2);
        assert_eq!((packet.target_x, packet.target_y), (300, 400));
        assert_eq!(state.selection, None);
    }

    #[test]
    fn test_placement_rejected_on_wrong_half() {
        let mut state = GameState::new();
        select_tower(&mut state, 2, Side::Left);
        assert!(placement_request(&mut state, Some(0), 1200, 400).is_none());
        assert_eq!(state.selection, None);
    }

    #[test]
    fn test_placement_rejected_in_gap_or_without_index() {
        let mut state = GameState::new();
        select_tower(&mut state, 2, Side::Right);
        assert!(placement_request(&mut state, Some(1), 760, 400).is_none());
        assert_eq!(state.selection, None);

        select_tower(&mut state, 2, Side::Right);
        assert!(placement_request(&mut state, None, 1200, 400).is_none());
        assert_eq!(state.selection, None);
    }

    #[test]
    fn test_placement_without_selection() {
        let mut state = GameState::new();
        assert!(placement_request(&mut state, Some(0), 300, 400).is_none());
    }

    #[test]
    fn test_parse_placement() {
        let placement = parse_placement("2:300:450").unwrap();
        assert_eq!(
            placement,
            ScriptedPlacement {
                slot: 2,
                x: 300,
                y: 450
            }
        );

        assert!(parse_placement("2:300").is_err());
        assert!(parse_placement("a:1:2").is_err());
        assert!(parse_placement("1:2:3:4").is_err());
    }

    #[test]
    fn test_script_expands_in_order() {
        let script = [
            ScriptedPlacement { slot: 2, x: 100, y: 100 },
            ScriptedPlacement { slot: 0, x: 200, y: 200 },
        ];
        let mut input = InputManager::with_script(&script);

        assert_eq!(input.next_intent(), Some(InputIntent::SelectTower(2)));
        assert_eq!(input.next_intent(), Some(InputIntent::PlaceAt { x: 100, y: 100 }));
        assert_eq!(input.next_intent(), Some(InputIntent::SelectTower(0)));
        assert_eq!(input.next_intent(), Some(InputIntent::PlaceAt { x: 200, y: 200 }));
        assert!(input.is_empty());
    }
}
