use std::time::Instant;

use rand::Rng;

use crate::board::Board;

/// Everything the host loop can ask the puzzle to do. Invalid requests
/// (a `Move` on a non-adjacent cell, say) degrade to no-ops rather than
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shuffle,
    Move(usize),
    Restart,
    Start,
    SetStartTime(Instant),
    /// Debug: reset to one slide away from victory.
    NearWinShuffle,
}

/// Work the controller needs the host to do on its behalf. The controller
/// never reads the wall clock itself; it asks, and the host answers with
/// `Action::SetStartTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    StartTimer,
}

#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub board: Board,
    pub is_end: bool,
    pub start_time: Option<Instant>,
}

impl Session {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        Self {
            board: Board::shuffled(rng),
            is_end: false,
            start_time: None,
        }
    }
}

/// Applies one action and returns the next state plus any effects the
/// host must execute. `is_end` is recomputed from the board after every
/// action, even ones that cannot move tiles, and a win stops the clock.
pub fn transition<R: Rng>(
    state: &Session,
    action: Action,
    rng: &mut R,
) -> (Session, Vec<Effect>) {
    let mut next = *state;
    let mut effects = Vec::new();

    match action {
        Action::Shuffle => next.board = Board::shuffled(rng),
        Action::Move(index) => {
            next.board.slide(index);
        }
        Action::Restart => {
            next.board = Board::shuffled(rng);
            next.start_time = None;
            effects.push(Effect::StartTimer);
        }
        Action::Start => {
            if next.start_time.is_none() {
                effects.push(Effect::StartTimer);
            }
        }
        Action::SetStartTime(at) => next.start_time = Some(at),
        Action::NearWinShuffle => next.board = Board::near_win(rng),
    }

    next.is_end = next.board.is_solved();
    if next.is_end {
        next.start_time = None;
    }

    (next, effects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn near_solved_session() -> Session {
        // [1..14, blank, 15]: one slide short of the goal.
        let mut board = Board::solved();
        board.slide(14);
        Session {
            board,
            is_end: false,
            start_time: Some(Instant::now()),
        }
    }

    #[test]
    fn new_session_starts_shuffled() {
        let session = Session::new(&mut rng());
        assert!(session.board.is_solvable());
        assert!(!session.board.is_solved());
        assert!(!session.is_end);
        assert!(session.start_time.is_none());
    }

    #[test]
    fn shuffle_replaces_board_without_effects() {
        let session = Session::new(&mut rng());
        let (next, effects) = transition(&session, Action::Shuffle, &mut rng());
        assert!(next.board.is_solvable());
        assert!(!next.is_end);
        assert!(effects.is_empty());
    }

    #[test]
    fn winning_move_sets_end_and_stops_clock() {
        let session = near_solved_session();
        let (next, effects) = transition(&session, Action::Move(15), &mut rng());
        assert!(next.board.is_solved());
        assert!(next.is_end);
        assert!(next.start_time.is_none());
        assert!(effects.is_empty());
    }

    #[test]
    fn rejected_move_changes_nothing() {
        let session = near_solved_session();
        for index in [0, 5, 14, 99] {
            let (next, effects) = transition(&session, Action::Move(index), &mut rng());
            assert_eq!(next.board, session.board);
            assert!(!next.is_end);
            assert!(effects.is_empty());
        }
    }

    #[test]
    fn restart_recovers_from_a_won_game() {
        let won = Session {
            board: Board::solved(),
            is_end: true,
            start_time: None,
        };
        let (next, effects) = transition(&won, Action::Restart, &mut rng());
        assert!(!next.is_end);
        assert!(next.board.is_solvable());
        assert!(!next.board.is_solved());
        assert!(next.start_time.is_none());
        assert_eq!(effects, vec![Effect::StartTimer]);
    }

    #[test]
    fn start_is_idempotent_once_time_is_recorded() {
        let session = Session::new(&mut rng());
        let (next, effects) = transition(&session, Action::Start, &mut rng());
        assert_eq!(effects, vec![Effect::StartTimer]);

        let at = Instant::now();
        let (next, effects) = transition(&next, Action::SetStartTime(at), &mut rng());
        assert!(effects.is_empty());
        assert_eq!(next.start_time, Some(at));

        let (next, effects) = transition(&next, Action::Start, &mut rng());
        assert!(effects.is_empty());
        assert_eq!(next.start_time, Some(at));
    }

    #[test]
    fn end_flag_tracks_board_through_non_move_actions() {
        // A stale flag on a solved board is corrected by any action at
        // all, and the clock is cleared with it.
        let stale = Session {
            board: Board::solved(),
            is_end: false,
            start_time: Some(Instant::now()),
        };
        let (next, _) = transition(&stale, Action::SetStartTime(Instant::now()), &mut rng());
        assert!(next.is_end);
        assert!(next.start_time.is_none());
    }

    #[test]
    fn near_win_shuffle_is_one_move_out() {
        let session = Session::new(&mut rng());
        let (next, _) = transition(&session, Action::NearWinShuffle, &mut rng());
        assert!(!next.is_end);
        let (next, _) = transition(&next, Action::Move(15), &mut rng());
        assert!(next.is_end);
    }
}
