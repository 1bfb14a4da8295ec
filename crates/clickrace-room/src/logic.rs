//! Room state and game rules.
//!
//! [`Room`] is plain data with synchronous methods; the actor in `room.rs`
//! owns one and decides who hears about each change.

use clickrace_protocol::{GameResult, PlayerSnapshot, RoomCode, Winner};
use clickrace_transport::ConnectionId;

use crate::{RoomError, RoomPhase};

/// A seated player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// The connection this player arrived on.
    pub connection: ConnectionId,
    /// Display name exactly as the client sent it.
    pub name: String,
    /// Last score a client reported for this seat.
    pub score: u32,
}

impl Player {
    /// A freshly seated player with score 0.
    pub fn new(connection: ConnectionId, name: impl Into<String>) -> Self {
        Self {
            connection,
            name: name.into(),
            score: 0,
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            name: self.name.clone(),
            score: self.score,
        }
    }
}

/// One two-seat room.
#[derive(Debug, Clone)]
pub struct Room {
    code: RoomCode,
    player1: Player,
    player2: Option<Player>,
    game_active: bool,
    games_finished: u32,
}

impl Room {
    /// Opens a room with `creator` in the first seat.
    pub fn new(code: RoomCode, creator: Player) -> Self {
        Self {
            code,
            player1: creator,
            player2: None,
            game_active: false,
            games_finished: 0,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn player1(&self) -> &Player {
        &self.player1
    }

    pub fn player2(&self) -> Option<&Player> {
        self.player2.as_ref()
    }

    pub fn is_game_active(&self) -> bool {
        self.game_active
    }

    pub fn player_count(&self) -> usize {
        1 + usize::from(self.player2.is_some())
    }

    pub fn phase(&self) -> RoomPhase {
        if self.player2.is_none() {
            RoomPhase::WaitingForOpponent
        } else if self.game_active {
            RoomPhase::Active
        } else if self.games_finished > 0 {
            RoomPhase::Finished
        } else {
            RoomPhase::Ready
        }
    }

    /// Seats `joiner` as player 2 and returns both players as they should
    /// be announced.
    ///
    /// Any connection may join, including the creator's own.
    ///
    /// # Errors
    /// [`RoomError::RoomFull`] if player 2 is already seated.
    pub fn join(
        &mut self,
        joiner: Player,
    ) -> Result<(PlayerSnapshot, PlayerSnapshot), RoomError> {
        if self.player2.is_some() {
            return Err(RoomError::RoomFull(self.code.clone()));
        }
        let second = joiner.snapshot();
        self.player2 = Some(joiner);
        Ok((self.player1.snapshot(), second))
    }

    /// Overwrites both scores with whatever the client reported and returns
    /// the stored pair. With the second seat empty only player 1's score is
    /// kept and player 2 reads as 0.
    pub fn update_scores(&mut self, player1_score: u32, player2_score: u32) -> (u32, u32) {
        self.player1.score = player1_score;
        if let Some(p2) = &mut self.player2 {
            p2.score = player2_score;
        }
        self.scores()
    }

    /// Zeroes the scores of whoever is seated and marks the game active.
    pub fn start(&mut self) {
        self.player1.score = 0;
        if let Some(p2) = &mut self.player2 {
            p2.score = 0;
        }
        self.game_active = true;
    }

    /// Decides the winner from the current scores and marks the game
    /// inactive. The room keeps both players; another `start` begins a
    /// rematch.
    ///
    /// # Errors
    /// [`RoomError::WaitingForOpponent`] if the second seat is empty.
    pub fn end(&mut self) -> Result<GameResult, RoomError> {
        let p2 = self
            .player2
            .as_ref()
            .ok_or_else(|| RoomError::WaitingForOpponent(self.code.clone()))?;
        let p1 = &self.player1;

        let winner = Winner::from_scores(p1.score, p2.score);
        let winner_name = match winner {
            Winner::Player1 => Some(p1.name.clone()),
            Winner::Player2 => Some(p2.name.clone()),
            Winner::Tie => None,
        };
        let result = GameResult {
            winner,
            winner_name,
            player1_score: p1.score,
            player2_score: p2.score,
            player1_name: p1.name.clone(),
            player2_name: p2.name.clone(),
        };

        self.game_active = false;
        self.games_finished += 1;
        Ok(result)
    }

    /// Current `(player1, player2)` scores; an empty seat reads 0.
    pub fn scores(&self) -> (u32, u32) {
        (
            self.player1.score,
            self.player2.as_ref().map_or(0, |p| p.score),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn open_room() -> Room {
        Room::new(RoomCode::new("AB12CD"), Player::new(conn(1), "ada"))
    }

    fn full_room() -> Room {
        let mut room = open_room();
        room.join(Player::new(conn(2), "grace")).expect("second seat free");
        room
    }

    // =====================================================================
    // join()
    // =====================================================================

    #[test]
    fn test_join_fills_second_seat_and_announces_both() {
        let mut room = open_room();
        assert_eq!(room.phase(), RoomPhase::WaitingForOpponent);

        let (p1, p2) = room.join(Player::new(conn(2), "grace")).unwrap();

        assert_eq!(p1, PlayerSnapshot { name: "ada".into(), score: 0 });
        assert_eq!(p2, PlayerSnapshot { name: "grace".into(), score: 0 });
        assert_eq!(room.player_count(), 2);
        assert_eq!(room.phase(), RoomPhase::Ready);
    }

    #[test]
    fn test_join_twice_is_room_full() {
        let mut room = full_room();
        let result = room.join(Player::new(conn(3), "linus"));
        assert!(matches!(result, Err(RoomError::RoomFull(code)) if code.as_str() == "AB12CD"));
        assert_eq!(room.player2().unwrap().name, "grace");
    }

    #[test]
    fn test_join_announces_stored_creator_score() {
        // Scores may already be non-zero if updateScore arrived first.
        let mut room = open_room();
        room.update_scores(9, 0);
        let (p1, _) = room.join(Player::new(conn(2), "grace")).unwrap();
        assert_eq!(p1.score, 9);
    }

    // =====================================================================
    // update_scores() / start()
    // =====================================================================

    #[test]
    fn test_update_scores_overwrites_both_unconditionally() {
        let mut room = full_room();
        assert_eq!(room.update_scores(5, 3), (5, 3));
        // Lower values are accepted too; no monotonicity.
        assert_eq!(room.update_scores(1, 0), (1, 0));
    }

    #[test]
    fn test_update_scores_without_opponent_keeps_player1_only() {
        let mut room = open_room();
        assert_eq!(room.update_scores(4, 7), (4, 0));
        assert_eq!(room.player1().score, 4);
    }

    #[test]
    fn test_start_resets_scores_and_activates() {
        let mut room = full_room();
        room.update_scores(12, 30);

        room.start();

        assert_eq!(room.scores(), (0, 0));
        assert!(room.is_game_active());
        assert_eq!(room.phase(), RoomPhase::Active);
    }

    #[test]
    fn test_start_without_opponent_is_allowed() {
        let mut room = open_room();
        room.update_scores(3, 0);
        room.start();
        assert_eq!(room.scores(), (0, 0));
        assert!(room.is_game_active());
    }

    // =====================================================================
    // end()
    // =====================================================================

    fn ended_with(score1: u32, score2: u32) -> GameResult {
        let mut room = full_room();
        room.start();
        room.update_scores(score1, score2);
        room.end().expect("two players seated")
    }

    #[test]
    fn test_end_player1_wins() {
        let result = ended_with(5, 3);
        assert_eq!(result.winner, Winner::Player1);
        assert_eq!(result.winner_name.as_deref(), Some("ada"));
        assert_eq!((result.player1_score, result.player2_score), (5, 3));
        assert_eq!(result.player1_name, "ada");
        assert_eq!(result.player2_name, "grace");
    }

    #[test]
    fn test_end_player2_wins() {
        let result = ended_with(3, 5);
        assert_eq!(result.winner, Winner::Player2);
        assert_eq!(result.winner_name.as_deref(), Some("grace"));
    }

    #[test]
    fn test_end_tie_has_no_winner_name() {
        let result = ended_with(4, 4);
        assert_eq!(result.winner, Winner::Tie);
        assert_eq!(result.winner_name, None);
    }

    #[test]
    fn test_end_marks_inactive_but_keeps_players() {
        let mut room = full_room();
        room.start();
        room.end().unwrap();

        assert!(!room.is_game_active());
        assert_eq!(room.phase(), RoomPhase::Finished);
        assert_eq!(room.player_count(), 2);
    }

    #[test]
    fn test_end_without_opponent_fails() {
        let mut room = open_room();
        let result = room.end();
        assert!(matches!(result, Err(RoomError::WaitingForOpponent(_))));
    }

    #[test]
    fn test_end_without_start_uses_current_scores() {
        // Nothing enforces start-before-end.
        let mut room = full_room();
        room.update_scores(2, 8);
        assert_eq!(room.end().unwrap().winner, Winner::Player2);
    }
}
