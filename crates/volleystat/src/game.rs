//! Live game tracking.
//!
//! [`GameState`] is the rally/point state machine. A rally moves through
//! three phases:
//!
//! - `Serve`: waiting for the serve result (ace, error or return).
//! - `Rally`: the ball is on our side; touches and blocks are recorded.
//! - `ConfirmReturn`: we sent the ball over and wait for the opponent's
//!   error or return.
//!
//! Every point sends the game back to `Serve`. `rally_step` is 0 when we
//! serve and odd when they serve; it grows by two each time the opponent
//! returns a ball we sent over, so its parity always names the server.
//!
//! The state is in memory only. Events are persisted when the caller saves
//! the rally log.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::lineup::Lineup;
use crate::rally::{
    resolve_touches, BlockOutcome, RallyEvent, RallyPhase, RallyResolution, ReturnOutcome,
    ServeOutcome, Side,
};
use crate::schedule::{Match, PointsToWin, SetFormat};
use crate::team::Player;

/// Regular set target.
pub const DEFAULT_SET_POINTS: u32 = 25;

/// Deciding set target under `25/15`.
pub const DEFAULT_DECIDING_SET_POINTS: u32 = 15;

/// Required winning margin.
pub const DEFAULT_WIN_BY: u32 = 2;

/// Scoring rules for a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    /// Number of sets played.
    pub set_format: SetFormat,
    /// Which sets use the short target.
    pub points_to_win: PointsToWin,
    /// Target of a regular set.
    pub set_points: u32,
    /// Target of a short deciding set.
    pub deciding_set_points: u32,
    /// Winning margin.
    pub win_by: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self::new(SetFormat::default(), PointsToWin::default())
    }
}

impl GameRules {
    /// Standard targets for the given format.
    #[must_use]
    pub fn new(set_format: SetFormat, points_to_win: PointsToWin) -> Self {
        Self {
            set_format,
            points_to_win,
            set_points: DEFAULT_SET_POINTS,
            deciding_set_points: DEFAULT_DECIDING_SET_POINTS,
            win_by: DEFAULT_WIN_BY,
        }
    }

    /// Rules of a scheduled match.
    #[must_use]
    pub fn for_match(scheduled: &Match) -> Self {
        Self::new(scheduled.set_format, scheduled.points_to_win)
    }

    /// Override the point targets.
    #[must_use]
    pub fn with_targets(mut self, set_points: u32, deciding_set_points: u32, win_by: u32) -> Self {
        self.set_points = set_points;
        self.deciding_set_points = deciding_set_points;
        self.win_by = win_by;
        self
    }

    /// Check whether `set_number` is the last possible set.
    #[must_use]
    pub fn is_deciding_set(&self, set_number: u8) -> bool {
        set_number >= self.set_format.max_sets()
    }

    /// Points needed to take `set_number`.
    #[must_use]
    pub fn target(&self, set_number: u8) -> u32 {
        if self.points_to_win.has_short_deciding_set() && self.is_deciding_set(set_number) {
            self.deciding_set_points
        } else {
            self.set_points
        }
    }

    /// Check whether `score` against `other` takes `set_number`.
    #[must_use]
    pub fn is_won(&self, set_number: u8, score: u32, other: u32) -> bool {
        score >= self.target(set_number) && score >= other + self.win_by
    }
}

/// Everything undo needs to restore.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Board {
    score_us: u32,
    score_them: u32,
    rotation: u8,
    rally_step: u32,
    phase: RallyPhase,
    game_over: bool,
    set_number: u8,
    sets_us: u8,
    sets_them: u8,
    match_over: bool,
    lineup: Lineup,
}

impl Board {
    fn fresh(lineup: Lineup) -> Self {
        Self {
            score_us: 0,
            score_them: 0,
            rotation: 1,
            rally_step: 0,
            phase: RallyPhase::Serve,
            game_over: false,
            set_number: 1,
            sets_us: 0,
            sets_them: 0,
            match_over: false,
            lineup,
        }
    }
}

/// What an action may touch, saved before it runs.
#[derive(Debug, Clone)]
struct Checkpoint {
    board: Board,
    event_count: usize,
    /// `point` of the last event, which a return error fills in.
    last_point: Option<Side>,
}

/// Live state of a match being tracked.
#[derive(Debug, Clone)]
pub struct GameState {
    rules: GameRules,
    board: Board,
    events: Vec<RallyEvent>,
    history: Vec<Checkpoint>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameRules::default())
    }
}

impl GameState {
    /// A fresh match under `rules`, us serving first.
    #[must_use]
    pub fn new(rules: GameRules) -> Self {
        Self {
            rules,
            board: Board::fresh(Lineup::new()),
            events: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Start with `lineup` on court. Not recorded in the undo history.
    #[must_use]
    pub fn with_lineup(mut self, lineup: Lineup) -> Self {
        self.board.lineup = lineup;
        self
    }

    /// A fresh game for a scheduled match.
    #[must_use]
    pub fn for_match(scheduled: &Match) -> Self {
        Self::new(GameRules::for_match(scheduled))
    }

    /// Scoring rules.
    #[must_use]
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Our score in the current set.
    #[must_use]
    pub fn score_us(&self) -> u32 {
        self.board.score_us
    }

    /// Their score in the current set.
    #[must_use]
    pub fn score_them(&self) -> u32 {
        self.board.score_them
    }

    /// Current rotation, 1..=6.
    #[must_use]
    pub fn rotation(&self) -> u8 {
        self.board.rotation
    }

    /// Current rally step.
    #[must_use]
    pub fn rally_step(&self) -> u32 {
        self.board.rally_step
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> RallyPhase {
        self.board.phase
    }

    /// Check whether the current set is over.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.board.game_over
    }

    /// Check whether the match has been decided.
    #[must_use]
    pub fn is_match_over(&self) -> bool {
        self.board.match_over
    }

    /// Current set, starting at 1.
    #[must_use]
    pub fn set_number(&self) -> u8 {
        self.board.set_number
    }

    /// Sets won by us.
    #[must_use]
    pub fn sets_us(&self) -> u8 {
        self.board.sets_us
    }

    /// Sets won by them.
    #[must_use]
    pub fn sets_them(&self) -> u8 {
        self.board.sets_them
    }

    /// Target of the current set.
    #[must_use]
    pub fn set_target(&self) -> u32 {
        self.rules.target(self.board.set_number)
    }

    /// Side serving the current rally.
    #[must_use]
    pub fn serving(&self) -> Side {
        if self.board.rally_step % 2 == 0 {
            Side::Us
        } else {
            Side::Them
        }
    }

    /// Winner of the current set once it is over.
    #[must_use]
    pub fn set_winner(&self) -> Option<Side> {
        if !self.board.game_over {
            return None;
        }
        if self.board.score_us > self.board.score_them {
            Some(Side::Us)
        } else {
            Some(Side::Them)
        }
    }

    /// Court lineup.
    #[must_use]
    pub fn lineup(&self) -> &Lineup {
        &self.board.lineup
    }

    /// Logged events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[RallyEvent] {
        &self.events
    }

    /// Check whether there is an action to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Clear everything back to a fresh match under the same rules.
    pub fn reset(&mut self) {
        self.board = Board::fresh(Lineup::new());
        self.events.clear();
        self.history.clear();
        debug!("Game reset");
    }

    /// Choose who serves first.
    ///
    /// # Errors
    ///
    /// Fails outside the serve phase or once the set is over.
    pub fn start(&mut self, first_serve: Side) -> Result<()> {
        self.ensure_live()?;
        self.expect_phase(RallyPhase::Serve, "choose the first server")?;
        self.checkpoint();
        self.board.rally_step = match first_serve {
            Side::Us => 0,
            Side::Them => 1,
        };
        Ok(())
    }

    /// Set the rotation between rallies.
    ///
    /// # Errors
    ///
    /// Fails for a rotation outside 1..=6 or outside the serve phase.
    pub fn set_rotation(&mut self, rotation: u8) -> Result<()> {
        if !(1..=6).contains(&rotation) {
            return Err(Error::lineup(format!(
                "rotation {rotation} is not between 1 and 6"
            )));
        }
        self.expect_phase(RallyPhase::Serve, "change the rotation")?;
        self.checkpoint();
        self.board.rotation = rotation;
        Ok(())
    }

    /// Replace the court lineup between rallies.
    ///
    /// # Errors
    ///
    /// Fails outside the serve phase.
    pub fn set_lineup(&mut self, lineup: Lineup) -> Result<()> {
        self.expect_phase(RallyPhase::Serve, "change the lineup")?;
        self.checkpoint();
        self.board.lineup = lineup;
        Ok(())
    }

    /// Substitute `incoming` for `out` during a dead ball.
    ///
    /// Returns the slot that changed.
    ///
    /// # Errors
    ///
    /// Fails outside the serve phase or when the lineup rejects the swap.
    pub fn substitute(&mut self, out: u16, incoming: u16, roster: &[Player]) -> Result<usize> {
        self.expect_phase(RallyPhase::Serve, "substitute")?;
        let mut lineup = self.board.lineup;
        let slot = lineup.substitute(out, incoming, roster)?;
        self.checkpoint();
        self.board.lineup = lineup;
        info!("Substitution: #{} in for #{} (slot {})", incoming, out, slot);
        Ok(slot)
    }

    /// Award a point to us outside the rally flow.
    ///
    /// Logs an event with no touches.
    ///
    /// # Errors
    ///
    /// Fails once the set is over.
    pub fn point_us(&mut self) -> Result<()> {
        self.manual_point(Side::Us)
    }

    /// Award a point to them outside the rally flow.
    ///
    /// # Errors
    ///
    /// Fails once the set is over.
    pub fn point_them(&mut self) -> Result<()> {
        self.manual_point(Side::Them)
    }

    fn manual_point(&mut self, side: Side) -> Result<()> {
        self.ensure_live()?;
        self.checkpoint();
        let event = self.new_event();
        self.events.push(event);
        self.award(side);
        Ok(())
    }

    /// Record the serve result.
    ///
    /// Ace and error are credited relative to the serving side: our ace is
    /// our point, their ace is theirs.
    ///
    /// # Errors
    ///
    /// Fails outside the serve phase or once the set is over.
    pub fn handle_serve(&mut self, outcome: ServeOutcome) -> Result<()> {
        self.ensure_live()?;
        self.expect_phase(RallyPhase::Serve, "record a serve")?;
        self.checkpoint();

        let server = self.server_label();
        let mut event = self.new_event();
        event.touch_serve = Some(format!("{}:{}", server, outcome.label()));
        self.events.push(event);

        let serving = self.serving();
        match (serving, outcome) {
            (Side::Us, ServeOutcome::Ace) | (Side::Them, ServeOutcome::Error) => {
                self.award(Side::Us);
            }
            (Side::Us, ServeOutcome::Error) | (Side::Them, ServeOutcome::Ace) => {
                self.award(Side::Them);
            }
            (_, ServeOutcome::Return) => {
                if serving == Side::Us {
                    self.board.rally_step += 2;
                }
                self.board.phase = RallyPhase::Rally;
            }
        }
        Ok(())
    }

    /// Record up to three touches on our side.
    ///
    /// Any touch containing "Error" or "Missed" gives them the point; else
    /// any "Kill" gives us the point; else an "Over" waits for their
    /// return. Otherwise the rally continues.
    ///
    /// # Errors
    ///
    /// Fails outside the rally phase or once the set is over.
    pub fn handle_rally(
        &mut self,
        touch_1: Option<String>,
        touch_2: Option<String>,
        touch_3: Option<String>,
    ) -> Result<RallyResolution> {
        self.ensure_live()?;
        self.expect_phase(RallyPhase::Rally, "record touches")?;
        self.checkpoint();

        let mut event = self.new_event();
        event.touch_1 = non_empty(touch_1);
        event.touch_2 = non_empty(touch_2);
        event.touch_3 = non_empty(touch_3);
        let resolution = resolve_touches(event.touches());
        self.events.push(event);

        match resolution {
            RallyResolution::PointThem => self.award(Side::Them),
            RallyResolution::PointUs => self.award(Side::Us),
            RallyResolution::Over => self.board.phase = RallyPhase::ConfirmReturn,
            RallyResolution::Continue => {}
        }
        Ok(resolution)
    }

    /// Record what the opponent did with a ball we sent over.
    ///
    /// Logs no event. An error marks the point on the event that sent the
    /// ball over.
    ///
    /// # Errors
    ///
    /// Fails outside the confirm-return phase or once the set is over.
    pub fn handle_return(&mut self, outcome: ReturnOutcome) -> Result<()> {
        self.ensure_live()?;
        self.expect_phase(RallyPhase::ConfirmReturn, "confirm their return")?;
        self.checkpoint();
        match outcome {
            ReturnOutcome::Error => self.award(Side::Us),
            ReturnOutcome::Return => {
                self.board.rally_step += 2;
                self.board.phase = RallyPhase::Rally;
            }
        }
        Ok(())
    }

    /// Record a block at the net.
    ///
    /// Kill and assist score for us, a block error scores for them, a
    /// plain block sends the ball back over and a tip keeps it on our side.
    ///
    /// # Errors
    ///
    /// Fails outside the rally phase, once the set is over, or when an
    /// assist names no second blocker (or the blocker themself).
    pub fn handle_block(
        &mut self,
        blocker: u16,
        outcome: BlockOutcome,
        assist: Option<u16>,
    ) -> Result<()> {
        self.ensure_live()?;
        self.expect_phase(RallyPhase::Rally, "record a block")?;
        let assist = match (outcome, assist) {
            (BlockOutcome::Assist, None) => {
                return Err(Error::lineup("a block assist needs a second blocker"));
            }
            (BlockOutcome::Assist, Some(a)) if a == blocker => {
                return Err(Error::lineup("a player cannot assist their own block"));
            }
            (BlockOutcome::Assist, Some(a)) => Some(a),
            (_, _) => None,
        };

        if self.board.lineup.is_complete()
            && !self
                .board
                .lineup
                .front_row(self.board.rotation)
                .contains(&Some(blocker))
        {
            warn!("#{} blocked from the back row", blocker);
        }

        self.checkpoint();
        let mut event = self.new_event();
        event.touch_block = Some(format!("{}:{}", blocker, outcome.label()));
        event.touch_block_assist = assist.map(|a| format!("{a}:Block:Assist"));
        self.events.push(event);

        match outcome {
            BlockOutcome::Kill | BlockOutcome::Assist => self.award(Side::Us),
            BlockOutcome::Error => self.award(Side::Them),
            BlockOutcome::Block => self.board.phase = RallyPhase::ConfirmReturn,
            BlockOutcome::Tip => {}
        }
        Ok(())
    }

    /// Move on to the next set once the current one is over.
    ///
    /// Scores, rotation and phase reset; the lineup carries over.
    ///
    /// # Errors
    ///
    /// Fails while the set is still being played or after the match is
    /// decided.
    pub fn start_next_set(&mut self, first_serve: Side) -> Result<()> {
        if self.board.match_over {
            return Err(Error::MatchOver);
        }
        if !self.board.game_over {
            return Err(Error::SetInProgress(self.board.set_number));
        }
        self.checkpoint();
        let board = &mut self.board;
        board.score_us = 0;
        board.score_them = 0;
        board.rotation = 1;
        board.rally_step = match first_serve {
            Side::Us => 0,
            Side::Them => 1,
        };
        board.phase = RallyPhase::Serve;
        board.game_over = false;
        board.set_number += 1;
        info!("Starting set {}", board.set_number);
        Ok(())
    }

    /// Revert the most recent action. Returns `false` if there was none.
    pub fn undo(&mut self) -> bool {
        let Some(checkpoint) = self.history.pop() else {
            return false;
        };
        self.board = checkpoint.board;
        self.events.truncate(checkpoint.event_count);
        if let Some(last) = self.events.last_mut() {
            last.point = checkpoint.last_point;
        }
        debug!("Undid last action");
        true
    }

    fn checkpoint(&mut self) {
        self.history.push(Checkpoint {
            board: self.board.clone(),
            event_count: self.events.len(),
            last_point: self.events.last().and_then(|e| e.point),
        });
    }

    fn ensure_live(&self) -> Result<()> {
        if self.board.match_over {
            Err(Error::MatchOver)
        } else if self.board.game_over {
            Err(Error::SetOver(self.board.set_number))
        } else {
            Ok(())
        }
    }

    fn expect_phase(&self, phase: RallyPhase, action: &'static str) -> Result<()> {
        if self.board.phase == phase {
            Ok(())
        } else {
            Err(Error::WrongPhase {
                action,
                phase: self.board.phase.name(),
            })
        }
    }

    fn new_event(&self) -> RallyEvent {
        let mut event = RallyEvent::new(
            self.board.rotation,
            self.board.score_us,
            self.board.score_them,
            self.board.rally_step,
        );
        event.set_number = self.board.set_number;
        event.lineup = self.board.lineup;
        event
    }

    /// Our server's jersey, `P<rotation>` when unknown, or `Them`.
    fn server_label(&self) -> String {
        match self.serving() {
            Side::Us => self
                .board
                .lineup
                .server(self.board.rotation)
                .map_or_else(|| format!("P{}", self.board.rotation), |j| j.to_string()),
            Side::Them => "Them".to_string(),
        }
    }

    /// Score the rally for `side`. The rally's event must already be logged.
    fn award(&mut self, side: Side) {
        if let Some(last) = self.events.last_mut() {
            last.point = Some(side);
        }
        let board = &mut self.board;
        match side {
            Side::Us => {
                board.score_us += 1;
                // Side-out: we win the serve back and rotate
                if board.rally_step % 2 == 1 {
                    board.rotation = board.rotation % 6 + 1;
                }
                board.rally_step = 0;
            }
            Side::Them => {
                board.score_them += 1;
                board.rally_step = 1;
            }
        }
        board.phase = RallyPhase::Serve;
        debug!(
            "Point {}: {}-{} (rotation {})",
            side, board.score_us, board.score_them, board.rotation
        );
        self.check_game_over();
    }

    fn check_game_over(&mut self) {
        let board = &mut self.board;
        let winner = if self.rules.is_won(board.set_number, board.score_us, board.score_them) {
            Side::Us
        } else if self.rules.is_won(board.set_number, board.score_them, board.score_us) {
            Side::Them
        } else {
            return;
        };

        board.game_over = true;
        match winner {
            Side::Us => board.sets_us += 1,
            Side::Them => board.sets_them += 1,
        }
        info!(
            "Set {} to {}: {}-{}",
            board.set_number, winner, board.score_us, board.score_them
        );
        if self.rules.set_format.is_decided(board.sets_us, board.sets_them) {
            board.match_over = true;
            info!("Match over: {}-{} in sets", board.sets_us, board.sets_them);
        }
    }
}

fn non_empty(touch: Option<String>) -> Option<String> {
    touch
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn win_set(game: &mut GameState, side: Side) {
        while !game.is_game_over() {
            match side {
                Side::Us => game.point_us().unwrap(),
                Side::Them => game.point_them().unwrap(),
            }
        }
    }

    fn roster(jerseys: &[u16]) -> Vec<Player> {
        jerseys
            .iter()
            .map(|j| Player::new(format!("P{j}"), *j, ""))
            .collect()
    }

    #[test]
    fn test_fresh_game() {
        let game = GameState::default();
        assert_eq!(game.score_us(), 0);
        assert_eq!(game.score_them(), 0);
        assert_eq!(game.rotation(), 1);
        assert_eq!(game.rally_step(), 0);
        assert_eq!(game.phase(), RallyPhase::Serve);
        assert_eq!(game.serving(), Side::Us);
        assert!(!game.is_game_over());
        assert!(!game.can_undo());
    }

    #[test]
    fn test_start_sets_server() {
        let mut game = GameState::default();
        game.start(Side::Them).unwrap();
        assert_eq!(game.rally_step(), 1);
        assert_eq!(game.serving(), Side::Them);
    }

    #[test]
    fn test_point_us_on_our_serve_keeps_rotation() {
        let mut game = GameState::default();
        game.point_us().unwrap();
        assert_eq!(game.score_us(), 1);
        assert_eq!(game.rotation(), 1);
        assert_eq!(game.rally_step(), 0);
    }

    #[test]
    fn test_side_out_rotates() {
        let mut game = GameState::default();
        game.point_them().unwrap();
        assert_eq!(game.rally_step(), 1);

        game.point_us().unwrap();
        assert_eq!(game.rotation(), 2);
        assert_eq!(game.rally_step(), 0);
    }

    #[test]
    fn test_rotation_wraps_after_six() {
        let mut game = GameState::default();
        game.set_rotation(6).unwrap();
        game.start(Side::Them).unwrap();
        game.point_us().unwrap();
        assert_eq!(game.rotation(), 1);
    }

    #[test]
    fn test_set_rotation_bounds() {
        let mut game = GameState::default();
        assert!(game.set_rotation(0).is_err());
        assert!(game.set_rotation(7).is_err());
    }

    #[test]
    fn test_game_over_needs_target_and_margin() {
        let mut game = GameState::default();
        for _ in 0..24 {
            game.point_us().unwrap();
            game.point_them().unwrap();
        }
        // 24-24
        game.point_us().unwrap();
        assert!(!game.is_game_over(), "25-24 is not a win");
        game.point_us().unwrap();
        assert!(game.is_game_over());
        assert_eq!(game.set_winner(), Some(Side::Us));
        assert_eq!(game.sets_us(), 1);
    }

    #[test]
    fn test_them_win_at_25() {
        let mut game = GameState::default();
        win_set(&mut game, Side::Them);
        assert_eq!(game.score_them(), 25);
        assert_eq!(game.score_us(), 0);
        assert_eq!(game.set_winner(), Some(Side::Them));
    }

    #[test]
    fn test_actions_rejected_after_set_over() {
        let mut game = GameState::default();
        win_set(&mut game, Side::Us);
        assert!(matches!(game.point_us(), Err(Error::SetOver(1))));
        assert!(matches!(
            game.handle_serve(ServeOutcome::Ace),
            Err(Error::SetOver(1))
        ));
    }

    #[test]
    fn test_serve_ace_and_error_when_we_serve() {
        let mut game = GameState::default();
        game.handle_serve(ServeOutcome::Ace).unwrap();
        assert_eq!(game.score_us(), 1);

        game.handle_serve(ServeOutcome::Error).unwrap();
        assert_eq!(game.score_them(), 1);
        assert_eq!(game.serving(), Side::Them);

        let serves: Vec<_> = game
            .events()
            .iter()
            .map(|e| e.touch_serve.clone().unwrap())
            .collect();
        assert_eq!(serves, vec!["P1:Ace", "P1:Error"]);
    }

    #[test]
    fn test_their_serve_is_credited_to_them() {
        let mut game = GameState::default();
        game.start(Side::Them).unwrap();
        game.handle_serve(ServeOutcome::Ace).unwrap();
        assert_eq!(game.score_them(), 1);
        assert_eq!(game.events()[0].touch_serve.as_deref(), Some("Them:Ace"));

        game.handle_serve(ServeOutcome::Error).unwrap();
        assert_eq!(game.score_us(), 1);
        assert_eq!(game.rotation(), 2);
    }

    #[test]
    fn test_serve_uses_lineup_jersey() {
        let players = roster(&[3, 5, 8, 10, 11, 14]);
        let mut game = GameState::default();
        game.set_lineup(Lineup::from_roster(&players)).unwrap();
        game.set_rotation(2).unwrap();
        game.handle_serve(ServeOutcome::Ace).unwrap();
        assert_eq!(game.events()[0].touch_serve.as_deref(), Some("5:Ace"));
    }

    #[test]
    fn test_serve_return_enters_rally() {
        let mut game = GameState::default();
        game.handle_serve(ServeOutcome::Return).unwrap();
        assert_eq!(game.phase(), RallyPhase::Rally);
        assert_eq!(game.rally_step(), 2);
        assert_eq!(game.serving(), Side::Us);
    }

    #[test]
    fn test_event_records_state_before_point() {
        let mut game = GameState::default();
        game.point_us().unwrap();
        game.handle_serve(ServeOutcome::Ace).unwrap();
        let event = &game.events()[1];
        assert_eq!(event.score_us, 1);
        assert_eq!(event.score_them, 0);
        assert_eq!(event.set_number, 1);
        assert_eq!(game.score_us(), 2);
    }

    #[test]
    fn test_manual_point_logs_event() {
        let mut game = GameState::default();
        game.point_them().unwrap();
        game.point_us().unwrap();
        let points: Vec<_> = game.events().iter().map(|e| e.point).collect();
        assert_eq!(points, vec![Some(Side::Them), Some(Side::Us)]);
        assert!(game.events()[0].touches().next().is_none());
        assert_eq!(game.events()[1].rally_step, 1);
    }

    #[test]
    fn test_events_record_point_winner() {
        let mut game = GameState::default();
        game.handle_serve(ServeOutcome::Ace).unwrap();
        game.handle_serve(ServeOutcome::Return).unwrap();
        game.handle_rally(touch("10:Pass:OK"), None, None).unwrap();
        game.handle_block(4, BlockOutcome::Error, None).unwrap();

        let points: Vec<_> = game.events().iter().map(|e| e.point).collect();
        assert_eq!(points, vec![Some(Side::Us), None, None, Some(Side::Them)]);
    }

    #[test]
    fn test_events_record_lineup_on_court() {
        let players = roster(&[3, 5, 8, 10, 11, 14, 20]);
        let mut game = GameState::default().with_lineup(Lineup::from_roster(&players));
        game.handle_serve(ServeOutcome::Error).unwrap();
        game.substitute(3, 20, &players).unwrap();
        game.point_us().unwrap();

        let first = &game.events()[0];
        assert_eq!(first.lineup.get(3), Some(8));
        assert_eq!(first.lineup.slots(), Lineup::from_roster(&players).slots());
        let second = &game.events()[1];
        assert_eq!(second.lineup.get(3), Some(20));
        assert_eq!(second.rotation, 1);
    }

    #[test]
    fn test_rally_kill() {
        let mut game = GameState::default();
        game.start(Side::Them).unwrap();
        game.handle_serve(ServeOutcome::Return).unwrap();
        let r = game
            .handle_rally(touch("10:Pass:OK"), touch("11:Set:OK"), touch("12:Attack:Kill"))
            .unwrap();
        assert_eq!(r, RallyResolution::PointUs);
        assert_eq!(game.score_us(), 1);
        assert_eq!(game.rotation(), 2);
        assert_eq!(game.phase(), RallyPhase::Serve);
    }

    #[test]
    fn test_rally_error() {
        let mut game = GameState::default();
        game.handle_serve(ServeOutcome::Return).unwrap();
        game.handle_rally(touch("10:Dig:Error"), None, None).unwrap();
        assert_eq!(game.score_them(), 1);
        assert_eq!(game.phase(), RallyPhase::Serve);
    }

    #[test]
    fn test_rally_continue_skips_blank_touches() {
        let mut game = GameState::default();
        game.handle_serve(ServeOutcome::Return).unwrap();
        let r = game
            .handle_rally(touch("10:Pass:2"), touch("  "), None)
            .unwrap();
        assert_eq!(r, RallyResolution::Continue);
        assert_eq!(game.phase(), RallyPhase::Rally);
        assert!(game.events()[1].touch_2.is_none());
    }

    #[test]
    fn test_over_then_return_then_error() {
        let mut game = GameState::default();
        game.handle_serve(ServeOutcome::Return).unwrap();
        game.handle_rally(touch("10:Pass:OK"), touch("11:Set:OK"), touch("12:Attack:Over"))
            .unwrap();
        assert_eq!(game.phase(), RallyPhase::ConfirmReturn);

        game.handle_return(ReturnOutcome::Return).unwrap();
        assert_eq!(game.phase(), RallyPhase::Rally);
        assert_eq!(game.rally_step(), 4);

        game.handle_rally(touch("4:Attack:Over"), None, None).unwrap();
        game.handle_return(ReturnOutcome::Error).unwrap();
        assert_eq!(game.score_us(), 1);
        assert_eq!(game.rotation(), 1);
        assert_eq!(game.phase(), RallyPhase::Serve);
        assert_eq!(game.events().len(), 3);
        assert_eq!(game.events()[1].point, None);
        assert_eq!(game.events()[2].point, Some(Side::Us));
    }

    #[test]
    fn test_undo_return_error_clears_point() {
        let mut game = GameState::default();
        game.handle_serve(ServeOutcome::Return).unwrap();
        game.handle_rally(touch("12:Attack:Over"), None, None).unwrap();
        game.handle_return(ReturnOutcome::Error).unwrap();
        assert_eq!(game.events()[1].point, Some(Side::Us));

        assert!(game.undo());
        assert_eq!(game.phase(), RallyPhase::ConfirmReturn);
        assert_eq!(game.events().len(), 2);
        assert_eq!(game.events()[1].point, None);

        game.handle_return(ReturnOutcome::Return).unwrap();
        game.handle_block(2, BlockOutcome::Error, None).unwrap();
        assert_eq!(game.events()[1].point, None);
        assert_eq!(game.events()[2].point, Some(Side::Them));
    }

    #[test]
    fn test_wrong_phase_is_rejected() {
        let mut game = GameState::default();
        let err = game.handle_rally(touch("1:Pass:OK"), None, None).unwrap_err();
        assert!(matches!(err, Error::WrongPhase { phase: "serve", .. }));
        assert!(game.handle_return(ReturnOutcome::Error).is_err());
        assert!(game.handle_block(4, BlockOutcome::Kill, None).is_err());
        assert!(game.events().is_empty());
    }

    #[test]
    fn test_block_kill_and_assist() {
        let mut game = GameState::default();
        game.handle_serve(ServeOutcome::Return).unwrap();
        game.handle_block(4, BlockOutcome::Assist, Some(3)).unwrap();
        assert_eq!(game.score_us(), 1);
        let event = game.events().last().unwrap();
        assert_eq!(event.touch_block.as_deref(), Some("4:Block:Assist"));
        assert_eq!(event.touch_block_assist.as_deref(), Some("3:Block:Assist"));

        game.handle_serve(ServeOutcome::Return).unwrap();
        game.handle_block(4, BlockOutcome::Kill, None).unwrap();
        assert_eq!(game.score_us(), 2);
    }

    #[test]
    fn test_block_assist_requires_partner() {
        let mut game = GameState::default();
        game.handle_serve(ServeOutcome::Return).unwrap();
        assert!(game.handle_block(4, BlockOutcome::Assist, None).is_err());
        assert!(game.handle_block(4, BlockOutcome::Assist, Some(4)).is_err());
        assert_eq!(game.events().len(), 1);
    }

    #[test]
    fn test_block_soft_outcomes() {
        let mut game = GameState::default();
        game.handle_serve(ServeOutcome::Return).unwrap();
        game.handle_block(2, BlockOutcome::Tip, None).unwrap();
        assert_eq!(game.phase(), RallyPhase::Rally);
        game.handle_block(2, BlockOutcome::Block, None).unwrap();
        assert_eq!(game.phase(), RallyPhase::ConfirmReturn);
        game.handle_return(ReturnOutcome::Return).unwrap();
        game.handle_block(2, BlockOutcome::Error, None).unwrap();
        assert_eq!(game.score_them(), 1);
    }

    #[test]
    fn test_undo_restores_score_and_events() {
        let mut game = GameState::default();
        game.start(Side::Them).unwrap();
        game.handle_serve(ServeOutcome::Error).unwrap();
        assert_eq!(game.score_us(), 1);
        assert_eq!(game.rotation(), 2);

        assert!(game.undo());
        assert_eq!(game.score_us(), 0);
        assert_eq!(game.rotation(), 1);
        assert_eq!(game.serving(), Side::Them);
        assert!(game.events().is_empty());

        assert!(game.undo());
        assert_eq!(game.serving(), Side::Us);
        assert!(!game.undo());
    }

    #[test]
    fn test_undo_reopens_finished_set() {
        let mut game = GameState::default();
        win_set(&mut game, Side::Us);
        assert!(game.undo());
        assert!(!game.is_game_over());
        assert_eq!(game.sets_us(), 0);
        assert_eq!(game.score_us(), 24);
    }

    #[test]
    fn test_substitute_in_dead_ball_only() {
        let players = roster(&[1, 2, 3, 4, 5, 6, 9]);
        let mut game = GameState::default();
        game.set_lineup(Lineup::from_roster(&players)).unwrap();

        assert_eq!(game.substitute(2, 9, &players).unwrap(), 2);
        assert_eq!(game.lineup().get(2), Some(9));

        game.handle_serve(ServeOutcome::Return).unwrap();
        assert!(game.substitute(9, 2, &players).is_err());
    }

    #[test]
    fn test_next_set_requires_finished_set() {
        let mut game = GameState::default();
        assert!(matches!(
            game.start_next_set(Side::Us),
            Err(Error::SetInProgress(1))
        ));

        win_set(&mut game, Side::Them);
        game.start_next_set(Side::Us).unwrap();
        assert_eq!(game.set_number(), 2);
        assert_eq!(game.score_them(), 0);
        assert_eq!(game.sets_them(), 1);
        assert_eq!(game.phase(), RallyPhase::Serve);
    }

    #[test]
    fn test_best_of_three_deciding_set_to_fifteen() {
        let rules = GameRules::new(SetFormat::BestOf3, PointsToWin::TwentyFiveFifteen);
        let mut game = GameState::new(rules);
        win_set(&mut game, Side::Us);
        game.start_next_set(Side::Them).unwrap();
        win_set(&mut game, Side::Them);
        game.start_next_set(Side::Us).unwrap();

        assert_eq!(game.set_target(), 15);
        win_set(&mut game, Side::Us);
        assert_eq!(game.score_us(), 15);
        assert!(game.is_match_over());
        assert!(matches!(game.start_next_set(Side::Us), Err(Error::MatchOver)));
    }

    #[test]
    fn test_twenty_five_rule_has_no_short_set() {
        let rules = GameRules::new(SetFormat::BestOf3, PointsToWin::TwentyFive);
        assert_eq!(rules.target(3), 25);
    }

    #[test]
    fn test_always_play_three() {
        let rules = GameRules::new(SetFormat::AlwaysPlay3, PointsToWin::TwentyFive);
        let mut game = GameState::new(rules);
        win_set(&mut game, Side::Us);
        game.start_next_set(Side::Us).unwrap();
        win_set(&mut game, Side::Us);
        assert!(!game.is_match_over());
        game.start_next_set(Side::Us).unwrap();
        win_set(&mut game, Side::Them);
        assert!(game.is_match_over());
        assert_eq!((game.sets_us(), game.sets_them()), (2, 1));
    }

    #[test]
    fn test_best_of_five_ends_at_three() {
        let mut game = GameState::default();
        for set in 0..3 {
            if set > 0 {
                game.start_next_set(Side::Us).unwrap();
            }
            win_set(&mut game, Side::Us);
        }
        assert!(game.is_match_over());
        assert_eq!(game.set_number(), 3);
    }

    #[test]
    fn test_custom_targets() {
        let rules = GameRules::default().with_targets(21, 15, 2);
        let mut game = GameState::new(rules);
        win_set(&mut game, Side::Us);
        assert_eq!(game.score_us(), 21);
    }

    #[test]
    fn test_reset() {
        let mut game = GameState::default();
        game.handle_serve(ServeOutcome::Ace).unwrap();
        game.reset();
        assert_eq!(game.score_us(), 0);
        assert!(game.events().is_empty());
        assert!(!game.can_undo());
    }
}
