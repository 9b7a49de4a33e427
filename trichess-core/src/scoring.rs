//! Material scores and game termination

use crate::board::Board;
use crate::pieces::PieceType;
use crate::position::Colour;

impl Board {
    /// Material on the board plus everything this colour has captured
    pub fn score(&self, colour: Colour) -> i32 {
        let on_board: i32 = self
            .squares
            .values()
            .filter(|p| p.colour == colour)
            .map(|p| p.value())
            .sum();
        let taken: i32 = self.captured(colour).iter().map(|p| p.value()).sum();
        on_board + taken
    }

    /// All three scores, indexed by colour
    pub fn scores(&self) -> [i32; 3] {
        Colour::ALL.map(|c| self.score(c))
    }

    /// Whether any clock has gone negative
    pub fn is_timed_out(&self) -> bool {
        self.time_left.iter().any(|&t| t < 0)
    }

    /// Colour whose clock ran out, if any
    fn clocked_out(&self) -> Option<Colour> {
        Colour::ALL.into_iter().find(|&c| self.time_left(c) < 0)
    }

    /// Colour that took a king, together with the king's colour
    fn king_capture(&self) -> Option<(Colour, Colour)> {
        Colour::ALL.into_iter().find_map(|capturer| {
            self.captured(capturer)
                .iter()
                .find(|p| p.kind == PieceType::King)
                .map(|king| (capturer, king.colour))
        })
    }

    /// Winner of a finished game.
    ///
    /// The king-taker wins; after a clock-out the best score among the other
    /// two wins, ties going to the earlier colour in turn order.
    pub fn winner(&self) -> Option<Colour> {
        if !self.game_over {
            return None;
        }
        if let Some((capturer, _)) = self.king_capture() {
            return Some(capturer);
        }
        let loser = self.clocked_out()?;
        let mut best: Option<Colour> = None;
        for colour in Colour::ALL.into_iter().filter(|&c| c != loser) {
            if best.map_or(true, |b| self.score(colour) > self.score(b)) {
                best = Some(colour);
            }
        }
        best
    }

    /// Loser of a finished game: the colour whose king was taken, or whose clock ran out
    pub fn loser(&self) -> Option<Colour> {
        if !self.game_over {
            return None;
        }
        match self.king_capture() {
            Some((_, king)) => Some(king),
            None => self.clocked_out(),
        }
    }
}
