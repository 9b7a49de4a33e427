//! Board display hook
//!
//! Level 4 - Utilities and configuration

use trichess_core::Board;

/// Something that can show the board as a game progresses
pub trait BoardDisplay: Send {
    /// Redraw with the current board
    fn repaint(&mut self, board: &Board);
}

/// Prints the board as text after every change
#[derive(Debug, Default)]
pub struct TextDisplay;

impl BoardDisplay for TextDisplay {
    fn repaint(&mut self, board: &Board) {
        println!("{board}\n");
    }
}
