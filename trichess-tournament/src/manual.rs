//! Human players fed through a rendezvous channel
//!
//! Level 4 - Utilities and configuration

use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, SendError, Sender};
use trichess_core::{Agent, Board, CancelToken, Move};

/// How often a waiting agent checks its cancel token
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Input side of the rendezvous
#[derive(Clone, Debug)]
pub struct MoveSender(Sender<Move>);

/// Waiting side of the rendezvous
#[derive(Clone, Debug)]
pub struct MoveReceiver(Receiver<Move>);

/// Channel holding at most one pending move
pub fn move_channel() -> (MoveSender, MoveReceiver) {
    let (tx, rx) = bounded(1);
    (MoveSender(tx), MoveReceiver(rx))
}

impl MoveSender {
    /// Hand over a move, blocking while a previous one is still pending
    pub fn send(&self, mv: Move) -> Result<(), SendError<Move>> {
        self.0.send(mv)
    }
}

impl MoveReceiver {
    /// Wait for a move.
    ///
    /// Gives up with `None` once `timeout` has passed (if given), `cancel` is
    /// set, or every sender is gone.
    pub fn wait(&self, timeout: Option<Duration>, cancel: &CancelToken) -> Option<Move> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if cancel.is_cancelled() {
                return None;
            }
            let slice = match deadline {
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return None;
                    }
                    left.min(POLL_INTERVAL)
                }
                None => POLL_INTERVAL,
            };
            match self.0.recv_timeout(slice) {
                Ok(mv) => return Some(mv),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

/// A player whose moves come from outside, e.g. typed on stdin
pub struct ManualAgent {
    name: String,
    moves: MoveReceiver,
}

impl ManualAgent {
    pub fn new(name: impl Into<String>, moves: MoveReceiver) -> Self {
        Self { name: name.into(), moves }
    }
}

impl Agent for ManualAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn play_move(&mut self, board: &Board, cancel: &CancelToken) -> anyhow::Result<Option<Move>> {
        tracing::info!("{}'s move:", board.turn());
        while let Some(mv) = self.moves.wait(None, cancel) {
            if board.is_legal(mv.start, mv.end) {
                return Ok(Some(mv));
            }
            tracing::warn!(%mv, "illegal move, try again");
        }
        Ok(None)
    }

    fn is_autonomous(&self) -> bool {
        false
    }

    fn fresh(&self, _seed: u64) -> Box<dyn Agent> {
        Box::new(Self::new(self.name.clone(), self.moves.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_wait_receives_move() {
        let (tx, rx) = move_channel();
        let mv: Move = "BD2 BD4".parse().unwrap();
        tx.send(mv).unwrap();
        assert_eq!(rx.wait(Some(Duration::from_secs(1)), &CancelToken::new()), Some(mv));
    }

    #[test]
    fn test_wait_times_out() {
        let (_tx, rx) = move_channel();
        let started = Instant::now();
        assert_eq!(rx.wait(Some(Duration::from_millis(30)), &CancelToken::new()), None);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_wait_observes_cancel() {
        let (_tx, rx) = move_channel();
        let cancel = CancelToken::new();
        let remote = cancel.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });
        assert_eq!(rx.wait(None, &cancel), None);
        canceller.join().unwrap();
    }

    #[test]
    fn test_wait_ends_when_senders_gone() {
        let (tx, rx) = move_channel();
        drop(tx);
        assert_eq!(rx.wait(None, &CancelToken::new()), None);
    }

    #[test]
    fn test_manual_agent_skips_illegal_input() {
        let (tx, rx) = move_channel();
        let mut agent = ManualAgent::new("human", rx);
        assert!(!agent.is_autonomous());
        let feeder = thread::spawn(move || {
            tx.send("BD2 BD1".parse().unwrap()).unwrap();
            tx.send("BD2 BD4".parse().unwrap()).unwrap();
        });
        let mv = agent.play_move(&Board::new(0), &CancelToken::new()).unwrap();
        assert_eq!(mv, Some("BD2 BD4".parse().unwrap()));
        feeder.join().unwrap();
    }
}
