//! Agent selection by name
//!
//! Level 4 - Utilities

use std::str::FromStr;

use anyhow::{bail, Result};
use trichess_core::{Agent, GreedyAgent, RandomAgent};
use trichess_tournament::{ManualAgent, MoveReceiver};

/// Built-in strategies selectable on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerKind {
    Random,
    Greedy,
    Human,
}

impl FromStr for PlayerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(PlayerKind::Random),
            "greedy" => Ok(PlayerKind::Greedy),
            "human" | "manual" => Ok(PlayerKind::Human),
            other => bail!("unknown player {other:?} (expected random, greedy or human)"),
        }
    }
}

impl PlayerKind {
    pub fn label(self) -> &'static str {
        match self {
            PlayerKind::Random => "Random",
            PlayerKind::Greedy => "Greedy",
            PlayerKind::Human => "Human",
        }
    }
}

/// Parse a comma-separated list such as `random,greedy,human`
pub fn parse_roster(list: &str) -> Result<Vec<PlayerKind>> {
    list.split(',').filter(|s| !s.trim().is_empty()).map(str::parse).collect()
}

/// Build agents, numbering repeated kinds so every name is distinct.
///
/// Human players need the move channel; it is an error to ask for one without it.
pub fn build_agents(kinds: &[PlayerKind], seed: u64, input: Option<&MoveReceiver>) -> Result<Vec<Box<dyn Agent>>> {
    let mut agents: Vec<Box<dyn Agent>> = Vec::with_capacity(kinds.len());
    for (i, &kind) in kinds.iter().enumerate() {
        let repeats = kinds.iter().filter(|&&k| k == kind).count();
        let ordinal = kinds[..=i].iter().filter(|&&k| k == kind).count();
        let name = if repeats > 1 { format!("{} {ordinal}", kind.label()) } else { kind.label().to_string() };
        let seed = seed.wrapping_add(i as u64);
        let agent: Box<dyn Agent> = match kind {
            PlayerKind::Random => Box::new(RandomAgent::with_seed(name, seed)),
            PlayerKind::Greedy => Box::new(GreedyAgent::with_seed(name, seed)),
            PlayerKind::Human => match input {
                Some(input) => Box::new(ManualAgent::new(name, input.clone())),
                None => bail!("human players can only join manual games"),
            },
        };
        agents.push(agent);
    }
    Ok(agents)
}
