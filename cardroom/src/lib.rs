//! Turn validation and state transitions for the card games Vietcong and Fish.
//!
//! A game is a [`GameState`] plus a [`RuleEngine`] for its [`GameKind`]. The
//! engine checks a submitted [`Turn`] against the state and, if it is legal,
//! produces the next state. Rejected turns never change anything.

pub use cards::*;
pub use cards_set::*;
pub use combination::*;
pub use errors::*;
pub use fish::*;
pub use half_suit::*;
pub use protocol::*;
pub use rules::RuleEngine;
pub use state::*;
pub use vietcong::*;
pub use visualization::*;

#[cfg(test)]
mod arbitrary;
mod bitset;
mod cards;
mod cards_set;
mod combination;
mod errors;
mod fish;
mod half_suit;
mod protocol;
mod rules;
mod state;
mod vietcong;
mod visualization;
