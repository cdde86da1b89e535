use crate::{sort_for_vietcong, Card, GameState, HalfSuitSet, OwnerRef, Status};

fn cards_line(cards: impl IntoIterator<Item = Card>) -> String {
    let mut cards: Vec<Card> = cards.into_iter().collect();
    sort_for_vietcong(&mut cards);
    cards
        .iter()
        .map(|card| card.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders a game state as a box of text, one line per owner.
///
/// The current player is marked with `▶` and every player shows their
/// `player_status` code in brackets.
pub fn visualize_state(state: &GameState) -> String {
    let width = state.players.iter().map(String::len).max().unwrap_or(0);
    let status = match state.status {
        Status::Normal => "in play",
        Status::Ended => "ended",
        Status::Claiming => "claim in progress",
    };
    let mut result = format!("╭── {}\n", status);
    for player in &state.players {
        let marker = if *player == state.current_player {
            '▶'
        } else {
            ' '
        };
        result += &format!(
            "│ {} {:<width$} [{:>2}] {}\n",
            marker,
            player,
            state.status_of(player),
            cards_line(state.hand(player)),
            width = width
        );
    }
    for (owner_ref, owner) in &state.owners {
        match owner_ref {
            OwnerRef::Player(_) => {}
            OwnerRef::Pile => result += &format!("│ pile: {} cards\n", owner.cards.len()),
            OwnerRef::Options => {
                if !owner.cards.is_empty() {
                    result += &format!("│ options: {}\n", cards_line(owner.cards));
                }
            }
            OwnerRef::TeamSuits(team) => {
                let banked = HalfSuitSet::touched_by(owner.cards);
                result += &format!("│ team {}: {} half-suits\n", team, banked.len());
            }
        }
    }
    if let Some(lead) = &state.lead {
        result += &format!(
            "│ to beat: {} ({}, by {})\n",
            cards_line(lead.cards),
            lead.combination,
            lead.player
        );
    }
    if let Some(claim) = &state.claim {
        result += &format!(
            "│ {} claims the {} for team {}\n",
            claim.claimant, claim.half_suit, claim.team
        );
    }
    result += "╰──";
    result
}
