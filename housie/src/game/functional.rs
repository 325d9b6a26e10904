//! Prize evaluation.
//!
//! Everything here is a pure function of a ticket, the numbers called so
//! far and the ticket's current claim state.

use serde::Serialize;

use super::{
    constants::NUMBERS_PER_TICKET,
    entities::{CalledNumbers, ClaimState, Prize, Ticket},
};

/// Outcome of one evaluation cycle for a single ticket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Evaluation {
    pub claims: ClaimState,
    /// Prizes that went from unclaimed to available in this cycle, in
    /// [`Prize::ALL`] order.
    pub newly_available: Vec<Prize>,
}

/// Whether the pattern of `prize` is complete on `ticket`.
#[must_use]
pub fn is_satisfied(prize: Prize, ticket: &Ticket, called: &CalledNumbers) -> bool {
    match prize {
        Prize::EarlyFive => ticket.marked(called) == 5,
        Prize::TopLine | Prize::MiddleLine | Prize::BottomLine => prize
            .line()
            .is_some_and(|row| ticket.row(row).all(|n| called.contains(n))),
        Prize::FullHouse => ticket.marked(called) == NUMBERS_PER_TICKET,
    }
}

/// Marks every newly completed prize as available.
///
/// Claimed and already available prizes are left alone, so feeding the
/// returned claims back in with the same called numbers yields no new
/// prizes.
#[must_use]
pub fn evaluate(ticket: &Ticket, called: &CalledNumbers, claims: &ClaimState) -> Evaluation {
    let mut claims = *claims;
    let newly_available = Prize::ALL
        .into_iter()
        .filter(|&prize| is_satisfied(prize, ticket, called) && claims.make_available(prize))
        .collect();

    Evaluation {
        claims,
        newly_available,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::PrizeStatus;

    fn ticket() -> Ticket {
        Ticket::from_grid([
            [5, 12, 0, 34, 0, 56, 0, 71, 0],
            [0, 15, 23, 0, 41, 0, 62, 0, 85],
            [7, 0, 29, 0, 0, 58, 0, 78, 90],
        ])
        .unwrap()
    }

    #[test]
    fn test_nothing_called_nothing_available() {
        let result = evaluate(&ticket(), &CalledNumbers::new(), &ClaimState::new());
        assert!(result.newly_available.is_empty());
        assert_eq!(result.claims, ClaimState::new());
    }

    #[test]
    fn test_early_five_needs_exactly_five() {
        let ticket = ticket();
        let four: CalledNumbers = [5, 23, 58, 90, 1].into_iter().collect();
        assert!(!is_satisfied(Prize::EarlyFive, &ticket, &four));

        let five: CalledNumbers = [5, 23, 58, 90, 71, 1].into_iter().collect();
        assert!(is_satisfied(Prize::EarlyFive, &ticket, &five));

        let six: CalledNumbers = [5, 23, 58, 90, 71, 12].into_iter().collect();
        assert!(!is_satisfied(Prize::EarlyFive, &ticket, &six));
    }

    #[test]
    fn test_top_line_completes_early_five_too() {
        let called: CalledNumbers = [5, 12, 34, 56, 71].into_iter().collect();
        let result = evaluate(&ticket(), &called, &ClaimState::new());
        assert_eq!(
            result.newly_available,
            vec![Prize::EarlyFive, Prize::TopLine]
        );
    }

    #[test]
    fn test_line_ignores_other_rows() {
        let called: CalledNumbers = [7, 29, 58, 78, 90, 15, 23].into_iter().collect();
        let result = evaluate(&ticket(), &called, &ClaimState::new());
        assert_eq!(result.newly_available, vec![Prize::BottomLine]);
        assert_eq!(
            result.claims.status(Prize::MiddleLine),
            PrizeStatus::Unclaimed
        );
    }

    #[test]
    fn test_claimed_prize_not_reoffered() {
        let called: CalledNumbers = [15, 23, 41, 62, 85].into_iter().collect();
        let mut claims = evaluate(&ticket(), &called, &ClaimState::new()).claims;
        claims.claim(Prize::MiddleLine).unwrap();

        let result = evaluate(&ticket(), &called, &claims);
        assert!(result.newly_available.is_empty());
        assert_eq!(
            result.claims.status(Prize::MiddleLine),
            PrizeStatus::Claimed
        );
    }
}
