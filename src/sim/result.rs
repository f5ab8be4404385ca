//! Race outcome evaluation

use serde::{Deserialize, Serialize};

/// Result of a finished race for the user's pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The pick made the cut at this 1-based rank
    Qualified { rank: usize },
    /// The pick is absent from the rankings
    NotQualified,
}

impl Outcome {
    pub fn is_qualified(&self) -> bool {
        matches!(self, Outcome::Qualified { .. })
    }

    /// Status line shown on the results popup
    pub fn status_text(&self) -> String {
        match self {
            Outcome::Qualified { rank } => format!("SAFE: Finished #{}. No signal sent.", rank),
            Outcome::NotQualified => {
                "DEFEAT: Did not make the cut. Transmitting penalty... \u{26A1}".to_string()
            }
        }
    }
}

/// Outbound penalty signal, fired once when the pick fails to qualify.
///
/// Implementations are fire-and-forget: transport failures are logged and
/// swallowed, never reported back to the engine.
pub trait PenaltyNotifier {
    fn notify_penalty(&self);
}

impl<N: PenaltyNotifier + ?Sized> PenaltyNotifier for Box<N> {
    fn notify_penalty(&self) {
        (**self).notify_penalty()
    }
}

/// Compare the final rankings against the pick
pub fn evaluate(rankings: &[u8], bet: u8) -> Outcome {
    match rankings.iter().position(|&id| id == bet) {
        Some(index) => Outcome::Qualified { rank: index + 1 },
        None => Outcome::NotQualified,
    }
}

/// Evaluate and, on a miss, fire the penalty notifier exactly once
pub fn report<N: PenaltyNotifier + ?Sized>(rankings: &[u8], bet: u8, notifier: &N) -> Outcome {
    let outcome = evaluate(rankings, bet);
    match outcome {
        Outcome::Qualified { rank } => log::info!("Pick #{} qualified at rank {}", bet, rank),
        Outcome::NotQualified => {
            log::info!("Pick #{} missed the cut, sending penalty", bet);
            notifier.notify_penalty();
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingNotifier {
        calls: Cell<u32>,
    }

    impl PenaltyNotifier for CountingNotifier {
        fn notify_penalty(&self) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    #[test]
    fn test_qualified_rank_is_one_based() {
        let notifier = CountingNotifier::default();
        let outcome = report(&[5, 1, 3, 7], 3, &notifier);
        assert_eq!(outcome, Outcome::Qualified { rank: 3 });
        assert_eq!(notifier.calls.get(), 0);
    }

    #[test]
    fn test_absent_pick_notifies_once() {
        let notifier = CountingNotifier::default();
        let outcome = report(&[5, 1, 3, 7], 2, &notifier);
        assert_eq!(outcome, Outcome::NotQualified);
        assert_eq!(notifier.calls.get(), 1);
    }

    #[test]
    fn test_status_text() {
        assert_eq!(
            Outcome::Qualified { rank: 1 }.status_text(),
            "SAFE: Finished #1. No signal sent."
        );
        assert!(Outcome::NotQualified.status_text().starts_with("DEFEAT"));
    }

    proptest! {
        #[test]
        fn prop_outcome_matches_membership(
            rankings in Just((1u8..=8).collect::<Vec<u8>>()).prop_shuffle(),
            len in 1usize..=8,
            bet in 1u8..=8,
        ) {
            let rankings = &rankings[..len];
            match evaluate(rankings, bet) {
                Outcome::Qualified { rank } => {
                    prop_assert!(rankings.contains(&bet));
                    prop_assert_eq!(rankings[rank - 1], bet);
                }
                Outcome::NotQualified => prop_assert!(!rankings.contains(&bet)),
            }
        }
    }
}
