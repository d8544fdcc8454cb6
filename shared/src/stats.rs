use serde::{Deserialize, Serialize};

/// Process-local play counters, updated when a play is revealed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayStats {
    pub total_plays: u64,
    pub total_wins: u64,
    pub total_winnings: f64,
    pub last_win: f64,
}

impl PlayStats {
    pub fn record(&mut self, is_win: bool, payout: f64) {
        self.total_plays += 1;
        if is_win {
            self.total_wins += 1;
            self.total_winnings += payout;
            self.last_win = payout;
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.total_plays == 0 {
            0.0
        } else {
            self.total_wins as f64 / self.total_plays as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_tracks_wins_and_payouts() {
        let mut stats = PlayStats::default();
        stats.record(false, 0.0);
        stats.record(true, 25.0);
        stats.record(true, 10.0);
        assert_eq!(stats.total_plays, 3);
        assert_eq!(stats.total_wins, 2);
        assert_eq!(stats.total_winnings, 35.0);
        assert_eq!(stats.last_win, 10.0);
        assert!((stats.win_rate() - 2.0 / 3.0).abs() < 1e-9);
    }
}
