use crate::card::{Card, HOLE_SIZE};
use crate::session::Street;
use crate::simulation::SimulationResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 每一轮结束后交给输出端的结果
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StageReport {
    pub street: Street,
    pub hole_cards: [Card; HOLE_SIZE],
    pub board: Vec<Card>,
    pub result: SimulationResult,
    /// 模拟被中途中止，`result` 只包含已完成的部分
    pub aborted: bool,
}

impl StageReport {
    pub fn new(street: Street, hole_cards: [Card; HOLE_SIZE], board: &[Card], result: SimulationResult) -> StageReport {
        StageReport {
            street,
            hole_cards,
            board: board.to_vec(),
            result,
            aborted: false,
        }
    }

    pub fn aborted(mut self, aborted: bool) -> StageReport {
        self.aborted = aborted;
        self
    }
}

struct CardList<'a>(&'a [Card]);

impl fmt::Display for CardList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, card) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{card}")?;
        }
        write!(f, "]")
    }
}

/// 概率保留 4 位小数
impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Approximate win probability ({}) with {}", self.street, CardList(&self.hole_cards))?;
        if !self.board.is_empty() {
            write!(f, " and board {}", CardList(&self.board))?;
        }
        write!(
            f,
            ": {:.4} (tie {:.4}, loss {:.4})",
            self.result.win_rate(),
            self.result.tie_rate(),
            self.result.loss_rate()
        )?;
        if self.aborted {
            write!(f, " [aborted after {} trials]", self.result.trials)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank::*, Suit::*};

    fn result() -> SimulationResult {
        SimulationResult { trials: 10_000, wins: 8_512, ties: 101, losses: 1_387 }
    }

    #[test]
    fn test_preflop_format() {
        let hole = [Card::new(Ace, Heart), Card::new(King, Spade)];
        let report = StageReport::new(Street::PreFlop, hole, &[], result());
        assert_eq!(
            report.to_string(),
            "Approximate win probability (pre-flop) with [AH, KS]: 0.8512 (tie 0.0101, loss 0.1387)"
        );
    }

    #[test]
    fn test_board_and_abort_format() {
        let hole = [Card::new(Ace, Heart), Card::new(King, Spade)];
        let board = [Card::new(Two, Club), Card::new(Ten, Diamond), Card::new(Nine, Heart)];
        let partial = SimulationResult { trials: 3, wins: 1, ties: 0, losses: 2 };
        let report = StageReport::new(Street::Flop, hole, &board, partial).aborted(true);
        assert_eq!(
            report.to_string(),
            "Approximate win probability (after flop) with [AH, KS] and board [2C, TD, 9H]: \
             0.3333 (tie 0.0000, loss 0.6667) [aborted after 3 trials]"
        );
    }
}
