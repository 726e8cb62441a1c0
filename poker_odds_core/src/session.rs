use crate::card::{Card, BOARD_SIZE, HOLE_SIZE};
use crate::error::OddsError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 下注轮 (Street)，由已知公共牌的张数决定
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Street {
    PreFlop,
    Flop,
    Turn,
    River,
}

impl Street {
    pub const ALL: [Street; 4] = [Street::PreFlop, Street::Flop, Street::Turn, Street::River];

    /// 这一轮结束时已知的公共牌张数
    pub fn board_len(self) -> usize {
        match self {
            Street::PreFlop => 0,
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River => BOARD_SIZE,
        }
    }

    /// 公共牌张数恰好落在某一轮的边界上时返回该轮
    pub fn from_board_len(len: usize) -> Option<Street> {
        Street::ALL.into_iter().find(|s| s.board_len() == len)
    }

    pub fn next(self) -> Option<Street> {
        match self {
            Street::PreFlop => Some(Street::Flop),
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River => None,
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Street::PreFlop => "pre-flop",
            Street::Flop => "after flop",
            Street::Turn => "after turn",
            Street::River => "after river",
        })
    }
}

// --- 选牌过程 ---

/// 一手牌的选牌过程：先 2 张底牌，再依次是翻牌 3 张、转牌 1 张、河牌 1 张
///
/// 任何一次失败的选择都不会改变已有状态，调用方可以直接让用户重新输入。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    hole: Vec<Card>,
    board: Vec<Card>,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.hole.contains(&card) || self.board.contains(&card)
    }

    /// 选择下一张牌：底牌未满时补底牌，否则补公共牌
    pub fn choose(&mut self, card: Card) -> Result<Card, OddsError> {
        if self.is_complete() {
            return Err(OddsError::SelectionComplete);
        }
        if self.contains(card) {
            return Err(OddsError::DuplicateCardSelection(card));
        }
        if self.hole.len() < HOLE_SIZE {
            self.hole.push(card);
        } else {
            self.board.push(card);
        }
        Ok(card)
    }

    /// 解析牌的编码后再选择
    pub fn choose_code(&mut self, code: &str) -> Result<Card, OddsError> {
        let card = code.parse()?;
        self.choose(card)
    }

    pub fn hole_cards(&self) -> Option<[Card; HOLE_SIZE]> {
        self.hole.as_slice().try_into().ok()
    }

    pub fn board(&self) -> &[Card] {
        &self.board
    }

    /// 底牌已满且公共牌张数在某一轮的边界上时，返回当前所在的轮次
    pub fn street(&self) -> Option<Street> {
        if self.hole.len() < HOLE_SIZE {
            return None;
        }
        Street::from_board_len(self.board.len())
    }

    /// 下一个要完成的轮次
    pub fn pending_street(&self) -> Option<Street> {
        if self.hole.len() < HOLE_SIZE {
            return Some(Street::PreFlop);
        }
        Street::ALL.into_iter().find(|s| s.board_len() > self.board.len())
    }

    /// 到达下一轮边界之前还要选几张牌
    pub fn cards_needed(&self) -> usize {
        match self.pending_street() {
            Some(Street::PreFlop) => HOLE_SIZE - self.hole.len(),
            Some(street) => street.board_len() - self.board.len(),
            None => 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.hole.len() == HOLE_SIZE && self.board.len() == BOARD_SIZE
    }
}

// --- 单元测试 ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank::*, Suit::*};

    #[test]
    fn test_street_boundaries() {
        assert_eq!(Street::from_board_len(0), Some(Street::PreFlop));
        assert_eq!(Street::from_board_len(3), Some(Street::Flop));
        assert_eq!(Street::from_board_len(4), Some(Street::Turn));
        assert_eq!(Street::from_board_len(5), Some(Street::River));
        assert_eq!(Street::from_board_len(1), None);
        assert_eq!(Street::River.next(), None);
        assert_eq!(Street::PreFlop.to_string(), "pre-flop");
    }

    #[test]
    fn test_walks_through_every_street() {
        let mut session = Session::new();
        assert_eq!(session.street(), None);
        assert_eq!(session.cards_needed(), 2);

        session.choose_code("ah").unwrap();
        assert_eq!(session.hole_cards(), None);
        session.choose_code("KS").unwrap();
        assert_eq!(session.street(), Some(Street::PreFlop));
        assert_eq!(session.hole_cards(), Some([Card::new(Ace, Heart), Card::new(King, Spade)]));
        assert_eq!(session.pending_street(), Some(Street::Flop));
        assert_eq!(session.cards_needed(), 3);

        for code in ["2c", "7d"] {
            session.choose_code(code).unwrap();
            assert_eq!(session.street(), None);
        }
        session.choose_code("9h").unwrap();
        assert_eq!(session.street(), Some(Street::Flop));
        assert_eq!(session.cards_needed(), 1);

        session.choose_code("tc").unwrap();
        assert_eq!(session.street(), Some(Street::Turn));
        session.choose_code("3s").unwrap();
        assert_eq!(session.street(), Some(Street::River));
        assert!(session.is_complete());
        assert_eq!(session.pending_street(), None);
        assert_eq!(session.cards_needed(), 0);
        assert_eq!(session.board().len(), 5);

        assert!(matches!(session.choose_code("4s"), Err(OddsError::SelectionComplete)));
    }

    #[test]
    fn test_rejects_duplicates_and_bad_codes_without_changing_state() {
        let mut session = Session::new();
        session.choose_code("AH").unwrap();

        let before = session.clone();
        assert!(matches!(session.choose_code("ah"), Err(OddsError::DuplicateCardSelection(_))));
        assert!(matches!(session.choose_code("1H"), Err(OddsError::InvalidCardCode(_))));
        assert!(matches!(session.choose_code("AHX"), Err(OddsError::InvalidCardCode(_))));
        assert_eq!(session, before);

        session.choose_code("KD").unwrap();
        assert!(matches!(session.choose_code("kd"), Err(OddsError::DuplicateCardSelection(_))));
        assert!(session.choose_code("QD").is_ok());
    }
}
