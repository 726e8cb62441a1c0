use crate::card::{Card, Deck, DECK_SIZE};
use crate::error::OddsError;
use rand::prelude::SliceRandom;
use rand::Rng;

// --- 剩余牌堆 ---

/// 52 张牌的排除掩码，第 i 位对应 `Card::index() == i` 的牌
fn exclusion_mask(excluded: &[Card]) -> u64 {
    let mut mask = 0u64;
    for card in excluded {
        let bit = 1u64 << card.index();
        debug_assert!(mask & bit == 0, "牌 {card} 被排除了两次");
        mask |= bit;
    }
    mask
}

fn residual_cards(excluded: &[Card]) -> Vec<Card> {
    let mask = exclusion_mask(excluded);
    Deck::standard()
        .cards()
        .iter()
        .copied()
        .filter(|card| mask & (1u64 << card.index()) == 0)
        .collect()
}

/// 返回去掉 `excluded` 之后剩下的 `52 - excluded.len()` 张牌，顺序随机
///
/// `excluded` 中不能有重复的牌，这是调用方的前置条件。
pub fn sample_residual<R: Rng + ?Sized>(excluded: &[Card], rng: &mut R) -> Vec<Card> {
    let mut cards = residual_cards(excluded);
    cards.shuffle(rng);
    cards
}

/// 一次计算好的剩余牌堆，在多次模拟之间复用，每次只洗需要发出的那几张
#[derive(Debug, Clone)]
pub struct ResidualDeck {
    cards: Vec<Card>,
}

impl ResidualDeck {
    pub fn new(excluded: &[Card]) -> ResidualDeck {
        ResidualDeck { cards: residual_cards(excluded) }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// 均匀随机地发出 `count` 张互不相同的牌
    ///
    /// # Errors
    /// 剩余的牌不足 `count` 张时返回 [`OddsError::InsufficientDeckSize`]。
    pub fn deal<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) -> Result<&[Card], OddsError> {
        if count > self.cards.len() {
            return Err(OddsError::InsufficientDeckSize { needed: count, available: self.cards.len() });
        }
        let (dealt, _) = self.cards.partial_shuffle(rng, count);
        Ok(&*dealt)
    }
}

impl Default for ResidualDeck {
    fn default() -> Self {
        ResidualDeck::new(&[])
    }
}

// --- 单元测试 ---
