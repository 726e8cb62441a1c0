use crate::card::{Card, Rank, Suit};
use crate::error::OddsError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// 参与比较的手牌张数
pub const HAND_SIZE: usize = 5;
/// 底牌 2 张 + 公共牌 5 张
pub const MAX_CARDS: usize = 7;

/// 牌型类别 (HandCategory)
/// 判别值即牌型大小，从小到大排列
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum HandCategory {
    HighCard = 0,      // 高牌
    Pair = 1,          // 一对
    TwoPair = 2,       // 两对
    ThreeOfKind = 3,   // 三条
    Straight = 4,      // 顺子
    Flush = 5,         // 同花
    FullHouse = 6,     // 葫芦
    FourOfKind = 7,    // 四条
    StraightFlush = 8, // 同花顺
}

impl HandCategory {
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// 牌力 (HandStrength)
///
/// 先比较牌型类别，类别相同时再比较 `tiebreak`。
/// `tiebreak` 只有一个点数：顺子/同花/高牌取最大的牌，三条/葫芦/四条取三条或四条的点数，
/// 一对取对子的点数，两对取较大的对子。踢脚牌不参与比较，所以平局比真实规则更常见。
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct HandStrength {
    pub category: HandCategory,
    pub tiebreak: Rank,
}

impl HandStrength {
    pub fn new(category: HandCategory, tiebreak: Rank) -> HandStrength {
        HandStrength { category, tiebreak }
    }
}

impl Ord for HandStrength {
    fn cmp(&self, other: &Self) -> Ordering {
        self.category
            .cmp(&other.category)
            .then_with(|| self.tiebreak.cmp(&other.tiebreak))
    }
}

impl PartialOrd for HandStrength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            HandCategory::HighCard => "high card",
            HandCategory::Pair => "pair",
            HandCategory::TwoPair => "two pair",
            HandCategory::ThreeOfKind => "three of a kind",
            HandCategory::Straight => "straight",
            HandCategory::Flush => "flush",
            HandCategory::FullHouse => "full house",
            HandCategory::FourOfKind => "four of a kind",
            HandCategory::StraightFlush => "straight flush",
        })
    }
}

impl fmt::Display for HandStrength {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.category, self.tiebreak)
    }
}

// --- 牌型评估逻辑 ---

/// 评估一手 5 张牌的牌型
///
/// 牌的顺序不影响结果。A-2-3-4-5 不算顺子，按高牌 A 处理。
///
/// # Errors
/// 牌数不是 5 张时返回 [`OddsError::InvalidHandSize`]。
pub fn evaluate(hand: &[Card]) -> Result<HandStrength, OddsError> {
    if hand.len() != HAND_SIZE {
        return Err(OddsError::InvalidHandSize(hand.len()));
    }

    // 1. 统计点数和花色出现次数
    let mut rank_counts = [0u8; Rank::ALL.len()];
    let mut suit_counts = [0u8; Suit::ALL.len()];
    for card in hand {
        rank_counts[card.rank.ordinal() as usize] += 1;
        suit_counts[card.suit.index()] += 1;
    }

    // 2. 点数从大到小排序
    let mut ranks: Vec<Rank> = hand.iter().map(|c| c.rank).collect();
    ranks.sort_by(|a, b| b.cmp(a));
    let highest = ranks[0];
    let lowest = ranks[HAND_SIZE - 1];

    // 3. 同花：只出现一种花色
    let is_flush = suit_counts.iter().filter(|&&n| n > 0).count() == 1;

    // 4. 顺子：最大最小相差 4 且 5 张点数互不相同
    let distinct = rank_counts.iter().filter(|&&n| n > 0).count();
    let is_straight = highest.ordinal() - lowest.ordinal() == 4 && distinct == HAND_SIZE;

    // 出现 n 次的点数，从大到小
    let ranks_with = |n: u8| {
        Rank::ALL
            .iter()
            .rev()
            .copied()
            .filter(move |r| rank_counts[r.ordinal() as usize] == n)
    };
    let quad = ranks_with(4).next();
    let triple = ranks_with(3).next();
    let pairs: Vec<Rank> = ranks_with(2).collect();

    // 5. 按优先级依次判断，先命中者为准
    let strength = if is_straight && is_flush {
        HandStrength::new(HandCategory::StraightFlush, highest)
    } else if let Some(rank) = quad {
        HandStrength::new(HandCategory::FourOfKind, rank)
    } else if let (Some(rank), false) = (triple, pairs.is_empty()) {
        HandStrength::new(HandCategory::FullHouse, rank)
    } else if is_flush {
        HandStrength::new(HandCategory::Flush, highest)
    } else if is_straight {
        HandStrength::new(HandCategory::Straight, highest)
    } else if let Some(rank) = triple {
        HandStrength::new(HandCategory::ThreeOfKind, rank)
    } else if pairs.len() == 2 {
        HandStrength::new(HandCategory::TwoPair, pairs[0])
    } else if let [rank] = pairs.as_slice() {
        HandStrength::new(HandCategory::Pair, *rank)
    } else {
        HandStrength::new(HandCategory::HighCard, highest)
    };
    Ok(strength)
}

/// 从 5 到 7 张牌中找出最优的 5 张牌组合牌力
///
/// 枚举所有 5 张的组合，每个组合都交给 [`evaluate`]。
///
/// # Errors
/// 牌数少于 5 或多于 7 时返回 [`OddsError::InvalidHandSize`]。
pub fn evaluate_best(cards: &[Card]) -> Result<HandStrength, OddsError> {
    let card_count = cards.len();
    if !(HAND_SIZE..=MAX_CARDS).contains(&card_count) {
        return Err(OddsError::InvalidHandSize(card_count));
    }

    let mut best: Option<HandStrength> = None;
    let mut hand = [cards[0]; HAND_SIZE];
    // 用位掩码枚举组合：恰好有 5 个比特为 1 的掩码对应一个组合
    for mask in 0u8..(1 << card_count) {
        if mask.count_ones() as usize != HAND_SIZE {
            continue;
        }
        let picked = cards
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, c)| *c);
        for (slot, card) in hand.iter_mut().zip(picked) {
            *slot = card;
        }
        let strength = evaluate(&hand)?;
        if best.is_none_or(|b| strength > b) {
            best = Some(strength);
        }
    }
    best.ok_or(OddsError::InvalidHandSize(card_count))
}

// --- 单元测试 ---
