use crate::error::OddsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

// --- 核心数据结构定义 ---

/// 一副牌的张数
pub const DECK_SIZE: usize = 52;
/// 每位玩家的底牌张数
pub const HOLE_SIZE: usize = 2;
/// 公共牌的张数 (翻牌 3 + 转牌 1 + 河牌 1)
pub const BOARD_SIZE: usize = 5;

/// 花色 (Suit)
/// 花色之间没有大小之分，派生的 Ord 只用于排序展示
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Suit {
    Heart,   // 红心 ♥️
    Diamond, // 方块 ♦️
    Club,    // 梅花 ♣️
    Spade,   // 黑桃 ♠️
}

/// 点数 (Rank)
/// Ord 的派生让 Ace 是最大的。A-2-3-4-5 不视为顺子，Ace 永远不会当作最小的牌
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

/// 单张扑克牌 (Card)
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Heart, Suit::Diamond, Suit::Club, Suit::Spade];

    /// 在 [`Suit::ALL`] 中的位置
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn symbol(self) -> char {
        match self {
            Suit::Heart => 'H',
            Suit::Diamond => 'D',
            Suit::Club => 'C',
            Suit::Spade => 'S',
        }
    }

    /// 大小写不敏感
    pub fn from_symbol(c: char) -> Option<Suit> {
        match c.to_ascii_uppercase() {
            'H' => Some(Suit::Heart),
            'D' => Some(Suit::Diamond),
            'C' => Some(Suit::Club),
            'S' => Some(Suit::Spade),
            _ => None,
        }
    }
}

impl Rank {
    /// 从小到大的固定顺序
    pub const ALL: [Rank; 13] = [
        Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven,
        Rank::Eight, Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace,
    ];

    /// 序号：2 为 0，A 为 12
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Rank> {
        Rank::ALL.get(ordinal as usize).copied()
    }

    pub fn symbol(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    /// 大小写不敏感
    pub fn from_symbol(c: char) -> Option<Rank> {
        Rank::ALL.into_iter().find(|r| r.symbol() == c.to_ascii_uppercase())
    }
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    /// 每张牌在 0..52 中唯一的位置，和 [`Deck::cards`] 的顺序一致
    pub fn index(self) -> usize {
        self.rank.ordinal() as usize * Suit::ALL.len() + self.suit.index()
    }

    pub fn from_index(index: usize) -> Option<Card> {
        if index >= DECK_SIZE {
            return None;
        }
        let rank = Rank::ALL[index / Suit::ALL.len()];
        let suit = Suit::ALL[index % Suit::ALL.len()];
        Some(Card { rank, suit })
    }

    /// 判断 (点数符号, 花色符号) 能否组成一张合法的牌
    pub fn is_valid_symbols(rank: char, suit: char) -> bool {
        Rank::from_symbol(rank).is_some() && Suit::from_symbol(suit).is_some()
    }
}

// --- 牌组 ---

/// 一副完整的 52 张扑克牌，进程内只构造一次，之后只读共享
#[derive(Debug)]
pub struct Deck {
    cards: [Card; DECK_SIZE],
}

static STANDARD_DECK: LazyLock<Deck> = LazyLock::new(Deck::build);

impl Deck {
    fn build() -> Deck {
        let mut cards = [Card::new(Rank::Two, Suit::Heart); DECK_SIZE];
        for &rank in &Rank::ALL {
            for &suit in &Suit::ALL {
                let card = Card::new(rank, suit);
                cards[card.index()] = card;
            }
        }
        Deck { cards }
    }

    /// 共享的标准牌组
    pub fn standard() -> &'static Deck {
        &STANDARD_DECK
    }

    /// 按 [`Card::index`] 排列
    pub fn cards(&self) -> &[Card; DECK_SIZE] {
        &self.cards
    }

    pub fn contains(&self, rank: Rank, suit: Suit) -> bool {
        self.cards[Card::new(rank, suit).index()] == Card::new(rank, suit)
    }
}

/// 创建一副新的 52 张扑克牌
pub fn full_deck() -> Vec<Card> {
    Deck::standard().cards().to_vec()
}

// --- 文本编码 ---

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// 规范形式：点数在前，花色在后，全部大写，例如 `AH`、`TS`
impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl FromStr for Card {
    type Err = OddsError;

    fn from_str(s: &str) -> Result<Card, OddsError> {
        let code = s.trim();
        let invalid = || OddsError::InvalidCardCode(code.to_string());

        let mut chars = code.chars();
        let (Some(r), Some(su), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };
        let rank = Rank::from_symbol(r).ok_or_else(invalid)?;
        let suit = Suit::from_symbol(su).ok_or_else(invalid)?;
        Ok(Card { rank, suit })
    }
}

/// 解析一串牌的编码，允许空格或逗号分隔，也允许直接连写 (`AhKs`)
pub fn parse_cards(s: &str) -> Result<Vec<Card>, OddsError> {
    let mut cards = Vec::new();
    for token in s.split(|c: char| c.is_whitespace() || c == ',').filter(|t| !t.is_empty()) {
        let chars: Vec<char> = token.chars().collect();
        if chars.len() % 2 != 0 {
            return Err(OddsError::InvalidCardCode(token.to_string()));
        }
        for pair in chars.chunks(2) {
            cards.push(pair.iter().collect::<String>().parse()?);
        }
    }
    Ok(cards)
}

// --- 单元测试 ---

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use Rank::*;
    use Suit::*;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    #[test]
    fn test_rank_order() {
        assert!(Two < Three && King < Ace);
        assert_eq!(Two.ordinal(), 0);
        assert_eq!(Ace.ordinal(), 12);
        assert_eq!(Rank::from_ordinal(8), Some(Ten));
        assert_eq!(Rank::from_ordinal(13), None);
    }

    #[test]
    fn test_standard_deck_is_complete() {
        let deck = Deck::standard();
        let unique: HashSet<Card> = deck.cards().iter().copied().collect();
        assert_eq!(unique.len(), DECK_SIZE);
        for (i, c) in deck.cards().iter().enumerate() {
            assert_eq!(c.index(), i);
            assert_eq!(Card::from_index(i), Some(*c));
        }
        assert_eq!(Card::from_index(DECK_SIZE), None);
        assert!(deck.contains(Ace, Spade));
    }

    #[test]
    fn test_full_deck_is_fresh_copy() {
        let mut a = full_deck();
        a.clear();
        assert_eq!(full_deck().len(), DECK_SIZE);
    }

    #[test]
    fn test_parse_card_case_insensitive() {
        assert_eq!("AH".parse::<Card>().unwrap(), card(Ace, Heart));
        assert_eq!("ts".parse::<Card>().unwrap(), card(Ten, Spade));
        assert_eq!(" 9d ".parse::<Card>().unwrap(), card(Nine, Diamond));
        assert_eq!(card(Ten, Spade).to_string(), "TS");
        assert_eq!("qc".parse::<Card>().unwrap().to_string(), "QC");
    }

    #[test]
    fn test_parse_card_rejects_bad_codes() {
        for code in ["", "A", "AHS", "10H", "1H", "AX", "ZH", "♠A"] {
            assert!(
                matches!(code.parse::<Card>(), Err(OddsError::InvalidCardCode(_))),
                "{code:?} 应该解析失败"
            );
        }
        assert!(!Card::is_valid_symbols('X', 'H'));
        assert!(Card::is_valid_symbols('k', 'c'));
    }

    #[test]
    fn test_parse_cards_separators() {
        let expected = vec![card(Ace, Heart), card(King, Spade)];
        assert_eq!(parse_cards("AhKs").unwrap(), expected);
        assert_eq!(parse_cards("AH KS").unwrap(), expected);
        assert_eq!(parse_cards("ah,ks").unwrap(), expected);
        assert!(parse_cards("").unwrap().is_empty());
        assert!(parse_cards("AhK").is_err());
    }
}
