use crate::card::Card;
use thiserror::Error;

/// 胜率计算过程中可能出现的错误
#[derive(Debug, Error)]
pub enum OddsError {
    /// 牌的编码不是 2 个字符，或点数/花色符号无法识别
    #[error("invalid card code {0:?}: expected rank (2-9, T, J, Q, K, A) followed by suit (H, D, C, S)")]
    InvalidCardCode(String),

    /// 同一张牌在底牌和公共牌中被选了两次
    #[error("card {0} has already been selected")]
    DuplicateCardSelection(Card),

    /// 底牌和 5 张公共牌都已选完
    #[error("all hole and community cards have already been selected")]
    SelectionComplete,

    #[error("hand evaluation needs exactly 5 cards (or 5 to 7 for best-of), got {0}")]
    InvalidHandSize(usize),

    #[error("deck cannot supply {needed} cards, only {available} remain")]
    InsufficientDeckSize { needed: usize, available: usize },

    #[error("number of trials must be positive")]
    InvalidTrialCount,

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl OddsError {
    /// 输入边界上的错误可以重新提示用户，其余错误说明调用方有 bug
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OddsError::InvalidCardCode(_)
                | OddsError::DuplicateCardSelection(_)
                | OddsError::SelectionComplete
        )
    }
}
