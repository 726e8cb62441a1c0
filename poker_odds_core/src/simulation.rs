use crate::card::{Card, BOARD_SIZE, HOLE_SIZE};
use crate::deck::ResidualDeck;
use crate::error::OddsError;
use crate::hand::{evaluate_best, MAX_CARDS};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// 原程序每次计算的模拟次数
pub const DEFAULT_TRIALS: u64 = 10_000;
/// 默认把模拟拆成多少个独立的工作单元
pub const DEFAULT_CHUNKS: usize = 64;

// --- 配置 ---

/// 模拟参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// 模拟次数，必须大于 0
    pub trials: u64,
    /// 固定种子时结果可复现，与线程数无关
    pub seed: Option<u64>,
    /// 专用线程池的大小，`None` 时使用 rayon 的全局线程池
    pub threads: Option<usize>,
    /// 工作单元个数，每个单元有自己的随机数发生器和计数器
    pub chunks: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            trials: DEFAULT_TRIALS,
            seed: None,
            threads: None,
            chunks: DEFAULT_CHUNKS,
        }
    }
}

// --- 结果 ---

/// 胜/平/负计数。`wins + ties + losses == trials`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub trials: u64,
    pub wins: u64,
    pub ties: u64,
    pub losses: u64,
}

impl SimulationResult {
    /// 记录一次模拟：`outcome` 是我方牌力与对手牌力比较的结果
    pub fn record(&mut self, outcome: Ordering) {
        self.trials += 1;
        match outcome {
            Ordering::Greater => self.wins += 1,
            Ordering::Equal => self.ties += 1,
            Ordering::Less => self.losses += 1,
        }
    }

    fn rate(&self, count: u64) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            count as f64 / self.trials as f64
        }
    }

    /// 严格赢下对手的比例，平局不计入
    pub fn win_rate(&self) -> f64 {
        self.rate(self.wins)
    }

    pub fn tie_rate(&self) -> f64 {
        self.rate(self.ties)
    }

    pub fn loss_rate(&self) -> f64 {
        self.rate(self.losses)
    }

    /// 平局算半场胜利
    pub fn equity(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            (self.wins as f64 + self.ties as f64 / 2.0) / self.trials as f64
        }
    }
}

impl Add for SimulationResult {
    type Output = SimulationResult;

    fn add(self, other: SimulationResult) -> SimulationResult {
        SimulationResult {
            trials: self.trials + other.trials,
            wins: self.wins + other.wins,
            ties: self.ties + other.ties,
            losses: self.losses + other.losses,
        }
    }
}

impl AddAssign for SimulationResult {
    fn add_assign(&mut self, other: SimulationResult) {
        *self = *self + other;
    }
}

impl Sum for SimulationResult {
    fn sum<I: Iterator<Item = SimulationResult>>(iter: I) -> SimulationResult {
        iter.fold(SimulationResult::default(), Add::add)
    }
}

// --- 中止信号 ---

/// 可跨线程共享的中止信号。中止后模拟会尽快停下，并返回已经完成的部分结果
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    aborted: Arc<AtomicBool>,
}

impl AbortSignal {
    pub fn new() -> AbortSignal {
        AbortSignal::default()
    }

    pub fn abort(&self) {
        self.aborted.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(AtomicOrdering::Relaxed)
    }
}

// --- 蒙特卡洛模拟 ---

/// 已知的牌以及由它们推出的剩余牌堆，所有工作单元只读共享
struct Table<'a> {
    hole_cards: [Card; HOLE_SIZE],
    community_cards: &'a [Card],
    residual: ResidualDeck,
    /// 还需要补发的公共牌张数
    board_draw: usize,
}

impl Table<'_> {
    /// 每次模拟要发出的牌：剩余公共牌 + 对手两张底牌
    fn deal_count(&self) -> usize {
        self.board_draw + HOLE_SIZE
    }
}

/// 蒙特卡洛胜率模拟器，只模拟一个对手
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Simulator {
        Simulator { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// 运行全部模拟并汇总胜/平/负次数
    ///
    /// 每次模拟：从剩余牌堆随机补齐公共牌，再给对手发两张底牌，双方各自取最优的 5 张比较。
    /// 如果途中收到中止信号，返回已完成部分的汇总。
    ///
    /// # Errors
    /// - 模拟次数为 0：[`OddsError::InvalidTrialCount`]
    /// - 公共牌多于 5 张，或剩余牌不够发：[`OddsError::InsufficientDeckSize`]
    /// - 同一张牌出现两次：[`OddsError::DuplicateCardSelection`]
    pub fn run(
        &self,
        hole_cards: [Card; HOLE_SIZE],
        community_cards: &[Card],
        abort: &AbortSignal,
    ) -> Result<SimulationResult, OddsError> {
        let table = self.prepare(hole_cards, community_cards)?;
        let plan = chunk_plan(self.config.trials, self.config.chunks);
        debug!(
            trials = self.config.trials,
            chunks = plan.len(),
            board = community_cards.len(),
            seeded = self.config.seed.is_some(),
            "starting simulation"
        );

        let work = || {
            plan.par_iter()
                .map(|&(index, trials)| self.run_chunk(&table, index, trials, abort))
                .try_reduce(SimulationResult::default, |a, b| Ok(a + b))
        };
        let result = match self.config.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(work)?,
            None => work()?,
        };

        if abort.is_aborted() {
            info!(completed = result.trials, requested = self.config.trials, "simulation aborted");
        }
        debug!(
            trials = result.trials,
            wins = result.wins,
            ties = result.ties,
            losses = result.losses,
            "simulation finished"
        );
        Ok(result)
    }

    fn prepare<'a>(
        &self,
        hole_cards: [Card; HOLE_SIZE],
        community_cards: &'a [Card],
    ) -> Result<Table<'a>, OddsError> {
        if self.config.trials == 0 {
            return Err(OddsError::InvalidTrialCount);
        }
        if community_cards.len() > BOARD_SIZE {
            return Err(OddsError::InsufficientDeckSize {
                needed: community_cards.len(),
                available: BOARD_SIZE,
            });
        }

        let mut seen = 0u64;
        for &card in hole_cards.iter().chain(community_cards) {
            let bit = 1u64 << card.index();
            if seen & bit != 0 {
                return Err(OddsError::DuplicateCardSelection(card));
            }
            seen |= bit;
        }

        let known: Vec<Card> = hole_cards.iter().chain(community_cards).copied().collect();
        let table = Table {
            hole_cards,
            community_cards,
            residual: ResidualDeck::new(&known),
            board_draw: BOARD_SIZE - community_cards.len(),
        };
        if table.residual.len() < table.deal_count() {
            return Err(OddsError::InsufficientDeckSize {
                needed: table.deal_count(),
                available: table.residual.len(),
            });
        }
        Ok(table)
    }

    fn chunk_rng(&self, index: usize) -> SmallRng {
        match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => SmallRng::from_os_rng(),
        }
    }

    fn run_chunk(
        &self,
        table: &Table,
        index: usize,
        trials: u64,
        abort: &AbortSignal,
    ) -> Result<SimulationResult, OddsError> {
        let mut rng = self.chunk_rng(index);
        let mut deck = table.residual.clone();
        let mut mine = Vec::with_capacity(MAX_CARDS);
        let mut theirs = Vec::with_capacity(MAX_CARDS);
        let mut result = SimulationResult::default();

        for _ in 0..trials {
            if abort.is_aborted() {
                break;
            }
            let dealt = deck.deal(&mut rng, table.deal_count())?;
            let (board, opponent) = dealt.split_at(table.board_draw);

            mine.clear();
            mine.extend_from_slice(&table.hole_cards);
            mine.extend_from_slice(table.community_cards);
            mine.extend_from_slice(board);

            theirs.clear();
            theirs.extend_from_slice(opponent);
            theirs.extend_from_slice(table.community_cards);
            theirs.extend_from_slice(board);

            let my_strength = evaluate_best(&mine)?;
            let their_strength = evaluate_best(&theirs)?;
            result.record(my_strength.cmp(&their_strength));
        }

        trace!(chunk = index, trials = result.trials, wins = result.wins, "chunk finished");
        Ok(result)
    }
}

/// 把 `trials` 次模拟尽量均匀地分给最多 `chunks` 个单元，返回 (单元序号, 模拟次数)
fn chunk_plan(trials: u64, chunks: usize) -> Vec<(usize, u64)> {
    let count = (chunks.max(1) as u64).min(trials.max(1));
    let base = trials / count;
    let extra = trials % count;
    (0..count)
        .map(|i| (i as usize, base + u64::from(i < extra)))
        .collect()
}

/// 用默认配置估算胜率
///
/// # Errors
/// 见 [`Simulator::run`]。
pub fn estimate_win_probability(
    hole_cards: [Card; HOLE_SIZE],
    community_cards: &[Card],
    trials: u64,
) -> Result<SimulationResult, OddsError> {
    let config = SimulationConfig { trials, ..SimulationConfig::default() };
    Simulator::new(config).run(hole_cards, community_cards, &AbortSignal::new())
}

// --- 单元测试 ---
