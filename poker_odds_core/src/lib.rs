//! # 德州扑克胜率估算核心库
//!
//! 这个 `core` crate 包含了牌和牌组的定义、5 张牌的牌力评估、
//! 剩余牌堆的随机抽样，以及对单个对手的蒙特卡洛胜率模拟。
//! 输入端（选牌、解析牌的编码）和输出端（每一轮的结果报告）也在这里定义，
//! 与具体的交互方式（命令行、网络）解耦。

mod card;
mod deck;
mod error;
mod hand;
mod report;
mod session;
mod simulation;

pub use card::*;

pub use deck::*;

pub use error::*;

pub use hand::*;

pub use report::*;

pub use session::*;

pub use simulation::*;
