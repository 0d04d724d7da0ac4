use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// 单个读取失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{read} failed: {message}")]
pub struct ReadFailure {
    pub read: String,
    pub message: String,
}

impl ReadFailure {
    pub fn new(read: impl Into<String>, error: &anyhow::Error) -> Self {
        Self {
            read: read.into(),
            message: format!("{:#}", error),
        }
    }
}

/// 单个读取在一轮中的结果
#[derive(Debug, Clone)]
pub struct ReadOutcome<T> {
    pub read: String,
    pub result: Result<T, ReadFailure>,
}

impl<T> ReadOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// 一轮读取的汇总，按读取注册顺序排列
#[derive(Debug, Clone)]
pub struct RoundReport<T> {
    /// 从 1 开始的轮次
    pub round: u64,
    pub started_at: Instant,
    pub outcomes: Vec<ReadOutcome<T>>,
}

impl<T> RoundReport<T> {
    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failures(&self) -> usize {
        self.outcomes.len() - self.successes()
    }

    pub fn get(&self, read: &str) -> Option<&Result<T, ReadFailure>> {
        self.outcomes
            .iter()
            .find(|o| o.read == read)
            .map(|o| &o.result)
    }
}

/// 接收每轮结果的一方
///
/// 在控制器内部的投递锁中同步调用，实现不应阻塞。
pub trait RoundSink<T>: Send + Sync {
    fn deliver(&self, report: RoundReport<T>);
}

impl<T, F> RoundSink<T> for F
where
    F: Fn(RoundReport<T>) + Send + Sync,
{
    fn deliver(&self, report: RoundReport<T>) {
        self(report)
    }
}

/// 每个读取最近的结果
#[derive(Debug, Clone)]
pub struct ReadSlot<T> {
    /// 最近一次成功的数据，之后的失败不会清除它
    pub last_value: Option<T>,
    /// 最近一轮的失败；成功后清除
    pub last_error: Option<ReadFailure>,
    /// 最近一次更新所在的轮次
    pub round: u64,
}

impl<T> Default for ReadSlot<T> {
    fn default() -> Self {
        Self {
            last_value: None,
            last_error: None,
            round: 0,
        }
    }
}

/// 轮询周期的状态快照
#[derive(Debug, Clone)]
pub struct PollCycle<T> {
    pub interval: Duration,
    pub rounds_completed: u64,
    /// 尚未返回的读取
    pub in_flight: BTreeSet<String>,
    pub slots: HashMap<String, ReadSlot<T>>,
}

impl<T> PollCycle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            rounds_completed: 0,
            in_flight: BTreeSet::new(),
            slots: HashMap::new(),
        }
    }

    pub fn slot(&self, read: &str) -> Option<&ReadSlot<T>> {
        self.slots.get(read)
    }
}

impl<T: Clone> PollCycle<T> {
    /// 记录一轮结果
    pub(crate) fn record(&mut self, report: &RoundReport<T>) {
        for outcome in &report.outcomes {
            let slot = self.slots.entry(outcome.read.clone()).or_default();
            slot.round = report.round;
            match &outcome.result {
                Ok(value) => {
                    slot.last_value = Some(value.clone());
                    slot.last_error = None;
                }
                Err(failure) => {
                    slot.last_error = Some(failure.clone());
                }
            }
        }
        self.rounds_completed = report.round;
    }
}
