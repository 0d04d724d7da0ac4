use futures::future::join_all;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::schedule::next_tick;
use crate::{PollCycle, PollError, PollRead, ReadFailure, ReadOutcome, RoundReport, RoundSink};

/// 控制器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// 尚未启动
    Idle,
    /// 一轮读取进行中
    RoundInFlight,
    /// 等待下一个时间点
    Waiting,
    /// 已停止（终态）
    Stopped,
}

impl PollState {
    pub fn is_running(&self) -> bool {
        matches!(self, PollState::RoundInFlight | PollState::Waiting)
    }
}

type Reads<T> = Vec<Arc<dyn PollRead<T>>>;

struct Shared<T> {
    name: String,
    cancel: CancellationToken,
    state: watch::Sender<PollState>,
    cycle: StdMutex<PollCycle<T>>,
    /// 投递闸门：停止后置为 false，投递在持锁期间完成
    gate: Mutex<bool>,
}

impl<T> Shared<T> {
    fn set_state(&self, state: PollState) {
        self.state.send_if_modified(|current| {
            // Stopped 是终态
            if *current == PollState::Stopped || *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    fn with_cycle<R>(&self, f: impl FnOnce(&mut PollCycle<T>) -> R) -> R {
        let mut cycle = self.cycle.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut cycle)
    }
}

/// 轮询刷新控制器
///
/// 每个视图持有一个。启动后立即并发执行全部读取，之后按固定速率
/// （相对启动时刻的网格，与读取耗时无关）重复执行，直到 `stop`。
/// 上一轮未结束时到达的时间点直接跳过，同一控制器不会有重叠的两轮。
pub struct PollController<T> {
    shared: Arc<Shared<T>>,
    task: StdMutex<Option<JoinHandle<()>>>,
}

impl<T> PollController<T>
where
    T: Clone + Send + 'static,
{
    /// 创建控制器
    pub fn new(name: impl Into<String>) -> Self {
        let (state, _) = watch::channel(PollState::Idle);
        Self {
            shared: Arc::new(Shared {
                name: name.into(),
                cancel: CancellationToken::new(),
                state,
                cycle: StdMutex::new(PollCycle::new(Duration::ZERO)),
                gate: Mutex::new(true),
            }),
            task: StdMutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// 启动轮询
    ///
    /// # 参数
    /// * `reads` - 每轮执行的读取，互相独立
    /// * `interval` - 固定轮询间隔
    /// * `sink` - 每轮结束后接收全部读取结果
    ///
    /// # 错误
    /// * `InvalidInterval` - 间隔为 0
    /// * `NoReads` - 读取列表为空
    /// * `Stopped` - 控制器已停止
    pub fn start<S>(&self, reads: Reads<T>, interval: Duration, sink: S) -> Result<(), PollError>
    where
        S: RoundSink<T> + 'static,
    {
        if interval.is_zero() {
            return Err(PollError::InvalidInterval);
        }
        if reads.is_empty() {
            return Err(PollError::NoReads(self.shared.name.clone()));
        }

        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        let state = self.state();
        if state == PollState::Stopped {
            return Err(PollError::Stopped(self.shared.name.clone()));
        }
        if state.is_running() {
            warn!(controller = %self.shared.name, "Poll controller is already running");
            return Ok(());
        }

        self.shared.with_cycle(|cycle| *cycle = PollCycle::new(interval));
        self.shared.set_state(PollState::RoundInFlight);

        info!(
            controller = %self.shared.name,
            reads = reads.len(),
            interval_ms = interval.as_millis() as u64,
            "Poll controller started"
        );

        let shared = self.shared.clone();
        let sink: Arc<dyn RoundSink<T>> = Arc::new(sink);
        *task = Some(tokio::spawn(Self::run(shared, reads, interval, sink)));
        Ok(())
    }

    /// 停止轮询
    ///
    /// 取消定时器和进行中的读取。返回后不会再有任何结果被投递。
    pub async fn stop(&self) {
        self.shared.cancel.cancel();
        {
            // 等待进行中的投递完成，然后关闭闸门
            let mut open = self.shared.gate.lock().await;
            *open = false;
        }
        self.shared.set_state(PollState::Stopped);
        self.shared.with_cycle(|cycle| cycle.in_flight.clear());

        // 不等待任务结束，它在下一个 await 点观察到取消后自行退出
        self.task.lock().unwrap_or_else(|e| e.into_inner()).take();

        info!(controller = %self.shared.name, "Poll controller stopped");
    }

    pub fn state(&self) -> PollState {
        *self.shared.state.borrow()
    }

    /// 订阅状态变化
    pub fn subscribe_state(&self) -> watch::Receiver<PollState> {
        self.shared.state.subscribe()
    }

    /// 当前轮询周期快照
    pub fn snapshot(&self) -> PollCycle<T> {
        self.shared.with_cycle(|cycle| cycle.clone())
    }

    async fn run(shared: Arc<Shared<T>>, reads: Reads<T>, interval: Duration, sink: Arc<dyn RoundSink<T>>) {
        let mut scheduled = Instant::now();
        let mut round = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = shared.cancel.cancelled() => break,
                _ = sleep_until(scheduled) => {}
            }

            round += 1;
            shared.set_state(PollState::RoundInFlight);
            let started_at = Instant::now();

            let outcomes = tokio::select! {
                biased;
                _ = shared.cancel.cancelled() => break,
                outcomes = Self::run_round(&shared, &reads) => outcomes,
            };

            let report = RoundReport {
                round,
                started_at,
                outcomes,
            };
            debug!(
                controller = %shared.name,
                round,
                succeeded = report.successes(),
                failed = report.failures(),
                elapsed_ms = started_at.elapsed().as_millis() as u64,
                "Poll round settled"
            );

            if !Self::deliver(&shared, report, sink.as_ref()).await {
                break;
            }

            let (next, skipped) = next_tick(scheduled, interval, Instant::now());
            if skipped > 0 {
                warn!(
                    controller = %shared.name,
                    round,
                    skipped,
                    "Poll round outlasted the interval, skipping missed ticks"
                );
            }
            scheduled = next;
            shared.set_state(PollState::Waiting);
        }

        shared.with_cycle(|cycle| cycle.in_flight.clear());
        debug!(controller = %shared.name, rounds = round, "Poll loop exited");
    }

    /// 并发执行全部读取；单个读取失败不影响其他读取
    async fn run_round(shared: &Arc<Shared<T>>, reads: &Reads<T>) -> Vec<ReadOutcome<T>> {
        shared.with_cycle(|cycle| {
            // stop() 可能已清空集合，取消后不再登记
            if !shared.cancel.is_cancelled() {
                cycle.in_flight = reads.iter().map(|r| r.name().to_string()).collect();
            }
        });

        let fetches = reads.iter().map(|read| {
            let cancel = shared.cancel.child_token();
            async move {
                let name = read.name().to_string();
                let result = read.fetch(cancel).await.map_err(|e| {
                    warn!(controller = %shared.name, read = %name, error = %format!("{:#}", e), "Poll read failed");
                    ReadFailure::new(name.clone(), &e)
                });
                shared.with_cycle(|cycle| {
                    cycle.in_flight.remove(&name);
                });
                ReadOutcome { read: name, result }
            }
        });

        join_all(fetches).await
    }

    /// 在闸门内投递；控制器已停止时丢弃结果并返回 false
    async fn deliver(shared: &Shared<T>, report: RoundReport<T>, sink: &dyn RoundSink<T>) -> bool {
        let open = shared.gate.lock().await;
        if !*open || shared.cancel.is_cancelled() {
            debug!(controller = %shared.name, round = report.round, "Discarding stale poll round");
            return false;
        }

        shared.with_cycle(|cycle| cycle.record(&report));
        sink.deliver(report);
        true
    }
}

impl<T> Drop for PollController<T> {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
        if let Some(handle) = self.task.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
        }
    }
}
