use std::time::Duration;
use tokio::time::Instant;

/// 固定速率调度的下一个时间点
///
/// 时间点始终落在 `scheduled + k * period` 的网格上。上一轮超时导致
/// 错过的时间点被跳过，返回值的第二项是跳过的次数。
pub fn next_tick(scheduled: Instant, period: Duration, now: Instant) -> (Instant, u64) {
    let mut next = scheduled + period;
    let mut skipped = 0;
    while next < now {
        next += period;
        skipped += 1;
    }
    (next, skipped)
}
