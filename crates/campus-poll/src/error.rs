use thiserror::Error;

/// 轮询控制器错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    /// 间隔必须为正
    #[error("Poll interval must be greater than zero")]
    InvalidInterval,

    /// 没有可执行的读取
    #[error("Poll controller '{0}' was started without reads")]
    NoReads(String),

    /// 控制器停止后不能再次启动
    #[error("Poll controller '{0}' has been stopped")]
    Stopped(String),
}
