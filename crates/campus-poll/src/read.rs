use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 一次轮询读取
///
/// 每轮调用一次 `fetch`，`cancel` 在控制器停止时被取消。
#[async_trait]
pub trait PollRead<T: Send + 'static>: Send + Sync {
    /// 读取名称，用于区分每个读取的结果
    fn name(&self) -> &str;

    async fn fetch(&self, cancel: CancellationToken) -> anyhow::Result<T>;
}

/// 由闭包构成的读取
pub struct FnRead<F> {
    name: String,
    f: F,
}

#[async_trait]
impl<T, F, Fut> PollRead<T> for FnRead<F>
where
    T: Send + 'static,
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, cancel: CancellationToken) -> anyhow::Result<T> {
        (self.f)(cancel).await
    }
}

/// 用闭包创建读取
pub fn read_fn<T, F, Fut>(name: impl Into<String>, f: F) -> Arc<dyn PollRead<T>>
where
    T: Send + 'static,
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    Arc::new(FnRead {
        name: name.into(),
        f,
    })
}
