use anyhow::anyhow;
use campus_client::EnergyApi;
use campus_poll::{read_fn, CancellationToken, PollRead};
use std::future::Future;
use std::sync::Arc;

/// 把一次 API 调用包装成可取消的轮询读取
pub fn api_read<P, F, Fut>(name: &'static str, api: Arc<dyn EnergyApi>, fetch: F) -> Arc<dyn PollRead<P>>
where
    P: Send + 'static,
    F: Fn(Arc<dyn EnergyApi>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<P>> + Send + 'static,
{
    read_fn(name, move |cancel: CancellationToken| {
        let request = fetch(api.clone());
        async move {
            tokio::select! {
                _ = cancel.cancelled() => Err(anyhow!("{} cancelled", name)),
                result = request => result,
            }
        }
    })
}
