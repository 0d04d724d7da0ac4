use std::fmt;
use tokio::sync::watch;

/// Bearer 令牌
///
/// Debug 输出会被遮蔽，避免令牌进入日志。
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// 创建令牌通道
///
/// 写端只有一个（由会话管理器持有），读端可任意克隆给发起请求的组件。
pub fn token_channel() -> (TokenWriter, TokenReader) {
    let (tx, rx) = watch::channel(None);
    (TokenWriter { tx }, TokenReader { rx })
}

/// 令牌写端
pub struct TokenWriter {
    tx: watch::Sender<Option<BearerToken>>,
}

impl TokenWriter {
    /// 挂载令牌，之后发出的请求都会携带它
    pub fn attach(&self, token: BearerToken) {
        self.tx.send_replace(Some(token));
    }

    /// 卸载令牌
    pub fn detach(&self) {
        self.tx.send_replace(None);
    }

    pub fn current(&self) -> Option<BearerToken> {
        self.tx.borrow().clone()
    }

    pub fn reader(&self) -> TokenReader {
        TokenReader {
            rx: self.tx.subscribe(),
        }
    }
}

/// 令牌读端
#[derive(Clone)]
pub struct TokenReader {
    rx: watch::Receiver<Option<BearerToken>>,
}

impl TokenReader {
    /// 取当前令牌的快照；请求发出后令牌再变化不影响该请求
    pub fn current(&self) -> Option<BearerToken> {
        self.rx.borrow().clone()
    }

    pub fn is_attached(&self) -> bool {
        self.rx.borrow().is_some()
    }
}
