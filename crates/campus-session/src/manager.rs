use campus_client::{AuthApi, BearerToken, TokenWriter};
use campus_types::User;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::{AuthError, SessionSnapshot, SessionStatus, TokenStore};

/// 会话管理器
///
/// 唯一持有令牌写端的组件：负责启动时静默认证、登录和登出，
/// 并把每次状态变化广播给订阅者。
pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn TokenStore>,
    token: TokenWriter,
    state: watch::Sender<SessionSnapshot>,
    /// 串行化状态迁移
    transition: Mutex<()>,
}

impl SessionManager {
    /// 创建会话管理器，初始状态为 Resolving
    ///
    /// # 参数
    /// * `api` - 认证接口
    /// * `store` - 令牌存储
    /// * `token` - 令牌写端，读端应已交给发起请求的客户端
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn TokenStore>, token: TokenWriter) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::resolving());
        Self {
            api,
            store,
            token,
            state,
            transition: Mutex::new(()),
        }
    }

    /// 启动时静默认证
    ///
    /// 有存储的令牌时挂载它并查询当前用户；任何失败都视为会话无效，
    /// 丢弃令牌并进入 Unauthenticated。总会得出结果，不重试。
    pub async fn initialize(&self) -> SessionStatus {
        let _guard = self.transition.lock().await;

        let stored = match self.store.load().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Failed to read stored token, treating as absent");
                None
            }
        };

        let Some(raw) = stored else {
            debug!("No stored token, session is unauthenticated");
            self.state.send_replace(SessionSnapshot::unauthenticated());
            return SessionStatus::Unauthenticated;
        };

        let token = BearerToken::new(raw);
        self.token.attach(token.clone());

        match self.api.current_user(&token).await {
            Ok(user) => {
                info!(user_id = %user.id, "Session restored from stored token");
                self.state.send_replace(SessionSnapshot::authenticated(user));
                SessionStatus::Authenticated
            }
            Err(e) => {
                warn!(error = %e, "Stored token rejected, discarding session");
                self.discard_token().await;
                self.state.send_replace(SessionSnapshot::unauthenticated());
                SessionStatus::Unauthenticated
            }
        }
    }

    /// 登录
    ///
    /// 成功时持久化并挂载新令牌，状态变为 Authenticated。
    /// 失败时之前的状态（令牌、用户、状态）保持不变。
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<User, AuthError> {
        let _guard = self.transition.lock().await;

        let response = self.api.login(identifier, secret).await.map_err(|e| {
            warn!(error = %e, "Login request failed");
            if e.is_auth_failure() {
                AuthError::InvalidCredentials
            } else {
                AuthError::Request(e)
            }
        })?;

        if response.access_token.trim().is_empty() {
            warn!("Login response contained an empty access token");
            return Err(AuthError::EmptyToken);
        }
        let token = BearerToken::new(response.access_token);

        // 先验证令牌，全部成功后再提交，避免留下半完成的会话
        let user = self.api.current_user(&token).await.map_err(|e| {
            warn!(error = %e, "Identity fetch after login failed");
            AuthError::Identity(e)
        })?;

        self.store.save(token.expose()).await.map_err(|e| {
            warn!(error = %e, "Failed to persist token after login");
            AuthError::Storage(e)
        })?;

        self.token.attach(token);
        info!(user_id = %user.id, "Logged in");
        self.state
            .send_replace(SessionSnapshot::authenticated(user.clone()));

        Ok(user)
    }

    /// 登出，不依赖网络，总是成功
    pub async fn logout(&self) {
        let _guard = self.transition.lock().await;

        self.discard_token().await;
        self.state.send_replace(SessionSnapshot::unauthenticated());
        info!("Logged out");
    }

    /// 当前会话快照
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    /// 订阅会话状态变化
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// 等待静默认证完成
    pub async fn resolved(&self) -> SessionSnapshot {
        let mut rx = self.state.subscribe();
        let resolved = match rx.wait_for(SessionSnapshot::is_resolved).await {
            Ok(snapshot) => snapshot.clone(),
            // 发送端与 self 同生命周期，不会提前关闭
            Err(_) => self.snapshot(),
        };
        resolved
    }

    /// 卸载并删除令牌；删除失败只记录日志
    async fn discard_token(&self) {
        self.token.detach();
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear stored token");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryTokenStore, TokenStoreError};
    use async_trait::async_trait;
    use campus_client::{token_channel, ApiError, TokenReader};
    use campus_types::{LoginResponse, UserId};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::assert_err;

    const VALID_TOKEN: &str = "tok-valid";

    fn test_user() -> User {
        User {
            id: UserId::Number(1),
            email: "a@b.com".to_string(),
            full_name: "Ada Lovelace".to_string(),
        }
    }

    /// 可控的认证接口
    #[derive(Default)]
    struct FakeAuthApi {
        login_calls: AtomicUsize,
        me_calls: AtomicUsize,
        /// /auth/me 返回 500 而不是校验令牌
        me_unavailable: bool,
    }

    #[async_trait]
    impl AuthApi for FakeAuthApi {
        async fn login(&self, username: &str, password: &str) -> campus_client::Result<LoginResponse> {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            if username == "a@b.com" && password == "pw" {
                Ok(LoginResponse {
                    access_token: VALID_TOKEN.to_string(),
                    token_type: Some("bearer".to_string()),
                })
            } else {
                Err(ApiError::Unauthorized {
                    endpoint: "/auth/login".to_string(),
                    status: 401,
                })
            }
        }

        async fn current_user(&self, token: &BearerToken) -> campus_client::Result<User> {
            self.me_calls.fetch_add(1, Ordering::SeqCst);
            if self.me_unavailable {
                return Err(ApiError::Status {
                    endpoint: "/auth/me".to_string(),
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            if token.expose() == VALID_TOKEN {
                Ok(test_user())
            } else {
                Err(ApiError::Unauthorized {
                    endpoint: "/auth/me".to_string(),
                    status: 401,
                })
            }
        }
    }

    /// 写入总是失败的存储
    struct ReadOnlyStore;

    #[async_trait]
    impl TokenStore for ReadOnlyStore {
        async fn load(&self) -> Result<Option<String>, TokenStoreError> {
            Ok(None)
        }

        async fn save(&self, _token: &str) -> Result<(), TokenStoreError> {
            Err(TokenStoreError::Unavailable("read-only".to_string()))
        }

        async fn clear(&self) -> Result<(), TokenStoreError> {
            Ok(())
        }
    }

    /// 读取和删除都失败的存储
    struct BrokenStore;

    #[async_trait]
    impl TokenStore for BrokenStore {
        async fn load(&self) -> Result<Option<String>, TokenStoreError> {
            Err(TokenStoreError::Unavailable("disk offline".to_string()))
        }

        async fn save(&self, _token: &str) -> Result<(), TokenStoreError> {
            Ok(())
        }

        async fn clear(&self) -> Result<(), TokenStoreError> {
            Err(TokenStoreError::Unavailable("disk offline".to_string()))
        }
    }

    fn create_manager(
        api: Arc<FakeAuthApi>,
        store: Arc<dyn TokenStore>,
    ) -> (SessionManager, TokenReader) {
        let (writer, reader) = token_channel();
        (SessionManager::new(api, store, writer), reader)
    }

    #[tokio::test]
    async fn test_initialize_without_token_makes_no_request() {
        let api = Arc::new(FakeAuthApi::default());
        let (manager, reader) = create_manager(api.clone(), Arc::new(MemoryTokenStore::new()));
        assert_eq!(manager.status(), SessionStatus::Resolving);

        let status = manager.initialize().await;
        assert_eq!(status, SessionStatus::Unauthenticated);
        assert_eq!(api.me_calls.load(Ordering::SeqCst), 0);
        assert!(!reader.is_attached());
    }

    #[tokio::test]
    async fn test_initialize_with_valid_token() {
        let api = Arc::new(FakeAuthApi::default());
        let store = MemoryTokenStore::with_token(VALID_TOKEN);
        let (manager, reader) = create_manager(api.clone(), Arc::new(store.clone()));

        let status = manager.initialize().await;
        assert_eq!(status, SessionStatus::Authenticated);
        assert_eq!(manager.current_user(), Some(test_user()));
        assert_eq!(reader.current(), Some(BearerToken::new(VALID_TOKEN)));
        assert_eq!(store.load().await.unwrap(), Some(VALID_TOKEN.to_string()));
    }

    #[tokio::test]
    async fn test_initialize_with_rejected_token_discards_it() {
        let api = Arc::new(FakeAuthApi::default());
        let store = MemoryTokenStore::with_token("tok-expired");
        let (manager, reader) = create_manager(api.clone(), Arc::new(store.clone()));

        let status = manager.initialize().await;
        assert_eq!(status, SessionStatus::Unauthenticated);
        assert!(manager.current_user().is_none());
        assert!(!reader.is_attached());
        assert!(store.load().await.unwrap().is_none());
        assert_eq!(api.me_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_initialize_with_backend_failure_discards_token() {
        let api = Arc::new(FakeAuthApi {
            me_unavailable: true,
            ..Default::default()
        });
        let store = MemoryTokenStore::with_token(VALID_TOKEN);
        let (manager, _reader) = create_manager(api, Arc::new(store.clone()));

        assert_eq!(manager.initialize().await, SessionStatus::Unauthenticated);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_success() {
        let api = Arc::new(FakeAuthApi::default());
        let store = MemoryTokenStore::new();
        let (manager, reader) = create_manager(api.clone(), Arc::new(store.clone()));
        manager.initialize().await;

        let user = manager.login("a@b.com", "pw").await.unwrap();
        assert_eq!(user, test_user());
        assert_eq!(manager.status(), SessionStatus::Authenticated);
        assert_eq!(api.me_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.load().await.unwrap(), Some(VALID_TOKEN.to_string()));
        assert_eq!(reader.current(), Some(BearerToken::new(VALID_TOKEN)));
    }

    #[tokio::test]
    async fn test_login_with_bad_credentials_leaves_state_unchanged() {
        let api = Arc::new(FakeAuthApi::default());
        let store = MemoryTokenStore::new();
        let (manager, reader) = create_manager(api.clone(), Arc::new(store.clone()));
        manager.initialize().await;

        let result = manager.login("a@b.com", "wrong").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert_eq!(manager.status(), SessionStatus::Unauthenticated);
        assert!(store.load().await.unwrap().is_none());
        assert!(!reader.is_attached());
        assert_eq!(api.me_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let api = Arc::new(FakeAuthApi::default());
        let store = MemoryTokenStore::with_token(VALID_TOKEN);
        let (manager, reader) = create_manager(api, Arc::new(store.clone()));
        manager.initialize().await;

        assert_err!(manager.login("a@b.com", "wrong").await);
        assert_eq!(manager.status(), SessionStatus::Authenticated);
        assert_eq!(manager.current_user(), Some(test_user()));
        assert_eq!(reader.current(), Some(BearerToken::new(VALID_TOKEN)));
        assert_eq!(store.load().await.unwrap(), Some(VALID_TOKEN.to_string()));
    }

    #[tokio::test]
    async fn test_login_identity_failure_persists_nothing() {
        let api = Arc::new(FakeAuthApi {
            me_unavailable: true,
            ..Default::default()
        });
        let store = MemoryTokenStore::new();
        let (manager, reader) = create_manager(api, Arc::new(store.clone()));
        manager.initialize().await;

        let result = manager.login("a@b.com", "pw").await;
        assert!(matches!(result, Err(AuthError::Identity(_))));
        assert_eq!(manager.status(), SessionStatus::Unauthenticated);
        assert!(store.load().await.unwrap().is_none());
        assert!(!reader.is_attached());
    }

    #[tokio::test]
    async fn test_login_storage_failure_is_reported() {
        let api = Arc::new(FakeAuthApi::default());
        let (manager, reader) = create_manager(api, Arc::new(ReadOnlyStore));
        manager.initialize().await;

        let result = manager.login("a@b.com", "pw").await;
        assert!(matches!(result, Err(AuthError::Storage(_))));
        assert_eq!(manager.status(), SessionStatus::Unauthenticated);
        assert!(!reader.is_attached());
    }

    #[tokio::test]
    async fn test_unreadable_store_counts_as_no_token() {
        let api = Arc::new(FakeAuthApi::default());
        let (manager, reader) = create_manager(api.clone(), Arc::new(BrokenStore));

        let status = manager.initialize().await;
        assert_eq!(status, SessionStatus::Unauthenticated);
        assert!(manager.snapshot().is_resolved());
        assert_eq!(api.me_calls.load(Ordering::SeqCst), 0);
        assert!(!reader.is_attached());

        // 删除失败不影响登出
        manager.login("a@b.com", "pw").await.unwrap();
        assert_eq!(manager.status(), SessionStatus::Authenticated);
        manager.logout().await;
        assert_eq!(manager.status(), SessionStatus::Unauthenticated);
        assert!(!reader.is_attached());
    }

    #[tokio::test]
    async fn test_logout_from_any_state() {
        let api = Arc::new(FakeAuthApi::default());
        let store = MemoryTokenStore::with_token(VALID_TOKEN);
        let (manager, reader) = create_manager(api, Arc::new(store.clone()));

        // Resolving 状态下登出
        manager.logout().await;
        assert_eq!(manager.status(), SessionStatus::Unauthenticated);
        assert!(store.load().await.unwrap().is_none());

        manager.login("a@b.com", "pw").await.unwrap();
        manager.logout().await;
        assert_eq!(manager.status(), SessionStatus::Unauthenticated);
        assert!(manager.current_user().is_none());
        assert!(!reader.is_attached());
        assert!(store.load().await.unwrap().is_none());

        // 重复登出
        manager.logout().await;
        assert_eq!(manager.status(), SessionStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_subscribers_observe_transitions() {
        let api = Arc::new(FakeAuthApi::default());
        let (manager, _reader) = create_manager(api, Arc::new(MemoryTokenStore::new()));
        let mut rx = manager.subscribe();
        assert_eq!(rx.borrow().status(), SessionStatus::Resolving);

        manager.initialize().await;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().status(), SessionStatus::Unauthenticated);

        manager.login("a@b.com", "pw").await.unwrap();
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert!(snapshot.is_authenticated());
        assert_eq!(snapshot.user(), Some(&test_user()));

        assert!(manager.resolved().await.is_authenticated());
    }
}
