use campus_types::User;

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// 启动时静默认证尚未完成
    Resolving,
    Authenticated,
    Unauthenticated,
}

/// 会话快照
///
/// `status == Authenticated` 当且仅当 `user` 存在。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    status: SessionStatus,
    user: Option<User>,
}

impl SessionSnapshot {
    pub fn resolving() -> Self {
        Self {
            status: SessionStatus::Resolving,
            user: None,
        }
    }

    pub fn authenticated(user: User) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            user: Some(user),
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            user: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    pub fn is_resolved(&self) -> bool {
        self.status != SessionStatus::Resolving
    }
}
