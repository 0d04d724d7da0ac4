use crate::SessionStatus;

/// 应用路由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Dashboard,
    Monitoring,
    Strategy,
    Reports,
    NotFound,
}

impl Route {
    /// 解析路径，`/app` 默认进入仪表盘
    pub fn from_path(path: &str) -> Route {
        let path = path.trim();
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };

        match path {
            "" | "/" => Route::Landing,
            "/login" => Route::Login,
            "/app" | "/app/dashboard" => Route::Dashboard,
            "/app/monitoring" => Route::Monitoring,
            "/app/strategy" => Route::Strategy,
            "/app/reports" => Route::Reports,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Dashboard => "/app/dashboard",
            Route::Monitoring => "/app/monitoring",
            Route::Strategy => "/app/strategy",
            Route::Reports => "/app/reports",
            Route::NotFound => "/404",
        }
    }

    /// `/app` 下的页面需要登录
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Route::Dashboard | Route::Monitoring | Route::Strategy | Route::Reports
        )
    }
}

/// 路由守卫的判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// 会话尚在确认中，暂不挂载
    Pending,
    Allow,
    RedirectToLogin,
}

/// 判断路由能否在当前会话状态下挂载
pub fn guard(route: Route, status: SessionStatus) -> Access {
    if !route.requires_auth() {
        return Access::Allow;
    }

    match status {
        SessionStatus::Resolving => Access::Pending,
        SessionStatus::Authenticated => Access::Allow,
        SessionStatus::Unauthenticated => Access::RedirectToLogin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_parsing() {
        assert_eq!(Route::from_path("/"), Route::Landing);
        assert_eq!(Route::from_path("/login"), Route::Login);
        assert_eq!(Route::from_path("/app"), Route::Dashboard);
        assert_eq!(Route::from_path("/app/"), Route::Dashboard);
        assert_eq!(Route::from_path("/app/monitoring/"), Route::Monitoring);
        assert_eq!(Route::from_path("/app/unknown"), Route::NotFound);
        assert_eq!(Route::from_path(Route::Reports.path()), Route::Reports);
    }

    #[test]
    fn test_guard_protected_routes() {
        assert_eq!(
            guard(Route::Dashboard, SessionStatus::Resolving),
            Access::Pending
        );
        assert_eq!(
            guard(Route::Monitoring, SessionStatus::Authenticated),
            Access::Allow
        );
        assert_eq!(
            guard(Route::Strategy, SessionStatus::Unauthenticated),
            Access::RedirectToLogin
        );
    }

    #[test]
    fn test_guard_public_routes() {
        for status in [
            SessionStatus::Resolving,
            SessionStatus::Authenticated,
            SessionStatus::Unauthenticated,
        ] {
            assert_eq!(guard(Route::Landing, status), Access::Allow);
            assert_eq!(guard(Route::Login, status), Access::Allow);
            assert_eq!(guard(Route::NotFound, status), Access::Allow);
        }
    }
}
