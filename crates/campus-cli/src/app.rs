use anyhow::{bail, Result};
use campus_client::{token_channel, HttpClient};
use campus_config::ClientConfig;
use campus_session::{guard, Access, AuthError, FileTokenStore, Route, SessionManager};
use campus_types::TimeRange;
use campus_views::{DashboardView, MonitoringView};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::{render, shutdown};

/// 命令行宿主：会话 + HTTP 客户端 + 视图
pub struct App {
    config: ClientConfig,
    http: HttpClient,
    session: SessionManager,
}

impl App {
    pub fn build(config: ClientConfig) -> Result<Self> {
        let (writer, reader) = token_channel();
        let http = HttpClient::from_config(&config.api, reader)?;
        let store = Arc::new(FileTokenStore::from_config(&config.session));
        let session = SessionManager::new(Arc::new(http.clone()), store, writer);

        Ok(Self {
            config,
            http,
            session,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        match self.session.login(email, password).await {
            Ok(user) => {
                println!("Signed in as {} <{}>", user.full_name, user.email);
                Ok(())
            }
            Err(AuthError::InvalidCredentials) => bail!("Login failed. Please check your credentials."),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.logout().await;
        println!("Signed out");
        Ok(())
    }

    pub async fn whoami(&self) -> Result<()> {
        self.session.initialize().await;
        match self.session.current_user() {
            Some(user) => println!("{} <{}> (id {})", user.full_name, user.email, user.id),
            None => println!("Not signed in"),
        }
        Ok(())
    }

    pub async fn open(&self, path: &str) -> Result<()> {
        let route = Route::from_path(path);
        let status = self.session.initialize().await;
        match guard(route, status) {
            Access::Allow => println!("{} -> {}", path, route.path()),
            Access::RedirectToLogin => println!("{} -> {}", path, Route::Login.path()),
            Access::Pending => bail!("Session is still resolving"),
        }
        Ok(())
    }

    /// 恢复会话并检查路由能否挂载
    async fn enter(&self, route: Route) -> Result<()> {
        let status = self.session.initialize().await;
        match guard(route, status) {
            Access::Allow => Ok(()),
            Access::RedirectToLogin => {
                bail!("{} requires a signed-in session, run `campus-energy login` first", route.path())
            }
            Access::Pending => bail!("Session is still resolving"),
        }
    }

    pub async fn watch_dashboard(&self) -> Result<()> {
        self.enter(Route::Dashboard).await?;

        let view = DashboardView::new(Arc::new(self.http.clone()), self.config.polling.interval());
        let mut updates = view.subscribe();
        view.mount()?;
        info!(interval_ms = self.config.polling.interval_ms, "Watching dashboard");

        let signal = shutdown::wait_for_signal();
        tokio::pin!(signal);

        let result = loop {
            tokio::select! {
                result = &mut signal => break result.map_err(anyhow::Error::from),
                changed = updates.changed() => {
                    if changed.is_err() {
                        break Ok(());
                    }
                    render::dashboard(&updates.borrow_and_update());
                }
            }
        };

        view.unmount().await;
        result
    }

    /// 监控页：标准输入中输入 6H / 24H / 7D 可切换时间范围
    pub async fn watch_monitoring(&self, range: TimeRange) -> Result<()> {
        self.enter(Route::Monitoring).await?;

        let view = MonitoringView::new(Arc::new(self.http.clone()), self.config.polling.interval());
        view.set_time_range(range).await?;
        let mut updates = view.subscribe();
        view.mount().await?;
        info!(range = range.as_str(), interval_ms = self.config.polling.interval_ms, "Watching monitoring");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;
        let signal = shutdown::wait_for_signal();
        tokio::pin!(signal);

        let result = loop {
            tokio::select! {
                result = &mut signal => break result.map_err(anyhow::Error::from),
                changed = updates.changed() => {
                    if changed.is_err() {
                        break Ok(());
                    }
                    render::monitoring(&updates.borrow_and_update());
                }
                line = lines.next_line(), if stdin_open => match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => match line.parse::<TimeRange>() {
                        Ok(range) => {
                            if let Err(e) = view.set_time_range(range).await {
                                break Err(e.into());
                            }
                        }
                        Err(e) => warn!(error = %e, "Ignoring input"),
                    },
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        warn!(error = %e, "Stopped reading stdin");
                        stdin_open = false;
                    }
                },
            }
        };

        view.unmount().await;
        result
    }
}
