use anyhow::{anyhow, Result};
use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::ClientConfig;

/// 环境变量前缀，例如 `CAMPUS__POLLING__INTERVAL_MS=5000`
pub const ENV_PREFIX: &str = "CAMPUS";

/// 配置加载器
///
/// 优先级：内置默认值 < TOML 文件 < 环境变量
pub struct ConfigLoader {
    path: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    /// 创建配置加载器，配置文件不存在时只使用默认值和环境变量
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            env: None,
        }
    }

    /// 不读取配置文件
    pub fn without_file() -> Self {
        Self {
            path: None,
            env: None,
        }
    }

    /// 用给定的变量表代替进程环境变量
    pub fn with_env(mut self, vars: HashMap<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    /// 加载并校验配置
    pub fn load(&self) -> Result<ClientConfig> {
        let mut builder = Config::builder().add_source(Config::try_from(&ClientConfig::default())?);

        if let Some(path) = &self.path {
            if path.exists() {
                builder = builder.add_source(File::new(
                    path.to_str().ok_or_else(|| anyhow!("Invalid config path"))?,
                    FileFormat::Toml,
                ));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .source(self.env.clone()),
        );

        let config: ClientConfig = builder.build()?.try_deserialize()?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// 校验配置
    pub fn validate(config: &ClientConfig) -> Result<()> {
        if config.polling.interval_ms == 0 {
            return Err(anyhow!("polling.interval_ms must be greater than 0"));
        }

        if config.api.timeout_secs == 0 {
            return Err(anyhow!("api.timeout_secs must be greater than 0"));
        }

        if config.session.token_slot.trim().is_empty() {
            return Err(anyhow!("session.token_slot must not be empty"));
        }

        url::Url::parse(&config.api.base_url)
            .map_err(|e| anyhow!("api.base_url ({}) is invalid: {}", config.api.base_url, e))?;

        Ok(())
    }
}
