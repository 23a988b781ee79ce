use std::time::Duration;

/// 服务器配置 - 所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/comanda | 工作目录 (redb 数据文件) |
/// | HTTP_PORT | 8080 | HTTP 服务端口 |
/// | ORDER_INITIAL_DELAY_MS | 5000 | 自动进入 PROCESSING 的延迟 |
/// | ORDER_COMPLETION_DELAY_MS | (未设置) | 可选的自动完成延迟 |
/// | ORDER_SYNC_INTERVAL_MS | 60000 | 缓存→持久存储对账间隔 |
/// | ORDER_RETENTION_HOURS | 24 | 持久存储保留窗口 |
/// | ORDER_CLEANUP_INTERVAL_MS | 86400000 | 过期订单清理间隔 |
/// | ORDER_CACHE_TTL_SECS | 3600 | 缓存条目 TTL |
/// | STORE_TIMEOUT_MS | 2000 | 单次存储调用超时 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/comanda HTTP_PORT=3000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储 redb 数据文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,

    // === 订单生命周期配置 ===
    /// 自动 RECEIVED → PROCESSING 的初始延迟
    pub initial_delay: Duration,
    /// 可选: 自动 PROCESSING → COMPLETED 的延迟，未设置则不自动完成
    pub completion_delay: Option<Duration>,

    // === 对账与保留配置 ===
    /// 对账任务运行间隔
    pub sync_interval: Duration,
    /// 持久存储保留窗口
    pub retention_window: Duration,
    /// 过期订单清理间隔
    pub cleanup_interval: Duration,

    // === 存储配置 ===
    /// 缓存条目 TTL
    pub cache_ttl: Duration,
    /// 单次存储调用超时
    pub store_timeout: Duration,
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/comanda".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            initial_delay: Duration::from_millis(env_u64("ORDER_INITIAL_DELAY_MS", 5000)),
            completion_delay: std::env::var("ORDER_COMPLETION_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis),
            sync_interval: Duration::from_millis(env_u64("ORDER_SYNC_INTERVAL_MS", 60_000)),
            retention_window: Duration::from_secs(env_u64("ORDER_RETENTION_HOURS", 24) * 3600),
            cleanup_interval: Duration::from_millis(env_u64(
                "ORDER_CLEANUP_INTERVAL_MS",
                24 * 60 * 60 * 1000,
            )),
            cache_ttl: Duration::from_secs(env_u64("ORDER_CACHE_TTL_SECS", 3600)),
            store_timeout: Duration::from_millis(env_u64("STORE_TIMEOUT_MS", 2000)),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 保留窗口的毫秒数（用于时间戳比较）
    pub fn retention_millis(&self) -> i64 {
        self.retention_window.as_millis() as i64
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::with_overrides("/tmp/comanda-test", 0);
        assert_eq!(config.initial_delay, Duration::from_millis(5000));
        assert_eq!(config.retention_window, Duration::from_secs(24 * 3600));
        assert_eq!(config.retention_millis(), 24 * 3600 * 1000);
    }
}
