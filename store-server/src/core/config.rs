/// 服务器配置 - 商城订单核心的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/store | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | DATABASE_PATH | <work_dir>/store.db | SQLite 数据库路径 |
/// | ORDER_TTL_MINUTES | 15 | 在线支付订单的支付期限(分钟) |
/// | SWEEP_INTERVAL_SECS | 60 | 过期订单清理间隔(秒) |
/// | FLAT_SHIPPING_FEE | 5.0 | 实体订单统一运费 |
/// | PAYMENT_CALLBACK_KEY | (dev key) | 支付回调 HMAC 密钥 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/store HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// SQLite 数据库路径
    pub database_path: String,
    /// 在线支付订单的支付期限(毫秒)
    pub order_ttl_ms: i64,
    /// 过期订单清理间隔(秒)
    pub sweep_interval_secs: u64,
    /// 实体订单统一运费
    pub flat_shipping_fee: f64,
    /// 支付回调签名密钥 (HMAC-SHA256)
    pub payment_callback_key: String,
    /// 运行环境: development | staging | production
    pub environment: String,
}

/// 仅限开发环境的默认回调密钥
const DEV_CALLBACK_KEY: &str = "dev-payment-callback-key";

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/store".into());
        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| format!("{work_dir}/store.db"));
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path,
            order_ttl_ms: std::env::var("ORDER_TTL_MINUTES")
                .ok()
                .and_then(|p| p.parse::<i64>().ok())
                .unwrap_or(15)
                * 60
                * 1000,
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(60),
            flat_shipping_fee: std::env::var("FLAT_SHIPPING_FEE")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5.0),
            payment_callback_key: std::env::var("PAYMENT_CALLBACK_KEY")
                .unwrap_or_else(|_| DEV_CALLBACK_KEY.into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            work_dir,
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let work_dir = work_dir.into();
        let mut config = Self::from_env();
        config.database_path = format!("{work_dir}/store.db");
        config.work_dir = work_dir;
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
