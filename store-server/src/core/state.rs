use sqlx::SqlitePool;

use crate::core::Config;
use crate::db;
use crate::orders::checkout::CheckoutConfig;
use crate::services::Collaborators;

/// 服务器状态 - 持有所有共享资源的引用
///
/// ServerState 是订单核心的中心数据结构，`Clone` 成本极低
/// (连接池和协作方句柄内部都是 Arc)。
///
/// # 组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | collaborators | Collaborators | 支付网关 / 物流 / 通知 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 数据库连接池
    pub pool: SqlitePool,
    /// 外部协作方
    pub collaborators: Collaborators,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录 (确保存在)
    /// 2. 数据库 (连接 + 建表)
    /// 3. 外部协作方 (开发环境使用日志实现)
    pub async fn initialize(config: &Config) -> Result<Self, anyhow::Error> {
        std::fs::create_dir_all(&config.work_dir)?;
        let pool = db::connect(&config.database_path).await?;
        tracing::info!(path = %config.database_path, "Database ready");

        Ok(Self {
            config: config.clone(),
            pool,
            collaborators: Collaborators::logging(),
        })
    }

    /// 手动构造 (测试用)
    pub fn new(config: Config, pool: SqlitePool, collaborators: Collaborators) -> Self {
        Self {
            config,
            pool,
            collaborators,
        }
    }

    /// 结账参数视图
    pub fn checkout_config(&self) -> CheckoutConfig {
        CheckoutConfig {
            order_ttl_ms: self.config.order_ttl_ms,
            flat_shipping_fee: self.config.flat_shipping_fee,
        }
    }

    /// 支付回调签名密钥
    pub fn callback_key(&self) -> &[u8] {
        self.config.payment_callback_key.as_bytes()
    }
}
