//! Store Server - 商城订单生命周期核心
//!
//! # 架构概述
//!
//! 本模块是订单核心的主入口，提供以下核心功能：
//!
//! - **库存账本** (`inventory`): 预留/释放/扣减原子计数 + 数字密钥池
//! - **订单生命周期** (`orders`): 结账、状态机、支付回调、过期清理、退款
//! - **数据库** (`db`): SQLite (WAL) 存储与仓储层
//! - **外部协作方** (`services`): 支付网关、物流、通知
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! store-server/src/
//! ├── core/          # 配置、状态、后台任务
//! ├── api/           # HTTP 路由和处理器
//! ├── orders/        # 结账、状态机、回调、清理、退款
//! ├── inventory/     # 库存账本、密钥池
//! ├── services/      # 支付网关、物流、通知
//! ├── db/            # 数据库层
//! └── utils/         # 日志等工具
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod inventory;
pub mod orders;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use orders::{OrderError, OrderResult};

// Re-export unified error types from shared
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::{init_logger, init_logger_with_file};
