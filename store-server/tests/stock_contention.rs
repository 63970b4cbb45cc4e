//! 库存竞争测试 - 并发抢购与回调竞态
//!
//! 使用文件数据库 (WAL) 验证高并发下的核心不变量：
//! - 永不超卖：成功下单数不超过可用库存
//! - 密钥唯一：同一个密钥不会发给两个订单
//! - 回调幂等：重复回调不会产生第二笔支付或二次扣减

use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

use store_server::db;
use store_server::db::repository::{order as order_repo, unit as unit_repo};
use store_server::inventory::keys;
use store_server::orders::checkout::{self, CartLine, CheckoutConfig};
use store_server::orders::confirm::{self, PaymentCallback};
use store_server::orders::sweeper;
use store_server::services::Collaborators;
use shared::models::{
    InventoryUnit, OrderStatus, PaymentMethod, PaymentOutcome, ShippingAddress,
};

const SECRET: &[u8] = b"contention-test-secret";

struct TestEnv {
    // Held for the lifetime of the database file
    _dir: TempDir,
    pool: SqlitePool,
    collab: Collaborators,
}

async fn test_env() -> TestEnv {
    let dir = TempDir::new().unwrap();
    let pool = db::connect(dir.path().join("store.db")).await.unwrap();
    TestEnv {
        _dir: dir,
        pool,
        collab: Collaborators::logging(),
    }
}

fn config() -> CheckoutConfig {
    CheckoutConfig {
        order_ttl_ms: 15 * 60 * 1000,
        flat_shipping_fee: 5.0,
    }
}

fn address() -> ShippingAddress {
    ShippingAddress {
        recipient: "Test".into(),
        phone: "600000000".into(),
        line1: "Line 1".into(),
        line2: None,
        city: "Madrid".into(),
        postal_code: "28001".into(),
        country: "ES".into(),
    }
}

async fn seed_unit(pool: &SqlitePool, id: &str, price: f64, quantity: i64, digital: bool) {
    let mut conn = pool.acquire().await.unwrap();
    unit_repo::insert(
        &mut conn,
        &InventoryUnit {
            id: id.into(),
            name: format!("Unit {id}"),
            price,
            cost_price: price / 2.0,
            color: None,
            is_digital: digital,
            is_active: true,
            quantity,
            reserved: 0,
        },
    )
    .await
    .unwrap();
}

async fn seed_keys(pool: &SqlitePool, unit_id: &str, count: usize) {
    let mut conn = pool.acquire().await.unwrap();
    let batch: Vec<(String, String)> = (0..count)
        .map(|i| (format!("{unit_id}-plain-{i}"), format!("{unit_id}-cipher-{i}")))
        .collect();
    keys::import_keys(&mut conn, unit_id, &batch).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_cart_checkout_never_oversells() {
    const STOCK: i64 = 10;
    const BUYERS: usize = 40;

    let env = Arc::new(test_env().await);
    seed_unit(&env.pool, "hot-item", 25.0, STOCK, false).await;

    let mut handles = Vec::new();
    for i in 0..BUYERS {
        let env = env.clone();
        handles.push(tokio::spawn(async move {
            let lines = vec![CartLine {
                unit_id: "hot-item".into(),
                quantity: 1,
            }];
            checkout::checkout_physical(
                &env.pool,
                &env.collab,
                &config(),
                &format!("buyer-{i}"),
                PaymentMethod::Cod,
                &lines,
                &address(),
            )
            .await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    // Exactly the stock sold, no more
    assert_eq!(succeeded, STOCK as usize);
    let unit = unit_repo::find(&env.pool, "hot-item").await.unwrap().unwrap();
    assert_eq!(unit.reserved, STOCK);
    assert_eq!(unit.quantity, STOCK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_buy_now_hands_out_distinct_keys() {
    const KEYS: usize = 5;
    const BUYERS: usize = 12;

    let env = Arc::new(test_env().await);
    seed_unit(&env.pool, "game", 30.0, 0, true).await;
    seed_keys(&env.pool, "game", KEYS).await;

    let mut handles = Vec::new();
    for i in 0..BUYERS {
        let env = env.clone();
        handles.push(tokio::spawn(async move {
            checkout::buy_now_digital(&env.pool, &env.collab, &config(), &format!("buyer-{i}"), "game")
                .await
        }));
    }

    let mut order_ids = Vec::new();
    for handle in handles {
        if let Ok(order) = handle.await.unwrap() {
            order_ids.push(order.id);
        }
    }
    assert_eq!(order_ids.len(), KEYS);

    // Every winning order holds exactly one key, and no key is shared
    let mut conn = env.pool.acquire().await.unwrap();
    let mut seen = std::collections::HashSet::new();
    for order_id in &order_ids {
        let claimed = keys::find_for_order(&mut conn, order_id).await.unwrap();
        assert_eq!(claimed.len(), 1, "order {order_id} should hold one key");
        assert!(seen.insert(claimed[0].id.clone()), "key handed out twice");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_callback_replays_settle_once() {
    const REPLAYS: usize = 8;

    let env = Arc::new(test_env().await);
    seed_unit(&env.pool, "game", 30.0, 0, true).await;
    seed_keys(&env.pool, "game", 1).await;

    let order = checkout::buy_now_digital(&env.pool, &env.collab, &config(), "alice", "game")
        .await
        .unwrap();

    let callback = PaymentCallback {
        order_id: order.id.clone(),
        outcome: PaymentOutcome::Success,
        transaction_id: "txn-replay".into(),
        signature: confirm::sign(SECRET, &order.id, "txn-replay", PaymentOutcome::Success),
    };

    let mut handles = Vec::new();
    for _ in 0..REPLAYS {
        let env = env.clone();
        let cb = callback.clone();
        handles.push(tokio::spawn(async move {
            confirm::on_payment_result(&env.pool, &env.collab, SECRET, &cb).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let settled = order_repo::find(&env.pool, &order.id).await.unwrap().unwrap();
    assert_eq!(settled.status, OrderStatus::Completed);

    // Counters deducted exactly once despite the replays
    let unit = unit_repo::find(&env.pool, "game").await.unwrap().unwrap();
    assert_eq!((unit.quantity, unit.reserved), (0, 0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn sweeper_racing_success_callback_loses_cleanly() {
    let env = Arc::new(test_env().await);
    seed_unit(&env.pool, "game", 30.0, 0, true).await;
    seed_keys(&env.pool, "game", 1).await;

    // Deadline already passed at creation
    let expired = CheckoutConfig {
        order_ttl_ms: -1000,
        flat_shipping_fee: 5.0,
    };
    let order = checkout::buy_now_digital(&env.pool, &env.collab, &expired, "alice", "game")
        .await
        .unwrap();

    let callback = PaymentCallback {
        order_id: order.id.clone(),
        outcome: PaymentOutcome::Success,
        transaction_id: "txn-race".into(),
        signature: confirm::sign(SECRET, &order.id, "txn-race", PaymentOutcome::Success),
    };

    let sweep_env = env.clone();
    let sweep = tokio::spawn(async move { sweeper::sweep(&sweep_env.pool).await });
    let cb_env = env.clone();
    let confirm_task = tokio::spawn(async move {
        confirm::on_payment_result(&cb_env.pool, &cb_env.collab, SECRET, &callback).await
    });

    sweep.await.unwrap().unwrap();
    confirm_task.await.unwrap().unwrap();

    // One side won; either way the order is terminal and the counters
    // are consistent with that outcome.
    let settled = order_repo::find(&env.pool, &order.id).await.unwrap().unwrap();
    let unit = unit_repo::find(&env.pool, "game").await.unwrap().unwrap();
    match settled.status {
        OrderStatus::Completed => {
            assert_eq!((unit.quantity, unit.reserved), (0, 0));
        }
        OrderStatus::Canceled => {
            assert_eq!((unit.quantity, unit.reserved), (1, 0));
            let mut conn = env.pool.acquire().await.unwrap();
            let linked = keys::find_for_order(&mut conn, &order.id).await.unwrap();
            assert!(linked.is_empty(), "canceled order must not keep its key");
        }
        other => panic!("unexpected terminal status {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn expired_stock_cycles_back_to_new_buyers() {
    const STOCK: i64 = 3;

    let env = Arc::new(test_env().await);
    seed_unit(&env.pool, "drop", 50.0, STOCK, false).await;

    // First wave takes all stock with an already-expired deadline
    let expired = CheckoutConfig {
        order_ttl_ms: -1000,
        flat_shipping_fee: 5.0,
    };
    for i in 0..STOCK {
        let lines = vec![CartLine { unit_id: "drop".into(), quantity: 1 }];
        checkout::checkout_physical(
            &env.pool,
            &env.collab,
            &expired,
            &format!("wave1-{i}"),
            PaymentMethod::Wallet,
            &lines,
            &address(),
        )
        .await
        .unwrap();
    }
    let lines = vec![CartLine { unit_id: "drop".into(), quantity: 1 }];
    assert!(
        checkout::checkout_physical(
            &env.pool, &env.collab, &config(), "late",
            PaymentMethod::Cod, &lines, &address(),
        )
        .await
        .is_err()
    );

    // Sweep returns everything, second wave buys it all again
    assert_eq!(sweeper::sweep(&env.pool).await.unwrap(), STOCK as usize);
    for i in 0..STOCK {
        let lines = vec![CartLine { unit_id: "drop".into(), quantity: 1 }];
        checkout::checkout_physical(
            &env.pool,
            &env.collab,
            &config(),
            &format!("wave2-{i}"),
            PaymentMethod::Cod,
            &lines,
            &address(),
        )
        .await
        .unwrap();
    }
    let unit = unit_repo::find(&env.pool, "drop").await.unwrap().unwrap();
    assert_eq!((unit.quantity, unit.reserved), (STOCK, STOCK));
}
