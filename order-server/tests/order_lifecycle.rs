//! 端到端订单生命周期测试
//!
//! 通过 ServerState 组装真实服务（内存缓存 + redb 持久存储 + 菜单目录
//! + 消息总线），覆盖下单 → 改量 → 取消的完整流程和定时自动流转。

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use order_server::menu::CatalogStorage;
use order_server::{
    Config, MemoryOrderCache, OrderError, OrderStore, RedbOrderStore, ServerState,
};
use shared::models::{CategoryCreate, Menu, MenuCreate, OrderStatus};
use shared::request::OrderItemRequest;

/// 组装一套全内存后端的服务器状态
fn test_state(initial_delay: Duration) -> ServerState {
    let mut config = Config::with_overrides("/tmp/comanda-it", 0);
    config.initial_delay = initial_delay;
    config.completion_delay = None;

    ServerState::with_stores(
        config,
        Arc::new(MemoryOrderCache::new()),
        Arc::new(RedbOrderStore::open_in_memory().unwrap()),
        CatalogStorage::open_in_memory().unwrap(),
    )
}

/// 建一个分类和一道定价菜品
fn seed_menu(state: &ServerState, price: i64) -> Menu {
    let category = state
        .category_service
        .create(CategoryCreate {
            name: "Stews".to_string(),
            description: "Korean stews".to_string(),
        })
        .unwrap();

    state
        .menu_service
        .create(MenuCreate {
            name: "Kimchi Stew".to_string(),
            description: String::new(),
            price: Decimal::from(price),
            category_id: category.id,
            image_url: None,
            available: true,
            best_seller: true,
        })
        .unwrap()
}

fn order_item(menu: &Menu, quantity: i64) -> OrderItemRequest {
    OrderItemRequest {
        menu_id: menu.id.clone(),
        quantity,
    }
}

#[tokio::test]
async fn full_lifecycle_create_edit_cancel() {
    let state = test_state(Duration::from_secs(60));
    let menu = seed_menu(&state, 15000);

    // 下单: 15000 × 2 = 30000, 初始状态 RECEIVED
    let order = state
        .engine
        .create_order(vec![order_item(&menu, 2)])
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Received);
    assert_eq!(order.total, Decimal::from(30000));

    // 改量: 数量 3 → 总额 45000
    let updated = state
        .engine
        .update_quantity(&order.id, &menu.id, 3)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.total, Decimal::from(45000));

    // 取消
    let cancelled = state.engine.cancel(&order.id).await.unwrap().unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    // 取消后的改量必须报冲突
    let conflict = state.engine.update_quantity(&order.id, &menu.id, 4).await;
    assert!(matches!(conflict, Err(OrderError::Conflict(_))));

    // 两条读路径（缓存命中 + 持久存储）都只能看到 CANCELLED
    let via_engine = state.engine.get_order(&order.id).await.unwrap().unwrap();
    assert_eq!(via_engine.status, OrderStatus::Cancelled);
    let via_store = state.store.get(&order.id).await.unwrap().unwrap();
    assert_eq!(via_store.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn untouched_order_advances_to_processing() {
    let state = test_state(Duration::from_millis(50));
    let menu = seed_menu(&state, 12000);

    let order = state
        .engine
        .create_order(vec![order_item(&menu, 1)])
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;

    let got = state.engine.get_order(&order.id).await.unwrap().unwrap();
    assert_eq!(got.status, OrderStatus::Processing);

    // 自动流转也要落到持久存储
    let durable = state.store.get(&order.id).await.unwrap().unwrap();
    assert_eq!(durable.status, OrderStatus::Processing);
}

#[tokio::test]
async fn immediate_cancel_beats_the_timer() {
    let state = test_state(Duration::from_millis(80));
    let menu = seed_menu(&state, 12000);

    let order = state
        .engine
        .create_order(vec![order_item(&menu, 1)])
        .await
        .unwrap();
    state.engine.cancel(&order.id).await.unwrap().unwrap();

    // 延迟已过，状态必须仍然是 CANCELLED，绝不能变成 PROCESSING
    tokio::time::sleep(Duration::from_millis(400)).await;

    let got = state.engine.get_order(&order.id).await.unwrap().unwrap();
    assert_eq!(got.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn unknown_menu_item_fails_the_whole_order() {
    let state = test_state(Duration::from_secs(60));
    let menu = seed_menu(&state, 15000);

    let result = state
        .engine
        .create_order(vec![
            order_item(&menu, 1),
            OrderItemRequest {
                menu_id: "does-not-exist".to_string(),
                quantity: 1,
            },
        ])
        .await;

    assert!(matches!(result, Err(OrderError::Validation(_))));
    assert!(state.engine.list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn durable_store_survives_on_disk() {
    // 一次真实落盘：重开数据库后订单仍在
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.redb");

    let order = {
        let mut config = Config::with_overrides("/tmp/comanda-it", 0);
        config.initial_delay = Duration::from_secs(60);
        let state = ServerState::with_stores(
            config,
            Arc::new(MemoryOrderCache::new()),
            Arc::new(RedbOrderStore::open(&path).unwrap()),
            CatalogStorage::open_in_memory().unwrap(),
        );
        let menu = seed_menu(&state, 9000);
        let order = state
            .engine
            .create_order(vec![order_item(&menu, 2)])
            .await
            .unwrap();
        // 取消以中断定时任务，让引擎持有的数据库句柄尽快释放
        state.engine.cancel(&order.id).await.unwrap().unwrap();
        order
    };
    // 被中断的定时任务异步退出后才释放数据库文件锁，重开时等一等
    let reopened = {
        let mut attempt = 0;
        loop {
            match RedbOrderStore::open(&path) {
                Ok(store) => break store,
                Err(_) if attempt < 50 => {
                    attempt += 1;
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                Err(e) => panic!("failed to reopen order store: {}", e),
            }
        }
    };
    let state = {
        let mut config = Config::with_overrides("/tmp/comanda-it", 0);
        config.initial_delay = Duration::from_secs(60);
        ServerState::with_stores(
            config,
            Arc::new(MemoryOrderCache::new()),
            Arc::new(reopened),
            CatalogStorage::open_in_memory().unwrap(),
        )
    };

    // 缓存是空的（模拟重启），读取必须回落到持久存储
    let got = state.engine.get_order(&order.id).await.unwrap().unwrap();
    assert_eq!(got.total, Decimal::from(18000));
    assert_eq!(got.status, OrderStatus::Cancelled);
}
