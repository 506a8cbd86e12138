use std::sync::Arc;

use uuid::Uuid;

use textil_pedidos_api::{
    dto::{
        auth::{LoginRequest, RegisterRequest},
        orders::{CreateOrderRequest, OrderItemRequest},
    },
    error::ErrorType,
    gateway::{Gateway, MemoryGateway},
    models::{NewProduct, NewUser, OrderStatus},
    services::{auth_service, order_service},
    session::MemorySessionStore,
    state::AppState,
};

fn setup() -> (AppState, Arc<MemoryGateway>) {
    let gateway = Arc::new(MemoryGateway::new());
    let state = AppState::new(gateway.clone(), Arc::new(MemorySessionStore::new()));
    (state, gateway)
}

async fn seed_usuario(gateway: &MemoryGateway, nombre: &str, email: &str) -> Uuid {
    gateway
        .insert_user(NewUser {
            nombre: nombre.into(),
            email: email.into(),
            password: "textil1".into(),
        })
        .await
        .expect("seed usuario")
        .id
}

async fn seed_producto(gateway: &MemoryGateway, nombre: &str, precio: f64, stock: i32) -> Uuid {
    gateway
        .insert_product(NewProduct {
            nombre: nombre.into(),
            precio,
            stock,
            ..Default::default()
        })
        .await
        .expect("seed producto")
        .id
}

fn pedido_de(p1: Uuid, cantidad1: i32, p2: Uuid, cantidad2: i32, usuario_id: Uuid) -> CreateOrderRequest {
    CreateOrderRequest {
        usuario_id,
        items: vec![
            OrderItemRequest {
                producto_id: p1,
                cantidad: cantidad1,
            },
            OrderItemRequest {
                producto_id: p2,
                cantidad: cantidad2,
            },
        ],
        observaciones: Some("entrega en tienda".into()),
    }
}

#[tokio::test]
async fn create_order_total_matches_its_lines() {
    let (state, gateway) = setup();
    let usuario_id = seed_usuario(&gateway, "Lucia", "lucia@textil.com").await;
    let p1 = seed_producto(&gateway, "P1", 10.00, 5).await;
    let p2 = seed_producto(&gateway, "P2", 5.50, 1).await;

    let resp = order_service::create_order(&state, pedido_de(p1, 2, p2, 1, usuario_id))
        .await
        .expect("order created");
    assert!(resp.success);

    let pedido = resp.data.expect("order header");
    assert_eq!(pedido.total, 25.50);
    assert_eq!(pedido.estado, OrderStatus::Pending);
    assert_eq!(pedido.usuario_id, usuario_id);

    let orders = gateway.list_orders(None).await.unwrap();
    assert_eq!(orders.len(), 1);
    let detalles = &orders[0].detalles;
    assert_eq!(detalles.len(), 2);

    let suma: f64 = detalles.iter().map(|d| d.linea.subtotal).sum();
    assert_eq!(suma, pedido.total);

    let linea1 = detalles.iter().find(|d| d.linea.producto_id == p1).unwrap();
    assert_eq!(linea1.linea.precio_unitario, 10.00);
    assert_eq!(linea1.linea.subtotal, 20.00);
    let linea2 = detalles.iter().find(|d| d.linea.producto_id == p2).unwrap();
    assert_eq!(linea2.linea.precio_unitario, 5.50);
    assert_eq!(linea2.linea.subtotal, 5.50);

    // stock decrements landed: 5 - 2 and 1 - 1
    assert_eq!(gateway.find_product(p1).await.unwrap().unwrap().stock, 3);
    assert_eq!(gateway.find_product(p2).await.unwrap().unwrap().stock, 0);
}

#[tokio::test]
async fn failed_line_insert_removes_the_header() {
    let (state, gateway) = setup();
    let usuario_id = seed_usuario(&gateway, "Lucia", "lucia@textil.com").await;
    let p1 = seed_producto(&gateway, "P1", 10.00, 5).await;
    let p2 = seed_producto(&gateway, "P2", 5.50, 1).await;

    gateway.fail_next_line_inserts(1);

    let err = order_service::create_order(&state, pedido_de(p1, 2, p2, 1, usuario_id))
        .await
        .expect_err("line insert failure must surface");
    assert_eq!(err.error_type(), ErrorType::OrderError);

    // the compensating delete removed the header
    assert!(gateway.list_orders(None).await.unwrap().is_empty());

    // nothing was decremented
    assert_eq!(gateway.find_product(p1).await.unwrap().unwrap().stock, 5);
    assert_eq!(gateway.find_product(p2).await.unwrap().unwrap().stock, 1);
}

#[tokio::test]
async fn failed_compensation_is_not_reported_as_success() {
    let (state, gateway) = setup();
    let usuario_id = seed_usuario(&gateway, "Lucia", "lucia@textil.com").await;
    let p1 = seed_producto(&gateway, "P1", 10.00, 5).await;
    let p2 = seed_producto(&gateway, "P2", 5.50, 1).await;

    gateway.fail_next_line_inserts(1);
    gateway.fail_next_order_deletes(10);

    let err = order_service::create_order(&state, pedido_de(p1, 2, p2, 1, usuario_id))
        .await
        .expect_err("must stay an error even when the rollback fails");
    assert_eq!(err.error_type(), ErrorType::OrderError);

    // the orphaned header is a known gap; it must never turn into a success
    let orders = gateway.list_orders(None).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert!(orders[0].detalles.is_empty());
}

#[tokio::test]
async fn stock_update_failures_are_swallowed() {
    let (state, gateway) = setup();
    let usuario_id = seed_usuario(&gateway, "Lucia", "lucia@textil.com").await;
    let p1 = seed_producto(&gateway, "P1", 10.00, 5).await;
    let p2 = seed_producto(&gateway, "P2", 5.50, 1).await;

    gateway.fail_next_stock_updates(2);

    let resp = order_service::create_order(&state, pedido_de(p1, 2, p2, 1, usuario_id))
        .await
        .expect("stock failures do not fail the order");
    assert!(resp.success);

    // header and lines exist, stock attempts were lost
    assert_eq!(gateway.list_orders(None).await.unwrap().len(), 1);
    assert_eq!(gateway.find_product(p1).await.unwrap().unwrap().stock, 5);
    assert_eq!(gateway.find_product(p2).await.unwrap().unwrap().stock, 1);
}

#[tokio::test]
async fn create_order_fails_fast_when_offline() {
    let (state, gateway) = setup();
    let usuario_id = seed_usuario(&gateway, "Lucia", "lucia@textil.com").await;
    let p1 = seed_producto(&gateway, "P1", 10.00, 5).await;
    let p2 = seed_producto(&gateway, "P2", 5.50, 1).await;

    gateway.set_offline(true);
    let err = order_service::create_order(&state, pedido_de(p1, 2, p2, 1, usuario_id))
        .await
        .expect_err("probe must fail");
    assert_eq!(err.error_type(), ErrorType::NetworkError);

    gateway.set_offline(false);
    assert!(gateway.list_orders(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn oversized_quantity_is_rejected_before_any_write() {
    let (state, gateway) = setup();
    let usuario_id = seed_usuario(&gateway, "Lucia", "lucia@textil.com").await;
    let p1 = seed_producto(&gateway, "P1", 10.00, 5).await;

    let err = order_service::create_order(
        &state,
        CreateOrderRequest {
            usuario_id,
            items: vec![OrderItemRequest {
                producto_id: p1,
                cantidad: 6,
            }],
            observaciones: None,
        },
    )
    .await
    .expect_err("quantity above stock");
    assert_eq!(err.error_type(), ErrorType::ValidationError);
    assert!(gateway.list_orders(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_status_on_unknown_order_is_an_order_error() {
    let (state, _gateway) = setup();
    let err = order_service::update_order_status(&state, Uuid::new_v4(), OrderStatus::Completed)
        .await
        .expect_err("unknown id");
    assert_eq!(err.error_type(), ErrorType::OrderError);
}

#[tokio::test]
async fn any_status_may_follow_any_other() {
    let (state, gateway) = setup();
    let usuario_id = seed_usuario(&gateway, "Lucia", "lucia@textil.com").await;
    let p1 = seed_producto(&gateway, "P1", 10.00, 5).await;
    let p2 = seed_producto(&gateway, "P2", 5.50, 1).await;

    let pedido = order_service::create_order(&state, pedido_de(p1, 1, p2, 1, usuario_id))
        .await
        .unwrap()
        .data
        .unwrap();

    for estado in [
        OrderStatus::Completed,
        OrderStatus::Pending,
        OrderStatus::Cancelled,
        OrderStatus::Cancelled,
        OrderStatus::InProcess,
    ] {
        let updated = order_service::update_order_status(&state, pedido.id, estado)
            .await
            .expect("transition allowed")
            .data
            .unwrap();
        assert_eq!(updated.estado, estado);
    }
}

#[tokio::test]
async fn orders_are_listed_per_user_newest_first() {
    let (state, gateway) = setup();
    let lucia = seed_usuario(&gateway, "Lucia", "lucia@textil.com").await;
    let pedro = seed_usuario(&gateway, "Pedro", "pedro@textil.com").await;
    let p1 = seed_producto(&gateway, "P1", 10.00, 50).await;
    let p2 = seed_producto(&gateway, "P2", 5.50, 50).await;

    for usuario in [lucia, lucia, pedro] {
        order_service::create_order(&state, pedido_de(p1, 1, p2, 1, usuario))
            .await
            .unwrap();
    }

    let todos = order_service::list_orders(&state, None).await.unwrap().data.unwrap();
    assert_eq!(todos.items.len(), 3);
    assert!(
        todos
            .items
            .windows(2)
            .all(|w| w[0].pedido.fecha_emision >= w[1].pedido.fecha_emision)
    );

    let de_lucia = order_service::list_orders(&state, Some(lucia))
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(de_lucia.items.len(), 2);
    assert!(de_lucia.items.iter().all(|o| o.pedido.usuario_id == lucia));
}

#[tokio::test]
async fn duplicate_email_creates_no_second_row() {
    let (state, gateway) = setup();

    let request = || RegisterRequest {
        nombre: "Lucia".into(),
        email: "lucia@textil.com".into(),
        password: "textil1".into(),
        confirm_password: "textil1".into(),
    };

    auth_service::register(&state, request()).await.expect("first registration");
    let err = auth_service::register(&state, request())
        .await
        .expect_err("second registration");
    assert_eq!(err.error_type(), ErrorType::DuplicateEmail);
    assert_eq!(gateway.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let (state, _gateway) = setup();

    auth_service::register(
        &state,
        RegisterRequest {
            nombre: "Lucia".into(),
            email: "lucia@textil.com".into(),
            password: "textil1".into(),
            confirm_password: "textil1".into(),
        },
    )
    .await
    .unwrap();

    let err = auth_service::login(
        &state,
        LoginRequest {
            email: "lucia@textil.com".into(),
            password: "otracosa9".into(),
        },
    )
    .await
    .expect_err("wrong password");
    assert_eq!(err.error_type(), ErrorType::InvalidCredentials);
}

#[tokio::test]
async fn admin_pair_logs_in_without_the_gateway() {
    let (state, gateway) = setup();
    gateway.set_offline(true);

    let resp = auth_service::login(
        &state,
        LoginRequest {
            email: "admin@textil.com".into(),
            password: "123456".into(),
        },
    )
    .await
    .expect("admin bypass works offline");
    assert!(resp.success);

    let data = resp.data.unwrap();
    assert_eq!(data.usuario.nombre, "Administrador");

    let session = state.sessions.load(data.token).await.expect("session persisted");
    assert_eq!(session.usuario.email, "admin@textil.com");
}

#[tokio::test]
async fn regular_login_needs_the_gateway() {
    let (state, gateway) = setup();
    gateway.set_offline(true);

    let err = auth_service::login(
        &state,
        LoginRequest {
            email: "lucia@textil.com".into(),
            password: "textil1".into(),
        },
    )
    .await
    .expect_err("offline login");
    assert_eq!(err.error_type(), ErrorType::NetworkError);
}

#[tokio::test]
async fn logout_clears_the_session() {
    let (state, _gateway) = setup();

    let resp = auth_service::login(
        &state,
        LoginRequest {
            email: "admin@textil.com".into(),
            password: "123456".into(),
        },
    )
    .await
    .unwrap();
    let token = resp.data.unwrap().token;

    auth_service::logout(&state, token).await.unwrap();
    assert!(state.sessions.load(token).await.is_none());
}
