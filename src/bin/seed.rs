use uuid::Uuid;

use textil_pedidos_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool},
    gateway::{Gateway, PgGateway},
    models::{NewProduct, NewUser},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let gateway = PgGateway::new(create_orm_conn(&config.database_url).await?);

    let usuario_id = ensure_usuario(&gateway, "Maria Fernanda", "maria@textil.com", "textil1").await?;
    seed_productos(&gateway).await?;

    println!("Seed completed. Usuario ID: {usuario_id}");
    Ok(())
}

async fn ensure_usuario(
    gateway: &PgGateway,
    nombre: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = gateway.find_user_by_email(email).await? {
        println!("Usuario {email} already present");
        return Ok(existing.id);
    }

    let user = gateway
        .insert_user(NewUser {
            nombre: nombre.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
        .await?;
    println!("Created usuario {email}");
    Ok(user.id)
}

async fn seed_productos(gateway: &PgGateway) -> anyhow::Result<()> {
    let productos = vec![
        ("Camiseta básica", "Algodón peinado 24/1", 10.00, 50, "camisetas", "M", "blanco"),
        ("Polo piqué", "Piqué 220 g con cuello tejido", 15.50, 30, "polos", "L", "azul marino"),
        ("Buzo con capucha", "Felpa perchada interior", 28.90, 20, "buzos", "M", "gris"),
        ("Pantalón cargo", "Drill stretch con bolsillos", 32.00, 15, "pantalones", "32", "beige"),
    ];

    let existentes = gateway.list_products().await?;
    for (nombre, descripcion, precio, stock, categoria, talla, color) in productos {
        if existentes.iter().any(|p| p.nombre == nombre) {
            continue;
        }
        gateway
            .insert_product(NewProduct {
                nombre: nombre.to_string(),
                descripcion: Some(descripcion.to_string()),
                precio,
                stock,
                categoria: Some(categoria.to_string()),
                talla: Some(talla.to_string()),
                color: Some(color.to_string()),
                imagen_url: None,
            })
            .await?;
        println!("Seeded producto {nombre} ({precio:.2})");
    }

    Ok(())
}
