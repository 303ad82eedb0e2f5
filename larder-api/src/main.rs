use std::net::SocketAddr;
use std::sync::Arc;

use larder_api::{app, AppState};
use larder_catalog::Product;
use larder_core::Repository;
use larder_store::app_config::StoreBackend;
use larder_store::{Config, DbClient, MemoryRepository, PgRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "larder_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Larder API on port {}", config.server.port);

    let repo: Arc<dyn Repository> = match config.store.backend {
        StoreBackend::Postgres => {
            let db = DbClient::connect(&config.database)
                .await
                .expect("Failed to connect to Postgres");
            db.migrate().await.expect("Failed to run migrations");
            Arc::new(PgRepository::new(db.pool.clone()))
        }
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store; data is lost on shutdown");
            Arc::new(MemoryRepository::new())
        }
    };

    seed_demo_catalog(repo.as_ref()).await;

    let app = app(AppState { repo });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app).await.expect("Server error");
}

/// Seed a small demo catalog at startup. Against Postgres, re-seeding is a
/// no-op: the insert dedups on (brand, size, container_type).
async fn seed_demo_catalog(repo: &dyn Repository) {
    let demo = [
        ("Coca Cola 330ml Can", "Coca Cola", 330, "can", 24, 5.5, "drinks"),
        ("Fanta 330ml Can", "Fanta", 330, "can", 24, 5.5, "drinks"),
        ("Red Pepper 1kg", "Fresh Farms", 1000, "bag", 0, 15.0, "vegetables"),
        ("Milk 1L", "Dairy Co", 1000, "bottle", 12, 6.5, "dairy"),
        ("Hummus 400g", "Levant", 400, "can", 12, 8.0, "canned"),
    ];

    for (name, brand, size, container_type, box_size, price, category) in demo {
        match Product::new(name, brand, size, container_type, box_size, price, category) {
            Ok(product) => {
                if let Err(err) = repo.add_product(&product).await {
                    tracing::warn!("seeding {name}: {err}");
                }
            }
            Err(err) => tracing::warn!("seeding {name}: {err}"),
        }
    }
}
