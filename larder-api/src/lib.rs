use axum::{
    http::{header, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod products;
pub mod state;
pub mod stock;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/{id}/stock", get(stock::get_stock))
        .route("/products/{id}/stock/adjust", post(stock::adjust_stock))
        .route("/products/{id}/stock/min", put(stock::set_min_stock))
        .route("/stock/low", get(stock::low_stock))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
