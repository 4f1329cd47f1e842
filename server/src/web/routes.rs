// server/src/web/routes.rs

use actix_web::{error, web, HttpRequest, HttpResponse};

use crate::errors::AppError;
use crate::web::handlers::{auth_handlers, cart_handlers, menu_handlers, order_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Malformed bodies and path segments get the same `{success:false}` body as
// every other failure.
fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
  AppError::Validation(format!("Invalid request body: {}", err)).into()
}

fn path_error_handler(err: error::PathError, _req: &HttpRequest) -> error::Error {
  AppError::Validation(format!("Invalid path parameter: {}", err)).into()
}

/// Mounts every endpoint under `/api`. Called from `main.rs` and the
/// integration tests.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler))
    .service(
      web::scope("/api")
        .route("/health", web::get().to(health_check_handler))
        .route("/register", web::post().to(auth_handlers::register_handler))
        .route("/login", web::post().to(auth_handlers::login_handler))
        .service(
          web::resource("/menu")
            .route(web::get().to(menu_handlers::list_menu_handler))
            .route(web::post().to(menu_handlers::create_menu_item_handler)),
        )
        .service(
          web::scope("/cart")
            .route("", web::post().to(cart_handlers::add_to_cart_handler))
            .route("/update", web::put().to(cart_handlers::update_cart_item_handler))
            .route("/{user_id}", web::get().to(cart_handlers::get_cart_handler))
            .route("/{cart_id}", web::delete().to(cart_handlers::remove_cart_item_handler)),
        )
        .route("/order", web::post().to(order_handlers::place_order_handler))
        .service(
          web::scope("/orders")
            .route("/user/{user_id}", web::get().to(order_handlers::list_user_orders_handler))
            .route(
              "/restaurant/{restaurant}",
              web::get().to(order_handlers::list_restaurant_orders_handler),
            )
            .route(
              "/{order_id}/status",
              web::put().to(order_handlers::update_order_status_handler),
            ),
        ),
    );
}
