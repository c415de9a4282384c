//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod admin;
pub mod auth;
pub mod cars;
pub mod error;
pub mod health;
pub mod leads;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

/// Register the `/api` routes and the JSON and path error handlers.
///
/// Callers provide `web::Data<HttpState>` and `web::Data<TokenIssuer>`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use dealership::inbound::http::configure_api;
///
/// let _app = App::new().configure(configure_api);
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(
            web::scope("/api")
                .service(users::register)
                .service(users::login)
                .service(cars::list_cars)
                .service(cars::get_car)
                .service(cars::book_car)
                .service(leads::create_lead)
                .service(
                    web::scope("/admin")
                        .service(admin::dashboard)
                        .service(admin::create_car)
                        .service(admin::update_car_status)
                        .service(admin::delete_car),
                ),
        );
}
