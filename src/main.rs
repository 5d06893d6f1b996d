mod api;
mod app;
mod constants;
mod errors;
mod models;

use actix_web::middleware::Logger;
use actix_web::{web, App as ActixWebApp, HttpServer};
use api::*;
use app::App;
use log::info;
use std::sync::Arc;

use crate::models::counter::store::CounterStore;

#[tokio::main]
async fn main() {
    let app = App::new()
        .await
        .unwrap_or_else(|e| panic!("Unable to start resume-counter.\n{}", e));

    app.init();

    let port = app.port();
    let store: Arc<dyn CounterStore> = app.store();
    let store_web_data = web::Data::from(store);

    info!("starting resume-counter on port {}", port);

    HttpServer::new(move || {
        ActixWebApp::new()
            .wrap(Logger::new("%a %r %s %b %{Referer}i %{User-Agent}i %T"))
            .app_data(store_web_data.clone())
            .service(
                web::scope("/visits")
                    .service(get_visit_count)
                    .service(visit_count_preflight),
            )
    })
    .bind(("0.0.0.0", port))
    .unwrap_or_else(|e| panic!("Could not bind to port {}.\n{}", port, e))
    .run()
    .await
    .unwrap_or_else(|e| panic!("Could not run server on port {}.\n{}", port, e));
}
