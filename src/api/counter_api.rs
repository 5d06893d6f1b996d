use actix_web::http::header;
use actix_web::{get, options, web, HttpResponse};
use log::info;
use serde_json::json;

use crate::api::types::Response;
use crate::constants::{ALLOWED_HEADERS, ALLOWED_METHODS, ALLOWED_ORIGIN};
use crate::models::counter::store::CounterStore;
use crate::models::counter::VisitCount;

#[get("")]
pub async fn get_visit_count(store: web::Data<dyn CounterStore>) -> Response {
    let count = VisitCount::increment_and_get(store.get_ref()).await?;

    info!("visit counted: {}", count);

    Ok(HttpResponse::Ok()
        .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, ALLOWED_ORIGIN))
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS))
        .json(json!({
            "count": count
        })))
}

/// CORS preflight for the counter endpoint.
#[options("")]
pub async fn visit_count_preflight() -> Response {
    Ok(HttpResponse::NoContent()
        .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, ALLOWED_ORIGIN))
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS))
        .finish())
}
