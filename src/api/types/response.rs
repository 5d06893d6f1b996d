use actix_web::HttpResponse;

use crate::errors::CounterError;

pub type Response = Result<HttpResponse, CounterError>;
