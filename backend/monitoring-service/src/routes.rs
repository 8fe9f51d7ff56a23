use actix_web::web;

use crate::handlers::consumption;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(consumption::index)
        .service(consumption::historical_consumption);
}
