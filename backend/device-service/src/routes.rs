use actix_web::web;

use crate::handlers::devices;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(devices::index)
        .service(devices::list_devices)
        .service(devices::my_devices)
        .service(devices::get_device)
        .service(devices::create_device)
        .service(devices::update_device)
        .service(devices::delete_device);
}
