use actix_web::web;

use crate::handlers::profiles;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(profiles::index)
        .service(profiles::list_profiles)
        .service(profiles::get_profile)
        .service(profiles::create_profile)
        .service(profiles::update_profile)
        .service(profiles::delete_profile);
}
