use actix_web::web;

use crate::handlers::{auth, users};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::index)
        .service(auth::login)
        .service(auth::register)
        // The gateway probes this with whatever method the original
        // request used, so it matches any verb.
        .route("/verify", web::route().to(auth::verify))
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user);
}
