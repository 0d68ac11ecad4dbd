use crate::api::metrics::{serve_metrics, Metrics};
use crate::api::routes::{create_invoice, list_users, ping, process_transaction};
use crate::infra::repository::Repositories;
use crate::service::invoice::InvoiceService;
use crate::service::payment::PaymentService;
use crate::service::user::UserService;
use actix_cors::Cors;
use actix_web::web;
use actix_web::web::ServiceConfig;
use std::time::Duration;

pub fn create_app(
    repos: Repositories,
    deadline: Duration,
    metrics: web::Data<Metrics>,
) -> Box<dyn Fn(&mut ServiceConfig)> {
    let invoice_service = web::Data::new(InvoiceService::new(
        repos.user_finder,
        repos.invoice_creator,
        deadline,
    ));
    let payment_service = web::Data::new(PaymentService::new(
        repos.invoice_finder,
        repos.payments,
        deadline,
    ));
    let user_service = web::Data::new(UserService::new(repos.user_lister, deadline));

    Box::new(move |cfg: &mut ServiceConfig| {
        cfg.app_data(invoice_service.clone())
            .app_data(payment_service.clone())
            .app_data(user_service.clone())
            .app_data(metrics.clone())
            .service(create_invoice)
            .service(process_transaction)
            .service(list_users)
            .service(serve_metrics);
    })
}

/// Liveness and metrics, for the listener on the internal port.
pub fn create_internal_app(metrics: web::Data<Metrics>) -> Box<dyn Fn(&mut ServiceConfig)> {
    Box::new(move |cfg: &mut ServiceConfig| {
        cfg.app_data(metrics.clone())
            .service(ping)
            .service(serve_metrics);
    })
}

pub fn cors(origin: Option<&str>) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::ACCEPT,
        ])
        .max_age(3600);

    match origin {
        Some(origin) => cors.allowed_origin(origin),
        None => cors,
    }
}
