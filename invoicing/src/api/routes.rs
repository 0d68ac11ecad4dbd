use crate::service::invoice::InvoiceService;
use crate::service::payment::PaymentService;
use crate::service::user::UserService;
use crate::service::AppError;
use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
pub struct CreateInvoiceBody {
    pub user_id: i64,
    pub amount: f64,
    pub label: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct CreateInvoiceResponse {
    pub invoice_id: i64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct TransactionBody {
    pub invoice_id: i64,
    pub amount: f64,
    pub reference: String,
}

#[derive(Deserialize, Serialize, Debug, PartialEq)]
pub struct UserResponse {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub balance: f64,
}

fn bad_request(msg: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().body(msg.to_string())
}

#[post("/invoice")]
pub async fn create_invoice(
    req_body: String,
    app: web::Data<InvoiceService>,
) -> Result<HttpResponse, AppError> {
    let body = match serde_json::from_str::<CreateInvoiceBody>(req_body.as_str()) {
        Ok(body) => body,
        Err(err) => return Ok(bad_request(format!("invalid request payload: {}", err))),
    };

    let invoice_id = app
        .create_invoice(body.user_id, body.amount, &body.label)
        .await?;

    Ok(HttpResponse::Created().json(&CreateInvoiceResponse { invoice_id }))
}

#[post("/transaction")]
pub async fn process_transaction(
    req_body: String,
    app: web::Data<PaymentService>,
) -> Result<HttpResponse, AppError> {
    let body = match serde_json::from_str::<TransactionBody>(req_body.as_str()) {
        Ok(body) => body,
        Err(err) => return Ok(bad_request(format!("invalid request payload: {}", err))),
    };
    if body.amount.is_nan() || body.amount <= 0.0 {
        return Ok(bad_request("amount must be greater than zero"));
    }
    if body.reference.trim().is_empty() {
        return Ok(bad_request("reference must not be empty"));
    }

    app.process_transaction(body.invoice_id, body.amount, &body.reference)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

#[get("/users")]
pub async fn list_users(app: web::Data<UserService>) -> Result<HttpResponse, AppError> {
    let users: Vec<UserResponse> = app
        .list_users()
        .await?
        .into_iter()
        .map(|user| UserResponse {
            user_id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            balance: user.balance.to_decimal(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(users))
}

#[get("/ping")]
pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().finish()
}
