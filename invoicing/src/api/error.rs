use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::service::AppError;

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::AmountMismatch => StatusCode::BAD_REQUEST,
            AppError::InvoiceNotFound => StatusCode::NOT_FOUND,
            AppError::AlreadyPaid => StatusCode::CONFLICT,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(err) = self {
            log::error!(error = format!("{:#}", err); "Request failed");
        }
        // Display of Internal is opaque; the cause only goes to the log.
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}
