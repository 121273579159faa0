use std::io;
use rocket::{
    http::Status,
    request::Request,
    response::{self, Responder},
    serde::json::Json,
};
use serde_json::json;
use log::{error, warn};

use crate::store::StoreError;


#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Error processing image: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Error saving image: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Invalid report payload: {0}")]
    InvalidPayload(String),

    #[error("Request body too large: {0}")]
    TooLarge(String),
}

impl ReportError {
    pub fn status(&self) -> Status {
        match self {
            ReportError::Validation(_) | ReportError::MalformedBody(_) => Status::BadRequest,
            ReportError::InvalidPayload(_) => Status::UnprocessableEntity,
            ReportError::TooLarge(_) => Status::PayloadTooLarge,
            ReportError::Store(_) | ReportError::Io(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for ReportError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();

        if status.code >= 500 {
            error!("{} {} failed: {}", req.method(), req.uri(), self);
        }
        else {
            warn!("{} {} rejected: {}", req.method(), req.uri(), self);
        }

        (status, Json(json!({ "detail": self.to_string() }))).respond_to(req)
    }
}
