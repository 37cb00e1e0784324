use axum::extract::FromRequest;

use crate::api::errors::ApiError;

/// JSON body extractor whose rejections are reported as [`ApiError`]s.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
