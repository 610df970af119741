use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// `axum::Json` with rejections reported as 400 in the shared error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` with rejections reported the same way.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
