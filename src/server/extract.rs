use axum::{
    extract::{FromRequest, Request},
    Json,
};

use super::error::ApiError;
use crate::entity::NoteInput;
use crate::storage::Document;

/// JSON body that has passed the note input schema.
///
/// Both malformed JSON and schema violations reject with 422. The body is
/// read as a plain object first so missing or mistyped fields can be named.
pub struct NoteBody(pub NoteInput);

impl<S> FromRequest<S> for NoteBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Document>::from_request(req, state).await?;
        Ok(Self(NoteInput::from_json(&body)?))
    }
}
