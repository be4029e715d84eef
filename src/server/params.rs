use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde_qs::Config;

/// Extractor for `serde_qs` query strings, which unlike
/// [`axum::extract::Query`] understands sequences such as
/// `waypoints[0]=Davis&waypoints[1]=Porter`.
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        let query = parts
            .uri
            .query()
            .ok_or_else(|| (StatusCode::BAD_REQUEST, "Missing query string".to_string()))?;

        let params = Config::default().deserialize_str(query).map_err(|err| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to deserialize query string: {err}"),
            )
        })?;

        Ok(QueryParams(params))
    }
}
