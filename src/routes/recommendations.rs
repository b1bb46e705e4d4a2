use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::Recommendation,
    routes::AppState,
};

/// Cap applied when the request does not name one
pub const DEFAULT_MAX_RECOMMENDATIONS: i64 = 10;

/// A name or id sent either as a JSON string or as a bare number
#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// Accepts numeric identifiers and binds them as their decimal text
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<TextOrNumber>::deserialize(deserializer)?.map(|value| match value {
            TextOrNumber::Text(s) => s,
            TextOrNumber::Integer(n) => n.to_string(),
            TextOrNumber::Float(n) => n.to_string(),
        }),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecommendationRequest {
    #[serde(default, deserialize_with = "text_or_number")]
    pub game_name: Option<String>,
    pub max_recommendations: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecommendationRequest {
    #[serde(default, deserialize_with = "text_or_number")]
    pub user_id: Option<String>,
    pub max_recommendations: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub success: bool,
    pub recommendations: Vec<Recommendation>,
}

impl From<Vec<Recommendation>> for RecommendationResponse {
    fn from(recommendations: Vec<Recommendation>) -> Self {
        Self {
            success: true,
            recommendations,
        }
    }
}

/// Unwraps the JSON body, turning extractor rejections into our error shape
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(request)| request)
        .map_err(|e| AppError::InvalidInput(format!("JSON body required: {}", e.body_text())))
}

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("{} is required", field)))
}

fn user_request(
    payload: Result<Json<UserRecommendationRequest>, JsonRejection>,
) -> AppResult<(String, i64)> {
    let request = body(payload)?;
    let user_id = required(request.user_id, "userId")?;
    let limit = request
        .max_recommendations
        .unwrap_or(DEFAULT_MAX_RECOMMENDATIONS);
    Ok((user_id, limit))
}

/// Handler for recommendations similar to a seed game
pub async fn by_game(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<GameRecommendationRequest>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let request = body(payload)?;
    let game_name = required(request.game_name, "gameName")?;
    let limit = request
        .max_recommendations
        .unwrap_or(DEFAULT_MAX_RECOMMENDATIONS);

    tracing::info!(
        request_id = %request_id,
        game_name = %game_name,
        limit,
        "Processing by-game recommendation request"
    );

    let recommendations = state
        .recommender
        .recommend_by_game(&game_name, limit)
        .await?;

    Ok(Json(recommendations.into()))
}

/// Handler for recommendations from the user's liked genres and platforms
pub async fn by_preferences(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<UserRecommendationRequest>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let (user_id, limit) = user_request(payload)?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        limit,
        "Processing by-preferences recommendation request"
    );

    let recommendations = state
        .recommender
        .recommend_by_preferences(&user_id, limit)
        .await?;

    Ok(Json(recommendations.into()))
}

/// Handler for recommendations from the user's social graph
pub async fn by_friends(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<UserRecommendationRequest>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let (user_id, limit) = user_request(payload)?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        limit,
        "Processing by-friends recommendation request"
    );

    let recommendations = state
        .recommender
        .recommend_by_friends(&user_id, limit)
        .await?;

    Ok(Json(recommendations.into()))
}

/// Handler for recommendations from users with overlapping likes
pub async fn by_similar_users(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<UserRecommendationRequest>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let (user_id, limit) = user_request(payload)?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        limit,
        "Processing by-similar-users recommendation request"
    );

    let recommendations = state
        .recommender
        .recommend_by_similar_users(&user_id, limit)
        .await?;

    Ok(Json(recommendations.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required(Some(" u1 ".into()), "userId").unwrap(), "u1");
        assert!(required(Some("   ".into()), "userId").is_err());

        let err = required(None, "gameName").unwrap_err();
        assert!(err.to_string().contains("gameName is required"));
    }

    #[test]
    fn test_request_field_names() {
        let request: UserRecommendationRequest =
            serde_json::from_str(r#"{"userId": "u1", "maxRecommendations": 3}"#).unwrap();
        assert_eq!(request.user_id.as_deref(), Some("u1"));
        assert_eq!(request.max_recommendations, Some(3));

        let request: GameRecommendationRequest =
            serde_json::from_str(r#"{"gameName": "Halo"}"#).unwrap();
        assert_eq!(request.game_name.as_deref(), Some("Halo"));
        assert_eq!(request.max_recommendations, None);
    }

    #[test]
    fn test_numeric_ids_bind_as_text() {
        let request: UserRecommendationRequest =
            serde_json::from_str(r#"{"userId": 42}"#).unwrap();
        assert_eq!(request.user_id.as_deref(), Some("42"));

        let request: GameRecommendationRequest =
            serde_json::from_str(r#"{"gameName": 1942, "maxRecommendations": 2}"#).unwrap();
        assert_eq!(request.game_name.as_deref(), Some("1942"));

        let request: UserRecommendationRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(request.user_id, None);

        let request: UserRecommendationRequest =
            serde_json::from_str(r#"{"userId": null}"#).unwrap();
        assert_eq!(request.user_id, None);

        assert!(serde_json::from_str::<UserRecommendationRequest>(r#"{"userId": [1]}"#).is_err());
    }
}
