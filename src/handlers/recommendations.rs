use crate::{
    error::ApiError,
    models::RecommendationRequest,
    services::RecommendationService,
};
use actix_web::{
    web::{self, Json},
    HttpResponse,
};
use tracing::info;

pub fn recommendations_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/recommend")
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                ApiError::InvalidInput(format!("Malformed request body: {}", err)).into()
            }))
            .route(web::post().to(recommend)),
    );
}

/// Recommend dishes near the requested location that satisfy the free-text query.
pub async fn recommend(
    request: Json<RecommendationRequest>,
    recommendation_service: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    info!("Recommendation request: {:?}", request.query);

    let response = recommendation_service.recommend(&request).await?;

    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_LAT, DEFAULT_LNG};
    use crate::models::RecommendationResponse;
    use crate::services::recommendation::tests::{search_settings, seeded_store};
    use crate::services::{RuleEngine, Strategy, Vocabulary};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use std::sync::Arc;

    async fn service(require_location: bool) -> web::Data<RecommendationService> {
        web::Data::new(RecommendationService::new(
            seeded_store().await,
            search_settings(require_location),
            Strategy::Rules(RuleEngine::new(Arc::new(Vocabulary::builtin()), 10)),
        ))
    }

    #[actix_web::test]
    async fn test_recommend_returns_matches() {
        let app = test::init_service(
            App::new()
                .app_data(service(true).await)
                .configure(recommendations_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/recommend")
            .set_json(json!({
                "query": "something refreshing",
                "location": {"lat": DEFAULT_LAT, "lng": DEFAULT_LNG}
            }))
            .to_request();
        let body: RecommendationResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.recommendations.len(), 1);
        assert_eq!(body.recommendations[0]["name"], "Mango Lassi");
        assert!(body.recommendations[0]["restaurant"]["lat"].is_f64());
        assert_eq!(body.debug.unwrap().items_matched, 1);
    }

    #[actix_web::test]
    async fn test_missing_location_is_bad_request_in_strict_mode() {
        let app = test::init_service(
            App::new()
                .app_data(service(true).await)
                .configure(recommendations_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/recommend")
            .set_json(json!({"query": "spicy"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("Location required"));
    }

    #[actix_web::test]
    async fn test_missing_location_uses_default_in_permissive_mode() {
        let app = test::init_service(
            App::new()
                .app_data(service(false).await)
                .configure(recommendations_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/recommend")
            .set_json(json!({"query": "spicy vegetarian"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: RecommendationResponse = test::read_body_json(resp).await;
        assert_eq!(body.recommendations.len(), 2);
    }

    #[actix_web::test]
    async fn test_malformed_body_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(service(true).await)
                .configure(recommendations_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/recommend")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
