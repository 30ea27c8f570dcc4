use actix_cors::Cors;
use actix_web::{error, web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};
use startflow_models::{
    Recommendations, Services, SpendFeatures, StartupFeatures, DEFAULT_TOP_N,
};
use std::sync::Arc;
use tracing::{debug, info};

pub const SERVICE_NAME: &str = "StartFlow AI API";

#[derive(Deserialize)]
struct RecommendationRequest {
    #[serde(alias = "industry")]
    query: Option<String>,
    #[serde(rename = "topN", alias = "top_n")]
    top_n: Option<i64>,
}

#[derive(Serialize)]
struct RecommendationResponse {
    success: bool,
    query: String,
    #[serde(flatten)]
    recommendations: Recommendations,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(services: Arc<Services>, host: String, port: u16) -> std::io::Result<()> {
        info!("HTTP API listening on {}:{}", host, port);
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(services.clone()))
                .configure(Self::configure)
        })
        .bind((host.as_str(), port))?
        .run()
        .await
    }

    /// Routes and extractor settings, shared by the server and tests
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.app_data(json_config())
            .route("/", web::get().to(root))
            .route("/health", web::get().to(health))
            .route("/ai/recommendations", web::post().to(recommendations))
            .route("/ai/predict-startup-success", web::post().to(predict_startup_success))
            .route("/ai/predict-profit", web::post().to(predict_profit));
    }
}

/// Malformed bodies get the same `{error}` shape as validation failures
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(serde_json::json!({
            "error": err.to_string()
        }));
        error::InternalError::from_response(err, response).into()
    })
}

fn bad_request(message: impl ToString) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "error": message.to_string()
    }))
}

async fn root() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Welcome to {}", SERVICE_NAME),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "recommendations": "/ai/recommendations",
            "startup_success": "/ai/predict-startup-success",
            "profit_prediction": "/ai/predict-profit",
            "health": "/health"
        }
    })))
}

async fn health(services: web::Data<Arc<Services>>) -> ActixResult<HttpResponse> {
    let status = services.status();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "modelsLoaded": status.models_loaded,
        "artifacts": status.artifacts,
    })))
}

async fn recommendations(
    services: web::Data<Arc<Services>>,
    req: web::Json<RecommendationRequest>,
) -> ActixResult<HttpResponse> {
    let RecommendationRequest { query, top_n } = req.into_inner();
    let Some(query) = query else {
        return Ok(bad_request("missing field `query` (or `industry`)"));
    };
    let top_n = match top_n {
        None => DEFAULT_TOP_N,
        Some(n) if n >= 1 => usize::try_from(n).unwrap_or(usize::MAX),
        Some(n) => return Ok(bad_request(format!("topN must be at least 1, got {n}"))),
    };

    debug!("Recommending {} companies for '{}'", top_n, query);
    let recommendations = services.recommend(&query, top_n);
    Ok(HttpResponse::Ok().json(RecommendationResponse {
        success: true,
        query,
        recommendations,
    }))
}

async fn predict_startup_success(
    services: web::Data<Arc<Services>>,
    req: web::Json<StartupFeatures>,
) -> ActixResult<HttpResponse> {
    let features = req.into_inner();
    if let Err(e) = features.validate() {
        return Ok(bad_request(e));
    }

    // may train on first use
    let services = services.get_ref().clone();
    let prediction = web::block(move || services.predict_success(&features)).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "interpretation": {
            "successLikely": prediction.predicted_class == 1,
            "confidence": prediction.success_probability,
            "riskLevel": prediction.risk_level(),
        },
        "prediction": prediction,
    })))
}

async fn predict_profit(
    services: web::Data<Arc<Services>>,
    req: web::Json<SpendFeatures>,
) -> ActixResult<HttpResponse> {
    let features = req.into_inner();
    if let Err(e) = features.validate() {
        return Ok(bad_request(e));
    }

    let services = services.get_ref().clone();
    let (prediction, insights) = web::block(move || {
        (
            services.predict_profit(&features),
            services.spending_insights(&features),
        )
    })
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "prediction": prediction,
        "insights": insights,
    })))
}
