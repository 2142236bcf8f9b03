use actix_web::web;

use crate::error::AppError;
use crate::handlers::{describe_image, health, image_songs, question};

/// JSON extractor configuration that folds deserialization failures into the
/// error envelope instead of actix's default plain-text 400.
pub fn json_extractor_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid JSON body: {}", err)).into()
    })
}

// Configure the relay routes. All three POST endpoints sit behind the same
// process-wide cooldown gate enforced inside each handler.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_extractor_config());
    cfg.service(
        web::resource("/describe-image").route(web::post().to(describe_image::describe_image)),
    );
    cfg.service(
        web::resource("/image-to-serch-songs")
            .route(web::post().to(image_songs::image_to_search_songs)),
    );
    cfg.service(web::resource("/question").route(web::post().to(question::question)));
    cfg.service(web::resource("/health").route(web::get().to(health::health_check)));
}
