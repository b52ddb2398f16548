use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::http::handlers::auth::OwnerAuth;
use crate::http::server::AppState;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfigResponse {
    public_portal_url: Option<String>,
}

/// Handles GET /api/config: settings the owner dashboard needs to render QR codes.
pub async fn config_handler(_auth: OwnerAuth, State(state): State<AppState>) -> Json<PublicConfigResponse> {
    Json(PublicConfigResponse {
        public_portal_url: state.settings().public_portal_url.clone(),
    })
}
