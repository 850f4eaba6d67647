use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use std::sync::Arc;

use crate::{
    domain::credentials::{CredentialPools, PoolStatus},
    domain::tts::{dto::UpdateCredentialsRequest, ProviderId},
    error::{AppError, AppResult},
};

pub struct CredentialsController {
    pools: Arc<CredentialPools>,
}

impl CredentialsController {
    pub fn new(pools: Arc<CredentialPools>) -> Self {
        Self { pools }
    }

    /// GET /api/credentials - Pool configuration per provider, keys masked
    pub async fn list(
        State(controller): State<Arc<CredentialsController>>,
    ) -> AppResult<Json<Vec<PoolStatus>>> {
        Ok(Json(controller.pools.status()))
    }

    /// PUT /api/credentials/:provider - Replace the key list of one provider
    pub async fn replace(
        State(controller): State<Arc<CredentialsController>>,
        provider: Result<Path<ProviderId>, PathRejection>,
        payload: Result<Json<UpdateCredentialsRequest>, JsonRejection>,
    ) -> AppResult<Json<PoolStatus>> {
        let Path(provider) =
            provider.map_err(|_| AppError::NotFound("unknown provider".to_string()))?;
        let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

        let pool = controller
            .pools
            .get(provider)
            .ok_or_else(|| AppError::NotFound(format!("provider {} is not available", provider)))?;

        let mut pool = pool.lock().await;
        pool.replace_keys(request.keys)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Json(pool.status()))
    }
}
