use axum::{
    extract::{rejection::QueryRejection, Query},
    Json,
};

use crate::{
    domain::tts::{
        dto::{LanguageResponse, VoiceQuery},
        voice_catalog::{self, VoiceOption},
        LanguageCode, ProviderId,
    },
    error::{AppError, AppResult},
};

/// GET /api/voices?provider=&language= - Built-in voices, filtered
pub async fn list_voices(
    query: Result<Query<VoiceQuery>, QueryRejection>,
) -> AppResult<Json<Vec<VoiceOption>>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let providers = match query.provider {
        Some(provider) => vec![provider],
        None => ProviderId::ALL.to_vec(),
    };

    let voices = providers
        .into_iter()
        .flat_map(|provider| voice_catalog::voices(provider, query.language))
        .collect();

    Ok(Json(voices))
}

/// GET /api/languages
pub async fn list_languages() -> Json<Vec<LanguageResponse>> {
    Json(
        LanguageCode::ALL
            .iter()
            .map(|code| LanguageResponse {
                code: *code,
                name: code.display_name(),
            })
            .collect(),
    )
}
