use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::stream::{self, Stream};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::{
    domain::tts::{JobEvent, TtsRequest, TtsService, TtsServiceApi, TtsSynthesisResult},
    error::{AppError, AppResult},
};

pub const X_SEGMENT_COUNT: &str = "x-segment-count";
pub const X_CHARACTER_COUNT: &str = "x-character-count";
pub const X_LANGUAGE: &str = "x-language";
pub const X_PROVIDER: &str = "x-provider";
pub const X_IMAGE_PROMPT: &str = "x-image-prompt";

pub struct TtsController {
    tts_service: Arc<TtsService>,
}

impl TtsController {
    pub fn new(tts_service: Arc<TtsService>) -> Self {
        Self { tts_service }
    }

    /// POST /api/tts/synthesize - Narrate text into one audio file
    pub async fn synthesize(
        State(controller): State<Arc<TtsController>>,
        payload: Result<Json<TtsRequest>, JsonRejection>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

        let result = controller.tts_service.synthesize(request, None).await?;

        let headers = result_headers(&result)?;
        Ok((StatusCode::OK, headers, Body::from(result.audio_data.clone())))
    }

    /// POST /api/tts/synthesize/stream - Narrate text, streaming each segment as it is ready
    pub async fn synthesize_stream(
        State(controller): State<Arc<TtsController>>,
        payload: Result<Json<TtsRequest>, JsonRejection>,
    ) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
        let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let service = controller.tts_service.clone();

        // The job runs to completion even if the client disconnects
        tokio::spawn(async move {
            let _ = service.synthesize(request, Some(tx)).await;
        });

        let events = stream::unfold(rx, |mut rx| async move {
            let event = rx.recv().await?;
            Some((Ok(to_sse_event(&event)), rx))
        });

        Ok(Sse::new(events).keep_alive(KeepAlive::default()))
    }
}

fn result_headers(result: &TtsSynthesisResult) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(result.mime_type()),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        header_value(&format!(
            "attachment; filename=\"narration.{}\"",
            result.format.file_extension()
        ))?,
    );
    headers.insert(X_SEGMENT_COUNT, HeaderValue::from(result.segment_count));
    headers.insert(X_CHARACTER_COUNT, HeaderValue::from(result.char_count));
    headers.insert(X_LANGUAGE, HeaderValue::from_static(result.language.as_str()));
    headers.insert(X_PROVIDER, HeaderValue::from_static(result.provider.as_str()));
    if let Some(prompt) = &result.image_prompt {
        headers.insert(X_IMAGE_PROMPT, header_value(&urlencoding::encode(prompt))?);
    }
    Ok(headers)
}

fn header_value(value: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::Internal(format!("invalid header value: {}", e)))
}

fn to_sse_event(event: &JobEvent) -> Event {
    let (name, data) = match event {
        JobEvent::SegmentReady {
            segment,
            total,
            format,
        } => (
            "segment",
            json!({
                "id": segment.id,
                "total": total,
                "format": format.mime_type(),
                "text": segment.source_text,
                "audio": STANDARD.encode(&segment.audio_payload),
            }),
        ),
        JobEvent::Completed(result) => (
            "completed",
            json!({
                "provider": result.provider,
                "language": result.language,
                "voice": result.voice,
                "format": result.mime_type(),
                "segment_count": result.segment_count,
                "char_count": result.char_count,
                "image_prompt": result.image_prompt,
                "audio": STANDARD.encode(&result.audio_data),
            }),
        ),
        JobEvent::Failed { category, message } => (
            "error",
            json!({ "category": category, "message": message }),
        ),
    };

    Event::default().event(name).data(data.to_string())
}
