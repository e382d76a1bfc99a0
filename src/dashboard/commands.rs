use std::sync::Arc;
use std::time::Duration;

use tauri::{AppHandle, State};

use crate::{
    dashboard::{DashboardController, DashboardSnapshot, InsightState},
    insight::GeminiClient,
    media::{
        voice::voice_memo_notice, AudioClip, EncodedImage, MediaKind, RecordedAudioSource,
        VoiceMemo,
    },
    AppState,
};

fn controller_from_state(state: &State<'_, AppState>) -> DashboardController<GeminiClient, AppHandle> {
    state.dashboard.clone()
}

#[tauri::command]
pub async fn get_dashboard(state: State<'_, AppState>) -> Result<DashboardSnapshot, String> {
    let controller = controller_from_state(&state);
    Ok(controller.snapshot().await)
}

#[tauri::command]
pub async fn refresh_insight(state: State<'_, AppState>) -> Result<InsightState, String> {
    let controller = controller_from_state(&state);
    Ok(controller.request_insight(None).await)
}

/// `data_url` is the webview canvas capture, `data:image/jpeg;base64,...`.
#[tauri::command]
pub async fn analyze_photo(
    state: State<'_, AppState>,
    data_url: String,
) -> Result<InsightState, String> {
    let image = EncodedImage::from_data_url(&data_url).map_err(|e| e.to_string())?;
    let controller = controller_from_state(&state);
    Ok(controller.request_insight(Some(image)).await)
}

#[tauri::command]
pub async fn send_thought(state: State<'_, AppState>, thought: String) -> Result<InsightState, String> {
    let controller = controller_from_state(&state);
    controller
        .companion_reply(&thought)
        .await
        .map_err(|e| e.to_string())
}

/// `data_url` is the webview MediaRecorder output read as a data URL.
#[tauri::command]
pub async fn send_voice_memo(
    state: State<'_, AppState>,
    data_url: String,
    duration_ms: u64,
) -> Result<InsightState, String> {
    let clip = AudioClip::from_data_url(&data_url, Duration::from_millis(duration_ms))
        .map_err(|e| voice_memo_notice(&e).to_string())?;
    let memo = VoiceMemo::new(Arc::new(RecordedAudioSource::new(clip)));
    let controller = controller_from_state(&state);
    controller
        .voice_memo(memo)
        .await
        .map_err(|e| voice_memo_notice(&e).to_string())
}

/// getUserMedia failures happen in the webview; this hands back the notice to show.
#[tauri::command]
pub fn media_denied(kind: MediaKind) -> String {
    log::warn!("{:?} access failed in the webview", kind);
    kind.denied_notice().to_string()
}
