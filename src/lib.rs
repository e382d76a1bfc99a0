pub mod dashboard;
pub mod headless;
pub mod history;
pub mod insight;
pub mod media;
pub mod models;
pub mod mood;
pub mod sensing;
pub mod settings;
mod utils;

pub const DEBUG_ENV: &str = "FLORASOUL_DEBUG";

pub fn debug_enabled() -> bool {
    std::env::var(DEBUG_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Initialize logging (reads RUST_LOG env var). `FLORASOUL_DEBUG` raises the
/// floor to debug so per-tick chatter shows up.
pub fn init_logging() {
    let level = if debug_enabled() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

#[cfg(feature = "desktop")]
pub use desktop::{run, AppState};

#[cfg(feature = "desktop")]
mod desktop {
    use tauri::{AppHandle, Manager};

    use crate::dashboard::{
        commands::{analyze_photo, get_dashboard, media_denied, refresh_insight, send_thought},
        DashboardController,
    };
    use crate::insight::{GeminiClient, InsightService};
    use crate::settings::{SettingsStore, SETTINGS_FILE_NAME};

    pub struct AppState {
        pub(crate) dashboard: DashboardController<GeminiClient, AppHandle>,
    }

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        crate::init_logging();

        log::info!("FloraSoul starting up...");

        tauri::Builder::default()
            .setup(|app| {
                let result = (|| -> anyhow::Result<()> {
                    let app_data_dir = app
                        .path()
                        .app_data_dir()
                        .map_err(|err| anyhow::anyhow!(err))?;
                    std::fs::create_dir_all(&app_data_dir)?;

                    let settings = SettingsStore::new(app_data_dir.join(SETTINGS_FILE_NAME))?;
                    let insight = settings.insight();
                    let client = GeminiClient::new(&insight)?;
                    if !client.has_api_key() {
                        log::warn!("No insight API key configured; Flora will use fallback lines");
                    }

                    let dashboard = DashboardController::new(
                        InsightService::new(client, insight.timeout()),
                        app.handle().clone(),
                    );

                    // Start ticking and fetch the first insight, as the page does on load.
                    let starter = dashboard.clone();
                    tauri::async_runtime::spawn(async move {
                        if let Err(err) = starter.start().await {
                            log::error!("Failed to start dashboard: {err:#}");
                            return;
                        }
                        starter.request_insight(None).await;
                    });

                    app.manage(AppState { dashboard });
                    Ok(())
                })();

                result.map_err(|err| err.into())
            })
            .invoke_handler(tauri::generate_handler![
                get_dashboard,
                refresh_insight,
                analyze_photo,
                send_thought,
                send_voice_memo,
                media_denied,
            ])
            .run(tauri::generate_context!())
            .expect("error while running tauri application");
    }
}
