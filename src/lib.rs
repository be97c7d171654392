pub mod alerts;
pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod ledger;
pub mod logging;
pub mod recorder;
pub mod report;
pub mod risk;
pub mod settings;
pub mod storage;

#[cfg(feature = "app")]
pub mod commands;

#[cfg(feature = "app")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use tauri::Manager;

    logging::init();

    tauri::Builder::default()
        .setup(|app| {
            let app_data = app.path().app_data_dir()?.join("anti-extortion");
            let config = config::AppConfig::from_env(&app_data)?;
            app.manage(commands::AppState::open(config)?);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::validate_report,
            commands::submit_report,
            commands::list_alerts,
            commands::lookup_report,
            commands::load_recordings,
            commands::delete_recording,
            commands::start_recording,
            commands::stop_recording,
            commands::cancel_recording,
            commands::recording_elapsed,
            commands::export_recording,
            commands::load_settings,
            commands::save_settings,
            commands::auto_record_decision
        ])
        .run(tauri::generate_context!())
        .expect("error while running the anti-extortion client");
}
