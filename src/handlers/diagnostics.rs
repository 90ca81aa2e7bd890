use crate::{models::{DiagnosticsResponse, ErrorResponse}, ws::SessionState, AppState};
use axum::{extract::State, http::StatusCode, Json};
use std::sync::atomic::Ordering;
use std::sync::{Mutex, OnceLock};
use sysinfo::System;
use tracing::info;

static SYSTEM_MONITOR: OnceLock<Mutex<System>> = OnceLock::new();

/// Process and room statistics
pub async fn diagnostics(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<DiagnosticsResponse>), (StatusCode, Json<ErrorResponse>)> {

    let gateway = &state.gateway;
    let n_conn = state.connections.load(Ordering::Relaxed) as u32;
    let n_rooms = gateway.registry().len() as u32;
    let n_members = gateway.registry().member_count() as u32;
    let n_sessions = gateway.sessions().len() as u32;
    let n_active_sessions = gateway.sessions().count_in_state(SessionState::Active) as u32;
    let n_disconnected_sessions = gateway.sessions().count_in_state(SessionState::Disconnected) as u32;
    let n_blobs = state.blobs.len();

    // System stats
    let (cpu_usage, memory_alloc, memory_free, memory_total) = {
        let sys_lock = SYSTEM_MONITOR.get_or_init(|| {
            Mutex::new(System::new_all())
        });
        match sys_lock.lock() {
            Ok(mut sys) => {
                sys.refresh_cpu();
                sys.refresh_memory();
                (
                    sys.global_cpu_info().cpu_usage(),
                    sys.used_memory(),
                    sys.free_memory(),
                    sys.total_memory(),
                )
            }
            Err(_) => (0.0, 0, 0, 0)
        }
    };

    info!(
        "Diagnostics: CPU: {:.2}%, Mem: {}/{} MB (Free: {} MB), Conn: {}, Rooms: {}, Sessions: {}",
        cpu_usage,
        memory_alloc / 1024 / 1024,
        memory_total / 1024 / 1024,
        memory_free / 1024 / 1024,
        n_conn,
        n_rooms,
        n_sessions
    );

    Ok((
        StatusCode::OK,
        Json(DiagnosticsResponse {
            n_conn,
            n_rooms,
            n_members,
            n_sessions,
            n_active_sessions,
            n_disconnected_sessions,
            n_blobs,
            cpu_usage,
            memory_alloc,
            memory_total,
            memory_free,
        }),
    ))
}
