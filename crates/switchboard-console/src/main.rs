//! Switchboard console binary: drives one call through the IVR menus from
//! stdin, one line of keypad digits per request.
//!
//! Usage: `switchboard-console [config.toml] [call-sid]`

use std::io;

use switchboard_calls::{find_or_create_call, CreateCallParams};
use switchboard_console::config;
use switchboard_console::menus::call_menus;
use switchboard_console::session::Session;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("SWITCHBOARD_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

fn resolve_call_sid() -> String {
    std::env::args()
        .nth(2)
        .or_else(|| std::env::var("SWITCHBOARD_CALL_SID").ok())
        .filter(|sid| !sid.trim().is_empty())
        .unwrap_or_else(|| format!("CA{}", uuid::Uuid::new_v4().simple()))
}

fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration, the console cannot start without valid config");

    // Logs go to stderr; stdout carries the rendered documents.
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    let pool = switchboard_db::open_call_database(
        &config.database.path,
        switchboard_db::DbRuntimeSettings {
            busy_timeout_ms: config.database.busy_timeout_ms,
            pool_max_size: config.database.pool_max_size,
        },
    )
    .expect("failed to open the call database, check database.path in config");

    // Released before the session starts; an in-memory pool holds one connection.
    let call = {
        let conn = switchboard_db::checkout(&pool).expect("failed to get database connection");
        let params = CreateCallParams {
            call_sid: resolve_call_sid(),
            ..CreateCallParams::default()
        };
        find_or_create_call(&conn, &params).expect("failed to load or create the call")
    };

    let registry = call_menus(&config.menu.default_menu);
    registry
        .check(&call)
        .expect("menu registry is inconsistent, refusing to start");

    tracing::info!(
        call_sid = %call.call_sid,
        menu = call.current_menu.as_ref().map_or(registry.default_menu().as_str(), |m| m.as_str()),
        "starting console session"
    );

    let session = Session {
        pool: &pool,
        registry: &registry,
        machine_config: config.menu.machine_config(),
        format: config.menu.format,
        call_id: call.id,
    };

    if let Err(e) = session.run(io::stdin().lock(), io::stdout().lock()) {
        tracing::error!(error = %e, "console session failed");
        std::process::exit(1);
    }

    tracing::info!(call_sid = %call.call_sid, "console session ended");
}
