//! Bookmarks RPC Server. JSON-RPC over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "user":"alice", "method":"bookmarks.create", "params":{"path":"/","displayName":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":{"kind":"...","message":"..."}}
//!
//! The `user` field is supplied by the authenticating front end and trusted as-is.
//! Logs go to stderr; stdout carries the protocol only.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use bookmarks::app::App;
use bookmarks::database::Database;
use bookmarks::rpc_handler::handle_method;
use bookmarks::services::settings_engine::{SettingsEngine, SettingsEngineTrait, DEFAULT_CONFIG_FILE};

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn write_line(out: &mut impl Write, value: &Value) -> io::Result<()> {
    writeln!(out, "{}", value)?;
    out.flush()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("BOOKMARKS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let mut settings_engine = SettingsEngine::new(Some(config_path));
    let mut settings = settings_engine.load()?;
    init_logging(&settings.logging.level);

    // BOOKMARKS_DATA_DIR relocates a relative database path
    let data_dir = std::env::var("BOOKMARKS_DATA_DIR").ok().map(PathBuf::from);
    settings.database.path = Database::resolve_path(&settings.database.path, data_dir.as_deref());
    let settings_engine = SettingsEngine::with_settings(settings_engine.get_config_path(), settings);
    let app = App::from_engine(settings_engine)?;
    tracing::info!(database = app.db.location(), "database ready");
    let app = Mutex::new(app);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_line(&mut out, &json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}))?;
    tracing::info!("bookmarks rpc server ready");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, "failed to read request");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let err = json!({"id": null, "error": {"kind": "parse", "message": format!("parse error: {}", e)}});
                write_line(&mut out, &err)?;
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);
        let user = req.get("user").and_then(|v| v.as_str()).unwrap_or("");
        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(&app, user, method, &params) {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        write_line(&mut out, &response)?;
    }

    tracing::info!("bookmarks rpc server stopped");
    Ok(())
}
