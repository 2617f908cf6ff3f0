//! vaultdesk RPC Server: the binding surface as JSON-RPC over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"GetPasswordList", "params":{}}
//! Response: {"id":1, "result":[...]} or {"id":1, "error":"...", "toast":{...}}

use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::time::Instant;

use vaultdesk::app::App;
use vaultdesk::logging;
use vaultdesk::platform;
use vaultdesk::rpc_handler::handle_method;
use vaultdesk::services::notifier::failure_toast;
use vaultdesk::services::settings_engine::SettingsEngineTrait;

use serde_json::{json, Value};

/// Fixed-window limiter over all methods.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn emit(response: &Value) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", response)?;
    out.flush()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = platform::default_database_path();
    let app = App::new(&db_path.to_string_lossy())?;
    logging::init(&app.settings_engine.get_settings().logging.level);
    tracing::info!(db = %db_path.display(), "vaultdesk-rpc starting");
    let app = Mutex::new(app);

    emit(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}))?;

    let mut rate_limiter = RateLimiter::new(200);

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                emit(&json!({"id": null, "error": format!("parse error: {}", e)}))?;
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            emit(&json!({"id": id, "error": "rate limit exceeded"}))?;
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(&app, method, &params) {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err, "toast": failure_toast(method, &err)}),
        };
        emit(&response)?;
    }

    if let Ok(mut a) = app.lock() {
        a.shutdown();
    }
    Ok(())
}
