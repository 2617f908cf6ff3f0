//! WebView host using `wry` + `tao`.
//!
//! Architecture:
//! - The bundled UI (`resources/ui`) is served from the `vd://` custom protocol.
//! - JS posts `{id, cmd, args}` through `window.ipc.postMessage()`.
//! - Each call runs `handle_method` on the tokio blocking pool, so a slow
//!   server never stalls the event loop.
//! - Outcomes come back as `window.__vd_resolve(id, value)` or
//!   `window.__vd_reject(id, {message, toast})`.

use std::borrow::Cow;
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use serde_json::{json, Value};
use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy};
use tao::window::WindowBuilder;
use wry::http::{Request, Response};
use wry::WebViewBuilder;

use crate::app::App;
use crate::logging;
use crate::platform;
use crate::rpc_handler::handle_method;
use crate::services::notifier::failure_toast;
use crate::services::settings_engine::SettingsEngineTrait;

const INDEX_HTML: &str = include_str!("../../resources/ui/index.html");
const BRIDGE_JS: &str = include_str!("../../resources/ui/bridge.js");
const STYLES_CSS: &str = include_str!("../../resources/ui/styles.css");

#[cfg(not(target_os = "windows"))]
const START_URL: &str = "vd://localhost/";
// WebView2 serves custom protocols over http://<scheme>.localhost.
#[cfg(target_os = "windows")]
const START_URL: &str = "http://vd.localhost/";

#[derive(Debug)]
enum UserEvent {
    EvalScript(String),
}

/// One binding call from the page.
#[derive(Debug, Deserialize)]
struct IpcCall {
    id: u64,
    cmd: String,
    #[serde(default)]
    args: Value,
}

fn asset(path: &str) -> Option<(&'static str, &'static str)> {
    match path {
        "/" | "/index.html" => Some(("text/html; charset=utf-8", INDEX_HTML)),
        "/bridge.js" => Some(("text/javascript; charset=utf-8", BRIDGE_JS)),
        "/styles.css" => Some(("text/css; charset=utf-8", STYLES_CSS)),
        _ => None,
    }
}

fn serve(request: Request<Vec<u8>>) -> Response<Cow<'static, [u8]>> {
    let path = request.uri().path();
    let built = match asset(path) {
        Some((mime, body)) => Response::builder()
            .header("Content-Type", mime)
            .body(Cow::Borrowed(body.as_bytes())),
        None => {
            tracing::debug!(path, "unknown asset requested");
            Response::builder()
                .status(404)
                .body(Cow::Borrowed(&b"not found"[..]))
        }
    };
    built.unwrap_or_else(|_| Response::new(Cow::Borrowed(&b""[..])))
}

/// Script that settles the JS promise for `call_id`.
fn settle_script(call_id: u64, method: &str, result: Result<Value, String>) -> String {
    match result {
        Ok(value) => format!("window.__vd_resolve({}, {})", call_id, value),
        Err(message) => {
            let toast = failure_toast(method, &message);
            format!(
                "window.__vd_reject({}, {})",
                call_id,
                json!({"message": message, "toast": toast})
            )
        }
    }
}

fn dispatch_ipc(
    runtime: &tokio::runtime::Runtime,
    app: &Arc<Mutex<App>>,
    proxy: &EventLoopProxy<UserEvent>,
    body: &str,
) {
    let call: IpcCall = match serde_json::from_str(body) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "malformed IPC message");
            return;
        }
    };
    let app = app.clone();
    let proxy = proxy.clone();
    runtime.spawn(async move {
        let method = call.cmd.clone();
        let outcome = tokio::task::spawn_blocking(move || handle_method(&app, &call.cmd, &call.args))
            .await
            .unwrap_or_else(|e| Err(format!("binding task failed: {}", e)));
        let script = settle_script(call.id, &method, outcome);
        if proxy.send_event(UserEvent::EvalScript(script)).is_err() {
            tracing::debug!(method, "window closed before the binding finished");
        }
    });
}

// ─── Main entry point ───

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = platform::default_database_path();
    let app = App::new(&db_path.to_string_lossy())?;
    logging::init(&app.settings_engine.get_settings().logging.level);
    tracing::info!(db = %db_path.display(), "vaultdesk starting");
    let app = Arc::new(Mutex::new(app));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let window = WindowBuilder::new()
        .with_title("vaultdesk")
        .with_inner_size(tao::dpi::LogicalSize::new(1100.0, 720.0))
        .with_min_inner_size(tao::dpi::LogicalSize::new(720.0, 480.0))
        .build(&event_loop)?;

    let ipc_app = app.clone();
    let builder = WebViewBuilder::new()
        .with_custom_protocol("vd".into(), move |_wv_id, request| serve(request))
        .with_url(START_URL)
        .with_ipc_handler(move |msg: Request<String>| {
            dispatch_ipc(&runtime, &ipc_app, &proxy, msg.body());
        })
        .with_devtools(cfg!(debug_assertions));

    #[cfg(target_os = "linux")]
    let webview = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;
        let vbox = window.default_vbox().ok_or("failed to get GTK vbox")?;
        builder.build_gtk(vbox)?
    };

    #[cfg(not(target_os = "linux"))]
    let webview = builder.build(&window)?;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                if let Ok(mut a) = app.lock() {
                    a.shutdown();
                }
                *control_flow = ControlFlow::Exit;
            }

            Event::UserEvent(UserEvent::EvalScript(js)) => {
                if let Err(e) = webview.evaluate_script(&js) {
                    tracing::warn!(error = %e, "script evaluation failed");
                }
            }

            _ => {}
        }
    });
}
