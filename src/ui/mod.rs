//! vaultdesk UI layer.
//!
//! Uses `wry` for cross-platform WebView rendering:
//! - Windows: WebView2
//! - Linux: WebKitGTK
//! - macOS: WKWebView
//!
//! The whole client UI is bundled HTML/CSS/JS served from the `vd://`
//! custom protocol. JS calls bindings over wry IPC.

pub mod webview_app;
