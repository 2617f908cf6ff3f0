use std::sync::{Arc, Mutex};

use crate::types::errors::ClipboardError;

/// Destination for copied secrets.
pub trait ClipboardSink: Send {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard via `arboard`. A handle is opened per copy so the sink
/// stays `Send` on every platform.
#[cfg(feature = "gui")]
#[derive(Debug, Default)]
pub struct SystemClipboard;

#[cfg(feature = "gui")]
impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "gui")]
impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }
}

/// In-process clipboard for headless hosts and tests. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut slot = self
            .contents
            .lock()
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        *slot = Some(text.to_string());
        Ok(())
    }
}

/// The clipboard the current build should use.
pub fn default_clipboard() -> Box<dyn ClipboardSink> {
    #[cfg(feature = "gui")]
    {
        Box::new(SystemClipboard::new())
    }
    #[cfg(not(feature = "gui"))]
    {
        Box::new(MemoryClipboard::new())
    }
}
