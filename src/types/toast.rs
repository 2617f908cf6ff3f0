use serde::{Deserialize, Serialize};

/// Host-raised toasts are always failures. The UI renders its own
/// `default` toasts for confirmations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    Destructive,
}

/// A user-facing notification, rendered by the UI as a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub variant: ToastVariant,
    pub title: String,
    pub description: String,
}

impl Toast {
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: ToastVariant::Destructive,
            title: title.into(),
            description: description.into(),
        }
    }
}
