//! Request and response bodies exchanged with the vault server.
//!
//! Field names follow the server's JSON exactly, which mixes snake_case,
//! PascalCase and a few one-off spellings.

use serde::{Deserialize, Deserializer, Serialize};

/// Accepts an id sent either as a JSON number or as a numeric string.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        Text(String),
    }
    match Id::deserialize(deserializer)? {
        Id::Number(n) => Ok(n),
        Id::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

// ─── Auth ───

#[derive(Debug, Clone, Deserialize)]
pub struct PublicKeyResponse {
    #[serde(rename = "PublicKey")]
    pub public_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub hqt: String,
    #[serde(rename = "hq1-hqr")]
    pub hq1_hqr: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_vault: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPayload {
    pub email: String,
    pub encrypted_hp1_hpr: String,
    pub encrypted_iteration: String,
    pub protected_vault_key: String,
    pub encrypted_sessionkey: String,
}

/// Shape shared by register, logout, recovery process and recovery setup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionCheckResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// ─── Recovery ───

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryRequestPayload {
    pub encrypted_email: String,
    pub encrypted_sessionkey: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecoveryRequestResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub encrypted_revaultkey: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryProcessPayload {
    pub encrypted_email: String,
    pub encrypted_hp1_hpr: String,
    pub encrypted_iteration: String,
    pub protected_vault_key: String,
    pub encrypted_sessionkey: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoverySetupPayload {
    pub hashemail: String,
    pub encrypted_recoverykey: String,
}

// ─── Items ───

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemPayload {
    pub title: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemResponse {
    #[serde(deserialize_with = "lenient_id")]
    pub item_id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "createAt", default)]
    pub create_at: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateItemPayload {
    pub item_id: u64,
    pub title: String,
    pub category_id: Option<u64>,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateItemResponse {
    #[serde(deserialize_with = "lenient_id")]
    pub item_id: u64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemIdPayload {
    pub item_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkPayload {
    pub item_id: u64,
    pub bookmark: bool,
}

/// `{item_id, status}`, returned by delete, bookmark and the copy counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemStatusResponse {
    #[serde(deserialize_with = "lenient_id")]
    pub item_id: u64,
    #[serde(default)]
    pub status: String,
}

/// One row of `/getItemList`, still encrypted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawItem {
    #[serde(rename = "ItemID")]
    pub item_id: u64,
    #[serde(default)]
    pub title: String,
    pub type_name: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub is_bookmark: bool,
    #[serde(default)]
    pub date_create: String,
    #[serde(default)]
    pub date_modify: String,
    #[serde(rename = "CategoryID", default)]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemListResponse {
    #[serde(rename = "Items", default)]
    pub items: Vec<RawItem>,
}

// ─── Categories ───

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCategory {
    #[serde(rename = "CategoryID")]
    pub category_id: u64,
    #[serde(rename = "CategoryName", default)]
    pub category_name: String,
    #[serde(rename = "ItemCount", default)]
    pub item_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryListResponse {
    #[serde(rename = "Categories", default)]
    pub categories: Vec<RawCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryPayload {
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCategoryPayload {
    pub category_id: u64,
    pub categoryname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryIdPayload {
    pub category_id: u64,
}

/// `{Category, status}` from create and delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryAckResponse {
    #[serde(rename = "Category", default)]
    pub category: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCategoryResponse {
    #[serde(deserialize_with = "lenient_id")]
    pub category_id: u64,
    #[serde(default)]
    pub status: String,
}
