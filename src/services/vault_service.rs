//! Vault item operations.
//!
//! Titles and item data leave the client sealed with the vault key and come
//! back the same way. Listing is forgiving: an item that can't be fully read
//! still shows up, with a placeholder title or empty fields.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{Map, Value};

use crate::services::crypto_service::CryptoServiceTrait;
use crate::services::keyring::KeyRing;
use crate::services::transport::{decode, encode, BackendTransport, HttpMethod};
use crate::types::entry::{EntryFields, ItemType, PasswordEntry};
use crate::types::errors::VaultError;
use crate::types::wire::{
    BookmarkPayload, CreateItemPayload, CreateItemResponse, ItemIdPayload, ItemListResponse, ItemStatusResponse,
    RawItem, UpdateItemPayload, UpdateItemResponse,
};

/// True for non-empty, padded standard base64.
pub fn looks_like_base64(s: &str) -> bool {
    !s.is_empty()
        && s.len() % 4 == 0
        && s
            .bytes()
            .all(|c| c.is_ascii_alphanumeric() || c == b'+' || c == b'/' || c == b'=')
        && STANDARD.decode(s).is_ok()
}

/// Outcome of reading a sealed label (item title or category name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    /// Stored in clear text, or decrypted fine.
    Readable(String),
    /// Looked sealed but wouldn't open.
    Unreadable,
}

/// Opens a label with the vault key.
///
/// Empty or non-base64 labels are taken as plain text.
pub fn open_label(crypto: &dyn CryptoServiceTrait, key: &[u8], text: &str) -> Label {
    if !looks_like_base64(text) {
        return Label::Readable(text.to_string());
    }
    match crypto.open_b64(text, key) {
        Ok(bytes) => Label::Readable(String::from_utf8_lossy(&bytes).into_owned()),
        Err(_) => Label::Unreadable,
    }
}

/// Resolves a label to display text, using `placeholder` when it is empty
/// or unreadable.
pub fn display_label(crypto: &dyn CryptoServiceTrait, key: &[u8], text: &str, placeholder: String) -> String {
    match open_label(crypto, key, text) {
        Label::Readable(s) if !s.is_empty() => s,
        _ => placeholder,
    }
}

/// Validates an item data object against its type and rebuilds it in the
/// canonical camelCase shape.
pub fn normalize_item_data(item_type: ItemType, data: &Map<String, Value>) -> Result<Map<String, Value>, VaultError> {
    let (fields, notes) = EntryFields::from_data(item_type, data).map_err(|e| VaultError::InvalidData {
        type_name: item_type.to_string(),
        message: e.to_string(),
    })?;
    Ok(fields.to_data(notes.as_deref()))
}

pub struct VaultService<'a> {
    transport: &'a dyn BackendTransport,
    crypto: &'a dyn CryptoServiceTrait,
    keyring: &'a KeyRing,
}

impl<'a> VaultService<'a> {
    pub fn new(transport: &'a dyn BackendTransport, crypto: &'a dyn CryptoServiceTrait, keyring: &'a KeyRing) -> Self {
        Self {
            transport,
            crypto,
            keyring,
        }
    }

    fn vault_key(&self) -> Result<&'a [u8], VaultError> {
        self.keyring.vault_key().ok_or(VaultError::Locked)
    }

    fn seal_data(&self, data: &Map<String, Value>) -> Result<String, VaultError> {
        let plaintext = zeroize::Zeroizing::new(serde_json::to_vec(data).map_err(|e| VaultError::InvalidData {
            type_name: "item".to_string(),
            message: e.to_string(),
        })?);
        Ok(self.crypto.seal_b64(&plaintext, self.vault_key()?)?)
    }

    pub fn create_item(
        &self,
        title: &str,
        item_type: ItemType,
        data: &Map<String, Value>,
    ) -> Result<CreateItemResponse, VaultError> {
        let key = self.vault_key()?;
        let data = normalize_item_data(item_type, data)?;
        let payload = CreateItemPayload {
            title: self.crypto.seal_b64(title.as_bytes(), key)?,
            type_name: item_type.backend_name().to_string(),
            data: self.seal_data(&data)?,
        };

        let body = encode("/createItem", &payload)?;
        let value = self.transport.request(HttpMethod::Post, "/createItem", Some(&body))?;
        let mut response: CreateItemResponse = decode("/createItem", value)?;
        response.title = title.to_string();
        tracing::info!(item_id = response.item_id, item_type = %item_type, "item created");
        Ok(response)
    }

    /// Replaces an item's title, category and data.
    ///
    /// With a known type the data is validated first; otherwise it is sent
    /// as given, minus any `type` key.
    pub fn update_item(
        &self,
        id: u64,
        category_id: Option<u64>,
        title: &str,
        item_type: Option<ItemType>,
        data: &Map<String, Value>,
    ) -> Result<UpdateItemResponse, VaultError> {
        let key = self.vault_key()?;
        let data = match item_type {
            Some(t) => normalize_item_data(t, data)?,
            None => {
                let mut plain = data.clone();
                plain.remove("type");
                plain
            }
        };
        let payload = UpdateItemPayload {
            item_id: id,
            title: self.crypto.seal_b64(title.as_bytes(), key)?,
            category_id,
            data: self.seal_data(&data)?,
        };

        let body = encode("/updateItem", &payload)?;
        let value = self.transport.request(HttpMethod::Post, "/updateItem", Some(&body))?;
        let response: UpdateItemResponse = decode("/updateItem", value)?;
        tracing::info!(item_id = id, "item updated");
        Ok(response)
    }

    pub fn delete_item(&self, id: u64) -> Result<ItemStatusResponse, VaultError> {
        self.vault_key()?;
        let body = encode("/deleteItem", &ItemIdPayload { item_id: id })?;
        let value = self.transport.request(HttpMethod::Delete, "/deleteItem", Some(&body))?;
        let response: ItemStatusResponse = decode("/deleteItem", value)?;
        tracing::info!(item_id = id, "item deleted");
        Ok(response)
    }

    pub fn set_bookmark(&self, id: u64, bookmark: bool) -> Result<ItemStatusResponse, VaultError> {
        self.vault_key()?;
        let body = encode("/bookmark", &BookmarkPayload { item_id: id, bookmark })?;
        let value = self.transport.request(HttpMethod::Post, "/bookmark", Some(&body))?;
        Ok(decode("/bookmark", value)?)
    }

    /// Reports a copy to the usage counters. Both calls are attempted.
    pub fn record_copy(&self, id: u64) -> Result<(), VaultError> {
        let mut first_error = None;
        for path in ["/copyCount", "/copyFreq"] {
            let outcome = encode(path, &ItemIdPayload { item_id: id })
                .and_then(|body| self.transport.request(HttpMethod::Post, path, Some(&body)));
            if let Err(e) = outcome {
                tracing::warn!(item_id = id, path, error = %e, "copy counter update failed");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Fetches and decrypts the whole vault.
    pub fn list_items(&self) -> Result<Vec<PasswordEntry>, VaultError> {
        let key = self.vault_key()?;
        let value = self.transport.request(HttpMethod::Get, "/getItemList", None)?;
        let response: ItemListResponse = decode("/getItemList", value)?;

        let entries: Vec<PasswordEntry> = response
            .items
            .iter()
            .filter_map(|raw| decode_item(self.crypto, key, raw))
            .collect();
        tracing::info!(count = entries.len(), "vault listed");
        Ok(entries)
    }
}

/// Turns one server row into an entry. Returns `None` for unknown types.
pub fn decode_item(crypto: &dyn CryptoServiceTrait, key: &[u8], raw: &RawItem) -> Option<PasswordEntry> {
    let Some(item_type) = ItemType::parse_any(&raw.type_name) else {
        tracing::warn!(item_id = raw.item_id, type_name = %raw.type_name, "skipping item of unknown type");
        return None;
    };
    let placeholder = format!("[Item {}]", raw.item_id);

    let (title, readable) = match open_label(crypto, key, &raw.title) {
        Label::Readable(t) if t.is_empty() => (placeholder, true),
        Label::Readable(t) => (t, true),
        Label::Unreadable => {
            tracing::warn!(item_id = raw.item_id, "item title could not be decrypted");
            (placeholder, false)
        }
    };

    let (fields, notes) = if readable {
        decode_data(crypto, key, item_type, raw)
    } else {
        (EntryFields::empty(item_type), None)
    };

    let category_name = raw.category_name.as_deref().filter(|n| !n.is_empty()).map(|name| {
        let placeholder = format!("[Category {}]", raw.category_id.unwrap_or_default());
        display_label(crypto, key, name, placeholder)
    });

    Some(PasswordEntry {
        id: raw.item_id,
        title,
        is_bookmarked: raw.is_bookmark,
        created_at: raw.date_create.clone(),
        modified_at: raw.date_modify.clone(),
        category_id: raw.category_id,
        category_name,
        notes,
        fields,
    })
}

fn decode_data(
    crypto: &dyn CryptoServiceTrait,
    key: &[u8],
    item_type: ItemType,
    raw: &RawItem,
) -> (EntryFields, Option<String>) {
    let empty = || (EntryFields::empty(item_type), None);
    if !looks_like_base64(&raw.data) {
        return empty();
    }
    let plaintext = match crypto.open_b64(&raw.data, key) {
        Ok(p) => zeroize::Zeroizing::new(p),
        Err(_) => {
            tracing::warn!(item_id = raw.item_id, "item data could not be decrypted");
            return empty();
        }
    };
    match serde_json::from_slice::<Map<String, Value>>(&plaintext) {
        Ok(map) => EntryFields::from_data(item_type, &map).unwrap_or_else(|_| empty()),
        Err(_) => {
            tracing::warn!(item_id = raw.item_id, "item data is not a JSON object");
            empty()
        }
    }
}
