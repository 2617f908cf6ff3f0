//! Vault entry view models.
//!
//! A [`PasswordEntry`] is the decrypted projection of one backend item. The
//! variant of [`EntryFields`] is the entry's type, so fields can never
//! disagree with the discriminant.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The five entry kinds, named the way the UI names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Website,
    Identity,
    Card,
    Crypto,
    Memo,
}

impl ItemType {
    pub const ALL: [ItemType; 5] = [
        ItemType::Website,
        ItemType::Identity,
        ItemType::Card,
        ItemType::Crypto,
        ItemType::Memo,
    ];

    /// Name used by the UI (`website`, `crypto`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Website => "website",
            ItemType::Identity => "identity",
            ItemType::Card => "card",
            ItemType::Crypto => "crypto",
            ItemType::Memo => "memo",
        }
    }

    /// Name stored by the vault server (`login`, `cryptowallet`, ...).
    pub fn backend_name(&self) -> &'static str {
        match self {
            ItemType::Website => "login",
            ItemType::Identity => "identity",
            ItemType::Card => "card",
            ItemType::Crypto => "cryptowallet",
            ItemType::Memo => "note",
        }
    }

    /// Parses a UI type name.
    pub fn from_frontend(name: &str) -> Option<Self> {
        ItemType::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Parses a server type name.
    pub fn from_backend(name: &str) -> Option<Self> {
        ItemType::ALL.into_iter().find(|t| t.backend_name() == name)
    }

    /// Accepts either naming. Server names win when both would match.
    pub fn parse_any(name: &str) -> Option<Self> {
        Self::from_backend(name).or_else(|| Self::from_frontend(name))
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebsiteFields {
    pub website: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentityFields {
    pub initial: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub phone_number: String,
    pub gender: String,
    pub birth_day: String,
    pub occupation: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardFields {
    pub card_holder_name: String,
    pub card_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    pub expiration_date: String,
    pub cvv: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CryptoFields {
    pub wallet_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub recovery_phrase: String,
}

/// Memo entries carry only their notes, which live on the entry itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoFields {}

/// Type-specific plaintext fields, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntryFields {
    Website(WebsiteFields),
    Identity(IdentityFields),
    Card(CardFields),
    Crypto(CryptoFields),
    Memo(MemoFields),
}

impl EntryFields {
    pub fn item_type(&self) -> ItemType {
        match self {
            EntryFields::Website(_) => ItemType::Website,
            EntryFields::Identity(_) => ItemType::Identity,
            EntryFields::Card(_) => ItemType::Card,
            EntryFields::Crypto(_) => ItemType::Crypto,
            EntryFields::Memo(_) => ItemType::Memo,
        }
    }

    /// Empty fields of the given type. Used when an item's data can't be read.
    pub fn empty(item_type: ItemType) -> Self {
        match item_type {
            ItemType::Website => EntryFields::Website(WebsiteFields::default()),
            ItemType::Identity => EntryFields::Identity(IdentityFields::default()),
            ItemType::Card => EntryFields::Card(CardFields::default()),
            ItemType::Crypto => EntryFields::Crypto(CryptoFields::default()),
            ItemType::Memo => EntryFields::Memo(MemoFields::default()),
        }
    }

    /// Builds typed fields from an item data object.
    ///
    /// Returns the fields and the `notes` value, which every type may carry.
    /// Unknown keys are ignored; missing keys take their empty value.
    pub fn from_data(item_type: ItemType, data: &Map<String, Value>) -> Result<(Self, Option<String>), serde_json::Error> {
        let mut tagged = data.clone();
        let notes = match tagged.remove("notes") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        tagged.remove("category");
        tagged.insert("type".to_string(), Value::String(item_type.as_str().to_string()));
        let fields = serde_json::from_value(Value::Object(tagged))?;
        Ok((fields, notes))
    }

    /// The data object that gets encrypted and sent to the server.
    pub fn to_data(&self, notes: Option<&str>) -> Map<String, Value> {
        let mut map = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        map.remove("type");
        if let Some(n) = notes {
            map.insert("notes".to_string(), Value::String(n.to_string()));
        }
        map
    }

    /// Looks up a single copyable field by its camelCase name.
    pub fn field(&self, name: &str) -> Option<String> {
        let value = serde_json::to_value(self).ok()?;
        match value.get(name)? {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// A decrypted vault entry as shown in the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordEntry {
    pub id: u64,
    pub title: String,
    pub is_bookmarked: bool,
    pub created_at: String,
    pub modified_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
    #[serde(default, rename = "category", skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub fields: EntryFields,
}

impl PasswordEntry {
    pub fn item_type(&self) -> ItemType {
        self.fields.item_type()
    }

    /// Resolves a copyable field, including `title` and `notes`.
    pub fn copyable(&self, name: &str) -> Option<String> {
        match name {
            "title" => Some(self.title.clone()),
            "notes" => self.notes.clone(),
            other => self.fields.field(other),
        }
    }
}
