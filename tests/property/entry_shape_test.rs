//! Property-based tests for the shape of entry data and view models.

use proptest::prelude::*;
use serde_json::{Map, Value};

use vaultdesk::services::vault_service::normalize_item_data;
use vaultdesk::types::entry::{EntryFields, ItemType, PasswordEntry};

fn keys_for(item_type: ItemType) -> &'static [&'static str] {
    match item_type {
        ItemType::Website => &["website", "username", "email", "password"],
        ItemType::Identity => &[
            "initial",
            "firstName",
            "lastName",
            "phoneNumber",
            "gender",
            "birthDay",
            "occupation",
            "address",
        ],
        ItemType::Card => &["cardHolderName", "cardNumber", "expirationDate", "cvv"],
        ItemType::Crypto => &["walletAddress", "recoveryPhrase"],
        ItemType::Memo => &[],
    }
}

fn item_type_strategy() -> impl Strategy<Value = ItemType> {
    prop::sample::select(ItemType::ALL.to_vec())
}

// **Property 1: Normalized data has exactly the type's fields**
//
// *For any* item type and any string values under its field names plus
// unrelated keys, normalizing SHALL keep the type's required fields, keep
// notes, and drop everything else.
proptest! {
    #[test]
    fn normalized_data_has_type_fields_only(
        item_type in item_type_strategy(),
        value in "[ -~]{0,20}",
        junk_key in "zz[a-z]{1,6}",
        notes in proptest::option::of("[ -~]{0,20}"),
    ) {
        let mut data = Map::new();
        for key in keys_for(item_type) {
            data.insert(key.to_string(), Value::String(value.clone()));
        }
        data.insert(junk_key.clone(), Value::String("ignored".into()));
        if let Some(n) = &notes {
            data.insert("notes".into(), Value::String(n.clone()));
        }

        let normalized = normalize_item_data(item_type, &data).unwrap();
        for key in keys_for(item_type) {
            prop_assert_eq!(normalized.get(*key), Some(&Value::String(value.clone())));
        }
        prop_assert!(normalized.get(&junk_key).is_none());
        prop_assert!(normalized.get("type").is_none());
        prop_assert_eq!(normalized.get("notes").and_then(Value::as_str), notes.as_deref());
    }
}

// **Property 2: Entries serialize flat and copy their own fields**
//
// *For any* item type and field value, the serialized entry SHALL carry a
// `type` tag equal to the UI name, and every field SHALL be copyable.
proptest! {
    #[test]
    fn entries_expose_fields_flat(item_type in item_type_strategy(), value in "[a-zA-Z0-9]{1,16}") {
        let mut data = Map::new();
        for key in keys_for(item_type) {
            data.insert(key.to_string(), Value::String(value.clone()));
        }
        let (fields, notes) = EntryFields::from_data(item_type, &data).unwrap();
        let entry = PasswordEntry {
            id: 1,
            title: "Entry".into(),
            is_bookmarked: false,
            created_at: String::new(),
            modified_at: String::new(),
            category_id: None,
            category_name: None,
            notes,
            fields,
        };

        let json = serde_json::to_value(&entry).unwrap();
        prop_assert_eq!(json["type"].as_str(), Some(item_type.as_str()));
        for key in keys_for(item_type) {
            prop_assert_eq!(&json[*key], &Value::String(value.clone()));
            prop_assert_eq!(entry.copyable(key), Some(value.clone()));
        }
        let title = entry.copyable("title");
        prop_assert_eq!(title.as_deref(), Some("Entry"));
    }
}
