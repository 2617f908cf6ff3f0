//! Unit tests for VaultService: sealed items round-tripping through the
//! in-process vault server, and forgiving decoding of odd rows.

#[path = "../common/mod.rs"]
mod common;

use serde_json::{json, Map, Value};

use common::{fast_crypto, fast_proof, website_data, MockBackend, EMAIL, PASSWORD, STAMP};
use vaultdesk::services::auth_service::AuthService;
use vaultdesk::services::crypto_service::{CryptoService, CryptoServiceTrait};
use vaultdesk::services::keyring::KeyRing;
use vaultdesk::services::vault_service::{decode_item, normalize_item_data, open_label, Label, VaultService};
use vaultdesk::types::entry::{EntryFields, ItemType};
use vaultdesk::types::errors::VaultError;
use vaultdesk::types::wire::RawItem;

struct Fixture {
    backend: MockBackend,
    crypto: CryptoService,
    keyring: KeyRing,
}

impl Fixture {
    fn signed_in() -> Self {
        let backend = MockBackend::new();
        let crypto = fast_crypto();
        let proof = fast_proof();
        let mut keyring = KeyRing::new();
        AuthService::new(&backend, &crypto, &proof)
            .register(&mut keyring, EMAIL, PASSWORD, PASSWORD)
            .unwrap();
        Self {
            backend,
            crypto,
            keyring,
        }
    }

    fn vault(&self) -> VaultService<'_> {
        VaultService::new(&self.backend, &self.crypto, &self.keyring)
    }

    fn key(&self) -> &[u8] {
        self.keyring.vault_key().unwrap()
    }
}

fn obj(v: Value) -> Map<String, Value> {
    v.as_object().cloned().unwrap()
}

fn raw(id: u64, title: &str, type_name: &str, data: &str) -> RawItem {
    RawItem {
        item_id: id,
        title: title.to_string(),
        type_name: type_name.to_string(),
        data: data.to_string(),
        is_bookmark: false,
        date_create: STAMP.to_string(),
        date_modify: STAMP.to_string(),
        category_id: None,
        category_name: None,
    }
}

// ─── Create / list ───

#[test]
fn created_item_lists_decrypted() {
    let f = Fixture::signed_in();
    let created = f
        .vault()
        .create_item("GitHub", ItemType::Website, &obj(website_data("github.com", "s3cret!")))
        .unwrap();
    assert_eq!(created.title, "GitHub");

    let entries = f.vault().list_items().unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.id, created.item_id);
    assert_eq!(entry.title, "GitHub");
    assert_eq!(entry.notes.as_deref(), Some("primary account"));
    assert_eq!(entry.copyable("password").as_deref(), Some("s3cret!"));
    assert_eq!(entry.item_type(), ItemType::Website);
}

#[test]
fn server_only_sees_ciphertext_and_backend_type_names() {
    let f = Fixture::signed_in();
    f.vault()
        .create_item("Wallet", ItemType::Crypto, &obj(json!({"walletAddress": "0xabc", "recoveryPhrase": "seed words"})))
        .unwrap();
    let stored = &f.backend.raw_items()[0];
    assert_eq!(stored.type_name, "cryptowallet");
    assert_ne!(stored.title, "Wallet");
    assert!(!stored.data.contains("0xabc"));
    assert!(matches!(open_label(&f.crypto, f.key(), &stored.title), Label::Readable(t) if t == "Wallet"));
}

#[test]
fn invalid_field_types_are_rejected_before_sending() {
    let f = Fixture::signed_in();
    let err = f
        .vault()
        .create_item("Card", ItemType::Card, &obj(json!({"cardNumber": 4111})))
        .unwrap_err();
    assert!(matches!(err, VaultError::InvalidData { .. }));
    assert_eq!(f.backend.call_count("/createItem"), 0);
}

#[test]
fn normalize_drops_unknown_keys_and_fills_defaults() {
    let data = normalize_item_data(ItemType::Website, &obj(json!({"website": "a.io", "extra": 1}))).unwrap();
    assert_eq!(data["website"], "a.io");
    assert_eq!(data["password"], "");
    assert!(data.get("extra").is_none());
}

// ─── Update / delete / bookmark ───

#[test]
fn update_replaces_title_data_and_category() {
    let f = Fixture::signed_in();
    let id = f
        .vault()
        .create_item("Old", ItemType::Memo, &obj(json!({"notes": "v1"})))
        .unwrap()
        .item_id;
    f.vault()
        .update_item(id, Some(99), "New title", Some(ItemType::Memo), &obj(json!({"notes": "v2"})))
        .unwrap();

    let entry = f.vault().list_items().unwrap().remove(0);
    assert_eq!(entry.title, "New title");
    assert_eq!(entry.notes.as_deref(), Some("v2"));
    assert_eq!(entry.category_id, Some(99));
}

#[test]
fn update_without_type_strips_type_key() {
    let f = Fixture::signed_in();
    let id = f.vault().create_item("Note", ItemType::Memo, &obj(json!({}))).unwrap().item_id;
    f.vault()
        .update_item(id, None, "Note", None, &obj(json!({"type": "memo", "notes": "kept"})))
        .unwrap();
    let stored = f.backend.raw_items().remove(0);
    let plain = f.crypto.open_b64(&stored.data, f.key()).unwrap();
    let data: Value = serde_json::from_slice(&plain).unwrap();
    assert!(data.get("type").is_none());
    assert_eq!(data["notes"], "kept");
}

#[test]
fn delete_and_bookmark_hit_the_server() {
    let f = Fixture::signed_in();
    let id = f.vault().create_item("X site", ItemType::Website, &obj(json!({}))).unwrap().item_id;

    f.vault().set_bookmark(id, true).unwrap();
    assert!(f.backend.raw_items()[0].is_bookmark);

    let status = f.vault().delete_item(id).unwrap();
    assert_eq!(status.item_id, id);
    assert!(f.backend.raw_items().is_empty());
}

#[test]
fn record_copy_tries_both_counters_even_when_one_fails() {
    let f = Fixture::signed_in();
    let id = f.vault().create_item("Y site", ItemType::Website, &obj(json!({}))).unwrap().item_id;

    f.backend.fail("/copyCount", 500);
    assert!(f.vault().record_copy(id).is_err());
    assert_eq!(f.backend.call_count("/copyFreq"), 1);

    f.backend.heal("/copyCount");
    f.vault().record_copy(id).unwrap();
    assert_eq!(f.backend.copy_count(id), 1);
}

#[test]
fn locked_vault_refuses_operations() {
    let f = Fixture::signed_in();
    let empty = KeyRing::new();
    let vault = VaultService::new(&f.backend, &f.crypto, &empty);
    assert!(matches!(vault.list_items().unwrap_err(), VaultError::Locked));
    assert!(matches!(vault.delete_item(1).unwrap_err(), VaultError::Locked));
    assert!(matches!(
        vault.create_item("t", ItemType::Memo, &Map::new()).unwrap_err(),
        VaultError::Locked
    ));
}

#[test]
fn expired_session_surfaces_401() {
    let f = Fixture::signed_in();
    f.backend.expire_session();
    match f.vault().list_items().unwrap_err() {
        VaultError::Backend(b) => assert_eq!(b.status_code(), Some(401)),
        other => panic!("unexpected error: {other}"),
    }
}

// ─── Forgiving decode ───

#[test]
fn unknown_types_are_skipped_when_listing() {
    let f = Fixture::signed_in();
    f.backend.insert_raw_item(raw(500, "Plain title", "vehicle", ""));
    f.vault().create_item("Kept", ItemType::Memo, &obj(json!({}))).unwrap();
    let entries = f.vault().list_items().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Kept");
}

#[test]
fn unreadable_title_gets_placeholder_and_empty_fields() {
    let f = Fixture::signed_in();
    let other_key = vec![7u8; 32];
    let title = f.crypto.seal_b64(b"Hidden", &other_key).unwrap();
    let data = f.crypto.seal_b64(br#"{"website":"x.io"}"#, f.key()).unwrap();
    let entry = decode_item(&f.crypto, f.key(), &raw(42, &title, "login", &data)).unwrap();
    assert_eq!(entry.title, "[Item 42]");
    assert_eq!(entry.fields, EntryFields::empty(ItemType::Website));
}

#[test]
fn plaintext_title_and_garbage_data_still_list() {
    let f = Fixture::signed_in();
    let entry = decode_item(&f.crypto, f.key(), &raw(8, "Legacy entry", "note", "not sealed at all")).unwrap();
    assert_eq!(entry.title, "Legacy entry");
    assert_eq!(entry.item_type(), ItemType::Memo);
    assert_eq!(entry.notes, None);

    let empty = decode_item(&f.crypto, f.key(), &raw(9, "", "card", "")).unwrap();
    assert_eq!(empty.title, "[Item 9]");
}

#[test]
fn sealed_category_names_are_opened_in_rows() {
    let f = Fixture::signed_in();
    let mut row = raw(10, "Row ten", "identity", "");
    row.category_id = Some(3);
    row.category_name = Some(f.crypto.seal_b64(b"Family", f.key()).unwrap());
    let entry = decode_item(&f.crypto, f.key(), &row).unwrap();
    assert_eq!(entry.category_name.as_deref(), Some("Family"));
}
