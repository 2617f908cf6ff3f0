//! Shared test harness: an in-process vault server and app builders.
//!
//! `MockBackend` speaks the same JSON as the real server and checks the
//! credential proof the way the server does, so auth, recovery and vault
//! flows run end to end without a network.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use base64::{engine::general_purpose::STANDARD, Engine};
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Oaep, RsaPrivateKey};
use serde_json::{json, Value};
use sha2::Sha256;
use tempfile::TempDir;

use vaultdesk::app::{App, IN_MEMORY};
use vaultdesk::rpc_handler::handle_method;
use vaultdesk::services::clipboard::MemoryClipboard;
use vaultdesk::services::credential_proof::{hqt, CredentialProof, SandwichProof};
use vaultdesk::services::crypto_service::{CryptoService, CryptoServiceTrait};
use vaultdesk::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use vaultdesk::services::transport::{BackendTransport, HttpMethod};
use vaultdesk::types::errors::BackendError;
use vaultdesk::types::settings::{ClientSettings, KdfParams, ProofParams};
use vaultdesk::types::wire::{
    CreateCategoryPayload, CreateItemPayload, LoginPayload, RawCategory, RawItem, RecoveryProcessPayload,
    RecoveryRequestPayload, RecoverySetupPayload, RegisterPayload, UpdateCategoryPayload, UpdateItemPayload,
};

pub const SERVER_PRIVATE_KEY: &str = include_str!("../fixtures/server_key.pem");
pub const SERVER_PUBLIC_KEY: &str = include_str!("../fixtures/server_pub.pem");

pub const EMAIL: &str = "tester@vaultdesk.io";
pub const PASSWORD: &str = "Blue-Canyon-42-River!";
pub const NEW_PASSWORD: &str = "Green-Meadow-77-Stone?";

pub const STAMP: &str = "2025-05-09 11:30:42.789022+00";

// ─── Settings ───

pub fn fast_kdf() -> KdfParams {
    KdfParams {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn fast_proof_params() -> ProofParams {
    ProofParams {
        register_min: 10,
        register_max: 20,
        login_min: 1,
        login_max: 9,
    }
}

pub fn fast_settings() -> ClientSettings {
    ClientSettings {
        kdf: fast_kdf(),
        proof: fast_proof_params(),
        ..ClientSettings::default()
    }
}

pub fn fast_crypto() -> CryptoService {
    CryptoService::new(fast_kdf())
}

pub fn fast_proof() -> CredentialProof {
    CredentialProof::new(fast_proof_params())
}

/// Writes fast settings into `dir` and loads an engine from them.
pub fn settings_engine_in(dir: &TempDir) -> SettingsEngine {
    let path = dir.path().join("settings.json");
    let content = serde_json::to_string_pretty(&fast_settings()).expect("serialize settings");
    std::fs::write(&path, content).expect("write settings");
    let mut engine = SettingsEngine::new(Some(path.to_string_lossy().to_string()));
    engine.load().expect("load settings");
    engine
}

// ─── Mock server ───

struct Account {
    answers: Vec<Vec<u8>>,
    iterations: Vec<u32>,
    protected_vault_key: String,
}

#[derive(Default)]
struct ServerState {
    accounts: HashMap<String, Account>,
    recovery: HashMap<String, String>,
    session: Option<String>,
    items: Vec<RawItem>,
    categories: Vec<RawCategory>,
    next_id: u64,
    failures: HashMap<String, u16>,
    copy_counts: HashMap<u64, u32>,
    calls: Vec<String>,
    bodies: HashMap<String, Value>,
}

struct Inner {
    state: Mutex<ServerState>,
    crypto: CryptoService,
    proof: CredentialProof,
    private_key: RsaPrivateKey,
}

/// In-process vault server. Clones share state, so a test keeps one handle
/// while the app owns another.
#[derive(Clone)]
pub struct MockBackend {
    inner: Arc<Inner>,
}

type Reply = Result<Value, (u16, Value)>;

fn reject(code: u16, message: &str) -> (u16, Value) {
    (code, json!({ "message": message }))
}

fn parse<T: serde::de::DeserializeOwned>(body: Option<&Value>) -> Result<T, (u16, Value)> {
    let body = body.cloned().ok_or_else(|| reject(400, "missing body"))?;
    serde_json::from_value(body).map_err(|e| reject(400, &e.to_string()))
}

impl MockBackend {
    pub fn new() -> Self {
        let private_key = RsaPrivateKey::from_pkcs8_pem(SERVER_PRIVATE_KEY).expect("fixture private key");
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(ServerState {
                    next_id: 1,
                    ..ServerState::default()
                }),
                crypto: fast_crypto(),
                proof: fast_proof(),
                private_key,
            }),
        }
    }

    /// Every later request to `path` answers with `code`.
    pub fn fail(&self, path: &str, code: u16) {
        self.inner.state.lock().unwrap().failures.insert(path.to_string(), code);
    }

    pub fn heal(&self, path: &str) {
        self.inner.state.lock().unwrap().failures.remove(path);
    }

    /// Drops the server side of the session, as a timeout would.
    pub fn expire_session(&self) {
        self.inner.state.lock().unwrap().session = None;
    }

    pub fn session(&self) -> Option<String> {
        self.inner.state.lock().unwrap().session.clone()
    }

    /// Paths requested so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.inner.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, path: &str) -> usize {
        self.calls().iter().filter(|p| p.as_str() == path).count()
    }

    /// Body of the most recent request to `path`.
    pub fn last_body(&self, path: &str) -> Option<Value> {
        self.inner.state.lock().unwrap().bodies.get(path).cloned()
    }

    pub fn has_account(&self, email: &str) -> bool {
        self.inner.state.lock().unwrap().accounts.contains_key(email)
    }

    pub fn recovery_blob(&self, email_hash: &str) -> Option<String> {
        self.inner.state.lock().unwrap().recovery.get(email_hash).cloned()
    }

    pub fn raw_items(&self) -> Vec<RawItem> {
        self.inner.state.lock().unwrap().items.clone()
    }

    pub fn raw_categories(&self) -> Vec<RawCategory> {
        self.inner.state.lock().unwrap().categories.clone()
    }

    /// Stores a row as-is, for items the client itself would never write.
    pub fn insert_raw_item(&self, item: RawItem) {
        let mut state = self.inner.state.lock().unwrap();
        state.next_id = state.next_id.max(item.item_id + 1);
        state.items.push(item);
    }

    pub fn insert_raw_category(&self, category: RawCategory) {
        let mut state = self.inner.state.lock().unwrap();
        state.next_id = state.next_id.max(category.category_id + 1);
        state.categories.push(category);
    }

    pub fn copy_count(&self, item_id: u64) -> u32 {
        self.inner
            .state
            .lock()
            .unwrap()
            .copy_counts
            .get(&item_id)
            .copied()
            .unwrap_or_default()
    }

    fn unwrap_rsa(&self, b64: &str) -> Result<Vec<u8>, (u16, Value)> {
        let wrapped = STANDARD.decode(b64).map_err(|_| reject(400, "bad base64"))?;
        self.inner
            .private_key
            .decrypt(Oaep::new::<Sha256>(), &wrapped)
            .map_err(|_| reject(400, "cannot unwrap"))
    }

    fn open_with(&self, b64: &str, key: &[u8]) -> Result<String, (u16, Value)> {
        let bytes = self
            .inner
            .crypto
            .open_b64(b64, key)
            .map_err(|_| reject(400, "cannot open"))?;
        String::from_utf8(bytes).map_err(|_| reject(400, "not utf-8"))
    }

    fn parse_answers(text: &str) -> Result<Vec<Vec<u8>>, (u16, Value)> {
        text.split('|')
            .map(|a| STANDARD.decode(a).map_err(|_| reject(400, "bad answer")))
            .collect()
    }

    fn parse_iterations(text: &str) -> Result<Vec<u32>, (u16, Value)> {
        text.split('|')
            .map(|n| n.parse().map_err(|_| reject(400, "bad iteration")))
            .collect()
    }

    fn account_from(
        &self,
        session_key: &[u8],
        hp: &str,
        iterations: &str,
        protected_vault_key: &str,
    ) -> Result<Account, (u16, Value)> {
        let answers = Self::parse_answers(&self.open_with(hp, session_key)?)?;
        let iterations = Self::parse_iterations(&self.open_with(iterations, session_key)?)?;
        if answers.len() != iterations.len() {
            return Err(reject(400, "proof shape mismatch"));
        }
        Ok(Account {
            answers,
            iterations,
            protected_vault_key: protected_vault_key.to_string(),
        })
    }

    /// Extends each login chain until it meets the registered answer, then
    /// checks HqT against the recovered round counts.
    fn verify_login(&self, account: &Account, email: &str, payload: &LoginPayload) -> Result<(), (u16, Value)> {
        let crypto = &self.inner.crypto;
        let hq = Self::parse_answers(&payload.hq1_hqr)?;
        if hq.len() != account.answers.len() {
            return Err(reject(401, "Password not match"));
        }
        let chunks = self
            .inner
            .proof
            .email_chunks(crypto, email)
            .map_err(|_| reject(500, "kdf failure"))?;

        let mut login_iterations = Vec::with_capacity(hq.len());
        for ((answer, stored), (chunk, registered)) in hq
            .iter()
            .zip(&account.answers)
            .zip(chunks.iter().zip(&account.iterations))
        {
            let mut state = answer.clone();
            let mut matched = None;
            for extra in 0..=*registered {
                if &state == stored {
                    matched = Some(registered - extra);
                    break;
                }
                state = crypto.hash_chain(&state, chunk, 1);
            }
            login_iterations.push(matched.ok_or_else(|| reject(401, "Password not match"))?);
        }

        let proof = SandwichProof {
            answers: hq,
            iterations: login_iterations,
        };
        let expected = hqt(crypto, &proof, &payload.timestamp).map_err(|_| reject(500, "kdf failure"))?;
        if expected != payload.hqt {
            return Err(reject(401, "Invalid proof"));
        }
        Ok(())
    }

    fn route(&self, state: &mut ServerState, method: HttpMethod, path: &str, body: Option<&Value>) -> Reply {
        match (method, path) {
            (HttpMethod::Get, "/publickey") => Ok(json!({ "PublicKey": SERVER_PUBLIC_KEY })),

            (HttpMethod::Post, "/register") => {
                let payload: RegisterPayload = parse(body)?;
                let email = String::from_utf8(self.unwrap_rsa(&payload.email)?).map_err(|_| reject(400, "email"))?;
                if state.accounts.contains_key(&email) {
                    return Err(reject(409, "Email already registered"));
                }
                let session_key = self.unwrap_rsa(&payload.encrypted_sessionkey)?;
                let account = self.account_from(
                    &session_key,
                    &payload.encrypted_hp1_hpr,
                    &payload.encrypted_iteration,
                    &payload.protected_vault_key,
                )?;
                state.accounts.insert(email.clone(), account);
                state.session = Some(email);
                Ok(json!({ "success": true, "message": "Registered" }))
            }

            (HttpMethod::Post, "/login") => {
                let payload: LoginPayload = parse(body)?;
                let email = String::from_utf8(self.unwrap_rsa(&payload.email)?).map_err(|_| reject(400, "email"))?;
                let account = state.accounts.get(&email).ok_or_else(|| reject(401, "User not found"))?;
                self.verify_login(account, &email, &payload)?;
                let vault = account.protected_vault_key.clone();
                state.session = Some(email);
                Ok(json!({ "success": true, "message": "Login successful", "encrypted_vault": vault }))
            }

            (HttpMethod::Post, "/logout") => {
                state.session = None;
                Ok(json!({ "success": true, "message": "Logged out" }))
            }

            (HttpMethod::Post, "/session/check") => match &state.session {
                Some(email) => Ok(json!({ "success": true, "message": "Session valid", "email": email })),
                None => Err(reject(401, "Session expired")),
            },

            (HttpMethod::Post, "/recovery/setup") => {
                let payload: RecoverySetupPayload = parse(body)?;
                state.recovery.insert(payload.hashemail, payload.encrypted_recoverykey);
                Ok(json!({ "success": true, "message": "Recovery key stored" }))
            }

            (HttpMethod::Post, "/recovery/request") => {
                let payload: RecoveryRequestPayload = parse(body)?;
                let session_key = self.unwrap_rsa(&payload.encrypted_sessionkey)?;
                let hashed = self.open_with(&payload.encrypted_email, &session_key)?;
                let blob = state
                    .recovery
                    .get(&hashed)
                    .cloned()
                    .ok_or_else(|| reject(404, "No recovery record"))?;
                Ok(json!({ "success": true, "encrypted_revaultkey": blob }))
            }

            (HttpMethod::Post, "/recovery/process") => {
                let payload: RecoveryProcessPayload = parse(body)?;
                let session_key = self.unwrap_rsa(&payload.encrypted_sessionkey)?;
                let email = self.open_with(&payload.encrypted_email, &session_key)?;
                if !state.accounts.contains_key(&email) {
                    return Err(reject(404, "User not found"));
                }
                let account = self.account_from(
                    &session_key,
                    &payload.encrypted_hp1_hpr,
                    &payload.encrypted_iteration,
                    &payload.protected_vault_key,
                )?;
                state.accounts.insert(email, account);
                Ok(json!({ "success": true, "message": "Password reset" }))
            }

            _ => {
                if state.session.is_none() {
                    return Err(reject(401, "Unauthorized"));
                }
                self.route_vault(state, method, path, body)
            }
        }
    }

    fn route_vault(&self, state: &mut ServerState, method: HttpMethod, path: &str, body: Option<&Value>) -> Reply {
        match (method, path) {
            (HttpMethod::Get, "/getItemList") => Ok(json!({ "Items": state.items })),

            (HttpMethod::Post, "/createItem") => {
                let payload: CreateItemPayload = parse(body)?;
                let id = state.next_id;
                state.next_id += 1;
                state.items.push(RawItem {
                    item_id: id,
                    title: payload.title.clone(),
                    type_name: payload.type_name,
                    data: payload.data,
                    is_bookmark: false,
                    date_create: STAMP.to_string(),
                    date_modify: STAMP.to_string(),
                    category_id: None,
                    category_name: None,
                });
                // The real server sends the id as a string here.
                Ok(json!({ "item_id": id.to_string(), "title": payload.title, "createAt": STAMP, "message": "Item created" }))
            }

            (HttpMethod::Post, "/updateItem") => {
                let payload: UpdateItemPayload = parse(body)?;
                let category_name = payload.category_id.and_then(|cid| {
                    state
                        .categories
                        .iter()
                        .find(|c| c.category_id == cid)
                        .map(|c| c.category_name.clone())
                });
                let item = state
                    .items
                    .iter_mut()
                    .find(|i| i.item_id == payload.item_id)
                    .ok_or_else(|| reject(404, "Item not found"))?;
                item.title = payload.title;
                item.data = payload.data;
                item.category_id = payload.category_id;
                item.category_name = category_name;
                item.date_modify = STAMP.to_string();
                Ok(json!({ "item_id": payload.item_id, "message": "Item updated" }))
            }

            (HttpMethod::Delete, "/deleteItem") => {
                let id = item_id(body)?;
                let before = state.items.len();
                state.items.retain(|i| i.item_id != id);
                if state.items.len() == before {
                    return Err(reject(404, "Item not found"));
                }
                Ok(json!({ "item_id": id, "status": "deleted" }))
            }

            (HttpMethod::Post, "/bookmark") => {
                let id = item_id(body)?;
                let flag = body
                    .and_then(|b| b.get("bookmark"))
                    .and_then(Value::as_bool)
                    .ok_or_else(|| reject(400, "missing bookmark"))?;
                let item = state
                    .items
                    .iter_mut()
                    .find(|i| i.item_id == id)
                    .ok_or_else(|| reject(404, "Item not found"))?;
                item.is_bookmark = flag;
                Ok(json!({ "item_id": id, "status": "updated" }))
            }

            (HttpMethod::Post, "/copyCount") | (HttpMethod::Post, "/copyFreq") => {
                let id = item_id(body)?;
                if path == "/copyCount" {
                    *state.copy_counts.entry(id).or_default() += 1;
                }
                Ok(json!({ "item_id": id, "status": "counted" }))
            }

            (HttpMethod::Get, "/getCategoryList") => {
                let items = &state.items;
                let categories: Vec<RawCategory> = state
                    .categories
                    .iter()
                    .map(|c| RawCategory {
                        item_count: items.iter().filter(|i| i.category_id == Some(c.category_id)).count() as u64,
                        ..c.clone()
                    })
                    .collect();
                Ok(json!({ "Categories": categories }))
            }

            (HttpMethod::Post, "/createCategory") => {
                let payload: CreateCategoryPayload = parse(body)?;
                let id = state.next_id;
                state.next_id += 1;
                state.categories.push(RawCategory {
                    category_id: id,
                    category_name: payload.category.clone(),
                    item_count: 0,
                });
                Ok(json!({ "Category": payload.category, "status": "created" }))
            }

            (HttpMethod::Post, "/updateCategory") => {
                let payload: UpdateCategoryPayload = parse(body)?;
                let category = state
                    .categories
                    .iter_mut()
                    .find(|c| c.category_id == payload.category_id)
                    .ok_or_else(|| reject(404, "Category not found"))?;
                category.category_name = payload.categoryname;
                Ok(json!({ "category_id": payload.category_id.to_string(), "status": "updated" }))
            }

            (HttpMethod::Delete, "/deleteCategory") => {
                let id = body
                    .and_then(|b| b.get("category_id"))
                    .and_then(Value::as_u64)
                    .ok_or_else(|| reject(400, "missing category_id"))?;
                let pos = state
                    .categories
                    .iter()
                    .position(|c| c.category_id == id)
                    .ok_or_else(|| reject(404, "Category not found"))?;
                let removed = state.categories.remove(pos);
                for item in state.items.iter_mut().filter(|i| i.category_id == Some(id)) {
                    item.category_id = None;
                    item.category_name = None;
                }
                Ok(json!({ "Category": removed.category_name, "status": "deleted" }))
            }

            _ => Err(reject(404, "Not found")),
        }
    }
}

fn item_id(body: Option<&Value>) -> Result<u64, (u16, Value)> {
    body.and_then(|b| b.get("item_id"))
        .and_then(Value::as_u64)
        .ok_or_else(|| reject(400, "missing item_id"))
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendTransport for MockBackend {
    fn request(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> Result<Value, BackendError> {
        let mut state = self.inner.state.lock().unwrap();
        state.calls.push(path.to_string());
        if let Some(b) = body {
            state.bodies.insert(path.to_string(), b.clone());
        }
        if let Some(code) = state.failures.get(path).copied() {
            return Err(BackendError::Status {
                path: path.to_string(),
                code,
                body: json!({ "message": "injected failure" }).to_string(),
            });
        }
        self.route(&mut state, method, path, body).map_err(|(code, body)| BackendError::Status {
            path: path.to_string(),
            code,
            body: body.to_string(),
        })
    }

    fn reset_session(&mut self) -> Result<(), BackendError> {
        self.expire_session();
        Ok(())
    }
}

// ─── App harness ───

pub struct TestApp {
    pub app: Mutex<App>,
    pub backend: MockBackend,
    pub clipboard: MemoryClipboard,
    _dir: TempDir,
}

impl TestApp {
    pub fn call(&self, method: &str, params: Value) -> Result<Value, String> {
        handle_method(&self.app, method, &params)
    }

    /// Calls a binding that must succeed.
    pub fn ok(&self, method: &str, params: Value) -> Value {
        self.call(method, params)
            .unwrap_or_else(|e| panic!("{} failed: {}", method, e))
    }
}

/// App on an in-memory database, fast KDF settings and a fresh mock server.
pub fn test_app() -> TestApp {
    let dir = TempDir::new().expect("temp dir");
    let backend = MockBackend::new();
    let clipboard = MemoryClipboard::new();
    let app = App::with_transport(
        settings_engine_in(&dir),
        IN_MEMORY,
        Box::new(backend.clone()),
        Box::new(clipboard.clone()),
    )
    .expect("app");
    TestApp {
        app: Mutex::new(app),
        backend,
        clipboard,
        _dir: dir,
    }
}

/// Registers [`EMAIL`], acknowledges the seed phrase and returns it.
pub fn registered_app() -> (TestApp, String) {
    let t = test_app();
    let res = t.ok(
        "RegisterUser",
        json!({ "email": EMAIL, "password": PASSWORD, "confirmPassword": PASSWORD }),
    );
    let seed = res["seedPhrase"].as_str().expect("seed phrase").to_string();
    t.ok("ConfirmSeedPhrase", json!({}));
    (t, seed)
}

/// A website item's data object.
pub fn website_data(site: &str, password: &str) -> Value {
    json!({
        "website": site,
        "username": "tester",
        "email": EMAIL,
        "password": password,
        "notes": "primary account",
    })
}
