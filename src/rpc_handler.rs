//! Binding dispatcher for vaultdesk.
//!
//! Both hosts (the webview IPC bridge and the stdin/stdout JSON-RPC server)
//! route calls through [`handle_method`]. Calls are serialized by the `App`
//! mutex.

use std::sync::Mutex;

use serde_json::{json, Map, Value};

use crate::app::App;
use crate::managers::category_manager::CategoryManagerTrait;
use crate::managers::session_manager::SessionManagerTrait;
use crate::managers::vault_cache::{VaultCacheTrait, VaultFilter};
use crate::services::auth_service::AuthService;
use crate::services::category_service::CategoryService;
use crate::services::datetime::format_bangkok_date;
use crate::services::generator::{generate_password, generate_username, UsernameStyle, DEFAULT_EMAIL_PROVIDER};
use crate::services::preferences::{PreferenceStore, PreferenceStoreTrait};
use crate::services::recovery_service::RecoveryService;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::services::strength::{check, is_password_valid};
use crate::services::validation::validate_email;
use crate::services::vault_service::VaultService;
use crate::types::entry::ItemType;
use crate::types::errors::{AuthError, VaultError};
use crate::types::settings::GeneratorOptions;

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

/// Ids arrive as numbers from the UI, sometimes as numeric strings.
fn id_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn id_param(params: &Value, name: &str) -> Result<u64, String> {
    params
        .get(name)
        .and_then(id_value)
        .ok_or_else(|| format!("missing {}", name))
}

/// `null` and absent both mean "none".
fn optional_id_param(params: &Value, name: &str) -> Result<Option<u64>, String> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => id_value(v).map(Some).ok_or_else(|| format!("invalid {}", name)),
    }
}

fn object_param<'a>(params: &'a Value, name: &str) -> Result<&'a Map<String, Value>, String> {
    params
        .get(name)
        .and_then(|v| v.as_object())
        .ok_or_else(|| format!("missing {}", name))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// Overlays any generator toggles present in `params` on `base`.
fn generator_options(params: &Value, base: GeneratorOptions) -> Result<GeneratorOptions, String> {
    let mut options = base;
    if let Some(length) = params.get("length") {
        options.length = length
            .as_u64()
            .map(|l| l as usize)
            .ok_or("invalid length")?;
    }
    for (name, slot) in [
        ("uppercase", &mut options.uppercase),
        ("numbers", &mut options.numbers),
        ("symbols", &mut options.symbols),
    ] {
        if let Some(flag) = params.get(name) {
            *slot = flag.as_bool().ok_or_else(|| format!("invalid {}", name))?;
        }
    }
    Ok(options)
}

/// Dispatch a binding call to the services behind it.
///
/// Returns `Ok(Value)` on success or `Err(String)` with a message the hosts
/// turn into a toast.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    tracing::debug!(method, "binding called");
    let result = dispatch(app, method, params);
    match &result {
        Ok(_) => tracing::info!(method, "binding succeeded"),
        Err(e) => tracing::warn!(method, error = %e, "binding failed"),
    }
    result
}

fn dispatch(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        // ─── Auth ───
        "LoginUser" => {
            let email = str_param(params, "email")?.trim();
            let password = str_param(params, "password")?;
            let mut guard = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *guard;
            // A failed attempt leaves the current session and its caches alone.
            let response = AuthService::new(&*a.transport, &a.crypto, &a.proof)
                .login(&mut a.keyring, email, password)
                .map_err(|e| e.to_string())?;
            a.category_manager.clear();
            a.vault_cache.clear();
            a.session_manager.sign_in(email);
            Ok(json!({"success": response.success, "message": response.message}))
        }
        "RegisterUser" => {
            let email = str_param(params, "email")?.trim();
            let password = str_param(params, "password")?;
            let confirm = str_param(params, "confirmPassword")?;
            let mut guard = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *guard;
            let seed_phrase = AuthService::new(&*a.transport, &a.crypto, &a.proof)
                .register(&mut a.keyring, email, password, confirm)
                .map_err(|e| e.to_string())?;
            a.session_manager.await_seed_confirmation(email, seed_phrase.clone());
            Ok(json!({"seedPhrase": seed_phrase}))
        }
        "ConfirmSeedPhrase" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.session_manager.confirm_seed_phrase().map_err(|e| e.to_string())?;
            to_json(&a.session_manager.status())
        }
        "LogoutUser" => {
            let mut guard = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *guard;
            let outcome = AuthService::new(&*a.transport, &a.crypto, &a.proof).logout();
            a.lock();
            let response = outcome.map_err(|e| e.to_string())?;
            Ok(json!({"success": response.success, "message": response.message}))
        }
        "SessionCheck" => {
            let mut guard = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *guard;
            let outcome = AuthService::new(&*a.transport, &a.crypto, &a.proof).session_check();
            match outcome {
                Ok(response) => to_json(&response),
                Err(e) => {
                    if matches!(&e, AuthError::Backend(b) if b.status_code() == Some(401)) {
                        a.lock();
                    }
                    Err(e.to_string())
                }
            }
        }
        "AuthStatus" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            to_json(&a.session_manager.status())
        }
        "RecoveryProcess" => {
            let email = str_param(params, "email")?.trim();
            let new_password = str_param(params, "newPassword")?;
            let seed_phrase = str_param(params, "seedPhrase")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let new_seed = RecoveryService::new(&*a.transport, &a.crypto, &a.proof)
                .process(email, new_password, seed_phrase)
                .map_err(|e| e.to_string())?;
            Ok(Value::String(new_seed))
        }

        // ─── Vault items ───
        "CreateItemClient" => {
            let title = str_param(params, "title")?;
            let type_name = str_param(params, "typeName")?;
            let data = object_param(params, "data")?;
            let item_type = ItemType::parse_any(type_name)
                .ok_or_else(|| VaultError::UnknownType(type_name.to_string()).to_string())?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let response = VaultService::new(&*a.transport, &a.crypto, &a.keyring)
                .create_item(title, item_type, data)
                .map_err(|e| e.to_string())?;
            to_json(&response)
        }
        "UpdateItemClient" => {
            let id = id_param(params, "id")?;
            let category_id = optional_id_param(params, "categoryId")?;
            let title = str_param(params, "title")?;
            let data = object_param(params, "data")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let item_type = data
                .get("type")
                .and_then(|v| v.as_str())
                .and_then(ItemType::parse_any)
                .or_else(|| a.vault_cache.get(id).map(|e| e.item_type()));
            let response = VaultService::new(&*a.transport, &a.crypto, &a.keyring)
                .update_item(id, category_id, title, item_type, data)
                .map_err(|e| e.to_string())?;
            to_json(&response)
        }
        "DeleteItemClient" => {
            let id = id_param(params, "id")?;
            let mut guard = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *guard;
            let response = VaultService::new(&*a.transport, &a.crypto, &a.keyring)
                .delete_item(id)
                .map_err(|e| e.to_string())?;
            a.vault_cache.remove(id);
            to_json(&response)
        }
        "GetPasswordList" => {
            let mut guard = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *guard;
            let entries = VaultService::new(&*a.transport, &a.crypto, &a.keyring)
                .list_items()
                .map_err(|e| e.to_string())?;
            let value = to_json(&entries)?;
            a.vault_cache.replace(entries);
            Ok(value)
        }
        "FilterPasswordList" => {
            let filter: VaultFilter = match params.get("filter") {
                None | Some(Value::Null) => VaultFilter::All,
                Some(v) => serde_json::from_value(v.clone()).map_err(|e| format!("invalid filter: {}", e))?,
            };
            let search = params.get("search").and_then(|v| v.as_str()).unwrap_or("");
            let a = app.lock().map_err(|e| e.to_string())?;
            to_json(&a.vault_cache.filter(filter, search))
        }
        "ToggleBookmark" => {
            let id = id_param(params, "id")?;
            let new_state = params.get("newState").and_then(|v| v.as_bool()).ok_or("missing newState")?;
            let mut guard = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *guard;
            let service = VaultService::new(&*a.transport, &a.crypto, &a.keyring);
            let response = a
                .vault_cache
                .toggle_bookmark_with(id, new_state, || service.set_bookmark(id, new_state))
                .map_err(|e| e.to_string())?;
            to_json(&response)
        }
        "CopyField" => {
            let id = id_param(params, "id")?;
            let field = str_param(params, "field")?;
            let mut guard = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *guard;
            let entry = a.vault_cache.get(id).ok_or(VaultError::NotFound(id)).map_err(|e| e.to_string())?;
            let text = zeroize::Zeroizing::new(entry.copyable(field).ok_or_else(|| {
                VaultError::UnknownField {
                    id,
                    field: field.to_string(),
                }
                .to_string()
            })?);
            a.clipboard
                .set_text(&text)
                .map_err(|e| VaultError::from(e).to_string())?;
            // Usage counters are best effort.
            let _ = VaultService::new(&*a.transport, &a.crypto, &a.keyring).record_copy(id);
            Ok(json!({"copied": true, "field": field}))
        }

        // ─── Categories ───
        "GetCategoryList" => {
            let mut guard = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *guard;
            let categories = CategoryService::new(&*a.transport, &a.crypto, &a.keyring)
                .list()
                .map_err(|e| e.to_string())?;
            let arr: Vec<Value> = categories
                .iter()
                .map(|c| json!({"CategoryID": c.id, "CategoryName": c.name, "ItemCount": c.count}))
                .collect();
            a.category_manager.replace(categories);
            Ok(json!(arr))
        }
        "CreateCategoryClient" => {
            let name = str_param(params, "name")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let response = CategoryService::new(&*a.transport, &a.crypto, &a.keyring)
                .create(name)
                .map_err(|e| e.to_string())?;
            to_json(&response)
        }
        "UpdateCategoryClient" => {
            let id = id_param(params, "id")?;
            let name = str_param(params, "name")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let response = CategoryService::new(&*a.transport, &a.crypto, &a.keyring)
                .update(id, name)
                .map_err(|e| e.to_string())?;
            to_json(&response)
        }
        "DeleteCategoryClient" => {
            let id = id_param(params, "id")?;
            let mut guard = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *guard;
            let response = CategoryService::new(&*a.transport, &a.crypto, &a.keyring)
                .delete(id)
                .map_err(|e| e.to_string())?;
            if a.category_manager.active().map(|c| c.id) == Some(id) {
                a.category_manager.set_active(None);
            }
            to_json(&response)
        }
        "SetActiveCategory" => {
            let id = optional_id_param(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            to_json(&a.category_manager.set_active(id))
        }
        "GetCategoryNameById" => {
            let id = id_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            Ok(json!(a.category_manager.name_by_id(id)))
        }
        "GetCategoryIdByName" => {
            let name = str_param(params, "name")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            Ok(json!(a.category_manager.id_by_name(name)))
        }

        // ─── Generators & helpers ───
        "GeneratePassword" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let stored = PreferenceStore::new(a.db.connection())
                .generator_options()
                .map_err(|e| e.to_string())?;
            let options = generator_options(params, stored)?;
            let password = generate_password(&a.crypto, &options).map_err(|e| e.to_string())?;
            Ok(Value::String(password))
        }
        "GenerateUsername" => {
            let style = match params.get("style").and_then(|v| v.as_str()).unwrap_or("random") {
                "random" => UsernameStyle::Random,
                "email" => UsernameStyle::Email {
                    provider: params
                        .get("provider")
                        .and_then(|v| v.as_str())
                        .filter(|p| !p.is_empty())
                        .unwrap_or(DEFAULT_EMAIL_PROVIDER)
                        .to_string(),
                },
                other => return Err(format!("unknown username style: {}", other)),
            };
            let a = app.lock().map_err(|e| e.to_string())?;
            let username = generate_username(&a.crypto, &style).map_err(|e| e.to_string())?;
            Ok(Value::String(username))
        }
        "CheckPasswordStrength" => {
            let password = str_param(params, "password")?;
            let email = params.get("email").and_then(|v| v.as_str()).unwrap_or("");
            to_json(&check(password, email))
        }
        "IsPasswordValid" => {
            let password = str_param(params, "password")?;
            let email = params.get("email").and_then(|v| v.as_str()).unwrap_or("");
            Ok(json!(is_password_valid(password, email)))
        }
        "ValidateEmail" => {
            let email = str_param(params, "email")?;
            Ok(json!(validate_email(email)))
        }
        "FormatDate" => {
            let date = str_param(params, "date")?;
            Ok(Value::String(format_bangkok_date(date)))
        }

        // ─── Preferences ───
        "GetColorSettings" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let colors = PreferenceStore::new(a.db.connection())
                .color_settings()
                .map_err(|e| e.to_string())?;
            to_json(&colors)
        }
        "UpdateColorSetting" => {
            let type_name = str_param(params, "type")?;
            let color = str_param(params, "color")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let colors = PreferenceStore::new(a.db.connection())
                .update_color(type_name, color)
                .map_err(|e| e.to_string())?;
            to_json(&colors)
        }
        "ResetColorSettings" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let colors = PreferenceStore::new(a.db.connection())
                .reset_colors()
                .map_err(|e| e.to_string())?;
            to_json(&colors)
        }
        "GetGeneratorOptions" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let options = PreferenceStore::new(a.db.connection())
                .generator_options()
                .map_err(|e| e.to_string())?;
            to_json(&options)
        }
        "SetGeneratorOptions" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let store = PreferenceStore::new(a.db.connection());
            let current = store.generator_options().map_err(|e| e.to_string())?;
            let options = generator_options(params, current)?;
            let saved = store.set_generator_options(options).map_err(|e| e.to_string())?;
            to_json(&saved)
        }

        // ─── Settings ───
        "GetSettings" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            to_json(a.settings_engine.get_settings())
        }
        "SetSetting" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            // Backend address changes apply on the next launch.
            a.settings_engine.set_value(key, value).map_err(|e| e.to_string())?;
            to_json(a.settings_engine.get_settings())
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
