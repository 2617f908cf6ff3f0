use crate::services::crypto_service::CryptoServiceTrait;
use crate::services::keyring::KeyRing;
use crate::services::transport::{decode, encode, BackendTransport, HttpMethod};
use crate::services::vault_service::display_label;
use crate::types::category::{is_valid_category_name, Category};
use crate::types::errors::CategoryError;
use crate::types::wire::{
    CategoryAckResponse, CategoryIdPayload, CategoryListResponse, CreateCategoryPayload, UpdateCategoryPayload,
    UpdateCategoryResponse,
};

/// Category CRUD. Names are sealed with the vault key like item titles.
pub struct CategoryService<'a> {
    transport: &'a dyn BackendTransport,
    crypto: &'a dyn CryptoServiceTrait,
    keyring: &'a KeyRing,
}

impl<'a> CategoryService<'a> {
    pub fn new(transport: &'a dyn BackendTransport, crypto: &'a dyn CryptoServiceTrait, keyring: &'a KeyRing) -> Self {
        Self {
            transport,
            crypto,
            keyring,
        }
    }

    fn vault_key(&self) -> Result<&'a [u8], CategoryError> {
        self.keyring.vault_key().ok_or(CategoryError::Locked)
    }

    fn sealed_name(&self, name: &str) -> Result<String, CategoryError> {
        let name = name.trim();
        if !is_valid_category_name(name) {
            return Err(CategoryError::InvalidName);
        }
        Ok(self.crypto.seal_b64(name.as_bytes(), self.vault_key()?)?)
    }

    pub fn list(&self) -> Result<Vec<Category>, CategoryError> {
        let key = self.vault_key()?;
        let value = self.transport.request(HttpMethod::Get, "/getCategoryList", None)?;
        let response: CategoryListResponse = decode("/getCategoryList", value)?;
        Ok(response
            .categories
            .iter()
            .map(|raw| Category {
                id: raw.category_id,
                name: display_label(
                    self.crypto,
                    key,
                    &raw.category_name,
                    format!("[Category {}]", raw.category_id),
                ),
                count: raw.item_count,
            })
            .collect())
    }

    pub fn create(&self, name: &str) -> Result<CategoryAckResponse, CategoryError> {
        let payload = CreateCategoryPayload {
            category: self.sealed_name(name)?,
        };
        let body = encode("/createCategory", &payload)?;
        let value = self.transport.request(HttpMethod::Post, "/createCategory", Some(&body))?;
        let mut response: CategoryAckResponse = decode("/createCategory", value)?;
        response.category = name.trim().to_string();
        tracing::info!("category created");
        Ok(response)
    }

    pub fn update(&self, id: u64, name: &str) -> Result<UpdateCategoryResponse, CategoryError> {
        let payload = UpdateCategoryPayload {
            category_id: id,
            categoryname: self.sealed_name(name)?,
        };
        let body = encode("/updateCategory", &payload)?;
        let value = self.transport.request(HttpMethod::Post, "/updateCategory", Some(&body))?;
        let response: UpdateCategoryResponse = decode("/updateCategory", value)?;
        tracing::info!(category_id = id, "category renamed");
        Ok(response)
    }

    pub fn delete(&self, id: u64) -> Result<CategoryAckResponse, CategoryError> {
        let key = self.vault_key()?;
        let body = encode("/deleteCategory", &CategoryIdPayload { category_id: id })?;
        let value = self.transport.request(HttpMethod::Delete, "/deleteCategory", Some(&body))?;
        let mut response: CategoryAckResponse = decode("/deleteCategory", value)?;
        if !response.category.is_empty() {
            response.category = display_label(self.crypto, key, &response.category, format!("[Category {}]", id));
        }
        tracing::info!(category_id = id, "category deleted");
        Ok(response)
    }
}
