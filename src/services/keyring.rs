use zeroize::Zeroizing;

/// Key material for the signed-in account.
///
/// Every key is wiped when replaced, when [`KeyRing::clear`] runs and when
/// the ring is dropped.
#[derive(Default)]
pub struct KeyRing {
    vault_key: Option<Zeroizing<Vec<u8>>>,
    master_key: Option<Zeroizing<Vec<u8>>>,
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_vault_key(&mut self, key: Zeroizing<Vec<u8>>) {
        self.vault_key = Some(key);
    }

    pub fn set_master_key(&mut self, key: Zeroizing<Vec<u8>>) {
        self.master_key = Some(key);
    }

    pub fn vault_key(&self) -> Option<&[u8]> {
        self.vault_key.as_deref().map(Vec::as_slice)
    }

    pub fn master_key(&self) -> Option<&[u8]> {
        self.master_key.as_deref().map(Vec::as_slice)
    }

    /// True once a vault key is loaded. Item and category calls need it.
    pub fn is_unlocked(&self) -> bool {
        self.vault_key.is_some()
    }

    pub fn clear(&mut self) {
        self.vault_key = None;
        self.master_key = None;
    }
}

impl std::fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRing")
            .field("vault_key", &self.vault_key.is_some())
            .field("master_key", &self.master_key.is_some())
            .finish()
    }
}
