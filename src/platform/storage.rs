//! LocalStorage access
//!
//! Settings, tuning overrides and score records all live under their own key.
//! Missing storage (private mode, native builds) reads as empty.

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Read a value, `None` if absent or storage is unavailable
#[cfg(target_arch = "wasm32")]
pub fn get_item(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

/// Write a value
#[cfg(target_arch = "wasm32")]
pub fn set_item(key: &str, value: &str) -> Result<(), String> {
    let storage = local_storage().ok_or_else(|| "LocalStorage not available".to_string())?;
    storage
        .set_item(key, value)
        .map_err(|e| format!("LocalStorage write failed: {:?}", e))
}

/// Native stubs
#[cfg(not(target_arch = "wasm32"))]
pub fn get_item(_key: &str) -> Option<String> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn set_item(_key: &str, _value: &str) -> Result<(), String> {
    // No-op for native
    Ok(())
}
