//! Key/value blob storage
//!
//! On wasm32 a location is a `window.localStorage` key. On native targets it
//! is a file path; writes go through a `.tmp` sibling and a rename so a crash
//! never leaves a half-written file behind.

/// Read the blob at `location`, `None` if nothing was saved yet
#[cfg(target_arch = "wasm32")]
pub fn read(location: &str) -> Result<Option<String>, String> {
    local_storage()?
        .get_item(location)
        .map_err(|e| format!("localStorage read failed: {e:?}"))
}

/// Replace the blob at `location`
#[cfg(target_arch = "wasm32")]
pub fn write(location: &str, contents: &str) -> Result<(), String> {
    local_storage()?
        .set_item(location, contents)
        .map_err(|e| format!("localStorage write failed: {e:?}"))
}

/// Delete the blob at `location` if present
#[cfg(target_arch = "wasm32")]
pub fn remove(location: &str) -> Result<(), String> {
    local_storage()?
        .remove_item(location)
        .map_err(|e| format!("localStorage remove failed: {e:?}"))
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, String> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .ok_or_else(|| "localStorage unavailable".to_string())
}

/// Read the blob at `location`, `None` if nothing was saved yet
#[cfg(not(target_arch = "wasm32"))]
pub fn read(location: &str) -> Result<Option<String>, String> {
    match std::fs::read_to_string(location) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(format!("read {location} failed: {e}")),
    }
}

/// Replace the blob at `location`
#[cfg(not(target_arch = "wasm32"))]
pub fn write(location: &str, contents: &str) -> Result<(), String> {
    let tmp = format!("{location}.tmp");
    std::fs::write(&tmp, contents).map_err(|e| format!("write {tmp} failed: {e}"))?;
    std::fs::rename(&tmp, location).map_err(|e| format!("rename {tmp} failed: {e}"))
}

/// Delete the blob at `location` if present
#[cfg(not(target_arch = "wasm32"))]
pub fn remove(location: &str) -> Result<(), String> {
    match std::fs::remove_file(location) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("remove {location} failed: {e}")),
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.json");
        let location = path.to_str().unwrap();

        assert_eq!(read(location).unwrap(), None);
        write(location, "{\"a\":1}").unwrap();
        assert_eq!(read(location).unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(!dir.path().join("blob.json.tmp").exists());

        remove(location).unwrap();
        assert_eq!(read(location).unwrap(), None);
        // Removing twice is fine
        remove(location).unwrap();
    }
}
