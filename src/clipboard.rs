use crate::errors::CollectError;
use arboard::Clipboard;
use tracing::{debug, info};

pub fn copy_to_clipboard(text: &str) -> Result<(), CollectError> {
    debug!("Initializing clipboard");
    let mut clipboard =
        Clipboard::new().map_err(|e| CollectError::ClipboardInitError(e.to_string()))?;

    clipboard
        .set_text(text)
        .map_err(|e| CollectError::ClipboardWriteError(e.to_string()))?;

    info!("Document copied to clipboard ({} bytes)", text.len());
    Ok(())
}
