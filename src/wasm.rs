//! WASM bindings for converting pastes in the browser.
//!
//! Results cross the boundary as JSON: a string for inline results, an
//! array of blocks otherwise.

use wasm_bindgen::prelude::*;

use crate::convert::{Mode, PasteOptions, convert};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Convert pasted content with the core block set.
///
/// `mode` is `"auto"`, `"inline"` or `"blocks"`; `tag_name` is the tag of the
/// element being pasted into, if any.
#[wasm_bindgen]
pub fn convert_paste(
    html: &str,
    plain_text: &str,
    mode: &str,
    tag_name: Option<String>,
) -> Result<String, JsValue> {
    let mode: Mode = mode.parse().map_err(|e: crate::Error| JsValue::from_str(&e.to_string()))?;

    let mut options = PasteOptions::html(html)
        .with_plain_text(plain_text)
        .with_mode(mode);
    options.tag_name = tag_name;

    serde_json::to_string(&convert(&options)).map_err(|e| JsValue::from_str(&e.to_string()))
}
