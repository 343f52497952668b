//! Image preview of manually selected files.

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, File, FileReader, HtmlImageElement};

/// Read a file into a `data:` URL.
pub async fn read_as_data_url(file: &File) -> Result<String, JsValue> {
    let reader = FileReader::new()?;

    let promise = Promise::new(&mut |resolve, reject| {
        let source = reader.clone();
        let on_load: Closure<dyn FnMut(Event)> = Closure::once(move |_: Event| {
            let _ = resolve.call1(&JsValue::NULL, &source.result().unwrap_or(JsValue::NULL));
        });

        let source = reader.clone();
        let on_error: Closure<dyn FnMut(Event)> = Closure::once(move |_: Event| {
            let error = source
                .error()
                .map(JsValue::from)
                .unwrap_or_else(|| JsValue::from_str("failed to read file"));
            let _ = reject.call1(&JsValue::NULL, &error);
        });

        reader.set_onload(Some(on_load.as_ref().unchecked_ref()));
        reader.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        on_load.forget();
        on_error.forget();
    });

    reader.read_as_data_url(file)?;
    let result = JsFuture::from(promise).await;

    reader.set_onload(None);
    reader.set_onerror(None);

    result?
        .as_string()
        .ok_or_else(|| JsValue::from_str("file reader returned no data URL"))
}

/// Point the preview element at `src`. Returns false when the selector
/// matches nothing.
pub fn show_preview(selector: &str, src: &str) -> bool {
    let element = match gloo_utils::document().query_selector(selector) {
        Ok(Some(element)) => element,
        _ => return false,
    };

    match element.dyn_ref::<HtmlImageElement>() {
        Some(image) => image.set_src(src),
        None => {
            if let Err(e) = element.set_attribute("src", src) {
                log::warn!("Failed to set preview source: {:?}", e);
                return false;
            }
        }
    }
    true
}

/// Whether the page has an element for this selector.
pub fn element_exists(selector: &str) -> bool {
    matches!(gloo_utils::document().query_selector(selector), Ok(Some(_)))
}
