//! JavaScript entry point.
//!
//! Lets a plain page turn an element into a drop area, the way the jQuery
//! plugin used to:
//!
//! ```js
//! import init, { droparea } from "./droparea.js";
//!
//! await init();
//! droparea(document.getElementById("avatar-zone"), {
//!     url: "/upload",
//!     accepted: ".jpg|.png",
//!     extra: ["#user_id"],
//!     onSuccess: (response, fileName, file) => console.log(fileName),
//!     onFail: (error) => console.error(error),
//! });
//! ```

use leptos::*;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::components::DropArea;
use crate::config::DropAreaOptions;
use crate::types::{ConfigError, UploadFailure, UploadSuccess};

/// Keys of the success callback; `success` is the jQuery plugin's name.
const SUCCESS_KEYS: &[&str] = &["onSuccess", "success"];
const FAIL_KEYS: &[&str] = &["onFail"];

/// Mount a drop area inside `target`.
///
/// `options` is a plain object; functions are read from `onSuccess` (or
/// `success`) and `onFail`, everything else goes through [`DropAreaOptions`].
#[wasm_bindgen]
pub fn droparea(target: HtmlElement, options: JsValue) -> Result<(), JsValue> {
    let parsed = parse_options(&options).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let on_success = callback_option(&options, SUCCESS_KEYS);
    let on_fail = callback_option(&options, FAIL_KEYS);

    log::debug!("Mounting droparea for {}", parsed.url);

    mount_to(target, move || {
        let on_success = on_success.map(|f| {
            Callback::new(move |success: UploadSuccess| {
                let file_name = success
                    .file_name
                    .as_deref()
                    .map(JsValue::from_str)
                    .unwrap_or(JsValue::NULL);
                let file = success.file.blob.map(JsValue::from).unwrap_or(JsValue::NULL);

                if let Err(e) = f.call3(&JsValue::NULL, &to_js(&success.response), &file_name, &file) {
                    log::error!("onSuccess callback threw: {:?}", e);
                }
            })
        });

        let on_fail = on_fail.map(|f| {
            Callback::new(move |failure: UploadFailure| {
                if let Err(e) = f.call1(&JsValue::NULL, &to_js(&failure.payload())) {
                    log::error!("onFail callback threw: {:?}", e);
                }
            })
        });

        view! { <DropArea options=parsed on_success=on_success on_fail=on_fail/> }
    });

    Ok(())
}

fn parse_options(options: &JsValue) -> Result<DropAreaOptions, ConfigError> {
    if options.is_undefined() || options.is_null() {
        return Ok(DropAreaOptions::default());
    }

    // JSON.stringify drops the callbacks, which serde could not read anyway.
    let json = js_sys::JSON::stringify(options)
        .map_err(|e| ConfigError(format!("{:?}", e)))?;
    DropAreaOptions::from_json(&String::from(json))
}

/// First function found under `keys`, in order.
fn callback_option(options: &JsValue, keys: &[&str]) -> Option<js_sys::Function> {
    if !options.is_object() {
        return None;
    }
    first_of(keys, |key| {
        js_sys::Reflect::get(options, &JsValue::from_str(key))
            .ok()
            .and_then(|value| value.dyn_into::<js_sys::Function>().ok())
    })
}

fn first_of<T>(keys: &[&str], lookup: impl FnMut(&str) -> Option<T>) -> Option<T> {
    keys.iter().copied().find_map(lookup)
}

/// Plain JS objects rather than `Map`s, so callbacks can use `r.file_name`.
fn to_js(value: &Value) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}
