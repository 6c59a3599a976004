use pseudodojo_core::{ArchiveTable, Catalog, FileTable};
use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::dom;

pub const FILES_JSON: &str = "files.json";
pub const TARGZ_JSON: &str = "targz.json";

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

async fn fetch(url: &str, method: &str, mode: RequestMode) -> Result<Response, JsValue> {
    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(mode);

    let request = Request::new_with_str_and_init(url, &opts)?;
    let value = JsFuture::from(dom::window()?.fetch_with_request(&request)).await?;
    value.dyn_into::<Response>()
}

async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    let response = fetch(url, "GET", RequestMode::SameOrigin)
        .await
        .map_err(|e| format!("{url}: {}", describe(&e)))?;
    if !response.ok() {
        return Err(format!("{url}: HTTP {}", response.status()));
    }

    let body = response.json().map_err(|e| describe(&e))?;
    let json = JsFuture::from(body)
        .await
        .map_err(|e| format!("Failed to read {url} body: {}", describe(&e)))?;
    serde_wasm_bindgen::from_value(json).map_err(|e| format!("Failed to parse {url}: {e}"))
}

/// Fetches both tables together; the caller sees nothing until both settle.
pub async fn load_catalog() -> Result<Catalog, String> {
    let (files, archives) = futures::join!(
        fetch_json::<FileTable>(FILES_JSON),
        fetch_json::<ArchiveTable>(TARGZ_JSON)
    );
    Ok(Catalog::new(files?, archives?))
}

/// HEAD request; any network error or non-2xx answer counts as absent.
pub async fn probe(url: &str) -> bool {
    match fetch(url, "HEAD", RequestMode::Cors).await {
        Ok(response) => response.ok(),
        Err(e) => {
            web_sys::console::warn_1(&format!("probe of {url} failed: {}", describe(&e)).into());
            false
        }
    }
}
