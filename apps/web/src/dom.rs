use pseudodojo_core::{download_name, Paint};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlAnchorElement, HtmlElement, HtmlOptionElement, HtmlSelectElement,
    Storage, UrlSearchParams, Window,
};

const SNACKBAR_MS: i32 = 3000;
const WARNING_BOX: &str = "warning_box";

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

pub fn by_id<T: JsCast>(id: &str) -> Option<T> {
    document()
        .ok()?
        .get_element_by_id(id)?
        .dyn_into::<T>()
        .ok()
}

/// Writes text into the element with `id`; false when the page has no such node.
pub fn set_text(id: &str, text: &str) -> bool {
    match by_id::<Element>(id) {
        Some(element) => {
            element.set_text_content(Some(text));
            true
        }
        None => false,
    }
}

/// Sets one inline style property, logging when the browser refuses it.
fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(e) = element.style().set_property(property, value) {
        web_sys::console::error_2(&format!("cannot set {property}: {value}").into(), &e);
    }
}

pub fn set_background(id: &str, color: &str) {
    if let Some(element) = by_id::<HtmlElement>(id) {
        set_style(&element, "background-color", color);
    }
}

pub fn paint(element: &HtmlElement, paint: Paint) {
    set_style(element, "background-color", paint.background);
    set_style(element, "color", paint.foreground);
}

pub fn by_class(class: &str) -> Vec<HtmlElement> {
    let Ok(document) = document() else {
        return Vec::new();
    };
    let collection = document.get_elements_by_class_name(class);
    (0..collection.length())
        .filter_map(|index| collection.item(index))
        .filter_map(|element| element.dyn_into::<HtmlElement>().ok())
        .collect()
}

pub fn hide_class(class: &str) {
    for element in by_class(class) {
        set_style(&element, "visibility", "hidden");
    }
}

/// Replaces every option of `select`.
pub fn fill_select(select: &HtmlSelectElement, options: &[&str]) -> Result<(), JsValue> {
    select.set_length(0);
    for option in options {
        let element = HtmlOptionElement::new_with_text_and_value(option, option)?;
        select.add_with_html_option_element(&element)?;
    }
    Ok(())
}

fn local_storage() -> Option<Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub fn storage_get(key: &str) -> Option<String> {
    local_storage().and_then(|s| s.get_item(key).ok().flatten())
}

pub fn storage_set(key: &str, value: &str) {
    let Some(storage) = local_storage() else {
        web_sys::console::warn_1(&format!("no local storage, {key} not remembered").into());
        return;
    };
    if let Err(e) = storage.set_item(key, value) {
        web_sys::console::error_2(&format!("cannot remember {key}").into(), &e);
    }
}

pub fn query_param(name: &str) -> Option<String> {
    let search = window().ok()?.location().search().ok()?;
    UrlSearchParams::new_with_str(&search).ok()?.get(name)
}

/// Shows `message` in the snackbar for a few seconds.
pub fn toast(message: &str) -> Result<(), JsValue> {
    let Some(snackbar) = by_id::<Element>("snackbar") else {
        web_sys::console::warn_1(&message.into());
        return Ok(());
    };
    snackbar.set_text_content(Some(message));
    snackbar.set_class_name("show");

    let hide = Closure::once_into_js(move || snackbar.set_class_name(""));
    window()?
        .set_timeout_with_callback_and_timeout_and_arguments_0(hide.unchecked_ref(), SNACKBAR_MS)?;
    Ok(())
}

/// Fills the dismissible warning box, or empties it with `None`.
pub fn set_warning(text: Option<&str>) -> Result<(), JsValue> {
    let Some(warning_box) = by_id::<Element>(WARNING_BOX) else {
        return Ok(());
    };
    warning_box.set_inner_html("");
    let Some(text) = text else {
        return Ok(());
    };

    let document = document()?;
    let alert = document.create_element("div")?;
    alert.set_class_name("alert warning");

    let close = document.create_element("span")?;
    close.set_class_name("closebtn");
    close.set_text_content(Some("\u{d7}"));
    let target = warning_box.clone();
    let on_close = Closure::<dyn FnMut()>::new(move || target.set_inner_html(""));
    close.add_event_listener_with_callback("click", on_close.as_ref().unchecked_ref())?;
    on_close.forget();

    let strong = document.create_element("strong")?;
    strong.set_text_content(Some("Warning! "));

    alert.append_child(&close)?;
    alert.append_child(&strong)?;
    alert.append_child(&document.create_text_node(text))?;
    warning_box.append_child(&alert)?;
    Ok(())
}

pub fn navigate(url: &str) -> Result<(), JsValue> {
    window()?.location().set_href(url)
}

/// Saves `url` through a temporary anchor named after its last path segment.
pub fn download_file(url: &str) -> Result<(), JsValue> {
    let window = window()?;
    let agent = window.navigator().user_agent().unwrap_or_default();
    if agent.contains("iPhone") || agent.contains("iPad") {
        window.alert_with_message(
            "Your device does not support files downloading. Please try again in desktop browser.",
        )?;
        return Ok(());
    }

    let document = document()?;
    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(url);
    anchor.set_download(download_name(url));
    anchor.style().set_property("display", "none")?;

    document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .append_child(&anchor)?;
    anchor.click();
    anchor.remove();
    Ok(())
}
