mod dom;
mod fetch;
mod page;
mod panel;

use pseudodojo_core::{Catalog, Layout, Notice, ProbeFailurePolicy};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::console;

use crate::page::Page;

/// `?probe=silent` keeps failed existence checks quiet.
fn probe_policy(param: Option<&str>) -> ProbeFailurePolicy {
    param
        .and_then(ProbeFailurePolicy::parse)
        .unwrap_or_default()
}

async fn start() -> Result<(), JsValue> {
    let (catalog, banner) = match fetch::load_catalog().await {
        Ok(catalog) => (catalog, None),
        Err(e) => {
            console::error_1(&e.into());
            (Catalog::empty(), Some(Notice::LoadFailed.message()))
        }
    };

    let layout = Layout::from_param(dom::query_param("layout").as_deref());
    let policy = probe_policy(dom::query_param("probe").as_deref());
    Page::new(catalog, layout, policy, banner).build()
}

fn main() {
    spawn_local(async {
        if let Err(e) = start().await {
            console::error_1(&e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_policy_defaults_to_notify() {
        assert_eq!(probe_policy(None), ProbeFailurePolicy::Notify);
        assert_eq!(probe_policy(Some("bogus")), ProbeFailurePolicy::Notify);
        assert_eq!(probe_policy(Some("Silent")), ProbeFailurePolicy::Silent);
    }
}
