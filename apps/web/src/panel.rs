use pseudodojo_core::{detail_panel, MetaByElement, MetricKey, Selection, TableSummary};
use web_sys::Element;

use crate::dom;

const NV_PREFIX: &str = "<small>n<sub>v</sub></small>";
const MEAN_PREFIX: &str = "av";
const DETAIL_PREFIX: &str = "X";
const DETAIL_NUMBER: &str = "N";
const BLANK: &str = "#ffffff";

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Writes one metric value; valence counts carry their label markup.
fn write_metric(id: &str, key: MetricKey, value: &str) -> bool {
    if key != MetricKey::Nv {
        return dom::set_text(id, value);
    }
    match dom::by_id::<Element>(id) {
        Some(element) => {
            element.set_inner_html(&format!("{NV_PREFIX}{}", escape(value)));
            true
        }
        None => false,
    }
}

/// Fills the per-element readouts and the table means for the current tuple.
pub fn write_table_info(metas: &MetaByElement, summary: &TableSummary) {
    let mut missing = 0_usize;
    for (element, meta) in metas {
        for key in MetricKey::DISPLAYED {
            let id = format!("{element}_{}", key.as_str());
            if !write_metric(&id, key, &meta.display(key.as_str())) {
                missing += 1;
            }
        }
    }
    if missing > 0 {
        web_sys::console::debug_1(&format!("{missing} readout nodes missing from the page").into());
    }

    write_panel(MEAN_PREFIX, summary);
    reset_detail(summary);
}

/// Shows the hovered element in the detail box.
pub fn show_detail(selection: &Selection, metas: &MetaByElement, summary: &TableSummary) {
    let panel = detail_panel(Some(selection), metas, summary);
    dom::set_text(
        DETAIL_NUMBER,
        &panel.number.map(|n| n.to_string()).unwrap_or_default(),
    );
    dom::set_background(&format!("{DETAIL_PREFIX}_n"), panel.color.unwrap_or(BLANK));
    dom::set_text(&format!("{DETAIL_PREFIX}_el"), &panel.title);
    for (key, value) in &panel.values {
        write_metric(&format!("{DETAIL_PREFIX}_{}", key.as_str()), *key, value);
    }
}

/// Puts the table means back into the detail box.
pub fn reset_detail(summary: &TableSummary) {
    dom::set_text(DETAIL_NUMBER, "");
    dom::set_background(&format!("{DETAIL_PREFIX}_n"), BLANK);
    write_panel(DETAIL_PREFIX, summary);
}

fn write_panel(prefix: &str, summary: &TableSummary) {
    let panel = detail_panel(None, &MetaByElement::new(), summary);
    dom::set_text(&format!("{prefix}_el"), &panel.title);
    for (key, value) in &panel.values {
        write_metric(&format!("{prefix}_{}", key.as_str()), *key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_in_values() {
        assert_eq!(escape("<b>4</b> & 5"), "&lt;b&gt;4&lt;/b&gt; &amp; 5");
        assert_eq!(escape("3.2"), "3.2");
    }
}
