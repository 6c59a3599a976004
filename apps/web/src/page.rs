use std::cell::RefCell;
use std::rc::Rc;

use pseudodojo_core::preferences::LIGHT_HIDDEN_CLASSES;
use pseudodojo_core::{
    banner_text, complete_probe, compute_table_summary, configure, Catalog, CellEffect, CellEvent,
    CellMachine, CellTag, Choice, Completion, Delivery, Layout, MetaByElement, PreferenceKey,
    ProbeFailurePolicy, Remembered, Selection, TableSummary,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{console, HtmlElement, HtmlSelectElement};

use crate::{dom, fetch, panel};

const TYP_SELECT: &str = "TYP";
const CELL_CLASS: &str = "plugin";
const ARCHIVE_CLASS: &str = "download_button";
/// Right-hand row numbers, kept in the markup but never shown.
const ALWAYS_HIDDEN: [&str; 2] = ["r_top", "r_follow"];

#[derive(Debug, Clone, Copy)]
enum Pointer {
    Enter,
    Leave,
    Click,
    Refresh,
}

/// A page node driven by its own state machine. `tag` is `None` for the archive button.
struct BoundCell {
    element: HtmlElement,
    tag: Option<CellTag>,
    machine: RefCell<CellMachine>,
}

struct TableInfo {
    metas: MetaByElement,
    summary: TableSummary,
}

/// Everything the page handlers share once the tables are loaded.
pub struct Page {
    catalog: Catalog,
    layout: Layout,
    policy: ProbeFailurePolicy,
    /// Set when the tables failed to load; outlives every type change.
    load_warning: Option<&'static str>,
    info: RefCell<TableInfo>,
    cells: RefCell<Vec<Rc<BoundCell>>>,
}

fn select_value(id: &str) -> String {
    dom::by_id::<HtmlSelectElement>(id)
        .map(|select| select.value())
        .unwrap_or_default()
}

fn report(result: Result<(), JsValue>) {
    if let Err(e) = result {
        console::error_1(&e);
    }
}

impl Page {
    pub fn new(
        catalog: Catalog,
        layout: Layout,
        policy: ProbeFailurePolicy,
        load_warning: Option<&'static str>,
    ) -> Rc<Self> {
        let metas = MetaByElement::new();
        let summary = compute_table_summary(&metas);
        Rc::new(Self {
            catalog,
            layout,
            policy,
            load_warning,
            info: RefCell::new(TableInfo { metas, summary }),
            cells: RefCell::new(Vec::new()),
        })
    }

    /// Wires the dropdowns, cells and archive button, then paints the initial readouts.
    pub fn build(self: &Rc<Self>) -> Result<(), JsValue> {
        if let Some(means) = dom::by_id::<HtmlElement>("av") {
            means.style().set_property("visibility", "hidden")?;
        }
        for class in ALWAYS_HIDDEN {
            dom::hide_class(class);
        }
        if self.layout == Layout::Light {
            for class in LIGHT_HIDDEN_CLASSES {
                dom::hide_class(class);
            }
        }

        let typ = dom::query_param("typ").unwrap_or_else(|| select_value(TYP_SELECT));
        if let Some(select) = dom::by_id::<HtmlSelectElement>(TYP_SELECT) {
            select.set_value(&typ);
        }
        if let Err(e) = self.configure_dropdowns(&typ) {
            console::error_1(&e);
            report(dom::set_warning(self.load_warning));
        }

        for element in dom::by_class(CELL_CLASS) {
            let Some(tag) = CellTag::parse(&element.class_name()) else {
                console::warn_1(&format!("unrecognised cell `{}`", element.class_name()).into());
                continue;
            };
            let machine = CellMachine::element(tag.baseline());
            self.bind(BoundCell {
                element,
                tag: Some(tag),
                machine: RefCell::new(machine),
            })?;
        }
        for element in dom::by_class(ARCHIVE_CLASS) {
            self.bind(BoundCell {
                element,
                tag: None,
                machine: RefCell::new(CellMachine::archive()),
            })?;
        }

        self.bind_selects()?;
        self.refresh();
        Ok(())
    }

    /// The tuple currently shown by the four selects.
    fn current_choice() -> Choice {
        let [functional, accuracy, format] =
            PreferenceKey::ALL.map(|key| select_value(key.select_id()));
        Choice::new(select_value(TYP_SELECT), functional, accuracy, format)
    }

    /// Refills the three dependent dropdowns for `typ` and restores remembered values.
    /// An unknown type leaves the page untouched.
    fn configure_dropdowns(&self, typ: &str) -> Result<(), JsValue> {
        let options = configure(typ).map_err(|e| JsValue::from_str(&e.to_string()))?;

        let lists = [options.functionals, options.accuracies, options.formats];
        for (key, list) in PreferenceKey::ALL.into_iter().zip(lists) {
            if let Some(select) = dom::by_id::<HtmlSelectElement>(key.select_id()) {
                dom::fill_select(&select, list)?;
            }
        }
        dom::set_warning(banner_text(self.load_warning, options.advisory).as_deref())?;

        let remembered = Remembered::load(dom::storage_get);
        let choice = options.choose(&remembered, self.layout);
        for key in PreferenceKey::ALL {
            if let Some(select) = dom::by_id::<HtmlSelectElement>(key.select_id()) {
                select.set_value(key.value(&choice));
                select.set_disabled(self.layout.locks(key));
            }
        }
        Ok(())
    }

    /// Recomputes the readouts for the current tuple and repaints focused cells.
    fn refresh(&self) {
        let choice = Self::current_choice();
        let metas = self.catalog.files.metas_for(&choice);
        let summary = compute_table_summary(&metas);
        panel::write_table_info(&metas, &summary);
        *self.info.borrow_mut() = TableInfo { metas, summary };

        let cells = self.cells.borrow().clone();
        for cell in &cells {
            self.dispatch(cell, Pointer::Refresh);
        }
    }

    fn bind(self: &Rc<Self>, cell: BoundCell) -> Result<(), JsValue> {
        let cell = Rc::new(cell);
        let listeners = [
            ("mouseenter", Pointer::Enter),
            ("mouseleave", Pointer::Leave),
            ("click", Pointer::Click),
        ];
        for (name, pointer) in listeners {
            let page = Rc::clone(self);
            let target = Rc::clone(&cell);
            let handler =
                Closure::<dyn FnMut()>::new(move || page.dispatch(&target, pointer));
            cell.element
                .add_event_listener_with_callback(name, handler.as_ref().unchecked_ref())?;
            handler.forget();
        }
        self.cells.borrow_mut().push(cell);
        Ok(())
    }

    fn bind_selects(self: &Rc<Self>) -> Result<(), JsValue> {
        if let Some(select) = dom::by_id::<HtmlSelectElement>(TYP_SELECT) {
            let page = Rc::clone(self);
            let handler = Closure::<dyn FnMut()>::new(move || {
                report(page.configure_dropdowns(&select_value(TYP_SELECT)));
                page.refresh();
            });
            select.add_event_listener_with_callback("change", handler.as_ref().unchecked_ref())?;
            handler.forget();
        }

        for key in PreferenceKey::ALL {
            let Some(select) = dom::by_id::<HtmlSelectElement>(key.select_id()) else {
                continue;
            };
            let page = Rc::clone(self);
            let handler = Closure::<dyn FnMut()>::new(move || {
                if !page.layout.locks(key) {
                    dom::storage_set(key.storage_key(), &select_value(key.select_id()));
                }
                page.refresh();
            });
            select.add_event_listener_with_callback("change", handler.as_ref().unchecked_ref())?;
            handler.forget();
        }
        Ok(())
    }

    fn dispatch(&self, cell: &BoundCell, pointer: Pointer) {
        let choice = Self::current_choice();
        let selection = cell
            .tag
            .as_ref()
            .map(|tag| self.catalog.select_pseudo(tag, &choice));
        let link = match &selection {
            Some(selection) => selection.url.clone(),
            None => self.catalog.resolve_archive(&choice).map(str::to_string),
        };
        let available = link.is_some();
        let event = match pointer {
            Pointer::Enter => CellEvent::PointerEnter { available },
            Pointer::Leave => CellEvent::PointerLeave,
            Pointer::Click => CellEvent::Click { available },
            Pointer::Refresh => CellEvent::Refresh { available },
        };

        let result = cell.machine.borrow_mut().process(event);
        let effects = match result {
            Ok(effects) => effects,
            Err(e) => {
                console::debug_1(&e.to_string().into());
                return;
            }
        };
        for effect in effects {
            self.apply(cell, effect, selection.as_ref(), link.as_deref());
        }
    }

    fn apply(
        &self,
        cell: &BoundCell,
        effect: CellEffect,
        selection: Option<&Selection>,
        link: Option<&str>,
    ) {
        match effect {
            CellEffect::Paint(paint) => dom::paint(&cell.element, paint),
            CellEffect::ShowDetail => {
                if let Some(selection) = selection {
                    let info = self.info.borrow();
                    panel::show_detail(selection, &info.metas, &info.summary);
                }
            }
            CellEffect::ResetDetail => panel::reset_detail(&self.info.borrow().summary),
            CellEffect::Notify(notice) => report(dom::toast(notice.message())),
            CellEffect::Probe => {
                let Some(link) = link.map(str::to_string) else {
                    return;
                };
                let delivery = selection.map_or(Delivery::Navigate, |selection| {
                    Delivery::for_format(&selection.choice.format)
                });
                let policy = self.policy;
                spawn_local(async move {
                    let exists = fetch::probe(&link).await;
                    report(match complete_probe(exists, delivery, policy) {
                        Completion::Navigate => dom::navigate(&link),
                        Completion::Download => dom::download_file(&link),
                        Completion::Notify(notice) => dom::toast(notice.message()),
                        Completion::Nothing => Ok(()),
                    });
                });
            }
        }
    }
}
