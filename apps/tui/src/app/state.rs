use pseudodojo_core::elements::{self, ALL_ELEMENTS};
use pseudodojo_core::{
    banner_text, compute_table_summary, detail_panel, Catalog, CellEffect, CellEvent, CellMachine,
    CellTag, Choice, Delivery, DetailPanel, DojoError, DropdownOptions, Layout, MetaByElement,
    Paint, PreferenceKey, PseudoType, Remembered, Selection, TableSummary,
};
use sqlx::SqlitePool;

use crate::db;

/// What the cursor currently rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Element(u32),
    Archive,
}

/// A confirmed click waiting for its existence probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingProbe {
    pub link: String,
    pub delivery: Delivery,
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub catalog: Catalog,
    pub options: DropdownOptions,
    pub choice: Choice,
    pub remembered: Remembered,
    pub layout: Layout,
    pub metas: MetaByElement,
    pub summary: TableSummary,
    pub detail: DetailPanel,
    /// One machine per element, indexed by atomic number minus one.
    pub cells: Vec<CellMachine>,
    pub archive: CellMachine,
    pub cursor: u32,
    pub focus: Option<Focus>,
    pub status_message: String,
    /// Text of the warning box: the load failure, if any, then the type advisory.
    pub banner: Option<String>,
    pub load_warning: Option<String>,
    pub show_help: bool,
    pub pending: Option<PendingProbe>,
    pub db_pool: Option<SqlitePool>,
}

impl App {
    pub fn new(catalog: Catalog, typ: PseudoType, remembered: Remembered, layout: Layout) -> Self {
        let options = typ.options();
        let choice = options.choose(&remembered, layout);
        let cells = ALL_ELEMENTS
            .iter()
            .map(|symbol| {
                let baseline = CellTag::for_element(symbol)
                    .map_or(pseudodojo_core::cell::ARCHIVE_IDLE, |tag| tag.baseline());
                CellMachine::element(baseline)
            })
            .collect();

        let mut app = Self {
            running: true,
            catalog,
            options,
            choice,
            remembered,
            layout,
            metas: MetaByElement::new(),
            summary: compute_table_summary(&MetaByElement::new()),
            detail: DetailPanel {
                title: String::new(),
                number: None,
                color: None,
                values: Vec::new(),
            },
            cells,
            archive: CellMachine::archive(),
            cursor: 1,
            focus: None,
            status_message: String::new(),
            banner: banner_text(None, options.advisory),
            load_warning: None,
            show_help: false,
            pending: None,
            db_pool: None,
        };
        app.refresh_info();
        app
    }

    pub fn attach_db(&mut self, pool: SqlitePool) {
        self.db_pool = Some(pool);
    }

    /// Keeps `warning` in the banner for the rest of the session.
    pub fn set_load_warning(&mut self, warning: String) {
        self.load_warning = Some(warning);
        self.banner = banner_text(self.load_warning.as_deref(), self.options.advisory);
    }

    /// Hides the type advisory; a load failure stays visible.
    pub fn dismiss_banner(&mut self) {
        self.banner.clone_from(&self.load_warning);
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// What the element cell `z` points at under the current dropdown tuple.
    pub fn selection_for(&self, z: u32) -> Option<Selection> {
        let tag = elements::symbol(z).and_then(CellTag::for_element)?;
        Some(self.catalog.select_pseudo(&tag, &self.choice))
    }

    pub fn focused_selection(&self) -> Option<Selection> {
        match self.focus {
            Some(Focus::Element(z)) => self.selection_for(z),
            _ => None,
        }
    }

    pub fn archive_link(&self) -> Option<&str> {
        self.catalog.resolve_archive(&self.choice)
    }

    pub fn cell_paint(&self, z: u32) -> Option<Paint> {
        let index = usize::try_from(z.checked_sub(1)?).ok()?;
        self.cells.get(index).map(CellMachine::paint)
    }

    fn cell_mut(&mut self, z: u32) -> Option<&mut CellMachine> {
        let index = usize::try_from(z.checked_sub(1)?).ok()?;
        self.cells.get_mut(index)
    }

    /// Recomputes metadata and means for the current tuple and repaints
    /// whatever is focused.
    pub fn refresh_info(&mut self) {
        self.metas = self.catalog.files.metas_for(&self.choice);
        self.summary = compute_table_summary(&self.metas);
        self.detail = detail_panel(self.focused_selection().as_ref(), &self.metas, &self.summary);

        let refresh = |available| CellEvent::Refresh { available };
        match self.focus {
            Some(Focus::Element(z)) => self.send_to_cell(z, refresh),
            Some(Focus::Archive) => self.send_to_archive(refresh),
            None => {}
        }
    }

    pub fn set_type(&mut self, typ: PseudoType) {
        self.options = typ.options();
        self.choice = self.options.choose(&self.remembered, self.layout);
        self.banner = banner_text(self.load_warning.as_deref(), self.options.advisory);
        self.status_message = format!("Type: {}", typ.label());
        self.refresh_info();
    }

    /// Moves one dependent dropdown by `step`, remembering the new value.
    /// Values pinned by the layout do not move.
    pub async fn cycle_value(&mut self, key: PreferenceKey, step: isize) {
        if self.layout.locks(key) {
            self.status_message = format!(
                "The light layout keeps the format at {}",
                key.value(&self.choice)
            );
            return;
        }
        let options = match key {
            PreferenceKey::Functional => self.options.functionals,
            PreferenceKey::Accuracy => self.options.accuracies,
            PreferenceKey::Format => self.options.formats,
        };
        let Some(value) = pseudodojo_core::dropdown::cycle(options, key.value(&self.choice), step)
        else {
            return;
        };

        match key {
            PreferenceKey::Functional => self.choice.functional = value.to_string(),
            PreferenceKey::Accuracy => self.choice.accuracy = value.to_string(),
            PreferenceKey::Format => self.choice.format = value.to_string(),
        }
        self.remembered.set(key, value);

        if let Some(pool) = &self.db_pool {
            if let Err(e) = db::set_preference(pool, key.storage_key(), value).await {
                log::warn!("failed to remember {}: {e}", key.storage_key());
            }
        }
        self.refresh_info();
    }

    /// Moves the cursor over the table, leaving the old cell and entering the new one.
    pub fn move_cursor(&mut self, d_row: i16, d_col: i16) {
        let target = match self.focus {
            Some(Focus::Element(z)) => step(z, d_row, d_col),
            _ => self.cursor,
        };
        self.enter(Focus::Element(target));
    }

    pub fn toggle_archive(&mut self) {
        let target = match self.focus {
            Some(Focus::Archive) => Focus::Element(self.cursor),
            _ => Focus::Archive,
        };
        self.enter(target);
    }

    fn enter(&mut self, target: Focus) {
        if self.focus == Some(target) {
            return;
        }
        self.leave();
        match target {
            Focus::Element(z) => {
                self.cursor = z;
                self.focus = Some(target);
                self.send_to_cell(z, |available| CellEvent::PointerEnter { available });
            }
            Focus::Archive => {
                self.focus = Some(target);
                self.send_to_archive(|available| CellEvent::PointerEnter { available });
            }
        }
    }

    /// Drops the focus; the detail panel falls back to the table means.
    pub fn leave(&mut self) {
        match self.focus.take() {
            Some(Focus::Element(z)) => self.send_to_cell(z, |_| CellEvent::PointerLeave),
            Some(Focus::Archive) => self.send_to_archive(|_| CellEvent::PointerLeave),
            None => {}
        }
    }

    pub fn click(&mut self) {
        let click = |available| CellEvent::Click { available };
        match self.focus {
            Some(Focus::Element(z)) => self.send_to_cell(z, click),
            Some(Focus::Archive) => self.send_to_archive(click),
            None => self.status_message = "Move onto an element first".to_string(),
        }
    }

    /// Feeds the cell `z` an event built from its freshly resolved selection.
    fn send_to_cell(&mut self, z: u32, event: impl FnOnce(bool) -> CellEvent) {
        let Some(selection) = self.selection_for(z) else {
            return;
        };
        let event = event(selection.url.is_some());
        let result = match self.cell_mut(z) {
            Some(machine) => machine.process(event),
            None => return,
        };
        let delivery = Delivery::for_format(&selection.choice.format);
        let link = selection.url.clone();
        self.apply(result, Some(&selection), link, delivery);
    }

    fn send_to_archive(&mut self, event: impl FnOnce(bool) -> CellEvent) {
        let link = self.archive_link().map(str::to_string);
        let result = self.archive.process(event(link.is_some()));
        // A tarball opened in a browser downloads; here it is saved directly.
        self.apply(result, None, link, Delivery::Download);
    }

    fn apply(
        &mut self,
        result: Result<Vec<CellEffect>, DojoError>,
        selection: Option<&Selection>,
        link: Option<String>,
        delivery: Delivery,
    ) {
        let effects = match result {
            Ok(effects) => effects,
            Err(e) => {
                log::debug!("ignored: {e}");
                return;
            }
        };

        for effect in effects {
            match effect {
                // Cells are drawn from their machine's current paint.
                CellEffect::Paint(_) => {}
                CellEffect::ShowDetail => {
                    self.detail = detail_panel(selection, &self.metas, &self.summary);
                }
                CellEffect::ResetDetail => {
                    self.detail = detail_panel(None, &self.metas, &self.summary);
                }
                CellEffect::Notify(notice) => self.status_message = notice.message().to_string(),
                CellEffect::Probe => {
                    if let Some(link) = link.clone() {
                        self.pending = Some(PendingProbe { link, delivery });
                    }
                }
            }
        }
    }
}

/// Next element from `z` in a grid direction. Vertical moves land on the
/// nearest column of the next non-empty row.
fn step(z: u32, d_row: i16, d_col: i16) -> u32 {
    let Some((row, column)) = elements::table_position(z) else {
        return z;
    };
    if d_row == 0 && d_col == 0 {
        return z;
    }
    let at = |row: i16, column: i16| -> Option<u32> {
        let row = u16::try_from(row).ok()?;
        let column = u16::try_from(column).ok()?;
        elements::at_position(row, column).and_then(elements::atomic_number)
    };
    let (Ok(mut row), Ok(mut column)) = (i16::try_from(row), i16::try_from(column)) else {
        return z;
    };

    if d_row == 0 {
        while (0..18).contains(&(column + d_col)) {
            column += d_col;
            if let Some(found) = at(row, column) {
                return found;
            }
        }
        return z;
    }

    while (0..9).contains(&(row + d_row)) {
        row += d_row;
        let nearest = (0..18_i16)
            .filter_map(|candidate| at(row, candidate).map(|found| (candidate, found)))
            .min_by_key(|(candidate, _)| (candidate - column).abs());
        if let Some((_, found)) = nearest {
            return found;
        }
    }
    z
}
