use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dropdown::PseudoType;
use crate::elements;
use crate::error::DojoError;

/// Key reserved for per-element metadata inside the file table.
pub const META_KEY: &str = "meta";

/// Metric values for one element, as written by the site generator.
/// Values are JSON numbers or strings such as `"5.0"` and `"na"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementMeta(BTreeMap<String, Value>);

impl ElementMeta {
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    /// Numeric value of a metric, `None` for sentinels, absent and unparsable values.
    pub fn number(&self, key: &str) -> Option<f64> {
        let number = match self.raw(key)? {
            Value::Number(number) => number.as_f64()?,
            Value::String(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("na") || text.eq_ignore_ascii_case("nan") {
                    return None;
                }
                text.parse::<f64>().ok()?
            }
            _ => return None,
        };
        number.is_finite().then_some(number)
    }

    /// Text shown in a readout cell.
    pub fn display(&self, key: &str) -> String {
        match self.raw(key) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Number(number)) => number.to_string(),
            _ => "na".to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ElementMeta {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Files for one element: `format -> url` plus the reserved `meta` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementFiles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ElementMeta>,
    #[serde(flatten)]
    pub formats: BTreeMap<String, String>,
}

type ByElement = BTreeMap<String, ElementFiles>;
type ByAccuracy<T> = BTreeMap<String, T>;
type ByFunctional<T> = BTreeMap<String, ByAccuracy<T>>;

/// `type -> functional -> accuracy -> element -> format -> url`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileTable(BTreeMap<String, ByFunctional<ByElement>>);

/// `type -> functional -> accuracy -> format -> url`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveTable(BTreeMap<String, ByFunctional<BTreeMap<String, String>>>);

/// Element symbol to its metadata, for every recognized element.
pub type MetaByElement = BTreeMap<String, ElementMeta>;

/// The dropdown tuple that keys both tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Choice {
    pub typ: String,
    pub functional: String,
    pub accuracy: String,
    pub format: String,
}

impl Choice {
    pub fn new(
        typ: impl Into<String>,
        functional: impl Into<String>,
        accuracy: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            typ: typ.into(),
            functional: functional.into(),
            accuracy: accuracy.into(),
            format: format.into(),
        }
    }
}

impl FileTable {
    pub fn from_json(text: &str) -> Result<Self, DojoError> {
        serde_json::from_str(text).map_err(|source| DojoError::Parse {
            resource: "files.json",
            source,
        })
    }

    fn element(&self, choice: &Choice, element: &str) -> Option<&ElementFiles> {
        self.0
            .get(&choice.typ)?
            .get(&choice.functional)?
            .get(&choice.accuracy)?
            .get(element)
    }

    pub fn resolve_pseudo(&self, element: &str, choice: &Choice) -> Option<&str> {
        self.element(choice, element)?
            .formats
            .get(&choice.format)
            .map(String::as_str)
    }

    /// Metadata for every recognized element; missing entries map to empty metadata.
    pub fn metas_for(&self, choice: &Choice) -> MetaByElement {
        elements::ALL_ELEMENTS
            .iter()
            .map(|symbol| {
                let meta = self
                    .element(choice, symbol)
                    .and_then(|files| files.meta.clone())
                    .unwrap_or_default();
                ((*symbol).to_string(), meta)
            })
            .collect()
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Every link in the table, in key order.
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.0
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
            .flat_map(|files| files.formats.values())
            .map(String::as_str)
    }

    fn element_symbols(&self) -> impl Iterator<Item = &str> {
        self.0
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::keys)
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ArchiveTable {
    pub fn from_json(text: &str) -> Result<Self, DojoError> {
        serde_json::from_str(text).map_err(|source| DojoError::Parse {
            resource: "targz.json",
            source,
        })
    }

    pub fn resolve_archive(&self, choice: &Choice) -> Option<&str> {
        self.0
            .get(&choice.typ)?
            .get(&choice.functional)?
            .get(&choice.accuracy)?
            .get(&choice.format)
            .map(String::as_str)
    }

    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.0
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a hovered or clicked element cell points at.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub element: String,
    pub url: Option<String>,
    pub choice: Choice,
    pub color: &'static str,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    UnknownElement { typ: String, symbol: String },
    UnknownType(String),
}

impl std::fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownElement { typ, symbol } => {
                write!(f, "invalid element symbol `{symbol}` under {typ}")
            }
            Self::UnknownType(typ) => write!(f, "type {typ} has no dropdown configuration"),
        }
    }
}

/// Both lookup tables, loaded once and then shared read-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub files: FileTable,
    pub archives: ArchiveTable,
}

impl Catalog {
    pub const fn new(files: FileTable, archives: ArchiveTable) -> Self {
        Self { files, archives }
    }

    /// The "all unavailable" catalog used when loading fails.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(files: &str, archives: &str) -> Result<Self, DojoError> {
        Ok(Self::new(
            FileTable::from_json(files)?,
            ArchiveTable::from_json(archives)?,
        ))
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.archives.is_empty()
    }

    pub fn resolve_pseudo(&self, element: &str, choice: &Choice) -> Option<&str> {
        self.files.resolve_pseudo(element, choice)
    }

    pub fn resolve_archive(&self, choice: &Choice) -> Option<&str> {
        self.archives.resolve_archive(choice)
    }

    /// Builds the selection for a table cell under the current dropdown tuple.
    pub fn select_pseudo(&self, tag: &crate::cell::CellTag, choice: &Choice) -> Selection {
        let url = self.resolve_pseudo(&tag.element, choice);
        if url.is_none() {
            log::debug!("no {} file for {} under {choice:?}", choice.format, tag.element);
        }
        Selection {
            element: tag.element.clone(),
            url: url.map(str::to_string),
            choice: choice.clone(),
            color: tag.category.color(),
            index: tag.number,
        }
    }

    /// Counts elements with a file for the chosen tuple.
    pub fn available_count(&self, choice: &Choice) -> usize {
        elements::ALL_ELEMENTS
            .iter()
            .filter(|symbol| self.resolve_pseudo(symbol, choice).is_some())
            .count()
    }

    /// Problems a page built against this catalog would hit.
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        for typ in self.files.types() {
            if PseudoType::parse(typ).is_err() {
                issues.push(CatalogIssue::UnknownType(typ.to_string()));
            }
        }
        for (typ, by_functional) in &self.files.0 {
            let unknown = by_functional
                .values()
                .flat_map(BTreeMap::values)
                .flat_map(BTreeMap::keys)
                .filter(|symbol| !elements::is_known(symbol));
            for symbol in unknown {
                let issue = CatalogIssue::UnknownElement {
                    typ: typ.clone(),
                    symbol: symbol.clone(),
                };
                if !issues.contains(&issue) {
                    issues.push(issue);
                }
            }
        }
        issues
    }

    pub fn element_count(&self) -> usize {
        let mut symbols: Vec<&str> = self.files.element_symbols().collect();
        symbols.sort_unstable();
        symbols.dedup();
        symbols.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellTag;

    const SI_TABLE: &str = r#"{"nc-sr-v0.4":{"PBE":{"standard":{"Si":{"psp8":"https://x/Si.psp8","meta":{"hl":"5.0","hn":"8.0","hh":"12.0","nv":"4"}}}}}}"#;

    fn si_choice(format: &str) -> Choice {
        Choice::new("nc-sr-v0.4", "PBE", "standard", format)
    }

    #[test]
    fn resolves_existing_file() -> Result<(), DojoError> {
        let files = FileTable::from_json(SI_TABLE)?;
        assert_eq!(
            files.resolve_pseudo("Si", &si_choice("psp8")),
            Some("https://x/Si.psp8")
        );
        Ok(())
    }

    #[test]
    fn missing_format_is_unavailable() -> Result<(), DojoError> {
        let files = FileTable::from_json(SI_TABLE)?;
        assert_eq!(files.resolve_pseudo("Si", &si_choice("upf")), None);
        Ok(())
    }

    #[test]
    fn meta_key_is_not_a_format() -> Result<(), DojoError> {
        let files = FileTable::from_json(SI_TABLE)?;
        assert_eq!(files.resolve_pseudo("Si", &si_choice("meta")), None);
        Ok(())
    }

    #[test]
    fn every_missing_level_is_unavailable() -> Result<(), DojoError> {
        let files = FileTable::from_json(SI_TABLE)?;
        let misses = [
            ("Si", Choice::new("nc-fr-v0.4", "PBE", "standard", "psp8")),
            ("Si", Choice::new("nc-sr-v0.4", "LDA", "standard", "psp8")),
            ("Si", Choice::new("nc-sr-v0.4", "PBE", "stringent", "psp8")),
            ("Ge", si_choice("psp8")),
            ("", Choice::default()),
            ("Si", Choice::new("", "", "", "")),
            ("Xx", Choice::new("?", "?", "?", "?")),
        ];
        for (element, choice) in &misses {
            assert_eq!(files.resolve_pseudo(element, choice), None, "{element} {choice:?}");
        }
        Ok(())
    }

    #[test]
    fn empty_catalog_resolves_nothing() {
        let catalog = Catalog::empty();
        assert!(catalog.is_empty());
        assert_eq!(catalog.resolve_pseudo("Si", &si_choice("psp8")), None);
        assert_eq!(catalog.resolve_archive(&si_choice("psp8")), None);
        assert_eq!(catalog.available_count(&si_choice("psp8")), 0);
    }

    #[test]
    fn resolves_archive_by_tuple() -> Result<(), DojoError> {
        let archives = ArchiveTable::from_json(
            r#"{"nc-sr-v0.4":{"PBE":{"standard":{"psp8":"ONCVPSP-PBE-SR-PDv0.4/nc-sr-v0.4_PBE_standard_psp8.tgz"}}}}"#,
        )?;
        assert_eq!(
            archives.resolve_archive(&si_choice("psp8")),
            Some("ONCVPSP-PBE-SR-PDv0.4/nc-sr-v0.4_PBE_standard_psp8.tgz")
        );
        assert_eq!(archives.resolve_archive(&si_choice("upf")), None);
        assert_eq!(archives.links().count(), 1);
        Ok(())
    }

    #[test]
    fn metas_cover_all_elements() -> Result<(), DojoError> {
        let files = FileTable::from_json(SI_TABLE)?;
        let metas = files.metas_for(&si_choice("psp8"));
        assert_eq!(metas.len(), 118);
        assert_eq!(metas["Si"].number("hl"), Some(5.0));
        assert!(metas["Ge"].is_empty());
        Ok(())
    }

    #[test]
    fn metric_values_accept_numbers_and_strings() -> Result<(), serde_json::Error> {
        let meta: ElementMeta =
            serde_json::from_str(r#"{"hl": 4, "hn": "8.5", "hh": "na", "nv": "NaN", "d": null}"#)?;
        assert_eq!(meta.number("hl"), Some(4.0));
        assert_eq!(meta.number("hn"), Some(8.5));
        assert_eq!(meta.number("hh"), None);
        assert_eq!(meta.number("nv"), None);
        assert_eq!(meta.number("d"), None);
        assert_eq!(meta.display("hl"), "4");
        assert_eq!(meta.display("hh"), "na");
        assert_eq!(meta.display("gb"), "na");
        Ok(())
    }

    #[test]
    fn rejects_malformed_json() {
        let error = FileTable::from_json("{not json").err();
        assert!(matches!(
            error,
            Some(DojoError::Parse {
                resource: "files.json",
                ..
            })
        ));
    }

    #[test]
    fn validation_reports_unknown_symbols_and_types() -> Result<(), DojoError> {
        let catalog = Catalog::from_json(
            r#"{"nc-sr-v0.4":{"PBE":{"standard":{"Si":{"psp8":"a"},"Uue":{"psp8":"b"}}}},
                "paw-v9":{"PBE":{"standard":{"Si":{"xml":"c"}}}}}"#,
            "{}",
        )?;
        let issues = catalog.validate();
        assert_eq!(
            issues,
            vec![
                CatalogIssue::UnknownType("paw-v9".to_string()),
                CatalogIssue::UnknownElement {
                    typ: "nc-sr-v0.4".to_string(),
                    symbol: "Uue".to_string(),
                },
            ]
        );
        assert_eq!(catalog.element_count(), 2);
        assert_eq!(catalog.files.links().count(), 3);
        Ok(())
    }

    #[test]
    fn selection_describes_the_hovered_cell() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = Catalog::from_json(SI_TABLE, "{}")?;
        let tag = CellTag::parse("plugin bg_metalloid 14_Si").ok_or("unparsed cell class")?;

        let selection = catalog.select_pseudo(&tag, &si_choice("psp8"));
        assert_eq!(selection.element, "Si");
        assert_eq!(selection.url.as_deref(), Some("https://x/Si.psp8"));
        assert_eq!(selection.color, "#bdd6a3");
        assert_eq!(selection.index, 14);
        assert_eq!(selection.choice, si_choice("psp8"));

        let missing = catalog.select_pseudo(&tag, &si_choice("upf"));
        assert_eq!(missing.url, None);
        assert_eq!(missing.index, 14);
        Ok(())
    }
}
