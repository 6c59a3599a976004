use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::tables::{MetaByElement, Selection};

/// Metrics stored under each element's `meta` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKey {
    Hh,
    Hl,
    Hn,
    Nv,
    #[serde(rename = "d")]
    Delta,
    #[serde(rename = "dp")]
    DeltaPrime,
    #[serde(rename = "gb")]
    Gbrv,
}

impl MetricKey {
    pub const ALL: [Self; 7] = [
        Self::Hh,
        Self::Hl,
        Self::Hn,
        Self::Nv,
        Self::Delta,
        Self::DeltaPrime,
        Self::Gbrv,
    ];

    /// Metrics shown in the readout cells.
    pub const DISPLAYED: [Self; 4] = [Self::Hh, Self::Hl, Self::Hn, Self::Nv];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hh => "hh",
            Self::Hl => "hl",
            Self::Hn => "hn",
            Self::Nv => "nv",
            Self::Delta => "d",
            Self::DeltaPrime => "dp",
            Self::Gbrv => "gb",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Hh => "high hint (Ha)",
            Self::Hl => "low hint (Ha)",
            Self::Hn => "normal hint (Ha)",
            Self::Nv => "valence electrons",
            Self::Delta => "delta (meV)",
            Self::DeltaPrime => "delta'",
            Self::Gbrv => "GBRV (%)",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table-wide mean of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricMean {
    Value(f64),
    NoData,
}

impl MetricMean {
    pub fn display(self) -> String {
        match self {
            Self::Value(value) => format!("{value:.1}"),
            Self::NoData => "na".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TableSummary(BTreeMap<MetricKey, MetricMean>);

impl TableSummary {
    pub fn mean(&self, key: MetricKey) -> MetricMean {
        self.0.get(&key).copied().unwrap_or(MetricMean::NoData)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, MetricMean)> + '_ {
        self.0.iter().map(|(key, mean)| (*key, *mean))
    }
}

/// Averages every metric over the elements that carry a numeric value for it.
pub fn compute_table_summary(meta_by_element: &MetaByElement) -> TableSummary {
    let means = MetricKey::ALL
        .into_iter()
        .map(|key| {
            let (sum, count) = meta_by_element
                .values()
                .filter_map(|meta| meta.number(key.as_str()))
                .fold((0.0_f64, 0_u32), |(sum, count), value| (sum + value, count + 1));
            let mean = if count == 0 {
                MetricMean::NoData
            } else {
                MetricMean::Value(sum / f64::from(count))
            };
            (key, mean)
        })
        .collect();
    TableSummary(means)
}

/// Display values of one element's metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementReadout {
    pub element: String,
    pub values: Vec<(MetricKey, String)>,
}

impl ElementReadout {
    pub fn value(&self, key: MetricKey) -> Option<&str> {
        self.values
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, value)| value.as_str())
    }
}

pub fn select_element(meta_by_element: &MetaByElement, element: &str) -> ElementReadout {
    let meta = meta_by_element.get(element);
    let values = MetricKey::ALL
        .into_iter()
        .map(|key| {
            let value = meta.map_or_else(|| "na".to_string(), |meta| meta.display(key.as_str()));
            (key, value)
        })
        .collect();
    ElementReadout {
        element: element.to_string(),
        values,
    }
}

/// Contents of the focused-detail box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailPanel {
    pub title: String,
    pub number: Option<u32>,
    pub color: Option<&'static str>,
    pub values: Vec<(MetricKey, String)>,
}

pub const MEAN_TITLE: &str = "Mean";

/// The focused selection's readout, or the table-wide means when nothing is focused.
pub fn detail_panel(
    focus: Option<&Selection>,
    meta_by_element: &MetaByElement,
    summary: &TableSummary,
) -> DetailPanel {
    match focus {
        Some(selection) => DetailPanel {
            title: selection.element.clone(),
            number: Some(selection.index),
            color: Some(selection.color),
            values: select_element(meta_by_element, &selection.element).values,
        },
        None => DetailPanel {
            title: MEAN_TITLE.to_string(),
            number: None,
            color: None,
            values: summary
                .iter()
                .map(|(key, mean)| (key, mean.display()))
                .collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellTag;
    use crate::tables::{Catalog, Choice, ElementMeta};

    fn metas(entries: &[(&str, &[(&str, &str)])]) -> MetaByElement {
        entries
            .iter()
            .map(|(element, values)| {
                let meta: ElementMeta = values.iter().map(|(k, v)| (*k, *v)).collect();
                ((*element).to_string(), meta)
            })
            .collect()
    }

    #[test]
    fn mean_counts_only_numeric_entries() {
        let metas = metas(&[
            ("Si", &[("hl", "4.0")]),
            ("Ge", &[("hl", "6.0")]),
            ("Sn", &[("hl", "na")]),
        ]);
        let summary = compute_table_summary(&metas);
        assert_eq!(summary.mean(MetricKey::Hl), MetricMean::Value(5.0));
        assert_eq!(summary.mean(MetricKey::Hl).display(), "5.0");
    }

    #[test]
    fn all_sentinels_give_no_data() {
        let metas = metas(&[
            ("Si", &[("hl", "na"), ("hn", "nan"), ("hh", "na"), ("nv", "na")]),
            ("Ge", &[("hl", "na"), ("hn", "na"), ("hh", "NaN"), ("nv", "na")]),
            ("Sn", &[]),
        ]);
        let summary = compute_table_summary(&metas);
        for key in MetricKey::ALL {
            assert_eq!(summary.mean(key), MetricMean::NoData, "{key}");
        }
        assert_eq!(MetricMean::NoData.display(), "na");
    }

    #[test]
    fn empty_metadata_gives_no_data() {
        let summary = compute_table_summary(&MetaByElement::new());
        assert_eq!(summary.mean(MetricKey::Nv), MetricMean::NoData);
    }

    #[test]
    fn means_are_shown_with_one_decimal() {
        let metas = metas(&[
            ("Si", &[("nv", "4")]),
            ("Ge", &[("nv", "14")]),
            ("Sn", &[("nv", "14")]),
        ]);
        let summary = compute_table_summary(&metas);
        assert_eq!(summary.mean(MetricKey::Nv).display(), "10.7");
    }

    #[test]
    fn selected_element_copies_raw_values() {
        let metas = metas(&[("Si", &[("hl", "5.0"), ("nv", "4")])]);
        let readout = select_element(&metas, "Si");
        assert_eq!(readout.value(MetricKey::Hl), Some("5.0"));
        assert_eq!(readout.value(MetricKey::Nv), Some("4"));
        assert_eq!(readout.value(MetricKey::Hh), Some("na"));

        let missing = select_element(&metas, "Og");
        assert!(missing.values.iter().all(|(_, value)| value == "na"));
    }

    #[test]
    fn detail_panel_falls_back_to_means() -> Result<(), Box<dyn std::error::Error>> {
        let metas = metas(&[("Si", &[("hl", "5.0")]), ("C", &[("hl", "7.0")])]);
        let summary = compute_table_summary(&metas);

        let idle = detail_panel(None, &metas, &summary);
        assert_eq!(idle.title, MEAN_TITLE);
        assert_eq!(idle.number, None);
        assert!(idle.values.contains(&(MetricKey::Hl, "6.0".to_string())));

        let tag = CellTag::for_element("Si").ok_or("unknown symbol")?;
        let selection = Catalog::empty().select_pseudo(&tag, &Choice::default());
        let focused = detail_panel(Some(&selection), &metas, &summary);
        assert_eq!(focused.title, "Si");
        assert_eq!(focused.number, Some(14));
        assert_eq!(focused.color, Some("#bdd6a3"));
        assert!(focused.values.contains(&(MetricKey::Hl, "5.0".to_string())));
        Ok(())
    }
}
