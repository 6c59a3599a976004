use crate::error::DojoError;
use crate::preferences::{Layout, Remembered};
use crate::tables::Choice;

const STANDARD_AND_STRINGENT: &[&str] = &["standard", "stringent"];
const NC_FORMATS: &[&str] = &["psp8", "upf", "psml", "html", "djrepo"];

const LANTHANIDE_ADVISORY: &str = "this table contains Lanthanide potentials for use in the 3+ \
configuration only. They all have the f-electrons frozen in the core. The hints are based on the \
convergence of the nitride lattice parameter, see the report under format:html for details.";

/// Pseudopotential families the page has dropdown rules for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoType {
    JthSr11,
    NcSr04,
    NcFr04,
    NcSr04ThreePlus,
}

impl PseudoType {
    pub const ALL: [Self; 4] = [
        Self::NcSr04,
        Self::NcFr04,
        Self::NcSr04ThreePlus,
        Self::JthSr11,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JthSr11 => "jth-sr-v1.1",
            Self::NcSr04 => "nc-sr-v0.4",
            Self::NcFr04 => "nc-fr-v0.4",
            Self::NcSr04ThreePlus => "nc-sr-04-3plus",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::JthSr11 => "JTH PAW SR v1.1",
            Self::NcSr04 => "NC SR (ONCVPSP v0.4)",
            Self::NcFr04 => "NC FR (ONCVPSP v0.4)",
            Self::NcSr04ThreePlus => "NC SR 3+ lanthanides (v0.4)",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DojoError> {
        Self::ALL
            .into_iter()
            .find(|typ| typ.as_str() == value)
            .ok_or_else(|| DojoError::UnrecognizedType(value.to_string()))
    }

    pub const fn options(self) -> DropdownOptions {
        match self {
            Self::JthSr11 => DropdownOptions {
                typ: self,
                functionals: &["PBE", "LDA"],
                accuracies: STANDARD_AND_STRINGENT,
                formats: &["xml"],
                advisory: None,
            },
            Self::NcSr04 => DropdownOptions {
                typ: self,
                functionals: &["PBE", "PBEsol", "LDA"],
                accuracies: STANDARD_AND_STRINGENT,
                formats: NC_FORMATS,
                advisory: None,
            },
            Self::NcFr04 => DropdownOptions {
                typ: self,
                functionals: &["PBE", "PBEsol"],
                accuracies: STANDARD_AND_STRINGENT,
                formats: NC_FORMATS,
                advisory: None,
            },
            Self::NcSr04ThreePlus => DropdownOptions {
                typ: self,
                functionals: &["PBE"],
                accuracies: &["standard"],
                formats: NC_FORMATS,
                advisory: Some(LANTHANIDE_ADVISORY),
            },
        }
    }

    /// The type after this one in dropdown order, wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|typ| *typ == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let index = Self::ALL.iter().position(|typ| *typ == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Valid options of the three dependent dropdowns for one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropdownOptions {
    pub typ: PseudoType,
    pub functionals: &'static [&'static str],
    pub accuracies: &'static [&'static str],
    pub formats: &'static [&'static str],
    pub advisory: Option<&'static str>,
}

impl DropdownOptions {
    /// Builds the dropdown tuple, keeping remembered values the type still offers
    /// and falling back to the first option otherwise.
    pub fn choose(&self, remembered: &Remembered, layout: Layout) -> Choice {
        let format = match layout {
            Layout::Light => Some(crate::preferences::LIGHT_FORMAT),
            Layout::Full => remembered.format.as_deref(),
        };

        Choice {
            typ: self.typ.as_str().to_string(),
            functional: pick(self.functionals, remembered.functional.as_deref()),
            accuracy: pick(self.accuracies, remembered.accuracy.as_deref()),
            format: pick(self.formats, format),
        }
    }
}

fn pick<'a>(options: &[&'a str], wanted: Option<&'a str>) -> String {
    wanted
        .filter(|value| options.contains(value))
        .or_else(|| options.first().copied())
        .unwrap_or_default()
        .to_string()
}

/// Dropdown options for a type value as read from the page or the command line.
pub fn configure(typ: &str) -> Result<DropdownOptions, DojoError> {
    let options = PseudoType::parse(typ)?.options();
    log::debug!("dynamic dropdown configured for type {typ}");
    Ok(options)
}

/// Cycles `current` through `options` by `step` positions.
pub fn cycle<'a>(options: &[&'a str], current: &str, step: isize) -> Option<&'a str> {
    if options.is_empty() {
        return None;
    }
    let len = isize::try_from(options.len()).ok()?;
    let index = options
        .iter()
        .position(|option| *option == current)
        .and_then(|index| isize::try_from(index).ok())
        .unwrap_or(0);
    let next = usize::try_from((index + step).rem_euclid(len)).ok()?;
    options.get(next).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types_have_fixed_options() -> Result<(), DojoError> {
        let options = configure("nc-sr-v0.4")?;
        assert_eq!(options.functionals, ["PBE", "PBEsol", "LDA"]);
        assert_eq!(options.accuracies, ["standard", "stringent"]);
        assert_eq!(options.formats, ["psp8", "upf", "psml", "html", "djrepo"]);
        assert_eq!(options.advisory, None);

        let jth = configure("jth-sr-v1.1")?;
        assert_eq!(jth.functionals, ["PBE", "LDA"]);
        assert_eq!(jth.formats, ["xml"]);
        Ok(())
    }

    #[test]
    fn configuration_is_deterministic() -> Result<(), DojoError> {
        for typ in PseudoType::ALL {
            assert_eq!(configure(typ.as_str())?, configure(typ.as_str())?);
        }
        Ok(())
    }

    #[test]
    fn only_the_lanthanide_table_carries_an_advisory() -> Result<(), DojoError> {
        for typ in PseudoType::ALL {
            let advisory = configure(typ.as_str())?.advisory;
            assert_eq!(advisory.is_some(), typ == PseudoType::NcSr04ThreePlus);
        }
        Ok(())
    }

    #[test]
    fn unknown_type_is_an_error() {
        let error = configure("nc-sr-v0.5").err();
        assert!(matches!(error, Some(DojoError::UnrecognizedType(ref typ)) if typ == "nc-sr-v0.5"));
        assert!(configure("").is_err());
    }

    #[test]
    fn remembered_values_survive_only_when_offered() {
        let remembered = Remembered {
            functional: Some("PBEsol".to_string()),
            accuracy: Some("stringent".to_string()),
            format: Some("upf".to_string()),
        };

        let nc = PseudoType::NcFr04.options();
        let choice = nc.choose(&remembered, Layout::Full);
        assert_eq!(choice, Choice::new("nc-fr-v0.4", "PBEsol", "stringent", "upf"));

        let jth = PseudoType::JthSr11.options();
        let choice = jth.choose(&remembered, Layout::Full);
        assert_eq!(choice, Choice::new("jth-sr-v1.1", "PBE", "stringent", "xml"));
    }

    #[test]
    fn switching_away_and_back_restores_selection() {
        let first = PseudoType::NcSr04;
        let picked = Choice::new(first.as_str(), "LDA", "stringent", "psml");
        let remembered = Remembered::from_choice(&picked);

        let other = PseudoType::NcSr04ThreePlus;
        let away = other.options().choose(&remembered, Layout::Full);
        assert_eq!(away.functional, "PBE");
        assert_eq!(away.accuracy, "standard");

        let back = first.options().choose(&remembered, Layout::Full);
        assert_eq!(back, picked);
    }

    #[test]
    fn light_layout_forces_psp8_when_offered() {
        let remembered = Remembered {
            format: Some("upf".to_string()),
            ..Remembered::default()
        };
        let nc = PseudoType::NcSr04;
        assert_eq!(nc.options().choose(&remembered, Layout::Light).format, "psp8");
        let jth = PseudoType::JthSr11;
        assert_eq!(jth.options().choose(&remembered, Layout::Light).format, "xml");
    }

    #[test]
    fn cycling_wraps_both_ways() {
        let options = ["a", "b", "c"];
        assert_eq!(cycle(&options, "c", 1), Some("a"));
        assert_eq!(cycle(&options, "a", -1), Some("c"));
        assert_eq!(cycle(&options, "missing", 1), Some("b"));
        assert_eq!(cycle(&[], "a", 1), None);
        assert_eq!(PseudoType::JthSr11.next(), PseudoType::NcSr04);
        assert_eq!(PseudoType::NcSr04.prev(), PseudoType::JthSr11);
    }
}
