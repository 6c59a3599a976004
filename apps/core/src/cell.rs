use std::fmt;

use crate::elements::Category;
use crate::error::DojoError;

/// Colors painted on a cell or the archive button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paint {
    pub background: &'static str,
    pub foreground: &'static str,
}

pub const AVAILABLE: Paint = Paint {
    background: "#44AA44",
    foreground: "#FFFFFF",
};

pub const UNAVAILABLE: Paint = Paint {
    background: "#CC4444",
    foreground: "#FFFFFF",
};

pub const ARCHIVE_IDLE: Paint = Paint {
    background: "#4D4D4D",
    foreground: "#FFFFFF",
};

const ELEMENT_TEXT: &str = "#4B4B4D";

impl Paint {
    pub const fn for_category(category: Category) -> Self {
        Self {
            background: category.color(),
            foreground: ELEMENT_TEXT,
        }
    }

    pub const fn for_availability(available: bool) -> Self {
        if available {
            AVAILABLE
        } else {
            UNAVAILABLE
        }
    }
}

/// Identity of a table cell, read from its class attribute
/// (`plugin <category> <number>_<symbol>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellTag {
    pub category: Category,
    pub number: u32,
    pub element: String,
}

impl CellTag {
    pub fn parse(class_attr: &str) -> Option<Self> {
        let mut classes = class_attr.split_whitespace().skip(1);
        let category = Category::from_class(classes.next()?)?;
        let (number, element) = classes.next()?.split_once('_')?;
        Some(Self {
            category,
            number: number.parse().ok()?,
            element: element.to_string(),
        })
    }

    pub fn for_element(symbol: &str) -> Option<Self> {
        let number = crate::elements::atomic_number(symbol)?;
        Some(Self {
            category: Category::of(number)?,
            number,
            element: symbol.to_string(),
        })
    }

    pub const fn baseline(&self) -> Paint {
        Paint::for_category(self.category)
    }
}

/// How a confirmed link is delivered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Navigate,
    Download,
}

impl Delivery {
    /// Reports open in the page; every other format is a file.
    pub fn for_format(format: &str) -> Self {
        if format == "html" {
            Self::Navigate
        } else {
            Self::Download
        }
    }
}

/// File name offered for a downloaded link: its last path segment.
pub fn download_name(link: &str) -> &str {
    let path = link.split(['?', '#']).next().unwrap_or(link);
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => "download",
    }
}

/// What to do when the existence probe of a link fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeFailurePolicy {
    Silent,
    #[default]
    Notify,
}

impl ProbeFailurePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "silent" => Some(Self::Silent),
            "notify" => Some(Self::Notify),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::Notify => "notify",
        }
    }
}

/// Transient messages surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    FileUnavailable,
    ArchiveUnavailable,
    Unreachable,
    LoadFailed,
}

impl Notice {
    pub const fn message(self) -> &'static str {
        match self {
            Self::FileUnavailable => "Sorry but this file is not available!",
            Self::ArchiveUnavailable => "Sorry but this targz is not available!",
            Self::Unreachable => "Sorry but this file could not be reached!",
            Self::LoadFailed => {
                "The pseudopotential tables could not be loaded, every download is unavailable."
            }
        }
    }
}

/// Warning box text. A load failure stays up for the whole session, ahead of
/// any advisory of the current type.
pub fn banner_text(load_failure: Option<&str>, advisory: Option<&str>) -> Option<String> {
    match (load_failure, advisory) {
        (Some(failure), Some(advisory)) => Some(format!("{failure} {advisory}")),
        (Some(text), None) | (None, Some(text)) => Some(text.to_string()),
        (None, None) => None,
    }
}

/// Result of a finished probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Navigate,
    Download,
    Notify(Notice),
    Nothing,
}

pub const fn complete_probe(
    exists: bool,
    delivery: Delivery,
    policy: ProbeFailurePolicy,
) -> Completion {
    match (exists, delivery, policy) {
        (true, Delivery::Navigate, _) => Completion::Navigate,
        (true, Delivery::Download, _) => Completion::Download,
        (false, _, ProbeFailurePolicy::Notify) => Completion::Notify(Notice::Unreachable),
        (false, _, ProbeFailurePolicy::Silent) => Completion::Nothing,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Idle,
    Focused { available: bool },
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Focused { available } => write!(f, "Focused(available={available})"),
        }
    }
}

/// Pointer and selection events. Availability is resolved by the caller
/// against the current dropdown tuple when the event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellEvent {
    PointerEnter { available: bool },
    PointerLeave,
    Refresh { available: bool },
    Click { available: bool },
}

impl fmt::Display for CellEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PointerEnter { available } => write!(f, "PointerEnter({available})"),
            Self::PointerLeave => write!(f, "PointerLeave"),
            Self::Refresh { available } => write!(f, "Refresh({available})"),
            Self::Click { available } => write!(f, "Click({available})"),
        }
    }
}

/// Side effects the host applies after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellEffect {
    Paint(Paint),
    ShowDetail,
    ResetDetail,
    Notify(Notice),
    Probe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Element,
    Archive,
}

/// Idle/Focused machine for one element cell or the archive button.
#[derive(Debug, Clone)]
pub struct CellMachine {
    state: CellState,
    baseline: Paint,
    target: Target,
}

struct Transition {
    next: CellState,
    effects: Vec<CellEffect>,
}

impl TryFrom<(&CellMachine, CellEvent)> for Transition {
    type Error = DojoError;

    fn try_from(value: (&CellMachine, CellEvent)) -> Result<Self, Self::Error> {
        let (machine, event) = value;
        let element = machine.target == Target::Element;

        let transition = match (machine.state, event) {
            (
                CellState::Idle | CellState::Focused { .. },
                CellEvent::PointerEnter { available },
            )
            | (CellState::Focused { .. }, CellEvent::Refresh { available }) => {
                let mut effects = vec![CellEffect::Paint(Paint::for_availability(available))];
                if element {
                    effects.push(CellEffect::ShowDetail);
                }
                Self {
                    next: CellState::Focused { available },
                    effects,
                }
            }
            (CellState::Focused { .. }, CellEvent::PointerLeave) => {
                let mut effects = vec![CellEffect::Paint(machine.baseline)];
                if element {
                    effects.push(CellEffect::ResetDetail);
                }
                Self {
                    next: CellState::Idle,
                    effects,
                }
            }
            (CellState::Idle, CellEvent::PointerLeave | CellEvent::Refresh { .. }) => Self {
                next: CellState::Idle,
                effects: Vec::new(),
            },
            (CellState::Focused { .. }, CellEvent::Click { available }) => {
                let effect = if available {
                    CellEffect::Probe
                } else if element {
                    CellEffect::Notify(Notice::FileUnavailable)
                } else {
                    CellEffect::Notify(Notice::ArchiveUnavailable)
                };
                Self {
                    next: CellState::Focused { available },
                    effects: vec![effect],
                }
            }
            (CellState::Idle, CellEvent::Click { .. }) => {
                return Err(DojoError::Transition {
                    from: machine.state.to_string(),
                    event: event.to_string(),
                })
            }
        };

        Ok(transition)
    }
}

impl CellMachine {
    pub const fn element(baseline: Paint) -> Self {
        Self {
            state: CellState::Idle,
            baseline,
            target: Target::Element,
        }
    }

    pub const fn archive() -> Self {
        Self {
            state: CellState::Idle,
            baseline: ARCHIVE_IDLE,
            target: Target::Archive,
        }
    }

    pub const fn state(&self) -> CellState {
        self.state
    }

    pub const fn is_focused(&self) -> bool {
        matches!(self.state, CellState::Focused { .. })
    }

    /// Current colors of the cell.
    pub const fn paint(&self) -> Paint {
        match self.state {
            CellState::Idle => self.baseline,
            CellState::Focused { available } => Paint::for_availability(available),
        }
    }

    pub fn process(&mut self, event: CellEvent) -> Result<Vec<CellEffect>, DojoError> {
        let transition = Transition::try_from((&*self, event))?;
        self.state = transition.next;
        Ok(transition.effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silicon() -> CellMachine {
        CellMachine::element(Paint::for_category(Category::Metalloid))
    }

    #[test]
    fn parses_cell_class_attribute() {
        let tag = CellTag::parse("plugin bg_metalloid 14_Si");
        assert_eq!(
            tag,
            Some(CellTag {
                category: Category::Metalloid,
                number: 14,
                element: "Si".to_string(),
            })
        );
        assert_eq!(CellTag::parse("plugin bg_metalloid"), None);
        assert_eq!(CellTag::parse("plugin bg_nowhere 14_Si"), None);
        assert_eq!(CellTag::parse("plugin bg_metalloid Si"), None);
        assert_eq!(CellTag::for_element("Si"), tag);
    }

    #[test]
    fn hover_paints_by_availability_and_shows_detail() -> Result<(), DojoError> {
        let mut cell = silicon();
        let effects = cell.process(CellEvent::PointerEnter { available: true })?;
        assert_eq!(
            effects,
            vec![CellEffect::Paint(AVAILABLE), CellEffect::ShowDetail]
        );
        assert_eq!(cell.state(), CellState::Focused { available: true });

        let effects = cell.process(CellEvent::PointerLeave)?;
        assert_eq!(
            effects,
            vec![
                CellEffect::Paint(Paint::for_category(Category::Metalloid)),
                CellEffect::ResetDetail
            ]
        );
        assert_eq!(cell.state(), CellState::Idle);
        Ok(())
    }

    #[test]
    fn click_on_unavailable_notifies() -> Result<(), DojoError> {
        let mut cell = silicon();
        cell.process(CellEvent::PointerEnter { available: false })?;
        assert_eq!(cell.paint(), UNAVAILABLE);
        let effects = cell.process(CellEvent::Click { available: false })?;
        assert_eq!(effects, vec![CellEffect::Notify(Notice::FileUnavailable)]);
        Ok(())
    }

    #[test]
    fn click_on_available_probes() -> Result<(), DojoError> {
        let mut cell = silicon();
        cell.process(CellEvent::PointerEnter { available: true })?;
        let effects = cell.process(CellEvent::Click { available: true })?;
        assert_eq!(effects, vec![CellEffect::Probe]);
        Ok(())
    }

    #[test]
    fn click_while_idle_is_rejected() {
        let mut cell = silicon();
        let result = cell.process(CellEvent::Click { available: true });
        assert!(matches!(result, Err(DojoError::Transition { .. })));
        assert_eq!(cell.state(), CellState::Idle);
    }

    #[test]
    fn refresh_repaints_only_focused_cells() -> Result<(), DojoError> {
        let mut cell = silicon();
        assert!(cell.process(CellEvent::Refresh { available: true })?.is_empty());
        cell.process(CellEvent::PointerEnter { available: true })?;
        cell.process(CellEvent::Refresh { available: false })?;
        assert_eq!(cell.state(), CellState::Focused { available: false });
        Ok(())
    }

    #[test]
    fn archive_button_skips_detail_panel() -> Result<(), DojoError> {
        let mut button = CellMachine::archive();
        let effects = button.process(CellEvent::PointerEnter { available: false })?;
        assert_eq!(effects, vec![CellEffect::Paint(UNAVAILABLE)]);
        let effects = button.process(CellEvent::Click { available: false })?;
        assert_eq!(effects, vec![CellEffect::Notify(Notice::ArchiveUnavailable)]);
        let effects = button.process(CellEvent::PointerLeave)?;
        assert_eq!(effects, vec![CellEffect::Paint(ARCHIVE_IDLE)]);
        Ok(())
    }

    #[test]
    fn download_name_is_last_segment() {
        assert_eq!(
            download_name("https://x/ONCVPSP-PBE-SR-PDv0.4/Si/Si-sp.psp8"),
            "Si-sp.psp8"
        );
        assert_eq!(download_name("nc-sr-v0.4_standard.tgz"), "nc-sr-v0.4_standard.tgz");
        assert_eq!(download_name("https://x/Si.upf?raw=1"), "Si.upf");
        assert_eq!(download_name("https://x/dir/"), "download");
    }

    #[test]
    fn probe_completion_follows_policy() {
        assert_eq!(
            complete_probe(true, Delivery::for_format("html"), ProbeFailurePolicy::Silent),
            Completion::Navigate
        );
        assert_eq!(
            complete_probe(true, Delivery::for_format("psp8"), ProbeFailurePolicy::Notify),
            Completion::Download
        );
        assert_eq!(
            complete_probe(false, Delivery::Download, ProbeFailurePolicy::Silent),
            Completion::Nothing
        );
        assert_eq!(
            complete_probe(false, Delivery::Navigate, ProbeFailurePolicy::Notify),
            Completion::Notify(Notice::Unreachable)
        );
    }

    #[test]
    fn load_failure_outlives_advisories() {
        let failure = Notice::LoadFailed.message();
        assert_eq!(banner_text(None, None), None);
        assert_eq!(banner_text(Some(failure), None).as_deref(), Some(failure));
        assert_eq!(banner_text(None, Some("3+ only")).as_deref(), Some("3+ only"));
        let both = banner_text(Some(failure), Some("3+ only")).unwrap_or_default();
        assert!(both.starts_with(failure));
        assert!(both.ends_with("3+ only"));
    }
}
