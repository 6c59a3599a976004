/// Every element symbol the page knows about, ordered by atomic number.
pub const ALL_ELEMENTS: [&str; 118] = [
    "H", "He", //
    "Li", "Be", "B", "C", "N", "O", "F", "Ne", //
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", //
    "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As", "Se",
    "Br", "Kr", //
    "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn", "Sb", "Te",
    "I", "Xe", //
    "Cs", "Ba", //
    "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", //
    "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At", "Rn", //
    "Fr", "Ra", //
    "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", //
    "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

pub fn is_known(symbol: &str) -> bool {
    ALL_ELEMENTS.contains(&symbol)
}

/// Returns the atomic number for a recognized symbol.
pub fn atomic_number(symbol: &str) -> Option<u32> {
    ALL_ELEMENTS
        .iter()
        .position(|known| *known == symbol)
        .and_then(|index| u32::try_from(index + 1).ok())
}

pub fn symbol(z: u32) -> Option<&'static str> {
    let index = usize::try_from(z.checked_sub(1)?).ok()?;
    ALL_ELEMENTS.get(index).copied()
}

/// Background category of a table cell. The page encodes it as a `bg_*` class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Hydrogen,
    Alkali,
    Alkaline,
    TransitionMetal,
    PostTransitionMetal,
    Metalloid,
    Nonmetal,
    Halogen,
    NobleGas,
    Lanthanoid,
    Actinoid,
    SuperHeavy,
}

impl Category {
    pub const ALL: [Self; 12] = [
        Self::Hydrogen,
        Self::Alkali,
        Self::Alkaline,
        Self::TransitionMetal,
        Self::PostTransitionMetal,
        Self::Metalloid,
        Self::Nonmetal,
        Self::Halogen,
        Self::NobleGas,
        Self::Lanthanoid,
        Self::Actinoid,
        Self::SuperHeavy,
    ];

    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Hydrogen => "bg_hydrogen",
            Self::Alkali => "bg_alkali",
            Self::Alkaline => "bg_alkaline",
            Self::TransitionMetal => "bg_transition_metal",
            Self::PostTransitionMetal => "bg_post_transition_metal",
            Self::Metalloid => "bg_metalloid",
            Self::Nonmetal => "bg_nonmetal",
            Self::Halogen => "bg_halogen",
            Self::NobleGas => "bg_noble_gas",
            Self::Lanthanoid => "bg_lanthanoid",
            Self::Actinoid => "bg_actinoid",
            Self::SuperHeavy => "bg_she",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::Hydrogen => "#d16969",
            Self::Alkali => "#d19292",
            Self::Alkaline => "#d1bd92",
            Self::TransitionMetal => "#a9c4d4",
            Self::PostTransitionMetal => "#a3b2d6",
            Self::Metalloid => "#bdd6a3",
            Self::Nonmetal => "#d6a3be",
            Self::Halogen => "#d2d6a3",
            Self::NobleGas => "#c4cdff",
            Self::Lanthanoid => "#edb8ff",
            Self::Actinoid => "#bf96ff",
            Self::SuperHeavy => "#82E0AA",
        }
    }

    pub fn from_class(class: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.class_name() == class)
    }

    pub const fn of(z: u32) -> Option<Self> {
        let category = match z {
            1 => Self::Hydrogen,
            3 | 11 | 19 | 37 | 55 | 87 => Self::Alkali,
            4 | 12 | 20 | 38 | 56 | 88 => Self::Alkaline,
            21..=30 | 39..=48 | 72..=80 => Self::TransitionMetal,
            13 | 31 | 49 | 50 | 81..=84 => Self::PostTransitionMetal,
            5 | 14 | 32 | 33 | 51 | 52 | 85 => Self::Metalloid,
            6..=8 | 15 | 16 | 34 => Self::Nonmetal,
            9 | 17 | 35 | 53 => Self::Halogen,
            2 | 10 | 18 | 36 | 54 | 86 => Self::NobleGas,
            57..=71 => Self::Lanthanoid,
            89..=103 => Self::Actinoid,
            104..=118 => Self::SuperHeavy,
            _ => return None,
        };
        Some(category)
    }
}

/// Grid position `(row, column)` of an element in an 18-column table.
/// The f-block sits on rows 7 and 8 below the main body.
pub const fn table_position(z: u32) -> Option<(u16, u16)> {
    let (row, column) = match z {
        1 => (0, 0),
        2 => (0, 17),
        3..=4 => (1, z - 3),
        5..=10 => (1, z + 7),
        11..=12 => (2, z - 11),
        13..=18 => (2, z - 1),
        19..=36 => (3, z - 19),
        37..=54 => (4, z - 37),
        55..=56 => (5, z - 55),
        57..=71 => (7, z - 54),
        72..=86 => (5, z - 69),
        87..=88 => (6, z - 87),
        89..=103 => (8, z - 86),
        104..=118 => (6, z - 101),
        _ => return None,
    };
    #[allow(clippy::cast_possible_truncation)]
    Some((row, column as u16))
}

/// Finds the element drawn at a grid position, if any.
pub fn at_position(row: u16, column: u16) -> Option<&'static str> {
    (1..=118)
        .find(|z| table_position(*z) == Some((row, column)))
        .and_then(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_numbers_follow_table_order() {
        assert_eq!(atomic_number("H"), Some(1));
        assert_eq!(atomic_number("Si"), Some(14));
        assert_eq!(atomic_number("Og"), Some(118));
        assert_eq!(atomic_number("Uue"), None);
        assert_eq!(symbol(26), Some("Fe"));
        assert_eq!(symbol(0), None);
    }

    #[test]
    fn every_element_has_a_unique_cell_and_category() {
        let mut seen = std::collections::HashSet::new();
        for z in 1..=118 {
            let position = table_position(z);
            assert!(position.is_some(), "no position for Z={z}");
            assert!(seen.insert(position), "duplicate position for Z={z}");
            assert!(Category::of(z).is_some(), "no category for Z={z}");
        }
    }

    #[test]
    fn grid_lookup_is_inverse_of_position() {
        assert_eq!(at_position(0, 17), Some("He"));
        assert_eq!(at_position(2, 13), Some("Si"));
        assert_eq!(at_position(7, 3), Some("La"));
        assert_eq!(at_position(0, 5), None);
    }

    #[test]
    fn category_classes_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_class(category.class_name()), Some(category));
        }
        assert_eq!(Category::from_class("bg_unknown"), None);
    }
}
