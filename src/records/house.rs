use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three houses a feedback record can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum House {
    Bhairav,
    Bhageshree,
    Megh,
}

impl House {
    pub const ALL: [House; 3] = [House::Bhairav, House::Bhageshree, House::Megh];

    pub fn as_str(&self) -> &'static str {
        match self {
            House::Bhairav => "Bhairav",
            House::Bhageshree => "Bhageshree",
            House::Megh => "Megh",
        }
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive match against the declared names
impl FromStr for House {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        House::ALL
            .into_iter()
            .find(|h| h.as_str() == s)
            .ok_or_else(|| format!("`{}` is not a valid enum value", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_declared_names_only() {
        assert_eq!("Megh".parse::<House>(), Ok(House::Megh));
        assert_eq!("Bhageshree".parse::<House>(), Ok(House::Bhageshree));
        assert!("megh".parse::<House>().is_err());
        assert!("Purple".parse::<House>().is_err());
    }
}
