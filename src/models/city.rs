use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum City {
    Almaty,
    Astana,
    Shymkent,
    Aktobe,
    Karaganda,
}

impl City {
    pub const ALL: [City; 5] = [
        City::Almaty,
        City::Astana,
        City::Shymkent,
        City::Aktobe,
        City::Karaganda,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            City::Almaty => "Almaty",
            City::Astana => "Astana",
            City::Shymkent => "Shymkent",
            City::Aktobe => "Aktobe",
            City::Karaganda => "Karaganda",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn parse(raw: &str) -> Option<City> {
        let raw = raw.trim();
        City::ALL
            .into_iter()
            .find(|city| city.name().eq_ignore_ascii_case(raw))
    }

    pub fn default_pickup(&self) -> String {
        format!("123 Sample St, {}", self.name())
    }

    pub fn default_destination(&self) -> String {
        format!("456 Destination St, {}", self.name())
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::City;

    #[test]
    fn parse_ignores_case_and_whitespace() {
        assert_eq!(City::parse(" almaty "), Some(City::Almaty));
        assert_eq!(City::parse("KARAGANDA"), Some(City::Karaganda));
        assert_eq!(City::parse("Moscow"), None);
    }

    #[test]
    fn default_addresses_mention_the_city() {
        assert_eq!(City::Astana.default_pickup(), "123 Sample St, Astana");
        assert_eq!(City::Astana.default_destination(), "456 Destination St, Astana");
    }
}
