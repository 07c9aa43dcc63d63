const DEFAULT_TEAMS: [&str; 5] = [
    "Chennai Super Kings",
    "Royal Challengers Bangalore",
    "Delhi Capitals",
    "Rajasthan Royals",
    "Mumbai Indians",
];

/// The fixed set of team names a match input may reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRoster {
    teams: Vec<String>,
}

impl Default for TeamRoster {
    fn default() -> Self {
        Self::new(DEFAULT_TEAMS)
    }
}

impl TeamRoster {
    /// Builds a roster, dropping blanks and duplicates while keeping order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut teams: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || teams.iter().any(|t| t == name) {
                continue;
            }
            teams.push(name.to_string());
        }
        Self { teams }
    }

    /// Parses a comma-separated list. Returns `None` when nothing usable is left.
    pub fn parse_list(raw: &str) -> Option<Self> {
        let roster = Self::new(raw.split(','));
        if roster.is_empty() { None } else { Some(roster) }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.teams.iter().any(|t| t == name)
    }

    pub fn names(&self) -> &[String] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Next selection for a select-style field. The empty string is the
    /// "no team selected" slot that sits before the first team.
    pub fn cycle(&self, current: &str, forward: bool) -> String {
        let slots = self.teams.len() + 1;
        let idx = self
            .teams
            .iter()
            .position(|t| t == current)
            .map(|i| i + 1)
            .unwrap_or(0);
        let next = if forward {
            (idx + 1) % slots
        } else {
            (idx + slots - 1) % slots
        };
        if next == 0 {
            String::new()
        } else {
            self.teams[next - 1].clone()
        }
    }
}
