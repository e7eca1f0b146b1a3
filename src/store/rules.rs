//! Name rules deciding which boundaries have indoor positioning.

use serde::{Deserialize, Serialize};

/// Matches when every term appears in the boundary name, ignoring case
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectedRule {
    pub all_of: Vec<String>,
}

impl ConnectedRule {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            all_of: terms.into_iter().map(Into::into).collect(),
        }
    }
}

/// Compiled rule set; a name is connected if any rule matches
#[derive(Debug, Clone, Default)]
pub struct ConnectedRules {
    rules: Vec<Vec<String>>,
}

impl ConnectedRules {
    pub fn new(rules: &[ConnectedRule]) -> Self {
        let rules = rules
            .iter()
            .map(|rule| {
                rule.all_of
                    .iter()
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
            })
            // A rule without terms would match every name
            .filter(|terms| !terms.is_empty())
            .collect();
        Self { rules }
    }

    pub fn is_connected(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.rules
            .iter()
            .any(|terms| terms.iter().all(|t| name.contains(t.as_str())))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
