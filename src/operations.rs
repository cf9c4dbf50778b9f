/// Tab operations: grouping by domain key
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::tab_data::{TabRecord, WindowGroup};

/// How groups are ordered relative to each other.
///
/// Strategies are looked up by name from a fixed registry; an unrecognized
/// name resolves to the default with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortMethod {
    /// Lexicographic over the domain key
    #[default]
    Domain,
}

impl SortMethod {
    pub const ALL: &'static [SortMethod] = &[SortMethod::Domain];

    pub fn name(self) -> &'static str {
        match self {
            SortMethod::Domain => "domain",
        }
    }

    pub fn lookup(name: &str) -> Option<SortMethod> {
        SortMethod::ALL
            .iter()
            .copied()
            .find(|method| method.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Resolve a requested name, falling back to `default` when absent or unknown
    pub fn resolve(name: Option<&str>, default: SortMethod) -> SortMethod {
        match name {
            None => default,
            Some(name) => SortMethod::lookup(name).unwrap_or_else(|| {
                log::warn!("Unknown sort method {:?}, using {}", name, default);
                default
            }),
        }
    }

    fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            SortMethod::Domain => a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)),
        }
    }
}

impl fmt::Display for SortMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for SortMethod {
    fn from(name: String) -> Self {
        SortMethod::resolve(Some(&name), SortMethod::default())
    }
}

impl From<SortMethod> for String {
    fn from(method: SortMethod) -> Self {
        method.name().to_string()
    }
}

/// Partition tabs by domain key.
///
/// Every tab lands in exactly one group. Tabs keep their snapshot order within
/// a group; groups are ordered by `method`, ties kept in first-seen order.
pub fn group_by_domain(tabs: &[TabRecord], method: SortMethod) -> Vec<WindowGroup> {
    let mut groups: Vec<WindowGroup> = Vec::new();
    let mut index_by_key: HashMap<&str, usize> = HashMap::new();

    for tab in tabs {
        match index_by_key.get(tab.domain_key.as_str()) {
            Some(&index) => groups[index].tabs.push(tab.clone()),
            None => {
                index_by_key.insert(tab.domain_key.as_str(), groups.len());
                groups.push(WindowGroup {
                    domain_key: tab.domain_key.clone(),
                    tabs: vec![tab.clone()],
                });
            }
        }
    }

    // Vec::sort_by is stable
    groups.sort_by(|a, b| method.compare(&a.domain_key, &b.domain_key));
    groups
}
