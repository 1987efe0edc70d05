//! CI build metadata
//!
//! Azure Pipelines exposes build and pipeline identity through environment
//! variables. Reading them can never fail: an absent variable is an absent
//! property, not an error. The lookup is injectable so tests never touch
//! the process environment.

/// Property key / environment variable pairs, in the order the entries are
/// written into every record's property bag.
const WELL_KNOWN: [(&str, &str); 4] = [
    ("BuildId", "BUILD_BUILDID"),
    ("BuildNumber", "BUILD_BUILDNUMBER"),
    ("DefinitionId", "SYSTEM_DEFINITIONID"),
    ("DefinitionName", "BUILD_DEFINITIONNAME"),
];

/// Build/pipeline identity captured once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildMetadata {
    build_id: Option<String>,
    build_number: Option<String>,
    definition_id: Option<String>,
    definition_name: Option<String>,
}

impl BuildMetadata {
    /// Read the well-known variables from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the well-known variables through an arbitrary lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            build_id: lookup(WELL_KNOWN[0].1),
            build_number: lookup(WELL_KNOWN[1].1),
            definition_id: lookup(WELL_KNOWN[2].1),
            definition_name: lookup(WELL_KNOWN[3].1),
        }
    }

    /// Entries as (property key, value) in stable order.
    /// Callers decide whether to include or omit the `None` entries.
    pub fn entries(&self) -> [(&'static str, Option<&str>); 4] {
        [
            (WELL_KNOWN[0].0, self.build_id.as_deref()),
            (WELL_KNOWN[1].0, self.build_number.as_deref()),
            (WELL_KNOWN[2].0, self.definition_id.as_deref()),
            (WELL_KNOWN[3].0, self.definition_name.as_deref()),
        ]
    }
}
