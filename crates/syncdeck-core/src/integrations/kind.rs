use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Which third-party data source a session talks to.
///
/// Each kind owns one credential flow and one backend path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegrationKind {
    /// Document workspace.
    Notion,
    /// Spreadsheet-style database.
    Airtable,
    /// CRM platform.
    HubSpot,
}

impl IntegrationKind {
    pub const ALL: [IntegrationKind; 3] = [
        IntegrationKind::Notion,
        IntegrationKind::Airtable,
        IntegrationKind::HubSpot,
    ];

    /// Path segment used in `/integrations/{slug}/...`.
    pub fn slug(self) -> &'static str {
        match self {
            IntegrationKind::Notion => "notion",
            IntegrationKind::Airtable => "airtable",
            IntegrationKind::HubSpot => "hubspot",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            IntegrationKind::Notion => "Notion",
            IntegrationKind::Airtable => "Airtable",
            IntegrationKind::HubSpot => "HubSpot",
        }
    }

    pub fn category(self) -> &'static str {
        match self {
            IntegrationKind::Notion => "document workspace",
            IntegrationKind::Airtable => "spreadsheet database",
            IntegrationKind::HubSpot => "CRM platform",
        }
    }
}

impl fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for IntegrationKind {
    type Err = CoreError;

    /// Accepts either the slug or the display name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        IntegrationKind::ALL
            .into_iter()
            .find(|kind| {
                kind.slug().eq_ignore_ascii_case(wanted)
                    || kind.display_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| CoreError::UnknownIntegration(wanted.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_match_backend_paths() {
        assert_eq!(IntegrationKind::Notion.slug(), "notion");
        assert_eq!(IntegrationKind::Airtable.slug(), "airtable");
        assert_eq!(IntegrationKind::HubSpot.slug(), "hubspot");
    }

    #[test]
    fn parses_slug_and_display_name() {
        assert_eq!("hubspot".parse::<IntegrationKind>().unwrap(), IntegrationKind::HubSpot);
        assert_eq!("HubSpot".parse::<IntegrationKind>().unwrap(), IntegrationKind::HubSpot);
        assert_eq!(" AIRTABLE ".parse::<IntegrationKind>().unwrap(), IntegrationKind::Airtable);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "salesforce".parse::<IntegrationKind>().unwrap_err();
        assert!(err.to_string().contains("salesforce"));
    }
}
