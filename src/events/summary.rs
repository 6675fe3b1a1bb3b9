//! Decoded shape of a Statuspage-style `summary.json`.
//!
//! Only the fields the extractor reads are modelled. Unknown fields are
//! ignored so upstream additions never turn into decode failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub page: Option<Page>,
    #[serde(default)]
    pub incidents: Vec<Incident>,
    #[serde(default)]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    pub name: String,
    pub status: String,
    /// Most recent first.
    #[serde(default, rename = "incident_updates")]
    pub updates: Vec<IncidentUpdate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentUpdate {
    pub body: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub name: String,
    pub status: String,
}

impl Incident {
    pub fn latest_update(&self) -> Option<&IncidentUpdate> {
        self.updates.first()
    }
}
