//! Monitored site data structure.

use serde::{Deserialize, Serialize};

/// A managed site whose client activity is monitored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Site {
    /// Site unique identifier
    pub id: String,

    /// Site display name
    pub name: String,
}

impl Site {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Return a copy with spaces in the name replaced by underscores.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.replace(' ', "_");
        self
    }

    /// Stream topic carrying this site's client statistics.
    pub fn client_topic(&self) -> String {
        format!("/sites/{}/stats/clients", self.id)
    }
}
