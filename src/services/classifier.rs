//! Guest classification rules.
//!
//! The rules are a heuristic, not an authoritative guest flag. A client is a
//! guest when its event sets `is_guest`, or when its SSID contains one of the
//! configured keywords (case-insensitive). This misclassifies both ways: a staff
//! SSID such as "GuestHouse-Staff" is flagged as guest, and a guest network
//! whose name carries none of the keywords is missed unless the flag is set.

use crate::error::{AppError, Result};
use crate::models::{ClassifierConfig, ClientEvent, GuestIdentity};

/// Keyword-based guest detection.
#[derive(Debug, Clone)]
pub struct GuestRules {
    keywords: Vec<String>,
}

impl GuestRules {
    /// Create rules from SSID keywords. Blank keywords are ignored.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(&config.keywords)
    }

    /// Decide whether a client is a guest from its flag and SSID alone.
    pub fn is_guest(&self, flag: bool, ssid: &str) -> bool {
        if flag {
            return true;
        }
        let ssid = ssid.to_lowercase();
        self.keywords.iter().any(|k| ssid.contains(k.as_str()))
    }

    /// Classify a decoded event, returning the guest identity if it is one.
    pub fn classify(&self, event: &ClientEvent) -> Result<Option<GuestIdentity>> {
        let flag = event.is_guest.unwrap_or(false);
        let ssid = event.ssid.as_deref().unwrap_or("");

        if !self.is_guest(flag, ssid) {
            return Ok(None);
        }

        let ip = event
            .ip
            .as_deref()
            .ok_or_else(|| AppError::decode(format!("guest {} has no ip", event.mac)))?;
        Ok(Some(GuestIdentity::new(&event.mac, ip)))
    }
}

impl Default for GuestRules {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(ssid: Option<&str>, is_guest: Option<bool>, ip: Option<&str>) -> ClientEvent {
        ClientEvent {
            mac: "AA:BB".to_string(),
            ip: ip.map(str::to_string),
            ssid: ssid.map(str::to_string),
            is_guest,
        }
    }

    #[test]
    fn test_flag_alone_is_guest() {
        let rules = GuestRules::default();
        assert!(rules.is_guest(true, "Corp"));
        assert!(rules.is_guest(true, ""));
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let rules = GuestRules::default();
        assert!(rules.is_guest(false, "Corp-Guest"));
        assert!(rules.is_guest(false, "INVITES"));
        assert!(rules.is_guest(false, "Lobby HotSpot"));
        assert!(!rules.is_guest(false, "Corp"));
        assert!(!rules.is_guest(false, ""));
    }

    #[test]
    fn test_heuristic_false_positive_and_negative() {
        let rules = GuestRules::default();
        // Substring match only: "Guesswork" is not "guest", a staff SSID can be.
        assert!(!rules.is_guest(false, "Guesswork"));
        assert!(rules.is_guest(false, "GuestHouse-Staff"));
        assert!(!rules.is_guest(false, "Visitors"));
    }

    #[test]
    fn test_custom_keywords() {
        let rules = GuestRules::new(["Visitor", "  "]);
        assert!(rules.is_guest(false, "visitors-5G"));
        assert!(!rules.is_guest(false, "Corp-Guest"));
    }

    #[test]
    fn test_classify_extracts_identity() {
        let rules = GuestRules::default();
        let identity = rules
            .classify(&event(Some("Corp-Guest"), None, Some("10.0.0.5")))
            .unwrap();
        assert_eq!(identity, Some(GuestIdentity::new("AA:BB", "10.0.0.5")));
    }

    #[test]
    fn test_classify_non_guest() {
        let rules = GuestRules::default();
        let identity = rules
            .classify(&event(Some("Corp"), Some(false), None))
            .unwrap();
        assert!(identity.is_none());
    }

    #[test]
    fn test_classify_guest_without_ip_is_error() {
        let rules = GuestRules::default();
        assert!(rules.classify(&event(None, Some(true), None)).is_err());
    }
}
