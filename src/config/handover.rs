//! Human-workflow handover configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Handover configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HandoverSettings {
    /// Workflow engaged when a handover names none
    pub default_flow_sid: Option<String>,

    /// Comma-separated enumeration of valid service classifications
    #[serde(default)]
    pub known_services: String,

    /// Comma-separated enumeration of valid area classifications
    #[serde(default)]
    pub known_areas: String,

    /// Identity authoring blocked-handover notifications
    #[serde(default = "default_notify_sender")]
    pub notify_sender: String,
}

impl HandoverSettings {
    /// Valid service classifications as a list
    pub fn services_list(&self) -> Vec<String> {
        split_csv(&self.known_services)
    }

    /// Valid area classifications as a list
    pub fn areas_list(&self) -> Vec<String> {
        split_csv(&self.known_areas)
    }

    /// Validate handover configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.services_list().is_empty() || self.areas_list().is_empty() {
            return Err(ValidationError::EmptyClassificationEnums);
        }
        Ok(())
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn default_notify_sender() -> String {
    "assistant".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> HandoverSettings {
        HandoverSettings {
            default_flow_sid: Some("FW123".to_string()),
            known_services: "billing, support".to_string(),
            known_areas: "invoices,refunds".to_string(),
            notify_sender: default_notify_sender(),
        }
    }

    #[test]
    fn test_csv_lists_are_trimmed() {
        let settings = valid();
        assert_eq!(settings.services_list(), vec!["billing", "support"]);
        assert_eq!(settings.areas_list(), vec!["invoices", "refunds"]);
    }

    #[test]
    fn test_empty_enumerations_are_invalid() {
        let settings = HandoverSettings {
            known_services: String::new(),
            ..valid()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_valid_config() {
        assert!(valid().validate().is_ok());
    }
}
