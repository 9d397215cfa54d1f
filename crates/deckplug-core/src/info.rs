//! Registration info
//!
//! The `-info` document passed to the plugin at launch, describing the Stream
//! Deck application, the plugin itself and the connected devices.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;
use crate::inbound::{DeviceSize, DeviceType};

/// Stream Deck application details
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplicationInfo {
    pub font: String,
    pub language: String,
    pub platform: String,
    pub platform_version: String,
    pub version: String,
}

/// Plugin identity as seen by the host
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginInfo {
    pub uuid: String,
    pub version: String,
}

/// User interface colors of the Stream Deck application
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Colors {
    pub button_pressed_background_color: String,
    pub button_pressed_border_color: String,
    pub button_pressed_text_color: String,
    pub disabled_color: String,
    pub highlight_color: String,
    pub mouse_down_color: String,
}

/// A device known to the host at launch
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub size: DeviceSize,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
}

/// Host and device capabilities sent to the plugin on launch
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistrationInfo {
    pub application: ApplicationInfo,
    pub plugin: PluginInfo,
    pub device_pixel_ratio: u32,
    pub colors: Colors,
    pub devices: Vec<Device>,
}

impl RegistrationInfo {
    /// Parse the `-info` argument
    ///
    /// An empty document and malformed JSON are both configuration errors.
    pub fn parse(raw: &str) -> Result<Self, ConfigurationError> {
        if raw.trim().is_empty() {
            return Err(ConfigurationError::MissingOrInvalidInfo { source: None });
        }
        serde_json::from_str(raw)
            .map_err(|e| ConfigurationError::MissingOrInvalidInfo { source: Some(e) })
    }

    /// Look up a device by its opaque id
    pub fn device(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO: &str = r##"{
        "application": {"font": ".AppleSystemUIFont", "language": "en", "platform": "mac", "platformVersion": "14.2", "version": "6.5.0"},
        "plugin": {"uuid": "com.example.counter", "version": "1.0"},
        "devicePixelRatio": 2,
        "colors": {"highlightColor": "#0078FFFF"},
        "devices": [{"id": "D1", "name": "Desk", "size": {"columns": 5, "rows": 3}, "type": 0}]
    }"##;

    #[test]
    fn test_parse_info() {
        let info = RegistrationInfo::parse(INFO).unwrap();
        assert_eq!(info.application.platform, "mac");
        assert_eq!(info.plugin.uuid, "com.example.counter");
        assert_eq!(info.device_pixel_ratio, 2);
        assert_eq!(info.colors.highlight_color, "#0078FFFF");
        assert_eq!(info.colors.disabled_color, "");

        let device = info.device("D1").unwrap();
        assert_eq!(device.device_type, DeviceType::StreamDeck);
        assert_eq!(device.size.columns, 5);
        assert!(info.device("D2").is_none());
    }

    #[test]
    fn test_parse_info_errors() {
        assert!(matches!(
            RegistrationInfo::parse("   "),
            Err(ConfigurationError::MissingOrInvalidInfo { source: None })
        ));
        assert!(matches!(
            RegistrationInfo::parse("{not json"),
            Err(ConfigurationError::MissingOrInvalidInfo { source: Some(_) })
        ));
    }

    #[test]
    fn test_parse_empty_object_uses_defaults() {
        let info = RegistrationInfo::parse("{}").unwrap();
        assert_eq!(info, RegistrationInfo::default());
    }
}
