//! Consumed configuration.
//!
//! The host owns persistence; the engine only reads these values. The
//! `debug_logging` flag is not interpreted here at all — diagnostics go
//! through `tracing` targets and the host installs a matching subscriber
//! filter when the flag is set.

use serde::{Deserialize, Serialize};

/// Where a deleted attachment goes.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeleteDestination {
    /// Remove permanently.
    Permanent,
    /// Move to the vault-local trash folder.
    #[serde(rename = ".trash")]
    VaultTrash,
    /// Move to the operating system trash.
    SystemTrash,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub delete_destination: DeleteDestination,
    /// Enable drag-resizing of embeds.
    pub drag_resize: bool,
    /// Snap the final drag width to a multiple of this; 0 disables snapping.
    pub snap_interval: u32,
    /// Enable the click-to-zoom viewer.
    pub click_zoom: bool,
    /// Fraction of the viewport the zoom viewer fits an image to.
    pub zoom_fit_ratio: f32,
    pub debug_logging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delete_destination: DeleteDestination::VaultTrash,
            drag_resize: true,
            snap_interval: 0,
            click_zoom: true,
            zoom_fit_ratio: 0.9,
            debug_logging: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_wire_names() {
        assert_eq!(
            serde_json::to_string(&DeleteDestination::VaultTrash).unwrap(),
            "\".trash\""
        );
        assert_eq!(
            serde_json::to_string(&DeleteDestination::SystemTrash).unwrap(),
            "\"system-trash\""
        );
        assert_eq!(
            serde_json::from_str::<DeleteDestination>("\"permanent\"").unwrap(),
            DeleteDestination::Permanent
        );
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.delete_destination, DeleteDestination::VaultTrash);
        assert_eq!(settings.snap_interval, 0);
        assert!(settings.drag_resize);
        assert!(!settings.debug_logging);
    }
}
