//! Settings screen.
//!
//! A flat list behind a "Close settings" header. Each item returns a
//! `ConfigChange`; the session applies it, calls `config_applied` so the
//! labels show the new values, and keeps the scan position.

use switchscan_core::{Activation, Config, ConfigChange, Item, ItemRef, NavigableSet, ScreenProvider};

/// Long-press thresholds offered by the settings screen.
pub const LONG_PRESS_STEPS_MS: [u64; 5] = [1000, 1500, 2000, 3000, 5000];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Setting {
    ScanSpeed,
    AutoScan,
    Highlight,
    LongPress,
}

const SETTINGS: [Setting; 4] = [
    Setting::ScanSpeed,
    Setting::AutoScan,
    Setting::Highlight,
    Setting::LongPress,
];

fn seconds(ms: u64) -> String {
    if ms % 1000 == 0 {
        let s = ms / 1000;
        format!("{s} second{}", if s == 1 { "" } else { "s" })
    } else {
        format!("{:.1} seconds", ms as f64 / 1000.0)
    }
}

/// Next long-press step after `current`, wrapping to the shortest.
pub fn next_long_press(current: u64) -> u64 {
    LONG_PRESS_STEPS_MS
        .iter()
        .copied()
        .find(|&step| step > current)
        .unwrap_or(LONG_PRESS_STEPS_MS[0])
}

#[derive(Debug, Clone)]
pub struct SettingsScreen {
    config: Config,
}

impl SettingsScreen {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn label(&self, setting: Setting) -> String {
        match setting {
            Setting::ScanSpeed => format!("scan speed {}", seconds(self.config.scan_interval_ms)),
            Setting::AutoScan => format!(
                "auto scan {}",
                if self.config.auto_scan { "on" } else { "off" }
            ),
            Setting::Highlight => format!("highlight {}", self.config.highlight_style.label()),
            Setting::LongPress => {
                format!("long press {}", seconds(self.config.long_press_threshold_ms))
            }
        }
    }

    fn change(&self, setting: Setting) -> ConfigChange {
        match setting {
            Setting::ScanSpeed => ConfigChange::CycleScanSpeed,
            Setting::AutoScan => ConfigChange::ToggleAutoScan,
            Setting::Highlight => ConfigChange::CycleHighlightStyle,
            Setting::LongPress => {
                ConfigChange::LongPressThreshold(next_long_press(self.config.long_press_threshold_ms))
            }
        }
    }
}

impl ScreenProvider for SettingsScreen {
    fn name(&self) -> &str {
        "settings"
    }

    fn navigable_set(&self) -> NavigableSet {
        let items = SETTINGS
            .iter()
            .map(|&s| Item::new(format!("{s:?}"), self.label(s)))
            .collect();
        NavigableSet::new(items).with_header(Item::new("close", "close settings"))
    }

    fn activate(&mut self, target: ItemRef) -> Activation {
        match SETTINGS.get(target.index) {
            Some(&setting) => Activation::Configure(self.change(setting)),
            None => Activation::Stay,
        }
    }

    fn on_back(&mut self) -> Activation {
        Activation::Pop
    }

    fn config_applied(&mut self, config: &Config) {
        self.config = config.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_config() {
        let mut screen = SettingsScreen::new(&Config::default());
        let set = screen.navigable_set();
        assert_eq!(set.slot_label(0), Some("scan speed 2 seconds"));
        assert_eq!(set.slot_label(1), Some("auto scan off"));
        assert_eq!(set.slot_label(3), Some("long press 3 seconds"));
        assert_eq!(set.slot_label(-1), Some("close settings"));

        let mut config = Config::default();
        config.scan_interval_ms = 1000;
        config.auto_scan = true;
        config.long_press_threshold_ms = 1500;
        screen.config_applied(&config);
        let set = screen.navigable_set();
        assert_eq!(set.slot_label(0), Some("scan speed 1 second"));
        assert_eq!(set.slot_label(1), Some("auto scan on"));
        assert_eq!(set.slot_label(3), Some("long press 1.5 seconds"));
    }

    #[test]
    fn items_request_config_changes() {
        let mut screen = SettingsScreen::new(&Config::default());
        assert!(matches!(
            screen.activate(ItemRef::item(0)),
            Activation::Configure(ConfigChange::CycleScanSpeed)
        ));
        assert!(matches!(
            screen.activate(ItemRef::item(3)),
            Activation::Configure(ConfigChange::LongPressThreshold(5000))
        ));
        assert!(matches!(screen.on_back(), Activation::Pop));
    }

    #[test]
    fn long_press_steps_wrap() {
        assert_eq!(next_long_press(1000), 1500);
        assert_eq!(next_long_press(5000), 1000);
        assert_eq!(next_long_press(2500), 3000);
    }
}
