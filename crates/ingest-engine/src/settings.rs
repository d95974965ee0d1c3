//! Typed views over the configuration snapshot.

use std::str::FromStr;

use ingest_ipc::ConfigSnapshot;
use ingest_pipeline::DeviceSettings;

use crate::error::SourceError;
use crate::SourceResult;

/// Mix-wide section name.
pub const MIX_SECTION: &str = "mix";

/// Enabled audio streams when the mix does not say.
pub const DEFAULT_AUDIO_STREAMS: u32 = 1;

/// Mix-wide settings relevant to source planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixSettings {
    /// Number of output audio streams enabled in the mix.
    pub audio_streams: u32,
}

impl MixSettings {
    /// Read the mix settings from a snapshot.
    pub fn from_snapshot(config: &ConfigSnapshot) -> SourceResult<Self> {
        let audio_streams =
            parse_or(config, MIX_SECTION, "audiostreams", DEFAULT_AUDIO_STREAMS)?;
        Ok(Self { audio_streams })
    }
}

/// Read the device settings of a source, applying defaults for missing keys.
pub fn device_settings(config: &ConfigSnapshot, source: &str) -> SourceResult<DeviceSettings> {
    let section = ConfigSnapshot::source_section_name(source);
    let defaults = DeviceSettings::default();
    let text = |key: &str, default: String| {
        config
            .get(&section, key)
            .map(|value| value.trim().to_string())
            .unwrap_or(default)
    };

    Ok(DeviceSettings {
        device_number: parse_or(config, &section, "devicenumber", defaults.device_number)?,
        audio_connection: text("audio_connection", defaults.audio_connection),
        video_connection: text("video_connection", defaults.video_connection),
        video_mode: text("video_mode", defaults.video_mode),
        video_format: text("video_format", defaults.video_format),
    })
}

fn parse_or<T: FromStr>(
    config: &ConfigSnapshot,
    section: &str,
    key: &str,
    default: T,
) -> SourceResult<T> {
    match config.get(section, key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| SourceError::InvalidSetting {
                section: section.to_string(),
                key: key.to_string(),
                value: value.to_string(),
            }),
    }
}
