//! 対局設定（TOML）

use std::path::{Path, PathBuf};

use rshogi_kifu::{Position, SfenError};
use serde::{Deserialize, Serialize};

use crate::uri;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("unknown player uri: {0}")]
    UnknownUri(String),

    #[error("invalid start position: {0}")]
    StartPosition(#[from] SfenError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSetting {
    pub name: String,
    pub uri: String,
}

impl PlayerSetting {
    pub fn human(name: impl Into<String>) -> Self {
        Self { name: name.into(), uri: uri::ES_HUMAN.to_string() }
    }
}

/// 持ち時間（秒単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeLimitSetting {
    pub time_seconds: u64,
    pub byoyomi: u32,
    /// フィッシャールールの加算時間
    pub increment: u64,
}

impl Default for TimeLimitSetting {
    fn default() -> Self {
        Self { time_seconds: 15 * 60, byoyomi: 30, increment: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSetting {
    /// 開始局面（SFEN）。省略時は平手
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_sfen: Option<String>,
    pub black: PlayerSetting,
    pub white: PlayerSetting,
    pub time_limit: TimeLimitSetting,
}

impl Default for GameSetting {
    fn default() -> Self {
        Self {
            start_sfen: None,
            black: PlayerSetting::human("先手"),
            white: PlayerSetting::human("後手"),
            time_limit: TimeLimitSetting::default(),
        }
    }
}

impl GameSetting {
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        let setting: GameSetting = toml::from_str(s)?;
        setting.validate()?;
        Ok(setting)
    }

    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| SettingsError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text = self.to_toml_string()?;
        std::fs::write(path, text)
            .map_err(|source| SettingsError::Write { path: path.to_path_buf(), source })
    }

    /// プレイヤー URI と開始局面を検査する
    pub fn validate(&self) -> Result<(), SettingsError> {
        for player in [&self.black, &self.white] {
            if player.uri != uri::ES_HUMAN && !uri::is_usi_engine(&player.uri) {
                return Err(SettingsError::UnknownUri(player.uri.clone()));
            }
        }
        self.start_position()?;
        Ok(())
    }

    pub fn start_position(&self) -> Result<Position, SfenError> {
        match &self.start_sfen {
            Some(sfen) => Position::from_sfen(sfen),
            None => Ok(Position::new()),
        }
    }
}
