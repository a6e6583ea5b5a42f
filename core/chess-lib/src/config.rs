//! config.rs：對局引擎設定，由呼叫端交入 TOML 字串
use crate::*;
use board::error::LoadError;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// 技能效果落在友方棋子上時的處理方式；敵方棋子一律被吃
#[derive(
    Debug,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OccupancyPolicy {
    /// 原棋子陣亡
    Overwrite,
    /// 略過這一次放置
    Skip,
    /// 整個效果失敗
    #[default]
    Reject,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub occupancy_policy: OccupancyPolicy,
    /// 標記達到此數量時覺醒標記類技能
    pub marker_awaken_threshold: i32,
    pub king_capture_ends_game: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            occupancy_policy: OccupancyPolicy::default(),
            marker_awaken_threshold: 5,
            king_capture_ends_game: true,
        }
    }
}

impl EngineConfig {
    pub fn from_toml(data: &str) -> Result<Self, Error> {
        toml::from_str(data).map_err(|e| Error::Load {
            func: "EngineConfig::from_toml",
            source: LoadError::DeserializeError {
                format: "toml".to_string(),
                reason: e.to_string(),
            }
            .into(),
        })
    }
}
