//! 技能純資料：種類、觸發時機、執行期狀態、各技能自帶的暫存資料、英雄名冊
//!
//! 不含任何技能行為；行為在 chess-lib 的技能目錄中以函式實作。
use board::alias::PieceId;
use board::component::{Color, Position};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error as ThisError;

pub type SkillID = String;
pub type HeroID = String;
/// 回合數：每次換邊加一
pub type Turn = u32;

/// 技能種類
#[derive(
    Debug,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    EnumString,
    Display,
    EnumIter,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SkillKind {
    /// 被動：觸發即反應
    Passive,
    /// 鎖定技：同被動，但不可被玩家關閉
    Locked,
    /// 主動：手動施放，可有冷卻
    Active,
    /// 限定技：每局一次
    Limited,
    /// 覺醒技：達成條件後才能使用
    Awakening,
}

/// 技能觸發時機
#[derive(
    Debug,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    EnumString,
    Display,
    EnumIter,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SkillTrigger {
    GameStart,
    BeforeMove,
    AfterMove,
    OnCapture,
    OnCheck,
    OnTurnStart,
    Manual,
}

/// 各技能的多步驟暫存資料，以技能區分的 tagged union
///
/// 刻意保留彈性：新技能需要跨觸發點記住東西時，在這裡加一個 variant。
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "skill")]
pub enum SkillData {
    #[default]
    Empty,
    /// 狼顧：被吃掉的棋子，下回合開始時在 `at`（吃子者離開的格子）復活
    Langgu { piece_id: PieceId, at: Position },
    /// 鬼才：`victim` 的下一回合被跳過
    Guicai { victim: Color },
}

impl SkillData {
    /// 是否有待完成的效果
    pub fn is_armed(&self) -> bool {
        !matches!(self, SkillData::Empty)
    }
}

/// 技能無法使用的原因
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Unavailable {
    #[error("尚未覺醒")]
    NotAwakened,
    #[error("限定技已使用")]
    AlreadyUsed,
    #[error("已達使用上限 {max}")]
    UsageCapReached { max: u32 },
    #[error("冷卻中，尚需 {remaining} 回合")]
    CoolingDown { remaining: Turn },
}

/// 技能執行期狀態，註冊時初始化，新局時整批重設
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct SkillState {
    pub is_used: bool,
    pub is_awakened: bool,
    pub usage_count: u32,
    pub max_usages: Option<u32>,
    pub cooldown_turns: Turn,
    pub last_used_turn: Option<Turn>,
    #[serde(default)]
    pub custom_data: SkillData,
}

impl SkillState {
    pub fn new(max_usages: Option<u32>, cooldown_turns: Turn) -> Self {
        Self {
            max_usages,
            cooldown_turns,
            ..Default::default()
        }
    }

    /// 手動施放前的狀態檢查（不含技能自己的條件）
    pub fn check_available(&self, kind: SkillKind, turn: Turn) -> Result<(), Unavailable> {
        if kind == SkillKind::Awakening && !self.is_awakened {
            return Err(Unavailable::NotAwakened);
        }
        if kind == SkillKind::Limited && self.is_used {
            return Err(Unavailable::AlreadyUsed);
        }
        if let Some(max) = self.max_usages {
            if self.usage_count >= max {
                return Err(Unavailable::UsageCapReached { max });
            }
        }
        if let Some(last) = self.last_used_turn {
            let elapsed = turn.saturating_sub(last);
            if elapsed < self.cooldown_turns {
                return Err(Unavailable::CoolingDown {
                    remaining: self.cooldown_turns - elapsed,
                });
            }
        }
        Ok(())
    }

    /// 觸發分派時是否允許反應
    ///
    /// - 被動 / 鎖定：未達使用上限即可
    /// - 覺醒：須已覺醒
    /// - 主動 / 限定：只在手動施放後留下待完成效果時反應
    pub fn permits_trigger(&self, kind: SkillKind) -> bool {
        let under_cap = self.max_usages.is_none_or(|max| self.usage_count < max);
        match kind {
            SkillKind::Passive | SkillKind::Locked => under_cap,
            SkillKind::Awakening => self.is_awakened && under_cap,
            SkillKind::Active | SkillKind::Limited => self.custom_data.is_armed(),
        }
    }

    /// 記錄一次成功使用
    pub fn record_use(&mut self, kind: SkillKind, turn: Turn) {
        self.usage_count += 1;
        self.last_used_turn = Some(turn);
        if kind == SkillKind::Limited {
            self.is_used = true;
        }
    }

    /// 單向覺醒；非覺醒技或已覺醒回傳 false
    pub fn awaken(&mut self, kind: SkillKind) -> bool {
        if kind != SkillKind::Awakening || self.is_awakened {
            return false;
        }
        self.is_awakened = true;
        true
    }

    /// 新局重設，保留靜態設定
    pub fn reset(&mut self) {
        *self = Self::new(self.max_usages, self.cooldown_turns);
    }
}

/// UI 傳來的技能參數，形狀由各技能自己檢查
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct SkillParams {
    #[serde(default)]
    pub target: Option<Position>,
    #[serde(default)]
    pub targets: Vec<Position>,
    #[serde(default)]
    pub piece_ids: Vec<PieceId>,
}

impl SkillParams {
    pub fn at(target: Position) -> Self {
        Self {
            target: Some(target),
            ..Default::default()
        }
    }

    pub fn pieces<I: IntoIterator<Item = PieceId>>(ids: I) -> Self {
        Self {
            piece_ids: ids.into_iter().collect(),
            ..Default::default()
        }
    }
}

/// 英雄靜態資料（名冊）
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct HeroDef {
    pub id: HeroID,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub skills: Vec<SkillID>,
}

/// heroes.toml 的頂層結構
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct HeroRoster {
    #[serde(default)]
    pub heroes: Vec<HeroDef>,
}

impl HeroRoster {
    pub fn get(&self, id: &str) -> Option<&HeroDef> {
        self.heroes.iter().find(|h| h.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 測試 1：覺醒技未覺醒不可用，覺醒只能一次
    #[test]
    fn test_awakening_lifecycle() {
        let mut state = SkillState::new(None, 0);
        assert_eq!(
            state.check_available(SkillKind::Awakening, 0),
            Err(Unavailable::NotAwakened)
        );
        assert!(!state.permits_trigger(SkillKind::Awakening));
        assert!(state.awaken(SkillKind::Awakening));
        assert!(!state.awaken(SkillKind::Awakening));
        assert!(state.check_available(SkillKind::Awakening, 0).is_ok());
        assert!(state.permits_trigger(SkillKind::Awakening));

        // 非覺醒技不能被覺醒
        let mut passive = SkillState::default();
        assert!(!passive.awaken(SkillKind::Passive));
        assert!(!passive.is_awakened);
    }

    // 測試 2：限定技用一次後鎖死
    #[test]
    fn test_limited_used_once() {
        let mut state = SkillState::default();
        assert!(state.check_available(SkillKind::Limited, 3).is_ok());
        state.record_use(SkillKind::Limited, 3);
        assert!(state.is_used);
        assert_eq!(
            state.check_available(SkillKind::Limited, 10),
            Err(Unavailable::AlreadyUsed)
        );
    }

    // 測試 3：冷卻與使用上限
    #[test]
    fn test_cooldown_and_cap() {
        let mut state = SkillState::new(Some(2), 3);
        state.record_use(SkillKind::Active, 4);
        assert_eq!(
            state.check_available(SkillKind::Active, 5),
            Err(Unavailable::CoolingDown { remaining: 2 })
        );
        assert!(state.check_available(SkillKind::Active, 7).is_ok());
        state.record_use(SkillKind::Active, 7);
        assert_eq!(
            state.check_available(SkillKind::Active, 100),
            Err(Unavailable::UsageCapReached { max: 2 })
        );
        assert!(!state.permits_trigger(SkillKind::Passive));
    }

    // 測試 4：主動技只在有待完成效果時反應觸發
    #[test]
    fn test_active_permits_trigger_only_when_armed() {
        let mut state = SkillState::default();
        assert!(!state.permits_trigger(SkillKind::Limited));
        state.custom_data = SkillData::Guicai {
            victim: Color::Black,
        };
        assert!(state.permits_trigger(SkillKind::Limited));
        assert!(state.permits_trigger(SkillKind::Passive));
    }

    #[test]
    fn test_reset_keeps_static_config() {
        let mut state = SkillState::new(Some(2), 1);
        state.record_use(SkillKind::Passive, 1);
        state.custom_data = SkillData::Langgu {
            piece_id: 9,
            at: Position::new(1, 1),
        };
        state.reset();
        assert_eq!(state, SkillState::new(Some(2), 1));
    }

    #[test]
    fn test_roster_from_toml() {
        let data = r#"
[[heroes]]
id = "ma_chao"
name = "馬超"
skills = ["tieqi", "benxi"]
        "#;
        let roster: HeroRoster = toml::from_str(data).unwrap();
        let hero = roster.get("ma_chao").unwrap();
        assert_eq!(hero.skills, vec!["tieqi".to_string(), "benxi".to_string()]);
        assert!(hero.description.is_empty());
        assert!(roster.get("nobody").is_none());
    }

    #[test]
    fn test_trigger_names() {
        assert_eq!(SkillTrigger::OnTurnStart.to_string(), "on_turn_start");
        let kind: SkillKind = "awakening".parse().unwrap();
        assert_eq!(kind, SkillKind::Awakening);
    }
}
