//! skill.rs：
//! - 技能定義（Skill）：靜態資料加上執行函式，沒有繼承，也不持有狀態。
//! - 技能執行時只讀取 SkillContext，回傳 SkillOutcome；所有變更都經由 StateDelta 交給引擎套用。
use crate::*;
use board::RuleOverride;
use board::component::{Color, Move, Piece};
use serde::{Deserialize, Serialize};
use skills_lib::*;
use std::fmt;
use strum_macros::{Display, EnumString};

/// 技能鍵：同一英雄可能雙方都選，所以以陣營區分
#[derive(
    Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct SkillKey {
    pub owner: Color,
    pub id: SkillID,
}

impl SkillKey {
    pub fn new(owner: Color, id: impl Into<SkillID>) -> Self {
        Self {
            owner,
            id: id.into(),
        }
    }
}

impl fmt::Display for SkillKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner, self.id)
    }
}

pub type ExecuteFn = fn(&SkillContext<'_>) -> Result<SkillOutcome, Error>;
pub type CanUseFn = fn(&SkillContext<'_>) -> bool;

#[derive(Clone)]
pub struct Skill {
    pub id: SkillID,
    pub name: String,
    pub description: String,
    pub kind: SkillKind,
    pub triggers: Vec<SkillTrigger>,
    /// 數字大者先執行
    pub priority: i32,
    pub max_usages: Option<u32>,
    pub cooldown_turns: Turn,
    /// 生效（開局或覺醒）時寫入擁有者的 RuleContext
    pub overrides: Vec<RuleOverride>,
    pub execute: ExecuteFn,
    pub can_use: Option<CanUseFn>,
}

impl fmt::Debug for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Skill")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("triggers", &self.triggers)
            .field("priority", &self.priority)
            .field("max_usages", &self.max_usages)
            .field("cooldown_turns", &self.cooldown_turns)
            .field("overrides", &self.overrides)
            .finish_non_exhaustive()
    }
}

impl Skill {
    pub fn new(id: &str, name: &str, kind: SkillKind, execute: ExecuteFn) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            kind,
            triggers: Vec::new(),
            priority: 0,
            max_usages: None,
            cooldown_turns: 0,
            overrides: Vec::new(),
            execute,
            can_use: None,
        }
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = text.to_string();
        self
    }

    pub fn triggers(mut self, triggers: &[SkillTrigger]) -> Self {
        self.triggers = triggers.to_vec();
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn max_usages(mut self, max: u32) -> Self {
        self.max_usages = Some(max);
        self
    }

    pub fn cooldown(mut self, turns: Turn) -> Self {
        self.cooldown_turns = turns;
        self
    }

    pub fn overrides(mut self, overrides: &[RuleOverride]) -> Self {
        self.overrides = overrides.to_vec();
        self
    }

    pub fn can_use(mut self, check: CanUseFn) -> Self {
        self.can_use = Some(check);
        self
    }

    pub fn new_state(&self) -> SkillState {
        SkillState::new(self.max_usages, self.cooldown_turns)
    }

    /// 規則覆寫是否已生效：被動 / 鎖定一開局就生效，覺醒技要等覺醒
    pub fn rules_active(&self, state: &SkillState) -> bool {
        match self.kind {
            SkillKind::Passive | SkillKind::Locked => true,
            SkillKind::Awakening => state.is_awakened,
            SkillKind::Active | SkillKind::Limited => false,
        }
    }
}

/// 觸發點提供的事件資訊
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerEvent<'a> {
    /// BeforeMove 時為預計的走法，之後為已套用的走法
    pub current_move: Option<&'a Move>,
    pub captured: Option<&'a Piece>,
}

/// 技能執行時能看到的一切，全為唯讀
pub struct SkillContext<'a> {
    pub key: &'a SkillKey,
    pub trigger: SkillTrigger,
    pub state: &'a GameState,
    pub skill_state: &'a SkillState,
    pub config: &'a EngineConfig,
    pub event: TriggerEvent<'a>,
    pub params: &'a SkillParams,
}

impl SkillContext<'_> {
    pub fn owner(&self) -> Color {
        self.key.owner
    }

    /// 觸發的走法是擁有者自己走的
    pub fn is_own_move(&self) -> bool {
        self.event
            .current_move
            .is_some_and(|m| m.piece.color == self.owner())
    }

    pub fn invalid_params(&self, message: impl Into<String>) -> Error {
        Error::InvalidSkillParams {
            func: "SkillContext::invalid_params",
            message: format!("{}: {}", self.key, message.into()),
        }
    }
}

#[derive(
    Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SkillStatus {
    /// 生效並計入使用次數
    Fired,
    /// 生效但不計次（例如只記下待辦資料）
    Silent,
    /// 條件不符，什麼也沒做
    #[default]
    Skipped,
    /// 執行失敗，狀態不變
    Failed,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct SkillOutcome {
    pub status: SkillStatus,
    pub message: String,
    #[serde(default)]
    pub delta: StateDelta,
    /// 要求安裝的回合限制
    #[serde(default)]
    pub turn_state: Option<TurnState>,
    /// 取代技能的暫存資料；None 表示不動
    #[serde(default)]
    pub custom_data: Option<SkillData>,
}

impl SkillOutcome {
    fn with_status(status: SkillStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn fired(message: impl Into<String>) -> Self {
        Self::with_status(SkillStatus::Fired, message)
    }

    pub fn silent(message: impl Into<String>) -> Self {
        Self::with_status(SkillStatus::Silent, message)
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        Self::with_status(SkillStatus::Skipped, message)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::with_status(SkillStatus::Failed, message)
    }

    pub fn with_delta(mut self, delta: StateDelta) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_turn_state(mut self, turn_state: TurnState) -> Self {
        self.turn_state = Some(turn_state);
        self
    }

    pub fn with_data(mut self, data: SkillData) -> Self {
        self.custom_data = Some(data);
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, SkillStatus::Fired | SkillStatus::Silent)
    }
}

/// 一次觸發中某個技能的結果
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct FiredSkill {
    pub key: SkillKey,
    pub trigger: SkillTrigger,
    pub outcome: SkillOutcome,
}
