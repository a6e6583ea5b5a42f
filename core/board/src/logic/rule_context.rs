//! 每位玩家的走法規則覆寫
//!
//! 預設全部關閉。唯一的修改入口是 [`RuleContext::enable`]，
//! 沒有任何 API 可以把覆寫關回去，所以一局之內覆寫是單調的。

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// 單一規則覆寫開關
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RuleOverride {
    KingCanLeavePalace,
    AdvisorCanLeavePalace,
    AdvisorCanCrossRiver,
    ElephantIgnoreHeartBlock,
    ElephantCanCrossRiver,
    HorseIgnoreLegBlock,
    HorseLimitConsecutiveJumps,
    PawnCanCrossRiverDirectly,
    PawnCanMoveTwoStepsAfterRiver,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KingRules {
    pub can_leave_palace: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorRules {
    pub can_leave_palace: bool,
    /// 只有在 `can_leave_palace` 時才有意義
    pub can_cross_river: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElephantRules {
    /// 忽略塞象眼
    pub ignore_heart_block: bool,
    pub can_cross_river: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorseRules {
    /// 忽略蹩馬腿
    pub ignore_leg_block: bool,
    /// 同一匹馬不可連續兩手都跳日字
    pub limit_consecutive_jumps: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChariotRules {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CannonRules {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PawnRules {
    /// 未過河的兵可一步直接過河
    pub can_cross_river_directly: bool,
    /// 過河後可走兩步（淨前進不超過一格）
    pub can_move_two_steps_after_river: bool,
}

/// 每個棋種一組覆寫
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRules {
    king: KingRules,
    advisor: AdvisorRules,
    elephant: ElephantRules,
    horse: HorseRules,
    chariot: ChariotRules,
    cannon: CannonRules,
    pawn: PawnRules,
}

impl MoveRules {
    pub fn king(&self) -> &KingRules {
        &self.king
    }

    pub fn advisor(&self) -> &AdvisorRules {
        &self.advisor
    }

    pub fn elephant(&self) -> &ElephantRules {
        &self.elephant
    }

    pub fn horse(&self) -> &HorseRules {
        &self.horse
    }

    pub fn chariot(&self) -> &ChariotRules {
        &self.chariot
    }

    pub fn cannon(&self) -> &CannonRules {
        &self.cannon
    }

    pub fn pawn(&self) -> &PawnRules {
        &self.pawn
    }

    fn flag_mut(&mut self, rule: RuleOverride) -> &mut bool {
        match rule {
            RuleOverride::KingCanLeavePalace => &mut self.king.can_leave_palace,
            RuleOverride::AdvisorCanLeavePalace => &mut self.advisor.can_leave_palace,
            RuleOverride::AdvisorCanCrossRiver => &mut self.advisor.can_cross_river,
            RuleOverride::ElephantIgnoreHeartBlock => &mut self.elephant.ignore_heart_block,
            RuleOverride::ElephantCanCrossRiver => &mut self.elephant.can_cross_river,
            RuleOverride::HorseIgnoreLegBlock => &mut self.horse.ignore_leg_block,
            RuleOverride::HorseLimitConsecutiveJumps => &mut self.horse.limit_consecutive_jumps,
            RuleOverride::PawnCanCrossRiverDirectly => &mut self.pawn.can_cross_river_directly,
            RuleOverride::PawnCanMoveTwoStepsAfterRiver => {
                &mut self.pawn.can_move_two_steps_after_river
            }
        }
    }

    pub fn is_enabled(&self, rule: RuleOverride) -> bool {
        match rule {
            RuleOverride::KingCanLeavePalace => self.king.can_leave_palace,
            RuleOverride::AdvisorCanLeavePalace => self.advisor.can_leave_palace,
            RuleOverride::AdvisorCanCrossRiver => self.advisor.can_cross_river,
            RuleOverride::ElephantIgnoreHeartBlock => self.elephant.ignore_heart_block,
            RuleOverride::ElephantCanCrossRiver => self.elephant.can_cross_river,
            RuleOverride::HorseIgnoreLegBlock => self.horse.ignore_leg_block,
            RuleOverride::HorseLimitConsecutiveJumps => self.horse.limit_consecutive_jumps,
            RuleOverride::PawnCanCrossRiverDirectly => self.pawn.can_cross_river_directly,
            RuleOverride::PawnCanMoveTwoStepsAfterRiver => {
                self.pawn.can_move_two_steps_after_river
            }
        }
    }
}

/// 玩家的規則上下文，每局重新產生，只被該玩家自己的技能修改
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleContext {
    move_rules: MoveRules,
}

impl RuleContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_rules(&self) -> &MoveRules {
        &self.move_rules
    }

    /// 打開覆寫；回傳是否原本為關閉
    pub fn enable(&mut self, rule: RuleOverride) -> bool {
        let flag = self.move_rules.flag_mut(rule);
        let changed = !*flag;
        *flag = true;
        changed
    }

    pub fn is_enabled(&self, rule: RuleOverride) -> bool {
        self.move_rules.is_enabled(rule)
    }

    /// 目前開啟的所有覆寫
    pub fn enabled(&self) -> Vec<RuleOverride> {
        RuleOverride::iter().filter(|r| self.is_enabled(*r)).collect()
    }
}

impl FromIterator<RuleOverride> for RuleContext {
    fn from_iter<I: IntoIterator<Item = RuleOverride>>(iter: I) -> Self {
        let mut ctx = RuleContext::new();
        for rule in iter {
            ctx.enable(rule);
        }
        ctx
    }
}
