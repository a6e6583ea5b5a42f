//! engine.rs：
//! - 技能引擎：註冊、規則覆寫、觸發分派、手動施放、覺醒與執行期狀態。
//! - 每個 GameManager 擁有一個引擎，沒有全域註冊表。
//! - 技能回傳 Err 或 panic 都只會變成失敗結果，不會往外傳。
use crate::*;
use board::component::Color;
use serde::{Deserialize, Serialize};
use skills_lib::*;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone)]
struct Registration {
    skill: Skill,
    triggers: Vec<SkillTrigger>,
    priority: i32,
    /// 同優先度時依註冊順序
    order: usize,
}

/// 可還原的執行期狀態快照
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct SkillStates(BTreeMap<SkillKey, SkillState>);

#[derive(Debug, Clone, Default)]
pub struct SkillEngine {
    registry: BTreeMap<SkillKey, Registration>,
    states: SkillStates,
    config: EngineConfig,
    next_order: usize,
}

impl SkillEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 以技能自帶的觸發點與優先度註冊
    pub fn register(&mut self, owner: Color, skill: Skill) -> SkillKey {
        let triggers = skill.triggers.clone();
        let priority = skill.priority;
        self.register_skill(owner, skill, &triggers, priority)
    }

    /// 重複註冊會覆蓋定義並重設狀態
    pub fn register_skill(
        &mut self,
        owner: Color,
        skill: Skill,
        triggers: &[SkillTrigger],
        priority: i32,
    ) -> SkillKey {
        let key = SkillKey::new(owner, skill.id.clone());
        self.states.0.insert(key.clone(), skill.new_state());
        self.registry.insert(
            key.clone(),
            Registration {
                skill,
                triggers: triggers.to_vec(),
                priority,
                order: self.next_order,
            },
        );
        self.next_order += 1;
        key
    }

    pub fn skill(&self, key: &SkillKey) -> Option<&Skill> {
        self.registry.get(key).map(|r| &r.skill)
    }

    pub fn state(&self, key: &SkillKey) -> Option<&SkillState> {
        self.states.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SkillKey> {
        self.registry.keys()
    }

    pub fn snapshot(&self) -> SkillStates {
        self.states.clone()
    }

    pub fn restore(&mut self, states: SkillStates) {
        self.states = states;
    }

    /// 新局：所有狀態回到初始值
    pub fn reset(&mut self) {
        for state in self.states.0.values_mut() {
            state.reset();
        }
    }

    /// 將已生效技能的規則覆寫寫入各自擁有者的 RuleContext
    pub fn apply_rules(&self, state: &mut GameState) {
        for (key, reg) in &self.registry {
            let Some(skill_state) = self.states.0.get(key) else {
                continue;
            };
            if !reg.skill.rules_active(skill_state) {
                continue;
            }
            let rules = &mut state.player_mut(key.owner).rules;
            for rule in &reg.skill.overrides {
                rules.enable(*rule);
            }
        }
    }

    /// 覺醒；單向，非覺醒技或已覺醒回傳 false
    pub fn awaken_skill(&mut self, key: &SkillKey, state: &mut GameState) -> bool {
        let Some(reg) = self.registry.get(key) else {
            return false;
        };
        let Some(skill_state) = self.states.0.get_mut(key) else {
            return false;
        };
        if !skill_state.awaken(reg.skill.kind) {
            return false;
        }
        let player = state.player_mut(key.owner);
        player.hero.awakened = true;
        for rule in &reg.skill.overrides {
            player.rules.enable(*rule);
        }
        info!(skill = %key, "skill awakened");
        true
    }

    /// 手動施放前的檢查
    pub fn check_skill(
        &self,
        key: &SkillKey,
        state: &GameState,
        params: &SkillParams,
    ) -> Result<(), Error> {
        let func = "SkillEngine::check_skill";

        let (reg, skill_state) = self.lookup(key, func)?;
        skill_state
            .check_available(reg.skill.kind, state.turn)
            .map_err(|reason| Error::SkillUnavailable {
                func,
                key: key.to_string(),
                reason: reason.to_string(),
            })?;
        if let Some(can_use) = reg.skill.can_use {
            let ctx = self.context(
                key,
                SkillTrigger::Manual,
                state,
                skill_state,
                TriggerEvent::default(),
                params,
            );
            if !can_use(&ctx) {
                return Err(Error::SkillUnavailable {
                    func,
                    key: key.to_string(),
                    reason: "條件不符".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn can_use_skill(&self, key: &SkillKey, state: &GameState) -> bool {
        self.check_skill(key, state, &SkillParams::default()).is_ok()
    }

    /// 手動施放；技能本身失敗時回傳 Ok(失敗結果)，狀態不變
    pub fn use_skill(
        &mut self,
        key: &SkillKey,
        state: &mut GameState,
        params: &SkillParams,
    ) -> Result<SkillOutcome, Error> {
        self.check_skill(key, state, params)
            .map_err(|e| e.wrap("SkillEngine::use_skill"))?;
        let outcome = self.run(key, SkillTrigger::Manual, state, TriggerEvent::default(), params);
        Ok(self.commit(key, SkillTrigger::Manual, outcome, state))
    }

    /// 依優先度執行所有該觸發點的技能；每個技能看得到前一個的效果
    pub fn trigger_skills(
        &mut self,
        trigger: SkillTrigger,
        state: &mut GameState,
        event: TriggerEvent<'_>,
    ) -> Vec<FiredSkill> {
        let mut queue: Vec<(&SkillKey, &Registration)> = self
            .registry
            .iter()
            .filter(|(_, reg)| reg.triggers.contains(&trigger))
            .collect();
        queue.sort_by(|(_, a), (_, b)| b.priority.cmp(&a.priority).then(a.order.cmp(&b.order)));
        let keys: Vec<SkillKey> = queue.into_iter().map(|(k, _)| k.clone()).collect();

        let params = SkillParams::default();
        let mut fired = Vec::new();
        for key in keys {
            let permitted = match (self.registry.get(&key), self.states.0.get(&key)) {
                (Some(reg), Some(skill_state)) => skill_state.permits_trigger(reg.skill.kind),
                _ => false,
            };
            if !permitted {
                continue;
            }
            let outcome = self.run(&key, trigger, state, event, &params);
            let outcome = self.commit(&key, trigger, outcome, state);
            if outcome.status == SkillStatus::Skipped {
                continue;
            }
            fired.push(FiredSkill {
                key,
                trigger,
                outcome,
            });
        }
        fired
    }

    fn lookup(
        &self,
        key: &SkillKey,
        func: &'static str,
    ) -> Result<(&Registration, &SkillState), Error> {
        match (self.registry.get(key), self.states.0.get(key)) {
            (Some(reg), Some(state)) => Ok((reg, state)),
            _ => Err(Error::SkillNotFound {
                func,
                key: key.to_string(),
            }),
        }
    }

    fn context<'a>(
        &'a self,
        key: &'a SkillKey,
        trigger: SkillTrigger,
        state: &'a GameState,
        skill_state: &'a SkillState,
        event: TriggerEvent<'a>,
        params: &'a SkillParams,
    ) -> SkillContext<'a> {
        SkillContext {
            key,
            trigger,
            state,
            skill_state,
            config: &self.config,
            event,
            params,
        }
    }

    /// 執行技能函式，Err 與 panic 都收斂為失敗結果
    fn run(
        &self,
        key: &SkillKey,
        trigger: SkillTrigger,
        state: &GameState,
        event: TriggerEvent<'_>,
        params: &SkillParams,
    ) -> SkillOutcome {
        let Ok((reg, skill_state)) = self.lookup(key, "SkillEngine::run") else {
            return SkillOutcome::failed(format!("skill {} is not registered", key));
        };
        let ctx = self.context(key, trigger, state, skill_state, event, params);
        let execute = reg.skill.execute;
        match catch_unwind(AssertUnwindSafe(|| execute(&ctx))) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                warn!(skill = %key, %trigger, error = %err, "skill returned an error");
                SkillOutcome::failed(err.to_string())
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!(skill = %key, %trigger, %message, "skill panicked");
                SkillOutcome::failed(format!("skill panicked: {}", message))
            }
        }
    }

    /// 套用成功結果：狀態變更、暫存資料、覺醒與使用紀錄
    fn commit(
        &mut self,
        key: &SkillKey,
        trigger: SkillTrigger,
        mut outcome: SkillOutcome,
        state: &mut GameState,
    ) -> SkillOutcome {
        if outcome.status == SkillStatus::Failed {
            return outcome;
        }
        let effects = match apply_delta(state, &outcome.delta, self.config.occupancy_policy) {
            Ok(effects) => effects,
            Err(err) => {
                warn!(skill = %key, %trigger, error = %err, "skill effect rejected");
                return SkillOutcome::failed(err.to_string());
            }
        };
        if let Some(skill_state) = self.states.0.get_mut(key) {
            if let Some(data) = outcome.custom_data.clone() {
                skill_state.custom_data = data;
            }
        }
        if outcome.status == SkillStatus::Skipped {
            trace!(skill = %key, %trigger, message = %outcome.message, "skill skipped");
            return outcome;
        }
        for target in &effects.awaken {
            self.awaken_skill(target, state);
        }
        if outcome.status == SkillStatus::Fired {
            let kind = self.registry.get(key).map(|r| r.skill.kind);
            if let (Some(kind), Some(skill_state)) = (kind, self.states.0.get_mut(key)) {
                skill_state.record_use(kind, state.turn);
            }
        }
        // 零步的回合限制等於沒有
        if outcome.turn_state.as_ref().is_some_and(|t| t.remaining_moves == 0) {
            outcome.turn_state = None;
        }
        debug!(
            skill = %key,
            %trigger,
            status = %outcome.status,
            message = %outcome.message,
            "skill resolved"
        );
        outcome
    }
}
