//! 英雄技能目錄
//!
//! 名冊（哪位英雄有哪些技能）是資料，放在 data/heroes.toml；
//! 每個技能 ID 的行為是程式，依英雄分檔實作在這裡。
mod cao_cao;
mod lu_bu;
mod ma_chao;
mod sima_yi;
mod zhao_yun;
mod zhuge_liang;

use crate::*;
use board::RuleOverride;
use board::error::LoadError;
use skills_lib::*;

const DEFAULT_ROSTER: &str = include_str!("../../data/heroes.toml");

pub const SKILL_IDS: [&str; 14] = [
    "tieqi",
    "benxi",
    "longdan",
    "qijin",
    "yongjue",
    "bazhen",
    "jiedongfeng",
    "tuntian",
    "xietianzi",
    "feijiang",
    "wushuang",
    "duijue",
    "langgu",
    "guicai",
];

pub fn skill_by_id(id: &str) -> Option<Skill> {
    let skill = match id {
        "tieqi" => ma_chao::tieqi(),
        "benxi" => ma_chao::benxi(),
        "longdan" => zhao_yun::longdan(),
        "qijin" => zhao_yun::qijin(),
        "yongjue" => zhao_yun::yongjue(),
        "bazhen" => zhuge_liang::bazhen(),
        "jiedongfeng" => zhuge_liang::jiedongfeng(),
        "tuntian" => cao_cao::tuntian(),
        "xietianzi" => cao_cao::xietianzi(),
        "feijiang" => lu_bu::feijiang(),
        "wushuang" => lu_bu::wushuang(),
        "duijue" => lu_bu::duijue(),
        "langgu" => sima_yi::langgu(),
        "guicai" => sima_yi::guicai(),
        _ => return None,
    };
    Some(skill)
}

/// 解析名冊並確認每個技能 ID 都有實作
pub fn roster_from_toml(data: &str) -> Result<HeroRoster, Error> {
    let func = "roster_from_toml";

    let roster: HeroRoster = toml::from_str(data).map_err(|e| Error::Load {
        func,
        source: LoadError::DeserializeError {
            format: "toml".to_string(),
            reason: e.to_string(),
        }
        .into(),
    })?;
    for hero in &roster.heroes {
        if let Some(missing) = hero.skills.iter().find(|id| skill_by_id(id).is_none()) {
            return Err(Error::Load {
                func,
                source: LoadError::ParseError(format!(
                    "英雄 {} 的技能 {} 沒有實作",
                    hero.id, missing
                ))
                .into(),
            });
        }
    }
    Ok(roster)
}

pub fn default_roster() -> Result<HeroRoster, Error> {
    roster_from_toml(DEFAULT_ROSTER)
}

pub fn hero_from_def(def: &HeroDef) -> Hero {
    Hero {
        id: def.id.clone(),
        name: def.name.clone(),
        skills: def.skills.clone(),
        awakened: false,
    }
}

/// 只做規則覆寫的技能共用：開局時再寫一次覆寫並公告
fn enable_rules(ctx: &SkillContext<'_>, rules: &[RuleOverride], message: &str) -> SkillOutcome {
    let delta = rules
        .iter()
        .map(|rule| StateChange::EnableRule {
            color: ctx.owner(),
            rule: *rule,
        })
        .collect();
    SkillOutcome::fired(message).with_delta(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_default_roster_is_complete() {
        let roster = default_roster().unwrap();
        assert_eq!(roster.heroes.len(), 6);
        let listed: BTreeSet<&str> = roster
            .heroes
            .iter()
            .flat_map(|h| h.skills.iter().map(|s| s.as_str()))
            .collect();
        let known: BTreeSet<&str> = SKILL_IDS.into_iter().collect();
        assert_eq!(listed, known);
    }

    #[test]
    fn test_skill_ids_match_definitions() {
        for id in SKILL_IDS {
            let skill = skill_by_id(id).unwrap();
            assert_eq!(skill.id, id);
            assert!(!skill.triggers.is_empty(), "{} has no trigger", id);
        }
        assert!(skill_by_id("nope").is_none());
    }

    #[test]
    fn test_unknown_skill_in_roster() {
        let data = r#"
[[heroes]]
id = "x"
name = "x"
skills = ["tieqi", "missing"]
        "#;
        let err = roster_from_toml(data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert!(err.to_string().contains("missing"));
    }
}
