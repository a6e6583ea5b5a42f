//! 諸葛亮：八陣、借東風
use super::enable_rules;
use crate::*;
use board::RuleOverride;
use board::component::PieceType;
use skills_lib::*;

const BAZHEN_RULES: [RuleOverride; 2] = [
    RuleOverride::ElephantIgnoreHeartBlock,
    RuleOverride::ElephantCanCrossRiver,
];

pub fn bazhen() -> Skill {
    Skill::new("bazhen", "八陣", SkillKind::Passive, bazhen_execute)
        .description("象不受塞象眼限制，且可過河")
        .triggers(&[SkillTrigger::GameStart])
        .overrides(&BAZHEN_RULES)
}

fn bazhen_execute(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    Ok(enable_rules(ctx, &BAZHEN_RULES, "八陣：象行無阻"))
}

pub fn jiedongfeng() -> Skill {
    Skill::new("jiedongfeng", "借東風", SkillKind::Active, jiedongfeng_execute)
        .description("交換兩枚己方非將帥棋子的位置，冷卻 3 回合")
        .triggers(&[SkillTrigger::Manual])
        .cooldown(3)
}

/// 參數：`piece_ids` 兩枚要交換的棋子
fn jiedongfeng_execute(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    let &[a, b] = ctx.params.piece_ids.as_slice() else {
        return Err(ctx.invalid_params("需要恰好兩枚棋子"));
    };
    if a == b {
        return Err(ctx.invalid_params("不能與自己交換"));
    }
    for id in [a, b] {
        let piece = ctx
            .state
            .board
            .find_piece(id)
            .ok_or_else(|| ctx.invalid_params(format!("棋子 {} 不在棋盤上", id)))?;
        if piece.color != ctx.owner() {
            return Err(ctx.invalid_params(format!("棋子 {} 不是己方", id)));
        }
        if piece.piece_type == PieceType::King {
            return Err(ctx.invalid_params("將帥不能交換"));
        }
    }
    Ok(SkillOutcome::fired("借東風：兩子換位")
        .with_delta(StateDelta::new().push(StateChange::Swap { a, b })))
}
