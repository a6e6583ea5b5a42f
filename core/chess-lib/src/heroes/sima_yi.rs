//! 司馬懿：狼顧、鬼才
//!
//! 兩個技能都跨觸發點：先把待辦記在 `SkillData`，回合開始時再兌現。
use crate::*;
use board::component::PieceType;
use skills_lib::*;

pub fn langgu() -> Skill {
    Skill::new("langgu", "狼顧", SkillKind::Passive, langgu_execute)
        .description("己方非將帥棋子被吃時記下，己方下回合開始時在吃子者離開的格子復活，每局兩次")
        .triggers(&[SkillTrigger::BeforeMove, SkillTrigger::OnTurnStart])
        .priority(3)
        .max_usages(2)
}

fn langgu_execute(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    match ctx.trigger {
        SkillTrigger::BeforeMove => remember_victim(ctx),
        SkillTrigger::OnTurnStart => revive_victim(ctx),
        _ => Ok(SkillOutcome::skipped("不處理此觸發")),
    }
}

fn remember_victim(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    let Some(mv) = ctx.event.current_move else {
        return Ok(SkillOutcome::skipped("沒有走法"));
    };
    let Some(victim) = mv.captured.filter(|p| p.color == ctx.owner()) else {
        return Ok(SkillOutcome::skipped("沒有己方棋子被吃"));
    };
    if victim.piece_type == PieceType::King {
        return Ok(SkillOutcome::skipped("將帥不能復活"));
    }
    if ctx.skill_state.custom_data.is_armed() {
        return Ok(SkillOutcome::skipped("已有待復活的棋子"));
    }
    Ok(SkillOutcome::silent(format!("狼顧：記下 {}", victim.piece_type)).with_data(
        SkillData::Langgu {
            piece_id: victim.id,
            at: mv.from,
        },
    ))
}

fn revive_victim(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    let SkillData::Langgu { piece_id, at } = ctx.skill_state.custom_data else {
        return Ok(SkillOutcome::skipped("沒有待復活的棋子"));
    };
    if ctx.state.current_player != ctx.owner() {
        return Ok(SkillOutcome::skipped("不是己方回合"));
    }
    if ctx.state.board.get_piece(at).is_some() {
        return Ok(SkillOutcome::skipped("該格被佔，放棄復活").with_data(SkillData::Empty));
    }
    Ok(SkillOutcome::fired("狼顧：棋子回到陣中")
        .with_delta(StateDelta::new().push(StateChange::Revive { piece_id, at }))
        .with_data(SkillData::Empty))
}

pub fn guicai() -> Skill {
    Skill::new("guicai", "鬼才", SkillKind::Limited, guicai_execute)
        .description("每局一次，跳過對手的下一回合")
        .triggers(&[SkillTrigger::Manual, SkillTrigger::OnTurnStart])
}

fn guicai_execute(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    let owner = ctx.owner();
    match (ctx.trigger, &ctx.skill_state.custom_data) {
        (SkillTrigger::Manual, _) => Ok(SkillOutcome::fired("鬼才：對手下一回合被跳過")
            .with_data(SkillData::Guicai {
                victim: owner.opponent(),
            })),
        (SkillTrigger::OnTurnStart, SkillData::Guicai { victim })
            if ctx.state.current_player == *victim =>
        {
            Ok(SkillOutcome::silent(format!("鬼才：{} 的回合被跳過", victim))
                .with_delta(StateDelta::new().push(StateChange::SetCurrentPlayer { color: owner }))
                .with_data(SkillData::Empty))
        }
        _ => Ok(SkillOutcome::skipped("等待對手回合")),
    }
}
