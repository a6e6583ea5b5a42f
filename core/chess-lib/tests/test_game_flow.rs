mod test_helpers;

use board::component::{Color, PieceType, Position};
use board::{IllegalMove, RuleOverride};
use chess_lib::*;
use skills_lib::*;
use test_helpers::*;

const KINGS_ONLY: &str = r#"
. . . k . . . . .
. . . . . . . . .
. . . . . . . . .
. . . . . . . . .
. . . . . . . . .
. . . . . . . . .
. . . . . . . . .
. . . . . . . . .
. . . . . . . . .
R . . . K . . . .
"#;

// 測試 1：標準開局，開局技能只觸發一次
#[test]
fn test_new_game_fires_game_start_once() {
    let mut manager = manager();
    let report = manager.new_game("ma_chao", "zhao_yun").unwrap();
    let state = report.state;

    assert_eq!(state.board.get_all_pieces().len(), 32);
    assert_eq!(state.current_player, Color::Red);
    assert_eq!(state.turn, 0);
    assert_eq!(state.game_phase, GamePhase::Playing);
    assert!(state.player(Color::Red).rules.is_enabled(RuleOverride::HorseIgnoreLegBlock));
    assert!(
        state
            .player(Color::Black)
            .rules
            .is_enabled(RuleOverride::PawnCanCrossRiverDirectly)
    );
    assert!(!state.player(Color::Black).rules.is_enabled(RuleOverride::HorseIgnoreLegBlock));

    let game_start: Vec<&str> = report
        .fired
        .iter()
        .filter(|f| f.trigger == SkillTrigger::GameStart)
        .map(|f| f.key.id.as_str())
        .collect();
    assert_eq!(game_start, vec!["tieqi", "longdan"]);

    let tieqi = SkillKey::new(Color::Red, "tieqi");
    let report = play(&mut manager, &state, (1, 9), (2, 7));
    assert_eq!(report.state.current_player, Color::Black);
    assert_eq!(report.state.turn, 1);
    assert_eq!(report.state.move_history.len(), 1);
    assert!(
        report
            .fired
            .iter()
            .all(|f| f.trigger != SkillTrigger::GameStart)
    );
    assert_eq!(manager.engine().state(&tieqi).unwrap().usage_count, 1);
}

#[test]
fn test_unknown_hero() {
    let mut manager = manager();
    let err = manager.new_game("ma_chao", "nobody").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HeroNotFound);
}

// 測試 2：各種拒絕，呼叫端狀態不變
#[test]
fn test_rejections() {
    let mut manager = manager();
    let state = manager.new_game(PLAIN, PLAIN).unwrap().state;
    let before = state.clone();

    let err = manager.execute_move(&state, &request((0, 0), (0, 1))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotYourPiece);

    let err = manager.execute_move(&state, &request((4, 4), (4, 3))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoPieceAtPos);

    let err = manager.execute_move(&state, &request((0, 9), (1, 8))).unwrap_err();
    assert!(matches!(
        root_error(&err),
        Error::IllegalMove {
            reason: IllegalMove::BadShape { .. },
            ..
        }
    ));

    // 炮隔著黑炮打馬，宣告錯的被吃棋子
    let horse = piece_at(&state, 1, 0);
    let mut req = request((1, 7), (1, 0));
    req.captured_piece_id = Some(horse.id + 1);
    let err = manager.execute_move(&state, &req).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CaptureMismatch);

    let mut req = request((1, 7), (1, 0));
    req.piece_id = Some(horse.id);
    let err = manager.execute_move(&state, &req).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PieceMismatch);

    assert_eq!(state, before);

    let mut req = request((1, 7), (1, 0));
    req.captured_piece_id = Some(horse.id);
    let report = manager.execute_move(&state, &req).unwrap();
    assert_eq!(report.applied.captured.unwrap().id, horse.id);
    assert!(!report.state.player(Color::Black).piece(horse.id).unwrap().is_alive);
}

#[test]
fn test_error_report() {
    let mut manager = manager();
    let state = manager.new_game(PLAIN, PLAIN).unwrap().state;
    let err = manager.execute_move(&state, &request((0, 0), (0, 1))).unwrap_err();
    let report = err.report([("room_id", "42")]);
    assert_eq!(report.kind.to_string(), "not_your_piece");
    assert!(!report.message.contains("execute_move"));
    assert_eq!(report.context["room_id"], "42");
}

// 測試 3：吃掉將帥即結束
#[test]
fn test_king_capture_ends_game() {
    let ascii = r#"
. . . . k . . . .
. . . . . . . . .
. . . . . . . . .
. . . . . . . . .
. . . . . . . . .
. . . . R . . . .
. . . . . . . . .
. . . . . . . . .
. . . . . . . . .
. . . K . . . . .
"#;
    let (mut manager, state) = start(ascii, PLAIN, PLAIN);
    let report = play(&mut manager, &state, (4, 5), (4, 0));
    let state = report.state;
    assert_eq!(
        state.game_phase,
        GamePhase::Finished { winner: Color::Red }
    );
    assert_eq!(report.applied.captured.unwrap().piece_type, PieceType::King);

    let err = manager.execute_move(&state, &request((3, 9), (3, 8))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::GameFinished);
    let err = manager
        .use_skill(&state, Color::Red, "qijin", &SkillParams::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::GameFinished);
}

// 測試 4：ForceMove 2，走兩步後才換邊
#[test]
fn test_force_move_decrements() {
    let (mut manager, mut state) = start(KINGS_ONLY, PLAIN, PLAIN);
    let king = piece_at(&state, 4, 9);
    state.turn_state = Some(TurnState::force_move(king.id, 2));

    let err = manager.execute_move(&state, &request((0, 9), (0, 8))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TurnRestricted);

    let state = play(&mut manager, &state, (4, 9), (4, 8)).state;
    assert_eq!(state.current_player, Color::Red);
    assert_eq!(state.turn_state.as_ref().unwrap().remaining_moves, 1);
    assert_eq!(state.turn, 0);

    let state = play(&mut manager, &state, (4, 8), (4, 7)).state;
    assert!(state.turn_state.is_none());
    assert_eq!(state.current_player, Color::Black);
    assert_eq!(state.turn, 1);
}

fn tally(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    let color = ctx.state.current_player;
    Ok(SkillOutcome::fired("tally")
        .with_delta(StateDelta::new().push(StateChange::AddMarkers { color, amount: 1 })))
}

// 保留回合時也要觸發回合開始
#[test]
fn test_turn_start_fires_for_retained_player() {
    let (mut manager, state) = start(KINGS_ONLY, PLAIN, PLAIN);
    manager.engine_mut().register(
        Color::Black,
        Skill::new("tally", "tally", SkillKind::Passive, tally)
            .triggers(&[SkillTrigger::OnTurnStart]),
    );
    let mut state = manager.start(state).state;
    assert_eq!(state.markers_of(Color::Red), 1);

    let king = piece_at(&state, 4, 9);
    state.turn_state = Some(TurnState::force_move(king.id, 2));
    let report = play(&mut manager, &state, (4, 9), (4, 8));
    assert_eq!(report.state.current_player, Color::Red);
    assert!(
        report
            .fired
            .iter()
            .any(|f| f.key.id == "tally" && f.trigger == SkillTrigger::OnTurnStart)
    );
    assert_eq!(report.state.markers_of(Color::Red), 2);

    let state = play(&mut manager, &report.state, (4, 8), (4, 7)).state;
    assert_eq!(state.current_player, Color::Black);
    assert_eq!(state.markers_of(Color::Red), 2);
    assert_eq!(state.markers_of(Color::Black), 1);
}

#[test]
fn test_extra_move_bans_piece_types() {
    let (mut manager, mut state) = start(KINGS_ONLY, PLAIN, PLAIN);
    state.turn_state = Some(TurnState::extra_move(1, &[PieceType::Chariot]));

    assert!(manager.legal_moves(&state, Position::new(0, 9)).is_empty());
    let err = manager.execute_move(&state, &request((0, 9), (0, 5))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TurnRestricted);

    let state = play(&mut manager, &state, (4, 9), (3, 9)).state;
    assert!(state.turn_state.is_none());
    assert_eq!(state.current_player, Color::Black);
}

#[test]
fn test_legal_moves() {
    let mut manager = manager();
    let state = manager.new_game(PLAIN, PLAIN).unwrap().state;
    let mut moves = manager.legal_moves(&state, Position::new(1, 9));
    moves.sort();
    assert_eq!(moves, vec![Position::new(0, 7), Position::new(2, 7)]);
    // 不是行棋方
    assert!(manager.legal_moves(&state, Position::new(1, 0)).is_empty());
    assert!(manager.legal_moves(&state, Position::new(4, 4)).is_empty());
}

// 測試 5：整包狀態 JSON 來回後可繼續對局
#[test]
fn test_json_round_trip() {
    let mut manager = manager();
    let state = manager.new_game("sima_yi", "cao_cao").unwrap().state;
    let state = play(&mut manager, &state, (1, 7), (4, 7)).state;

    let json = serde_json::to_string(&state).unwrap();
    let restored: GameState = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, state);
    assert!(restored.id_generator().is_used(piece_at(&state, 4, 7).id));

    let report = play(&mut manager, &restored, (1, 2), (4, 2));
    assert_eq!(report.state.current_player, Color::Red);
}

fn snatch(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    let Some(mv) = ctx.event.current_move else {
        return Ok(SkillOutcome::skipped("no move"));
    };
    if ctx.is_own_move() {
        return Ok(SkillOutcome::skipped("own move"));
    }
    Ok(SkillOutcome::fired("snatch")
        .with_delta(StateDelta::new().push(StateChange::Remove { at: mv.from })))
}

// 測試 6：走子前技能讓走法失效，整步作廢，技能狀態也還原
#[test]
fn test_move_is_all_or_nothing() {
    let (mut manager, state) = start(KINGS_ONLY, PLAIN, PLAIN);
    let key = manager.engine_mut().register(
        Color::Black,
        Skill::new("snatch", "snatch", SkillKind::Passive, snatch)
            .triggers(&[SkillTrigger::BeforeMove]),
    );
    let state = manager.start(state).state;
    let before = state.clone();

    let err = manager.execute_move(&state, &request((0, 9), (0, 5))).unwrap_err();
    assert!(matches!(
        root_error(&err),
        Error::IllegalMove {
            reason: IllegalMove::NoPieceAtOrigin { .. },
            ..
        }
    ));
    assert_eq!(state, before);
    assert_eq!(manager.engine().state(&key).unwrap().usage_count, 0);
}

#[test]
fn test_manual_skill_requires_turn() {
    let mut manager = manager();
    let state = manager.new_game("zhuge_liang", "lu_bu").unwrap().state;
    let err = manager
        .use_skill(&state, Color::Black, "duijue", &SkillParams::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotYourTurn);

    let err = manager
        .use_skill(&state, Color::Red, "bazhen", &SkillParams::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SkillUnavailable);

    let err = manager
        .use_skill(&state, Color::Red, "duijue", &SkillParams::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SkillNotFound);
}
