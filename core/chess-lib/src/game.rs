//! game.rs：
//! - 對局流程協調（GameManager）：開局、走子、手動技能。
//! - 每一步都在 GameState 的副本上進行，出錯時呼叫端的狀態與技能狀態都不變。
//! - 不負責房間、連線、持久化。
use crate::*;
use board::alias::Timestamp;
use board::component::{Color, Move, Piece, Position};
use board::{Board, IdGenerator, is_in_check, legal_destinations, validate_move};
use serde::{Deserialize, Serialize};
use skills_lib::*;
use tracing::{debug, info, instrument};

/// 回合開始技能改寫行棋方時，最多再補觸發幾輪
const MAX_TURN_START_ROUNDS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartReport {
    pub state: GameState,
    pub fired: Vec<FiredSkill>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReport {
    pub state: GameState,
    pub applied: Move,
    pub fired: Vec<FiredSkill>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillReport {
    pub state: GameState,
    pub outcome: SkillOutcome,
}

/// 一局一個，不共用
#[derive(Debug, Clone)]
pub struct GameManager {
    engine: SkillEngine,
    roster: HeroRoster,
}

impl GameManager {
    /// 使用內建英雄名冊
    pub fn new(config: EngineConfig) -> Result<Self, Error> {
        let roster = heroes::default_roster().map_err(|e| e.wrap("GameManager::new"))?;
        Ok(Self::with_roster(config, roster))
    }

    pub fn with_roster(config: EngineConfig, roster: HeroRoster) -> Self {
        Self {
            engine: SkillEngine::new(config),
            roster,
        }
    }

    pub fn engine(&self) -> &SkillEngine {
        &self.engine
    }

    /// 自訂技能用；註冊後以 [`GameManager::start`] 開局
    pub fn engine_mut(&mut self) -> &mut SkillEngine {
        &mut self.engine
    }

    pub fn roster(&self) -> &HeroRoster {
        &self.roster
    }

    /// 標準開局
    #[instrument(skip(self))]
    pub fn new_game(&mut self, red_hero: &str, black_hero: &str) -> Result<StartReport, Error> {
        let mut ids = IdGenerator::default();
        let board = Board::standard(&mut ids);
        self.setup(board, red_hero, black_hero)
            .map_err(|e| e.wrap("GameManager::new_game"))
    }

    /// 自訂盤面開局（殘局或測試）
    pub fn setup(
        &mut self,
        board: Board,
        red_hero: &str,
        black_hero: &str,
    ) -> Result<StartReport, Error> {
        let func = "GameManager::setup";

        let red = self.hero(red_hero, func)?;
        let black = self.hero(black_hero, func)?;
        let mut engine = SkillEngine::new(self.engine.config().clone());
        for (color, hero) in [(Color::Red, &red), (Color::Black, &black)] {
            for id in &hero.skills {
                let skill = heroes::skill_by_id(id).ok_or_else(|| Error::SkillNotFound {
                    func,
                    key: SkillKey::new(color, id.clone()).to_string(),
                })?;
                engine.register(color, skill);
            }
        }
        self.engine = engine;

        let state = GameState::new(
            board,
            Player::new("red", Color::Red, red),
            Player::new("black", Color::Black, black),
        );
        Ok(self.start(state))
    }

    /// 技能已註冊：重設技能狀態、寫入規則覆寫、觸發一次開局
    pub fn start(&mut self, mut state: GameState) -> StartReport {
        self.engine.reset();
        self.engine.apply_rules(&mut state);
        let mut fired =
            self.engine
                .trigger_skills(SkillTrigger::GameStart, &mut state, TriggerEvent::default());
        fired.extend(self.fire_turn_start(&mut state));
        info!(
            red = %state.player(Color::Red).hero.id,
            black = %state.player(Color::Black).hero.id,
            "game started"
        );
        StartReport { state, fired }
    }

    /// 走子；失敗時 `state` 與技能狀態都不變
    #[instrument(skip(self, state), fields(turn = state.turn, player = %state.current_player))]
    pub fn execute_move(
        &mut self,
        state: &GameState,
        request: &MoveRequest,
    ) -> Result<MoveReport, Error> {
        let snapshot = self.engine.snapshot();
        let result = self.try_move(state, request);
        if result.is_err() {
            self.engine.restore(snapshot);
        }
        result.map_err(|e| e.wrap("GameManager::execute_move"))
    }

    fn try_move(&mut self, state: &GameState, request: &MoveRequest) -> Result<MoveReport, Error> {
        let func = "GameManager::try_move";

        let piece = self.check_request(state, request)?;
        let mover = piece.color;
        let (from, to) = (request.from, request.to);
        let mut work = state.clone();
        let mut fired = Vec::new();

        let preview = Move {
            from,
            to,
            piece,
            captured: work.board.get_piece(to).map(|p| Piece {
                is_alive: false,
                ..*p
            }),
            timestamp: request
                .timestamp
                .unwrap_or(work.move_history.len() as Timestamp),
        };
        fired.extend(self.engine.trigger_skills(
            SkillTrigger::BeforeMove,
            &mut work,
            TriggerEvent {
                current_move: Some(&preview),
                captured: preview.captured.as_ref(),
            },
        ));

        // 走子前技能可能動過盤面
        let moving = validate_move(
            &work.board,
            &work.move_history,
            from,
            to,
            work.player(mover).rules.move_rules(),
        )
        .map_err(|reason| Error::IllegalMove { func, reason })?;
        if moving.id != piece.id {
            return Err(Error::PieceMismatch {
                func,
                declared: piece.id,
                actual: moving.id,
            });
        }

        let captured = work.board.move_piece(from, to);
        let applied = Move { captured, ..preview };
        work.move_history.push(applied.clone());
        work.sync_pieces();
        debug!(
            piece = %applied.piece.piece_type,
            ?from,
            ?to,
            captured = ?applied.captured.map(|p| p.piece_type),
            "move applied"
        );

        if let Some(victim) = applied.captured.as_ref() {
            fired.extend(self.engine.trigger_skills(
                SkillTrigger::OnCapture,
                &mut work,
                TriggerEvent {
                    current_move: Some(&applied),
                    captured: Some(victim),
                },
            ));
        }
        let event = TriggerEvent {
            current_move: Some(&applied),
            captured: applied.captured.as_ref(),
        };
        let reactions_from = fired.len();
        fired.extend(
            self.engine
                .trigger_skills(SkillTrigger::AfterMove, &mut work, event),
        );
        let opponent = mover.opponent();
        if is_in_check(&work.board, opponent, work.player(mover).rules.move_rules()) {
            fired.extend(
                self.engine
                    .trigger_skills(SkillTrigger::OnCheck, &mut work, event),
            );
        }

        if self.ends_on_king_capture(&mut work) {
            return Ok(MoveReport {
                state: work,
                applied,
                fired,
            });
        }

        let requested = fired[reactions_from..]
            .iter()
            .filter(|f| f.outcome.is_success())
            .find_map(|f| f.outcome.turn_state.clone());
        let mut keep_turn = resolve_turn_state(&mut work, requested);
        if keep_turn && !has_restricted_move(&work, mover) {
            debug!("turn state dropped, no legal move left");
            work.turn_state = None;
            keep_turn = false;
        }
        if keep_turn {
            work.current_player = mover;
        } else {
            work.current_player = opponent;
            work.turn += 1;
        }
        fired.extend(self.fire_turn_start(&mut work));
        self.ends_on_king_capture(&mut work);

        Ok(MoveReport {
            state: work,
            applied,
            fired,
        })
    }

    /// 走子前檢查：對局狀態、棋子歸屬、客戶端宣告、回合限制、走法規則
    fn check_request(&self, state: &GameState, request: &MoveRequest) -> Result<Piece, Error> {
        let func = "GameManager::check_request";

        if state.is_finished() {
            return Err(Error::GameFinished { func });
        }
        let piece = *state
            .board
            .get_piece(request.from)
            .ok_or(Error::NoPieceAtPos {
                func,
                pos: request.from,
            })?;
        if piece.color != state.current_player {
            return Err(Error::NotYourPiece {
                func,
                piece_id: piece.id,
                owner: piece.color,
                color: state.current_player,
            });
        }
        if let Some(declared) = request.piece_id {
            if declared != piece.id {
                return Err(Error::PieceMismatch {
                    func,
                    declared,
                    actual: piece.id,
                });
            }
        }
        if let Some(declared) = request.captured_piece_id {
            let actual = state.board.get_piece(request.to).map(|p| p.id);
            if actual != Some(declared) {
                return Err(Error::CaptureMismatch {
                    func,
                    declared: Some(declared),
                    actual,
                });
            }
        }
        if let Some(turn_state) = &state.turn_state {
            turn_state
                .check(&piece)
                .map_err(|reason| Error::TurnRestricted { func, reason })?;
        }
        validate_move(
            &state.board,
            &state.move_history,
            request.from,
            request.to,
            state.player(piece.color).rules.move_rules(),
        )
        .map_err(|reason| Error::IllegalMove { func, reason })?;
        Ok(piece)
    }

    /// 手動發動技能；只有行棋方能發動，不消耗回合
    #[instrument(skip(self, state, params), fields(turn = state.turn))]
    pub fn use_skill(
        &mut self,
        state: &GameState,
        owner: Color,
        skill_id: &str,
        params: &SkillParams,
    ) -> Result<SkillReport, Error> {
        let func = "GameManager::use_skill";

        if state.is_finished() {
            return Err(Error::GameFinished { func });
        }
        if owner != state.current_player {
            return Err(Error::NotYourTurn {
                func,
                expected: state.current_player,
                actual: owner,
            });
        }
        let key = SkillKey::new(owner, skill_id);
        let skill = self.engine.skill(&key).ok_or_else(|| Error::SkillNotFound {
            func,
            key: key.to_string(),
        })?;
        if !skill.triggers.contains(&SkillTrigger::Manual) {
            return Err(Error::SkillUnavailable {
                func,
                key: key.to_string(),
                reason: "不能手動發動".to_string(),
            });
        }

        let mut work = state.clone();
        let outcome = self
            .engine
            .use_skill(&key, &mut work, params)
            .map_err(|e| e.wrap(func))?;
        if !outcome.is_success() {
            return Err(Error::SkillFailed {
                func,
                key: key.to_string(),
                message: outcome.message,
            });
        }
        self.ends_on_king_capture(&mut work);
        info!(skill = %key, message = %outcome.message, "skill used");
        Ok(SkillReport {
            state: work,
            outcome,
        })
    }

    /// 某格棋子目前可走的所有落點（含回合限制）
    pub fn legal_moves(&self, state: &GameState, from: Position) -> Vec<Position> {
        let Some(piece) = state.board.get_piece(from) else {
            return Vec::new();
        };
        if state.is_finished() || piece.color != state.current_player {
            return Vec::new();
        }
        if state
            .turn_state
            .as_ref()
            .is_some_and(|t| t.check(piece).is_err())
        {
            return Vec::new();
        }
        legal_destinations(
            &state.board,
            &state.move_history,
            from,
            state.player(piece.color).rules.move_rules(),
        )
    }

    fn hero(&self, id: &str, func: &'static str) -> Result<Hero, Error> {
        self.roster
            .get(id)
            .map(heroes::hero_from_def)
            .ok_or_else(|| Error::HeroNotFound {
                func,
                hero_id: id.to_string(),
            })
    }

    fn ends_on_king_capture(&self, work: &mut GameState) -> bool {
        if !self.engine.config().king_capture_ends_game {
            return false;
        }
        match work.refresh_phase() {
            Some(winner) => {
                info!(%winner, "game finished");
                true
            }
            None => false,
        }
    }

    /// 每一步之後對行棋方觸發回合開始（保留回合也算）。
    /// 技能若改寫行棋方（跳過回合），原本的回合限制作廢，對新的行棋方再觸發一次。
    fn fire_turn_start(&mut self, work: &mut GameState) -> Vec<FiredSkill> {
        let mut fired = Vec::new();
        for _ in 0..MAX_TURN_START_ROUNDS {
            let to_move = work.current_player;
            fired.extend(self.engine.trigger_skills(
                SkillTrigger::OnTurnStart,
                work,
                TriggerEvent::default(),
            ));
            if work.current_player == to_move {
                break;
            }
            work.turn += 1;
            work.turn_state = None;
            debug!(skipped = %to_move, "turn skipped");
        }
        fired
    }
}

/// 結算回合限制；回傳行棋方是否保留回合
fn resolve_turn_state(work: &mut GameState, requested: Option<TurnState>) -> bool {
    fn piece_alive(work: &GameState, t: &TurnState) -> bool {
        t.required_piece_id
            .is_none_or(|id| work.board.find_piece(id).is_some())
    }

    // 這一步走在限制之下：只遞減，本步的新請求一律不收
    if let Some(mut active) = work.turn_state.take() {
        active.remaining_moves = active.remaining_moves.saturating_sub(1);
        if active.remaining_moves > 0 && piece_alive(work, &active) {
            work.turn_state = Some(active);
            return true;
        }
        return false;
    }
    match requested {
        Some(next) if piece_alive(work, &next) => {
            debug!(phase = %next.phase, remaining = next.remaining_moves, "turn state installed");
            work.turn_state = Some(next);
            true
        }
        _ => false,
    }
}

/// 回合限制下是否還有任何合法走法
fn has_restricted_move(work: &GameState, color: Color) -> bool {
    let rules = work.player(color).rules.move_rules();
    work.board
        .pieces_of(color)
        .filter(|p| work.turn_state.as_ref().is_none_or(|t| t.check(p).is_ok()))
        .any(|p| {
            !legal_destinations(&work.board, &work.move_history, p.position, rules).is_empty()
        })
}
