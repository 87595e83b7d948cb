//! 対局の進行
//!
//! プレイヤーの指し手・投了はチャネル経由で届き、`process_events` でまとめて棋譜へ反映する。
//! 棋譜を変更するのはこのセッションだけ。

use crossbeam_channel::{Receiver, Sender, unbounded};
use rshogi_kifu::{Color, Move, Record, RecordMetadataKey, SfenError, SpecialMove};

use crate::clock::{ClockEvent, GameClock};
use crate::player::{GamePlayer, Player, PlayerError, SearchHandlers, build_player};
use crate::settings::GameSetting;

const DATETIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error("invalid start position: {0}")]
    StartPosition(#[from] SfenError),
}

/// プレイヤーから届く通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    Move { color: Color, mv: Move },
    Resign { color: Color },
}

/// 対局の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// 手番の探索を要求していない
    Idle,
    /// `color` の指し手待ち
    Searching(Color),
    /// 終局
    Finished(SpecialMove),
}

#[derive(Debug)]
pub struct GameSession {
    setting: GameSetting,
    record: Record,
    black: GamePlayer,
    white: GamePlayer,
    clock: GameClock,
    state: SessionState,
    tx: Sender<PlayerEvent>,
    rx: Receiver<PlayerEvent>,
}

impl GameSession {
    /// 対局者を用意し、開始局面から始まる棋譜を作る
    pub fn setup(setting: &GameSetting) -> Result<Self, SessionError> {
        let position = setting.start_position()?;
        let black = build_player(&setting.black.uri)?;
        let white = build_player(&setting.white.uri)?;

        let mut record = Record::with_position(&position);
        let metadata = record.metadata_mut();
        metadata.set_standard_metadata(RecordMetadataKey::BlackName, setting.black.name.as_str());
        metadata.set_standard_metadata(RecordMetadataKey::WhiteName, setting.white.name.as_str());
        metadata.set_standard_metadata(
            RecordMetadataKey::StartDatetime,
            chrono::Local::now().format(DATETIME_FORMAT).to_string(),
        );
        metadata.set_standard_metadata(
            RecordMetadataKey::TimeLimit,
            format_time_limit(setting.time_limit.time_seconds, setting.time_limit.byoyomi),
        );

        log::info!(
            "game setup: {} ({}) vs {} ({})",
            setting.black.name,
            setting.black.uri,
            setting.white.name,
            setting.white.uri
        );
        let (tx, rx) = unbounded();
        Ok(Self {
            setting: setting.clone(),
            record,
            black,
            white,
            clock: GameClock::new(setting.time_limit),
            state: SessionState::Idle,
            tx,
            rx,
        })
    }

    pub fn setting(&self) -> &GameSetting {
        &self.setting
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn player_mut(&mut self, color: Color) -> &mut GamePlayer {
        match color {
            Color::Black => &mut self.black,
            Color::White => &mut self.white,
        }
    }

    /// 手番側のプレイヤーに探索を要求する。終局後や探索中なら false
    pub fn start_turn(&mut self) -> bool {
        if self.state != SessionState::Idle {
            return false;
        }
        let color = self.record.position().side_to_move();
        self.clock.start_timer(color);
        self.state = SessionState::Searching(color);
        self.request_search(color);
        true
    }

    fn request_search(&mut self, color: Color) {
        let (move_tx, resign_tx) = (self.tx.clone(), self.tx.clone());
        let handlers = SearchHandlers {
            on_move: Box::new(move |mv| {
                let _ = move_tx.send(PlayerEvent::Move { color, mv });
            }),
            on_resign: Box::new(move || {
                let _ = resign_tx.send(PlayerEvent::Resign { color });
            }),
        };
        let position = self.record.position().clone();
        self.player_mut(color).start_search(&position, handlers);
    }

    /// 届いている通知を棋譜へ反映し、反映した件数を返す
    pub fn process_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            let (SessionState::Searching(turn), color) = (self.state, event_color(&event)) else {
                log::warn!("dropped player event outside of search: {event:?}");
                continue;
            };
            if color != turn {
                log::warn!("dropped player event from the side not to move: {event:?}");
                continue;
            }
            match event {
                PlayerEvent::Move { mv, .. } => {
                    if !self.record.append(mv) {
                        // 時計は止めずに同じ手番で指し直させる
                        log::warn!("dropped illegal move from {color}: {}", mv.to_usi());
                        self.request_search(color);
                        continue;
                    }
                    let elapsed_ms = self.clock.clear_timer();
                    let id = self.record.current_id();
                    self.record.set_elapsed_ms(id, elapsed_ms);
                    self.clock.increment_time(color);
                    self.state = SessionState::Idle;
                }
                PlayerEvent::Resign { .. } => self.finish(SpecialMove::Resign),
            }
            applied += 1;
        }
        applied
    }

    /// 手番開始からの経過時間を時計へ反映する。時間切れなら終局する
    pub fn update_clock(&mut self, elapsed_ms: u64) -> Option<ClockEvent> {
        let event = self.clock.update(elapsed_ms);
        self.handle_clock_event(event)
    }

    /// 実時間で時計を進める
    pub fn update_clock_now(&mut self) -> Option<ClockEvent> {
        let event = self.clock.update_now();
        self.handle_clock_event(event)
    }

    fn handle_clock_event(&mut self, event: Option<ClockEvent>) -> Option<ClockEvent> {
        if event == Some(ClockEvent::Timeout) && matches!(self.state, SessionState::Searching(_)) {
            self.finish(SpecialMove::Timeout);
        }
        event
    }

    /// 中断する
    pub fn interrupt(&mut self) {
        if !matches!(self.state, SessionState::Finished(_)) {
            self.finish(SpecialMove::Interrupt);
        }
    }

    fn finish(&mut self, special: SpecialMove) {
        let elapsed_ms = self.clock.clear_timer();
        if self.record.append(special) {
            let id = self.record.current_id();
            self.record.set_elapsed_ms(id, elapsed_ms);
        }
        self.black.close();
        self.white.close();
        self.record.metadata_mut().set_standard_metadata(
            RecordMetadataKey::EndDatetime,
            chrono::Local::now().format(DATETIME_FORMAT).to_string(),
        );
        self.state = SessionState::Finished(special);
        log::info!("game finished: {}", special.name());
    }
}

fn event_color(event: &PlayerEvent) -> Color {
    match *event {
        PlayerEvent::Move { color, .. } | PlayerEvent::Resign { color } => color,
    }
}

/// "15分 秒読み30秒" のような持ち時間表記
fn format_time_limit(time_seconds: u64, byoyomi: u32) -> String {
    let mut ret = format!("{}分", time_seconds / 60);
    if time_seconds % 60 != 0 {
        ret += &format!("{}秒", time_seconds % 60);
    }
    if byoyomi != 0 {
        ret += &format!(" 秒読み{byoyomi}秒");
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_limit() {
        assert_eq!(format_time_limit(900, 30), "15分 秒読み30秒");
        assert_eq!(format_time_limit(90, 0), "1分30秒");
    }
}
