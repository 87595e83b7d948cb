//! 対局者（人間・USIエンジン）
//!
//! どちらの実装も探索要求時に受け取ったハンドラを1度だけ呼び出して結果を返す。
//! 結果を `Record` へ反映するのは呼び出し側（`GameSession`）の役目。

use rshogi_kifu::{Move, Position};

use crate::uri;

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("unknown player uri: {0}")]
    UnknownUri(String),

    #[error("engine {0} is not launched")]
    NotLaunched(String),

    #[error("no search in progress")]
    NoSearch,

    #[error("invalid bestmove: {0}")]
    InvalidBestMove(String),
}

/// 探索結果の通知先
pub struct SearchHandlers {
    pub on_move: Box<dyn FnOnce(Move) + Send>,
    pub on_resign: Box<dyn FnOnce() + Send>,
}

impl std::fmt::Debug for SearchHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHandlers").finish_non_exhaustive()
    }
}

pub trait Player {
    /// 手番の探索を開始する。結果は `handlers` のどちらかで1度だけ通知される
    fn start_search(&mut self, position: &Position, handlers: SearchHandlers);

    /// 検討（結果を返さない探索）を開始する
    fn start_research(&mut self, position: &Position);

    fn close(&mut self);
}

/// 外部からの操作で手を指す人間のプレイヤー
#[derive(Debug, Default)]
pub struct HumanPlayer {
    handlers: Option<SearchHandlers>,
}

impl HumanPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 手番待ちか
    pub fn is_waiting(&self) -> bool {
        self.handlers.is_some()
    }

    /// 手を指す。手番待ちでなければ false
    pub fn do_move(&mut self, mv: Move) -> bool {
        match self.handlers.take() {
            Some(handlers) => {
                (handlers.on_move)(mv);
                true
            }
            None => false,
        }
    }

    /// 投了する。手番待ちでなければ false
    pub fn resign(&mut self) -> bool {
        match self.handlers.take() {
            Some(handlers) => {
                (handlers.on_resign)();
                true
            }
            None => false,
        }
    }
}

impl Player for HumanPlayer {
    fn start_search(&mut self, _: &Position, handlers: SearchHandlers) {
        self.handlers = Some(handlers);
    }

    fn start_research(&mut self, _: &Position) {}

    fn close(&mut self) {
        self.handlers = None;
    }
}

/// USIエンジンのプレイヤー
///
/// プロセス起動とプロトコル処理は持たず、`bestmove` の内容を `on_best_move` で受け取る。
#[derive(Debug)]
pub struct UsiPlayer {
    uri: String,
    launched: bool,
    search: Option<(Position, SearchHandlers)>,
}

impl UsiPlayer {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into(), launched: false, search: None }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn launch(&mut self) -> Result<(), PlayerError> {
        if !uri::is_usi_engine(&self.uri) {
            return Err(PlayerError::UnknownUri(self.uri.clone()));
        }
        self.launched = true;
        log::info!("launched engine {}", self.uri);
        Ok(())
    }

    pub fn is_launched(&self) -> bool {
        self.launched
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_some()
    }

    /// `bestmove` の指し手部分（"7g7f"、"resign"）を受け取り、ハンドラへ通知する
    pub fn on_best_move(&mut self, usi: &str) -> Result<(), PlayerError> {
        let (position, handlers) = self.search.take().ok_or(PlayerError::NoSearch)?;
        if usi == "resign" {
            (handlers.on_resign)();
            return Ok(());
        }
        match position.create_move_by_usi(usi) {
            Some(mv) => {
                (handlers.on_move)(mv);
                Ok(())
            }
            None => {
                // 探索は継続中として扱う
                self.search = Some((position, handlers));
                Err(PlayerError::InvalidBestMove(usi.to_string()))
            }
        }
    }
}

impl Player for UsiPlayer {
    fn start_search(&mut self, position: &Position, handlers: SearchHandlers) {
        if !self.launched {
            log::warn!("search requested before launch: {}", self.uri);
        }
        self.search = Some((position.clone(), handlers));
    }

    /// 手番の探索中は受け付けず、探索結果の通知先を残す
    fn start_research(&mut self, _: &Position) {
        if self.search.is_some() {
            log::warn!("research ignored while searching: {}", self.uri);
            return;
        }
        log::debug!("research started: {}", self.uri);
    }

    fn close(&mut self) {
        self.search = None;
        self.launched = false;
    }
}

/// 対局設定から作られるプレイヤー
#[derive(Debug)]
pub enum GamePlayer {
    Human(HumanPlayer),
    Usi(UsiPlayer),
}

impl GamePlayer {
    pub fn as_human_mut(&mut self) -> Option<&mut HumanPlayer> {
        match self {
            GamePlayer::Human(player) => Some(player),
            GamePlayer::Usi(_) => None,
        }
    }

    pub fn as_usi_mut(&mut self) -> Option<&mut UsiPlayer> {
        match self {
            GamePlayer::Human(_) => None,
            GamePlayer::Usi(player) => Some(player),
        }
    }
}

impl Player for GamePlayer {
    fn start_search(&mut self, position: &Position, handlers: SearchHandlers) {
        match self {
            GamePlayer::Human(player) => player.start_search(position, handlers),
            GamePlayer::Usi(player) => player.start_search(position, handlers),
        }
    }

    fn start_research(&mut self, position: &Position) {
        match self {
            GamePlayer::Human(player) => player.start_research(position),
            GamePlayer::Usi(player) => player.start_research(position),
        }
    }

    fn close(&mut self) {
        match self {
            GamePlayer::Human(player) => player.close(),
            GamePlayer::Usi(player) => player.close(),
        }
    }
}

/// URI からプレイヤーを作る。エンジンは起動済みの状態で返す
pub fn build_player(uri: &str) -> Result<GamePlayer, PlayerError> {
    if uri == uri::ES_HUMAN {
        Ok(GamePlayer::Human(HumanPlayer::new()))
    } else if uri::is_usi_engine(uri) {
        let mut player = UsiPlayer::new(uri);
        player.launch()?;
        Ok(GamePlayer::Usi(player))
    } else {
        Err(PlayerError::UnknownUri(uri.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn recording_handlers() -> (SearchHandlers, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (on_move_log, on_resign_log) = (Arc::clone(&log), Arc::clone(&log));
        let handlers = SearchHandlers {
            on_move: Box::new(move |mv| on_move_log.lock().unwrap().push(mv.to_usi())),
            on_resign: Box::new(move || on_resign_log.lock().unwrap().push("resign".into())),
        };
        (handlers, log)
    }

    #[test]
    fn test_human_player_fires_once() {
        let pos = Position::new();
        let mv = pos.create_move_by_usi("7g7f").unwrap();
        let mut player = HumanPlayer::new();
        assert!(!player.do_move(mv));

        let (handlers, log) = recording_handlers();
        player.start_search(&pos, handlers);
        assert!(player.is_waiting());
        assert!(player.do_move(mv));
        assert!(!player.resign());
        assert_eq!(*log.lock().unwrap(), vec!["7g7f"]);
    }

    #[test]
    fn test_usi_player_best_move() {
        let pos = Position::new();
        let mut player = UsiPlayer::new(uri::usi_engine("e1"));
        player.launch().unwrap();
        assert!(matches!(player.on_best_move("7g7f"), Err(PlayerError::NoSearch)));

        let (handlers, log) = recording_handlers();
        player.start_search(&pos, handlers);
        assert!(matches!(player.on_best_move("5e5d"), Err(PlayerError::InvalidBestMove(_))));
        assert!(player.is_searching());
        player.on_best_move("2g2f").unwrap();
        assert!(!player.is_searching());

        let (handlers, _) = recording_handlers();
        player.start_search(&pos, handlers);
        player.close();
        assert!(!player.is_searching());
        assert_eq!(*log.lock().unwrap(), vec!["2g2f"]);
    }

    #[test]
    fn test_usi_player_research_keeps_pending_search() {
        let pos = Position::new();
        let mut player = UsiPlayer::new(uri::usi_engine("e1"));
        player.launch().unwrap();
        player.start_research(&pos);
        assert!(!player.is_searching());

        let (handlers, log) = recording_handlers();
        player.start_search(&pos, handlers);
        player.start_research(&pos);
        assert!(player.is_searching());
        player.on_best_move("7g7f").unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["7g7f"]);
    }

    #[test]
    fn test_usi_player_resign() {
        let mut player = UsiPlayer::new(uri::usi_engine("e1"));
        player.launch().unwrap();
        let (handlers, log) = recording_handlers();
        player.start_search(&Position::new(), handlers);
        player.on_best_move("resign").unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["resign"]);
    }

    #[test]
    fn test_build_player() {
        assert!(matches!(build_player(uri::ES_HUMAN), Ok(GamePlayer::Human(_))));
        match build_player("es://usi-engine/abc") {
            Ok(GamePlayer::Usi(player)) => assert!(player.is_launched()),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(build_player("es://unknown"), Err(PlayerError::UnknownUri(_))));
    }
}
