//! 対局セッション
//!
//! 対局設定からプレイヤーと時計を用意し、プレイヤーの指し手・投了・時間切れを
//! `rshogi_kifu::Record` へ記録する。

pub mod clock;
pub mod player;
pub mod session;
pub mod settings;
pub mod uri;

pub use clock::{ClockEvent, GameClock};
pub use player::{GamePlayer, HumanPlayer, Player, PlayerError, SearchHandlers, UsiPlayer, build_player};
pub use session::{GameSession, PlayerEvent, SessionError, SessionState};
pub use settings::{GameSetting, PlayerSetting, SettingsError, TimeLimitSetting};
