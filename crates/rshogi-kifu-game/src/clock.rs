//! 対局時計
//!
//! 経過時間は `update` に明示的に渡す。実時間で動かす場合は `update_now` を定期的に呼ぶ。

use std::time::Instant;

use rshogi_kifu::Color;

use crate::settings::TimeLimitSetting;

/// `update` で検出した時計の状態変化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// 持ち時間と秒読みを使い切った
    Timeout,
    /// 短い警告音（残り 10 秒以下や 10 秒単位の区切り）
    BeepShort,
    /// 連続警告音（残り 5 秒以下）
    BeepUnlimited,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PlayerTime {
    time_ms: u64,
    byoyomi: u32,
}

#[derive(Debug, Clone)]
pub struct GameClock {
    setting: TimeLimitSetting,
    times: [PlayerTime; Color::NUM],
    active: Option<Color>,
    started_at: Option<Instant>,
    /// 計測開始時点の持ち時間
    base_time_ms: u64,
    elapsed_ms: u64,
}

impl GameClock {
    pub fn new(setting: TimeLimitSetting) -> Self {
        let initial = PlayerTime {
            time_ms: setting.time_seconds.saturating_mul(1000),
            byoyomi: setting.byoyomi,
        };
        Self {
            setting,
            times: [initial; Color::NUM],
            active: None,
            started_at: None,
            base_time_ms: 0,
            elapsed_ms: 0,
        }
    }

    pub fn time_ms(&self, color: Color) -> u64 {
        self.times[color.index()].time_ms
    }

    pub fn byoyomi(&self, color: Color) -> u32 {
        self.times[color.index()].byoyomi
    }

    /// 計測中の手の経過時間
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// 計測中の手番
    pub fn active(&self) -> Option<Color> {
        self.active
    }

    /// `color` の手番の計測を始める。秒読みは毎手リセットされる
    pub fn start_timer(&mut self, color: Color) {
        let state = &mut self.times[color.index()];
        state.byoyomi = self.setting.byoyomi;
        self.base_time_ms = state.time_ms;
        self.active = Some(color);
        self.started_at = Some(Instant::now());
        self.elapsed_ms = 0;
    }

    /// 手番開始からの経過時間を反映する
    pub fn update(&mut self, elapsed_ms: u64) -> Option<ClockEvent> {
        let color = self.active?;
        self.elapsed_ms = elapsed_ms;
        let byoyomi_setting = self.setting.byoyomi;
        let state = &mut self.times[color.index()];
        let last = *state;

        match self.base_time_ms.checked_sub(elapsed_ms) {
            Some(remaining) => state.time_ms = remaining,
            None => {
                state.time_ms = 0;
                let over_ms = elapsed_ms - self.base_time_ms;
                let byoyomi = (byoyomi_setting as f64 - over_ms as f64 / 1000.0).ceil();
                state.byoyomi = byoyomi.max(0.0) as u32;
            }
        }

        if state.time_ms == 0 && state.byoyomi == 0 {
            return Some(ClockEvent::Timeout);
        }

        let last_time = last.time_ms.div_ceil(1000);
        let time = state.time_ms.div_ceil(1000);
        let byoyomi = state.byoyomi;
        if time == 0 && (last.time_ms > 0 || byoyomi != last.byoyomi) {
            if byoyomi <= 5 {
                return Some(ClockEvent::BeepUnlimited);
            } else if byoyomi <= 10 || byoyomi % 10 == 0 {
                return Some(ClockEvent::BeepShort);
            }
        } else if byoyomi_setting == 0 && time != last_time {
            if time <= 5 {
                return Some(ClockEvent::BeepUnlimited);
            } else if time <= 10 || matches!(time, 20 | 30 | 60) {
                return Some(ClockEvent::BeepShort);
            }
        }
        None
    }

    /// 実時間で経過時間を反映する
    pub fn update_now(&mut self) -> Option<ClockEvent> {
        let elapsed = self.started_at?.elapsed().as_millis();
        self.update(u64::try_from(elapsed).unwrap_or(u64::MAX))
    }

    /// 加算時間を足す
    pub fn increment_time(&mut self, color: Color) {
        let state = &mut self.times[color.index()];
        state.time_ms = state.time_ms.saturating_add(self.setting.increment.saturating_mul(1000));
    }

    /// 計測を止め、その手の経過時間を返す
    pub fn clear_timer(&mut self) -> u64 {
        self.active = None;
        self.started_at = None;
        std::mem::take(&mut self.elapsed_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(time_seconds: u64, byoyomi: u32, increment: u64) -> GameClock {
        GameClock::new(TimeLimitSetting { time_seconds, byoyomi, increment })
    }

    #[test]
    fn test_time_consumption() {
        let mut clock = clock(60, 10, 0);
        assert_eq!(clock.update(1000), None);
        clock.start_timer(Color::Black);
        assert_eq!(clock.update(1500), None);
        assert_eq!(clock.time_ms(Color::Black), 58_500);
        assert_eq!(clock.time_ms(Color::White), 60_000);
        assert_eq!(clock.clear_timer(), 1500);
        assert_eq!(clock.elapsed_ms(), 0);

        // 次の手番は前回の残り時間から減る
        clock.start_timer(Color::Black);
        clock.update(500);
        assert_eq!(clock.time_ms(Color::Black), 58_000);
    }

    #[test]
    fn test_byoyomi_beeps_and_timeout() {
        let mut clock = clock(0, 30, 0);
        clock.start_timer(Color::White);
        assert_eq!(clock.update(0), None);
        // 残り 20 秒
        assert_eq!(clock.update(10_000), Some(ClockEvent::BeepShort));
        // 残り 19 秒は鳴らない
        assert_eq!(clock.update(11_000), None);
        assert_eq!(clock.update(20_000), Some(ClockEvent::BeepShort));
        assert_eq!(clock.update(25_000), Some(ClockEvent::BeepUnlimited));
        assert_eq!(clock.update(30_000), Some(ClockEvent::Timeout));
        assert_eq!(clock.byoyomi(Color::White), 0);
    }

    #[test]
    fn test_entering_byoyomi() {
        let mut clock = clock(10, 30, 0);
        clock.start_timer(Color::Black);
        assert_eq!(clock.update(9_500), None);
        // 持ち時間を使い切った瞬間に秒読みへ入る
        assert_eq!(clock.update(10_000), Some(ClockEvent::BeepShort));
        assert_eq!(clock.time_ms(Color::Black), 0);
        assert_eq!(clock.byoyomi(Color::Black), 30);
    }

    #[test]
    fn test_sudden_death_beeps() {
        let mut clock = clock(61, 0, 0);
        clock.start_timer(Color::Black);
        assert_eq!(clock.update(1_000), Some(ClockEvent::BeepShort));
        assert_eq!(clock.update(1_500), None);
        assert_eq!(clock.update(2_000), None);
        assert_eq!(clock.update(56_000), Some(ClockEvent::BeepUnlimited));
        assert_eq!(clock.update(61_000), Some(ClockEvent::Timeout));
    }

    #[test]
    fn test_increment() {
        let mut clock = clock(60, 0, 5);
        clock.increment_time(Color::White);
        assert_eq!(clock.time_ms(Color::White), 65_000);
        assert_eq!(clock.time_ms(Color::Black), 60_000);
    }

    #[test]
    fn test_huge_setting_saturates() {
        let mut clock = clock(u64::MAX, 0, u64::MAX);
        assert_eq!(clock.time_ms(Color::Black), u64::MAX);
        clock.increment_time(Color::Black);
        assert_eq!(clock.time_ms(Color::Black), u64::MAX);

        clock.start_timer(Color::Black);
        assert_eq!(clock.update(1_000), None);
        assert_eq!(clock.time_ms(Color::Black), u64::MAX - 1_000);
        assert_eq!(clock.update(u64::MAX), Some(ClockEvent::Timeout));
    }
}
