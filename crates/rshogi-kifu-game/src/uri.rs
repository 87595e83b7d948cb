//! プレイヤー識別子（URI）

/// 人間のプレイヤー
pub const ES_HUMAN: &str = "es://human";

/// USIエンジンのプレイヤー（後ろにエンジンIDが続く）
pub const ES_USI_ENGINE_PREFIX: &str = "es://usi-engine/";

pub fn is_usi_engine(uri: &str) -> bool {
    uri.strip_prefix(ES_USI_ENGINE_PREFIX).is_some_and(|id| !id.is_empty())
}

/// エンジンIDから URI を組み立てる
pub fn usi_engine(id: &str) -> String {
    format!("{ES_USI_ENGINE_PREFIX}{id}")
}
