//! 棋譜のメタデータ（対局者名・日時・棋戦・詰将棋情報など）

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 標準メタデータのキー
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordMetadataKey {
    /// 先手
    BlackName,
    /// 後手
    WhiteName,
    /// 開始日時
    StartDatetime,
    /// 終了日時
    EndDatetime,
    /// 対局日
    Date,
    /// 棋戦
    Tournament,
    /// 戦型
    Strategy,
    /// 表題
    Title,
    /// 持ち時間
    TimeLimit,
    /// 消費時間
    TimeSpent,
    /// 場所
    Place,
    /// 掲載
    PostedOn,
    /// 備考
    Note,
    /// 先手省略名
    BlackShortName,
    /// 後手省略名
    WhiteShortName,

    // 詰将棋
    /// 作品番号
    OpusNo,
    /// 作品名
    OpusName,
    /// 作者
    Author,
    /// 発表誌
    PublishedOn,
    /// 発表年月
    PublishedAt,
    /// 出典
    Source,
    /// 手数
    Length,
    /// 完全性
    Integrity,
    /// 分類
    Category,
    /// 受賞
    Award,
}

/// 棋譜のメタデータ
///
/// 値の検証は行わない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    standard: BTreeMap<RecordMetadataKey, String>,
    custom: BTreeMap<String, String>,
}

impl RecordMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn standard_metadata_keys(&self) -> impl Iterator<Item = RecordMetadataKey> + '_ {
        self.standard.keys().copied()
    }

    pub fn standard_metadata(&self, key: RecordMetadataKey) -> Option<&str> {
        self.standard.get(&key).map(String::as_str)
    }

    pub fn set_standard_metadata(&mut self, key: RecordMetadataKey, value: impl Into<String>) {
        self.standard.insert(key, value.into());
    }

    pub fn custom_metadata_keys(&self) -> impl Iterator<Item = &str> {
        self.custom.keys().map(String::as_str)
    }

    pub fn custom_metadata(&self, key: &str) -> Option<&str> {
        self.custom.get(key).map(String::as_str)
    }

    pub fn set_custom_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.custom.insert(key.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_and_custom_metadata() {
        let mut metadata = RecordMetadata::new();
        metadata.set_standard_metadata(RecordMetadataKey::BlackName, "羽生");
        metadata.set_custom_metadata("備考2", "test");
        metadata.set_standard_metadata(RecordMetadataKey::BlackName, "藤井");

        assert_eq!(metadata.standard_metadata(RecordMetadataKey::BlackName), Some("藤井"));
        assert_eq!(metadata.standard_metadata(RecordMetadataKey::WhiteName), None);
        assert_eq!(metadata.custom_metadata("備考2"), Some("test"));
        assert_eq!(
            metadata.standard_metadata_keys().collect::<Vec<_>>(),
            vec![RecordMetadataKey::BlackName]
        );
        assert_eq!(metadata.custom_metadata_keys().collect::<Vec<_>>(), vec!["備考2"]);
    }

    #[test]
    fn test_key_serde_names() {
        let json = serde_json::to_string(&RecordMetadataKey::BlackShortName).unwrap();
        assert_eq!(json, "\"blackShortName\"");
        let key: RecordMetadataKey = serde_json::from_str("\"publishedAt\"").unwrap();
        assert_eq!(key, RecordMetadataKey::PublishedAt);
    }
}
