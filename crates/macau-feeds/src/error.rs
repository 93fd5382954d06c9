//! Feed query error types.

use thiserror::Error;

use crate::types::{EmptyReport, Feed};

#[derive(Error, Debug)]
pub enum FeedError {
    /// Fetch timed out, failed to connect, or got a non-success status
    #[error("Could not fetch {url}")]
    TransportFailure { url: String },

    #[error("Payload from {url} is not well-formed XML")]
    MalformedContent { url: String },

    #[error("Nothing extracted: {0}")]
    ExtractionEmpty(EmptyReport),

    #[error("Extraction failed: {0}")]
    ExtractionFault(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl FeedError {
    /// User-facing message for a failed query on `feed`.
    pub fn user_message(&self, feed: Feed) -> String {
        match self {
            Self::TransportFailure { .. } => match feed {
                Feed::Realtime => "無法獲取澳門實時天氣數據 (連接失敗)。".to_string(),
                Feed::TodayForecast => "無法獲取澳門今日預測數據。".to_string(),
                Feed::SevenDayForecast => "無法獲取澳門7天預測數據。".to_string(),
                Feed::Typhoon => "無法獲取澳門颱風數據。".to_string(),
            },
            Self::MalformedContent { .. } => "數據格式錯誤 (非 XML)。".to_string(),
            Self::ExtractionEmpty(empty) => empty.user_message().to_string(),
            Self::ExtractionFault(msg) => match feed {
                Feed::Realtime => format!("解析實時天氣數據時發生錯誤: {}", msg),
                Feed::SevenDayForecast => format!("未能解析到七日預報數據: {}", msg),
                Feed::TodayForecast | Feed::Typhoon => format!("解析預測數據錯誤: {}", msg),
            },
            Self::Client(_) => "無法建立網絡連接。".to_string(),
        }
    }

    /// Whether the failure happened before any payload was available.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TransportFailure { .. } | Self::Client(_))
    }
}
