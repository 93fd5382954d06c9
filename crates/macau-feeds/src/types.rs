use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use macau_core::FeedsConfig;
use serde::{Deserialize, Serialize};

/// Upstream SMG bulletins known to the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    Realtime,
    TodayForecast,
    SevenDayForecast,
    /// Reserved: fetchable, but no extractor reads it yet.
    Typhoon,
}

impl Feed {
    /// Human-readable name, used in logs
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Realtime => "realtime",
            Self::TodayForecast => "today forecast",
            Self::SevenDayForecast => "7-day forecast",
            Self::Typhoon => "typhoon",
        }
    }

    /// Whether an extractor exists for this feed
    pub fn has_extractor(&self) -> bool {
        !matches!(self, Self::Typhoon)
    }

    /// Build the descriptor for this feed from configuration
    pub fn descriptor(&self, config: &FeedsConfig) -> FeedDescriptor {
        match self {
            Self::Realtime => FeedDescriptor::new(
                &config.realtime_url,
                FreshnessPolicy::Ttl {
                    minutes: config.realtime_ttl_minutes,
                },
            ),
            Self::TodayForecast => {
                FeedDescriptor::new(&config.today_forecast_url, FreshnessPolicy::CalendarDay)
            }
            Self::SevenDayForecast => {
                FeedDescriptor::new(&config.seven_day_url, FreshnessPolicy::CalendarDay)
            }
            Self::Typhoon => FeedDescriptor::new(&config.typhoon_url, FreshnessPolicy::CalendarDay),
        }
    }
}

/// Rule deciding whether a cached payload may be reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FreshnessPolicy {
    /// Valid while younger than `minutes`
    Ttl { minutes: u32 },
    /// Valid until the local calendar date changes
    CalendarDay,
}

impl FreshnessPolicy {
    /// Check an entry against the current instant.
    ///
    /// `now` carries the local offset, so its date is the local calendar day.
    pub fn is_fresh(&self, entry: &CacheEntry, now: DateTime<FixedOffset>) -> bool {
        match self {
            Self::Ttl { minutes } => {
                now.signed_duration_since(entry.fetched_at) < Duration::minutes(i64::from(*minutes))
            }
            Self::CalendarDay => entry.fetch_date == now.date_naive(),
        }
    }
}

/// An upstream endpoint together with its freshness rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDescriptor {
    pub url: String,
    pub policy: FreshnessPolicy,
}

impl FeedDescriptor {
    pub fn new(url: impl Into<String>, policy: FreshnessPolicy) -> Self {
        Self {
            url: url.into(),
            policy,
        }
    }
}

/// Last successfully fetched payload for one feed URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub content: String,
    pub fetch_date: NaiveDate,
    pub fetched_at: DateTime<FixedOffset>,
}

impl CacheEntry {
    /// Stamp freshly fetched content with the fetch instant and its local date
    pub fn new(content: String, fetched_at: DateTime<FixedOffset>) -> Self {
        Self {
            content,
            fetch_date: fetched_at.date_naive(),
            fetched_at,
        }
    }
}

/// Which "nothing extracted" outcome a query produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReport {
    /// Realtime payload parsed but carried none of the known fields
    NoRealtimeFields,
    /// Forecast payload parsed but no forecast details were found
    NoForecastDetails,
    /// RSS payload contained no `item`
    NoForecastItems,
    /// First RSS item had no usable description
    NoForecastDescription,
    /// Description present but no day block could be read from it
    NoParsableDays,
}

impl EmptyReport {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoRealtimeFields => "解析到的實時數據為空。",
            Self::NoForecastDetails => "收到數據但無法解析出預測詳情，請嘗試查看實時天氣。",
            Self::NoForecastItems => "未找到預報條目。",
            Self::NoForecastDescription => "未能找到預報詳情，請嘗試查看實時天氣。",
            Self::NoParsableDays => "未能解析七天預報內容，請嘗試查看實時天氣。",
        }
    }
}

impl std::fmt::Display for EmptyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::NoRealtimeFields => "no realtime fields found",
            Self::NoForecastDetails => "no forecast details found",
            Self::NoForecastItems => "no forecast items found",
            Self::NoForecastDescription => "forecast item has no description",
            Self::NoParsableDays => "no day block could be parsed",
        };
        f.write_str(text)
    }
}

/// Outcome of a successful query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Report {
    /// Formatted lines in the feed's fixed field order
    Lines(Vec<String>),
    /// Processed successfully, nothing to show
    Empty(EmptyReport),
}

impl Report {
    /// Wrap extracted lines, falling back to the given sentinel when there are none
    pub fn from_lines(lines: Vec<String>, empty: EmptyReport) -> Self {
        if lines.is_empty() {
            Self::Empty(empty)
        } else {
            Self::Lines(lines)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }

    pub fn lines(&self) -> &[String] {
        match self {
            Self::Lines(lines) => lines,
            Self::Empty(_) => &[],
        }
    }

    /// Lines joined with newlines, or the sentinel's message
    pub fn render(&self) -> String {
        match self {
            Self::Lines(lines) => lines.join("\n"),
            Self::Empty(empty) => empty.user_message().to_string(),
        }
    }

    /// Flatten into a `Result`, treating the sentinel as `ExtractionEmpty`
    pub fn into_lines(self) -> Result<Vec<String>, crate::FeedError> {
        match self {
            Self::Lines(lines) => Ok(lines),
            Self::Empty(empty) => Err(crate::FeedError::ExtractionEmpty(empty)),
        }
    }
}
