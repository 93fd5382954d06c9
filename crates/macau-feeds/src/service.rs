//! One query per feed: cache, parse, extract.

use std::sync::{Arc, OnceLock};

use macau_core::FeedsConfig;
use tracing::instrument;

use crate::cache::{CacheGateway, Clock, SystemClock};
use crate::error::FeedError;
use crate::extract::{extract_realtime, extract_seven_day, extract_today};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::markup;
use crate::types::{Feed, Report};

static SERVICE: OnceLock<Arc<WeatherService>> = OnceLock::new();

/// Query surface over the SMG feeds.
#[derive(Debug)]
pub struct WeatherService<F = HttpFetcher, C = SystemClock> {
    gateway: CacheGateway<F, C>,
    feeds: FeedsConfig,
}

impl WeatherService {
    /// HTTP-backed service using the system clock.
    pub fn from_config(feeds: &FeedsConfig) -> Result<Self, FeedError> {
        let fetcher = HttpFetcher::from_config(feeds)?;
        Ok(Self {
            gateway: CacheGateway::new(fetcher),
            feeds: feeds.clone(),
        })
    }

    /// Install the process-wide service. Only the first call takes effect.
    pub fn install_global(service: WeatherService) -> Arc<WeatherService> {
        SERVICE.get_or_init(|| Arc::new(service)).clone()
    }

    /// The process-wide service, if installed.
    pub fn global() -> Option<Arc<WeatherService>> {
        SERVICE.get().cloned()
    }
}

impl<F: Fetcher, C: Clock> WeatherService<F, C> {
    pub fn with_parts(feeds: FeedsConfig, fetcher: F, clock: C) -> Self {
        Self {
            gateway: CacheGateway::with_clock(fetcher, clock),
            feeds,
        }
    }

    pub fn gateway(&self) -> &CacheGateway<F, C> {
        &self.gateway
    }

    /// Raw payload for any feed, honoring its freshness policy.
    #[instrument(skip(self), level = "debug")]
    pub async fn raw(&self, feed: Feed) -> Result<String, FeedError> {
        let descriptor = feed.descriptor(&self.feeds);
        match self.gateway.query(&descriptor).await {
            Some(content) => Ok(content),
            None => Err(FeedError::TransportFailure {
                url: descriptor.url,
            }),
        }
    }

    /// Current conditions: publish time, temperature, humidity, wind.
    pub async fn realtime(&self) -> Result<Report, FeedError> {
        self.query(Feed::Realtime).await
    }

    /// Today's date, weather situation and description.
    pub async fn today_forecast(&self) -> Result<Report, FeedError> {
        self.query(Feed::TodayForecast).await
    }

    /// Day-by-day seven-day forecast.
    pub async fn seven_day_forecast(&self) -> Result<Report, FeedError> {
        self.query(Feed::SevenDayForecast).await
    }

    /// Fetch (or reuse), parse and extract `feed`.
    #[instrument(skip(self), level = "debug")]
    pub async fn query(&self, feed: Feed) -> Result<Report, FeedError> {
        if !feed.has_extractor() {
            return Err(no_extractor(feed));
        }

        let content = self.raw(feed).await?;
        let Some(doc) = markup::parse(&content) else {
            return Err(FeedError::MalformedContent {
                url: feed.descriptor(&self.feeds).url,
            });
        };

        let report = match feed {
            Feed::Realtime => extract_realtime(&doc),
            Feed::TodayForecast => extract_today(&doc),
            Feed::SevenDayForecast => extract_seven_day(&doc)?,
            Feed::Typhoon => return Err(no_extractor(feed)),
        };

        if let Report::Empty(empty) = &report {
            tracing::info!("{} feed parsed to empty: {}", feed.display_name(), empty);
        }
        Ok(report)
    }
}

fn no_extractor(feed: Feed) -> FeedError {
    FeedError::ExtractionFault(format!("no extractor for the {} feed", feed.display_name()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::cache::testing::{ManualClock, ScriptedFetcher};
    use crate::types::EmptyReport;
    use chrono::Duration;

    const REALTIME: &str = "<rt><SysPubdate>2024-05-01 12:00</SysPubdate>\
        <Custom><Temperature><Value>28.5</Value></Temperature></Custom></rt>";

    fn service(
        responses: Vec<Option<&'static str>>,
    ) -> (
        WeatherService<Arc<ScriptedFetcher>, Arc<ManualClock>>,
        Arc<ScriptedFetcher>,
        Arc<ManualClock>,
    ) {
        let fetcher = Arc::new(ScriptedFetcher::new(responses));
        let clock = Arc::new(ManualClock::at(2024, 5, 1, 12, 0));
        let service =
            WeatherService::with_parts(FeedsConfig::default(), fetcher.clone(), clock.clone());
        (service, fetcher, clock)
    }

    #[tokio::test]
    async fn test_realtime_end_to_end() {
        let (service, _, _) = service(vec![Some(REALTIME)]);
        let report = service.realtime().await.unwrap();
        assert_eq!(report.lines(), ["更新時間: 2024-05-01 12:00", "當前溫度: 28.5°C"]);
    }

    #[tokio::test]
    async fn test_realtime_reuses_cache_then_refetches_after_ttl() {
        let (service, fetcher, clock) = service(vec![Some(REALTIME), Some(REALTIME)]);

        service.realtime().await.unwrap();
        clock.advance(Duration::minutes(10));
        service.realtime().await.unwrap();
        assert_eq!(fetcher.calls(), 1);

        clock.advance(Duration::minutes(20));
        service.realtime().await.unwrap();
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let (service, _, _) = service(vec![None]);
        let err = service.today_forecast().await.unwrap_err();
        assert!(matches!(
            err,
            FeedError::TransportFailure { ref url } if url == "https://xml.smg.gov.mo/c_forecast.xml"
        ));
    }

    #[tokio::test]
    async fn test_malformed_content() {
        let (service, _, _) = service(vec![Some("<rt><unclosed></rt>")]);
        let err = service.realtime().await.unwrap_err();
        assert!(matches!(err, FeedError::MalformedContent { .. }));
        assert_eq!(err.user_message(Feed::Realtime), "數據格式錯誤 (非 XML)。");
    }

    #[tokio::test]
    async fn test_today_without_forecast_node_is_sentinel() {
        let (service, _, _) = service(vec![Some("<f><TodaySituation>晴</TodaySituation></f>")]);
        let report = service.today_forecast().await.unwrap();
        assert_eq!(report, Report::Empty(EmptyReport::NoForecastDetails));
    }

    #[tokio::test]
    async fn test_typhoon_is_raw_only() {
        let (service, fetcher, _) = service(vec![Some("<typhoon/>")]);

        let err = service.query(Feed::Typhoon).await.unwrap_err();
        assert!(matches!(err, FeedError::ExtractionFault(_)));
        assert_eq!(fetcher.calls(), 0);

        assert_eq!(service.raw(Feed::Typhoon).await.unwrap(), "<typhoon/>");
    }

    #[tokio::test]
    async fn test_failed_refresh_does_not_serve_stale() {
        let (service, fetcher, clock) = service(vec![Some(REALTIME), None]);

        service.realtime().await.unwrap();
        clock.advance(Duration::minutes(31));
        let err = service.realtime().await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(fetcher.calls(), 2);
    }

    #[test]
    fn test_global_installs_once() {
        let first = WeatherService::install_global(
            WeatherService::from_config(&FeedsConfig::default()).unwrap(),
        );
        let mut other = FeedsConfig::default();
        other.realtime_ttl_minutes = 1;
        let second =
            WeatherService::install_global(WeatherService::from_config(&other).unwrap());

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &WeatherService::global().unwrap()));
    }
}
