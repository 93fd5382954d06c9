use anyhow::Result;
use macau_core::{Config, ConfigError};
use macau_feeds::{Feed, WeatherService};

#[tokio::main]
async fn main() -> Result<()> {
    macau_core::init()?;

    let (config, _) = match Config::load_validated() {
        Ok(loaded) => loaded,
        Err(e) => {
            if let Some(config_err) = ConfigError::find_in(&e) {
                eprintln!("{}", config_err.user_message());
            }
            return Err(e);
        }
    };
    tracing::info!("Config directory: {}", config.config_dir.display());

    let service = WeatherService::install_global(WeatherService::from_config(&config.feeds)?);

    for feed in [Feed::Realtime, Feed::TodayForecast, Feed::SevenDayForecast] {
        println!("== {} ==", feed.display_name());
        match service.query(feed).await {
            Ok(report) => println!("{}", report.render()),
            Err(e) => {
                tracing::warn!("{} query failed: {}", feed.display_name(), e);
                println!("{}", e.user_message(feed));
            }
        }
        println!();
    }

    Ok(())
}
