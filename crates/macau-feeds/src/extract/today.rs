use roxmltree::Document;

use crate::markup::{descendant_path, text_of};
use crate::types::{EmptyReport, Report};

/// Extract today's forecast: valid-for date, weather situation, description.
///
/// Nothing is read unless a `WeatherForecast` item exists.
pub fn extract_today(doc: &Document<'_>) -> Report {
    let root = doc.root_element();

    let Some(forecast) = descendant_path(root, &["WeatherForecast"]) else {
        return Report::Empty(EmptyReport::NoForecastDetails);
    };

    let mut lines = Vec::new();

    if let Some(date) = descendant_path(forecast, &["ValidFor"]).and_then(text_of) {
        lines.push(format!("今日日期: {}", date));
    }
    if let Some(situation) = descendant_path(root, &["TodaySituation"]).and_then(text_of) {
        lines.push(format!("天氣形勢: {}", situation));
    }
    if let Some(description) = descendant_path(forecast, &["WeatherDescription"]).and_then(text_of)
    {
        lines.push("今日天氣概況:".to_string());
        lines.push(description);
    }

    Report::from_lines(lines, EmptyReport::NoForecastDetails)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::markup::parse;

    fn extract(xml: &str) -> Report {
        extract_today(&parse(xml).unwrap())
    }

    #[test]
    fn test_full_forecast() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<SevenDaysForecast>
  <Custom>
    <TodaySituation>
      華南沿岸受偏東氣流影響。
    </TodaySituation>
    <WeatherForecast>
      <ValidFor> 2024-05-01 </ValidFor>
      <WeatherDescription>
天色多雲，有幾陣驟雨。
吹和緩至清勁東風。
      </WeatherDescription>
    </WeatherForecast>
  </Custom>
</SevenDaysForecast>"#;

        assert_eq!(
            extract(xml).lines(),
            [
                "今日日期: 2024-05-01",
                "天氣形勢: 華南沿岸受偏東氣流影響。",
                "今日天氣概況:",
                "天色多雲，有幾陣驟雨。\n吹和緩至清勁東風。",
            ]
        );
    }

    #[test]
    fn test_no_forecast_item_is_sentinel_even_with_situation() {
        let report = extract("<f><TodaySituation>晴</TodaySituation></f>");
        assert_eq!(report, Report::Empty(EmptyReport::NoForecastDetails));
    }

    #[test]
    fn test_empty_forecast_item_is_sentinel() {
        let report = extract("<f><WeatherForecast><ValidFor>  </ValidFor></WeatherForecast></f>");
        assert_eq!(report, Report::Empty(EmptyReport::NoForecastDetails));
    }

    #[test]
    fn test_fields_are_independent() {
        let report = extract(
            "<f><WeatherForecast><WeatherDescription>晴</WeatherDescription></WeatherForecast></f>",
        );
        assert_eq!(report.lines(), ["今日天氣概況:", "晴"]);
    }

    #[test]
    fn test_date_outside_forecast_item_is_ignored() {
        let report = extract(
            "<f><ValidFor>2024-05-01</ValidFor>\
             <WeatherForecast><WeatherDescription>晴</WeatherDescription></WeatherForecast></f>",
        );
        assert_eq!(report.lines(), ["今日天氣概況:", "晴"]);
    }
}
