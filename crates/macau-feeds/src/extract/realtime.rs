use roxmltree::Document;

use crate::markup::{child, descendant_path, text_of};
use crate::types::{EmptyReport, Report};

/// Extract the hourly observation lines from the realtime feed.
///
/// Publish time, temperature, humidity, wind speed, wind direction; each
/// line is present only if its field is.
pub fn extract_realtime(doc: &Document<'_>) -> Report {
    let root = doc.root_element();

    let published = descendant_path(root, &["SysPubdate"]).and_then(text_of);
    let custom = child(root, "Custom");
    let observed = |path: &[&str]| custom.and_then(|c| descendant_path(c, path)).and_then(text_of);

    let lines = [
        published.map(|v| format!("更新時間: {}", v)),
        observed(&["Temperature", "Value"]).map(|v| format!("當前溫度: {}°C", v)),
        observed(&["Humidity", "Value"]).map(|v| format!("相對濕度: {}%", v)),
        observed(&["WindSpeed", "Value"]).map(|v| format!("風速: {} km/h", v)),
        observed(&["WindDirection", "WindDescription"]).map(|v| format!("風向: {}", v)),
    ];

    Report::from_lines(lines.into_iter().flatten().collect(), EmptyReport::NoRealtimeFields)
}
