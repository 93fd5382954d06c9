//! Seven-day forecast: day blocks embedded as HTML in the first RSS item.
//!
//! The description reads like
//! `預測於 5月2日 星期四 溫度: 24-29 濕度: 70-95 % 多雲，有驟雨。 預測於 ...`.
//! Each block is scanned left to right over its markers instead of matched
//! with independent patterns, so a drifted block fails as a whole.

use std::sync::OnceLock;

use regex::Regex;
use roxmltree::Document;

use crate::error::FeedError;
use crate::markup::{child, text_of};
use crate::types::{EmptyReport, Report};

const DAY_MARKER: &str = "預測於";
const TEMPERATURE_MARKER: &str = "溫度:";
const HUMIDITY_MARKER: &str = "濕度:";
const PERCENT_MARKER: &str = "%";
const EXPECTED_DAYS: usize = 7;

/// One day's forecast segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBlock {
    pub date: String,
    pub temperature: String,
    /// Includes the trailing `%` when present
    pub humidity: String,
    pub description: String,
}

impl DayBlock {
    /// Scan one block. `None` when the temperature marker (which ends the
    /// date label) is missing; later sections degrade to empty strings.
    fn scan(block: &str) -> Option<Self> {
        let mut scanner = Scanner::new(block);

        let date = scanner.take_until(TEMPERATURE_MARKER)?.trim().to_string();

        let temperature = scanner
            .take_until(HUMIDITY_MARKER)
            .map(|t| t.trim().to_string());
        let humidity = match temperature {
            Some(_) => scanner
                .take_until(PERCENT_MARKER)
                .map(|h| format!("{}%", h.trim())),
            None => None,
        };
        let description = match humidity {
            Some(_) => Some(scanner.rest()),
            None => scanner.skip_past(PERCENT_MARKER).then(|| scanner.rest()),
        };

        Some(Self {
            date,
            temperature: temperature.unwrap_or_default(),
            humidity: humidity.unwrap_or_default(),
            description: description.map(|d| d.trim().to_string()).unwrap_or_default(),
        })
    }

    /// Date line, temperature/humidity line, description
    pub fn render(&self) -> [String; 3] {
        [
            format!("{}預測:", self.date),
            format!("溫度約為{}°C，濕度約為{}", self.temperature, self.humidity),
            self.description.clone(),
        ]
    }
}

/// Cursor over a block, consuming up to each marker in turn
struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    /// Text before `marker`, advancing past it. Leaves the cursor alone if absent.
    fn take_until(&mut self, marker: &str) -> Option<&'a str> {
        let pos = self.rest.find(marker)?;
        let taken = &self.rest[..pos];
        self.rest = &self.rest[pos + marker.len()..];
        Some(taken)
    }

    fn skip_past(&mut self, marker: &str) -> bool {
        self.take_until(marker).is_some()
    }

    fn rest(&self) -> &'a str {
        self.rest
    }
}

fn markup_tag() -> Result<&'static Regex, FeedError> {
    static TAG: OnceLock<Result<Regex, String>> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<.*?>").map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| FeedError::ExtractionFault(format!("invalid tag pattern: {}", e)))
}

/// Replace every `<...>` tag with a space and trim.
pub fn strip_markup(raw: &str) -> Result<String, FeedError> {
    Ok(markup_tag()?.replace_all(raw, " ").trim().to_string())
}

/// Day blocks found in one description, with the marker counts behind them
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DayScan {
    pub blocks: Vec<DayBlock>,
    /// Occurrences of the day marker in the text
    pub markers: usize,
    /// Non-empty segments dropped for lacking a date label
    pub skipped: usize,
}

impl DayScan {
    /// Whether the layout departs from seven well-formed days
    pub fn drifted(&self) -> bool {
        self.markers != EXPECTED_DAYS || self.skipped > 0
    }
}

/// Split stripped text into day blocks, dropping text before the first
/// marker and any block without a date label.
pub fn parse_day_blocks(text: &str) -> DayScan {
    let segments: Vec<&str> = text
        .split(DAY_MARKER)
        .skip(1)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let blocks: Vec<DayBlock> = segments.iter().filter_map(|s| DayBlock::scan(s)).collect();
    let scan = DayScan {
        skipped: segments.len() - blocks.len(),
        markers: text.matches(DAY_MARKER).count(),
        blocks,
    };

    if scan.skipped > 0 {
        tracing::warn!(
            "Skipped {} of {} seven-day blocks without a date label",
            scan.skipped,
            segments.len()
        );
    }
    if scan.markers != EXPECTED_DAYS {
        tracing::warn!(
            "Seven-day forecast has {} day markers, expected {}",
            scan.markers,
            EXPECTED_DAYS
        );
    }

    scan
}

/// Extract the day-by-day lines from the seven-day RSS feed.
///
/// Only the first `item` is read. Blocks are separated by a blank line.
pub fn extract_seven_day(doc: &Document<'_>) -> Result<Report, FeedError> {
    let Some(item) = doc
        .root_element()
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "item")
    else {
        return Ok(Report::Empty(EmptyReport::NoForecastItems));
    };

    let Some(description) = child(item, "description").and_then(text_of) else {
        return Ok(Report::Empty(EmptyReport::NoForecastDescription));
    };

    let text = strip_markup(&description)?;
    let scan = parse_day_blocks(&text);

    let mut lines = Vec::with_capacity(scan.blocks.len() * 4);
    for (i, block) in scan.blocks.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.extend(block.render());
    }

    Ok(Report::from_lines(lines, EmptyReport::NoParsableDays))
}
