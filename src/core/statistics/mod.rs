pub mod export;

// Re-export commonly used types
pub use export::{
    export_csv, export_file_name, export_json, export_to_path, ExportError, ExportFormat,
};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Reporting window selected for the statistics view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Today,
    Week,
    Month,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Today => "today",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
        }
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "today" => Ok(TimeRange::Today),
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            other => Err(format!("unknown time range '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorCount {
    pub color: String,
    pub count: u64,
    /// Whole percent
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    /// "HH:MM"
    pub hour: String,
    pub cubes: u64,
    /// Whole percent
    pub efficiency: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub day: String,
    pub cubes: u64,
}

/// In-memory statistics aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsData {
    pub total_cubes: u64,
    pub cubes_by_color: Vec<ColorCount>,
    pub hourly_data: Vec<HourlyPoint>,
    pub daily_data: Vec<DailyPoint>,
    /// Percent
    pub error_rate: f64,
    /// Seconds
    pub avg_cycle_time: f64,
    /// Percent
    pub uptime: f64,
}

impl Default for StatisticsData {
    fn default() -> Self {
        let color = |color: &str, count, percentage| ColorCount {
            color: color.to_string(),
            count,
            percentage,
        };
        let hour = |hour: &str, cubes, efficiency| HourlyPoint {
            hour: hour.to_string(),
            cubes,
            efficiency,
        };
        let day = |day: &str, cubes| DailyPoint {
            day: day.to_string(),
            cubes,
        };

        Self {
            total_cubes: 1247,
            cubes_by_color: vec![
                color("Red", 312, 25),
                color("Green", 298, 24),
                color("Blue", 387, 31),
                color("Defected", 250, 20),
            ],
            hourly_data: vec![
                hour("08:00", 45, 92),
                hour("09:00", 52, 94),
                hour("10:00", 48, 89),
                hour("11:00", 55, 96),
                hour("12:00", 38, 85),
                hour("13:00", 42, 88),
                hour("14:00", 58, 97),
                hour("15:00", 51, 93),
            ],
            daily_data: vec![
                day("Mon", 456),
                day("Tue", 523),
                day("Wed", 478),
                day("Thu", 612),
                day("Fri", 589),
                day("Sat", 234),
                day("Sun", 189),
            ],
            error_rate: 0.3,
            avg_cycle_time: 2.4,
            uptime: 94.2,
        }
    }
}

impl StatisticsData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one live update: the total and every color count creep upwards.
    /// Percentages are left as they were.
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.total_cubes += rng.gen_range(0..3);
        for entry in &mut self.cubes_by_color {
            entry.count += rng.gen_range(0..2);
        }
    }

    /// Count for a color name, case-insensitive
    pub fn count_for(&self, color: &str) -> Option<u64> {
        self.cubes_by_color
            .iter()
            .find(|c| c.color.eq_ignore_ascii_case(color))
            .map(|c| c.count)
    }

    /// Sum of the hourly series
    pub fn hourly_total(&self) -> u64 {
        self.hourly_data.iter().map(|h| h.cubes).sum()
    }
}
