//! Course-information store — announcements, assignment details, topic notes.
//!
//! The store is static reference data owned by the application context.
//! It is never injected into model prompts; the assistant preamble carries
//! the text the model sees.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Details of one assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assignment title (e.g. "影像分類任務")
    pub title: String,

    /// Submission deadline
    pub due_date: NaiveDate,

    /// What has to be delivered
    pub requirements: String,

    /// Grading criterion → weight
    #[serde(default)]
    pub grading: BTreeMap<String, f32>,
}

/// The course-information store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseInfo {
    /// Announcements in publication order
    #[serde(default)]
    announcements: Vec<String>,

    /// Assignment name → details
    #[serde(default)]
    assignments: BTreeMap<String, Assignment>,

    /// Topic → summary
    #[serde(default)]
    course_content: BTreeMap<String, String>,
}

impl CourseInfo {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the course's sample data.
    pub fn sample() -> Self {
        let mut info = Self::new();
        info.add_announcement("第一次作業將於下週一發布，請同學們準備");
        info.add_announcement("課程期中專案主題已公布，請同學們盡快開始準備");

        info.add_assignment(
            "作業一",
            Assignment {
                title: "影像分類任務".into(),
                due_date: NaiveDate::from_ymd_opt(2024, 4, 15).unwrap_or_default(),
                requirements: "使用CNN實現CIFAR-10資料集分類".into(),
                grading: BTreeMap::from([
                    ("模型準確率".to_string(), 0.4),
                    ("程式碼規範".to_string(), 0.3),
                    ("報告文檔".to_string(), 0.3),
                ]),
            },
        );

        info.add_course_content("CNN架構", "介紹卷積神經網路的基本原理和實作");
        info.add_course_content("影像前處理", "數據增強、標準化和正規化技術");
        info
    }

    /// Append an announcement.
    pub fn add_announcement(&mut self, announcement: impl Into<String>) {
        self.announcements.push(announcement.into());
    }

    /// Add or replace an assignment.
    pub fn add_assignment(&mut self, name: impl Into<String>, details: Assignment) {
        self.assignments.insert(name.into(), details);
    }

    /// Add or replace a topic note.
    pub fn add_course_content(&mut self, topic: impl Into<String>, content: impl Into<String>) {
        self.course_content.insert(topic.into(), content.into());
    }

    pub fn announcements(&self) -> &[String] {
        &self.announcements
    }

    pub fn assignment(&self, name: &str) -> Option<&Assignment> {
        self.assignments.get(name)
    }

    pub fn assignments(&self) -> impl Iterator<Item = (&String, &Assignment)> {
        self.assignments.iter()
    }

    pub fn topic(&self, topic: &str) -> Option<&str> {
        self.course_content.get(topic).map(String::as_str)
    }

    pub fn topics(&self) -> impl Iterator<Item = (&String, &String)> {
        self.course_content.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.announcements.is_empty() && self.assignments.is_empty() && self.course_content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_data_is_seeded() {
        let info = CourseInfo::sample();
        assert_eq!(info.announcements().len(), 2);
        let hw1 = info.assignment("作業一").unwrap();
        assert_eq!(hw1.title, "影像分類任務");
        assert_eq!(hw1.due_date, NaiveDate::from_ymd_opt(2024, 4, 15).unwrap());
        let total: f32 = hw1.grading.values().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert_eq!(info.topic("CNN架構"), Some("介紹卷積神經網路的基本原理和實作"));
    }

    #[test]
    fn announcements_keep_insertion_order() {
        let mut info = CourseInfo::new();
        info.add_announcement("first");
        info.add_announcement("second");
        assert_eq!(info.announcements(), ["first", "second"]);
    }

    #[test]
    fn add_assignment_replaces_existing() {
        let mut info = CourseInfo::sample();
        let mut hw1 = info.assignment("作業一").unwrap().clone();
        hw1.requirements = "改用 ResNet".into();
        info.add_assignment("作業一", hw1);
        assert_eq!(info.assignments().count(), 1);
        assert_eq!(info.assignment("作業一").unwrap().requirements, "改用 ResNet");
    }

    #[test]
    fn new_store_is_empty() {
        assert!(CourseInfo::new().is_empty());
        assert!(!CourseInfo::sample().is_empty());
    }

    #[test]
    fn store_serializes_to_json() {
        let json = serde_json::to_value(CourseInfo::sample()).unwrap();
        assert_eq!(json["assignments"]["作業一"]["due_date"], "2024-04-15");
    }
}
