//! In-progress grade sheet edited on the calculator screen

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{default_grades, GradeEntry};
use crate::engine::aggregator;

/// Ordered grade rows being edited before a calculation is taken
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GradeSheet {
    pub entries: Vec<GradeEntry>,
}

/// Ids of the rows to highlight as best and lowest by gross
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrossExtremes {
    pub highest: String,
    pub lowest: String,
}

impl GradeSheet {
    /// Sheet pre-filled with the sample grades
    pub fn seeded() -> Self {
        Self {
            entries: default_grades(),
        }
    }

    /// Append a blank row and return its id
    pub fn add_grade(&mut self) -> String {
        let entry = GradeEntry::blank();
        let id = entry.id.clone();
        self.entries.push(entry);
        id
    }

    pub fn set_note(&mut self, id: &str, note: impl Into<String>) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.note = note.into();
                true
            }
            None => false,
        }
    }

    pub fn set_boxes(&mut self, id: &str, boxes: u32) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.boxes = boxes;
                aggregator::recompute_gross(entry);
                true
            }
            None => false,
        }
    }

    pub fn set_rate(&mut self, id: &str, rate: Decimal) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.rate = rate.max(Decimal::ZERO);
                aggregator::recompute_gross(entry);
                true
            }
            None => false,
        }
    }

    /// Remove a row by id; false when no such row exists
    pub fn remove_grade(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn fill_sample(&mut self) {
        self.entries = default_grades();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Highest- and lowest-gross rows; the first row wins a tie
    pub fn gross_extremes(&self) -> Option<GrossExtremes> {
        let first = self.entries.first()?;
        let mut highest = first;
        let mut lowest = first;
        for entry in &self.entries[1..] {
            if entry.gross > highest.gross {
                highest = entry;
            }
            if entry.gross < lowest.gross {
                lowest = entry;
            }
        }

        Some(GrossExtremes {
            highest: highest.id.clone(),
            lowest: lowest.id.clone(),
        })
    }

    fn entry_mut(&mut self, id: &str) -> Option<&mut GradeEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_recomputes_gross() {
        let mut sheet = GradeSheet::default();
        let id = sheet.add_grade();
        assert_eq!(sheet.entries[0].gross, Decimal::ZERO);

        assert!(sheet.set_boxes(&id, 4));
        assert!(sheet.set_rate(&id, Decimal::from(1500)));
        assert_eq!(sheet.entries[0].gross, Decimal::from(6000));

        assert!(sheet.set_boxes(&id, 0));
        assert_eq!(sheet.entries[0].gross, Decimal::ZERO);
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut sheet = GradeSheet::seeded();
        assert!(!sheet.remove_grade("missing"));
        assert_eq!(sheet.entries.len(), 5);

        let id = sheet.entries[2].id.clone();
        assert!(sheet.remove_grade(&id));
        assert_eq!(sheet.entries.len(), 4);
        assert!(sheet.entries.iter().all(|e| e.id != id));
    }

    #[test]
    fn test_gross_extremes() {
        let sheet = GradeSheet::seeded();
        let extremes = sheet.gross_extremes().unwrap();
        assert_eq!(extremes.highest, sheet.entries[0].id);
        assert_eq!(extremes.lowest, sheet.entries[4].id);

        assert!(GradeSheet::default().gross_extremes().is_none());
    }

    #[test]
    fn test_fill_and_clear() {
        let mut sheet = GradeSheet::default();
        sheet.fill_sample();
        assert_eq!(sheet.entries[0].note, "4 dana");
        sheet.clear();
        assert!(sheet.entries.is_empty());
    }
}
