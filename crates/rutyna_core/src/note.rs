use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Free-text annotation, one per calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub date: NaiveDate,
    pub text: String,
}

pub fn note_for(notes: &[Note], date: NaiveDate) -> Option<&Note> {
    notes.iter().find(|note| note.date == date)
}

/// Replace-or-delete-on-empty upsert keyed by calendar day.
pub fn upsert_note(notes: &mut Vec<Note>, date: NaiveDate, text: &str) {
    match notes.iter().position(|note| note.date == date) {
        Some(pos) if text.is_empty() => {
            notes.remove(pos);
        }
        Some(pos) => notes[pos].text = text.to_string(),
        None if text.is_empty() => {}
        None => notes.push(Note {
            date,
            text: text.to_string(),
        }),
    }
}
