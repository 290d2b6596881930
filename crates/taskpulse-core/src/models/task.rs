use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    /// Only present when the board is fetched with its columns
    #[serde(default)]
    pub lists: Vec<BoardList>,
}

impl Board {
    pub fn card_count(&self) -> usize {
        self.lists.iter().map(|l| l.cards.len()).sum()
    }
}

/// A column on a board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardList {
    pub id: String,
    pub board_id: String,
    pub name: String,
    pub position: i32,
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: String,
    pub list_id: String,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    #[serde(default)]
    pub completed: bool,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

// ===== Request bodies =====

#[derive(Debug, Clone, Serialize)]
pub struct BoardInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewList {
    pub name: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCard {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardMove {
    pub list_id: String,
    pub position: i32,
}
