use serde::{Deserialize, Serialize};

/// One character from the voices catalog.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Speaker {
    pub name: String,
    #[serde(default)]
    pub styles: Vec<Style>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Style {
    pub name: String,
    pub id: i64,
}
