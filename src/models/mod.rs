mod item;
mod movement;
mod sale;
mod stock;
pub use item::*;
pub use movement::*;
pub use sale::*;
pub use stock::*;

use serde::{Deserialize, Serialize};

/// Success body of mutating endpoints, `{"message": "..."}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body, the server writes either `error` or `message`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
impl ApiErrorBody {
    pub fn text(self) -> Option<String> {
        self.error
            .or(self.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}
