use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::{flexible_datetime, optional_flexible_datetime};

/// Quantity on hand for one item code, `GET /estoque`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: i64,
    #[serde(rename = "item_codigo")]
    pub item_code: String,
    #[serde(rename = "item_descricao", default)]
    pub description: String,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    #[serde(rename = "operador", default)]
    pub operator: String,
    #[serde(deserialize_with = "flexible_datetime")]
    pub created_at: NaiveDateTime,
    #[serde(default, deserialize_with = "optional_flexible_datetime")]
    pub updated_at: Option<NaiveDateTime>,
}

/// Body of `POST /estoque`, creates the record or adds to its quantity
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StockEntry {
    pub operador: String,
    pub quantidade: u32,
    pub item_codigo: String,
}

/// Body of `DELETE /estoque/{id}/reduce`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StockReduction {
    pub quantidade: u32,
}

/// Body of `DELETE /estoque/{id}/delete-complete`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StockRemoval {
    pub operador: String,
}
