use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::flexible_datetime;

/// A registered sale, `GET /vendas`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    #[serde(rename = "operador", default)]
    pub operator: String,
    #[serde(rename = "data", alias = "created_at", deserialize_with = "flexible_datetime")]
    pub date: NaiveDateTime,
    #[serde(rename = "itens", default)]
    pub items: Vec<SaleItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "SaleItemDTO")]
pub struct SaleItem {
    pub item_code: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
}

#[derive(Deserialize)]
struct SaleItemDTO {
    item_codigo: String,
    #[serde(default, alias = "item_descricao")]
    descricao: String,
    quantidade: u32,
    #[serde(default, alias = "valor")]
    valor_unitario: f64,
    #[serde(default)]
    valor_total: Option<f64>,
}
impl From<SaleItemDTO> for SaleItem {
    fn from(value: SaleItemDTO) -> Self {
        let total_price = value
            .valor_total
            .unwrap_or(value.valor_unitario * f64::from(value.quantidade));
        Self {
            item_code: value.item_codigo,
            description: value.descricao,
            quantity: value.quantidade,
            unit_price: value.valor_unitario,
            total_price,
        }
    }
}

/// One row of the sales ledger: an item of a sale joined with its sale
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SaleLine {
    pub sale_id: i64,
    pub operator: String,
    pub date: NaiveDateTime,
    pub item_code: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
}
impl Sale {
    pub fn total(&self) -> f64 {
        self.items.iter().map(|i| i.total_price).sum()
    }
    pub fn lines(&self) -> Vec<SaleLine> {
        self.items
            .iter()
            .map(|item| SaleLine {
                sale_id: self.id,
                operator: self.operator.clone(),
                date: self.date,
                item_code: item.item_code.clone(),
                description: item.description.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                total_price: item.total_price,
            })
            .collect()
    }
}

/// Body of `POST /vendas`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewSale {
    pub operador: String,
    pub itens: Vec<NewSaleItem>,
}
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewSaleItem {
    pub item_codigo: String,
    pub quantidade: u32,
}
