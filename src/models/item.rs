use serde::{Deserialize, Serialize};

/// Catalog entry, `GET /items`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(rename = "valor", default)]
    pub price: f64,
}

/// Body of `POST /items`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewItem {
    pub codigo: String,
    pub descricao: String,
    pub valor: f64,
}
