use crate::{gateway::RetailApi, models::NewItem, AppError, Result};

use super::{required, Modal};

/// Fields of the catalog item screen
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewItemForm {
    pub code: String,
    pub description: String,
    pub price: String,
}

impl NewItemForm {
    pub fn validate(&self) -> Result<NewItem> {
        let raw_price = required(&self.price, "valor")?;
        let price = raw_price
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .ok_or_else(|| AppError::ValidationFailed(format!("Valor inválido: {raw_price}")))?;
        Ok(NewItem {
            codigo: required(&self.code, "código")?,
            descricao: required(&self.description, "descrição")?,
            valor: price,
        })
    }
    pub async fn submit(&self, api: &dyn RetailApi) -> Modal {
        let item = match self.validate() {
            Ok(item) => item,
            Err(e) => return Modal::from(e),
        };
        match api.create_item(&item).await {
            Ok(message) => {
                tracing::info!("created catalog item {code}", code = item.codigo);
                Modal::success(message.unwrap_or(String::from("Item cadastrado com sucesso!")))
            }
            Err(e) => Modal::from(e),
        }
    }
}
