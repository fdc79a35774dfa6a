use crate::{
    gateway::RetailApi,
    models::{StockReduction, StockRemoval},
    Result,
};

use super::{positive_quantity, required, Modal};

/// Lowers or removes the stock of one item code
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdjustStockForm {
    pub item_code: String,
    pub quantity: String,
    pub operator: String,
}

impl AdjustStockForm {
    pub async fn reduce(&self, api: &dyn RetailApi) -> Modal {
        match self.try_reduce(api).await {
            Ok(message) => {
                Modal::success(message.unwrap_or(String::from("Estoque reduzido com sucesso.")))
            }
            Err(e) => Modal::from(e),
        }
    }
    pub async fn remove(&self, api: &dyn RetailApi) -> Modal {
        match self.try_remove(api).await {
            Ok(message) => {
                Modal::success(message.unwrap_or(String::from("Item excluído com sucesso.")))
            }
            Err(e) => Modal::from(e),
        }
    }
    async fn try_reduce(&self, api: &dyn RetailApi) -> Result<Option<String>> {
        let code = required(&self.item_code, "código do item")?;
        let quantidade = positive_quantity(&self.quantity)?;
        let record = api.find_stock_by_code(&code).await?;
        tracing::info!("reducing stock {id} by {quantidade}", id = record.id);
        api.reduce_stock(record.id, &StockReduction { quantidade })
            .await
    }
    async fn try_remove(&self, api: &dyn RetailApi) -> Result<Option<String>> {
        let code = required(&self.item_code, "código do item")?;
        let operador = required(&self.operator, "operador")?;
        let record = api.find_stock_by_code(&code).await?;
        tracing::info!("removing stock {id} ({code})", id = record.id);
        api.remove_stock(record.id, &StockRemoval { operador }).await
    }
}
