use crate::{
    gateway::RetailApi,
    models::{CatalogItem, StockEntry},
    Result,
};

use super::{positive_quantity, required, Modal};

/// Fields of the stock registration screen
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegisterStockForm {
    pub operator: String,
    pub item_code: String,
    pub quantity: String,
}

impl RegisterStockForm {
    pub fn validate(&self) -> Result<StockEntry> {
        Ok(StockEntry {
            operador: required(&self.operator, "operador")?,
            item_codigo: required(&self.item_code, "código do item")?,
            quantidade: positive_quantity(&self.quantity)?,
        })
    }
    /// Looks the typed code up in the catalog
    pub async fn check_item(&self, api: &dyn RetailApi) -> Result<CatalogItem> {
        let code = required(&self.item_code, "código do item")?;
        api.find_item(&code).await
    }
    pub async fn submit(&self, api: &dyn RetailApi) -> Modal {
        match self.try_submit(api).await {
            Ok(_) => Modal::success("Estoque atualizado com sucesso!"),
            Err(e) => {
                tracing::error!("stock registration failed: {e}");
                Modal::from(e)
            }
        }
    }
    async fn try_submit(&self, api: &dyn RetailApi) -> Result<Option<String>> {
        let entry = self.validate()?;
        self.check_item(api).await?;
        tracing::info!(
            "registering {quantity} of {code}",
            quantity = entry.quantidade,
            code = entry.item_codigo
        );
        api.register_stock(&entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{views::fake::FakeApi, AppError};

    fn form(operator: &str, code: &str, quantity: &str) -> RegisterStockForm {
        RegisterStockForm {
            operator: operator.to_string(),
            item_code: code.to_string(),
            quantity: quantity.to_string(),
        }
    }

    #[tokio::test]
    async fn registers_known_item() {
        let api = FakeApi::with_items(&[("001", "Arroz 5kg", 25.9)]);
        let modal = form(" João ", "001", "10").submit(&api).await;
        assert_eq!(modal, Modal::success("Estoque atualizado com sucesso!"));
        assert_eq!(api.calls(), vec!["register 001 10 João"]);
    }
    #[tokio::test]
    async fn unknown_item_is_not_sent() {
        let api = FakeApi::with_items(&[("001", "Arroz 5kg", 25.9)]);
        let modal = form("João", "002", "10").submit(&api).await;
        assert_eq!(modal, Modal::error("Item com código 002 não encontrado."));
        assert!(api.calls().is_empty());
    }
    #[tokio::test]
    async fn empty_fields_fail_validation() {
        let api = FakeApi::with_items(&[("001", "Arroz 5kg", 25.9)]);
        assert!(matches!(
            form("", "001", "1").validate(),
            Err(AppError::ValidationFailed(_))
        ));
        let modal = form("João", "001", "0").submit(&api).await;
        assert!(!modal.is_success());
        assert!(api.calls().is_empty());
    }
    #[tokio::test]
    async fn server_error_is_shown() {
        let mut api = FakeApi::with_items(&[("001", "Arroz 5kg", 25.9)]);
        api.fail_with = Some(AppError::ServerRejected {
            status: 400,
            message: String::from("Operador inválido"),
        });
        let modal = form("João", "001", "3").submit(&api).await;
        assert_eq!(modal, Modal::error("Operador inválido"));
    }
}
