use chrono::NaiveDateTime;

use crate::{
    gateway::RetailApi,
    models::{NewSale, NewSaleItem},
    utils::{format_money, format_timestamp},
    AppError, Result,
};

use super::{positive_quantity, required, Modal};

#[derive(Clone, Debug, PartialEq)]
pub struct CartLine {
    pub item_code: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
}
impl CartLine {
    pub fn total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Cash register screen: an operator and the items being sold
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointOfSaleForm {
    pub operator: String,
    lines: Vec<CartLine>,
}

impl PointOfSaleForm {
    pub fn new<S: Into<String>>(operator: S) -> Self {
        Self {
            operator: operator.into(),
            lines: Vec::new(),
        }
    }
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }
    /// Adds `quantity` of `code` to the cart, pricing it from the catalog.
    /// Adding a code already in the cart increases its quantity.
    pub async fn add_line(
        &mut self,
        api: &dyn RetailApi,
        code: &str,
        quantity: &str,
    ) -> Result<&CartLine> {
        let code = required(code, "código do item")?;
        let quantity = positive_quantity(quantity)?;
        let index = match self.lines.iter().position(|l| l.item_code == code) {
            Some(index) => {
                let line = &mut self.lines[index];
                line.quantity = line.quantity.checked_add(quantity).ok_or_else(|| {
                    AppError::ValidationFailed(format!("Quantidade inválida: {quantity}"))
                })?;
                index
            }
            None => {
                let item = api.find_item(&code).await?;
                self.lines.push(CartLine {
                    item_code: item.code,
                    description: item.description,
                    quantity,
                    unit_price: item.price,
                });
                self.lines.len() - 1
            }
        };
        Ok(&self.lines[index])
    }
    pub fn remove_line(&mut self, code: &str) -> bool {
        let code = code.trim();
        let before = self.lines.len();
        self.lines.retain(|l| l.item_code != code);
        before != self.lines.len()
    }
    pub fn total(&self) -> f64 {
        self.lines.iter().map(CartLine::total).sum()
    }
    pub fn clear(&mut self) {
        self.lines.clear();
    }
    pub fn validate(&self) -> Result<NewSale> {
        let operador = required(&self.operator, "operador")?;
        if self.lines.is_empty() {
            return Err(AppError::ValidationFailed(String::from(
                "Adicione ao menos um item à venda.",
            )));
        }
        Ok(NewSale {
            operador,
            itens: self
                .lines
                .iter()
                .map(|l| NewSaleItem {
                    item_codigo: l.item_code.clone(),
                    quantidade: l.quantity,
                })
                .collect(),
        })
    }
    /// Posts the sale. The cart is emptied only when the server accepts it.
    pub async fn submit(&mut self, api: &dyn RetailApi) -> Modal {
        let sale = match self.validate() {
            Ok(sale) => sale,
            Err(e) => return Modal::from(e),
        };
        match api.create_sale(&sale).await {
            Ok(message) => {
                tracing::info!(
                    "sale by {operator} with {len} items, total {total:.2}",
                    operator = sale.operador,
                    len = sale.itens.len(),
                    total = self.total()
                );
                self.clear();
                Modal::success(message.unwrap_or(String::from("Venda registrada com sucesso!")))
            }
            Err(e) => {
                tracing::error!("sale rejected: {e}");
                Modal::from(e)
            }
        }
    }
    /// Plain text receipt of the current cart
    pub fn receipt(&self, at: NaiveDateTime) -> String {
        let mut out = vec![
            format!("Operador: {}", self.operator.trim()),
            format!("Data: {}", format_timestamp(&at)),
            String::new(),
        ];
        for line in &self.lines {
            out.push(format!(
                "{code} {description}\n  {quantity} x {unit} = {total}",
                code = line.item_code,
                description = line.description,
                quantity = line.quantity,
                unit = format_money(line.unit_price),
                total = format_money(line.total()),
            ));
        }
        out.push(String::new());
        out.push(format!("Total: {}", format_money(self.total())));
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{utils::parse_timestamp, views::fake::FakeApi};
    use anyhow::Result;

    fn api() -> FakeApi {
        FakeApi::with_items(&[("001", "Arroz 5kg", 25.5), ("002", "Feijão 1kg", 8.0)])
    }

    #[tokio::test]
    async fn cart_merges_codes_and_totals() -> Result<()> {
        let api = api();
        let mut pos = PointOfSaleForm::new("Ana");
        pos.add_line(&api, "001", "2").await?;
        pos.add_line(&api, "002", "1").await?;
        let merged = pos.add_line(&api, " 001 ", "1").await?;
        assert_eq!(merged.quantity, 3);
        assert_eq!(pos.lines().len(), 2);
        assert_eq!(pos.total(), 84.5);
        assert!(pos.remove_line("002"));
        assert!(!pos.remove_line("002"));
        assert_eq!(pos.total(), 76.5);
        Ok(())
    }
    #[tokio::test]
    async fn unknown_code_is_not_added() {
        let api = api();
        let mut pos = PointOfSaleForm::new("Ana");
        let err = pos.add_line(&api, "999", "1").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(pos.lines().is_empty());
    }
    #[tokio::test]
    async fn submit_posts_cart_and_clears_it() -> Result<()> {
        let api = api();
        let mut pos = PointOfSaleForm::new("Ana");
        pos.add_line(&api, "001", "2").await?;
        pos.add_line(&api, "002", "3").await?;
        let modal = pos.submit(&api).await;
        assert_eq!(modal, Modal::success("Venda registrada com sucesso!"));
        assert_eq!(api.calls(), vec!["sale Ana 001x2,002x3"]);
        assert!(pos.lines().is_empty());
        assert_eq!(pos.operator, "Ana");
        Ok(())
    }
    #[tokio::test]
    async fn rejected_sale_keeps_cart() -> Result<()> {
        let mut api = api();
        let mut pos = PointOfSaleForm::new("Ana");
        pos.add_line(&api, "001", "1").await?;
        api.fail_with = Some(AppError::ServerRejected {
            status: 400,
            message: String::from("Estoque insuficiente"),
        });
        let modal = pos.submit(&api).await;
        assert_eq!(modal, Modal::error("Estoque insuficiente"));
        assert_eq!(pos.lines().len(), 1);
        Ok(())
    }
    #[tokio::test]
    async fn empty_cart_or_operator_is_invalid() -> Result<()> {
        let api = api();
        let mut pos = PointOfSaleForm::new("Ana");
        assert!(!pos.submit(&api).await.is_success());
        pos.add_line(&api, "001", "1").await?;
        pos.operator = String::from("  ");
        assert!(!pos.submit(&api).await.is_success());
        assert!(api.calls().is_empty());
        Ok(())
    }
    #[tokio::test]
    async fn receipt_lists_lines_and_total() -> Result<()> {
        let api = api();
        let mut pos = PointOfSaleForm::new("Ana");
        pos.add_line(&api, "001", "2").await?;
        let receipt = pos.receipt(parse_timestamp("2025-01-08T09:15:00").unwrap());
        assert_eq!(
            receipt,
            "Operador: Ana\nData: 08/01/2025 09:15\n\n001 Arroz 5kg\n  2 x R$ 25,50 = R$ 51,00\n\nTotal: R$ 51,00"
        );
        Ok(())
    }
}
