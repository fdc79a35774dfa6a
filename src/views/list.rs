use crate::{
    gateway::RetailApi,
    models::{MovementLog, SaleLine, StockRecord, StockRemoval},
    reconciler::{Filters, LoadState, Reconciler, Record},
    utils::{format_money, format_timestamp, render_table},
    Result,
};

use super::{required, Modal};

/// A record kind that a list screen can fetch and print
#[async_trait::async_trait]
pub trait Source: Record + Send + Sync {
    const HEADERS: &'static [&'static str];
    async fn fetch(api: &dyn RetailApi) -> Result<Vec<Self>>;
    fn cells(&self) -> Vec<String>;
    fn total_line(total: f64) -> String;
}

#[async_trait::async_trait]
impl Source for StockRecord {
    const HEADERS: &'static [&'static str] = &["ID", "Código", "Descrição", "Quantidade", "Operador"];
    async fn fetch(api: &dyn RetailApi) -> Result<Vec<Self>> {
        api.list_stock().await
    }
    fn cells(&self) -> Vec<String> {
        let description = if self.description.is_empty() {
            String::from("Descrição indisponível")
        } else {
            self.description.clone()
        };
        let operator = if self.operator.is_empty() {
            String::from("N/A")
        } else {
            self.operator.clone()
        };
        vec![
            self.id.to_string(),
            self.item_code.clone(),
            description,
            self.quantity.to_string(),
            operator,
        ]
    }
    fn total_line(total: f64) -> String {
        format!("Quantidade total: {total:.0}")
    }
}

#[async_trait::async_trait]
impl Source for SaleLine {
    const HEADERS: &'static [&'static str] = &[
        "Venda",
        "Data",
        "Operador",
        "Código",
        "Descrição",
        "Qtd",
        "Unitário",
        "Total",
    ];
    async fn fetch(api: &dyn RetailApi) -> Result<Vec<Self>> {
        let sales = api.list_sales().await?;
        Ok(sales.iter().flat_map(|s| s.lines()).collect())
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.sale_id.to_string(),
            format_timestamp(&self.date),
            self.operator.clone(),
            self.item_code.clone(),
            self.description.clone(),
            self.quantity.to_string(),
            format_money(self.unit_price),
            format_money(self.total_price),
        ]
    }
    fn total_line(total: f64) -> String {
        format!("Total vendido: {}", format_money(total))
    }
}

#[async_trait::async_trait]
impl Source for MovementLog {
    const HEADERS: &'static [&'static str] =
        &["ID", "Data", "Estoque", "Código", "Quantidade", "Operação"];
    async fn fetch(api: &dyn RetailApi) -> Result<Vec<Self>> {
        api.list_movements().await
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            format_timestamp(&self.operation_date),
            self.stock_record_id.to_string(),
            self.item_code.clone(),
            self.quantity_changed.to_string(),
            self.operation_type.label().to_string(),
        ]
    }
    fn total_line(total: f64) -> String {
        format!("Saldo das movimentações: {total:.0}")
    }
}

/// A fetched list with its filter form
pub struct ListView<R: Record> {
    reconciler: Reconciler<R>,
}

pub type StockList = ListView<StockRecord>;
pub type SalesLedger = ListView<SaleLine>;
pub type MovementReport = ListView<MovementLog>;

impl<R: Record> Default for ListView<R> {
    fn default() -> Self {
        Self {
            reconciler: Reconciler::new(),
        }
    }
}

impl<R: Source> ListView<R> {
    pub fn new() -> Self {
        Self::default()
    }
    /// Fetches and applies the list. The `&mut` borrow spans the fetch, so
    /// loads of one view never overlap.
    pub async fn load(&mut self, api: &dyn RetailApi) -> bool {
        let generation = self.reconciler.begin_load();
        let result = R::fetch(api).await;
        if let Err(e) = &result {
            tracing::error!("failed to load list: {e}");
        }
        self.reconciler.finish_load(generation, result)
    }
    /// Applies the raw filter fields; on bad input the current filters stay
    pub fn apply_filters(&mut self, start_date: &str, end_date: &str, code: &str) -> Result<()> {
        let filters = Filters::parse(start_date, end_date, code)?;
        self.reconciler.set_filters(filters);
        Ok(())
    }
    pub fn reset_filters(&mut self) {
        self.reconciler.clear_filters();
    }
    pub fn rows(&self) -> &[R] {
        self.reconciler.filtered()
    }
    pub fn total(&self) -> f64 {
        self.reconciler.aggregate()
    }
    pub fn reconciler(&self) -> &Reconciler<R> {
        &self.reconciler
    }
    pub fn render(&self) -> String {
        match self.reconciler.state() {
            LoadState::Idle | LoadState::Loading => String::from("Carregando..."),
            LoadState::Failed(e) => e.user_message(),
            LoadState::Ready if self.rows().is_empty() => {
                String::from("Nenhum registro encontrado.")
            }
            LoadState::Ready => {
                let rows = self.rows().iter().map(Source::cells).collect::<Vec<_>>();
                format!(
                    "{}\n\n{}",
                    render_table(R::HEADERS, &rows),
                    R::total_line(self.total())
                )
            }
        }
    }
}

impl ListView<StockRecord> {
    /// Removes the record on the server, then from the local list
    pub async fn remove(&mut self, api: &dyn RetailApi, stock_id: i64, operator: &str) -> Modal {
        let operator = match required(operator, "operador") {
            Ok(o) => o,
            Err(e) => return Modal::from(e),
        };
        match api
            .remove_stock(stock_id, &StockRemoval { operador: operator })
            .await
        {
            Ok(message) => {
                self.reconciler.remove(stock_id);
                Modal::success(message.unwrap_or(String::from("Item excluído com sucesso.")))
            }
            Err(e) => Modal::from(e),
        }
    }
}

impl ListView<MovementLog> {
    pub async fn delete(&mut self, api: &dyn RetailApi, log_id: i64) -> Modal {
        match api.delete_movement(log_id).await {
            Ok(message) => {
                self.reconciler.remove(log_id);
                Modal::success(message.unwrap_or(String::from("Registro excluído com sucesso.")))
            }
            Err(e) => Modal::from(e),
        }
    }
}
