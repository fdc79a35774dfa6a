use std::fmt::{Display, Formatter};

use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;

use crate::{
    config::Config,
    models::{
        ApiErrorBody, ApiMessage, CatalogItem, MovementLog, NewItem, NewSale, Sale, StockEntry,
        StockRecord, StockReduction, StockRemoval,
    },
    AppError, Result,
};

/// Every endpoint of the retail API this client talks to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    ListStock,
    RegisterStock,
    ReduceStock(i64),
    RemoveStock(i64),
    ListItems,
    CreateItem,
    ListSales,
    CreateSale,
    ListMovements,
    DeleteMovement(i64),
}

impl Operation {
    pub fn method(&self) -> Method {
        match self {
            Self::ListStock | Self::ListItems | Self::ListSales | Self::ListMovements => {
                Method::GET
            }
            Self::RegisterStock | Self::CreateItem | Self::CreateSale => Method::POST,
            Self::ReduceStock(_) | Self::RemoveStock(_) | Self::DeleteMovement(_) => {
                Method::DELETE
            }
        }
    }
    pub fn path(&self) -> String {
        match self {
            Self::ListStock | Self::RegisterStock => String::from("/estoque"),
            Self::ReduceStock(id) => format!("/estoque/{id}/reduce"),
            Self::RemoveStock(id) => format!("/estoque/{id}/delete-complete"),
            Self::ListItems | Self::CreateItem => String::from("/items"),
            Self::ListSales | Self::CreateSale => String::from("/vendas"),
            Self::ListMovements => String::from("/estoque_log/"),
            Self::DeleteMovement(id) => format!("/estoque_log/{id}"),
        }
    }
}
impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

/// The retail API as the views see it
#[async_trait::async_trait]
pub trait RetailApi: Send + Sync {
    async fn list_stock(&self) -> Result<Vec<StockRecord>>;
    async fn register_stock(&self, entry: &StockEntry) -> Result<Option<String>>;
    async fn reduce_stock(&self, stock_id: i64, reduction: &StockReduction)
        -> Result<Option<String>>;
    async fn remove_stock(&self, stock_id: i64, removal: &StockRemoval) -> Result<Option<String>>;
    async fn list_items(&self) -> Result<Vec<CatalogItem>>;
    async fn create_item(&self, item: &NewItem) -> Result<Option<String>>;
    async fn list_sales(&self) -> Result<Vec<Sale>>;
    async fn create_sale(&self, sale: &NewSale) -> Result<Option<String>>;
    async fn list_movements(&self) -> Result<Vec<MovementLog>>;
    async fn delete_movement(&self, log_id: i64) -> Result<Option<String>>;

    /// The API has no lookup by code, so this scans the catalog
    async fn find_item(&self, code: &str) -> Result<CatalogItem> {
        let code = code.trim();
        self.list_items()
            .await?
            .into_iter()
            .find(|i| i.code == code)
            .ok_or_else(|| AppError::NotFound(format!("Item com código {code} não encontrado.")))
    }
    async fn find_stock_by_code(&self, code: &str) -> Result<StockRecord> {
        let code = code.trim();
        self.list_stock()
            .await?
            .into_iter()
            .find(|s| s.item_code == code)
            .ok_or_else(|| {
                AppError::NotFound(format!("Estoque para o item {code} não encontrado."))
            })
    }
}

#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    config: Config,
}

impl HttpGateway {
    pub fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Sends one request and returns the body of a 2xx answer. Non-2xx
    /// answers become typed errors carrying the server's message.
    #[instrument(name = "api call", skip_all, fields(op = %operation))]
    async fn send(
        &self,
        operation: Operation,
        body: Option<serde_json::Value>,
    ) -> Result<String> {
        let url = self.config.url(&operation.path());
        let mut request = self.client.request(operation.method(), &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(|e| {
            tracing::error!("request to {url} failed: {e:?}");
            AppError::from(e)
        })?;
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            tracing::debug!("{status}, {len} bytes", len = text.len());
            return Ok(text);
        }
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .and_then(ApiErrorBody::text)
            .unwrap_or(format!("Erro HTTP: {}", status.as_u16()));
        tracing::error!("{status}: {message}");
        Err(AppError::from_status(status, message))
    }
    async fn fetch<T: DeserializeOwned>(&self, operation: Operation) -> Result<T> {
        let text = self.send(operation, None).await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!("unexpected body from {operation}: {e}");
            AppError::ValidationFailed(format!("Resposta inválida do servidor: {e}"))
        })
    }
    async fn submit<B: Serialize + Sync>(
        &self,
        operation: Operation,
        body: Option<&B>,
    ) -> Result<Option<String>> {
        let body = body.map(serde_json::to_value).transpose()?;
        let text = self.send(operation, body).await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(serde_json::from_str::<ApiMessage>(&text)
            .ok()
            .and_then(|m| m.message))
    }
}

#[async_trait::async_trait]
impl RetailApi for HttpGateway {
    async fn list_stock(&self) -> Result<Vec<StockRecord>> {
        let records: Vec<StockRecord> = self.fetch(Operation::ListStock).await?;
        tracing::info!("received {len} stock records", len = records.len());
        Ok(records)
    }
    async fn register_stock(&self, entry: &StockEntry) -> Result<Option<String>> {
        self.submit(Operation::RegisterStock, Some(entry)).await
    }
    async fn reduce_stock(
        &self,
        stock_id: i64,
        reduction: &StockReduction,
    ) -> Result<Option<String>> {
        self.submit(Operation::ReduceStock(stock_id), Some(reduction))
            .await
    }
    async fn remove_stock(&self, stock_id: i64, removal: &StockRemoval) -> Result<Option<String>> {
        self.submit(Operation::RemoveStock(stock_id), Some(removal))
            .await
    }
    async fn list_items(&self) -> Result<Vec<CatalogItem>> {
        self.fetch(Operation::ListItems).await
    }
    async fn create_item(&self, item: &NewItem) -> Result<Option<String>> {
        self.submit(Operation::CreateItem, Some(item)).await
    }
    async fn list_sales(&self) -> Result<Vec<Sale>> {
        let sales: Vec<Sale> = self.fetch(Operation::ListSales).await?;
        tracing::info!("received {len} sales", len = sales.len());
        Ok(sales)
    }
    async fn create_sale(&self, sale: &NewSale) -> Result<Option<String>> {
        self.submit(Operation::CreateSale, Some(sale)).await
    }
    async fn list_movements(&self) -> Result<Vec<MovementLog>> {
        let logs: Vec<MovementLog> = self.fetch(Operation::ListMovements).await?;
        tracing::info!("received {len} movement log entries", len = logs.len());
        Ok(logs)
    }
    async fn delete_movement(&self, log_id: i64) -> Result<Option<String>> {
        self.submit::<()>(Operation::DeleteMovement(log_id), None)
            .await
    }
}
