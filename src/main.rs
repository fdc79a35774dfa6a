use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use retail_desk::{
    config::{Config, BASE_URL_VAR, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, TIMEOUT_VAR},
    gateway::{HttpGateway, RetailApi},
    shell::Shell,
    utils::render_table,
    views::{
        AdjustStockForm, ListView, Modal, MovementReport, NewItemForm, PointOfSaleForm,
        RegisterStockForm, SalesLedger, Source, StockList,
    },
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "retail-desk", version, about = "Front desk for the retail stock and sales API")]
struct Cli {
    /// Base url of the retail API
    #[arg(long, global = true, env = BASE_URL_VAR, default_value = DEFAULT_BASE_URL)]
    api_url: String,
    /// Request timeout in seconds
    #[arg(long, global = true, env = TIMEOUT_VAR, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Stock records
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },
    /// Catalog items
    Items {
        #[command(subcommand)]
        action: ItemAction,
    },
    /// Registers a sale
    Sell {
        #[arg(long)]
        operator: String,
        /// CODE:QUANTITY, repeatable
        #[arg(long = "item", required = true)]
        items: Vec<String>,
        /// Writes a text receipt of the sale to this file
        #[arg(long)]
        receipt: Option<PathBuf>,
    },
    /// Sales ledger, one row per sold item
    Sales {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Stock movement report
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        /// Deletes this movement log entry before listing
        #[arg(long)]
        delete: Option<i64>,
    },
    /// Interactive menu (default)
    Shell,
}

#[derive(Subcommand)]
enum StockAction {
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },
    Register {
        #[arg(long)]
        operator: String,
        #[arg(long)]
        code: String,
        #[arg(long)]
        quantity: String,
    },
    /// Lowers the stock of an item code
    Reduce {
        #[arg(long)]
        code: String,
        #[arg(long)]
        quantity: String,
    },
    /// Removes the whole stock record of an item code
    Remove {
        #[arg(long)]
        code: String,
        #[arg(long)]
        operator: String,
    },
}

#[derive(Subcommand)]
enum ItemAction {
    List,
    Create {
        #[arg(long)]
        code: String,
        #[arg(long)]
        description: String,
        /// Unit price, comma or dot decimals
        #[arg(long)]
        price: String,
    },
}

#[derive(clap::Args)]
struct FilterArgs {
    /// First day, YYYY-MM-DD or DD/MM/YYYY
    #[arg(long, default_value = "")]
    from: String,
    /// Last day, inclusive
    #[arg(long, default_value = "")]
    to: String,
    /// Item code fragment, case insensitive
    #[arg(long, default_value = "")]
    code: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let config = Config::builder()
        .base_url(cli.api_url)
        .timeout(Duration::from_secs(cli.timeout))
        .build()
        .context("invalid configuration")?;
    info!("using retail API at {}", config.base_url);
    let api = HttpGateway::new(config)?;

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => Shell::new(&api).run().await?,
        Command::Stock { action } => stock(&api, action).await?,
        Command::Items { action } => items(&api, action).await?,
        Command::Sell {
            operator,
            items,
            receipt,
        } => sell(&api, operator, items, receipt).await?,
        Command::Sales { filters } => {
            let mut view = SalesLedger::new();
            print_list(&mut view, &api, &filters).await?;
        }
        Command::Report { filters, delete } => {
            let mut view = MovementReport::new();
            if let Some(id) = delete {
                report(view.delete(&api, id).await)?;
            }
            print_list(&mut view, &api, &filters).await?;
        }
    }
    Ok(())
}

async fn stock(api: &dyn RetailApi, action: StockAction) -> anyhow::Result<()> {
    let modal = match action {
        StockAction::List { filters } => {
            let mut view = StockList::new();
            return print_list(&mut view, api, &filters).await;
        }
        StockAction::Register {
            operator,
            code,
            quantity,
        } => {
            RegisterStockForm {
                operator,
                item_code: code,
                quantity,
            }
            .submit(api)
            .await
        }
        StockAction::Reduce { code, quantity } => {
            AdjustStockForm {
                item_code: code,
                quantity,
                ..Default::default()
            }
            .reduce(api)
            .await
        }
        StockAction::Remove { code, operator } => {
            AdjustStockForm {
                item_code: code,
                operator,
                ..Default::default()
            }
            .remove(api)
            .await
        }
    };
    report(modal)
}

async fn items(api: &dyn RetailApi, action: ItemAction) -> anyhow::Result<()> {
    match action {
        ItemAction::List => {
            let rows = api
                .list_items()
                .await?
                .into_iter()
                .map(|i| {
                    vec![
                        i.code,
                        i.description,
                        retail_desk::utils::format_money(i.price),
                    ]
                })
                .collect::<Vec<_>>();
            println!("{}", render_table(&["Código", "Descrição", "Valor"], &rows));
            Ok(())
        }
        ItemAction::Create {
            code,
            description,
            price,
        } => report(
            NewItemForm {
                code,
                description,
                price,
            }
            .submit(api)
            .await,
        ),
    }
}

async fn sell(
    api: &dyn RetailApi,
    operator: String,
    items: Vec<String>,
    receipt: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut pos = PointOfSaleForm::new(operator);
    for item in &items {
        let (code, quantity) = item.split_once(':').unwrap_or((item.as_str(), "1"));
        pos.add_line(api, code, quantity)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    }
    let text = pos.receipt(chrono::Local::now().naive_local());
    report(pos.submit(api).await)?;
    if let Some(path) = receipt {
        tokio::fs::write(&path, text)
            .await
            .with_context(|| format!("could not write receipt to {}", path.display()))?;
        println!("Cupom salvo em {}", path.display());
    }
    Ok(())
}

async fn print_list<R: Source>(
    view: &mut ListView<R>,
    api: &dyn RetailApi,
    filters: &FilterArgs,
) -> anyhow::Result<()> {
    view.load(api).await;
    if let Some(e) = view.reconciler().error() {
        bail!(e);
    }
    view.apply_filters(&filters.from, &filters.to, &filters.code)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    println!("{}", view.render());
    Ok(())
}

fn report(modal: Modal) -> anyhow::Result<()> {
    if modal.is_success() {
        println!("{}", modal.message);
        Ok(())
    } else {
        bail!(modal.message)
    }
}
