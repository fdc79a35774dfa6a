//! Line oriented front-end. Each input line is handled by the screen the
//! [`Router`] currently shows, and the reply is the text to print.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, instrument};

use crate::{
    gateway::RetailApi,
    router::{Action, Router, StockPanel, View},
    views::{
        AdjustStockForm, Modal, MovementReport, NewItemForm, PointOfSaleForm, RegisterStockForm,
        SalesLedger, StockList,
    },
};

const HOME_MENU: &str = "1 📦 Estoque\n2 🛒 PDV\n3 💰 Vendas\n4 📋 Relatório\n5 ❓ Ajuda";
const STOCK_MENU: &str =
    "1 Registrar estoque\n2 Listagem de estoque\n3 Baixa / exclusão\n4 Cadastrar item";
const HELP: &str = "Comandos em qualquer tela: inicio, voltar, ajuda, sair.
Registrar estoque: operador; código; quantidade
Baixa: baixa <código> <quantidade> | excluir <código> <operador>
Cadastrar item: código; descrição; valor
PDV: operador <nome> | add <código> <qtd> | rm <código> | cupom | finalizar | limpar
Listas: filtrar <início|-> <fim|-> <código|-> | limpar | recarregar | excluir <id> [operador]";
const UNKNOWN: &str = "Não entendi. Digite ajuda para ver os comandos.";

pub struct Reply {
    pub text: String,
    pub quit: bool,
}
impl Reply {
    fn text<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }
}
impl From<Modal> for Reply {
    fn from(value: Modal) -> Self {
        Self::text(value.to_string())
    }
}

pub struct Shell<'a> {
    api: &'a dyn RetailApi,
    router: Router,
    stock_list: StockList,
    sales: SalesLedger,
    report: MovementReport,
    pos: PointOfSaleForm,
}

impl<'a> Shell<'a> {
    pub fn new(api: &'a dyn RetailApi) -> Self {
        Self {
            api,
            router: Router::new(),
            stock_list: StockList::new(),
            sales: SalesLedger::new(),
            report: MovementReport::new(),
            pos: PointOfSaleForm::default(),
        }
    }
    pub fn view(&self) -> View {
        self.router.current()
    }
    /// Reads stdin until `sair` or end of input
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        stdout.write_all(self.screen().as_bytes()).await?;
        loop {
            stdout
                .write_all(format!("\n{}> ", self.view()).as_bytes())
                .await?;
            stdout.flush().await?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let reply = self.handle(&line).await;
            stdout.write_all(reply.text.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            if reply.quit {
                break;
            }
        }
        Ok(())
    }

    #[instrument(name = "shell input", skip(self), fields(view = %self.router.current()))]
    pub async fn handle(&mut self, line: &str) -> Reply {
        let line = line.trim();
        let action = match line.to_lowercase().as_str() {
            "" => return Reply::text(self.screen()),
            "sair" | "quit" => {
                return Reply {
                    text: String::from("Até logo!"),
                    quit: true,
                }
            }
            "inicio" | "início" | "home" => Some(Action::Home),
            "voltar" | "back" => Some(Action::Back),
            "ajuda" | "help" => Some(Action::OpenHelp),
            _ => None,
        };
        if let Some(action) = action {
            return self.navigate(action).await;
        }
        match self.router.current() {
            View::Home => self.home(line).await,
            View::Stock(StockPanel::Menu) => self.stock_menu(line).await,
            View::Stock(StockPanel::Register) => self.register_stock(line).await,
            View::Stock(StockPanel::Adjust) => self.adjust_stock(line).await,
            View::Stock(StockPanel::NewItem) => self.new_item(line).await,
            View::Stock(StockPanel::List) => self.stock_list(line).await,
            View::PointOfSale => self.point_of_sale(line).await,
            View::Sales => self.sales(line).await,
            View::Report => self.report(line).await,
            View::Help => Reply::text(UNKNOWN),
        }
    }

    async fn navigate(&mut self, action: Action) -> Reply {
        let visit = self.router.visit();
        self.router.dispatch(action);
        if self.router.visit() != visit {
            let view = self.router.current();
            info!("opened {view}");
            if view.is_list() {
                self.reload().await;
            }
        }
        Reply::text(self.screen())
    }
    /// Refetches the list shown by the current view
    async fn reload(&mut self) {
        match self.router.current() {
            View::Stock(StockPanel::List) => {
                self.stock_list.load(self.api).await;
            }
            View::Sales => {
                self.sales.load(self.api).await;
            }
            View::Report => {
                self.report.load(self.api).await;
            }
            _ => {}
        }
    }
    fn screen(&self) -> String {
        let view = self.router.current();
        let body = match view {
            View::Home => String::from(HOME_MENU),
            View::Stock(StockPanel::Menu) => String::from(STOCK_MENU),
            View::Stock(StockPanel::Register) => String::from("Informe: operador; código; quantidade"),
            View::Stock(StockPanel::Adjust) => {
                String::from("baixa <código> <quantidade> | excluir <código> <operador>")
            }
            View::Stock(StockPanel::NewItem) => String::from("Informe: código; descrição; valor"),
            View::Stock(StockPanel::List) => self.stock_list.render(),
            View::PointOfSale => self.cart(),
            View::Sales => self.sales.render(),
            View::Report => self.report.render(),
            View::Help => String::from(HELP),
        };
        format!("== {view} ==\n{body}")
    }
    fn cart(&self) -> String {
        let operator = if self.pos.operator.trim().is_empty() {
            String::from("(defina com: operador <nome>)")
        } else {
            self.pos.operator.clone()
        };
        let mut out = vec![format!("Operador: {operator}")];
        for line in self.pos.lines() {
            out.push(format!(
                "{} {} x{} = {}",
                line.item_code,
                line.description,
                line.quantity,
                crate::utils::format_money(line.total())
            ));
        }
        out.push(format!(
            "Total: {}",
            crate::utils::format_money(self.pos.total())
        ));
        out.join("\n")
    }

    async fn home(&mut self, line: &str) -> Reply {
        let action = match line {
            "1" => Action::OpenStock,
            "2" => Action::OpenPointOfSale,
            "3" => Action::OpenSales,
            "4" => Action::OpenReport,
            "5" => Action::OpenHelp,
            _ => return Reply::text(UNKNOWN),
        };
        self.navigate(action).await
    }
    async fn stock_menu(&mut self, line: &str) -> Reply {
        let panel = match line {
            "1" => StockPanel::Register,
            "2" => StockPanel::List,
            "3" => StockPanel::Adjust,
            "4" => StockPanel::NewItem,
            _ => return Reply::text(UNKNOWN),
        };
        self.navigate(Action::OpenStockPanel(panel)).await
    }
    async fn register_stock(&mut self, line: &str) -> Reply {
        let fields = split_fields(line);
        let [operator, item_code, quantity] = fields.as_slice() else {
            return Reply::text("Informe: operador; código; quantidade");
        };
        let form = RegisterStockForm {
            operator: operator.to_string(),
            item_code: item_code.to_string(),
            quantity: quantity.to_string(),
        };
        form.submit(self.api).await.into()
    }
    async fn adjust_stock(&mut self, line: &str) -> Reply {
        let (command, rest) = split_command(line);
        let (code, tail) = split_word(rest);
        match command.as_str() {
            "baixa" => AdjustStockForm {
                item_code: code.to_string(),
                quantity: tail.to_string(),
                ..Default::default()
            }
            .reduce(self.api)
            .await
            .into(),
            "excluir" => AdjustStockForm {
                item_code: code.to_string(),
                operator: tail.to_string(),
                ..Default::default()
            }
            .remove(self.api)
            .await
            .into(),
            _ => Reply::text(UNKNOWN),
        }
    }
    async fn new_item(&mut self, line: &str) -> Reply {
        let fields = split_fields(line);
        let [code, description, price] = fields.as_slice() else {
            return Reply::text("Informe: código; descrição; valor");
        };
        NewItemForm {
            code: code.to_string(),
            description: description.to_string(),
            price: price.to_string(),
        }
        .submit(self.api)
        .await
        .into()
    }
    async fn point_of_sale(&mut self, line: &str) -> Reply {
        let (command, rest) = split_command(line);
        match command.as_str() {
            "operador" => {
                self.pos.operator = rest.to_string();
                Reply::text(self.cart())
            }
            "add" => {
                let (code, quantity) = split_word(rest);
                let quantity = if quantity.is_empty() { "1" } else { quantity };
                match self.pos.add_line(self.api, code, quantity).await.map(|_| ()) {
                    Ok(_) => Reply::text(self.cart()),
                    Err(e) => Modal::from(e).into(),
                }
            }
            "rm" => {
                if self.pos.remove_line(rest) {
                    Reply::text(self.cart())
                } else {
                    Reply::text(format!("Item {rest} não está na venda."))
                }
            }
            "cupom" => Reply::text(self.pos.receipt(chrono::Local::now().naive_local())),
            "finalizar" => self.pos.submit(self.api).await.into(),
            "limpar" => {
                self.pos.clear();
                Reply::text(self.cart())
            }
            _ => Reply::text(UNKNOWN),
        }
    }
    async fn stock_list(&mut self, line: &str) -> Reply {
        let (command, rest) = split_command(line);
        match command.as_str() {
            "excluir" => {
                let (id, operator) = split_word(rest);
                let Ok(id) = id.parse::<i64>() else {
                    return Reply::text(format!("ID inválido: {id}"));
                };
                let modal = self.stock_list.remove(self.api, id, operator).await;
                Reply::text(format!("{modal}\n\n{}", self.stock_list.render()))
            }
            _ => list_command(&mut self.stock_list, self.api, &command, rest).await,
        }
    }
    async fn sales(&mut self, line: &str) -> Reply {
        let (command, rest) = split_command(line);
        list_command(&mut self.sales, self.api, &command, rest).await
    }
    async fn report(&mut self, line: &str) -> Reply {
        let (command, rest) = split_command(line);
        match command.as_str() {
            "excluir" => {
                let Ok(id) = rest.parse::<i64>() else {
                    return Reply::text(format!("ID inválido: {rest}"));
                };
                let modal = self.report.delete(self.api, id).await;
                Reply::text(format!("{modal}\n\n{}", self.report.render()))
            }
            _ => list_command(&mut self.report, self.api, &command, rest).await,
        }
    }
}

/// Filter, reset and reload, shared by every list screen
async fn list_command<R: crate::views::Source>(
    view: &mut crate::views::ListView<R>,
    api: &dyn RetailApi,
    command: &str,
    rest: &str,
) -> Reply {
    match command {
        "filtrar" => {
            let args = rest
                .split_whitespace()
                .map(|a| if a == "-" { "" } else { a })
                .collect::<Vec<_>>();
            let arg = |i: usize| args.get(i).copied().unwrap_or_default();
            match view.apply_filters(arg(0), arg(1), arg(2)) {
                Ok(()) => Reply::text(view.render()),
                Err(e) => Modal::from(e).into(),
            }
        }
        "limpar" => {
            view.reset_filters();
            Reply::text(view.render())
        }
        "recarregar" => {
            view.load(api).await;
            Reply::text(view.render())
        }
        _ => Reply::text(UNKNOWN),
    }
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(';').map(str::trim).collect()
}
/// First word lowercased, and the rest of the line
fn split_command(line: &str) -> (String, &str) {
    let (head, tail) = split_word(line);
    (head.to_lowercase(), tail)
}
fn split_word(line: &str) -> (&str, &str) {
    let line = line.trim();
    line.split_once(char::is_whitespace)
        .map(|(head, tail)| (head, tail.trim()))
        .unwrap_or((line, ""))
}
