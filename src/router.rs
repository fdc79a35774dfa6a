use std::fmt::{Display, Formatter};

/// Screens under the stock menu
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StockPanel {
    #[default]
    Menu,
    Register,
    List,
    Adjust,
    NewItem,
}

/// The one screen shown at a time
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Home,
    Stock(StockPanel),
    PointOfSale,
    Sales,
    Report,
    Help,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Home,
    OpenStock,
    OpenStockPanel(StockPanel),
    OpenPointOfSale,
    OpenSales,
    OpenReport,
    OpenHelp,
    Back,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "Início",
            Self::Stock(StockPanel::Menu) => "Estoque",
            Self::Stock(StockPanel::Register) => "Registrar estoque",
            Self::Stock(StockPanel::List) => "Listagem de estoque",
            Self::Stock(StockPanel::Adjust) => "Baixa de estoque",
            Self::Stock(StockPanel::NewItem) => "Cadastrar item",
            Self::PointOfSale => "PDV",
            Self::Sales => "Vendas",
            Self::Report => "Relatório de movimentações",
            Self::Help => "Ajuda",
        }
    }
    /// Views that show a fetched list and reload it on every visit
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Self::Stock(StockPanel::List) | Self::Sales | Self::Report
        )
    }
    fn apply(self, action: Action) -> View {
        match action {
            Action::Home => View::Home,
            Action::OpenStock => View::Stock(StockPanel::Menu),
            Action::OpenStockPanel(panel) => View::Stock(panel),
            Action::OpenPointOfSale => View::PointOfSale,
            Action::OpenSales => View::Sales,
            Action::OpenReport => View::Report,
            Action::OpenHelp => View::Help,
            Action::Back => match self {
                View::Stock(StockPanel::Menu) | View::Home => View::Home,
                View::Stock(_) => View::Stock(StockPanel::Menu),
                _ => View::Home,
            },
        }
    }
}
impl Display for View {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Owns the current view. The only way to change it is [`Router::dispatch`].
#[derive(Debug, Default)]
pub struct Router {
    current: View,
    visit: u64,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn current(&self) -> View {
        self.current
    }
    /// Bumped every time a different view is entered
    pub fn visit(&self) -> u64 {
        self.visit
    }
    /// Returns true when the view changed
    pub fn dispatch(&mut self, action: Action) -> bool {
        let next = self.current.apply(action);
        if next == self.current {
            return false;
        }
        tracing::debug!("view {from} -> {next}", from = self.current);
        self.current = next;
        self.visit += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_home() {
        let router = Router::new();
        assert_eq!(router.current(), View::Home);
        assert_eq!(router.visit(), 0);
    }
    #[test]
    fn back_from_stock_panel_goes_to_stock_menu() {
        let mut router = Router::new();
        router.dispatch(Action::OpenStock);
        router.dispatch(Action::OpenStockPanel(StockPanel::List));
        assert_eq!(router.current(), View::Stock(StockPanel::List));
        router.dispatch(Action::Back);
        assert_eq!(router.current(), View::Stock(StockPanel::Menu));
        router.dispatch(Action::Back);
        assert_eq!(router.current(), View::Home);
    }
    #[test]
    fn back_from_top_level_goes_home() {
        let mut router = Router::new();
        for action in [
            Action::OpenPointOfSale,
            Action::OpenSales,
            Action::OpenReport,
            Action::OpenHelp,
        ] {
            router.dispatch(action);
            router.dispatch(Action::Back);
            assert_eq!(router.current(), View::Home);
        }
    }
    #[test]
    fn visit_counts_only_real_transitions() {
        let mut router = Router::new();
        assert!(!router.dispatch(Action::Home));
        assert!(!router.dispatch(Action::Back));
        assert_eq!(router.visit(), 0);
        assert!(router.dispatch(Action::OpenReport));
        assert!(!router.dispatch(Action::OpenReport));
        assert_eq!(router.visit(), 1);
        router.dispatch(Action::Home);
        router.dispatch(Action::OpenReport);
        assert_eq!(router.visit(), 3);
    }
    #[test]
    fn list_views() {
        assert!(View::Sales.is_list());
        assert!(View::Report.is_list());
        assert!(View::Stock(StockPanel::List).is_list());
        assert!(!View::Stock(StockPanel::Register).is_list());
        assert!(!View::PointOfSale.is_list());
    }
}
