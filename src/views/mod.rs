mod adjust_stock;
mod list;
mod new_item;
mod point_of_sale;
mod register_stock;
pub use adjust_stock::AdjustStockForm;
pub use list::{ListView, MovementReport, SalesLedger, Source, StockList};
pub use new_item::NewItemForm;
pub use point_of_sale::{CartLine, PointOfSaleForm};
pub use register_stock::RegisterStockForm;

use std::fmt::{Display, Formatter};

use crate::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalKind {
    Success,
    Error,
}

/// Result dialog shown after a submission
#[derive(Clone, Debug, PartialEq)]
pub struct Modal {
    pub kind: ModalKind,
    pub message: String,
}

impl Modal {
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self {
            kind: ModalKind::Success,
            message: message.into(),
        }
    }
    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            kind: ModalKind::Error,
            message: message.into(),
        }
    }
    pub fn title(&self) -> &'static str {
        match self.kind {
            ModalKind::Success => "Sucesso!",
            ModalKind::Error => "Erro!",
        }
    }
    pub fn is_success(&self) -> bool {
        self.kind == ModalKind::Success
    }
}
impl From<&AppError> for Modal {
    fn from(value: &AppError) -> Self {
        Self::error(value.user_message())
    }
}
impl From<AppError> for Modal {
    fn from(value: AppError) -> Self {
        Self::from(&value)
    }
}
impl Display for Modal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.title(), self.message)
    }
}

/// Trims a required text field
pub(crate) fn required(value: &str, label: &str) -> crate::Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::ValidationFailed(format!(
            "O campo {label} é obrigatório."
        )));
    }
    Ok(value.to_string())
}

/// Whole, strictly positive quantity typed into a form
pub(crate) fn positive_quantity(value: &str) -> crate::Result<u32> {
    let raw = required(value, "quantidade")?;
    match raw.parse::<u32>() {
        Ok(q) if q > 0 => Ok(q),
        _ => Err(AppError::ValidationFailed(format!(
            "Quantidade inválida: {raw}"
        ))),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_must_be_positive_whole_number() {
        assert_eq!(positive_quantity(" 12 "), Ok(12));
        for bad in ["", "0", "-3", "1.5", "dez"] {
            assert!(
                matches!(positive_quantity(bad), Err(AppError::ValidationFailed(_))),
                "{bad}"
            );
        }
    }
    #[test]
    fn modal_from_error_uses_user_message() {
        let modal = Modal::from(AppError::NotFound(String::from("Item não encontrado.")));
        assert_eq!(modal.kind, ModalKind::Error);
        assert_eq!(modal.to_string(), "[Erro!] Item não encontrado.");
    }
}
