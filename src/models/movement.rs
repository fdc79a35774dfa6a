use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::flexible_datetime;

/// One line of the stock audit trail, `GET /estoque_log/`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovementLog {
    pub id: i64,
    #[serde(rename = "data_operacao", deserialize_with = "flexible_datetime")]
    pub operation_date: NaiveDateTime,
    #[serde(rename = "estoque_id")]
    pub stock_record_id: i64,
    #[serde(rename = "item_codigo")]
    pub item_code: String,
    #[serde(rename = "quantidade_alterada")]
    pub quantity_changed: i64,
    #[serde(rename = "tipo_operacao")]
    pub operation_type: OperationType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationType {
    Create,
    Reduce,
    Delete,
}
impl OperationType {
    /// Label used by the report screen
    pub fn label(&self) -> &'static str {
        match self {
            Self::Create => "Entrada",
            Self::Reduce => "Baixa",
            Self::Delete => "Saída",
        }
    }
}
impl TryFrom<&str> for OperationType {
    type Error = String;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // older server builds logged the http verb
        match value.trim().to_uppercase().as_str() {
            "CREATE" | "POST" => Ok(Self::Create),
            "REDUCE" => Ok(Self::Reduce),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("unknown operation type '{other}'")),
        }
    }
}
impl<'de> Deserialize<'de> for OperationType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::try_from(raw.as_str()).map_err(serde::de::Error::custom)
    }
}
impl Display for OperationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "CREATE",
            Self::Reduce => "REDUCE",
            Self::Delete => "DELETE",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn reads_legacy_verbs() -> Result<()> {
        let body = r#"[
            {"id": 1, "data_operacao": "2025-01-01T10:00:00", "estoque_id": 3,
             "item_codigo": "A1", "quantidade_alterada": 10, "tipo_operacao": "POST"},
            {"id": 2, "data_operacao": "Thu, 02 Jan 2025 09:00:00 GMT", "estoque_id": 3,
             "item_codigo": "A1", "quantidade_alterada": -2, "tipo_operacao": "reduce"},
            {"id": 3, "data_operacao": "2025-01-03", "estoque_id": 3,
             "item_codigo": "A1", "quantidade_alterada": -8, "tipo_operacao": "DELETE"}
        ]"#;
        let logs: Vec<MovementLog> = serde_json::from_str(body)?;
        let kinds = logs.iter().map(|l| l.operation_type).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![OperationType::Create, OperationType::Reduce, OperationType::Delete]
        );
        assert_eq!(logs[1].operation_date.to_string(), "2025-01-02 09:00:00");
        Ok(())
    }
    #[test]
    fn unknown_operation_is_rejected() {
        let body = r#"{"id": 1, "data_operacao": "2025-01-01", "estoque_id": 3,
            "item_codigo": "A1", "quantidade_alterada": 1, "tipo_operacao": "PATCH"}"#;
        assert!(serde_json::from_str::<MovementLog>(body).is_err());
    }
}
