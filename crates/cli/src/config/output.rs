use prettytable::{
    format::{FormatBuilder, LinePosition, LineSeparator, TableFormat},
    row, Cell, Table,
};
use serde::Serialize;
use serde_json::{Map, Value};
use squads_connect_sdk::{solana_utils::solana_sdk::pubkey::Pubkey, utils::StringPubkey};

/// Output format.
#[derive(clap::ValueEnum, Debug, Default, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Table.
    #[default]
    Table,
    /// JSON.
    Json,
}

impl OutputFormat {
    /// Display keyed account.
    pub fn display_keyed_account(
        &self,
        pubkey: &Pubkey,
        account: impl Serialize,
    ) -> eyre::Result<String> {
        let keyed_account = KeyedAccount {
            pubkey: (*pubkey).into(),
            account,
        };
        let Value::Object(map) = serde_json::to_value(keyed_account)? else {
            eyre::bail!("internal: only map-like structures are supported");
        };
        match self {
            Self::Json => Self::display_json_one(&map),
            Self::Table => Self::display_table_one(&map),
        }
    }

    /// Display a list of serializable items.
    pub fn display_many(&self, items: impl IntoIterator<Item = impl Serialize>) -> eyre::Result<String> {
        let items = items
            .into_iter()
            .map(|item| {
                let Value::Object(map) = serde_json::to_value(item)? else {
                    eyre::bail!("internal: only map-like structures are supported");
                };
                Ok(map)
            })
            .collect::<eyre::Result<Vec<_>>>()?;
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(&items)?),
            Self::Table => Self::display_table_many(&items),
        }
    }

    fn display_table_many(items: &[Map<String, Value>]) -> eyre::Result<String> {
        let mut items = items.iter().peekable();
        let Some(first) = items.peek() else {
            return Ok("empty".to_string());
        };
        let mut table = Table::new();
        table.set_format(table_format());
        table.set_titles(first.keys().into());

        for item in items {
            table.add_row(item.values().map(json_value_to_cell).collect());
        }

        Ok(table.to_string())
    }

    fn display_json_one(item: &Map<String, Value>) -> eyre::Result<String> {
        Ok(serde_json::to_string_pretty(item)?)
    }

    fn display_table_one(item: &Map<String, Value>) -> eyre::Result<String> {
        let mut table = Table::new();
        table.set_format(table_format());
        table.set_titles(row!["Key", "Value"]);

        for (k, v) in item {
            table.add_row(row![k, json_value_to_cell(v)]);
        }

        Ok(table.to_string())
    }
}

#[derive(serde::Serialize)]
struct KeyedAccount<T> {
    pubkey: StringPubkey,
    #[serde(flatten)]
    account: T,
}

fn table_format() -> TableFormat {
    FormatBuilder::new()
        .padding(0, 2)
        .separator(LinePosition::Title, LineSeparator::new('-', '+', '+', '+'))
        .build()
}

fn json_value_to_cell(value: &Value) -> Cell {
    let content = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "".to_string(),
        Value::Array(items) => items.len().to_string(),
        other => other.to_string(),
    };

    Cell::new(&content)
}
