//! Card export to the import formats.
//!
//! JSON exports the full card, scheduling state included. The text formats
//! carry only the four content columns.

use crate::error::TransferError;
use crate::parser::TransferFormat;
use crate::types::Card;

/// Serialize the collection in `format`.
pub fn export(cards: &[Card], format: TransferFormat) -> Result<String, TransferError> {
    if cards.is_empty() {
        return Err(TransferError::NothingToExport);
    }

    let content = match format {
        TransferFormat::Json => serde_json::to_string_pretty(cards)?,
        TransferFormat::Csv => {
            let mut out = String::from("Front,Back,Translation,Example\n");
            for card in cards {
                let row = [&card.front, &card.back, &card.translation, &card.example]
                    .map(|field| escape_csv(field))
                    .join(",");
                out.push_str(&row);
                out.push('\n');
            }
            out
        }
        TransferFormat::Tsv => {
            let mut out = String::from("Front\tBack\tTranslation\tExample\n");
            for card in cards {
                out.push_str(&format!(
                    "{}\t{}\t{}\t{}\n",
                    card.front, card.back, card.translation, card.example
                ));
            }
            out
        }
        TransferFormat::Quizlet => cards
            .iter()
            .map(|card| format!("{}\t{}\n", card.front, card.back))
            .collect(),
    };
    Ok(content)
}

fn escape_csv(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
