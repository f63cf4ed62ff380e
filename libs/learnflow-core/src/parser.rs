//! Card import from pasted text.
//!
//! # Formats
//! - `csv`: `front,back[,translation[,example]]`, double quotes escape commas
//!   and `""` escapes a quote. A first line mentioning "front" or "term" is a
//!   header.
//! - `tsv`: the same columns separated by tabs; a first line mentioning
//!   "front" is a header.
//! - `quizlet`: `front<TAB>back` per line, never a header.
//! - `json`: an array of objects with `front`, `back`, `translation` and
//!   `example` keys. Other keys are ignored, so exported JSON re-imports.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::TransferError;
use crate::types::{NewCard, DEFAULT_UNIT};

/// Text formats understood by import and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferFormat {
    Csv,
    Tsv,
    Quizlet,
    Json,
}

impl TransferFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Quizlet => "quizlet",
            Self::Json => "json",
        }
    }

    /// Default file name for an export in this format.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Csv => "learnflow-cards.csv",
            Self::Tsv => "learnflow-cards.tsv",
            Self::Quizlet => "learnflow-cards-quizlet.txt",
            Self::Json => "learnflow-cards.json",
        }
    }
}

impl fmt::Display for TransferFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferFormat {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "quizlet" => Ok(Self::Quizlet),
            "json" => Ok(Self::Json),
            other => Err(TransferError::UnknownFormat(other.to_string())),
        }
    }
}

/// Parse pasted text into validated new cards.
///
/// Rows without both a front and a back are skipped. Finding no usable row
/// at all is an error.
pub fn parse(content: &str, format: TransferFormat) -> Result<Vec<NewCard>, TransferError> {
    if content.trim().is_empty() {
        return Err(TransferError::EmptyInput);
    }

    let rows = match format {
        TransferFormat::Json => parse_json(content)?,
        TransferFormat::Csv => parse_lines(content, is_csv_header, split_csv_line),
        TransferFormat::Tsv => parse_lines(content, is_tsv_header, split_tab_line),
        TransferFormat::Quizlet => parse_lines(content, |_| false, split_tab_line),
    };

    let cards: Vec<NewCard> = rows
        .into_iter()
        .filter_map(|row| row.validate().ok())
        .collect();

    if cards.is_empty() {
        return Err(TransferError::NoCards);
    }
    Ok(cards)
}

#[derive(Deserialize)]
struct JsonRecord {
    #[serde(default)]
    front: Option<String>,
    #[serde(default)]
    back: Option<String>,
    #[serde(default)]
    translation: Option<String>,
    #[serde(default)]
    example: Option<String>,
}

fn parse_json(content: &str) -> Result<Vec<NewCard>, TransferError> {
    let records: Vec<JsonRecord> = serde_json::from_str(content)?;
    Ok(records
        .into_iter()
        .map(|record| NewCard {
            front: record.front.unwrap_or_default(),
            back: record.back.unwrap_or_default(),
            translation: record.translation.unwrap_or_default(),
            example: record.example.unwrap_or_default(),
            unit: DEFAULT_UNIT.to_string(),
        })
        .collect())
}

fn parse_lines(
    content: &str,
    is_header: impl Fn(&str) -> bool,
    split: impl Fn(&str) -> Vec<String>,
) -> Vec<NewCard> {
    let mut lines = content.trim().lines().peekable();
    if lines.peek().is_some_and(|first| is_header(*first)) {
        lines.next();
    }

    lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| split(line))
        .filter(|fields| fields.len() >= 2)
        .map(|fields| {
            let mut fields = fields.into_iter();
            NewCard {
                front: fields.next().unwrap_or_default(),
                back: fields.next().unwrap_or_default(),
                translation: fields.next().unwrap_or_default(),
                example: fields.next().unwrap_or_default(),
                unit: DEFAULT_UNIT.to_string(),
            }
        })
        .collect()
}

fn is_csv_header(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("front") || lower.contains("term")
}

fn is_tsv_header(line: &str) -> bool {
    line.to_lowercase().contains("front")
}

fn split_tab_line(line: &str) -> Vec<String> {
    line.split('\t').map(|field| field.trim().to_string()).collect()
}

/// Split one CSV line, honouring double-quoted fields.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_csv_with_header_and_quotes() {
        let input = "Front,Back,Translation,Example\n\
                     \"Hello, world\",\"Bonjour, le monde\",hi,\"He said \"\"hi\"\"\"\n\
                     cat,chat\n";
        let cards = parse(input, TransferFormat::Csv).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].front, "Hello, world");
        assert_eq!(cards[0].back, "Bonjour, le monde");
        assert_eq!(cards[0].translation, "hi");
        assert_eq!(cards[0].example, "He said \"hi\"");
        assert_eq!(cards[0].unit, "General");
        assert_eq!(cards[1].front, "cat");
        assert_eq!(cards[1].translation, "");
    }

    #[test]
    fn csv_term_header_is_skipped() {
        let cards = parse("Term,Definition\na,b", TransferFormat::Csv).unwrap();
        assert_eq!(cards, vec![NewCard { unit: "General".into(), ..NewCard::new("a", "b") }]);
    }

    #[test]
    fn csv_without_header_keeps_first_row() {
        let cards = parse("dog,chien\r\ncat,chat", TransferFormat::Csv).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].back, "chat");
    }

    #[test]
    fn parse_tsv_and_quizlet() {
        let tsv = "Front\tBack\tTranslation\tExample\nuno\tone\t\tuno mas\n";
        let cards = parse(tsv, TransferFormat::Tsv).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].example, "uno mas");

        let quizlet = "front\tthe front\ndos\ttwo";
        let cards = parse(quizlet, TransferFormat::Quizlet).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].front, "front");
    }

    #[test]
    fn parse_json_ignores_extra_keys() {
        let input = r#"[
            {"front": "si", "back": "yes", "box": 4, "reviews": 9},
            {"front": "no", "back": "no", "translation": null},
            {"front": "", "back": "skipped"}
        ]"#;
        let cards = parse(input, TransferFormat::Json).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].front, "si");
        assert_eq!(cards[1].translation, "");
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = parse("{not json", TransferFormat::Json).unwrap_err();
        assert!(matches!(err, TransferError::Json(_)));
    }

    #[test]
    fn zero_rows_is_a_failure() {
        assert!(matches!(
            parse("   ", TransferFormat::Csv),
            Err(TransferError::EmptyInput)
        ));
        assert!(matches!(
            parse("only-one-column\nanother", TransferFormat::Csv),
            Err(TransferError::NoCards)
        ));
        assert!(matches!(
            parse("Front,Back", TransferFormat::Csv),
            Err(TransferError::NoCards)
        ));
        assert!(matches!(parse("[]", TransferFormat::Json), Err(TransferError::NoCards)));
    }

    #[test]
    fn format_from_str() {
        assert_eq!("CSV".parse::<TransferFormat>().unwrap(), TransferFormat::Csv);
        assert_eq!(" quizlet".parse::<TransferFormat>().unwrap(), TransferFormat::Quizlet);
        assert!(matches!(
            "xml".parse::<TransferFormat>(),
            Err(TransferError::UnknownFormat(f)) if f == "xml"
        ));
    }
}
