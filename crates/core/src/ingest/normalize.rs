use crate::domain::delivery::DeliverableRecord;
use crate::error::PipelineError;
use chrono::NaiveDate;
use csv::StringRecord;

/// Logical columns of the deliverable-positions file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Symbol,
    TradedQty,
    DeliveryQty,
    Date,
}

impl Field {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Symbol => "symbol",
            Self::TradedQty => "traded qty",
            Self::DeliveryQty => "delivery qty",
            Self::Date => "date",
        }
    }
}

/// Substring rule for one logical column, matched against the lowercased
/// header. The first header in file order that satisfies it wins.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRule {
    pub field: Field,
    pub all_of: &'static [&'static str],
    pub any_of: &'static [&'static str],
    pub none_of: &'static [&'static str],
    pub required: bool,
}

impl ColumnRule {
    pub fn matches(&self, header: &str) -> bool {
        let h = header.to_lowercase();
        self.all_of.iter().all(|s| h.contains(s))
            && (self.any_of.is_empty() || self.any_of.iter().any(|s| h.contains(s)))
            && !self.none_of.iter().any(|s| h.contains(s))
    }

    pub fn resolve<'h>(&self, headers: impl IntoIterator<Item = &'h str>) -> Option<usize> {
        headers.into_iter().position(|h| self.matches(h))
    }
}

const QTY: &[&str] = &["qty", "quantity"];

/// The upstream renames and reorders columns between releases; these rules
/// are intentionally loose. "%" keeps NSE's published
/// `% Dly Qt to Traded Qty` column from being read as the traded quantity.
pub const COLUMN_RULES: [ColumnRule; 4] = [
    ColumnRule {
        field: Field::Symbol,
        all_of: &["symbol"],
        any_of: &[],
        none_of: &["series"],
        required: true,
    },
    ColumnRule {
        field: Field::TradedQty,
        all_of: &["traded"],
        any_of: QTY,
        none_of: &["%"],
        required: true,
    },
    ColumnRule {
        field: Field::DeliveryQty,
        all_of: &["deliver"],
        any_of: QTY,
        none_of: &["%"],
        required: true,
    },
    ColumnRule {
        field: Field::Date,
        all_of: &["date"],
        any_of: &[],
        none_of: &[],
        required: false,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub symbol: usize,
    pub traded_qty: usize,
    pub delivery_qty: usize,
    pub date: Option<usize>,
}

pub fn resolve_columns(headers: &StringRecord) -> Result<ColumnMap, PipelineError> {
    let mut found: [Option<usize>; 4] = [None; 4];
    let mut missing = Vec::new();

    for (slot, rule) in found.iter_mut().zip(COLUMN_RULES.iter()) {
        *slot = rule.resolve(headers.iter());
        if slot.is_none() && rule.required {
            missing.push(rule.field.label());
        }
    }

    let (Some(symbol), Some(traded_qty), Some(delivery_qty), date) =
        (found[0], found[1], found[2], found[3])
    else {
        return Err(PipelineError::Schema(format!(
            "CSV missing expected columns ({}). Found: {}",
            missing.join(", "),
            headers.iter().collect::<Vec<_>>().join(", ")
        )));
    };

    Ok(ColumnMap {
        symbol,
        traded_qty,
        delivery_qty,
        date,
    })
}

/// Parse the deliverable CSV into records in file order.
///
/// `fallback_date` fills the Date column when the file has none.
pub fn normalize_report(
    csv_text: &str,
    fallback_date: NaiveDate,
) -> Result<Vec<DeliverableRecord>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let columns = resolve_columns(reader.headers()?)?;
    tracing::debug!(?columns, "resolved deliverable columns");

    let fallback = fallback_date.format("%Y-%m-%d").to_string();
    let mut out = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let date = match columns.date {
            Some(idx) => cell(idx).to_string(),
            None => fallback.clone(),
        };

        out.push(DeliverableRecord::new(
            date,
            cell(columns.symbol).to_uppercase(),
            parse_quantity(cell(columns.traded_qty)),
            parse_quantity(cell(columns.delivery_qty)),
        ));
    }

    Ok(out)
}

/// Thousands separators are dropped; anything unparsable or negative is 0.
pub fn parse_quantity(raw: &str) -> u64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if let Ok(n) = cleaned.parse::<u64>() {
        return n;
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v.trunc() as u64,
        _ => 0,
    }
}
