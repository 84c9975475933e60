/// Output column order, shared by the normalizer and the spreadsheet writer.
pub const REPORT_COLUMNS: [&str; 5] = ["Date", "Symbol", "TradedQty", "DeliveryQty", "DeliveryPct"];

/// One security's deliverable position for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliverableRecord {
    pub date: String,
    pub symbol: String,
    pub traded_qty: u64,
    pub delivery_qty: u64,
    pub delivery_pct: f64,
}

impl DeliverableRecord {
    pub fn new(date: String, symbol: String, traded_qty: u64, delivery_qty: u64) -> Self {
        Self {
            date,
            symbol,
            traded_qty,
            delivery_qty,
            delivery_pct: delivery_pct(traded_qty, delivery_qty),
        }
    }
}

/// `delivery / traded * 100`, rounded to 2 decimals. Zero when nothing traded.
pub fn delivery_pct(traded_qty: u64, delivery_qty: u64) -> f64 {
    if traded_qty == 0 {
        return 0.0;
    }
    let pct = (delivery_qty as f64) / (traded_qty as f64) * 100.0;
    (pct * 100.0).round() / 100.0
}
