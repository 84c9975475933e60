use std::collections::BTreeSet;

/// Index constituents used as the inclusion filter for a run.
///
/// Symbols are stored trimmed and uppercased; blanks are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSymbolSet {
    symbols: BTreeSet<String>,
}

impl ReferenceSymbolSet {
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for ReferenceSymbolSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let symbols = iter
            .into_iter()
            .map(|s| s.as_ref().trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { symbols }
    }
}
