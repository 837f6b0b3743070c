/// Symbol table of one schema enumeration.
///
/// Symbols are stored in upper-case canonical form. `fallback` is the value
/// used for anything that does not resolve (usually `UNKNOWN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolTable {
    /// Qualified enum name (`"Alert.Priority"`), for observability.
    pub name: &'static str,
    pub symbols: &'static [(&'static str, i32)],
    pub fallback: i32,
}

impl SymbolTable {
    pub const fn new(
        name: &'static str,
        symbols: &'static [(&'static str, i32)],
        fallback: i32,
    ) -> Self {
        Self { name, symbols, fallback }
    }

    /// Exact lookup of an already-canonical symbol.
    pub fn value(&self, symbol: &str) -> Option<i32> {
        self.symbols
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, v)| *v)
    }

    /// Reverse lookup, for logs.
    pub fn symbol(&self, value: i32) -> Option<&'static str> {
        self.symbols
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(s, _)| *s)
    }

    pub fn contains(&self, value: i32) -> bool {
        self.symbol(value).is_some()
    }
}

/// Build a [`SymbolTable`] from a prost enumeration.
///
/// ```ignore
/// symbol_table!("Alerts.Health", Health, fallback = Unknown, [
///     "UNKNOWN" => Unknown,
///     "OK" => Ok,
/// ])
/// ```
#[macro_export]
macro_rules! symbol_table {
    ($name:literal, $ty:ident, fallback = $fallback:ident, [$($sym:literal => $variant:ident),* $(,)?]) => {
        $crate::symbol::SymbolTable::new(
            $name,
            &[$(($sym, $ty::$variant as i32)),*],
            $ty::$fallback as i32,
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLORS: SymbolTable = SymbolTable::new("Test.Color", &[("UNKNOWN", 0), ("RED", 1), ("BLUE", 2)], 0);

    #[test]
    fn test_value_and_symbol() {
        assert_eq!(COLORS.value("RED"), Some(1));
        assert_eq!(COLORS.value("red"), None);
        assert_eq!(COLORS.symbol(2), Some("BLUE"));
        assert!(!COLORS.contains(7));
    }
}
