//! WebSocket channel name parsing.
//!
//! Three public channels, each scoped to a symbol: `book.{symbol}`,
//! `trade.{symbol}`, `bbo.{symbol}`. There are no private channels — there
//! is no account model for this engine to scope them to.

pub enum Channel {
    Book(String),
    Trade(String),
    Bbo(String),
}

impl Channel {
    pub fn parse(channel_str: &str) -> Option<Self> {
        let parts: Vec<&str> = channel_str.split('.').collect();
        match parts.as_slice() {
            ["book", symbol] => Some(Channel::Book(symbol.to_string())),
            ["trade", symbol] => Some(Channel::Trade(symbol.to_string())),
            ["bbo", symbol] => Some(Channel::Bbo(symbol.to_string())),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Channel::Book(s) | Channel::Trade(s) | Channel::Bbo(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_channels() {
        assert!(matches!(Channel::parse("book.BTCUSD"), Some(Channel::Book(s)) if s == "BTCUSD"));
        assert!(matches!(Channel::parse("trade.BTCUSD"), Some(Channel::Trade(s)) if s == "BTCUSD"));
        assert!(matches!(Channel::parse("bbo.BTCUSD"), Some(Channel::Bbo(s)) if s == "BTCUSD"));
    }

    #[test]
    fn rejects_unknown_channels() {
        assert!(Channel::parse("positions.BTCUSD").is_none());
        assert!(Channel::parse("book").is_none());
    }
}
