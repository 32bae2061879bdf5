/// Cache key of the singleton market snapshot entry
pub const MARKET_CACHE_KEY: &str = "market";

/// Chart range used when `days` is omitted
pub const DEFAULT_CHART_DAYS: &str = "7";

/// Response header carrying the orchestrator outcome
pub const X_CACHE_HEADER: &str = "x-cache";

/// Quote currency for every market-data request
pub const VS_CURRENCY: &str = "usd";

/// wei -> ether
pub const WEI_DECIMALS: u32 = 18;

/// Most recent transactions returned by the tx route
pub const TX_HISTORY_LIMIT: usize = 10;

/// Explorer reply when an address has no history; not an error
pub const EXPLORER_NO_TX_MESSAGE: &str = "No transactions found";

pub const CONTACT_MESSAGE_MAX_CHARS: usize = 5000;
pub const CONTACT_SUBJECT: &str = "New message from the crypto dashboard contact form";
