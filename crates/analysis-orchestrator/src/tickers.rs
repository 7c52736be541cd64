/// Default cap on how many tickers a single run processes.
pub const DEFAULT_MAX_TICKERS: usize = 10;
/// Hard upper bound accepted for the cap.
pub const MAX_TICKERS: usize = 100;

/// Parse a comma-separated ticker list.
///
/// Entries are trimmed and upper-cased and blanks are dropped. The first `max`
/// entries are kept, then repeated tickers collapse onto their first position,
/// so repeats count against the cap.
pub fn parse_tickers(input: &str, max: usize) -> Vec<String> {
    let mut tickers: Vec<String> = Vec::new();
    for ticker in input
        .split(',')
        .map(|raw| raw.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .take(max)
    {
        if !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    tickers
}
