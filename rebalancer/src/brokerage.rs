//! Build a portfolio from a brokerage account and a target-allocations CSV.
//!
//! Held positions come from the account with their current quotes. Each
//! target row is merged in order: a held ticker gets its target attached;
//! any other ticker is resolved against the broker's security catalog and
//! added as a zero-quantity position. Every held position must end up with a
//! target and the targets must add up to 100.

use driftbook::{Portfolio, Position, Price, Symbol};
use driftbook_broker::{Account, Broker, Security};
use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::prices;
use crate::prompt::Prompter;
use crate::rows;
use crate::target::TargetRow;

/// Pick the account to rebalance.
///
/// An explicit `wanted` id must exist. Otherwise a single account is used
/// directly and several are offered to the prompter.
pub fn choose_account(
    broker: &dyn Broker,
    wanted: Option<&str>,
    prompter: &mut dyn Prompter,
) -> Result<Account> {
    let mut accounts = broker.accounts()?;
    if accounts.is_empty() {
        return Err(Error::NoAccounts);
    }

    if let Some(id) = wanted {
        let idx = accounts
            .iter()
            .position(|a| a.id.0 == id)
            .ok_or_else(|| Error::AccountNotFound(id.to_string()))?;
        return Ok(accounts.swap_remove(idx));
    }

    if accounts.len() == 1 {
        return Ok(accounts.swap_remove(0));
    }

    let items: Vec<String> = accounts
        .iter()
        .map(|a| {
            format!(
                "{} ({}) - buying power {} {}",
                a.id,
                a.kind,
                a.buying_power(),
                a.currency
            )
        })
        .collect();
    let n = accounts.len();
    match prompter.select("Please choose the account you want", &items)? {
        Some(idx) => Ok(accounts.swap_remove(idx)),
        None => Err(Error::AccountAmbiguous(n)),
    }
}

/// A held position waiting for its target.
struct Held {
    symbol: Symbol,
    price: Price,
    quantity: u64,
    target: Option<f64>,
}

/// Merge the account's holdings with `targets` into a portfolio whose cash
/// is the account's buying power.
pub fn load_portfolio(
    broker: &dyn Broker,
    account: &Account,
    targets: &[TargetRow],
    prompter: &mut dyn Prompter,
) -> Result<Portfolio> {
    let mut held: Vec<Held> = Vec::new();
    let mut held_index: FxHashMap<String, usize> = FxHashMap::default();
    for p in broker.positions(&account.id)? {
        let price = prices::positive(&p.symbol, Some(p.price()))?;
        held_index.insert(p.symbol.as_str().to_string(), held.len());
        held.push(Held {
            symbol: p.symbol,
            price,
            quantity: p.quantity,
            target: None,
        });
    }
    info!(
        "Account {}: {} positions, buying power {}",
        account.id,
        held.len(),
        account.buying_power()
    );

    let mut added: Vec<Position> = Vec::new();
    for t in targets {
        if let Some(&i) = held_index.get(&t.ticker) {
            held[i].target = Some(t.target);
            continue;
        }
        let security = resolve_security(broker, t, prompter)?;
        let price = prices::positive(&security.symbol, security.price())?;
        warn!("'{}' is not in your portfolio", t.ticker);
        added.push(Position::new(security.symbol, price, 0, t.target));
    }

    if let Some(h) = held.iter().find(|h| h.target.is_none()) {
        return Err(Error::MissingTargetAllocation(h.symbol.to_string()));
    }

    let mut portfolio = Portfolio::new(account.buying_power());
    for h in held {
        let target = h.target.unwrap_or_default();
        portfolio.add_position(Position::new(h.symbol, h.price, h.quantity, target))?;
    }
    for p in added {
        portfolio.add_position(p)?;
    }
    rows::check_allocation_sum(portfolio.target_total())?;
    Ok(portfolio)
}

/// Find the catalog entry for a ticker that is not held, returning it with
/// its current quote.
fn resolve_security(
    broker: &dyn Broker,
    row: &TargetRow,
    prompter: &mut dyn Prompter,
) -> Result<Security> {
    let mut hits = broker.search_securities(&row.ticker)?;
    debug!("'{}': {} catalog matches", row.ticker, hits.len());

    let chosen = match hits.len() {
        0 => {
            return Err(Error::TickerNotFound {
                row: row.row,
                ticker: row.ticker.clone(),
            });
        }
        1 => hits.swap_remove(0),
        n => {
            let items: Vec<String> = hits.iter().map(|s| s.to_string()).collect();
            let prompt = format!("Row {} - choose the security for '{}'", row.row, row.ticker);
            match prompter.select(&prompt, &items)? {
                Some(idx) => hits.swap_remove(idx),
                None => {
                    return Err(Error::TickerAmbiguous {
                        row: row.row,
                        ticker: row.ticker.clone(),
                        matches: n,
                    });
                }
            }
        }
    };

    if chosen.symbol.as_str() != row.ticker {
        return Err(Error::TickerRename {
            row: row.row,
            from: row.ticker.clone(),
            to: chosen.symbol.to_string(),
        });
    }
    Ok(broker.security(&chosen.id)?)
}
