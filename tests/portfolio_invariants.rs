//! Rebalancing scenarios and bookkeeping invariants.

#![allow(clippy::inconsistent_digit_grouping)]

use driftbook::{BuyReport, Portfolio, Position, Price, Symbol, rebalance};

fn sym(s: &str) -> Symbol {
    Symbol::new(s)
}

fn portfolio(rows: &[(&str, i64, u64, f64)]) -> Portfolio {
    let mut p = Portfolio::default();
    for &(s, price, qty, target) in rows {
        p.add_position(Position::new(sym(s), Price(price), qty, target))
            .unwrap();
    }
    p
}

fn ledger_of(alloc: &driftbook::Allocation) -> Vec<(String, u64)> {
    alloc
        .ledger
        .iter()
        .map(|(s, n)| (s.as_str().to_string(), n))
        .collect()
}

// === Reference scenarios ===

#[test]
fn scenario_multiple_buys() {
    let mut p = portfolio(&[
        ("MSFT", 10_00, 3, 50.0),
        ("APPL", 20_00, 2, 30.0),
        ("GOOG", 30_00, 1, 20.0),
    ]);
    let alloc = rebalance::allocate(&mut p, Price(100_00));

    assert_eq!(
        ledger_of(&alloc),
        vec![
            ("MSFT".to_string(), 5),
            ("APPL".to_string(), 1),
            ("GOOG".to_string(), 1)
        ]
    );
    assert_eq!(alloc.remaining, Price::ZERO);
}

#[test]
fn scenario_tie_break_leaves_cash() {
    let mut p = portfolio(&[
        ("MSFT", 55_00, 1, 40.0),
        ("APPL", 30_00, 1, 40.0),
        ("GOOG", 15_00, 1, 20.0),
    ]);
    let alloc = rebalance::allocate(&mut p, Price(30_00));

    assert_eq!(ledger_of(&alloc), vec![("GOOG".to_string(), 1)]);
    assert_eq!(alloc.remaining, Price(15_00));
    let report = BuyReport::new(&p, &alloc).unwrap();
    assert_eq!(format!("{:.2}", report.lines[0].new_allocation_pct), "26.09");
}

#[test]
fn scenario_nothing_eligible() {
    // MSFT is over target; GOOG is under but costs more than the cash on hand.
    let mut p = portfolio(&[("MSFT", 10_00, 9, 50.0), ("GOOG", 10_00, 1, 50.0)]);
    let alloc = rebalance::allocate(&mut p, Price(9_99));
    assert!(alloc.ledger.is_empty());
    assert_eq!(alloc.remaining, Price(9_99));
    assert_eq!(p.lookup(&sym("MSFT")).unwrap().quantity(), 9);
    assert_eq!(p.lookup(&sym("GOOG")).unwrap().quantity(), 1);
}

#[test]
fn scenario_only_over_allocated_affordable() {
    let mut p = portfolio(&[("BIG", 1_000_00, 1, 95.0), ("SMALL", 1_00, 100, 5.0)]);
    let alloc = rebalance::allocate(&mut p, Price(500_00));
    // SMALL is 9% against a 5% target, BIG is unaffordable.
    assert!(alloc.ledger.is_empty());
    assert_eq!(alloc.remaining, Price(500_00));
}

// === Cash conservation ===

#[test]
fn cash_conserved_exactly() {
    let mut p = portfolio(&[
        ("VTI", 251_37, 12, 60.0),
        ("VXUS", 61_19, 40, 30.0),
        ("BND", 72_55, 5, 10.0),
    ]);
    let cash = Price(5_000_00);
    let before = p.total_value();
    let alloc = rebalance::allocate(&mut p, cash);

    let spent = alloc.ledger.cost(&p);
    assert_eq!(cash - alloc.remaining, spent);
    assert_eq!(p.total_value() - before, spent.0);
    assert!(alloc.remaining >= Price::ZERO);
}

#[test]
fn remaining_cash_cannot_buy_any_underweight_position() {
    let mut p = portfolio(&[
        ("VTI", 251_37, 12, 60.0),
        ("VXUS", 61_19, 40, 30.0),
        ("BND", 72_55, 5, 10.0),
    ]);
    let alloc = rebalance::allocate(&mut p, Price(5_000_00));
    assert!(rebalance::select_next(&p, alloc.remaining).is_none());
}

// === Drift ===

#[test]
fn allocation_moves_toward_targets() {
    let mut p = portfolio(&[("MSFT", 10_00, 1, 50.0), ("GOOG", 30_00, 1, 50.0)]);
    let worst_before = p
        .drift_percentages()
        .iter()
        .map(|(_, d)| d.abs())
        .fold(0.0_f64, f64::max);
    rebalance::allocate(&mut p, Price(200_00));
    let worst_after = p
        .drift_percentages()
        .iter()
        .map(|(_, d)| d.abs())
        .fold(0.0_f64, f64::max);
    assert!(worst_after < worst_before);
}

#[test]
fn allocate_overwrites_existing_cash() {
    let mut p = Portfolio::new(Price(1_000_00));
    p.add_position(Position::new(sym("MSFT"), Price(10_00), 0, 100.0))
        .unwrap();
    let alloc = rebalance::allocate(&mut p, Price(20_00));
    assert_eq!(alloc.ledger.units(&sym("MSFT")), 2);
    assert_eq!(p.cash_available(), Price::ZERO);
}

#[cfg(feature = "serde")]
#[test]
fn position_serializes_with_plain_symbol() {
    let pos = Position::new(sym("MSFT"), Price(10_00), 3, 50.0);
    let json = serde_json::to_value(&pos).unwrap();
    assert_eq!(json["symbol"], "MSFT");
    assert_eq!(json["price"], 1000);
    assert_eq!(json["quantity"], 3);
}
