//! Derived capital and PnL series.
//!
//! Each series is gated on its own required fields, all-or-nothing over the
//! record set: when any record lacks a required field the series is absent
//! rather than padded. Computing one series never blocks another. All
//! series are aligned 1:1 with the sorted record order.

use crate::domain::trade::TradeRecord;

/// Compute-once artifacts derived from the sorted trade sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries {
    /// Per-trade PnL with the bid/ask spread removed (slippage retained).
    pub no_spread_pnl: Option<Vec<f64>>,
    /// Cumulative capital for the no-spread counterfactual.
    pub no_spread_capital: Option<Vec<f64>>,
    /// Passive benchmark: initial capital scaled by the exit-price ratio.
    pub buy_hold_capital: Option<Vec<f64>>,
}

impl DerivedSeries {
    pub fn derive(records: &[TradeRecord], initial_capital: f64) -> Self {
        if records.is_empty() {
            return DerivedSeries {
                no_spread_pnl: None,
                no_spread_capital: None,
                buy_hold_capital: None,
            };
        }

        let no_spread_pnl = no_spread_pnl(records);
        let no_spread_capital = no_spread_pnl
            .as_deref()
            .map(|pnl| cumulative_capital(pnl, initial_capital));
        let buy_hold_capital = buy_hold_capital(records, initial_capital);

        DerivedSeries {
            no_spread_pnl,
            no_spread_capital,
            buy_hold_capital,
        }
    }
}

/// Spread-removal counterfactual. Fills happen at the mid price adjusted
/// for slippage only, so the spread cost disappears while the slippage
/// cost stays:
///
///   entry_adj = mid_entry + sign * slippage_entry
///   exit_adj  = mid_exit  - sign * slippage_exit
///   pnl       = (exit_adj - entry_adj) * sign * position_size
///
/// Requires mid prices and position size on every record, and direction
/// and both slippage fields on at least one record each. A field no record
/// carries is a missing column and disables the series; a per-record gap
/// in an otherwise present field falls back to sign 0 (zero PnL for that
/// trade) or slippage 0.
fn no_spread_pnl(records: &[TradeRecord]) -> Option<Vec<f64>> {
    let ready = records.iter().all(|r| {
        r.mid_price_entry.is_some() && r.mid_price_exit.is_some() && r.position_size.is_some()
    });
    let columns_present = records.iter().any(|r| r.direction.is_some())
        && records.iter().any(|r| r.slippage_entry.is_some())
        && records.iter().any(|r| r.slippage_exit.is_some());
    if !ready || !columns_present {
        return None;
    }

    Some(
        records
            .iter()
            .map(|r| {
                let sign = r.sign();
                let entry_adj = r.mid_price_entry.unwrap_or(0.0) + sign * r.slippage_entry_or_zero();
                let exit_adj = r.mid_price_exit.unwrap_or(0.0) - sign * r.slippage_exit_or_zero();
                (exit_adj - entry_adj) * sign * r.position_size.unwrap_or(0.0)
            })
            .collect(),
    )
}

/// Running cumulative sum of per-trade PnL on top of the starting capital.
fn cumulative_capital(pnl: &[f64], initial_capital: f64) -> Vec<f64> {
    let mut capital = initial_capital;
    pnl.iter()
        .map(|p| {
            capital += p;
            capital
        })
        .collect()
}

/// Buy-and-hold benchmark: hold the underlying from the first observed
/// exit price onward. Undefined when any exit price is missing or the
/// reference price is zero (division guard), in which case the series is
/// absent.
fn buy_hold_capital(records: &[TradeRecord], initial_capital: f64) -> Option<Vec<f64>> {
    if records.iter().any(|r| r.mid_price_exit.is_none()) {
        return None;
    }
    let reference = records.first().and_then(|r| r.mid_price_exit)?;
    if reference == 0.0 {
        return None;
    }

    Some(
        records
            .iter()
            .map(|r| initial_capital * r.mid_price_exit.unwrap_or(0.0) / reference)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::Direction;
    use approx::assert_relative_eq;

    fn trade(
        direction: Option<Direction>,
        entry: f64,
        exit: f64,
        size: f64,
        slip_entry: f64,
        slip_exit: f64,
    ) -> TradeRecord {
        TradeRecord {
            mid_price_entry: Some(entry),
            mid_price_exit: Some(exit),
            position_size: Some(size),
            direction,
            slippage_entry: Some(slip_entry),
            slippage_exit: Some(slip_exit),
            ..TradeRecord::default()
        }
    }

    #[test]
    fn long_trade_no_slippage() {
        let records = vec![trade(Some(Direction::Long), 100.0, 110.0, 2.0, 0.0, 0.0)];
        let series = DerivedSeries::derive(&records, 10_000.0);
        let pnl = series.no_spread_pnl.unwrap();
        assert_relative_eq!(pnl[0], 20.0);
    }

    #[test]
    fn short_trade_no_slippage() {
        let records = vec![trade(Some(Direction::Short), 100.0, 90.0, 1.0, 0.0, 0.0)];
        let series = DerivedSeries::derive(&records, 10_000.0);
        let pnl = series.no_spread_pnl.unwrap();
        assert_relative_eq!(pnl[0], 10.0);
    }

    #[test]
    fn slippage_reduces_no_spread_pnl() {
        // entry_adj = 100.5, exit_adj = 109.5 -> (109.5 - 100.5) * 1 * 2 = 18
        let records = vec![trade(Some(Direction::Long), 100.0, 110.0, 2.0, 0.5, 0.5)];
        let series = DerivedSeries::derive(&records, 10_000.0);
        assert_relative_eq!(series.no_spread_pnl.unwrap()[0], 18.0);
    }

    #[test]
    fn missing_direction_contributes_zero_pnl() {
        let records = vec![
            trade(Some(Direction::Long), 100.0, 110.0, 2.0, 0.0, 0.0),
            trade(None, 100.0, 110.0, 2.0, 0.0, 0.0),
        ];
        let series = DerivedSeries::derive(&records, 10_000.0);
        let pnl = series.no_spread_pnl.unwrap();
        assert_relative_eq!(pnl[0], 20.0);
        assert_relative_eq!(pnl[1], 0.0);
    }

    #[test]
    fn missing_slippage_treated_as_zero() {
        let mut second = trade(Some(Direction::Long), 100.0, 110.0, 2.0, 0.0, 0.0);
        second.slippage_entry = None;
        second.slippage_exit = None;
        let records = vec![
            trade(Some(Direction::Long), 100.0, 110.0, 2.0, 0.5, 0.5),
            second,
        ];
        let series = DerivedSeries::derive(&records, 10_000.0);
        let pnl = series.no_spread_pnl.unwrap();
        assert_relative_eq!(pnl[1], 20.0);
    }

    #[test]
    fn no_spread_absent_when_no_record_has_a_direction() {
        // Complete prices and sizes, but the direction field never appears:
        // there is nothing to compute a counterfactual from, so no series
        // (rather than a flat curve of all-zero PnL).
        let records = vec![
            trade(None, 100.0, 110.0, 1.0, 0.0, 0.0),
            trade(None, 110.0, 105.0, 1.0, 0.0, 0.0),
        ];
        let series = DerivedSeries::derive(&records, 100_000.0);
        assert!(series.no_spread_pnl.is_none());
        assert!(series.no_spread_capital.is_none());
    }

    #[test]
    fn no_spread_absent_when_no_record_has_slippage() {
        let mut records = vec![
            trade(Some(Direction::Long), 100.0, 110.0, 1.0, 0.0, 0.0),
            trade(Some(Direction::Short), 110.0, 105.0, 1.0, 0.0, 0.0),
        ];
        for r in &mut records {
            r.slippage_entry = None;
            r.slippage_exit = None;
        }
        let series = DerivedSeries::derive(&records, 100_000.0);
        assert!(series.no_spread_pnl.is_none());
    }

    #[test]
    fn capital_is_initial_plus_running_sum() {
        let records = vec![
            trade(Some(Direction::Long), 100.0, 110.0, 2.0, 0.0, 0.0),
            trade(Some(Direction::Short), 110.0, 100.0, 1.0, 0.0, 0.0),
            trade(Some(Direction::Long), 100.0, 95.0, 1.0, 0.0, 0.0),
        ];
        let series = DerivedSeries::derive(&records, 1_000.0);
        let pnl = series.no_spread_pnl.unwrap();
        let capital = series.no_spread_capital.unwrap();

        let mut running = 1_000.0;
        for (p, c) in pnl.iter().zip(&capital) {
            running += p;
            assert_relative_eq!(*c, running);
        }
        assert_relative_eq!(capital[0], 1_020.0);
        assert_relative_eq!(capital[1], 1_030.0);
        assert_relative_eq!(capital[2], 1_025.0);
    }

    #[test]
    fn one_incomplete_record_disables_no_spread_series() {
        let mut incomplete = trade(Some(Direction::Long), 100.0, 110.0, 2.0, 0.0, 0.0);
        incomplete.position_size = None;
        let records = vec![
            trade(Some(Direction::Long), 100.0, 110.0, 2.0, 0.0, 0.0),
            incomplete,
        ];
        let series = DerivedSeries::derive(&records, 10_000.0);
        assert!(series.no_spread_pnl.is_none());
        assert!(series.no_spread_capital.is_none());
        // The benchmark only needs exit prices, so it still exists.
        assert!(series.buy_hold_capital.is_some());
    }

    #[test]
    fn buy_hold_scales_by_exit_price_ratio() {
        let records = vec![
            trade(Some(Direction::Long), 100.0, 100.0, 1.0, 0.0, 0.0),
            trade(Some(Direction::Long), 100.0, 110.0, 1.0, 0.0, 0.0),
            trade(Some(Direction::Long), 100.0, 90.0, 1.0, 0.0, 0.0),
        ];
        let series = DerivedSeries::derive(&records, 10_000.0);
        let buy_hold = series.buy_hold_capital.unwrap();
        assert_relative_eq!(buy_hold[0], 10_000.0);
        assert_relative_eq!(buy_hold[1], 11_000.0);
        assert_relative_eq!(buy_hold[2], 9_000.0);
    }

    #[test]
    fn zero_reference_price_disables_benchmark() {
        let records = vec![
            trade(Some(Direction::Long), 100.0, 0.0, 1.0, 0.0, 0.0),
            trade(Some(Direction::Long), 100.0, 110.0, 1.0, 0.0, 0.0),
        ];
        let series = DerivedSeries::derive(&records, 10_000.0);
        assert!(series.buy_hold_capital.is_none());
    }

    #[test]
    fn missing_exit_price_disables_benchmark() {
        let mut second = trade(Some(Direction::Long), 100.0, 110.0, 1.0, 0.0, 0.0);
        second.mid_price_exit = None;
        let records = vec![trade(Some(Direction::Long), 100.0, 100.0, 1.0, 0.0, 0.0), second];
        let series = DerivedSeries::derive(&records, 10_000.0);
        assert!(series.buy_hold_capital.is_none());
    }

    #[test]
    fn empty_record_set_yields_no_series() {
        let series = DerivedSeries::derive(&[], 10_000.0);
        assert!(series.no_spread_pnl.is_none());
        assert!(series.no_spread_capital.is_none());
        assert!(series.buy_hold_capital.is_none());
    }

    #[test]
    fn derivation_is_deterministic() {
        let records = vec![
            trade(Some(Direction::Long), 100.0, 104.0, 3.0, 0.1, 0.2),
            trade(Some(Direction::Short), 104.0, 101.0, 2.0, 0.1, 0.1),
        ];
        let first = DerivedSeries::derive(&records, 50_000.0);
        let second = DerivedSeries::derive(&records, 50_000.0);
        assert_eq!(first, second);
    }
}
