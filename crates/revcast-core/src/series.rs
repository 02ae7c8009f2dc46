//! Monthly series builder
//!
//! Joins sales with the time dimension, orders the joined rows by calendar
//! date and resamples them into month-end revenue totals.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{GapPolicy, MonthlyPoint, MonthlySeries, SaleRecord, TimeRecord};

/// Last day of the month containing `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

/// Month-end of the month after the one ending on `current`
pub fn next_month_end(current: NaiveDate) -> NaiveDate {
    current.succ_opt().map(month_end).unwrap_or(current)
}

/// Build the monthly revenue series from raw sales and the time dimension.
///
/// Sales whose date key is missing from the time dimension are left out of
/// the totals. Fails when either input is empty, the time dimension maps a
/// key to two different dates, or no sale matches the time dimension.
pub fn build_series(
    sales: &[SaleRecord],
    time: &[TimeRecord],
    gaps: GapPolicy,
) -> Result<MonthlySeries> {
    if sales.is_empty() {
        return Err(Error::DataLoad("sales table has no rows".into()));
    }
    if time.is_empty() {
        return Err(Error::DataLoad("time dimension has no rows".into()));
    }

    let mut calendar: HashMap<&str, NaiveDate> = HashMap::with_capacity(time.len());
    for row in time {
        if let Some(existing) = calendar.insert(row.date_key.as_str(), row.date) {
            if existing != row.date {
                return Err(Error::DataLoad(format!(
                    "time dimension maps date key '{}' to both {} and {}",
                    row.date_key, existing, row.date
                )));
            }
        }
    }

    // Left join: unmatched sales carry no date and are dropped
    let mut joined: Vec<(NaiveDate, f64)> = Vec::with_capacity(sales.len());
    let mut unmatched = 0usize;
    for sale in sales {
        match calendar.get(sale.date_key.as_str()) {
            Some(&date) => joined.push((date, sale.revenue)),
            None => unmatched += 1,
        }
    }

    if unmatched > 0 {
        warn!(
            unmatched,
            total = sales.len(),
            "Excluded sales with no matching time dimension entry"
        );
    }
    if joined.is_empty() {
        return Err(Error::DataLoad(
            "no sales matched the time dimension (join produced zero rows)".into(),
        ));
    }

    joined.sort_by_key(|(date, _)| *date);

    let mut points: Vec<MonthlyPoint> = Vec::new();
    for (date, revenue) in joined {
        let key = month_end(date);
        let previous = points.last().map(|p| p.month_end);

        if previous == Some(key) {
            if let Some(last) = points.last_mut() {
                last.revenue += revenue;
            }
            continue;
        }

        if let (Some(previous), GapPolicy::ZeroFill) = (previous, gaps) {
            let mut next = next_month_end(previous);
            while next < key {
                points.push(MonthlyPoint {
                    month_end: next,
                    revenue: 0.0,
                });
                next = next_month_end(next);
            }
        }

        points.push(MonthlyPoint {
            month_end: key,
            revenue,
        });
    }

    debug!(
        months = points.len(),
        gap_policy = gaps.as_str(),
        "Built monthly series"
    );

    MonthlySeries::from_points(points)
}
