//! Bill splitting
//!
//! A table's bill is the concatenation of the lines of its unpaid bound
//! orders, in binding order. Line indices in a by-item split refer to that
//! concatenated list. Every method produces portions whose amounts add up
//! to the bill total exactly, to the cent.

use crate::error::{ManagerError, ManagerResult};
use crate::orders::money;
use rust_decimal::Decimal;
use shared::models::{BillPortion, DiningTable, Order, OrderLine, PaymentStatus, SplitMethod};
use std::collections::{HashMap, HashSet};

/// Upper bound on portions for any method
pub const MAX_PORTIONS: usize = 50;

/// The open bill of a table
#[derive(Debug, Clone, Default)]
pub struct TableBill {
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
}

impl TableBill {
    /// Build from the table's bound orders, skipping ones already paid
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut bill = TableBill::default();
        for order in orders {
            if order.payment_status != PaymentStatus::Pending {
                continue;
            }
            bill.lines.extend(order.lines.iter().cloned());
            bill.total += order.total;
        }
        bill
    }
}

pub fn compute_split(
    table: &DiningTable,
    bill: &TableBill,
    method: &SplitMethod,
) -> ManagerResult<Vec<BillPortion>> {
    if bill.lines.is_empty() || bill.total <= Decimal::ZERO {
        return Err(ManagerError::Validation(format!(
            "table #{} has no open bill to split",
            table.table_number
        )));
    }

    let portions = match method {
        SplitMethod::Even { ways } => split_even(bill, *ways)?,
        SplitMethod::ByItem { splits } => split_by_item(bill, splits)?,
        SplitMethod::BySeat { splits } => split_by_seat(table, bill, splits)?,
    };

    let sum: Decimal = portions.iter().map(|p| p.amount).sum();
    if !money::money_eq(sum, bill.total) {
        return Err(ManagerError::SplitMismatch(format!(
            "portions add up to {sum}, bill total is {}",
            bill.total
        )));
    }
    Ok(portions)
}

fn check_group_count(count: usize) -> ManagerResult<()> {
    if count == 0 {
        return Err(ManagerError::SplitMismatch("no split groups given".into()));
    }
    if count > MAX_PORTIONS {
        return Err(ManagerError::SplitMismatch(format!(
            "at most {MAX_PORTIONS} portions, got {count}"
        )));
    }
    Ok(())
}

fn split_even(bill: &TableBill, ways: u32) -> ManagerResult<Vec<BillPortion>> {
    if ways == 0 || ways as usize > MAX_PORTIONS {
        return Err(ManagerError::Validation(format!(
            "even split needs between 1 and {MAX_PORTIONS} ways, got {ways}"
        )));
    }
    Ok(money::split_evenly(bill.total, ways)
        .into_iter()
        .zip(1..)
        .map(|(amount, portion)| BillPortion {
            portion,
            amount,
            line_indices: Vec::new(),
            seats: Vec::new(),
        })
        .collect())
}

fn split_by_item(bill: &TableBill, splits: &[Vec<usize>]) -> ManagerResult<Vec<BillPortion>> {
    check_group_count(splits.len())?;

    let mut seen = HashSet::new();
    for (g, group) in splits.iter().enumerate() {
        if group.is_empty() {
            return Err(ManagerError::SplitMismatch(format!("group {g} is empty")));
        }
        for &index in group {
            if index >= bill.lines.len() {
                return Err(ManagerError::SplitMismatch(format!(
                    "line index {index} is out of range (bill has {} lines)",
                    bill.lines.len()
                )));
            }
            if !seen.insert(index) {
                return Err(ManagerError::SplitMismatch(format!(
                    "line index {index} appears in more than one group"
                )));
            }
        }
    }
    if seen.len() != bill.lines.len() {
        let missing: Vec<usize> = (0..bill.lines.len())
            .filter(|i| !seen.contains(i))
            .collect();
        return Err(ManagerError::SplitMismatch(format!(
            "line indices {missing:?} are not assigned to any group"
        )));
    }

    Ok(splits
        .iter()
        .zip(1..)
        .map(|(group, portion)| BillPortion {
            portion,
            amount: group.iter().map(|&i| money::line_total(&bill.lines[i])).sum(),
            line_indices: group.clone(),
            seats: Vec::new(),
        })
        .collect())
}

/// Lines with a seat go to that seat's group; seatless lines are shared
/// evenly by all groups
fn split_by_seat(
    table: &DiningTable,
    bill: &TableBill,
    splits: &[Vec<u32>],
) -> ManagerResult<Vec<BillPortion>> {
    check_group_count(splits.len())?;

    let mut group_of_seat = HashMap::new();
    for (g, group) in splits.iter().enumerate() {
        if group.is_empty() {
            return Err(ManagerError::SplitMismatch(format!("group {g} is empty")));
        }
        for &seat_number in group {
            if table.seat(seat_number).is_none() {
                return Err(ManagerError::SplitMismatch(format!(
                    "seat {seat_number} does not exist on table #{}",
                    table.table_number
                )));
            }
            if group_of_seat.insert(seat_number, g).is_some() {
                return Err(ManagerError::SplitMismatch(format!(
                    "seat {seat_number} appears in more than one group"
                )));
            }
        }
    }

    let mut amounts = vec![Decimal::ZERO; splits.len()];
    let mut indices = vec![Vec::new(); splits.len()];
    let mut shared_total = Decimal::ZERO;

    for (i, line) in bill.lines.iter().enumerate() {
        match line.seat_number {
            Some(seat_number) => {
                let g = *group_of_seat.get(&seat_number).ok_or_else(|| {
                    ManagerError::SplitMismatch(format!(
                        "seat {seat_number} has items but is not in any group"
                    ))
                })?;
                amounts[g] += money::line_total(line);
                indices[g].push(i);
            }
            None => shared_total += money::line_total(line),
        }
    }

    let shares = money::split_evenly(shared_total, splits.len() as u32);
    Ok(splits
        .iter()
        .zip(amounts)
        .zip(indices)
        .zip(shares)
        .zip(1..)
        .map(|((((group, amount), line_indices), share), portion)| BillPortion {
            portion,
            amount: amount + share,
            line_indices,
            seats: group.clone(),
        })
        .collect())
}
