use super::Cursor;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// In-memory ordering of a cursor's rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDirection,
    pub case_sensitive: bool,
}

impl Cursor {
    /// Sorts the rows on `field`.
    ///
    /// Without an explicit direction, repeated calls on the same field cycle
    /// ascending, descending, then back to fetch order. The pointer stays on
    /// the same row.
    pub fn sort(
        &mut self,
        field: &str,
        direction: Option<SortDirection>,
        case_sensitive: bool,
    ) -> Result<()> {
        if !self.types.contains_key(field) {
            return Err(Error::field_not_found(&self.table, field));
        }

        let direction = match direction {
            Some(direction) => Some(direction),
            None => match &self.sort {
                Some(order) if order.field == field => match order.direction {
                    SortDirection::Asc => Some(SortDirection::Desc),
                    SortDirection::Desc => None,
                },
                _ => Some(SortDirection::Asc),
            },
        };

        self.sort = direction.map(|direction| SortOrder {
            field: field.to_string(),
            direction,
            case_sensitive,
        });

        tracing::debug!(table = %self.table, sort = ?self.sort, "sort");
        self.apply_sort();
        Ok(())
    }

    pub fn sort_order(&self) -> Option<&SortOrder> {
        self.sort.as_ref()
    }

    /// Drops the sort and restores fetch order.
    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.apply_sort();
    }

    pub(super) fn apply_sort(&mut self) {
        let current = self.current_row().map(|row| row.seq);

        match &self.sort {
            None => self.rows.sort_by_key(|row| row.seq),
            Some(order) => self.rows.sort_by(|a, b| {
                let ord = match (a.get(&order.field), b.get(&order.field)) {
                    (Some(a), Some(b)) => a.sort_cmp(b, order.case_sensitive),
                    (a, b) => a.is_some().cmp(&b.is_some()),
                };
                let ord = match order.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                };
                // Ties keep fetch order so repeated sorts are stable
                ord.then_with(|| a.seq.cmp(&b.seq))
            }),
        }

        if let Some(seq) = current {
            self.row_number = self.rows.iter().position(|row| row.seq == seq);
        }
    }
}
