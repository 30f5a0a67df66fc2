use super::Cursor;
use crate::{stmt::Value, Error, Result};

impl Cursor {
    pub fn first(&mut self) -> Result<usize> {
        if self.rows.is_empty() {
            return Err(Error::no_records());
        }
        self.row_number = Some(0);
        Ok(0)
    }

    pub fn prior(&mut self) -> Result<usize> {
        match self.row_number {
            _ if self.rows.is_empty() => Err(Error::no_records()),
            Some(0) | None => Err(Error::beginning_of_file()),
            Some(idx) => {
                self.row_number = Some(idx - 1);
                Ok(idx - 1)
            }
        }
    }

    pub fn next(&mut self) -> Result<usize> {
        let last = match self.rows.len() {
            0 => return Err(Error::no_records()),
            len => len - 1,
        };

        match self.row_number {
            Some(idx) if idx >= last => Err(Error::end_of_file()),
            Some(idx) => {
                self.row_number = Some(idx + 1);
                Ok(idx + 1)
            }
            None => {
                self.row_number = Some(0);
                Ok(0)
            }
        }
    }

    pub fn last(&mut self) -> Result<usize> {
        if self.rows.is_empty() {
            return Err(Error::no_records());
        }
        let idx = self.rows.len() - 1;
        self.row_number = Some(idx);
        Ok(idx)
    }

    pub fn move_to_row_num(&mut self, row_number: usize) -> Result<usize> {
        if self.rows.is_empty() {
            return Err(Error::no_records());
        }
        if row_number >= self.rows.len() {
            return Err(Error::row_not_found(format!(
                "row {row_number} of `{}`",
                self.table
            )));
        }
        self.row_number = Some(row_number);
        Ok(row_number)
    }

    /// Moves to the row with key `pk`.
    ///
    /// Returns `false` and leaves the pointer on row 0 when no row matches.
    pub fn move_to_pk(&mut self, pk: &Value) -> bool {
        match self.find_pk(pk) {
            Some(idx) => {
                self.row_number = Some(idx);
                true
            }
            None => {
                self.row_number = if self.rows.is_empty() { None } else { Some(0) };
                false
            }
        }
    }

    /// Row number of the row with key `pk`.
    pub fn find_pk(&self, pk: &Value) -> Option<usize> {
        let key = pk.to_key_string();
        (0..self.rows.len()).find(|&idx| {
            self.pk_at(idx)
                .is_some_and(|row_pk| row_pk.to_key_string() == key)
        })
    }
}
