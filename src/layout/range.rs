//! A1-notation range addressing.
//!
//! Column indices handed to the formatting helpers are zero-based with an
//! exclusive end, while the row end is used as-is as a one-based row number.
//! `bounded_range(0, 3, 0, 1)` therefore addresses exactly `A1:C1`.

use crate::error::{Result, SheetError};

/// Convert a zero-based column index to its letter form (0 -> A, 26 -> AA)
pub fn column_index_to_letter(index: u32) -> String {
    let mut result = String::new();
    let mut n = index as u64 + 1;

    while n > 0 {
        n -= 1;
        let c = (b'A' + (n % 26) as u8) as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Convert a one-based column number to its letter form (1 -> A, 27 -> AA).
/// Zero has no letter form and yields an empty string.
pub fn column_number_to_letter(number: u32) -> String {
    match number {
        0 => String::new(),
        n => column_index_to_letter(n - 1),
    }
}

/// `A{row_start}:{last column}{row_end}` for a table `column_count` wide.
///
/// `row_end` is the one-based number of the last row, so
/// `generate_range(3, 5, 2)` is `A2:C5`.
pub fn generate_range(column_count: u32, row_end: u32, row_start: u32) -> Result<String> {
    if column_count == 0 {
        return Err(SheetError::invalid_range("column count must be positive"));
    }
    if row_start == 0 || row_end == 0 {
        return Err(SheetError::invalid_range("row numbers are one-based"));
    }
    if row_start > row_end {
        return Err(SheetError::invalid_range(format!(
            "start row {row_start} is after end row {row_end}"
        )));
    }

    Ok(format!(
        "A{}:{}{}",
        row_start,
        column_number_to_letter(column_count),
        row_end
    ))
}

/// Range for the column span `[start_col, end_col)` and rows
/// `start_row + 1 ..= end_row` (one-based).
pub fn bounded_range(start_col: i64, end_col: i64, start_row: i64, end_row: i64) -> Result<String> {
    if start_col < 0 || end_col < 0 || start_row < 0 || end_row < 0 {
        return Err(SheetError::invalid_range(format!(
            "negative index in ({start_col}, {end_col}, {start_row}, {end_row})"
        )));
    }
    if start_col > end_col {
        return Err(SheetError::invalid_range(format!(
            "start column {start_col} is after end column {end_col}"
        )));
    }
    if start_col == end_col {
        return Err(SheetError::invalid_range(format!(
            "empty column span at {start_col}, use end = start + 1 for a single column"
        )));
    }
    if start_row > end_row {
        return Err(SheetError::invalid_range(format!(
            "start row {start_row} is after end row {end_row}"
        )));
    }
    if end_col > u32::MAX as i64 {
        return Err(SheetError::invalid_range(format!("column {end_col} is out of range")));
    }

    Ok(format!(
        "{}{}:{}{}",
        column_index_to_letter(start_col as u32),
        start_row + 1,
        column_index_to_letter((end_col - 1) as u32),
        end_row
    ))
}

/// Single-row range over the first row for the column span `[start_col, end_col)`
pub fn bounded_columns(start_col: i64, end_col: i64) -> Result<String> {
    bounded_range(start_col, end_col, 0, 1)
}

/// Prefix a range with a quoted sheet title: `'My sheet'!A1:B2`
pub fn qualify(sheet_name: &str, range: &str) -> String {
    format!("'{}'!{}", sheet_name.replace('\'', "''"), range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index_to_letter() {
        assert_eq!(column_index_to_letter(0), "A");
        assert_eq!(column_index_to_letter(1), "B");
        assert_eq!(column_index_to_letter(25), "Z");
        assert_eq!(column_index_to_letter(26), "AA");
        assert_eq!(column_index_to_letter(27), "AB");
        assert_eq!(column_index_to_letter(51), "AZ");
        assert_eq!(column_index_to_letter(52), "BA");
        assert_eq!(column_index_to_letter(701), "ZZ");
        assert_eq!(column_index_to_letter(702), "AAA");
    }

    #[test]
    fn test_column_number_to_letter() {
        assert_eq!(column_number_to_letter(1), "A");
        assert_eq!(column_number_to_letter(27), "AA");
        assert_eq!(column_number_to_letter(703), "AAA");
        assert_eq!(column_number_to_letter(0), "");
    }

    #[test]
    fn test_letters_follow_spreadsheet_ordering() {
        let mut previous = column_index_to_letter(0);
        for index in 1..(26 * 26 * 26) {
            let current = column_index_to_letter(index);
            let ordered = previous.len() < current.len()
                || (previous.len() == current.len() && previous < current);
            assert!(ordered, "{} should sort before {}", previous, current);
            previous = current;
        }
    }

    #[test]
    fn test_generate_range() {
        assert_eq!(generate_range(3, 5, 1).unwrap(), "A1:C5");
        assert_eq!(generate_range(3, 5, 2).unwrap(), "A2:C5");
        assert_eq!(generate_range(27, 1, 1).unwrap(), "A1:AA1");
    }

    #[test]
    fn test_generate_range_rejects_empty_table() {
        assert!(matches!(generate_range(0, 5, 1), Err(SheetError::InvalidRange(_))));
    }

    #[test]
    fn test_generate_range_rejects_inverted_rows() {
        assert!(matches!(generate_range(3, 1, 5), Err(SheetError::InvalidRange(_))));
        assert_eq!(generate_range(3, 4, 4).unwrap(), "A4:C4");
    }

    #[test]
    fn test_bounded_range() {
        assert_eq!(bounded_columns(0, 1).unwrap(), "A1:A1");
        assert_eq!(bounded_columns(0, 2).unwrap(), "A1:B1");
        assert_eq!(bounded_range(0, 3, 5, 6).unwrap(), "A6:C6");
        assert_eq!(bounded_range(0, 3, 1, 3).unwrap(), "A2:C3");
        assert_eq!(bounded_range(2, 3, 2, 3).unwrap(), "C3:C3");
        assert_eq!(bounded_columns(4, 5).unwrap(), "E1:E1");
    }

    #[test]
    fn test_bounded_range_rejects_bad_bounds() {
        assert!(matches!(bounded_columns(-1, 2), Err(SheetError::InvalidRange(_))));
        assert!(matches!(bounded_columns(0, 0), Err(SheetError::InvalidRange(_))));
        assert!(matches!(bounded_columns(1, 0), Err(SheetError::InvalidRange(_))));
        assert!(matches!(bounded_range(1, 0, 6, 1), Err(SheetError::InvalidRange(_))));
        assert!(matches!(bounded_range(0, 1, 6, 1), Err(SheetError::InvalidRange(_))));
    }

    #[test]
    fn test_qualify_quotes_sheet_name() {
        assert_eq!(qualify("Contracts", "A1:B1"), "'Contracts'!A1:B1");
        assert_eq!(qualify("Bob's", "A1"), "'Bob''s'!A1");
    }
}
