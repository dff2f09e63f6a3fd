// Primitives for reading Excel workbooks, such as the spreadsheets exported
// by online forms.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::runoff::*;

/// Reads the first worksheet, header included, as strings.
pub fn read_excel_table(path: &str) -> RcvResult<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu { path })?
        .context(OpeningExcelSnafu { path })?;

    let mut res: Vec<Vec<String>> = Vec::new();
    for (idx, row) in wrange.rows().enumerate() {
        debug!("read_excel_table: idx: {:?} row: {:?}", idx, row);
        let mut cells: Vec<String> = Vec::with_capacity(row.len());
        for (col, cell) in row.iter().enumerate() {
            cells.push(read_cell(cell, idx + 1, col + 1)?);
        }
        res.push(cells);
    }
    Ok(res)
}

// Ranks are often stored as numbers, and timestamps as dates. Both end up as
// text, the timestamp is never interpreted.
fn read_cell(cell: &DataType, row: usize, col: usize) -> RcvResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Bool(b) => Ok(b.to_string()),
        DataType::Empty => Ok("".to_string()),
        DataType::Error(e) => ExcelWrongCellTypeSnafu {
            row,
            col,
            content: format!("{:?}", e),
        }
        .fail(),
        other => Ok(format!("{:?}", other)),
    }
}
