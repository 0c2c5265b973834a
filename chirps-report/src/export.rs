//! Spreadsheet and CSV export of the displayed rows.

use crate::{error::ExportError, row_set::RowSet};
use chirps_core::Point;
use chirps_utils::labels::coordinate_label;
use log::info;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

pub const SHEET_NAME: &str = "CHIRPS";
pub const YEAR_HEADER: &str = "Year";
pub const VALUE_HEADER: &str = "CHIRPS";

/// `CHIRPS_<lat>_<lon>.xlsx`
pub fn export_file_name(point: &Point) -> String {
    format!(
        "CHIRPS_{}_{}.xlsx",
        coordinate_label(point.latitude),
        coordinate_label(point.longitude)
    )
}

pub fn export_path(output_dir: &Path, point: &Point) -> PathBuf {
    output_dir.join(export_file_name(point))
}

fn ensure_parent(path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write one sheet with a bold `Year | CHIRPS` header and one row per record.
pub fn write_xlsx(rows: &RowSet, path: &Path) -> Result<(), ExportError> {
    ensure_parent(path)?;
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    worksheet.write_string_with_format(0, 0, YEAR_HEADER, &header)?;
    worksheet.write_string_with_format(0, 1, VALUE_HEADER, &header)?;
    for (row, record) in (1u32..).zip(rows.iter()) {
        worksheet.write_number(row, 0, record.year)?;
        worksheet.write_number(row, 1, record.accumulated)?;
    }
    workbook.save(path)?;
    info!("{} rows written to {}", rows.len(), path.display());
    Ok(())
}

/// Same columns as the spreadsheet, as CSV.
pub fn write_csv(rows: &RowSet, path: &Path) -> Result<(), ExportError> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([YEAR_HEADER, VALUE_HEADER])?;
    for record in rows {
        writer.write_record([record.year.to_string(), record.accumulated.to_string()])?;
    }
    writer.flush()?;
    info!("{} rows written to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirps_core::AnnualRecord;

    fn rows() -> RowSet {
        RowSet::from_records(&[
            AnnualRecord::new(2019, 200.0),
            AnnualRecord::new(2020, 0.0),
            AnnualRecord::new(2021, 1300.5),
        ])
    }

    #[test]
    fn test_export_path() {
        let point = Point::new(-15.0, -47.0).unwrap();
        let path = export_path(Path::new("/data/out"), &point);
        assert_eq!(path, PathBuf::from("/data/out/CHIRPS_-15.0_-47.0.xlsx"));
        assert_eq!(export_file_name(&point), "CHIRPS_-15.0_-47.0.xlsx");

        let point = Point::new(-15.25, 30.5).unwrap();
        assert_eq!(export_file_name(&point), "CHIRPS_-15.25_30.5.xlsx");
    }

    #[test]
    fn test_write_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let point = Point::new(-15.0, -47.0).unwrap();
        let path = export_path(&dir.path().join("nested"), &point);
        write_xlsx(&rows(), &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_write_xlsx_to_unwritable_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();
        let result = write_xlsx(&rows(), &blocker.join("CHIRPS_0.0_0.0.xlsx"));
        assert!(result.is_err());
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chirps.csv");
        write_csv(&rows(), &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Year,CHIRPS\n2019,200\n2021,1300.5\n");
    }
}
