//! Spreadsheet codec for bulk import/export
//!
//! Reads customer rows out of an xlsx workbook (calamine) and writes the
//! template workbook (rust_xlsxwriter). The codec is pure: bytes in,
//! parsed rows or bytes out. Driving the parsed rows through the store is
//! the bulk engine's job.
//!
//! Row layout (0-indexed columns):
//!
//! | col | field |
//! |-----|-------|
//! | 0   | name |
//! | 1   | date of birth (ISO date) |
//! | 2   | NIC number |
//! | 3   | mobile number (optional) |
//! | 4-8 | address line 1, line 2, city, country name, country code (all-or-nothing) |
//! | 9-11| family member name, date of birth, NIC (all-or-nothing) |
//!
//! Row 0 is always a header and skipped.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;

use crate::customer::Customer;
use crate::error::CustomerError;
use crate::requests::{
    AddressCreateRequest, CityCreateRequest, CountryCreateRequest, CustomerCreateRequest,
    FamilyMemberCreateRequest, IdentityUpdate, MobileNumberCreateRequest,
};

/// Header row written to the template and expected (but not verified) on import
pub const TEMPLATE_HEADERS: [&str; 12] = [
    "Name",
    "Date of Birth",
    "NIC Number",
    "Mobile Number",
    "Address Line 1",
    "Address Line 2",
    "City",
    "Country Name",
    "Country Code",
    "Family Member Name",
    "Family Member Date of Birth",
    "Family Member NIC Number",
];

const COL_NAME: usize = 0;
const COL_DOB: usize = 1;
const COL_NIC: usize = 2;
const COL_MOBILE: usize = 3;
const COL_ADDRESS_LINE1: usize = 4;
const COL_ADDRESS_LINE2: usize = 5;
const COL_CITY: usize = 6;
const COL_COUNTRY_NAME: usize = 7;
const COL_COUNTRY_CODE: usize = 8;
const COL_FAMILY_NAME: usize = 9;
const COL_FAMILY_DOB: usize = 10;
const COL_FAMILY_NIC: usize = 11;

/// One customer parsed from an import row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub nic_number: String,
    pub mobile_number: Option<String>,
    pub address: Option<ImportAddress>,
    pub family_member: Option<ImportFamilyMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportAddress {
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub country_name: String,
    pub country_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFamilyMember {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub nic_number: String,
}

impl ImportRow {
    /// Converts the row into the aggregate-builder request shape
    pub fn into_request(self) -> CustomerCreateRequest {
        CustomerCreateRequest {
            name: self.name,
            date_of_birth: self.date_of_birth,
            nic_number: self.nic_number,
            mobile_numbers: self
                .mobile_number
                .into_iter()
                .map(|number| MobileNumberCreateRequest { number })
                .collect(),
            addresses: self
                .address
                .into_iter()
                .map(|address| AddressCreateRequest {
                    address_line1: address.address_line1,
                    address_line2: address.address_line2,
                    city: CityCreateRequest {
                        name: address.city,
                        country: CountryCreateRequest {
                            name: address.country_name,
                            code: address.country_code,
                        },
                    },
                })
                .collect(),
            family_members: self
                .family_member
                .into_iter()
                .map(|member| FamilyMemberCreateRequest {
                    name: member.name,
                    date_of_birth: member.date_of_birth,
                    nic_number: member.nic_number,
                })
                .collect(),
        }
    }
}

/// A data row and its 0-indexed position in the sheet
#[derive(Debug)]
pub struct ParsedRow {
    pub number: usize,
    pub result: Result<ImportRow, CustomerError>,
}

/// Parses every data row of sheet 0, keeping per-row failures as values
///
/// Opening failures (not an xlsx file, no sheets) are fatal. Blank rows
/// are dropped; the header row is always skipped.
pub fn parse_import_rows(data: &[u8]) -> Result<Vec<ParsedRow>, CustomerError> {
    let range = open_first_sheet(data)?;
    let mut rows = Vec::new();

    for (number, row) in range.rows().enumerate().skip(1) {
        if row.iter().all(is_blank) {
            continue;
        }
        rows.push(ParsedRow {
            number,
            result: parse_row(row),
        });
    }

    Ok(rows)
}

/// Parses name/date-of-birth/NIC rows for bulk update
///
/// Unlike import, any malformed row fails the whole parse: bulk update is
/// an all-or-nothing operation.
pub fn parse_identity_rows(data: &[u8]) -> Result<Vec<IdentityUpdate>, CustomerError> {
    let range = open_first_sheet(data)?;
    let mut updates = Vec::new();

    for (number, row) in range.rows().enumerate().skip(1) {
        if row.iter().all(is_blank) {
            continue;
        }
        let name = require(row, COL_NAME, "name", number)?;
        let date_of_birth = parse_date(&cell_text(row, COL_DOB), "date of birth", number)?;
        let nic_number = require(row, COL_NIC, "NIC number", number)?;
        updates.push(IdentityUpdate {
            nic_number,
            name,
            date_of_birth,
        });
    }

    Ok(updates)
}

/// Writes the template workbook: header row plus one row per customer
///
/// Only the first mobile number, first address, and first family member
/// of each customer are exported. The template is lossy by design for
/// customers with more than one of any.
pub fn write_template(customers: &[Customer]) -> Result<Vec<u8>, CustomerError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in TEMPLATE_HEADERS.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *header)
            .map_err(CustomerError::workbook)?;
    }

    for (index, customer) in customers.iter().enumerate() {
        let row = (index + 1) as u32;
        let mut write = |col: usize, value: &str| {
            sheet
                .write_string(row, col as u16, value)
                .map(|_| ())
                .map_err(CustomerError::workbook)
        };

        write(COL_NAME, &customer.name)?;
        write(COL_DOB, &customer.date_of_birth.to_string())?;
        write(COL_NIC, &customer.nic_number)?;

        if let Some(mobile) = customer.first_mobile() {
            write(COL_MOBILE, &mobile.number)?;
        }
        if let Some(address) = customer.first_address() {
            write(COL_ADDRESS_LINE1, &address.address_line1)?;
            if let Some(line2) = &address.address_line2 {
                write(COL_ADDRESS_LINE2, line2)?;
            }
            write(COL_CITY, &address.city.name)?;
            write(COL_COUNTRY_NAME, &address.city.country.name)?;
            write(COL_COUNTRY_CODE, &address.city.country.code)?;
        }
        if let Some(member) = customer.first_family_member() {
            write(COL_FAMILY_NAME, &member.name)?;
            write(COL_FAMILY_DOB, &member.date_of_birth.to_string())?;
            write(COL_FAMILY_NIC, &member.nic_number)?;
        }
    }

    workbook.save_to_buffer().map_err(CustomerError::workbook)
}

fn open_first_sheet(data: &[u8]) -> Result<calamine::Range<Data>, CustomerError> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(data.to_vec())).map_err(CustomerError::workbook)?;
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CustomerError::workbook("workbook has no sheets"))?
        .map_err(CustomerError::workbook)
}

fn parse_row(row: &[Data]) -> Result<ImportRow, CustomerError> {
    let name = require_cell(row, COL_NAME, "name")?;
    let date_of_birth = parse_date_cell(&cell_text(row, COL_DOB), "date of birth")?;
    let nic_number = require_cell(row, COL_NIC, "NIC number")?;

    let mobile = cell_text(row, COL_MOBILE);
    let mobile_number = (!mobile.is_empty()).then_some(mobile);

    Ok(ImportRow {
        name,
        date_of_birth,
        nic_number,
        mobile_number,
        address: parse_address_group(row)?,
        family_member: parse_family_group(row)?,
    })
}

fn parse_address_group(row: &[Data]) -> Result<Option<ImportAddress>, CustomerError> {
    let line1 = cell_text(row, COL_ADDRESS_LINE1);
    let line2 = cell_text(row, COL_ADDRESS_LINE2);
    let city = cell_text(row, COL_CITY);
    let country_name = cell_text(row, COL_COUNTRY_NAME);
    let country_code = cell_text(row, COL_COUNTRY_CODE);

    let present = [&line1, &line2, &city, &country_name, &country_code]
        .iter()
        .any(|value| !value.is_empty());
    if !present {
        return Ok(None);
    }

    for (value, field) in [
        (&line1, "address line 1"),
        (&city, "city"),
        (&country_name, "country name"),
        (&country_code, "country code"),
    ] {
        if value.is_empty() {
            return Err(CustomerError::validation(format!(
                "address columns are all-or-nothing, {} is missing",
                field
            )));
        }
    }

    Ok(Some(ImportAddress {
        address_line1: line1,
        address_line2: (!line2.is_empty()).then_some(line2),
        city,
        country_name,
        country_code,
    }))
}

fn parse_family_group(row: &[Data]) -> Result<Option<ImportFamilyMember>, CustomerError> {
    let name = cell_text(row, COL_FAMILY_NAME);
    let dob = cell_text(row, COL_FAMILY_DOB);
    let nic = cell_text(row, COL_FAMILY_NIC);

    if name.is_empty() && dob.is_empty() && nic.is_empty() {
        return Ok(None);
    }
    if name.is_empty() || dob.is_empty() || nic.is_empty() {
        return Err(CustomerError::validation(
            "family member columns are all-or-nothing (name, date of birth, NIC)",
        ));
    }

    Ok(Some(ImportFamilyMember {
        name,
        date_of_birth: parse_date_cell(&dob, "family member date of birth")?,
        nic_number: nic,
    }))
}

/// Renders a cell as trimmed text, the way the import columns expect it.
///
/// Numeric cells are rendered without a trailing `.0` so NIC-like values
/// survive Excel's habit of storing them as floats; date-formatted cells
/// become ISO dates.
fn cell_text(row: &[Data], index: usize) -> String {
    match row.get(index) {
        Some(Data::String(s)) => s.trim().to_string(),
        Some(Data::Float(f)) => {
            if f.fract() == 0.0 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Some(Data::Int(i)) => i.to_string(),
        Some(Data::Bool(b)) => b.to_string(),
        Some(Data::DateTime(dt)) => dt
            .as_datetime()
            .map(|value| value.date().to_string())
            .unwrap_or_default(),
        Some(Data::DateTimeIso(s)) => s.clone(),
        _ => String::new(),
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn require_cell(row: &[Data], index: usize, field: &str) -> Result<String, CustomerError> {
    let value = cell_text(row, index);
    if value.is_empty() {
        return Err(CustomerError::validation(format!("{} is required", field)));
    }
    Ok(value)
}

fn require(row: &[Data], index: usize, field: &str, number: usize) -> Result<String, CustomerError> {
    require_cell(row, index, field)
        .map_err(|_| CustomerError::validation(format!("row {}: {} is required", number, field)))
}

fn parse_date_cell(value: &str, field: &str) -> Result<NaiveDate, CustomerError> {
    value.parse::<NaiveDate>().map_err(|_| {
        CustomerError::validation(format!("{} '{}' is not a valid ISO date", field, value))
    })
}

fn parse_date(value: &str, field: &str, number: usize) -> Result<NaiveDate, CustomerError> {
    parse_date_cell(value, field)
        .map_err(|error| CustomerError::validation(format!("row {}: {}", number, error)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds an xlsx workbook from string rows, header included
    fn sheet_bytes(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in TEMPLATE_HEADERS.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    sheet.write_string((r + 1) as u32, c as u16, *value).unwrap();
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_parse_full_row() {
        let data = sheet_bytes(&[&[
            "Nimal Perera",
            "1985-03-12",
            "851234567V",
            "+94771234567",
            "12 Temple Road",
            "Apt 3",
            "Colombo",
            "Sri Lanka",
            "LK",
            "Kamala Perera",
            "1990-07-01",
            "907654321V",
        ]]);

        let rows = parse_import_rows(&data).unwrap();
        assert_eq!(rows.len(), 1);
        let row = rows[0].result.as_ref().unwrap();
        assert_eq!(row.name, "Nimal Perera");
        assert_eq!(row.nic_number, "851234567V");
        assert_eq!(row.mobile_number.as_deref(), Some("+94771234567"));

        let address = row.address.as_ref().unwrap();
        assert_eq!(address.city, "Colombo");
        assert_eq!(address.country_code, "LK");
        assert_eq!(address.address_line2.as_deref(), Some("Apt 3"));

        let member = row.family_member.as_ref().unwrap();
        assert_eq!(member.nic_number, "907654321V");
    }

    #[test]
    fn test_optional_groups_absent() {
        let data = sheet_bytes(&[&["Ruwan Silva", "1992-11-02", "921234567X"]]);

        let rows = parse_import_rows(&data).unwrap();
        let row = rows[0].result.as_ref().unwrap();
        assert!(row.mobile_number.is_none());
        assert!(row.address.is_none());
        assert!(row.family_member.is_none());
    }

    #[test]
    fn test_invalid_date_is_row_error_not_fatal() {
        let data = sheet_bytes(&[
            &["Bad Row", "12/03/1985", "851234567V"],
            &["Good Row", "1985-03-12", "852234567V"],
        ]);

        let rows = parse_import_rows(&data).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].result.is_err());
        assert!(rows[1].result.is_ok());
    }

    #[test]
    fn test_partial_address_group_is_row_error() {
        let data = sheet_bytes(&[&[
            "Nimal Perera",
            "1985-03-12",
            "851234567V",
            "",
            "12 Temple Road",
            "",
            "Colombo",
            // country name and code missing
        ]]);

        let rows = parse_import_rows(&data).unwrap();
        let error = rows[0].result.as_ref().unwrap_err().to_string();
        assert!(error.contains("all-or-nothing"), "got: {error}");
    }

    #[test]
    fn test_partial_family_group_is_row_error() {
        let data = sheet_bytes(&[&[
            "Nimal Perera",
            "1985-03-12",
            "851234567V",
            "",
            "",
            "",
            "",
            "",
            "",
            "Kamala Perera",
            // dob and nic missing
        ]]);

        let rows = parse_import_rows(&data).unwrap();
        assert!(rows[0].result.is_err());
    }

    #[test]
    fn test_header_row_skipped() {
        let data = sheet_bytes(&[]);
        let rows = parse_import_rows(&data).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_identity_rows_strict() {
        let data = sheet_bytes(&[
            &["Updated Name", "1985-03-12", "851234567V"],
            &["Broken", "not-a-date", "852234567V"],
        ]);

        let error = parse_identity_rows(&data).unwrap_err();
        assert!(matches!(error, CustomerError::Validation(_)));
    }

    #[test]
    fn test_identity_rows_parse() {
        let data = sheet_bytes(&[&["Updated Name", "1985-03-12", "851234567V"]]);

        let updates = parse_identity_rows(&data).unwrap();
        assert_eq!(
            updates,
            vec![IdentityUpdate {
                nic_number: "851234567V".to_string(),
                name: "Updated Name".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 12).unwrap(),
            }]
        );
    }

    #[test]
    fn test_garbage_bytes_fatal() {
        assert!(parse_import_rows(b"not an xlsx file").is_err());
    }
}
