use super::{Extraction, NamedSheet, SourceRecipe};

/// Header spellings of the multi-year workbook, one sheet per year.
const LEGACY_SHEETS: [(&str, [&str; 10]); 5] = [
    (
        "2010",
        [
            "DATE", "TIME (UTC)", "ACID", "TYPE A/C", "ALT", "LOC", "COLOR", "INJURY", "CITY",
            "STATE",
        ],
    ),
    (
        "2011",
        [
            "DATE", "TIME (UTC)", "ACID", "TYPE A/C", "ALT", "LOC", "COLOR", "Injury", "CITY",
            "STATE",
        ],
    ),
    (
        "2012",
        [
            "Date", "Time (UTC)", "ACID", "Type A/C", "ALT", "Loc", "Color", "Injury Reported",
            "City", "State",
        ],
    ),
    (
        "2013",
        [
            "DATE", "TIME", "ACID", "AIRCRAFT TYPE", "ALTITUDE", "AIRPORT", "LASER COLOR",
            "INJURY REPORTED", "CITY", "STATE",
        ],
    ),
    (
        "2014",
        [
            "DATE", "TIME (UTC)", "ACFT ID", "ACFT TYPE", "ALT", "ARPT", "LASER COLOR", "INJURY",
            "CITY", "STATE",
        ],
    ),
];

/// Yearly workbooks that already carry the canonical column order, with the
/// number of title rows sitting above their header row.
const YEARLY: [(&str, usize); 8] = [
    ("2015", 0),
    ("2016", 0),
    ("2017", 1),
    ("2018", 1),
    ("2019", 0),
    ("2020", 0),
    ("2021", 0),
    ("2022", 0),
];

pub fn sources() -> Vec<SourceRecipe> {
    let legacy = SourceRecipe {
        id: "2010-2014".to_string(),
        location: "laser_incidents_2010-2014.xls".into(),
        sheet: None,
        skip_rows: 0,
        extraction: Extraction::Named {
            sheets: LEGACY_SHEETS
                .iter()
                .map(|(sheet, labels)| NamedSheet {
                    sheet: sheet.to_string(),
                    columns: labels.iter().map(|l| l.to_string()).collect(),
                })
                .collect(),
        },
    };

    std::iter::once(legacy)
        .chain(YEARLY.iter().map(|&(year, skip_rows)| SourceRecipe {
            id: year.to_string(),
            location: format!("laser_incidents_{}.xlsx", year).into(),
            sheet: None,
            skip_rows,
            extraction: Extraction::Positional,
        }))
        .collect()
}
