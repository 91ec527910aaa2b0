use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::model::{Column, ColumnData, Table};
use crate::error::DataUnavailable;

/// Headline shown when neither an upload nor the default dataset is usable.
pub const NO_DATASET: &str = "No dataset found. Please upload a CSV to continue.";

/// Cell spellings read as missing values.
const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "<NA>",
    "#N/A", "#NA", "#N/A N/A", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

// ---------------------------------------------------------------------------
// Data sources
// ---------------------------------------------------------------------------

/// Raw bytes of a user-supplied file.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Read a picked or dropped file into memory. The handle is closed on return.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Upload { name, bytes })
    }
}

/// Which source the table came from, shown in the side panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Uploaded(String),
    UsingDefault(PathBuf),
}

impl Notice {
    /// Notice for the source a table was read from.
    pub fn for_source(upload: Option<&Upload>, default_path: &Path) -> Self {
        match upload {
            Some(up) => Notice::Uploaded(up.name.clone()),
            None => Notice::UsingDefault(default_path.to_path_buf()),
        }
    }

    pub fn text(&self) -> String {
        match self {
            Notice::Uploaded(_) => "Data uploaded successfully!".to_string(),
            Notice::UsingDefault(path) => {
                format!("Using default dataset ({} if available).", path.display())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub table: Table,
    pub notice: Notice,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Obtain the table for this cycle: the upload if present, else the default
/// resource. One attempt, no retries.
pub fn load(upload: Option<&Upload>, default_path: &Path) -> Result<Loaded, DataUnavailable> {
    let notice = Notice::for_source(upload, default_path);
    let table = match upload {
        Some(up) => parse_csv(up.bytes.as_slice())
            .with_context(|| format!("parsing upload '{}'", up.name))
            .map_err(|e| {
                log::error!("Failed to parse upload: {e:#}");
                DataUnavailable::new(
                    format!("Could not read '{}'. Please upload a valid CSV.", up.name),
                    &e,
                )
            })?,
        None => load_file(default_path).map_err(|e| {
            log::error!("Default dataset unavailable: {e:#}");
            DataUnavailable::new(NO_DATASET, &e)
        })?,
    };

    log::info!(
        "Loaded {:?} table with columns {:?}",
        table.shape(),
        table.column_names()
    );
    Ok(Loaded { table, notice })
}

/// Load a CSV file from disk.
pub fn load_file(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_csv(file).with_context(|| format!("parsing {}", path.display()))
}

// ---------------------------------------------------------------------------
// CSV parser
// ---------------------------------------------------------------------------

/// Comma-delimited, header row first. Short rows are padded with missing
/// cells; long rows are an error. Column types are inferred afterwards.
pub fn parse_csv<R: Read>(input: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record.context("reading CSV header")?,
        None => bail!("No columns to parse from file"),
    };
    let names = column_names(&header);
    let width = names.len();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
    let mut row_count = 0;

    for result in records {
        let record = result.with_context(|| format!("CSV row {row_count}"))?;
        if record.len() > width {
            let line = record.position().map_or(row_count + 2, |p| p.line() as usize);
            bail!(
                "Error tokenizing data. Expected {width} fields in line {line}, saw {}",
                record.len()
            );
        }
        for (col, column_cells) in cells.iter_mut().enumerate() {
            let cell = record.get(col).filter(|s| !is_na(s)).map(str::to_string);
            column_cells.push(cell);
        }
        row_count += 1;
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, column_cells)| infer_column(name, column_cells))
        .collect();
    Table::new(columns, row_count)
}

/// Header cells with blanks named `Unnamed: <i>` and duplicates mangled to
/// `name.1`, `name.2`, …
fn column_names(header: &csv::StringRecord) -> Vec<String> {
    let raw = header.iter().enumerate().map(|(i, h)| {
        let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
        if h.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            h.to_string()
        }
    });

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(header.len());
    for name in raw {
        let mut col = name;
        let mut seen = counts.get(&col).copied().unwrap_or(0);
        while seen > 0 {
            counts.insert(col.clone(), seen + 1);
            col = format!("{col}.{seen}");
            seen = counts.get(&col).copied().unwrap_or(0);
        }
        counts.insert(col.clone(), seen + 1);
        names.push(col);
    }
    names
}

fn is_na(s: &str) -> bool {
    NA_TOKENS.contains(&s.trim())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "True" | "true" | "TRUE" => Some(true),
        "False" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Pick the narrowest variant that holds every cell.
fn infer_column(name: String, cells: Vec<Option<String>>) -> Column {
    if cells.is_empty() {
        return Column::new(name, ColumnData::Text(Vec::new()));
    }

    let ints: Option<Vec<i64>> = cells
        .iter()
        .map(|c| c.as_deref().and_then(|s| s.trim().parse().ok()))
        .collect();
    if let Some(ints) = ints {
        return Column::new(name, ColumnData::Integer(ints));
    }

    let floats: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|c| match c.as_deref() {
            None => Some(None),
            Some(s) => s.trim().parse::<f64>().ok().map(Some),
        })
        .collect();
    if let Some(floats) = floats {
        return Column::new(name, ColumnData::Float(floats));
    }

    let bools: Option<Vec<bool>> = cells
        .iter()
        .map(|c| c.as_deref().and_then(parse_bool))
        .collect();
    if let Some(bools) = bools {
        return Column::new(name, ColumnData::Bool(bools));
    }

    Column::new(name, ColumnData::Text(cells))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Table {
        parse_csv(text.as_bytes()).unwrap()
    }

    #[test]
    fn shape_matches_header_and_rows() {
        let table = parse("Age,Income,Gender\n19,15.5,Male\n21,16,Female\n35,,Female\n");
        assert_eq!(table.shape(), (3, 3));
        assert_eq!(table.column_names(), vec!["Age", "Income", "Gender"]);
    }

    #[test]
    fn infers_column_variants() {
        let table = parse("i,f,b,t,gap\n1,1.5,True,x,1\n2,2,False,y,\n3,1e3,true,3,4\n");
        let dtype = |name: &str| table.column(name).unwrap().data.dtype();
        assert_eq!(dtype("i"), "int64");
        assert_eq!(dtype("f"), "float64");
        assert_eq!(dtype("b"), "bool");
        assert_eq!(dtype("t"), "object");
        // Integers with a gap widen to float.
        assert_eq!(
            table.column("gap").unwrap().data,
            ColumnData::Float(vec![Some(1.0), None, Some(4.0)])
        );
    }

    #[test]
    fn na_tokens_are_missing() {
        let table = parse("v,s\nNA,a\n2.5,null\nn/a,b\n");
        assert_eq!(
            table.column("v").unwrap().data,
            ColumnData::Float(vec![None, Some(2.5), None])
        );
        assert_eq!(
            table.column("s").unwrap().data,
            ColumnData::Text(vec![Some("a".into()), None, Some("b".into())])
        );
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_rejected() {
        let table = parse("a,b,c\n1,2\n3,4,5\n");
        assert_eq!(table.shape(), (2, 3));
        assert_eq!(table.column("c").unwrap().data, ColumnData::Float(vec![None, Some(5.0)]));

        let err = parse_csv("a,b\n1,2,3\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Expected 2 fields in line 2, saw 3"), "{err}");
    }

    #[test]
    fn blank_and_duplicate_headers_are_renamed() {
        let table = parse(",a,a,a\n0,1,2,3\n");
        assert_eq!(table.column_names(), vec!["Unnamed: 0", "a", "a.1", "a.2"]);
    }

    #[test]
    fn header_only_and_empty_inputs() {
        let table = parse("a,b\n");
        assert_eq!(table.shape(), (0, 2));
        assert!(table.numeric_column_names().is_empty());

        let err = parse_csv("".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("No columns to parse"));
    }

    #[test]
    fn upload_wins_over_default() {
        let upload = Upload {
            name: "mine.csv".into(),
            bytes: b"x,y\n1,2\n".to_vec(),
        };
        let loaded = load(Some(&upload), Path::new("/definitely/not/here.csv")).unwrap();
        assert_eq!(loaded.table.shape(), (1, 2));
        assert_eq!(loaded.notice, Notice::Uploaded("mine.csv".into()));
        assert_eq!(loaded.notice.text(), "Data uploaded successfully!");
    }

    #[test]
    fn falls_back_to_default_resource() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Mall_Customers.csv");
        std::fs::write(&path, "CustomerID,Gender\n1,Male\n2,Female\n").unwrap();

        let loaded = load(None, &path).unwrap();
        assert_eq!(loaded.table.shape(), (2, 2));
        assert_eq!(loaded.notice, Notice::UsingDefault(path));
    }

    #[test]
    fn missing_default_is_data_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(None, &dir.path().join("Mall_Customers.csv")).unwrap_err();
        assert_eq!(err.message, NO_DATASET);
        assert!(err.reason.contains("opening"));
    }

    #[test]
    fn broken_upload_is_data_unavailable() {
        let upload = Upload {
            name: "bad.csv".into(),
            bytes: b"a\n1,2\n".to_vec(),
        };
        let err = load(Some(&upload), Path::new("unused.csv")).unwrap_err();
        assert!(err.message.contains("bad.csv"));
    }

    #[test]
    fn upload_from_path_keeps_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a\n1\n").unwrap();
        let upload = Upload::from_path(&path).unwrap();
        assert_eq!(upload.name, "data.csv");
        assert_eq!(upload.bytes, b"a\n1\n");
    }
}
