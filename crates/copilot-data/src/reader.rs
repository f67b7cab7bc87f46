//! CSV loading for the four source tables.
//!
//! Reads `data.csv`, `budget.csv`, `fx.csv` and the optional `cash.csv` from
//! a data directory and turns them into the row types of
//! [`copilot_core::models`]. Blank cells become `None`; deciding whether a
//! row is usable is left to the data-gap policy.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use copilot_core::error::{CopilotError, Result};
use copilot_core::models::{CashRecord, FinancialRecord, FxRate, SourceTables};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

pub const ACTUALS_FILE: &str = "data.csv";
pub const BUDGET_FILE: &str = "budget.csv";
pub const FX_FILE: &str = "fx.csv";
pub const CASH_FILE: &str = "cash.csv";

const FINANCIAL_COLUMNS: &[&str] = &["month", "entity", "account_category", "amount", "currency"];
const FX_COLUMNS: &[&str] = &["month", "currency", "rate_to_usd"];
const CASH_COLUMNS: &[&str] = &["month", "entity", "cash_usd"];

// ── TablePaths ────────────────────────────────────────────────────────────────

/// Where each source table lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePaths {
    pub actuals: PathBuf,
    pub budget: PathBuf,
    pub fx: PathBuf,
    /// `None` when no cash table is available.
    pub cash: Option<PathBuf>,
}

impl TablePaths {
    /// Standard file names inside `dir`. `cash` is only set when the file
    /// exists.
    pub fn in_dir(dir: &Path) -> Self {
        let cash = dir.join(CASH_FILE);
        Self {
            actuals: dir.join(ACTUALS_FILE),
            budget: dir.join(BUDGET_FILE),
            fx: dir.join(FX_FILE),
            cash: cash.exists().then_some(cash),
        }
    }

    /// Replace individual paths with explicit overrides.
    pub fn with_overrides(
        mut self,
        actuals: Option<PathBuf>,
        budget: Option<PathBuf>,
        fx: Option<PathBuf>,
        cash: Option<PathBuf>,
    ) -> Self {
        if let Some(p) = actuals {
            self.actuals = p;
        }
        if let Some(p) = budget {
            self.budget = p;
        }
        if let Some(p) = fx {
            self.fx = p;
        }
        if cash.is_some() {
            self.cash = cash;
        }
        self
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load every table named by `paths`.
///
/// A missing actuals, budget or fx file is an error. Cash is loaded only
/// when `paths.cash` is set.
pub fn load_tables(paths: &TablePaths) -> Result<SourceTables> {
    let tables = SourceTables {
        actuals: load_financial_records(&paths.actuals)?,
        budget: load_financial_records(&paths.budget)?,
        fx: load_fx_rates(&paths.fx)?,
        cash: paths.cash.as_deref().map(load_cash_records).transpose()?,
    };

    info!(
        actuals = tables.actuals.len(),
        budget = tables.budget.len(),
        fx = tables.fx.len(),
        cash = tables.cash.as_ref().map(Vec::len),
        "loaded source tables"
    );

    Ok(tables)
}

/// Convenience wrapper for `load_tables(&TablePaths::in_dir(dir))`.
pub fn load_dir(dir: &Path) -> Result<SourceTables> {
    if !dir.is_dir() {
        return Err(CopilotError::DataPathNotFound(dir.to_path_buf()));
    }
    load_tables(&TablePaths::in_dir(dir))
}

pub fn load_financial_records(path: &Path) -> Result<Vec<FinancialRecord>> {
    read_table(path, FINANCIAL_COLUMNS)
}

pub fn load_fx_rates(path: &Path) -> Result<Vec<FxRate>> {
    read_table(path, FX_COLUMNS)
}

pub fn load_cash_records(path: &Path) -> Result<Vec<CashRecord>> {
    read_table(path, CASH_COLUMNS)
}

/// Parse CSV from any reader. `source` only labels errors and log lines.
pub fn read_table_from<R: Read, T: DeserializeOwned>(
    reader: R,
    source: &Path,
    required: &[&str],
) -> Result<Vec<T>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if let Some(column) = required.iter().find(|c| !headers.iter().any(|h| h == **c)) {
        return Err(CopilotError::MissingColumn {
            path: source.to_path_buf(),
            column: column.to_string(),
        });
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (index, result) in csv_reader.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                // +2: one for the header, one for 1-based line numbers.
                warn!(
                    "Skipping row {} of {}: {}",
                    index + 2,
                    source.display(),
                    e
                );
            }
        }
    }

    debug!(
        "Read {} rows from {} ({} skipped)",
        rows.len(),
        source.display(),
        skipped
    );

    Ok(rows)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn read_table<T: DeserializeOwned>(path: &Path, required: &[&str]) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|source| CopilotError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    read_table_from(BufReader::new(file), path, required)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn write_standard_tables(dir: &Path) {
        write_csv(
            dir,
            ACTUALS_FILE,
            "month,entity,account_category,amount,currency\n\
             2024-06,ParentCo,Revenue,1000,EUR\n\
             2024-06,ParentCo,COGS,300,USD\n",
        );
        write_csv(
            dir,
            BUDGET_FILE,
            "month,entity,account_category,amount,currency\n\
             2024-06,ParentCo,Revenue,900,USD\n",
        );
        write_csv(
            dir,
            FX_FILE,
            "month,currency,rate_to_usd\n2024-06,EUR,1.1\n2024-06,USD,1.0\n",
        );
    }

    // ── read_table_from ───────────────────────────────────────────────────────

    #[test]
    fn test_read_financial_rows() {
        let csv = "month,entity,account_category,amount,currency\n\
                   2024-06,ParentCo,Opex:Marketing,120.5,USD\n";
        let rows: Vec<FinancialRecord> =
            read_table_from(csv.as_bytes(), Path::new("mem"), FINANCIAL_COLUMNS).unwrap();
        assert_eq!(
            rows,
            vec![FinancialRecord::new("2024-06", "ParentCo", "Opex:Marketing", 120.5, "USD")]
        );
    }

    #[test]
    fn test_blank_cells_become_none() {
        let csv = "month,entity,account_category,amount,currency\n\
                   2024-06,ParentCo,Revenue,,USD\n\
                   ,ParentCo,Revenue,10,\n";
        let rows: Vec<FinancialRecord> =
            read_table_from(csv.as_bytes(), Path::new("mem"), FINANCIAL_COLUMNS).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].amount.is_none());
        assert!(rows[1].month.is_none());
        assert!(rows[1].currency.is_none());
    }

    #[test]
    fn test_missing_column_is_error() {
        let csv = "month,currency\n2024-06,EUR\n";
        let err = read_table_from::<_, FxRate>(csv.as_bytes(), Path::new("fx.csv"), FX_COLUMNS)
            .unwrap_err();
        match err {
            CopilotError::MissingColumn { column, .. } => assert_eq!(column, "rate_to_usd"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_row_is_skipped() {
        let csv = "month,currency,rate_to_usd\n\
                   2024-06,EUR,not-a-number\n\
                   2024-06,USD,1.0\n";
        let rows: Vec<FxRate> =
            read_table_from(csv.as_bytes(), Path::new("mem"), FX_COLUMNS).unwrap();
        assert_eq!(rows, vec![FxRate::new("2024-06", "USD", 1.0)]);
    }

    #[test]
    fn test_extra_columns_and_whitespace_are_tolerated() {
        let csv = "month, entity ,cash_usd,note\n 2024-06 ,ParentCo, 5000 ,q2 close\n";
        let rows: Vec<CashRecord> =
            read_table_from(csv.as_bytes(), Path::new("mem"), CASH_COLUMNS).unwrap();
        assert_eq!(rows, vec![CashRecord::new("2024-06", "ParentCo", 5000.0)]);
    }

    // ── load_dir ──────────────────────────────────────────────────────────────

    #[test]
    fn test_load_dir_without_cash() {
        let dir = TempDir::new().unwrap();
        write_standard_tables(dir.path());

        let tables = load_dir(dir.path()).unwrap();
        assert_eq!(tables.actuals.len(), 2);
        assert_eq!(tables.budget.len(), 1);
        assert_eq!(tables.fx.len(), 2);
        assert!(tables.cash.is_none());
    }

    #[test]
    fn test_load_dir_with_cash() {
        let dir = TempDir::new().unwrap();
        write_standard_tables(dir.path());
        write_csv(dir.path(), CASH_FILE, "month,entity,cash_usd\n2024-06,ParentCo,5000\n");

        let tables = load_dir(dir.path()).unwrap();
        assert_eq!(tables.cash.map(|c| c.len()), Some(1));
    }

    #[test]
    fn test_load_dir_missing_directory() {
        let err = load_dir(Path::new("/tmp/does-not-exist-cfo-copilot-xyz")).unwrap_err();
        assert!(matches!(err, CopilotError::DataPathNotFound(_)));
    }

    #[test]
    fn test_load_dir_missing_required_file() {
        let dir = TempDir::new().unwrap();
        write_standard_tables(dir.path());
        std::fs::remove_file(dir.path().join(FX_FILE)).unwrap();

        let err = load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, CopilotError::FileRead { .. }));
    }

    // ── TablePaths ────────────────────────────────────────────────────────────

    #[test]
    fn test_overrides_replace_only_given_paths() {
        let dir = TempDir::new().unwrap();
        let paths = TablePaths::in_dir(dir.path()).with_overrides(
            None,
            None,
            Some(PathBuf::from("/other/rates.csv")),
            Some(PathBuf::from("/other/cash.csv")),
        );
        assert_eq!(paths.actuals, dir.path().join(ACTUALS_FILE));
        assert_eq!(paths.fx, PathBuf::from("/other/rates.csv"));
        assert_eq!(paths.cash, Some(PathBuf::from("/other/cash.csv")));
    }
}
