// src/normalizer.rs

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::FrameError;
use crate::raw::{Field, RawSeries, Ticker};

/// Composite (field, ticker) column key. Orders field-major, so all tickers
/// of one field sit next to each other.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnKey {
    pub field: Field,
    pub ticker: Ticker,
}

impl ColumnKey {
    pub fn new(field: Field, ticker: Ticker) -> Self {
        ColumnKey { field, ticker }
    }
}

// Rendered as "{field}_{ticker}", e.g. "Adj Close_MSFT"
impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.field, self.ticker)
    }
}

impl FromStr for ColumnKey {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Tickers never contain '_', so the last separator splits the pair
        let (field, ticker) = s
            .rsplit_once('_')
            .ok_or_else(|| FrameError::InvalidColumnName(s.to_string()))?;

        let field = field
            .parse::<Field>()
            .map_err(|_| FrameError::InvalidColumnName(s.to_string()))?;
        let ticker = Ticker::new(ticker).map_err(|_| FrameError::InvalidColumnName(s.to_string()))?;

        Ok(ColumnKey::new(field, ticker))
    }
}

impl Serialize for ColumnKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub type ColumnMap = BTreeMap<ColumnKey, Vec<Option<f64>>>;

/// A requested ticker (or one of its fields) that has no data in the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Absence {
    pub ticker: Ticker,
    /// `None` when the whole ticker is missing.
    pub field: Option<Field>,
    pub reason: String,
}

/// One row per trading date, one column per (field, ticker).
///
/// Every column has exactly one slot per date; `None` marks a date the
/// ticker's series does not cover.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    dates: Vec<NaiveDate>,
    columns: ColumnMap,
    absences: Vec<Absence>,
}

impl NormalizedTable {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.keys().map(ColumnKey::to_string).collect()
    }

    pub fn column(&self, field: Field, ticker: &Ticker) -> Result<&[Option<f64>], FrameError> {
        lookup(&self.columns, field, ticker)
    }

    pub fn column_by_name(&self, name: &str) -> Result<&[Option<f64>], FrameError> {
        let key = name.parse::<ColumnKey>()?;
        lookup(&self.columns, key.field, &key.ticker)
    }

    pub fn value(&self, date: NaiveDate, key: &ColumnKey) -> Option<f64> {
        let row = self.dates.binary_search(&date).ok()?;
        self.columns.get(key).and_then(|values| values[row])
    }

    pub fn columns_for(&self, field: Field) -> impl Iterator<Item = (&ColumnKey, &[Option<f64>])> {
        columns_for(&self.columns, field)
    }

    pub fn tickers(&self) -> Vec<Ticker> {
        tickers(&self.columns)
    }

    pub fn absences(&self) -> &[Absence] {
        &self.absences
    }
}

pub(crate) fn lookup<'a>(
    columns: &'a ColumnMap,
    field: Field,
    ticker: &Ticker,
) -> Result<&'a [Option<f64>], FrameError> {
    columns
        .get(&ColumnKey::new(field, ticker.clone()))
        .map(Vec::as_slice)
        .ok_or_else(|| FrameError::MissingColumn {
            field,
            ticker: ticker.clone(),
        })
}

pub(crate) fn columns_for(
    columns: &ColumnMap,
    field: Field,
) -> impl Iterator<Item = (&ColumnKey, &[Option<f64>])> {
    columns
        .iter()
        .filter(move |(key, _)| key.field == field)
        .map(|(key, values)| (key, values.as_slice()))
}

pub(crate) fn tickers(columns: &ColumnMap) -> Vec<Ticker> {
    columns
        .keys()
        .map(|key| key.ticker.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Aligns every (ticker, field) series onto the union of all observed dates.
pub fn normalize(raw: &RawSeries) -> NormalizedTable {
    let dates: Vec<NaiveDate> = raw
        .iter_series()
        .flat_map(|(_, _, observations)| observations.iter().map(|o| o.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let row_of: HashMap<NaiveDate, usize> = dates
        .iter()
        .enumerate()
        .map(|(row, date)| (*date, row))
        .collect();

    let mut columns = ColumnMap::new();
    for (ticker, field, observations) in raw.iter_series() {
        let mut values = vec![None; dates.len()];
        for observation in observations {
            if let Some(&row) = row_of.get(&observation.date) {
                values[row] = Some(observation.value);
            }
        }
        columns.insert(ColumnKey::new(field, ticker.clone()), values);
    }

    let absences = collect_absences(raw);

    debug!(
        rows = dates.len(),
        columns = columns.len(),
        absences = absences.len(),
        "normalized raw price series"
    );

    NormalizedTable {
        dates,
        columns,
        absences,
    }
}

fn collect_absences(raw: &RawSeries) -> Vec<Absence> {
    let mut absences = Vec::new();

    for ticker in raw.requested() {
        let fields = raw.fields(ticker);

        if fields.is_empty() {
            let reason = raw
                .failures()
                .get(ticker)
                .cloned()
                .unwrap_or_else(|| "no observations returned".to_string());
            absences.push(Absence {
                ticker: ticker.clone(),
                field: None,
                reason,
            });
            continue;
        }

        for field in Field::ALL {
            if !fields.contains(&field) {
                absences.push(Absence {
                    ticker: ticker.clone(),
                    field: Some(field),
                    reason: "field not returned by provider".to_string(),
                });
            }
        }
    }

    absences
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::Observation;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, month, day).expect("valid date")
    }

    fn ticker(symbol: &str) -> Ticker {
        Ticker::new(symbol).unwrap()
    }

    fn closes(values: &[(NaiveDate, f64)]) -> Vec<Observation> {
        values.iter().map(|(d, v)| Observation::new(*d, *v)).collect()
    }

    fn three_day_raw() -> RawSeries {
        let mut raw = RawSeries::new(vec![ticker("AAPL"), ticker("MSFT")]);
        raw.insert(
            ticker("AAPL"),
            Field::Close,
            closes(&[(date(1, 3), 182.01), (date(1, 4), 179.70), (date(1, 5), 174.92)]),
        )
        .unwrap();
        raw.insert(
            ticker("MSFT"),
            Field::Close,
            closes(&[(date(1, 3), 334.75), (date(1, 4), 329.01), (date(1, 5), 316.38)]),
        )
        .unwrap();
        raw
    }

    #[test]
    fn test_three_day_scenario() {
        let table = normalize(&three_day_raw());

        assert_eq!(table.len(), 3);
        assert_eq!(table.column_names(), vec!["Close_AAPL", "Close_MSFT"]);
        assert_eq!(
            table.column_by_name("Close_MSFT").unwrap(),
            &[Some(334.75), Some(329.01), Some(316.38)]
        );
    }

    #[test]
    fn test_normalized_values_match_raw() {
        let raw = three_day_raw();
        let table = normalize(&raw);

        for (ticker, field, observations) in raw.iter_series() {
            let key = ColumnKey::new(field, ticker.clone());
            for observation in observations {
                assert_eq!(table.value(observation.date, &key), Some(observation.value));
            }
        }
    }

    #[test]
    fn test_gap_is_marked_missing_not_zero() {
        let mut raw = three_day_raw();
        raw.insert(
            ticker("TSLA"),
            Field::Close,
            closes(&[(date(1, 3), 1199.78), (date(1, 5), 1088.12)]),
        )
        .unwrap();

        let table = normalize(&raw);
        let tsla = table.column(Field::Close, &ticker("TSLA")).unwrap();

        assert_eq!(tsla, &[Some(1199.78), None, Some(1088.12)]);
        assert_eq!(table.value(date(1, 4), &ColumnKey::new(Field::Close, ticker("TSLA"))), None);
    }

    #[test]
    fn test_union_of_dates_is_sorted() {
        let mut raw = RawSeries::new(vec![]);
        raw.insert(ticker("AAPL"), Field::Open, closes(&[(date(1, 4), 1.0), (date(1, 6), 2.0)]))
            .unwrap();
        raw.insert(ticker("MSFT"), Field::Open, closes(&[(date(1, 3), 3.0), (date(1, 5), 4.0)]))
            .unwrap();

        let table = normalize(&raw);
        assert_eq!(table.dates(), &[date(1, 3), date(1, 4), date(1, 5), date(1, 6)]);
    }

    #[test]
    fn test_absent_tickers_and_fields_are_reported() {
        let mut raw = three_day_raw();
        raw.record_failure(ticker("TSLA"), "HTTP status client error (404 Not Found)");

        let table = normalize(&raw);

        // The failed ticker has no column at all, never a zero-filled one
        assert!(table.column(Field::Close, &ticker("TSLA")).is_err());

        let tsla: Vec<&Absence> = table
            .absences()
            .iter()
            .filter(|a| a.ticker == ticker("TSLA"))
            .collect();
        assert_eq!(tsla.len(), 1);
        assert_eq!(tsla[0].field, None);
        assert!(tsla[0].reason.contains("404"));

        // AAPL only has Close, so the other five fields are reported
        let aapl_fields: Vec<Field> = table
            .absences()
            .iter()
            .filter(|a| a.ticker == ticker("AAPL"))
            .filter_map(|a| a.field)
            .collect();
        assert_eq!(
            aapl_fields,
            vec![Field::Open, Field::High, Field::Low, Field::AdjClose, Field::Volume]
        );
    }

    #[test]
    fn test_missing_column_lookup_reports_no_data() {
        let table = normalize(&three_day_raw());

        assert_eq!(
            table.column(Field::Volume, &ticker("AAPL")),
            Err(FrameError::MissingColumn {
                field: Field::Volume,
                ticker: ticker("AAPL"),
            })
        );
        assert!(matches!(
            table.column_by_name("Close"),
            Err(FrameError::InvalidColumnName(_))
        ));
    }

    #[test]
    fn test_column_key_round_trip_with_spaced_field() {
        let key: ColumnKey = "Adj Close_MSFT".parse().unwrap();
        assert_eq!(key, ColumnKey::new(Field::AdjClose, ticker("MSFT")));
        assert_eq!(key.to_string(), "Adj Close_MSFT");
    }

    #[test]
    fn test_column_order_is_field_major() {
        let mut raw = three_day_raw();
        raw.insert(ticker("AAPL"), Field::Open, closes(&[(date(1, 3), 177.83)]))
            .unwrap();

        let table = normalize(&raw);
        assert_eq!(table.column_names(), vec!["Open_AAPL", "Close_AAPL", "Close_MSFT"]);
        assert_eq!(table.tickers(), vec![ticker("AAPL"), ticker("MSFT")]);
    }
}
