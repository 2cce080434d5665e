use std::fs::File;
use std::path::Path;

use polars::prelude::*;

use super::SourceFormat;
use crate::errors::SourceError;
use crate::model::RawEvent;

pub(super) fn read_file(path: &Path) -> Result<Vec<RawEvent>, SourceError> {
    let file = File::open(path).map_err(|err| SourceError::io(path, err))?;
    let polars_error = |source| SourceError::Polars {
        format: SourceFormat::Parquet.as_str(),
        path: path.to_path_buf(),
        source,
    };

    let df = ParquetReader::new(file).finish().map_err(polars_error)?;
    events_from_dataframe(&df).map_err(polars_error)
}

/// Converts a frame with (a subset of) the raw event columns into typed events.
/// Columns that are absent read as null; the timestamp may be stored as text or as a temporal type.
pub fn events_from_dataframe(df: &DataFrame) -> PolarsResult<Vec<RawEvent>> {
    let len = df.height();

    let timestamp = string_values(df, "timestamp")?;
    let user_id = string_values(df, "user_id")?;
    let session_id = string_values(df, "session_id")?;
    let event_type = string_values(df, "event_type")?;
    let product_id = string_values(df, "product_id")?;
    let price = f64_values(df, "price")?;
    let quantity = i64_values(df, "quantity")?;
    let category = string_values(df, "category")?;
    let search_query = string_values(df, "search_query")?;
    let year = i32_values(df, "year")?;
    let month = i32_values(df, "month")?;
    let day = i32_values(df, "day")?;
    let hour = i32_values(df, "hour")?;

    let mut events = Vec::with_capacity(len);
    for idx in 0..len {
        events.push(RawEvent {
            timestamp: timestamp[idx].clone(),
            user_id: user_id[idx].clone(),
            session_id: session_id[idx].clone(),
            event_type: event_type[idx].clone(),
            product_id: product_id[idx].clone(),
            price: price[idx],
            quantity: quantity[idx],
            category: category[idx].clone(),
            search_query: search_query[idx].clone(),
            year: year[idx],
            month: month[idx],
            day: day[idx],
            hour: hour[idx],
        });
    }

    Ok(events)
}

fn string_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let Ok(column) = df.column(name) else {
        return Ok(vec![None; df.height()]);
    };
    let cast = column.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

fn f64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let Ok(column) = df.column(name) else {
        return Ok(vec![None; df.height()]);
    };
    let cast = column.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

fn i64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i64>>> {
    let Ok(column) = df.column(name) else {
        return Ok(vec![None; df.height()]);
    };
    let cast = column.cast(&DataType::Int64)?;
    Ok(cast.i64()?.into_iter().collect())
}

fn i32_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i32>>> {
    Ok(i64_values(df, name)?
        .into_iter()
        .map(|value| value.and_then(|v| i32::try_from(v).ok()))
        .collect())
}
