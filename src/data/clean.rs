use crate::data::record::{Column, DailyRecord};

/// Fill missing daily-delta values (new deaths, new cases, new vaccinations) with zero.
/// Cumulative totals and rates stay absent: there a gap carries meaning.
pub fn clean_records(records: &[DailyRecord]) -> Vec<DailyRecord> {
    records
        .iter()
        .cloned()
        .map(|mut record| {
            for column in Column::DAILY_DELTAS {
                if record.value(column).is_none() {
                    record.measures.set(column, Some(0.0));
                }
            }
            record
        })
        .collect()
}
