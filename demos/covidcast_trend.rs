use anyhow::Result;
use epidata::{ColumnValues, EpiDataContext, EpiRange, GeoType, TimeType};

fn main() -> Result<()> {
    // Example program that calls the library API.
    // Configure authentication via env vars or an `.epidatarc` file.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let ctx = EpiDataContext::from_env()?;

    let call = ctx.pub_covidcast(
        "fb-survey",
        "smoothed_cli",
        GeoType::State,
        TimeType::Day,
        "pa",
        EpiRange::new(20210405, 20210430)?,
        None,
        None,
        None,
    )?;

    let table = ctx.table(&call)?;
    println!("{} rows", table.len());

    if let (Some(times), Some(values)) = (table.column("time_value"), table.column("value")) {
        if let (ColumnValues::Date(times), ColumnValues::Float(values)) =
            (&times.values, &values.values)
        {
            for (time, value) in times.iter().zip(values) {
                if let (Some(time), Some(value)) = (time, value) {
                    println!("{time}: {value:.2}");
                }
            }
        }
    }

    Ok(())
}
