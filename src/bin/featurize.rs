use std::fs::File;
use std::path::PathBuf;

use velofe::{
    init_logging, load_observations_from_path, log_app_start, log_run_summary,
    logging_config_from_env, run_pipeline, write_feature_records, CurfewSchedule, FrenchCalendar,
    HolidaySets, WeatherConfig, Zone,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_cfg = logging_config_from_env();
    init_logging(&logging_cfg)?;
    log_app_start(&logging_cfg);

    let mut args = std::env::args().skip(1);
    let (input, output) = match (args.next(), args.next()) {
        (Some(input), Some(output)) => (PathBuf::from(input), PathBuf::from(output)),
        _ => {
            eprintln!("usage: featurize <input.csv> <output.csv>");
            eprintln!("  VELOFE_YEARS        comma-separated years (default 2020,2021)");
            eprintln!("  VELOFE_LOG_LEVEL    tracing filter (default info)");
            eprintln!("  VELOFE_LOG_FORMAT   json | pretty (default pretty)");
            std::process::exit(2);
        }
    };

    let years = parse_years()?;
    let holidays = HolidaySets::build(&FrenchCalendar, &years, Zone::C)?;
    let schedule = CurfewSchedule::french_2020_2021();
    let weather_cfg = WeatherConfig::default();

    let rows = load_observations_from_path(&input)?;
    let (schema, records, report) = run_pipeline(rows, &holidays, &schedule, &weather_cfg)?;

    write_feature_records(File::create(&output)?, &schema, &records)?;

    let schema_path = output.with_extension("schema.json");
    serde_json::to_writer_pretty(File::create(&schema_path)?, &schema)?;

    log_run_summary(&report);
    println!(
        "Featurize done | input={} output={} rows_in={} rows_out={} dead_periods={} schema={}",
        input.display(),
        output.display(),
        report.input_rows,
        report.output_rows,
        report.dead_period_count,
        schema_path.display()
    );

    Ok(())
}

fn parse_years() -> Result<Vec<i32>, Box<dyn std::error::Error>> {
    match std::env::var("VELOFE_YEARS") {
        Ok(raw) => {
            let mut years = Vec::new();
            for part in raw.split(',') {
                let trimmed = part.trim();
                if trimmed.is_empty() {
                    continue;
                }
                years.push(
                    trimmed
                        .parse::<i32>()
                        .map_err(|_| format!("VELOFE_YEARS entry '{trimmed}' is not a year"))?,
                );
            }
            Ok(years)
        }
        Err(_) => Ok(vec![2020, 2021]),
    }
}
