use crate::infra::{build_service, parse_date, parse_period, parse_workers};
use chrono::NaiveDate;
use clap::Args;
use exekutor_cestovne::batch::{self, BatchInput};
use exekutor_cestovne::config::AppConfig;
use exekutor_cestovne::error::AppError;
use exekutor_cestovne::reimbursement::{
    format_cz, tariff_views, CalculationRequest, Period, ReimbursementResult, TripMeasurement,
    VehicleTable, WorkerCount, TRIP_CAP,
};
use exekutor_cestovne::telemetry;
use std::fs::File;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct CalculateArgs {
    /// Destination address of the field investigation
    #[arg(long)]
    pub(crate) address: String,
    /// Licence plate of the vehicle used
    #[arg(long)]
    pub(crate) vehicle: String,
    /// Tariff period, e.g. 2024 or 2022b
    #[arg(long, value_parser = parse_period)]
    pub(crate) period: Period,
    /// Number of staff present (1-3)
    #[arg(long, default_value = "1", value_parser = parse_workers)]
    pub(crate) workers: WorkerCount,
    /// Investigation date (YYYY-MM-DD or D.M.YYYY)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Known one-way distance in km; skips the routing lookup
    #[arg(long, requires = "one_way_minutes")]
    pub(crate) one_way_km: Option<f64>,
    /// Known one-way driving time in minutes
    #[arg(long, requires = "one_way_km")]
    pub(crate) one_way_minutes: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV file with destination addresses in the first column
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Where to write the table with the appended result columns
    #[arg(long)]
    pub(crate) output: PathBuf,
    /// Licence plate of the vehicle used for every trip
    #[arg(long)]
    pub(crate) vehicle: String,
    /// Tariff period applied to every row
    #[arg(long, value_parser = parse_period)]
    pub(crate) period: Period,
}

fn load_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

pub(crate) fn run_calculate(args: CalculateArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let service = build_service(&config)?;

    let measurement = match (args.one_way_km, args.one_way_minutes) {
        (Some(km), Some(minutes)) => Some(TripMeasurement::new(km, minutes).map_err(
            |err| AppError::Reimbursement(err.into()),
        )?),
        _ => None,
    };

    let result = service.calculate(CalculationRequest {
        destination: args.address,
        vehicle: args.vehicle,
        period: args.period,
        workers: args.workers,
        investigation_date: args.date,
        measurement,
    })?;
    let statement = service.compose(&result);

    for line in summary_lines(&result) {
        println!("{line}");
    }
    println!("\nText do PUNE:\n{}", statement.text);
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let service = build_service(&config)?;

    let input = BatchInput::from_path(&args.input)?;
    let report = batch::process(&service, &input, &args.vehicle, args.period)?;
    report.write_csv(File::create(&args.output)?)?;

    let summary = report.summary();
    println!(
        "Zpracováno {} řádků: {} spočteno, {} chyb, {} prázdných.",
        summary.rows, summary.calculated, summary.failed, summary.skipped
    );
    println!(
        "Celkem náhrada km + PHM: {} Kč",
        format_cz(summary.total_amount, 0)
    );
    println!("Výsledek uložen do {}", args.output.display());
    Ok(())
}

pub(crate) fn run_tariffs() {
    println!("Období       Sazba/km   BA95/l     Vyhláška");
    for view in tariff_views() {
        println!(
            "{:<12} {:>8} Kč {:>7} Kč  {} ({})",
            view.key,
            format_cz(view.rate_per_km, 2),
            format_cz(view.fuel_price, 2),
            view.regulation,
            view.label
        );
    }
}

pub(crate) fn run_vehicles() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let table = match &config.calculation.vehicles_csv {
        Some(path) => VehicleTable::from_path(path)?,
        None => VehicleTable::standard(),
    };

    for vehicle in table.vehicles() {
        println!(
            "{:<9} {:<16} {} l/100 km  {}",
            vehicle.plate,
            vehicle.model,
            format_cz(vehicle.consumption, 1),
            vehicle.fuel.label()
        );
    }
    Ok(())
}

/// Human-readable breakdown printed above the statement.
pub(crate) fn summary_lines(result: &ReimbursementResult) -> Vec<String> {
    let time_loss = result.time_loss();
    let kind = time_loss.kind;
    let mut lines = vec![
        format!("Cíl: {}", result.destination),
        format!(
            "Vozidlo: {} ({}), období {}",
            result.vehicle_model, result.vehicle_plate, result.period
        ),
        format!(
            "Vzdálenost tam a zpět: {} km",
            format_cz(result.round_trip_km, 1)
        ),
        format!("Doba jízdy tam a zpět: {}:{:02}", result.hours, result.minutes),
        format!(
            "Náhrada km + PHM: {} Kč",
            format_cz(result.total_amount, 0)
        ),
        format!(
            "  základní náhrada {} Kč ({} Kč/km)",
            format_cz(result.base_amount, 2),
            format_cz(result.rate_per_km, 2)
        ),
        format!(
            "  pohonné hmoty {} Kč ({} l × {} Kč/l)",
            format_cz(result.fuel_amount, 2),
            format_cz(result.fuel_liters, 2),
            format_cz(result.fuel_price, 2)
        ),
        format!(
            "{}: {} × {} Kč, max. {} Kč/pracovník, celkem {} Kč",
            kind.summary_label(),
            time_loss.units,
            kind.unit_rate(),
            format_cz(kind.per_worker_cap(), 0),
            format_cz(time_loss.total, 0)
        ),
    ];

    if result.total_amount > TRIP_CAP {
        lines.push(format!(
            "Upozornění: náhrada {} Kč překračuje limit {} Kč na jednu cestu.",
            format_cz(result.total_amount, 0),
            format_cz(TRIP_CAP, 0)
        ));
    }
    lines
}
