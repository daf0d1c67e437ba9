//! Tariff resolution, reimbursement calculation and PUNE statement composition.

pub mod calculator;
pub mod format;
pub mod router;
pub mod service;
pub mod statement;
pub mod tariff;
pub mod time_loss;
pub mod vehicle;

#[cfg(test)]
mod tests;

pub use calculator::{
    CalculationPolicy, FuelLitersRounding, InvestigationDateError, MeasurementError,
    ReimbursementCalculator, ReimbursementResult, TripMeasurement, MAX_ONE_WAY_KM,
    MAX_ONE_WAY_MINUTES,
};
pub use format::format_cz;
pub use router::{reimbursement_router, tariff_views, TariffView};
pub use service::{
    CalculationRequest, ReimbursementError, ReimbursementService, DEFAULT_OFFICE_ADDRESS,
};
pub use statement::{worker_label, Statement, StatementComposer, StatementPolicy, TRIP_CAP};
pub use tariff::{resolve, supported_periods, Half, Period, TariffError, TariffPeriod};
pub use time_loss::{TimeLossCompensation, TimeUnitKind, WorkerCount};
pub use vehicle::{FuelGrade, Vehicle, VehicleError, VehicleTable};
