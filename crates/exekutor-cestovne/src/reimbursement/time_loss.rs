use serde::{Deserialize, Serialize};

/// First year in which travel time is counted in half-hours instead of quarter-hours.
pub const HALF_HOUR_FROM_YEAR: u16 = 2026;

/// Granularity of the time-loss compensation, fixed by the tariff year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnitKind {
    QuarterHour,
    HalfHour,
}

impl TimeUnitKind {
    pub const fn for_year(year: u16) -> Self {
        if year >= HALF_HOUR_FROM_YEAR {
            Self::HalfHour
        } else {
            Self::QuarterHour
        }
    }

    pub const fn minutes(self) -> f64 {
        match self {
            Self::QuarterHour => 15.0,
            Self::HalfHour => 30.0,
        }
    }

    /// Compensation per started unit and worker (Kč).
    pub const fn unit_rate(self) -> u32 {
        match self {
            Self::QuarterHour => 50,
            Self::HalfHour => 150,
        }
    }

    pub const fn per_worker_cap(self) -> u32 {
        match self {
            Self::QuarterHour => 500,
            Self::HalfHour => 1000,
        }
    }

    /// Genitive plural used in the statement ("započato 11 čtvrthodin").
    pub const fn label(self) -> &'static str {
        match self {
            Self::QuarterHour => "čtvrthodin",
            Self::HalfHour => "půlhodin",
        }
    }

    pub const fn summary_label(self) -> &'static str {
        match self {
            Self::QuarterHour => "Čtvrthodiny",
            Self::HalfHour => "Půlhodiny",
        }
    }

    /// Number of units for a round-trip duration. Halves round away from zero.
    pub fn units_for(self, minutes: f64) -> u32 {
        let units = (minutes / self.minutes()).round();
        if units.is_finite() && units > 0.0 {
            units as u32
        } else {
            0
        }
    }
}

/// Number of executor staff present at the investigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WorkerCount {
    #[default]
    One,
    Two,
    Three,
}

impl WorkerCount {
    pub const fn all() -> [Self; 3] {
        [Self::One, Self::Two, Self::Three]
    }

    pub const fn get(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

impl TryFrom<u8> for WorkerCount {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(format!("worker count must be 1, 2 or 3 (got {other})")),
        }
    }
}

impl From<WorkerCount> for u8 {
    fn from(value: WorkerCount) -> Self {
        value.get() as u8
    }
}

impl std::str::FromStr for WorkerCount {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw
            .trim()
            .parse::<u8>()
            .map_err(|_| format!("worker count must be 1, 2 or 3 (got '{raw}')"))?;
        Self::try_from(value)
    }
}

/// Time-loss compensation derived from a unit count and the staff present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeLossCompensation {
    pub kind: TimeUnitKind,
    pub units: u32,
    pub workers: WorkerCount,
    pub per_worker: u32,
    pub total: u32,
    pub capped: bool,
}

impl TimeLossCompensation {
    pub fn compute(kind: TimeUnitKind, units: u32, workers: WorkerCount) -> Self {
        let uncapped = units.saturating_mul(kind.unit_rate());
        let per_worker = uncapped.min(kind.per_worker_cap());
        Self {
            kind,
            units,
            workers,
            per_worker,
            total: per_worker * workers.get(),
            capped: per_worker == kind.per_worker_cap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_hour_boundaries() {
        let kind = TimeUnitKind::for_year(2025);
        assert_eq!(kind, TimeUnitKind::QuarterHour);
        assert_eq!(kind.units_for(225.0), 15);
        assert_eq!(kind.units_for(15.0), 1);
        assert_eq!(kind.units_for(0.0), 0);
        assert_eq!(kind.units_for(160.0), 11);
    }

    #[test]
    fn half_unit_rounds_up() {
        assert_eq!(TimeUnitKind::QuarterHour.units_for(7.5), 1);
        assert_eq!(TimeUnitKind::QuarterHour.units_for(22.5), 2);
        assert_eq!(TimeUnitKind::HalfHour.units_for(45.0), 2);
        assert_eq!(TimeUnitKind::QuarterHour.units_for(7.4), 0);
    }

    #[test]
    fn granularity_switches_in_2026() {
        assert_eq!(TimeUnitKind::for_year(2026), TimeUnitKind::HalfHour);
        assert_eq!(TimeUnitKind::HalfHour.units_for(160.0), 5);
    }

    #[test]
    fn quarter_hours_cap_per_worker() {
        let single = TimeLossCompensation::compute(TimeUnitKind::QuarterHour, 11, WorkerCount::One);
        assert_eq!(single.per_worker, 500);
        assert_eq!(single.total, 500);
        assert!(single.capped);

        let pair = TimeLossCompensation::compute(TimeUnitKind::QuarterHour, 11, WorkerCount::Two);
        assert_eq!(pair.total, 1000);
    }

    #[test]
    fn half_hours_cap_per_worker() {
        let comp = TimeLossCompensation::compute(TimeUnitKind::HalfHour, 7, WorkerCount::Three);
        assert_eq!(comp.per_worker, 1000);
        assert_eq!(comp.total, 3000);
        assert!(comp.capped);
    }

    #[test]
    fn below_cap_is_not_flagged() {
        let comp = TimeLossCompensation::compute(TimeUnitKind::QuarterHour, 4, WorkerCount::Two);
        assert_eq!(comp.per_worker, 200);
        assert_eq!(comp.total, 400);
        assert!(!comp.capped);
    }

    #[test]
    fn worker_count_only_accepts_one_to_three() {
        assert_eq!("2".parse::<WorkerCount>(), Ok(WorkerCount::Two));
        assert!("4".parse::<WorkerCount>().is_err());
        assert!(serde_json::from_str::<WorkerCount>("0").is_err());
        assert_eq!(
            serde_json::to_string(&WorkerCount::Three).expect("serializes"),
            "3"
        );
    }
}
