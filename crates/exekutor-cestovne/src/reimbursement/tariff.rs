use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Sub-period of a calendar year in which the statutory rates changed mid-year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Half {
    A,
    B,
}

impl Half {
    pub const fn suffix(self) -> char {
        match self {
            Self::A => 'a',
            Self::B => 'b',
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "1. období",
            Self::B => "2. období",
        }
    }
}

/// Key selecting a rate regime: a whole calendar year or one half of a split year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Year(u16),
    Split { year: u16, half: Half },
}

impl Period {
    pub const fn year(self) -> u16 {
        match self {
            Self::Year(year) | Self::Split { year, .. } => year,
        }
    }

    /// Textual key used by the CLI, the HTTP API and the batch command (`2024`, `2021b`).
    pub fn key(self) -> String {
        match self {
            Self::Year(year) => year.to_string(),
            Self::Split { year, half } => format!("{year}{}", half.suffix()),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(year) => write!(f, "{year}"),
            Self::Split { year, half } => write!(f, "{year} ({})", half.label()),
        }
    }
}

impl FromStr for Period {
    type Err = TariffError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim().to_ascii_lowercase();
        let unknown = || TariffError::UnparsablePeriod(raw.trim().to_string());

        let (digits, half) = match trimmed.strip_suffix('a') {
            Some(rest) => (rest, Some(Half::A)),
            None => match trimmed.strip_suffix('b') {
                Some(rest) => (rest, Some(Half::B)),
                None => (trimmed.as_str(), None),
            },
        };

        let year = digits.parse::<u16>().map_err(|_| unknown())?;
        Ok(match half {
            Some(half) => Self::Split { year, half },
            None => Self::Year(year),
        })
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key())
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPeriod {
            Number(u16),
            Text(String),
        }

        match RawPeriod::deserialize(deserializer)? {
            RawPeriod::Number(year) => Ok(Self::Year(year)),
            RawPeriod::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Statutory constants in force for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TariffPeriod {
    pub period: Period,
    /// Basic compensation per kilometre (Kč/km).
    pub rate_per_km: Decimal,
    /// Average BA95 price (Kč/l).
    pub fuel_price: Decimal,
    pub regulation: &'static str,
    pub display_year: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TariffError {
    #[error("no tariff is defined for period {0}")]
    UnknownPeriod(String),
    #[error("'{0}' is not a valid period key (expected e.g. 2024 or 2021a)")]
    UnparsablePeriod(String),
}

struct TariffRow {
    period: Period,
    rate_per_km: Decimal,
    fuel_price: Decimal,
    regulation: &'static str,
}

/// Amount given in hellers, e.g. `380` for 3,80 Kč.
const fn kc(hellers: u32) -> Decimal {
    Decimal::from_parts(hellers, 0, 0, false, 2)
}

const fn annual(year: u16, rate: u32, fuel: u32, regulation: &'static str) -> TariffRow {
    TariffRow {
        period: Period::Year(year),
        rate_per_km: kc(rate),
        fuel_price: kc(fuel),
        regulation,
    }
}

const fn split(year: u16, half: Half, rate: u32, fuel: u32, regulation: &'static str) -> TariffRow {
    TariffRow {
        period: Period::Split { year, half },
        rate_per_km: kc(rate),
        fuel_price: kc(fuel),
        regulation,
    }
}

// MPSV decrees on travel compensation, BA95 average price.
const TARIFF_TABLE: &[TariffRow] = &[
    annual(2016, 380, 2950, "385/2015 Sb."),
    annual(2017, 390, 2950, "440/2016 Sb."),
    annual(2018, 400, 3050, "463/2017 Sb."),
    annual(2019, 410, 3310, "333/2018 Sb."),
    annual(2020, 420, 3200, "358/2019 Sb."),
    annual(2021, 440, 2780, "589/2020 Sb."),
    split(2021, Half::A, 440, 2780, "589/2020 Sb."),
    split(2021, Half::B, 440, 2780, "589/2020 Sb."),
    annual(2022, 470, 3710, "511/2021 Sb."),
    split(2022, Half::A, 470, 3710, "511/2021 Sb."),
    split(2022, Half::B, 470, 4450, "116/2022 Sb."),
    annual(2023, 520, 4120, "467/2022 Sb."),
    annual(2024, 560, 3820, "398/2023 Sb."),
    annual(2025, 580, 3580, "475/2024 Sb."),
    annual(2026, 590, 3470, "573/2025 Sb."),
];

pub const FIRST_SUPPORTED_YEAR: u16 = 2016;
pub const LAST_SUPPORTED_YEAR: u16 = 2026;

/// Resolve the statutory constants for `period`.
pub fn resolve(period: Period) -> Result<TariffPeriod, TariffError> {
    TARIFF_TABLE
        .iter()
        .find(|row| row.period == period)
        .map(|row| TariffPeriod {
            period,
            rate_per_km: row.rate_per_km,
            fuel_price: row.fuel_price,
            regulation: row.regulation,
            display_year: period.year(),
        })
        .ok_or_else(|| TariffError::UnknownPeriod(period.key()))
}

/// Every selectable period, newest first. Split years list their halves in place of the
/// annual key.
pub fn supported_periods() -> Vec<Period> {
    let mut periods = Vec::new();
    for year in (FIRST_SUPPORTED_YEAR..=LAST_SUPPORTED_YEAR).rev() {
        let halves: Vec<Period> = TARIFF_TABLE
            .iter()
            .filter_map(|row| match row.period {
                Period::Split { year: y, half } if y == year => {
                    Some(Period::Split { year, half })
                }
                _ => None,
            })
            .collect();

        if halves.is_empty() {
            periods.push(Period::Year(year));
        } else {
            periods.extend(halves.into_iter().rev());
        }
    }
    periods
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_year_resolves() {
        let expected = [
            (2016, 380, 2950, "385/2015 Sb."),
            (2017, 390, 2950, "440/2016 Sb."),
            (2018, 400, 3050, "463/2017 Sb."),
            (2019, 410, 3310, "333/2018 Sb."),
            (2020, 420, 3200, "358/2019 Sb."),
            (2021, 440, 2780, "589/2020 Sb."),
            (2022, 470, 3710, "511/2021 Sb."),
            (2023, 520, 4120, "467/2022 Sb."),
            (2024, 560, 3820, "398/2023 Sb."),
            (2025, 580, 3580, "475/2024 Sb."),
            (2026, 590, 3470, "573/2025 Sb."),
        ];

        for (year, rate, fuel, regulation) in expected {
            let tariff = resolve(Period::Year(year)).expect("year is supported");
            assert_eq!(tariff.rate_per_km, Decimal::new(rate, 2), "rate for {year}");
            assert_eq!(tariff.fuel_price, Decimal::new(fuel, 2), "fuel price for {year}");
            assert_eq!(tariff.regulation, regulation);
            assert_eq!(tariff.display_year, year);
        }
    }

    #[test]
    fn split_years_share_display_year() {
        let first = resolve(Period::Split {
            year: 2022,
            half: Half::A,
        })
        .expect("2022a");
        let second = resolve(Period::Split {
            year: 2022,
            half: Half::B,
        })
        .expect("2022b");

        assert_eq!(first.display_year, 2022);
        assert_eq!(second.display_year, 2022);
        assert_eq!(first.fuel_price, Decimal::new(3710, 2));
        assert_eq!(second.fuel_price, Decimal::new(4450, 2));
        assert_eq!(second.regulation, "116/2022 Sb.");

        let first_2021 = resolve("2021a".parse().expect("key")).expect("2021a");
        let second_2021 = resolve("2021B".parse().expect("key")).expect("2021b");
        assert_eq!(first_2021.display_year, second_2021.display_year);
    }

    #[test]
    fn unknown_periods_fail_explicitly() {
        assert_eq!(
            resolve(Period::Year(2015)),
            Err(TariffError::UnknownPeriod("2015".to_string()))
        );
        assert_eq!(
            resolve(Period::Split {
                year: 2024,
                half: Half::A
            }),
            Err(TariffError::UnknownPeriod("2024a".to_string()))
        );
        assert!(matches!(
            "twenty".parse::<Period>(),
            Err(TariffError::UnparsablePeriod(_))
        ));
    }

    #[test]
    fn supported_periods_are_newest_first() {
        let keys: Vec<String> = supported_periods().into_iter().map(Period::key).collect();
        assert_eq!(keys.first().map(String::as_str), Some("2026"));
        assert_eq!(keys.last().map(String::as_str), Some("2016"));
        assert!(keys.contains(&"2022b".to_string()));
        assert!(!keys.contains(&"2022".to_string()));
        assert_eq!(keys.len(), 13);
    }

    #[test]
    fn period_serializes_as_key() {
        let json = serde_json::to_string(&Period::Split {
            year: 2021,
            half: Half::B,
        })
        .expect("serializes");
        assert_eq!(json, "\"2021b\"");

        let parsed: Period = serde_json::from_str("2024").expect("numeric year");
        assert_eq!(parsed, Period::Year(2024));
        let parsed: Period = serde_json::from_str("\"2022a\"").expect("split key");
        assert_eq!(
            parsed,
            Period::Split {
                year: 2022,
                half: Half::A
            }
        );
    }
}
