use chrono::Datelike;
use serde::Serialize;

use super::calculator::ReimbursementResult;
use super::format::format_cz;
use super::time_loss::{TimeLossCompensation, WorkerCount};
use super::vehicle::FuelGrade;

/// Statutory limit on the distance and fuel compensation for one trip (Kč).
pub const TRIP_CAP: u32 = 1500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatementPolicy {
    /// Append a sentence disclosing the per-trip limit when the total exceeds it.
    pub disclose_trip_cap: bool,
}

/// PUNE sentence together with the time-loss amounts it quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub text: String,
    pub time_loss_total: u32,
    pub time_loss_per_worker: u32,
    pub time_loss_capped: bool,
}

struct WorkerPhrases {
    participated: &'static str,
    staff: &'static str,
    breakdown: &'static str,
}

const fn worker_phrases(workers: WorkerCount) -> WorkerPhrases {
    match workers {
        WorkerCount::One => WorkerPhrases {
            participated: "Šetření se účastnil",
            staff: "jeden pracovník soudního exekutora",
            breakdown: "1 pracovník",
        },
        WorkerCount::Two => WorkerPhrases {
            participated: "Šetření se účastnili",
            staff: "dva pracovníci soudního exekutora",
            breakdown: "2 pracovníci",
        },
        WorkerCount::Three => WorkerPhrases {
            participated: "Šetření se účastnili",
            staff: "tři pracovníci soudního exekutora",
            breakdown: "3 pracovníci",
        },
    }
}

/// Label used by the CLI and the API when offering worker counts.
pub const fn worker_label(workers: WorkerCount) -> &'static str {
    worker_phrases(workers).breakdown
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatementComposer {
    policy: StatementPolicy,
}

impl StatementComposer {
    pub fn new(policy: StatementPolicy) -> Self {
        Self { policy }
    }

    pub fn compose(&self, result: &ReimbursementResult) -> Statement {
        let time_loss = result.time_loss();
        let phrases = worker_phrases(result.workers);
        let km = format_cz(result.round_trip_km, 0);
        let consumption = format_cz(result.consumption, 1);
        let rate = format_cz(result.rate_per_km, 2);
        let fuel_price = format_cz(result.fuel_price, 2);
        let fuel = FuelGrade::Ba95.label();

        let mut text = String::new();
        text.push_str(&format!(
            "{} bylo provedeno místní šetření na adrese {}. ",
            opening(result),
            result.destination
        ));
        text.push_str(&format!(
            "Cesta ze sídla soudního exekutora a zpět činila {km} km. "
        ));
        text.push_str(&format!(
            "Při provedení výjezdu bylo využito osobní vozidlo {}. ",
            result.vehicle_model
        ));
        text.push_str(&format!(
            "Dle technického průkazu činí kombinovaná spotřeba {consumption} l/100 km. "
        ));
        text.push_str(&format!("Pohonnou hmotou vozidla je {fuel}. "));
        text.push_str(&format!(
            "S ohledem na výše uvedené má soudní exekutor nárok na základní náhradu ve výši \
             {} Kč ({km} km × {rate} Kč) a náhradu za spotřebované pohonné hmoty ve výši {} Kč \
             ({km} km × {consumption} l/100 km × {fuel_price} Kč). ",
            format_cz(result.base_amount, 2),
            format_cz(result.fuel_amount, 2),
        ));
        text.push_str(&format!(
            "Dle vyhlášky Ministerstva práce a sociálních věcí č. {} činí sazba základní náhrady \
             za 1 km jízdy {rate} Kč a výše průměrné ceny {} činí {fuel_price} Kč. ",
            result.regulation,
            FuelGrade::Ba95.genitive_label(),
        ));

        if self.policy.disclose_trip_cap && result.total_amount > TRIP_CAP {
            text.push_str(&format!(
                "Náhrada za jízdu a pohonné hmoty v celkové výši {} Kč převyšuje zákonný limit \
                 {} Kč na jednu cestu. ",
                format_cz(result.total_amount, 0),
                format_cz(TRIP_CAP, 0),
            ));
        }

        text.push_str(&format!(
            "Cesta trvala celkem {} hodin a {:02} minut, bylo tedy započato {} {}. ",
            result.hours,
            result.minutes,
            time_loss.units,
            time_loss.kind.label()
        ));
        text.push_str(&format!("{} {}. ", phrases.participated, phrases.staff));
        text.push_str(&format!(
            "Vzhledem k tomuto má soudní exekutor nárok na náhradu za ztrátu času, \
             která činí {} Kč ({}).",
            format_cz(time_loss.total, 0),
            time_loss_breakdown(&time_loss, phrases.breakdown)
        ));

        Statement {
            text,
            time_loss_total: time_loss.total,
            time_loss_per_worker: time_loss.per_worker,
            time_loss_capped: time_loss.capped,
        }
    }
}

fn opening(result: &ReimbursementResult) -> String {
    match result.investigation_date {
        Some(date) => format!("Dne {}. {}. {}", date.day(), date.month(), date.year()),
        None => format!("V roce {}", result.display_year),
    }
}

fn time_loss_breakdown(time_loss: &TimeLossCompensation, workers: &str) -> String {
    let kind = time_loss.kind;
    let mut breakdown = format!(
        "{workers} × {} {} × {} Kč",
        time_loss.units,
        kind.label(),
        kind.unit_rate()
    );
    if time_loss.capped {
        breakdown.push_str(&format!(
            ", omezeno na max. {} Kč/pracovník",
            format_cz(kind.per_worker_cap(), 0)
        ));
    }
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reimbursement::calculator::{ReimbursementCalculator, TripMeasurement};
    use crate::reimbursement::tariff::{resolve, Period};
    use crate::reimbursement::vehicle::VehicleTable;
    use chrono::NaiveDate;

    fn result_for(year: u16, one_way_km: f64, one_way_minutes: f64) -> ReimbursementResult {
        let fleet = VehicleTable::standard();
        let vehicle = fleet.get("6AB3517").expect("i30");
        let tariff = resolve(Period::Year(year)).expect("tariff");
        let measurement = TripMeasurement::new(one_way_km, one_way_minutes).expect("valid");
        ReimbursementCalculator::default()
            .calculate("Husova 12, 280 02 Kolín", measurement, vehicle, &tariff)
            .expect("amounts in range")
    }

    #[test]
    fn reference_sentence_for_single_worker() {
        let statement = StatementComposer::default().compose(&result_for(2024, 66.25, 80.0));

        let expected = "V roce 2024 bylo provedeno místní šetření na adrese Husova 12, 280 02 Kolín. \
Cesta ze sídla soudního exekutora a zpět činila 133 km. \
Při provedení výjezdu bylo využito osobní vozidlo Hyundai i30. \
Dle technického průkazu činí kombinovaná spotřeba 5,9 l/100 km. \
Pohonnou hmotou vozidla je Benzin 95. \
S ohledem na výše uvedené má soudní exekutor nárok na základní náhradu ve výši 742,00 Kč \
(133 km × 5,60 Kč) a náhradu za spotřebované pohonné hmoty ve výši 298,63 Kč \
(133 km × 5,9 l/100 km × 38,20 Kč). \
Dle vyhlášky Ministerstva práce a sociálních věcí č. 398/2023 Sb. činí sazba základní náhrady \
za 1 km jízdy 5,60 Kč a výše průměrné ceny Benzinu 95 činí 38,20 Kč. \
Cesta trvala celkem 2 hodin a 40 minut, bylo tedy započato 11 čtvrthodin. \
Šetření se účastnil jeden pracovník soudního exekutora. \
Vzhledem k tomuto má soudní exekutor nárok na náhradu za ztrátu času, která činí 500 Kč \
(1 pracovník × 11 čtvrthodin × 50 Kč, omezeno na max. 500 Kč/pracovník).";

        assert_eq!(statement.text, expected);
        assert_eq!(statement.time_loss_total, 500);
        assert!(statement.time_loss_capped);
    }

    #[test]
    fn worker_phrases_follow_czech_grammar() {
        let mut result = result_for(2024, 66.25, 80.0);

        result.set_workers(WorkerCount::Two);
        let two = StatementComposer::default().compose(&result);
        assert!(two
            .text
            .contains("Šetření se účastnili dva pracovníci soudního exekutora."));
        assert!(two.text.contains("(2 pracovníci × 11 čtvrthodin × 50 Kč"));
        assert!(two.text.contains("která činí 1 000 Kč"));
        assert_eq!(two.time_loss_total, 1000);

        result.set_workers(WorkerCount::Three);
        let three = StatementComposer::default().compose(&result);
        assert!(three
            .text
            .contains("Šetření se účastnili tři pracovníci soudního exekutora."));
        assert_eq!(three.time_loss_total, 1500);

        assert_eq!(worker_label(WorkerCount::One), "1 pracovník");
    }

    #[test]
    fn uncapped_breakdown_has_no_limit_clause() {
        let statement = StatementComposer::default().compose(&result_for(2023, 20.0, 30.0));
        assert!(statement
            .text
            .ends_with("která činí 200 Kč (1 pracovník × 4 čtvrthodin × 50 Kč)."));
        assert!(!statement.time_loss_capped);
    }

    #[test]
    fn half_hours_from_2026() {
        let statement = StatementComposer::default().compose(&result_for(2026, 120.0, 105.0));
        assert!(statement.text.contains("bylo tedy započato 7 půlhodin."));
        assert!(statement
            .text
            .contains("(1 pracovník × 7 půlhodin × 150 Kč, omezeno na max. 1 000 Kč/pracovník)"));
        assert_eq!(statement.time_loss_total, 1000);
    }

    #[test]
    fn investigation_date_replaces_year_opening() {
        let mut result = result_for(2024, 66.25, 80.0);
        result
            .set_investigation_date(NaiveDate::from_ymd_opt(2024, 3, 7))
            .expect("date in tariff year");
        let statement = StatementComposer::default().compose(&result);
        assert!(statement
            .text
            .starts_with("Dne 7. 3. 2024 bylo provedeno místní šetření"));
    }

    #[test]
    fn trip_cap_is_disclosed_only_when_enabled_and_exceeded() {
        let long_trip = result_for(2024, 150.0, 120.0);
        assert!(long_trip.total_amount > TRIP_CAP);

        let silent = StatementComposer::default().compose(&long_trip);
        assert!(!silent.text.contains("zákonný limit"));

        let disclosing = StatementComposer::new(StatementPolicy {
            disclose_trip_cap: true,
        });
        let disclosed = disclosing.compose(&long_trip);
        assert!(disclosed.text.contains("převyšuje zákonný limit 1 500 Kč na jednu cestu"));

        let short_trip = result_for(2024, 66.25, 80.0);
        assert!(!disclosing.compose(&short_trip).text.contains("zákonný limit"));
    }
}
