use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Upper bound accepted from a fleet file (l/100 km).
const MAX_CONSUMPTION: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelGrade {
    Ba95,
}

impl FuelGrade {
    /// Name used in the statement text.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ba95 => "Benzin 95",
        }
    }

    pub const fn genitive_label(self) -> &'static str {
        match self {
            Self::Ba95 => "Benzinu 95",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub plate: String,
    pub model: String,
    /// Combined consumption from the registration certificate (l/100 km).
    pub consumption: Decimal,
    pub fuel: FuelGrade,
}

#[derive(Debug, thiserror::Error)]
pub enum VehicleError {
    #[error("vehicle {0} is not part of the fleet")]
    UnknownVehicle(String),
    #[error("failed to read vehicle table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid vehicle table: {0}")]
    Csv(#[from] csv::Error),
    #[error("vehicle table row {row} is invalid: {reason}")]
    InvalidRow { row: usize, reason: String },
}

/// Fleet reference data keyed by registration plate.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleTable {
    vehicles: Vec<Vehicle>,
}

impl VehicleTable {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Self { vehicles }
    }

    /// The office fleet used when no vehicle file is configured.
    pub fn standard() -> Self {
        Self::new(vec![
            ba95("6AB3517", "Hyundai i30", Decimal::new(59, 1)),
            ba95("8AA1204", "Škoda Fabia", Decimal::new(45, 1)),
            ba95("6SR7185", "MG HS", Decimal::new(76, 1)),
        ])
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, VehicleError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Reads `plate,model,consumption` rows; a header row is expected.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, VehicleError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut vehicles = Vec::new();

        for (index, record) in csv_reader.deserialize::<VehicleRow>().enumerate() {
            let row = record?;
            let row_number = index + 1;
            if row.plate.is_empty() {
                return Err(VehicleError::InvalidRow {
                    row: row_number,
                    reason: "missing plate".to_string(),
                });
            }
            let consumption = Decimal::from_str(&row.consumption.replace(',', "."))
                .ok()
                .filter(|value| *value > Decimal::ZERO && *value <= MAX_CONSUMPTION)
                .ok_or_else(|| VehicleError::InvalidRow {
                    row: row_number,
                    reason: format!(
                        "consumption '{}' must be a number between 0 and {MAX_CONSUMPTION}",
                        row.consumption
                    ),
                })?;
            vehicles.push(ba95(&row.plate, &row.model, consumption));
        }

        Ok(Self::new(vehicles))
    }

    pub fn get(&self, plate: &str) -> Result<&Vehicle, VehicleError> {
        let wanted = normalize_plate(plate);
        self.vehicles
            .iter()
            .find(|vehicle| normalize_plate(&vehicle.plate) == wanted)
            .ok_or_else(|| VehicleError::UnknownVehicle(plate.trim().to_string()))
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }
}

impl Default for VehicleTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Deserialize)]
struct VehicleRow {
    plate: String,
    model: String,
    consumption: String,
}

fn ba95(plate: &str, model: &str, consumption: Decimal) -> Vehicle {
    Vehicle {
        plate: plate.to_string(),
        model: model.to_string(),
        consumption,
        fuel: FuelGrade::Ba95,
    }
}

fn normalize_plate(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn standard_fleet_lookup_ignores_spacing_and_case() {
        let table = VehicleTable::standard();
        let vehicle = table.get("6ab 3517").expect("i30 present");
        assert_eq!(vehicle.model, "Hyundai i30");
        assert_eq!(vehicle.consumption, Decimal::new(59, 1));
        assert_eq!(vehicle.fuel.label(), "Benzin 95");
        assert_eq!(table.vehicles().len(), 3);
    }

    #[test]
    fn unknown_plate_is_reported() {
        let table = VehicleTable::standard();
        match table.get("1A23456") {
            Err(VehicleError::UnknownVehicle(plate)) => assert_eq!(plate, "1A23456"),
            other => panic!("expected unknown vehicle, got {other:?}"),
        }
    }

    #[test]
    fn table_loads_from_csv() {
        let csv = "plate,model,consumption\n1AB0001, Octavia ,6.1\n2AB0002,Yaris,4.2\n";
        let table = VehicleTable::from_reader(Cursor::new(csv)).expect("table loads");
        assert_eq!(table.vehicles().len(), 2);
        assert_eq!(table.get("1AB0001").expect("octavia").model, "Octavia");
    }

    #[test]
    fn non_positive_consumption_is_rejected() {
        let csv = "plate,model,consumption\n1AB0001,Octavia,0\n";
        match VehicleTable::from_reader(Cursor::new(csv)) {
            Err(VehicleError::InvalidRow { row, .. }) => assert_eq!(row, 1),
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn implausible_consumption_is_rejected() {
        for value in ["1e30", "\"5,9 l\"", "120"] {
            let csv = format!("plate,model,consumption\n1AB0001,Octavia,{value}\n");
            assert!(
                matches!(
                    VehicleTable::from_reader(Cursor::new(csv)),
                    Err(VehicleError::InvalidRow { .. })
                ),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn decimal_comma_consumption_is_accepted() {
        let csv = "plate,model,consumption\n1AB0001,Octavia,\"6,1\"\n";
        let table = VehicleTable::from_reader(Cursor::new(csv)).expect("table loads");
        assert_eq!(table.vehicles()[0].consumption, Decimal::new(61, 1));
    }
}
