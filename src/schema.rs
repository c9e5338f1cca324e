//! Input schema: the 16 ride attributes the cancellation model was trained on,
//! their category vocabularies and numeric ranges, and the builder that turns
//! raw form values into a [`RideRecord`].

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SchemaError {
    #[error("unknown {field} '{value}'")]
    UnknownCategory { field: &'static str, value: String },
    #[error("{field} is not a number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

macro_rules! categorical {
    ($(#[$meta:meta])* $name:ident, $field:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            /// Every label, in the order the form lists them.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = SchemaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    _ => Err(SchemaError::UnknownCategory { field: $field, value: s.to_string() }),
                }
            }
        }
    };
}

categorical!(VehicleType, "vehicle type", {
    Bike => "Bike",
    GoMini => "Go Mini",
    EBike => "eBike",
    Auto => "Auto",
    PremierSedan => "Premier Sedan",
    UberXl => "Uber XL",
    GoSedan => "Go Sedan",
});

categorical!(CustomerPatience, "customer patience", {
    NewCustomer => "new_customer",
    NoCancelHistory => "no_cancel_history",
    ExtremelyPatient => "extremely patient",
    VeryPatient => "very patient",
    VeryImpatient => "very_impatient",
    Patient => "patient",
});

categorical!(
    /// Pickup and drop zones share one vocabulary.
    Zone, "zone", {
    Gurgaon => "Gurgaon",
    EastDelhi => "East Delhi",
    SouthDelhi => "South Delhi",
    CentralDelhi => "Central Delhi",
    WestDelhi => "West Delhi",
    NorthDelhi => "North Delhi",
    OuterNcr => "Outer NCR",
    Noida => "Noida",
    OtherDelhi => "Other (Delhi)",
    Ghaziabad => "Ghaziabad",
    AirportArea => "Airport Area",
});

categorical!(RatingHistory, "rating history", {
    HistoricallyGood => "Historically Good",
    HistoricallyPoorAvg => "Historically Poor/Avg",
    NoPriorRating => "No Prior Rating",
});

categorical!(Weekday, "day", {
    Monday => "Monday",
    Tuesday => "Tuesday",
    Wednesday => "Wednesday",
    Thursday => "Thursday",
    Friday => "Friday",
    Saturday => "Saturday",
    Sunday => "Sunday",
});

categorical!(WeatherCondition, "weather condition", {
    Clear => "Clear",
    MainlyClearCloudy => "Mainly Clear/Cloudy",
    Drizzle => "Drizzle",
    Rain => "Rain",
});

/// Column names in training-time order.
pub const FIELD_NAMES: [&str; 16] = [
    "vehicle_arrival_time",
    "distance",
    "ride_cost",
    "temperature",
    "humidity",
    "precipitation_mm",
    "vehicle_type",
    "customer_patience",
    "pickup_zone",
    "drop_zone",
    "historical_customer_rating_binned",
    "hour",
    "day",
    "month",
    "day_of_month",
    "weather_condition",
];

/// Inclusive bounds for the clamped integer fields.
pub mod bounds {
    pub const ARRIVAL_TIME: (u8, u8) = (0, 60);
    pub const DISTANCE: (u8, u8) = (0, 50);
    pub const RIDE_COST: (u16, u16) = (0, 2000);
    pub const TEMPERATURE: (u8, u8) = (0, 50);
    pub const HOUR: (u8, u8) = (0, 23);
    pub const MONTH: (u8, u8) = (1, 12);
    pub const DAY_OF_MONTH: (u8, u8) = (1, 31);
}

/// One fully-populated prediction request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideRecord {
    pub vehicle_arrival_time: u8,
    pub distance: u8,
    pub ride_cost: u16,
    pub temperature: u8,
    pub humidity: i32,
    pub precipitation_mm: f64,
    pub vehicle_type: VehicleType,
    pub customer_patience: CustomerPatience,
    pub pickup_zone: Zone,
    pub drop_zone: Zone,
    pub historical_customer_rating_binned: RatingHistory,
    pub hour: u8,
    pub day: Weekday,
    pub month: u8,
    pub day_of_month: u8,
    pub weather_condition: WeatherCondition,
}

/// A single column of a record, as the model sidecar sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnValue {
    Number(f64),
    Category(&'static str),
}

impl RideRecord {
    pub fn column(&self, name: &str) -> Option<ColumnValue> {
        use ColumnValue::{Category, Number};
        let v = match name {
            "vehicle_arrival_time" => Number(self.vehicle_arrival_time.into()),
            "distance" => Number(self.distance.into()),
            "ride_cost" => Number(self.ride_cost.into()),
            "temperature" => Number(self.temperature.into()),
            "humidity" => Number(self.humidity.into()),
            "precipitation_mm" => Number(self.precipitation_mm),
            "vehicle_type" => Category(self.vehicle_type.as_str()),
            "customer_patience" => Category(self.customer_patience.as_str()),
            "pickup_zone" => Category(self.pickup_zone.as_str()),
            "drop_zone" => Category(self.drop_zone.as_str()),
            "historical_customer_rating_binned" => {
                Category(self.historical_customer_rating_binned.as_str())
            }
            "hour" => Number(self.hour.into()),
            "day" => Category(self.day.as_str()),
            "month" => Number(self.month.into()),
            "day_of_month" => Number(self.day_of_month.into()),
            "weather_condition" => Category(self.weather_condition.as_str()),
            _ => return None,
        };
        Some(v)
    }
}

/// A numeric form value. Browsers post text; JSON clients may post numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    fn parse(&self, field: &'static str) -> Result<f64, SchemaError> {
        let invalid = |value: String| SchemaError::InvalidNumber { field, value };
        let v = match self {
            NumericInput::Number(n) => *n,
            NumericInput::Text(s) => s.trim().parse::<f64>().map_err(|_| invalid(s.clone()))?,
        };
        if !v.is_finite() {
            return Err(invalid(v.to_string()));
        }
        Ok(v)
    }

    /// Text shown back in the form input.
    pub fn display(&self) -> String {
        match self {
            NumericInput::Number(n) => n.to_string(),
            NumericInput::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for NumericInput {
    fn from(v: f64) -> Self {
        NumericInput::Number(v)
    }
}

/// Raw values as submitted by the form. Missing fields take the form defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RideForm {
    pub vehicle_arrival_time: NumericInput,
    pub distance: NumericInput,
    pub ride_cost: NumericInput,
    pub temperature: NumericInput,
    pub humidity: NumericInput,
    pub precipitation_mm: NumericInput,
    pub vehicle_type: String,
    pub customer_patience: String,
    pub pickup_zone: String,
    pub drop_zone: String,
    pub historical_customer_rating_binned: String,
    pub hour: NumericInput,
    pub day: String,
    pub month: NumericInput,
    pub day_of_month: NumericInput,
    pub weather_condition: String,
}

impl Default for RideForm {
    fn default() -> Self {
        Self {
            vehicle_arrival_time: 5.0.into(),
            distance: 10.0.into(),
            ride_cost: 300.0.into(),
            temperature: 30.0.into(),
            humidity: 50.0.into(),
            precipitation_mm: 0.0.into(),
            vehicle_type: VehicleType::Auto.to_string(),
            customer_patience: CustomerPatience::Patient.to_string(),
            pickup_zone: Zone::Gurgaon.to_string(),
            drop_zone: Zone::SouthDelhi.to_string(),
            historical_customer_rating_binned: RatingHistory::NoPriorRating.to_string(),
            hour: 18.0.into(),
            day: Weekday::Monday.to_string(),
            month: 6.0.into(),
            day_of_month: 15.0.into(),
            weather_condition: WeatherCondition::Clear.to_string(),
        }
    }
}

fn clamp_u8(v: f64, (lo, hi): (u8, u8)) -> u8 {
    v.round().clamp(lo.into(), hi.into()) as u8
}

impl RideForm {
    /// Builds the typed record. Integer fields are rounded and clamped into
    /// their domain; unknown categories and unparseable numbers are errors.
    pub fn into_record(&self) -> Result<RideRecord, SchemaError> {
        let (cost_lo, cost_hi) = bounds::RIDE_COST;
        Ok(RideRecord {
            vehicle_arrival_time: clamp_u8(
                self.vehicle_arrival_time.parse("vehicle_arrival_time")?,
                bounds::ARRIVAL_TIME,
            ),
            distance: clamp_u8(self.distance.parse("distance")?, bounds::DISTANCE),
            ride_cost: self
                .ride_cost
                .parse("ride_cost")?
                .round()
                .clamp(cost_lo.into(), cost_hi.into()) as u16,
            temperature: clamp_u8(self.temperature.parse("temperature")?, bounds::TEMPERATURE),
            // saturating cast keeps humidity unconstrained within i32
            humidity: self.humidity.parse("humidity")?.round() as i32,
            precipitation_mm: self.precipitation_mm.parse("precipitation_mm")?,
            vehicle_type: self.vehicle_type.parse()?,
            customer_patience: self.customer_patience.parse()?,
            pickup_zone: self.pickup_zone.parse()?,
            drop_zone: self.drop_zone.parse()?,
            historical_customer_rating_binned: self.historical_customer_rating_binned.parse()?,
            hour: clamp_u8(self.hour.parse("hour")?, bounds::HOUR),
            day: self.day.parse()?,
            month: clamp_u8(self.month.parse("month")?, bounds::MONTH),
            day_of_month: clamp_u8(self.day_of_month.parse("day_of_month")?, bounds::DAY_OF_MONTH),
            weather_condition: self.weather_condition.parse()?,
        })
    }
}
