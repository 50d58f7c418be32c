// Column classification - maps raw sensor column names to semantic tags
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotType {
    Agrivoltaic,
    Control,
    GroundPv,
    WeatherStation,
    Other,
}

impl PlotType {
    pub fn label(&self) -> &'static str {
        match self {
            PlotType::Agrivoltaic => "Agrivoltaic",
            PlotType::Control => "Control",
            PlotType::GroundPv => "Ground PV",
            PlotType::WeatherStation => "Weather Station",
            PlotType::Other => "Other",
        }
    }
}

impl fmt::Display for PlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PlotType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "agrivoltaic" => Ok(PlotType::Agrivoltaic),
            "control" => Ok(PlotType::Control),
            "ground_pv" => Ok(PlotType::GroundPv),
            "weather_station" => Ok(PlotType::WeatherStation),
            "other" => Ok(PlotType::Other),
            _ => Err(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementType {
    Temperature,
    Humidity,
    Irradiation,
    Rainfall,
    Other,
}

impl MeasurementType {
    pub fn label(&self) -> &'static str {
        match self {
            MeasurementType::Temperature => "Temperature",
            MeasurementType::Humidity => "Humidity",
            MeasurementType::Irradiation => "Irradiation",
            MeasurementType::Rainfall => "Rainfall",
            MeasurementType::Other => "Other",
        }
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MeasurementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature" => Ok(MeasurementType::Temperature),
            "humidity" => Ok(MeasurementType::Humidity),
            "irradiation" => Ok(MeasurementType::Irradiation),
            "rainfall" => Ok(MeasurementType::Rainfall),
            "other" => Ok(MeasurementType::Other),
            _ => Err(s.to_string()),
        }
    }
}

/// Plot-type rules, evaluated top to bottom. The agrivoltaic codes come
/// before the control codes, so a name carrying both tags is Agrivoltaic,
/// and the bare "WS" token is only consulted once every plot code missed.
const PLOT_RULES: &[(&str, PlotType)] = &[
    ("AG-PV", PlotType::Agrivoltaic),
    ("AG-TI", PlotType::Agrivoltaic),
    ("AG-SS", PlotType::Agrivoltaic),
    ("AO-TI", PlotType::Control),
    ("AO-SS", PlotType::Control),
    ("PO-PV", PlotType::GroundPv),
    ("WS", PlotType::WeatherStation),
];

/// Measurement-type rules. "Irr" must precede "/T" and "/P" so that
/// `PO-PV/Irr (W/m2)` is irradiation rather than rainfall.
const MEASUREMENT_RULES: &[(&str, MeasurementType)] = &[
    ("Irr", MeasurementType::Irradiation),
    ("/T", MeasurementType::Temperature),
    ("/RH", MeasurementType::Humidity),
    ("/P", MeasurementType::Rainfall),
];

pub fn classify_plot(column: &str) -> PlotType {
    PLOT_RULES
        .iter()
        .find(|(token, _)| column.contains(token))
        .map(|(_, plot)| *plot)
        .unwrap_or(PlotType::Other)
}

pub fn classify_measurement(column: &str) -> MeasurementType {
    MEASUREMENT_RULES
        .iter()
        .find(|(token, _)| column.contains(token))
        .map(|(_, measurement)| *measurement)
        .unwrap_or(MeasurementType::Other)
}

pub fn classify(column: &str) -> (PlotType, MeasurementType) {
    (classify_plot(column), classify_measurement(column))
}

/// Sensor station codes embedded in column names
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StationCode {
    AgPv,
    AoTi,
    AoSs,
    PoPv,
    AgSs,
}

impl StationCode {
    const ALL: [StationCode; 5] = [
        StationCode::AgPv,
        StationCode::AoTi,
        StationCode::AoSs,
        StationCode::PoPv,
        StationCode::AgSs,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            StationCode::AgPv => "AG-PV",
            StationCode::AoTi => "AO-TI",
            StationCode::AoSs => "AO-SS",
            StationCode::PoPv => "PO-PV",
            StationCode::AgSs => "AG-SS",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StationCode::PoPv => "Ground-Mounted PV Systems",
            StationCode::AgPv => "Agrivoltaic Photovoltaic Panel Sensors",
            StationCode::AoTi => "Control Plot - Tin Roof",
            StationCode::AoSs => "Control Plot - Soil Sensors",
            StationCode::AgSs => "Agrivoltaic Soil Sensors",
        }
    }
}

/// Leftmost station code occurring in the column name
pub fn station_code(column: &str) -> Option<StationCode> {
    StationCode::ALL
        .iter()
        .filter_map(|code| column.find(code.code()).map(|pos| (pos, *code)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, code)| code)
}
