//! Vehicle property and area identifiers

use std::fmt;

pub const HVAC_FAN_SPEED: i32 = 0x1540_0500;
pub const HVAC_FAN_DIRECTION: i32 = 0x1540_0501;
pub const HVAC_TEMPERATURE_SET: i32 = 0x1560_0503;
pub const HVAC_AC_ON: i32 = 0x1520_0505;
pub const HVAC_RECIRC_ON: i32 = 0x1520_0508;
pub const HVAC_AUTO_ON: i32 = 0x1520_050A;
pub const HVAC_SEAT_TEMPERATURE: i32 = 0x1540_050B;
pub const HVAC_TEMPERATURE_DISPLAY_UNITS: i32 = 0x1140_050E;
pub const HVAC_POWER_ON: i32 = 0x1520_0510;
pub const HVAC_FAN_DIRECTION_AVAILABLE: i32 = 0x1541_0511;
pub const HVAC_DEFROSTER: i32 = 0x1320_0504;
pub const HVAC_STEERING_WHEEL_HEAT: i32 = 0x1140_050D;
pub const HVAC_ELECTRIC_DEFROSTER_ON: i32 = 0x1320_0514;

pub const DOOR_POS: i32 = 0x1640_0B00;
pub const DOOR_LOCK: i32 = 0x1620_0B02;
pub const DOOR_CHILD_LOCK_ENABLED: i32 = 0x1620_0B03;
pub const WINDOW_POS: i32 = 0x1340_0BC0;
pub const WINDOW_LOCK: i32 = 0x1320_0BC4;

/// Display unit values of `HVAC_TEMPERATURE_DISPLAY_UNITS`
pub const VEHICLE_UNIT_CELSIUS: i32 = 0x30;
pub const VEHICLE_UNIT_FAHRENHEIT: i32 = 0x31;

pub const SEAT_ROW_1_LEFT: i32 = 0x0001;
pub const SEAT_ROW_1_CENTER: i32 = 0x0002;
pub const SEAT_ROW_1_RIGHT: i32 = 0x0004;
pub const SEAT_ROW_2_LEFT: i32 = 0x0010;
pub const SEAT_ROW_2_CENTER: i32 = 0x0020;
pub const SEAT_ROW_2_RIGHT: i32 = 0x0040;
pub const SEAT_ROW_3_LEFT: i32 = 0x0100;
pub const SEAT_ROW_3_CENTER: i32 = 0x0200;
pub const SEAT_ROW_3_RIGHT: i32 = 0x0400;

pub const WINDOW_FRONT_WINDSHIELD: i32 = 0x0000_0001;
pub const WINDOW_REAR_WINDSHIELD: i32 = 0x0000_0002;
pub const WINDOW_ROW_1_LEFT: i32 = 0x0000_0010;
pub const WINDOW_ROW_1_RIGHT: i32 = 0x0000_0040;
pub const WINDOW_ROW_2_LEFT: i32 = 0x0000_0100;
pub const WINDOW_ROW_2_RIGHT: i32 = 0x0000_0400;
pub const WINDOW_ROW_3_LEFT: i32 = 0x0000_1000;
pub const WINDOW_ROW_3_RIGHT: i32 = 0x0000_4000;
pub const WINDOW_ROOF_TOP_1: i32 = 0x0001_0000;
pub const WINDOW_ROOF_TOP_2: i32 = 0x0002_0000;

pub const DOOR_ROW_1_LEFT: i32 = 0x0000_0001;
pub const DOOR_ROW_1_RIGHT: i32 = 0x0000_0004;
pub const DOOR_ROW_2_LEFT: i32 = 0x0000_0010;
pub const DOOR_ROW_2_RIGHT: i32 = 0x0000_0040;
pub const DOOR_ROW_3_LEFT: i32 = 0x0000_0100;
pub const DOOR_ROW_3_RIGHT: i32 = 0x0000_0400;
pub const DOOR_HOOD: i32 = 0x1000_0000;
pub const DOOR_REAR: i32 = 0x2000_0000;

const AREA_TYPE_MASK: i32 = 0x0f00_0000;

const KNOWN_PROPERTIES: &[(&str, i32)] = &[
    ("HVAC_FAN_SPEED", HVAC_FAN_SPEED),
    ("HVAC_FAN_DIRECTION", HVAC_FAN_DIRECTION),
    ("HVAC_TEMPERATURE_SET", HVAC_TEMPERATURE_SET),
    ("HVAC_AC_ON", HVAC_AC_ON),
    ("HVAC_RECIRC_ON", HVAC_RECIRC_ON),
    ("HVAC_AUTO_ON", HVAC_AUTO_ON),
    ("HVAC_SEAT_TEMPERATURE", HVAC_SEAT_TEMPERATURE),
    ("HVAC_TEMPERATURE_DISPLAY_UNITS", HVAC_TEMPERATURE_DISPLAY_UNITS),
    ("HVAC_POWER_ON", HVAC_POWER_ON),
    ("HVAC_FAN_DIRECTION_AVAILABLE", HVAC_FAN_DIRECTION_AVAILABLE),
    ("HVAC_DEFROSTER", HVAC_DEFROSTER),
    ("HVAC_STEERING_WHEEL_HEAT", HVAC_STEERING_WHEEL_HEAT),
    ("HVAC_ELECTRIC_DEFROSTER_ON", HVAC_ELECTRIC_DEFROSTER_ON),
    ("DOOR_POS", DOOR_POS),
    ("DOOR_LOCK", DOOR_LOCK),
    ("DOOR_CHILD_LOCK_ENABLED", DOOR_CHILD_LOCK_ENABLED),
    ("WINDOW_POS", WINDOW_POS),
    ("WINDOW_LOCK", WINDOW_LOCK),
];

/// Area type encoded in bits 24..28 of a property id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaType {
    Global,
    Window,
    Mirror,
    Seat,
    Door,
    Wheel,
    Vendor,
    Unknown(i32),
}

impl AreaType {
    pub fn of_property(property_id: i32) -> Self {
        match property_id & AREA_TYPE_MASK {
            0x0100_0000 => AreaType::Global,
            0x0300_0000 => AreaType::Window,
            0x0400_0000 => AreaType::Mirror,
            0x0500_0000 => AreaType::Seat,
            0x0600_0000 => AreaType::Door,
            0x0700_0000 => AreaType::Wheel,
            0x0800_0000 => AreaType::Vendor,
            other => AreaType::Unknown(other),
        }
    }
}

/// Readable name of a property id for logs
pub struct PropertyName(pub i32);

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match KNOWN_PROPERTIES.iter().find(|(_, id)| *id == self.0) {
            Some((name, _)) => f.write_str(name),
            None => write!(f, "0x{:08x}", self.0),
        }
    }
}

pub fn property_name(property_id: i32) -> PropertyName {
    PropertyName(property_id)
}

/// Resolve a symbolic name like `HVAC_POWER_ON` or a hex/decimal id
pub fn parse_property_id(value: &str) -> Option<i32> {
    let value = value.trim();
    if let Some((_, id)) = KNOWN_PROPERTIES.iter().find(|(name, _)| *name == value) {
        return Some(*id);
    }
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => i32::from_str_radix(&hex.replace('_', ""), 16).ok(),
        None => value.parse().ok(),
    }
}
