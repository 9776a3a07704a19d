pub mod composition;
pub mod fleet;
pub mod unit;

pub use composition::{load_fleet_file, parse_fleet_arg, FleetComposition};
pub use fleet::{Capability, Fleet, Unit};
pub use unit::{UnitKind, UnitType};
