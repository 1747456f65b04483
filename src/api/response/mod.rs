mod inverters;
mod production;

pub use inverters::{Inverter, InvertersData};
pub use production::{DeviceData, MeasurementType, Reading, StorageReading};

use serde::{Deserialize, Deserializer};

/// Decode `null` as the default value of `T`, the same as an absent field.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}
