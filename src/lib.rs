pub mod accumulator;
pub mod api;
pub mod collect;
pub mod model;
pub mod settings;

pub use accumulator::{Accumulator, FieldValue, Metric};
pub use api::Error;

/// Run one collection pass against `envoy`, feeding every extracted metric to `acc`.
///
/// Production data is required: any error reading it, or a `null` document, aborts the pass
/// before anything is emitted. Inverter data is read afterwards; a failure there aborts the
/// pass too, but metrics already handed to `acc` stay there.
pub async fn gather<A: Accumulator + ?Sized>(
    envoy: &model::Envoy,
    acc: &mut A,
) -> Result<(), Error> {
    let device_data = api::production(envoy).await?.ok_or(Error::NoData)?;

    collect::general_information(acc, &device_data);
    collect::instant_report(acc, &envoy.serial_number, &device_data);
    collect::today_report(acc, &envoy.serial_number, &device_data);

    if let Some(inverters) = api::inverters(envoy).await? {
        log::debug!("collected {} inverters", inverters.len());
        collect::inverters(
            acc,
            &envoy.serial_number,
            &inverters,
            chrono::Utc::now().timestamp(),
        );
    }

    Ok(())
}
