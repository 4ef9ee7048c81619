//! Devices command handler.

use anyhow::Result;
use hushwave_audio::device;

pub fn execute() -> Result<()> {
    let devices = device::list_output_devices()?;
    if devices.is_empty() {
        println!("No audio output devices found");
        return Ok(());
    }
    for d in devices {
        let marker = if d.is_default { "*" } else { " " };
        println!("{marker} {}", d.name);
    }
    Ok(())
}
