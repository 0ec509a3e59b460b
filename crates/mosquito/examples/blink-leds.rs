//! Cycle the status LEDs through red, green and blue.
//!
//! Join the Mosquito's WiFi network, then run:
//!   cargo run --example blink-leds
//!
//! Set `MOSQUITO_ADDRESS` to reach a device that is not on 192.168.4.1:80.

use std::thread;
use std::time::Duration;

use mosquito::{ClientConfig, DeviceAddress, Mosquito};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let address = match std::env::var("MOSQUITO_ADDRESS") {
        Ok(value) => value.parse()?,
        Err(_) => DeviceAddress::default(),
    };
    let device = Mosquito::new(ClientConfig::new(address));
    device.connect()?;
    eprintln!("Connected to {}", device.config().address);

    for _ in 0..3 {
        device.set_leds(Some(true), Some(false), Some(false))?;
        thread::sleep(Duration::from_millis(300));
        // Only green changes; red keeps its last state until switched off.
        device.set_leds(Some(false), Some(true), None)?;
        thread::sleep(Duration::from_millis(300));
        device.set_leds(None, Some(false), Some(true))?;
        thread::sleep(Duration::from_millis(300));
    }

    device.set_leds(Some(false), Some(false), Some(false))?;
    device.disconnect();
    Ok(())
}
