//! Spin each motor briefly at low power, one after the other.
//!
//! Remove the propellers before running:
//!   cargo run --example spin-motors

use std::thread;
use std::time::Duration;

use mosquito::{ClientConfig, DeviceAddress, Mosquito, MOTOR_COUNT};

const TEST_POWER: f32 = 0.1;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let address = match std::env::var("MOSQUITO_ADDRESS") {
        Ok(value) => value.parse()?,
        Err(_) => DeviceAddress::default(),
    };
    let device = Mosquito::new(ClientConfig::new(address));
    device.connect()?;

    device.arm()?;
    for index in 1..=MOTOR_COUNT {
        eprintln!("Motor {index}");
        device.set_motor(index, TEST_POWER)?;
        thread::sleep(Duration::from_secs(1));
        device.set_motor(index, 0.0)?;
    }
    eprintln!("Device reports {:?}", device.get_motors()?);

    device.disarm()?;
    device.disconnect();
    Ok(())
}
