//! Print the attitude ten times per second for five seconds.
//!
//!   cargo run --example watch-attitude

use std::thread;
use std::time::{Duration, Instant};

use mosquito::{ClientConfig, DeviceAddress, Mosquito};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let address = match std::env::var("MOSQUITO_ADDRESS") {
        Ok(value) => value.parse()?,
        Err(_) => DeviceAddress::default(),
    };
    let config = ClientConfig::new(address).with_reply_timeout(Duration::from_secs(1));
    let device = Mosquito::new(config);
    device.connect()?;
    eprintln!("Firmware version {}", device.get_firmware_version()?);

    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(5) {
        let (roll, pitch, yaw) = device.get_attitude()?;
        println!("roll={roll:+.3} pitch={pitch:+.3} yaw={yaw:+.3}");
        thread::sleep(Duration::from_millis(100));
    }

    device.disconnect();
    Ok(())
}
