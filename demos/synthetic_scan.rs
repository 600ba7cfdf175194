use lidarscope::{ChannelSource, Scope, ViewConfig};
use rand::Rng;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Half-widths of the simulated room, in millimetres
const ROOM_HALF_WIDTH: f64 = 2400.0;
const ROOM_HALF_DEPTH: f64 = 1600.0;

/// Degrees between consecutive readings
const ANGLE_STEP: f64 = 0.9;

/// Distance from the sensor to the nearest wall along `angle_deg`
fn wall_distance(angle_deg: f64) -> f64 {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let across = if cos.abs() > f64::EPSILON { ROOM_HALF_DEPTH / cos.abs() } else { f64::INFINITY };
    let along = if sin.abs() > f64::EPSILON { ROOM_HALF_WIDTH / sin.abs() } else { f64::INFINITY };
    across.min(along)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ViewConfig::builder()
        .surface_size(720)
        .point_history(800)
        .build();

    let (sender, receiver) = mpsc::channel();

    // Sweep the room like a spinning sensor, with jitter and the odd corrupt line
    thread::spawn(move || {
        let mut rng = rand::rng();
        let mut angle = 0.0_f64;
        loop {
            let line = if rng.random_bool(0.02) {
                "#sync".to_string()
            } else {
                let noise = rng.random_range(-25.0..25.0);
                let distance = (wall_distance(angle) + noise).max(0.0);
                format!("{:.2}, {}", angle, distance.round() as u32)
            };
            if sender.send(line).is_err() {
                break;
            }

            angle = (angle + ANGLE_STEP) % 360.0;
            thread::sleep(Duration::from_micros(250));
        }
    });

    println!("Displaying a simulated lidar sweep of a rectangular room");
    println!("Press q or close the window to exit");

    Scope::new(config).show(ChannelSource::new(receiver).with_timeout(Duration::from_millis(5)))?;
    Ok(())
}
