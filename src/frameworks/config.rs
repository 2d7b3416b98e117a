use crate::domain::ParticipantId;
use std::{env, time::Duration};

// Runtime constants and env overrides (not interaction tuning).

pub fn frame_rate_hz() -> u32 {
    env::var("FRAME_RATE_HZ")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|hz| *hz > 0)
        .unwrap_or(90)
}

pub fn physics_rate_hz() -> u32 {
    env::var("PHYSICS_RATE_HZ")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|hz| *hz > 0)
        .unwrap_or(50)
}

pub fn vr_active() -> bool {
    matches!(
        env::var("VR_ACTIVE").as_deref(),
        Ok("1") | Ok("true")
    )
}

pub fn local_participant() -> ParticipantId {
    let id = env::var("LOCAL_PARTICIPANT")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(1);
    ParticipantId(id)
}

pub fn frame_interval() -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(frame_rate_hz()))
}

pub fn physics_interval() -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(physics_rate_hz()))
}

pub const EVENT_CHANNEL_CAPACITY: usize = 1024;
pub const UPDATE_BROADCAST_CAPACITY: usize = 128;
pub const REPLICATION_BROADCAST_CAPACITY: usize = 256;
