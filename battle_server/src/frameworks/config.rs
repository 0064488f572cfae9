use std::{
    env,
    net::{IpAddr, Ipv4Addr},
};

use crate::use_cases::phases::RuleOptions;

// Runtime/server settings (not game rules).

pub fn http_port() -> u16 {
    env::var("BATTLE_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(2439)
}

pub fn bind_address() -> IpAddr {
    env::var("BATTLE_SERVER_BIND")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

pub fn map_size() -> (i32, i32) {
    let read = |key: &str, default: i32| {
        env::var(key)
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(default)
    };
    (read("MAP_WIDTH", 15), read("MAP_HEIGHT", 17))
}

/// Fixed seed for reproducible dice; unset means OS entropy.
pub fn dice_seed() -> Option<u64> {
    env::var("DICE_SEED").ok().and_then(|v| v.parse().ok())
}

pub fn rule_options() -> RuleOptions {
    let physical_attacks = env::var("PHYSICAL_ATTACKS")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    RuleOptions { physical_attacks }
}

pub const COMMAND_CHANNEL_CAPACITY: usize = 1024;
pub const HUB_BROADCAST_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerSettings {
    pub bind: IpAddr,
    pub port: u16,
    pub map_width: i32,
    pub map_height: i32,
    pub dice_seed: Option<u64>,
    pub options: RuleOptions,
}

impl ServerSettings {
    pub fn from_env() -> Self {
        let (map_width, map_height) = map_size();
        Self {
            bind: bind_address(),
            port: http_port(),
            map_width,
            map_height,
            dice_seed: dice_seed(),
            options: rule_options(),
        }
    }
}
