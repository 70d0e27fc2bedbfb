mod config;
mod reconnect;
