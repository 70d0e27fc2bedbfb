mod connection;
mod helpers;
