//! Sonos API operations organized by service

pub mod rendering_control;
