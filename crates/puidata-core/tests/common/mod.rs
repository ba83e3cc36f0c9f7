#![allow(dead_code)]

pub mod shapefile_fixture;
pub mod static_server;
