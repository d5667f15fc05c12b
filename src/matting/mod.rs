pub mod catalog;
pub mod composite;
pub mod config;
pub mod dataset;
pub mod dilate;
pub mod geometry;
pub mod gradient;
pub mod inter_linear;
pub mod pipeline;
pub mod sample;
pub mod trimap;
pub mod trimap_tool;
