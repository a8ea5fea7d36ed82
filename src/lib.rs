pub mod articles;
pub mod controller;
pub mod domain;
pub mod inputter;
pub mod model;
pub mod ui;
