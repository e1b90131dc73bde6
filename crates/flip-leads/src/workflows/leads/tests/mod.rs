mod common;

mod pricing;
mod settings;
