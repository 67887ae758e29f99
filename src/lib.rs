#[macro_use]
extern crate rust_i18n;

i18n!("locales");

pub mod cli;
pub mod config;
pub mod error;
pub mod git_utils;
pub mod hooks;
pub mod path_utils;
pub mod platform;
pub mod profile;
pub mod setup;
pub mod status;

#[cfg(test)]
pub mod test_utils;

pub fn init_locale() {
    rust_i18n::set_locale("en");
}
