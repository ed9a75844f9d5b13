//! Shared fixtures: a synthetic case table whose outcome depends on age only

#![allow(dead_code)]

use case_outcome::config::PipelineConfig;
use std::path::{Path, PathBuf};

pub const N_ROWS: usize = 400;

pub const SEXES: [&str; 2] = ["female", "male"];
pub const COUNTRIES: [&str; 3] = ["India", "Italy", "Peru"];
pub const PROVINCES: [&str; 4] = ["Delhi", "Lazio", "Lima", "Maharashtra"];

pub fn age_of(i: usize) -> i64 {
    20 + ((i * 7) % 70) as i64
}

pub fn outcome_of(age: i64) -> &'static str {
    if age >= 75 {
        "deceased"
    } else if age >= 50 {
        "hospitalized"
    } else {
        "recovered"
    }
}

/// Write `n` rows to `dir/cases.csv` and return the path
pub fn write_cases(dir: &Path, n: usize) -> PathBuf {
    let mut text = String::from("age,sex,country,province,date_confirmation,outcome\n");
    for i in 0..n {
        let age = age_of(i);
        text.push_str(&format!(
            "{},{},{},{},{:02}.05.2020,{}\n",
            age,
            SEXES[i % 2],
            COUNTRIES[i % 3],
            PROVINCES[i % 4],
            1 + i % 28,
            outcome_of(age)
        ));
    }
    let path = dir.join("cases.csv");
    std::fs::write(&path, text).unwrap();
    path
}

/// Default configuration with every path inside `dir`
pub fn config_in(dir: &Path) -> PipelineConfig {
    PipelineConfig::new()
        .with_data_path(write_cases(dir, N_ROWS))
        .with_models_dir(dir.join("models"))
        .with_results_path(dir.join("results").join("tuning.csv"))
}
