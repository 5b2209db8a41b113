//! Common test fixtures
//!
//! Provides a small HR dataset with categorical, quantitative and temporal
//! fields, plus helpers wiring it into the in-process collaborators.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use vizspec::pipeline::{DatasetCache, SchemaRegistry};
use vizspec::{Column, DataTable, FieldSchema, FieldSet, Scale, Value};

pub const DATASET: &str = "hr";

pub const DEPT: u64 = 1;
pub const SITE: u64 = 2;
pub const SALARY: u64 = 3;
pub const AGE: u64 = 4;
pub const HIRED: u64 = 5;
pub const YEAR: u64 = 6;
pub const EMPLOYEE_ID: u64 = 7;

fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap()
}

pub fn hr_schemas() -> Vec<FieldSchema> {
    vec![
        FieldSchema::categorical(DEPT, "dept"),
        FieldSchema::categorical(SITE, "site"),
        FieldSchema::quantitative(SALARY, "salary"),
        FieldSchema::quantitative(AGE, "age"),
        FieldSchema::temporal(HIRED, "hired"),
        FieldSchema::temporal(YEAR, "year").with_scale(Scale::Ordinal),
        FieldSchema::categorical(EMPLOYEE_ID, "employee_id")
            .unique()
            .id_field(),
    ]
}

pub fn hr_fields() -> FieldSet {
    FieldSet::new(hr_schemas()).unwrap()
}

pub fn hr_table() -> DataTable {
    let depts = ["eng", "eng", "ops", "hr", "eng", "ops", "hr", "eng", "ops", "eng"];
    let sites = ["tokyo", "osaka", "tokyo", "tokyo", "osaka", "osaka", "tokyo", "tokyo", "osaka", "tokyo"];
    let hired = vec![
        date(2015, 3, 1),
        date(2016, 7, 15),
        date(2017, 1, 10),
        date(2018, 5, 20),
        date(2019, 9, 1),
        date(2020, 2, 3),
        date(2021, 6, 30),
        date(2022, 11, 11),
        date(2023, 4, 4),
        date(2024, 8, 8),
    ];
    let years: Vec<Value> = hired
        .iter()
        .map(|d| Value::Number(d.format("%Y").to_string().parse::<f64>().unwrap()))
        .collect();

    DataTable::new(vec![
        Column::text("dept", depts.to_vec()),
        Column::text("site", sites.to_vec()),
        Column::numeric_opt(
            "salary",
            vec![
                Some(120.0),
                Some(95.5),
                Some(70.0),
                Some(65.25),
                None,
                Some(80.0),
                Some(60.0),
                Some(130.0),
                Some(75.5),
                Some(110.0),
            ],
        ),
        Column::numeric("age", vec![34, 29, 45, 51, 38, 27, 41, 36, 30, 48]),
        Column::temporal("hired", hired),
        Column::new("year", years),
        Column::text(
            "employee_id",
            (1..=10).map(|i| format!("E{:03}", i)).collect::<Vec<_>>(),
        ),
    ])
    .unwrap()
}

/// Cache and schema registry holding the HR dataset
pub fn hr_collaborators() -> (DatasetCache, SchemaRegistry) {
    let cache = DatasetCache::new();
    cache.insert(DATASET, hr_table()).unwrap();
    let schemas = SchemaRegistry::new();
    schemas.register(DATASET, hr_schemas()).unwrap();
    (cache, schemas)
}
